mod channel;
mod config;
mod interpreter;
mod io;
mod memory;
mod nom;
mod ops;
#[cfg(test)]
mod regression;
mod session;
mod types;
mod vm;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::interpreter::Interpreter;
use crate::io::OutputStream;
use crate::memory::BoundsPolicy;
use crate::session::Session;
use crate::types::Dialect;

#[derive(Parser, Debug)]
#[command(name = "bfpp")]
#[command(version)]
#[command(about = "Brainfuck interpreter with optional file and socket extensions")]
struct Args {
    /// Program to run. Starts an interactive session when omitted.
    file: Option<PathBuf>,

    /// Enable the extended operators `# ; : % ^ !`
    #[arg(short = 'x', long)]
    extended: bool,

    /// Wrap the cursor around the tape instead of failing when it leaves it
    #[arg(long)]
    wrap: bool,

    /// Number of cells on the tape (at least 1)
    #[arg(
        long,
        env = "BFPP_TAPE_SIZE",
        default_value_t = memory::DEFAULT_TAPE_SIZE,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    tape_size: usize,

    /// Deepest loop nesting accepted by the compiler
    #[arg(long, env = "BFPP_MAX_DEPTH", default_value_t = vm::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log more (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        let dialect = if self.extended {
            Dialect::Extended
        } else {
            Dialect::Base
        };
        let bounds = if self.wrap {
            BoundsPolicy::Wrap
        } else {
            BoundsPolicy::Fault
        };

        Config::default()
            .dialect(dialect)
            .bounds(bounds)
            .tape_size(self.tape_size)
            .max_depth(self.max_depth)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn run_file(path: &Path, config: Config) -> Result<(), Box<dyn Error>> {
    let source = fs::read(path).map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    let source = String::from_utf8_lossy(&source);

    let mut session = Session::new(config);
    let mut output = std::io::stdout();
    let result = session.execute(&source, &mut std::io::stdin(), &mut output);
    output.flush()?;

    Ok(result?)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.config();
    let result = match &args.file {
        Some(path) => run_file(path, config),
        None => Interpreter::new(config).run(),
    };

    if let Err(e) = result {
        eprintln!("Failure: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
