use thiserror::Error;
use tracing::{info, warn};

use crate::channel::Channels;
use crate::config::Config;
use crate::io::{InputStream, OutputStream};
use crate::memory::{Snapshot, Tape};
use crate::vm::{self, CompileError, ExecutionError, Program};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Compilation error: {0}")]
    Compile(#[from] CompileError),

    #[error("Runtime error: {source}")]
    Runtime {
        source: ExecutionError,
        /// Whether the tape was restored to the last clean state.
        rolled_back: bool,
    },
}

/// Everything a program can touch: the tape, the state it rolls back to, and
/// the file/socket channels.
pub struct Session {
    config: Config,
    tape: Tape,
    snapshot: Snapshot,
    channels: Channels,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self::with_channels(config, Channels::system())
    }

    pub fn with_channels(config: Config, channels: Channels) -> Self {
        Session {
            config,
            tape: Tape::with_capacity(config.tape_size),
            snapshot: Snapshot::empty(config.tape_size),
            channels,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn channels(&self) -> &Channels {
        &self.channels
    }

    pub fn compile(&self, source: &str) -> Result<Program, CompileError> {
        vm::compile(source, self.config.dialect, self.config.max_depth)
    }

    /// Compiles and runs `source` once, leaving the tape as the run left it.
    pub fn execute<I, O>(
        &mut self,
        source: &str,
        input: &mut I,
        output: &mut O,
    ) -> Result<(), SessionError>
    where
        I: InputStream,
        O: OutputStream,
    {
        let program = self.compile(source)?;
        self.run(&program, input, output)
            .map_err(|source| SessionError::Runtime {
                source,
                rolled_back: false,
            })
    }

    /// Compiles and runs `source` atomically: a run that faults leaves the
    /// tape exactly as the last successful run did.
    pub fn evaluate<I, O>(
        &mut self,
        source: &str,
        input: &mut I,
        output: &mut O,
    ) -> Result<(), SessionError>
    where
        I: InputStream,
        O: OutputStream,
    {
        let program = self.compile(source)?;

        match self.run(&program, input, output) {
            Ok(()) => {
                self.snapshot = self.tape.snapshot();
                Ok(())
            }
            Err(source) => {
                warn!(address = source.address(), "run failed, rolling back memory");
                self.tape.restore(&self.snapshot);
                Err(SessionError::Runtime {
                    source,
                    rolled_back: true,
                })
            }
        }
    }

    pub fn run<I, O>(
        &mut self,
        program: &Program,
        input: &mut I,
        output: &mut O,
    ) -> vm::ExecutionResult<()>
    where
        I: InputStream,
        O: OutputStream,
    {
        vm::run(
            program,
            &mut self.tape,
            &mut self.channels,
            input,
            output,
            self.config.bounds,
        )
    }

    /// Zeroes the tape and the rollback state.
    pub fn reset(&mut self) {
        info!("session reset");
        self.tape.clear();
        self.snapshot = Snapshot::empty(self.config.tape_size);
    }
}
