mod bad_programs;
mod programs;

use std::collections::VecDeque;

use crate::config::Config;
use crate::session::{Session, SessionError};
use crate::types::Cell;

pub fn run_with(config: Config, program: &str, stdin: &[Cell]) -> Result<Vec<Cell>, SessionError> {
    let mut session = Session::new(config);
    let mut input = stdin.iter().copied().collect::<VecDeque<_>>();
    let mut output = Vec::new();
    session.execute(program, &mut input, &mut output)?;
    Ok(output)
}

pub fn run(program: &str, stdin: &[Cell], stdout: &[Cell]) {
    let output = run_with(Config::default(), program, stdin).unwrap();
    assert_eq!(output, stdout);
}
