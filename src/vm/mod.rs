mod compiler;
mod machine;
mod program;

use crate::channel::Channels;
use crate::io::{InputStream, OutputStream};
use crate::memory::{BoundsPolicy, Tape};
use crate::types::Dialect;

pub use self::compiler::{CompileError, Compiler, DEFAULT_MAX_DEPTH};
pub use self::machine::{ExecutionError, ExecutionResult, Machine};
pub use self::program::Program;

pub fn compile(source: &str, dialect: Dialect, max_depth: usize) -> Result<Program, CompileError> {
    Compiler::new(dialect, max_depth).compile(source)
}

pub fn run<I, O>(
    program: &Program,
    tape: &mut Tape,
    channels: &mut Channels,
    input: &mut I,
    output: &mut O,
    bounds: BoundsPolicy,
) -> ExecutionResult<()>
where
    I: InputStream,
    O: OutputStream,
{
    Machine::new(tape, channels, input, output, bounds).run(program)
}
