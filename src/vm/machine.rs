use std::io;

use thiserror::Error;
use tracing::warn;

use super::program::Program;
use crate::channel::{ChannelKind, Channels};
use crate::io::{InputStream, OutputStream};
use crate::memory::{AccessError, BoundsPolicy, Tape};
use crate::ops::Op;
use crate::types::{Address, Cell, STATUS_FAILED, STATUS_OK};

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Pointer out of bounds at operation {address} '{op}' (cursor {cursor})")]
    PointerOutOfBounds {
        address: Address,
        op: char,
        cursor: isize,
    },

    #[error("No {channel} is open at operation {address} '{op}'")]
    ChannelNotOpen {
        address: Address,
        op: char,
        channel: ChannelKind,
    },

    #[error("I/O failure at operation {address} '{op}': {source}")]
    Io {
        address: Address,
        op: char,
        source: io::Error,
    },

    #[error("Malformed instruction stream at {address}")]
    Malformed { address: Address },
}

impl ExecutionError {
    /// Instruction address the run stopped at.
    pub fn address(&self) -> Address {
        match self {
            ExecutionError::PointerOutOfBounds { address, .. }
            | ExecutionError::ChannelNotOpen { address, .. }
            | ExecutionError::Io { address, .. }
            | ExecutionError::Malformed { address } => *address,
        }
    }
}

pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

pub struct Machine<'a, I, O> {
    tape: &'a mut Tape,
    channels: &'a mut Channels,
    input: &'a mut I,
    output: &'a mut O,
    bounds: BoundsPolicy,
}

impl<I, O> Machine<'_, I, O>
where
    I: InputStream,
    O: OutputStream,
{
    pub fn new<'a>(
        tape: &'a mut Tape,
        channels: &'a mut Channels,
        input: &'a mut I,
        output: &'a mut O,
        bounds: BoundsPolicy,
    ) -> Machine<'a, I, O> {
        Machine {
            tape,
            channels,
            input,
            output,
            bounds,
        }
    }

    pub fn run(&mut self, program: &Program) -> ExecutionResult<()> {
        let mut pc = 0;
        while pc < program.len() {
            let op = program
                .op(pc)
                .ok_or(ExecutionError::Malformed { address: pc })?;

            let next = self.execute(program, pc, op)?;

            if !self.tape.normalize(self.bounds) {
                return Err(ExecutionError::PointerOutOfBounds {
                    address: pc,
                    op: op.symbol() as char,
                    cursor: self.tape.cursor(),
                });
            }

            pc = next;
        }

        Ok(())
    }

    /// Executes the instruction at `pc` and returns the address of the next one.
    fn execute(&mut self, program: &Program, pc: Address, op: Op) -> ExecutionResult<Address> {
        match op {
            Op::Inc | Op::Dec => {
                let value = op.apply(self.tape.current());
                self.tape.store(value);
            }
            Op::Left => self.tape.shift(-1),
            Op::Right => self.tape.shift(1),
            Op::Write => {
                let value = self.tape.current();
                self.output
                    .write(value)
                    .map_err(|source| io_error(pc, op, source))?;
            }
            Op::Read => {
                // end of input reads as 0
                let value = self.input.read().unwrap_or(0);
                self.tape.store(value);
            }
            Op::LoopOpen => {
                if self.tape.current() != 0 {
                    return Ok(pc + op.width());
                }

                let close = program
                    .partner(pc)
                    .ok_or(ExecutionError::Malformed { address: pc })?;
                return Ok(close + Op::LoopClose.width());
            }
            Op::LoopClose => {
                return program
                    .partner(pc)
                    .ok_or(ExecutionError::Malformed { address: pc });
            }
            Op::FileToggle => {
                if self.channels.file.is_open() {
                    self.channels.file.close();
                } else {
                    let status = self.open_file();
                    self.tape.store(status);
                }
            }
            Op::FileWrite => {
                if !self.channels.file.is_open() {
                    return Err(not_open(pc, op, ChannelKind::File));
                }

                let value = self.tape.current();
                self.channels
                    .file
                    .write_byte(value)
                    .map_err(|source| io_error(pc, op, source))?;
            }
            Op::FileRead => {
                if !self.channels.file.is_open() {
                    return Err(not_open(pc, op, ChannelKind::File));
                }

                let value = self
                    .channels
                    .file
                    .read_byte()
                    .map_err(|source| io_error(pc, op, source))?;
                self.tape.store(value);
            }
            Op::SocketToggle => {
                if self.channels.socket.is_open() {
                    self.channels.socket.close();
                } else {
                    let status = self.open_socket();
                    self.tape.store(status);
                }
            }
            Op::SocketSend => {
                if self.channels.socket.is_open() {
                    let value = self.tape.current();
                    self.channels
                        .socket
                        .send_byte(value)
                        .map_err(|source| io_error(pc, op, source))?;
                }
            }
            Op::SocketRecv => {
                if self.channels.socket.is_open() {
                    let value = self.channels.socket.recv_byte();
                    self.tape.store(value);
                }
            }
        }

        Ok(pc + op.width())
    }

    /// Where the operand of `#` / `%` starts: the current cell holds a signed
    /// distance from the cursor.
    fn operand_address(&self) -> isize {
        self.tape.cursor() + self.tape.current() as i8 as isize
    }

    fn open_file(&mut self) -> Cell {
        let start = self.operand_address();
        let result = match self.tape.c_str(start) {
            Ok(path) => self.channels.file.open(path),
            Err(e) => Err(io::Error::new(io::ErrorKind::InvalidInput, e)),
        };

        match result {
            Ok(()) => STATUS_OK,
            Err(e) => {
                warn!(start, "failed to open file: {}", e);
                STATUS_FAILED
            }
        }
    }

    // memory layout: [status][target...][0][port hi][port lo]
    fn open_socket(&mut self) -> Cell {
        let start = self.operand_address();
        let result = self
            .socket_operand(start)
            .and_then(|(target, port)| self.channels.socket.open(&target, port));

        match result {
            Ok(()) => STATUS_OK,
            Err(e) => {
                warn!(start, "failed to open socket: {}", e);
                STATUS_FAILED
            }
        }
    }

    fn socket_operand(&self, start: isize) -> io::Result<(Vec<Cell>, u16)> {
        let invalid = |e: AccessError| io::Error::new(io::ErrorKind::InvalidInput, e);

        let target = self.tape.c_str(start).map_err(invalid)?.to_vec();
        let port_at = start + target.len() as isize + 1;
        let hi = self.tape.load(port_at).map_err(invalid)?;
        let lo = self.tape.load(port_at + 1).map_err(invalid)?;

        Ok((target, u16::from_be_bytes([hi, lo])))
    }
}

fn io_error(address: Address, op: Op, source: io::Error) -> ExecutionError {
    ExecutionError::Io {
        address,
        op: op.symbol() as char,
        source,
    }
}

fn not_open(address: Address, op: Op, channel: ChannelKind) -> ExecutionError {
    ExecutionError::ChannelNotOpen {
        address,
        op: op.symbol() as char,
        channel,
    }
}
