use std::convert::TryFrom;

use crate::types::{Cell, Dialect, OFFSET_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Inc,
    Dec,
    Left,
    Right,
    Write,
    Read,
    LoopOpen,
    LoopClose,

    // extended dialect
    FileToggle,
    FileWrite,
    FileRead,
    SocketToggle,
    SocketSend,
    SocketRecv,
}

impl Op {
    /// Maps a source character to an operator. Characters outside the
    /// dialect's alphabet are comments and yield `None`.
    pub fn from_char(c: char, dialect: Dialect) -> Option<Op> {
        let op = Self::decode(u8::try_from(c).ok()?)?;
        if op.is_extended() && !dialect.is_extended() {
            return None;
        }

        Some(op)
    }

    /// Decodes an operator byte of a compiled stream.
    pub fn decode(byte: u8) -> Option<Op> {
        let op = match byte {
            b'+' => Op::Inc,
            b'-' => Op::Dec,
            b'<' => Op::Left,
            b'>' => Op::Right,
            b'.' => Op::Write,
            b',' => Op::Read,
            b'[' => Op::LoopOpen,
            b']' => Op::LoopClose,
            b'#' => Op::FileToggle,
            b';' => Op::FileWrite,
            b':' => Op::FileRead,
            b'%' => Op::SocketToggle,
            b'^' => Op::SocketSend,
            b'!' => Op::SocketRecv,
            _ => return None,
        };

        Some(op)
    }

    pub fn symbol(self) -> u8 {
        match self {
            Op::Inc => b'+',
            Op::Dec => b'-',
            Op::Left => b'<',
            Op::Right => b'>',
            Op::Write => b'.',
            Op::Read => b',',
            Op::LoopOpen => b'[',
            Op::LoopClose => b']',
            Op::FileToggle => b'#',
            Op::FileWrite => b';',
            Op::FileRead => b':',
            Op::SocketToggle => b'%',
            Op::SocketSend => b'^',
            Op::SocketRecv => b'!',
        }
    }

    pub fn is_loop(self) -> bool {
        matches!(self, Op::LoopOpen | Op::LoopClose)
    }

    pub fn is_extended(self) -> bool {
        matches!(
            self,
            Op::FileToggle
                | Op::FileWrite
                | Op::FileRead
                | Op::SocketToggle
                | Op::SocketSend
                | Op::SocketRecv
        )
    }

    /// Encoded size in the instruction stream: the operator byte plus the
    /// offset field for loop operators.
    pub fn width(self) -> usize {
        if self.is_loop() {
            1 + OFFSET_WIDTH
        } else {
            1
        }
    }

    /// Applies a cell arithmetic operator. Other operators leave the value as is.
    pub fn apply(self, cell: Cell) -> Cell {
        match self {
            Op::Inc => cell.wrapping_add(1),
            Op::Dec => cell.wrapping_sub(1),
            _ => cell,
        }
    }
}
