use std::convert::TryInto;
use std::fmt;

use crate::ops::Op;
use crate::types::{Address, Offset, OFFSET_WIDTH};

/// Compiled instruction stream.
///
/// Simple operators take one byte (their source character). Loop operators
/// are followed by a little-endian `Offset` to the matching partner:
/// `open + offset(open) == close` and `close + offset(close) == open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub(in crate::vm) code: Vec<u8>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    #[cfg(test)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.code
    }

    pub fn op(&self, address: Address) -> Option<Op> {
        self.code.get(address).copied().and_then(Op::decode)
    }

    /// Offset attached to the loop operator at `address`.
    pub fn offset(&self, address: Address) -> Option<Offset> {
        let field = self.code.get(address + 1..address + 1 + OFFSET_WIDTH)?;
        Some(Offset::from_le_bytes(field.try_into().ok()?))
    }

    pub(in crate::vm) fn set_offset(&mut self, address: Address, offset: Offset) {
        let field = &mut self.code[address + 1..address + 1 + OFFSET_WIDTH];
        field.copy_from_slice(&offset.to_le_bytes());
    }

    /// Address the loop operator at `address` is paired with.
    pub fn partner(&self, address: Address) -> Option<Address> {
        let offset = self.offset(address)?;
        let target = address as isize + offset as isize;
        if target < 0 {
            None
        } else {
            Some(target as Address)
        }
    }

    pub fn instructions(&self) -> Instructions<'_> {
        Instructions {
            program: self,
            address: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub address: Address,
    pub op: Op,
    /// Matching bracket for loop operators.
    pub partner: Option<Address>,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6}  {}", self.address, self.op.symbol() as char)?;
        if let Some(partner) = self.partner {
            write!(f, "  -> {}", partner)?;
        }
        Ok(())
    }
}

pub struct Instructions<'a> {
    program: &'a Program,
    address: Address,
}

impl Iterator for Instructions<'_> {
    type Item = Instruction;

    fn next(&mut self) -> Option<Instruction> {
        let address = self.address;
        let op = self.program.op(address)?;
        self.address += op.width();

        let partner = if op.is_loop() {
            self.program.partner(address)
        } else {
            None
        };

        Some(Instruction {
            address,
            op,
            partner,
        })
    }
}
