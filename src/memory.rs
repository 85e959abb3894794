use thiserror::Error;

use crate::types::Cell;

pub const DEFAULT_TAPE_SIZE: usize = 32768;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("Address {address} is outside of the tape (size {size})")]
    OutOfBounds { address: isize, size: usize },

    #[error("No terminating NUL after address {start}")]
    Unterminated { start: usize },
}

type Result<T> = std::result::Result<T, AccessError>;

/// What happens when the cursor leaves `0..size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsPolicy {
    /// Report `PointerOutOfBounds` and stop the run.
    Fault,
    /// Normalize the cursor modulo the tape size and keep going.
    Wrap,
}

impl Default for BoundsPolicy {
    fn default() -> Self {
        BoundsPolicy::Fault
    }
}

/// Fixed-size byte tape with a single cursor.
///
/// The cursor is signed and never clamped by the movement operators: an
/// out-of-range cursor is how a run detects a fault, see [`Tape::normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Box<[Cell]>,
    cursor: isize,
}

impl Tape {
    pub fn with_capacity(size: usize) -> Self {
        Tape {
            cells: vec![0; size].into_boxed_slice(),
            cursor: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    #[cfg(test)]
    pub fn set_cursor(&mut self, cursor: isize) {
        self.cursor = cursor;
    }

    pub fn shift(&mut self, delta: isize) {
        self.cursor = self.cursor.wrapping_add(delta);
    }

    pub fn in_bounds(&self) -> bool {
        self.index(self.cursor).is_some()
    }

    /// Applies the bounds policy to the cursor. Returns `false` if the cursor
    /// is out of range and the policy is `Fault`, or if the tape has no cells
    /// to wrap onto.
    pub fn normalize(&mut self, policy: BoundsPolicy) -> bool {
        if self.in_bounds() {
            return true;
        }

        match policy {
            BoundsPolicy::Fault => false,
            BoundsPolicy::Wrap => match self.cursor.checked_rem_euclid(self.size() as isize) {
                Some(cursor) => {
                    self.cursor = cursor;
                    true
                }
                None => false,
            },
        }
    }

    /// Value under the cursor. Only valid while the cursor is in bounds,
    /// which the machine guarantees between instructions.
    pub fn current(&self) -> Cell {
        self.index(self.cursor)
            .map(|i| self.cells[i])
            .unwrap_or_default()
    }

    pub fn current_mut(&mut self) -> Option<&mut Cell> {
        let index = self.index(self.cursor)?;
        self.cells.get_mut(index)
    }

    pub fn store(&mut self, value: Cell) {
        if let Some(cell) = self.current_mut() {
            *cell = value;
        }
    }

    pub fn load(&self, address: isize) -> Result<Cell> {
        self.index(address)
            .map(|i| self.cells[i])
            .ok_or(AccessError::OutOfBounds {
                address,
                size: self.size(),
            })
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Bytes starting at `address` up to (not including) the next NUL.
    pub fn c_str(&self, address: isize) -> Result<&[Cell]> {
        let start = self.index(address).ok_or(AccessError::OutOfBounds {
            address,
            size: self.size(),
        })?;

        let len = self.cells[start..]
            .iter()
            .position(|&c| c == 0)
            .ok_or(AccessError::Unterminated { start })?;

        Ok(&self.cells[start..start + len])
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = 0);
        self.cursor = 0;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot { tape: self.clone() }
    }

    /// Replaces cells and cursor with the snapshot's. Sizes always match because
    /// snapshots are only taken from the tape they are restored into.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        debug_assert_eq!(self.size(), snapshot.tape.size());
        self.cells.copy_from_slice(&snapshot.tape.cells);
        self.cursor = snapshot.tape.cursor;
    }

    fn index(&self, address: isize) -> Option<usize> {
        if address >= 0 && (address as usize) < self.cells.len() {
            Some(address as usize)
        } else {
            None
        }
    }
}

/// Full copy of a tape, taken after a clean run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    tape: Tape,
}

impl Snapshot {
    /// An all-zero snapshot of a `size` cell tape.
    pub fn empty(size: usize) -> Self {
        Snapshot {
            tape: Tape::with_capacity(size),
        }
    }
}
