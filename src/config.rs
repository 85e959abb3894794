use crate::memory::{BoundsPolicy, DEFAULT_TAPE_SIZE};
use crate::types::Dialect;
use crate::vm::DEFAULT_MAX_DEPTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub tape_size: usize,
    /// Deepest loop nesting the compiler accepts.
    pub max_depth: usize,
    pub dialect: Dialect,
    pub bounds: BoundsPolicy,
}

impl Config {
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn bounds(mut self, bounds: BoundsPolicy) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn tape_size(mut self, tape_size: usize) -> Self {
        self.tape_size = tape_size;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tape_size: DEFAULT_TAPE_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
            dialect: Dialect::default(),
            bounds: BoundsPolicy::default(),
        }
    }
}
