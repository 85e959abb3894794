/// A single tape cell. Arithmetic on cells wraps at the byte boundary.
pub type Cell = u8;

/// Position in a compiled instruction stream.
pub type Address = usize;

/// Relative jump stored after a loop operator.
pub type Offset = i16;

/// Number of bytes an encoded `Offset` occupies in the instruction stream.
pub const OFFSET_WIDTH: usize = std::mem::size_of::<Offset>();

/// Status stored in the current cell after a successful `#` or `%`.
pub const STATUS_OK: Cell = 0;

/// Status stored in the current cell after a failed `#` or `%` (-1 as a signed byte).
pub const STATUS_FAILED: Cell = 0xff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// The eight classic operators.
    Base,
    /// Base operators plus the file and socket operators `# ; : % ^ !`.
    Extended,
}

impl Dialect {
    pub fn is_extended(self) -> bool {
        self == Dialect::Extended
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::Base
    }
}

pub mod parse {
    use crate::nom::{Input, Parsed};

    use nom::bytes::complete::take_while1;
    use nom::character::complete::char;
    use nom::combinator::{map_res, opt, recognize};
    use nom::sequence::pair;

    pub fn integer(input: Input) -> Parsed<i64> {
        map_res(
            recognize(pair(opt(char('-')), take_while1(|c: char| c.is_ascii_digit()))),
            |number: Input| number.parse::<i64>(),
        )(input)
    }
}
