use std::convert::TryFrom;

use thiserror::Error;
use tracing::debug;

use super::program::Program;
use crate::ops::Op;
use crate::types::{Address, Dialect, Offset};

pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("Unmatched bracket at {address}")]
    UnmatchedBracket { address: Address },

    #[error("Maximum loop depth ({limit}) exceeded at {address}")]
    LoopTooDeep { address: Address, limit: usize },

    #[error("Loop at {address} is too long to encode ({distance} bytes)")]
    LoopTooLong { address: Address, distance: usize },

    #[error("Failed to allocate {size} bytes for the instruction stream")]
    AllocationFailure { size: usize },
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// Addresses of loop-opens still waiting for their close.
struct LoopStack {
    pending: Vec<Address>,
    capacity: usize,
}

impl LoopStack {
    fn with_capacity(capacity: usize) -> Self {
        LoopStack {
            pending: Vec::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, address: Address) -> Result<()> {
        if self.pending.len() >= self.capacity {
            return Err(CompileError::LoopTooDeep {
                address,
                limit: self.capacity,
            });
        }

        self.pending.push(address);
        Ok(())
    }

    fn pop(&mut self) -> Option<Address> {
        self.pending.pop()
    }

    fn innermost(&self) -> Option<Address> {
        self.pending.last().copied()
    }
}

pub struct Compiler {
    dialect: Dialect,
    max_depth: usize,
}

impl Compiler {
    pub fn new(dialect: Dialect, max_depth: usize) -> Self {
        Compiler { dialect, max_depth }
    }

    pub fn compile(&self, source: &str) -> Result<Program> {
        let size = self.ops(source).map(Op::width).sum();

        let mut code = Vec::new();
        code.try_reserve_exact(size)
            .map_err(|_| CompileError::AllocationFailure { size })?;

        let mut program = Program { code };
        let mut loops = LoopStack::with_capacity(self.max_depth);

        for op in self.ops(source) {
            let address = program.code.len();
            program.code.push(op.symbol());

            match op {
                Op::LoopOpen => {
                    loops.push(address)?;
                    // patched when the matching close is seen
                    program.code.extend_from_slice(&[0; 2]);
                }
                Op::LoopClose => {
                    let open = loops
                        .pop()
                        .ok_or(CompileError::UnmatchedBracket { address })?;
                    let distance = address - open;
                    let offset = Offset::try_from(distance)
                        .map_err(|_| CompileError::LoopTooLong { address: open, distance })?;

                    program.code.extend_from_slice(&(-offset).to_le_bytes());
                    program.set_offset(open, offset);
                }
                _ => {}
            }
        }

        if let Some(address) = loops.innermost() {
            return Err(CompileError::UnmatchedBracket { address });
        }

        debug_assert_eq!(program.len(), size);
        debug!(size, "compiled instruction stream");

        Ok(program)
    }

    fn ops<'a>(&self, source: &'a str) -> impl Iterator<Item = Op> + 'a {
        let dialect = self.dialect;
        source.chars().filter_map(move |c| Op::from_char(c, dialect))
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler::new(Dialect::default(), DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(source: &str) -> Result<Program> {
        Compiler::default().compile(source)
    }

    fn nested(depth: usize) -> String {
        "[".repeat(depth) + &"]".repeat(depth)
    }

    fn assert_pairs_consistent(program: &Program) {
        for instruction in program.instructions() {
            if instruction.op == Op::LoopOpen {
                let close = instruction.partner.unwrap();
                assert_eq!(program.op(close), Some(Op::LoopClose));
                assert_eq!(program.partner(close), Some(instruction.address));
            }
        }
    }

    #[test]
    fn encoding_is_byte_exact() {
        let program = compile("+[-]").unwrap();
        assert_eq!(
            program.as_bytes(),
            &[b'+', b'[', 4, 0, b'-', b']', 0xfc, 0xff]
        );
    }

    #[test]
    fn brackets_point_at_each_other() {
        let sources = [
            "[]",
            "+[->+<]>.",
            "[[][[]]]",
            "++[>++[>++<-]<-]>>.",
            ",[.,]",
            "[a[b]c[d[e]f]g]",
        ];

        for source in sources.iter() {
            let program = compile(source).unwrap();
            assert_pairs_consistent(&program);
        }
    }

    #[test]
    fn generated_nestings_round_trip() {
        // small linear congruential generator; deterministic across runs
        let mut seed: u32 = 0x2545_f491;
        for _ in 0..64 {
            let mut source = String::new();
            let mut depth = 0;
            for _ in 0..200 {
                seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
                match (seed >> 16) % 4 {
                    0 if depth < DEFAULT_MAX_DEPTH => {
                        source.push('[');
                        depth += 1;
                    }
                    1 if depth > 0 => {
                        source.push(']');
                        depth -= 1;
                    }
                    2 => source.push('+'),
                    _ => source.push('x'),
                }
            }
            source.push_str(&"]".repeat(depth));

            let program = compile(&source).unwrap();
            assert_pairs_consistent(&program);
        }
    }

    #[test]
    fn unmatched_close() {
        assert_eq!(
            compile("]"),
            Err(CompileError::UnmatchedBracket { address: 0 })
        );
        assert_eq!(
            compile("+[]]"),
            Err(CompileError::UnmatchedBracket { address: 7 })
        );
    }

    #[test]
    fn unmatched_open() {
        assert_eq!(
            compile("["),
            Err(CompileError::UnmatchedBracket { address: 0 })
        );
        assert_eq!(
            compile("[[]"),
            Err(CompileError::UnmatchedBracket { address: 0 })
        );
    }

    #[test]
    fn depth_limit() {
        assert!(compile(&nested(DEFAULT_MAX_DEPTH)).is_ok());
        assert_eq!(
            compile(&nested(DEFAULT_MAX_DEPTH + 1)),
            Err(CompileError::LoopTooDeep {
                address: DEFAULT_MAX_DEPTH * 3,
                limit: DEFAULT_MAX_DEPTH,
            })
        );

        let shallow = Compiler::new(Dialect::Base, 2);
        assert!(shallow.compile("[[]][[]]").is_ok());
        assert!(matches!(
            shallow.compile("[[[]]]"),
            Err(CompileError::LoopTooDeep { limit: 2, .. })
        ));
    }

    #[test]
    fn comments_are_transparent() {
        assert_eq!(compile("a+b-c").unwrap(), compile("+-").unwrap());
        assert!(compile("no operators here").unwrap().is_empty());
    }

    #[test]
    fn extended_operators_depend_on_dialect() {
        let source = "#;:%^!+";
        assert_eq!(compile(source).unwrap().as_bytes(), b"+");

        let extended = Compiler::new(Dialect::Extended, DEFAULT_MAX_DEPTH);
        assert_eq!(extended.compile(source).unwrap().as_bytes(), b"#;:%^!+");
    }

    #[test]
    fn deterministic() {
        let source = "++[>+[-]<-]";
        assert_eq!(compile(source).unwrap(), compile(source).unwrap());
    }

    #[test]
    fn loop_too_long() {
        let body = "+".repeat(Offset::MAX as usize);
        let source = format!("[{}]", body);
        assert!(matches!(
            compile(&source),
            Err(CompileError::LoopTooLong { address: 0, .. })
        ));

        let body = "+".repeat(Offset::MAX as usize - 3);
        assert!(compile(&format!("[{}]", body)).is_ok());
    }
}
