use super::run_with;
use crate::channel::ChannelKind;
use crate::config::Config;
use crate::session::SessionError;
use crate::types::Dialect;
use crate::vm::{CompileError, ExecutionError};

fn fail(config: Config, program: &str) -> SessionError {
    run_with(config, program.trim(), &[]).unwrap_err()
}

#[test]
fn unmatched_close() {
    assert!(matches!(
        fail(Config::default(), "]"),
        SessionError::Compile(CompileError::UnmatchedBracket { address: 0 })
    ));
}

#[test]
fn unmatched_open() {
    assert!(matches!(
        fail(Config::default(), "+[>+<-"),
        SessionError::Compile(CompileError::UnmatchedBracket { address: 1 })
    ));
}

#[test]
fn too_deep_for_configured_limit() {
    let config = Config::default().max_depth(3);
    assert!(run_with(config, "[[[]]]", &[]).is_ok());
    assert!(matches!(
        fail(config, "[[[[]]]]"),
        SessionError::Compile(CompileError::LoopTooDeep { address: 9, limit: 3 })
    ));
}

#[test]
fn walking_off_the_left_edge() {
    match fail(Config::default(), "+>+<<+") {
        SessionError::Runtime {
            source: ExecutionError::PointerOutOfBounds { address, op, .. },
            rolled_back,
        } => {
            assert_eq!(address, 4);
            assert_eq!(op, '<');
            assert!(!rolled_back);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn walking_off_the_right_edge() {
    let config = Config::default().tape_size(3);
    assert!(matches!(
        fail(config, ">>+[>]"),
        SessionError::Runtime {
            source: ExecutionError::PointerOutOfBounds { cursor: 3, .. },
            ..
        }
    ));
}

#[test]
fn file_write_without_open_file() {
    let config = Config::default().dialect(Dialect::Extended);
    assert!(matches!(
        fail(config, "+++;"),
        SessionError::Runtime {
            source: ExecutionError::ChannelNotOpen {
                address: 3,
                channel: ChannelKind::File,
                ..
            },
            ..
        }
    ));
}
