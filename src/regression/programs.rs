use super::{run, run_with};
use crate::config::Config;
use crate::memory::BoundsPolicy;
use crate::types::Dialect;

#[test]
fn hello_world() {
    run(
        "
        ++++++++[>++++[>++>+++>+++>+<<<<-]>+>+>->>+[<]<-]
        >>.>---.+++++++..+++.>>.<-.<.+++.------.--------.>>+.>++.
        ",
        &[],
        b"Hello World!\n",
    );
}

#[test]
fn cat_until_end_of_input() {
    run(",[.,]", b"copy me", b"copy me");
}

#[test]
fn reverse_input() {
    run(">,[>,]<[.<]", b"stressed", b"desserts");
}

#[test]
fn add_two_digits() {
    run(
        "
        ,>,
        ------------------------------------------------
        [<+>-]<.
        ",
        b"34",
        b"7",
    );
}

#[test]
fn multiply_with_nested_loops() {
    run("++++++[>+++++++[>+<-]<-]>>.", &[], &[42]);
}

#[test]
fn comments_are_ignored() {
    run("this + is + a + comment + block [-] ok +++.", &[], &[3]);
}

#[test]
fn cell_wraps_below_zero() {
    run("-.", &[], &[255]);
}

#[test]
fn extended_operators_are_comments_in_base_dialect() {
    run("+#;:%^!.", &[], &[1]);
}

#[test]
fn socket_ops_are_noops_without_a_socket() {
    let config = Config::default().dialect(Dialect::Extended);
    let output = run_with(config, "+++^!.", &[]).unwrap();
    assert_eq!(output, vec![3]);
}

#[test]
fn wrap_policy_reaches_last_cell() {
    let config = Config::default().tape_size(10).bounds(BoundsPolicy::Wrap);
    let output = run_with(config, "<+++.>>.", &[]).unwrap();
    assert_eq!(output, vec![3, 0]);
}
