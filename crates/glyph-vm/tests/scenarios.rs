mod common;

use common::{run, run_with, Recorder};
use glyph_vm::{HaltReason, Machine, MachineConfig, NoHooks, RunExit};

#[test]
fn assign_and_add_into_named_register() {
    let m = run("5=a 3=b +ab=c");
    assert_eq!(m.register(b'a'), 5);
    assert_eq!(m.register(b'b'), 3);
    assert_eq!(m.register(b'c'), 8);
    assert_eq!(m.accumulator(), 0);
}

#[test]
fn store_then_load_same_address() {
    let m = run("'*=v 50!v 50@w");
    assert_eq!(m.register(b'w'), 42);
    assert_eq!(m.memory()[50], 42);
}

#[test]
fn port_write_commits_value_and_emits_once() {
    let m = run("99=v 5)v");
    assert_eq!(m.ports().read(5), 99);
    assert_eq!(m.hooks().emitted, vec![(5, 99)]);
    assert!(m.hooks().heard.is_empty());
}

#[test]
fn backward_branch_counts_to_ten() {
    // l = address of the loop head; c += 1; loop while c < n.
    let src = "1=o 10=n :l.. +co=c c=?<n l=_.$";
    let mut m = Machine::new(
        MachineConfig::default().with_max_steps(1_000),
        src.as_bytes(),
        NoHooks,
    )
    .unwrap();

    let exit = m.run();
    assert!(matches!(
        exit,
        RunExit::Halted {
            reason: HaltReason::Terminator,
            ..
        }
    ));
    assert!(exit.executed() < 1_000);
    assert_eq!(m.register(b'c'), 10);
    assert_eq!(m.flag(), 0);
}

#[test]
fn console_echo_through_hooks() {
    // Read two bytes from port 'c' and write them back out.
    let hooks = Recorder {
        input: b"hi".to_vec(),
        ..Recorder::default()
    };
    let m = run_with("'c(x 'c(y 'c)x 'c)y", hooks);
    assert_eq!(m.hooks().heard, vec![b'c', b'c']);
    assert_eq!(m.hooks().emitted, vec![(b'c', b'h'), (b'c', b'i')]);
}

#[test]
fn subroutine_call_returns_to_caller() {
    // f points at the subroutine after the `$`.
    let m = run("13=f ;f 7=a $ 5=b ,");
    assert_eq!(m.register(b'a'), 7);
    assert_eq!(m.register(b'b'), 5);
    assert!(m.stack().is_empty());
    assert_eq!(m.halt_reason(), Some(HaltReason::Terminator));
}
