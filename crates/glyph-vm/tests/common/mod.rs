#![allow(dead_code)]

use glyph_vm::{Machine, MachineConfig, PortBank, PortHooks, RunExit};

/// Instruction budget for test programs; a regression into an endless loop shows up as a
/// `StepLimit` exit instead of a hung test.
pub const TEST_MAX_STEPS: u64 = 10_000;

/// Port hooks that record every callback and can feed scripted input to a port.
#[derive(Debug, Default)]
pub struct Recorder {
    pub emitted: Vec<(u8, u8)>,
    pub heard: Vec<u8>,
    pub input: Vec<u8>,
}

impl PortHooks for Recorder {
    fn emit(&mut self, ports: &mut PortBank, port: u8) {
        self.emitted.push((port, ports.read(port)));
    }

    fn hear(&mut self, ports: &mut PortBank, port: u8) {
        self.heard.push(port);
        if !self.input.is_empty() {
            ports.write(port, self.input.remove(0));
        }
    }
}

pub fn config() -> MachineConfig {
    MachineConfig::default().with_max_steps(TEST_MAX_STEPS)
}

/// Runs `src` to completion and asserts that it halted within the test budget.
pub fn run(src: &str) -> Machine<Recorder> {
    run_with(src, Recorder::default())
}

pub fn run_with(src: &str, hooks: Recorder) -> Machine<Recorder> {
    let mut m = Machine::new(config(), src.as_bytes(), hooks).expect("program should load");
    let exit = m.run();
    assert!(
        matches!(exit, RunExit::Halted { .. }),
        "program did not halt: {exit:?}\nsource: {src:?}"
    );
    m
}
