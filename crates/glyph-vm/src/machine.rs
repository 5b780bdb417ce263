//! The fetch/decode/execute engine.

use tracing::{debug, trace};

use crate::config::MachineConfig;
use crate::error::Result;
use crate::insn::{Instruction, LoadMode};
use crate::memory::Memory;
use crate::opcode;
use crate::ports::{NoHooks, PortBank, PortHooks};
use crate::regs::{Reg, RegisterFile};
use crate::stack::Stack;

/// Why the machine stopped. Diagnostic only: both are ordinary halts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// A NUL or `$` opcode was executed.
    Terminator,
    /// Instruction fetch reached the end of memory.
    EndOfMemory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepExit {
    Continue,
    Halted(HaltReason),
}

/// Result of [`Machine::run`] or [`Machine::run_slice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// The slice budget was used up; the machine is still running.
    Completed { executed: u64 },
    /// The machine halted.
    Halted { reason: HaltReason, executed: u64 },
    /// [`MachineConfig::max_steps`] instructions ran without a halt.
    StepLimit { executed: u64 },
}

impl RunExit {
    /// Number of instructions executed by this invocation.
    pub fn executed(&self) -> u64 {
        match *self {
            RunExit::Completed { executed }
            | RunExit::Halted { executed, .. }
            | RunExit::StepLimit { executed } => executed,
        }
    }

    pub fn is_halted(&self) -> bool {
        matches!(self, RunExit::Halted { .. })
    }
}

/// A single Glyph machine: registers, memory, stack, ports and the host hooks.
///
/// All state is private to the instance. Hosts observe it through the read-only accessors
/// and influence it only through the image passed at construction and the port hooks.
#[derive(Debug)]
pub struct Machine<H: PortHooks = NoHooks> {
    config: MachineConfig,
    image: Vec<u8>,
    regs: RegisterFile,
    memory: Memory,
    stack: Stack,
    ports: PortBank,
    /// Wider than the `.` register so that fetch can observe "past the end" instead of
    /// wrapping back to address zero.
    pc: usize,
    acc: u8,
    flag: u8,
    halted: Option<HaltReason>,
    retired: u64,
    hooks: H,
}

impl Machine<NoHooks> {
    /// Builds a machine with the default configuration and no port hooks.
    pub fn from_image(image: &[u8]) -> Result<Self> {
        Self::new(MachineConfig::default(), image, NoHooks)
    }
}

impl<H: PortHooks> Machine<H> {
    pub fn new(config: MachineConfig, image: &[u8], hooks: H) -> Result<Self> {
        let mut memory = Memory::new(&config)?;
        memory.load_image(config.origin, image)?;
        Ok(Self {
            config,
            image: image.to_vec(),
            regs: RegisterFile::default(),
            memory,
            stack: Stack::default(),
            ports: PortBank::default(),
            pc: usize::from(config.origin),
            acc: 0,
            flag: 0,
            halted: None,
            retired: 0,
            hooks,
        })
    }

    /// Returns the machine to its initial state: image reloaded, everything else zeroed.
    ///
    /// The hooks are kept as they are.
    pub fn reset(&mut self) {
        self.regs.clear();
        self.stack.clear();
        self.ports.clear();
        let reloaded = self.memory.load_image(self.config.origin, &self.image);
        debug_assert!(reloaded.is_ok(), "image was validated against this memory in `new`");
        self.pc = usize::from(self.config.origin);
        self.acc = 0;
        self.flag = 0;
        self.halted = None;
        self.retired = 0;
    }

    /// Runs until the program halts, or until [`MachineConfig::max_steps`] instructions have
    /// executed when a limit is configured.
    pub fn run(&mut self) -> RunExit {
        let Some(limit) = self.config.max_steps else {
            let start = self.retired;
            loop {
                if let StepExit::Halted(reason) = self.step() {
                    return RunExit::Halted {
                        reason,
                        executed: self.retired - start,
                    };
                }
            }
        };

        match self.run_slice(limit) {
            RunExit::Completed { executed } => {
                debug!(executed, pc = self.pc, "step limit reached without halting");
                RunExit::StepLimit { executed }
            }
            exit => exit,
        }
    }

    /// Executes at most `max_insts` instructions.
    pub fn run_slice(&mut self, max_insts: u64) -> RunExit {
        let start = self.retired;
        while self.retired - start < max_insts {
            if let StepExit::Halted(reason) = self.step() {
                return RunExit::Halted {
                    reason,
                    executed: self.retired - start,
                };
            }
        }
        RunExit::Completed {
            executed: self.retired - start,
        }
    }

    /// Fetches, decodes and executes one instruction.
    pub fn step(&mut self) -> StepExit {
        if let Some(reason) = self.halted {
            return StepExit::Halted(reason);
        }

        let pc = self.pc;
        let op = self.fetch();
        if let Some(reason) = self.halted {
            debug!(pc, retired = self.retired, "fetch past end of memory; halting");
            return StepExit::Halted(reason);
        }

        // Operands come through the same fetch primitive as the opcode, so a truncated
        // instruction sees NUL operands and the machine halts once it completes.
        let insn = Instruction::decode(op, || self.fetch());
        trace!(pc, insn = %insn, acc = self.acc, "dispatch");
        self.execute(insn);
        self.retired += 1;

        match self.halted {
            Some(reason) => {
                debug!(?reason, pc = self.pc, retired = self.retired, "machine halted");
                StepExit::Halted(reason)
            }
            None => StepExit::Continue,
        }
    }

    /// Returns the byte at the program counter and advances it. At or past the end of memory
    /// the machine halts and NUL is returned instead.
    fn fetch(&mut self) -> u8 {
        match self.memory.fetch(self.pc) {
            Some(byte) => {
                self.pc += 1;
                byte
            }
            None => {
                self.halted.get_or_insert(HaltReason::EndOfMemory);
                opcode::NUL
            }
        }
    }

    fn execute(&mut self, insn: Instruction) {
        match insn {
            Instruction::Halt { .. } => {
                self.halted = Some(HaltReason::Terminator);
            }
            Instruction::Space { .. } => self.acc = 0,
            Instruction::Digit(d) => self.acc = self.acc.wrapping_mul(10).wrapping_add(d),
            Instruction::CharLiteral(c) => self.acc = c,
            Instruction::Assign { dst } => {
                self.write_reg(dst, self.acc);
                self.acc = 0;
            }
            Instruction::Load { dst, mode } => {
                let value = match mode {
                    LoadMode::Byte(b) => Some(b),
                    LoadMode::Hex(h) => Some(opcode::hex_digit_value(h)),
                    LoadMode::Copy(src) => Some(self.read_reg(src)),
                    LoadMode::Invalid(_) => None,
                };
                self.acc = 0;
                if let Some(value) = value {
                    self.write_reg(dst, value);
                }
            }
            Instruction::Binary { op, lhs, rhs } => {
                let a = self.read_reg(lhs);
                let b = self.read_reg(rhs);
                self.acc = op.apply(a, b);
            }
            Instruction::Not { src } => self.acc = !self.read_reg(src),
            Instruction::Shift { dir, src } => {
                // The shift amount is whatever the accumulator held before this instruction.
                let amount = self.acc;
                let value = self.read_reg(src);
                self.acc = dir.apply(value, amount);
            }
            Instruction::LoadMem { dst } => {
                let addr = self.acc;
                self.acc = 0;
                let value = self.memory.read(addr);
                self.write_reg(dst, value);
            }
            Instruction::StoreMem { src } => {
                let addr = self.acc;
                let value = self.read_reg(src);
                self.acc = 0;
                self.memory.write(addr, value);
            }
            Instruction::ReadPort { dst } => {
                let port = self.acc;
                self.acc = 0;
                self.hooks.hear(&mut self.ports, port);
                let value = self.ports.read(port);
                self.write_reg(dst, value);
            }
            Instruction::WritePort { src } => {
                let port = self.acc;
                let value = self.read_reg(src);
                self.acc = 0;
                self.ports.write(port, value);
                self.hooks.emit(&mut self.ports, port);
            }
            Instruction::Compare { cond, rhs } => {
                let lhs = self.acc;
                let rhs = self.read_reg(rhs);
                self.flag = u8::from(cond.holds(lhs, rhs));
                self.acc = self.flag;
            }
            Instruction::Select { dst } => {
                if self.flag != 0 {
                    self.write_reg(dst, self.acc);
                }
                self.acc = 0;
            }
            Instruction::Jump { target } => {
                let target = self.read_reg(target);
                self.acc = 0;
                self.pc = usize::from(target);
            }
            Instruction::Call { target } => {
                let target = self.read_reg(target);
                self.acc = 0;
                // A call ending in the last two bytes of a 256-byte memory has a return
                // address of 256, which does not fit in a stack entry.
                match u8::try_from(self.pc) {
                    Ok(ret) => {
                        self.stack.push(ret);
                        self.pc = usize::from(target);
                    }
                    Err(_) => {
                        debug!(pc = self.pc, "call has no representable return address");
                        self.halted = Some(HaltReason::EndOfMemory);
                    }
                }
            }
            Instruction::Return => {
                if self.stack.is_empty() {
                    // Not an error: the wrapped slot is read like any other.
                    debug!(pc = self.pc, "return with an empty stack");
                }
                self.pc = usize::from(self.stack.pop());
                self.acc = 0;
            }
            Instruction::Copy { src, dst } => {
                let value = self.read_reg(src);
                self.acc = 0;
                self.write_reg(dst, value);
            }
        }
    }

    /// The `.` register is one byte wide, so it reads as 0 once the program counter has
    /// reached address 256.
    fn pc_byte(&self) -> u8 {
        (self.pc & 0xFF) as u8
    }

    fn read_reg(&mut self, name: u8) -> u8 {
        match Reg::from_name(name) {
            Reg::ProgramCounter => self.pc_byte(),
            Reg::Accumulator => self.acc,
            Reg::Flag => self.flag,
            Reg::Stack => self.stack.pop(),
            Reg::General(name) => self.regs.get(name),
        }
    }

    fn write_reg(&mut self, name: u8, value: u8) {
        match Reg::from_name(name) {
            Reg::ProgramCounter => self.pc = usize::from(value),
            Reg::Accumulator => self.acc = value,
            Reg::Flag => self.flag = value,
            Reg::Stack => self.stack.push(value),
            Reg::General(name) => self.regs.set(name, value),
        }
    }

    /// Current value of register `name` as an instruction would read it, without side
    /// effects: for the stack alias this is the top entry, which is not popped.
    pub fn register(&self, name: u8) -> u8 {
        match Reg::from_name(name) {
            Reg::ProgramCounter => self.pc_byte(),
            Reg::Accumulator => self.acc,
            Reg::Flag => self.flag,
            Reg::Stack => self.stack.peek(),
            Reg::General(name) => self.regs.get(name),
        }
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn accumulator(&self) -> u8 {
        self.acc
    }

    pub fn flag(&self) -> u8 {
        self.flag
    }

    /// Address of the next opcode. May equal the memory size once execution has run off the
    /// end.
    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn memory(&self) -> &[u8] {
        self.memory.as_slice()
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn ports(&self) -> &PortBank {
        &self.ports
    }

    /// Port bank access for host setup between runs (e.g. seeding an input port).
    pub fn ports_mut(&mut self) -> &mut PortBank {
        &mut self.ports
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halted
    }

    /// Instructions executed since construction or the last [`Machine::reset`].
    pub fn executed(&self) -> u64 {
        self.retired
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    pub fn into_hooks(self) -> H {
        self.hooks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(src: &str) -> Machine {
        let mut m = Machine::from_image(src.as_bytes()).unwrap();
        m.run();
        m
    }

    #[test]
    fn stack_alias_pops_on_read_and_pushes_on_write() {
        let m = run("3=, 4=, +,,=c");
        assert_eq!(m.register(b'c'), 7);
        assert!(m.stack().is_empty());
    }

    #[test]
    fn register_inspection_does_not_pop() {
        let m = run("9=,");
        assert_eq!(m.register(b','), 9);
        assert_eq!(m.register(b','), 9);
        assert_eq!(m.stack().as_slice(), &[9]);
    }

    #[test]
    fn writing_the_flag_register_sets_the_flag() {
        let m = run("1=? 7_z");
        assert_eq!(m.flag(), 1);
        assert_eq!(m.register(b'z'), 7);
    }

    #[test]
    fn copy_into_accumulator_loads_it() {
        let m = run("5=a a=+==");
        assert_eq!(m.accumulator(), 10);
    }

    #[test]
    fn assigning_to_the_accumulator_still_clears_it() {
        let m = run("5==");
        assert_eq!(m.accumulator(), 0);
    }

    #[test]
    fn halted_machine_does_not_step_again() {
        let mut m = Machine::from_image(b"1=a$2=b").unwrap();
        assert_eq!(
            m.run(),
            RunExit::Halted {
                reason: HaltReason::Terminator,
                executed: 3
            }
        );
        assert_eq!(m.step(), StepExit::Halted(HaltReason::Terminator));
        assert_eq!(m.run().executed(), 0);
        assert_eq!(m.register(b'b'), 0);
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut m = Machine::from_image(b"'*=a 9!a").unwrap();
        m.run();
        assert_eq!(m.memory()[9], 42);
        m.reset();
        assert_eq!(m.register(b'a'), 0);
        assert_eq!(m.memory()[9], 0);
        assert_eq!(m.pc(), 0);
        assert!(!m.is_halted());
        m.run();
        assert_eq!(m.register(b'a'), 42);
    }
}
