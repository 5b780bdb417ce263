#![forbid(unsafe_code)]

//! Glyph: a byte-code virtual machine whose instruction stream is printable text.
//!
//! Every opcode is a single character and every operand byte is the literal name of a
//! register, so `5=a 3=b +ab=c` is both the source and the machine code of a program that
//! leaves `8` in register `c`. The crate is organised around [`Machine`], which owns the
//! register file, memory, stack and port bank for a single program run:
//!
//! - [`insn`] decodes one instruction from a byte source; the engine and the
//!   disassembler share it, so operand arities are defined in exactly one place.
//! - [`machine`] is the fetch/decode/execute loop.
//! - [`ports`] is the device-register bank plus the [`PortHooks`] host interface.
//! - [`disasm`] and [`listing`] are read-only tools over program images.
//!
//! Nothing in the engine reports errors while running. Arithmetic wraps, division by
//! zero yields zero, addresses wrap modulo their container and running off the end of
//! memory halts the machine.

pub mod config;
pub mod disasm;
pub mod error;
pub mod insn;
pub mod listing;
pub mod machine;
pub mod memory;
pub mod opcode;
pub mod ports;
pub mod regs;
pub mod stack;

pub use config::MachineConfig;
pub use error::{MachineError, Result};
pub use insn::{BinaryOp, Condition, Instruction, LoadMode, ShiftDir};
pub use machine::{HaltReason, Machine, RunExit, StepExit};
pub use ports::{NoHooks, PortBank, PortHooks};
pub use regs::Reg;
