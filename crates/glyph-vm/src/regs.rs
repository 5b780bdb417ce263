//! Register naming.
//!
//! All 256 byte values name a register. Four names are routed to machine state instead
//! of a storage cell; [`Reg::from_name`] performs that classification once per access.

/// Register that holds the address of the next opcode.
pub const PC: u8 = b'.';
/// Register that holds the last comparison result.
pub const FLAG: u8 = b'?';
/// Register that holds the pending literal/ALU value.
pub const ACC: u8 = b'=';
/// Register alias for the stack: reads pop, writes push.
pub const STACK: u8 = b',';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    ProgramCounter,
    Accumulator,
    Flag,
    Stack,
    General(u8),
}

impl Reg {
    pub fn from_name(name: u8) -> Self {
        match name {
            PC => Self::ProgramCounter,
            ACC => Self::Accumulator,
            FLAG => Self::Flag,
            STACK => Self::Stack,
            other => Self::General(other),
        }
    }
}

/// Backing cells for the general-purpose registers.
///
/// Indexed by the raw register name, so every access is in bounds by construction. The
/// cells behind the special names exist but are never reached through [`Reg`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    cells: [u8; 256],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self { cells: [0; 256] }
    }
}

impl RegisterFile {
    pub fn get(&self, name: u8) -> u8 {
        self.cells[usize::from(name)]
    }

    pub fn set(&mut self, name: u8, value: u8) {
        self.cells[usize::from(name)] = value;
    }

    /// Non-zero general-purpose registers in name order.
    pub fn non_zero(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        (0..=u8::MAX)
            .filter(|&name| matches!(Reg::from_name(name), Reg::General(_)))
            .map(|name| (name, self.get(name)))
            .filter(|&(_, value)| value != 0)
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }
}
