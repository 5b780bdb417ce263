//! Instruction decoding.
//!
//! [`Instruction::decode`] is the single definition of how many operand bytes each opcode
//! consumes. The engine feeds it from its fetch primitive and the disassembler from a byte
//! slice, so the two always agree on instruction boundaries.

use std::fmt;

use crate::opcode;

/// Two-operand ALU operations. The result goes to the accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
}

impl BinaryOp {
    fn from_opcode(op: u8) -> Option<Self> {
        Some(match op {
            opcode::ADD => Self::Add,
            opcode::SUB => Self::Sub,
            opcode::MUL => Self::Mul,
            opcode::DIV => Self::Div,
            opcode::REM => Self::Rem,
            opcode::AND => Self::And,
            opcode::OR => Self::Or,
            opcode::XOR => Self::Xor,
            _ => return None,
        })
    }

    pub fn opcode(self) -> u8 {
        match self {
            Self::Add => opcode::ADD,
            Self::Sub => opcode::SUB,
            Self::Mul => opcode::MUL,
            Self::Div => opcode::DIV,
            Self::Rem => opcode::REM,
            Self::And => opcode::AND,
            Self::Or => opcode::OR,
            Self::Xor => opcode::XOR,
        }
    }

    /// Evaluates the operation on 8-bit words. Division and remainder by zero yield zero.
    pub fn apply(self, lhs: u8, rhs: u8) -> u8 {
        match self {
            Self::Add => lhs.wrapping_add(rhs),
            Self::Sub => lhs.wrapping_sub(rhs),
            Self::Mul => lhs.wrapping_mul(rhs),
            Self::Div => lhs.checked_div(rhs).unwrap_or(0),
            Self::Rem => lhs.checked_rem(rhs).unwrap_or(0),
            Self::And => lhs & rhs,
            Self::Or => lhs | rhs,
            Self::Xor => lhs ^ rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDir {
    Left,
    Right,
}

impl ShiftDir {
    /// Shifts `value` by `amount` bits. Amounts of eight or more saturate to zero.
    pub fn apply(self, value: u8, amount: u8) -> u8 {
        let amount = u32::from(amount);
        match self {
            Self::Left => value.checked_shl(amount).unwrap_or(0),
            Self::Right => value.checked_shr(amount).unwrap_or(0),
        }
    }
}

/// Relational selector of a `?` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Eq,
    Ne,
    Gt,
    Lt,
    /// Unrecognised selector byte; never holds.
    Invalid(u8),
}

impl Condition {
    pub fn from_selector(selector: u8) -> Self {
        match selector {
            opcode::COND_EQ => Self::Eq,
            opcode::COND_NE => Self::Ne,
            opcode::COND_GT => Self::Gt,
            opcode::COND_LT => Self::Lt,
            other => Self::Invalid(other),
        }
    }

    pub fn selector(self) -> u8 {
        match self {
            Self::Eq => opcode::COND_EQ,
            Self::Ne => opcode::COND_NE,
            Self::Gt => opcode::COND_GT,
            Self::Lt => opcode::COND_LT,
            Self::Invalid(b) => b,
        }
    }

    /// Unsigned comparison of `lhs` (the accumulator) against `rhs`.
    pub fn holds(self, lhs: u8, rhs: u8) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Gt => lhs > rhs,
            Self::Lt => lhs < rhs,
            Self::Invalid(_) => false,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Invalid(_) => "??",
        }
    }
}

/// Addressing sub-mode of the `:` load instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// `:dgX` loads the raw byte `X`.
    Byte(u8),
    /// `:dxF` loads the value of hex digit `F`.
    Hex(u8),
    /// `:d.s` copies register `s`.
    Copy(u8),
    /// Unknown mode selector. Consumes no further operand and loads nothing.
    Invalid(u8),
}

/// One decoded instruction. Register operands are raw register-name bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// NUL or `$`.
    Halt { opcode: u8 },
    /// Layout whitespace; clears the accumulator.
    Space { opcode: u8 },
    /// Decimal digit with its value (`0..=9`).
    Digit(u8),
    /// `'c`
    CharLiteral(u8),
    /// `=d`
    Assign { dst: u8 },
    /// `:dm..`
    Load { dst: u8, mode: LoadMode },
    /// `+ab`, `-ab`, ...
    Binary { op: BinaryOp, lhs: u8, rhs: u8 },
    /// `~a`
    Not { src: u8 },
    /// `<a` / `>a`; the shift amount is the accumulator.
    Shift { dir: ShiftDir, src: u8 },
    /// `@d`
    LoadMem { dst: u8 },
    /// `!s`
    StoreMem { src: u8 },
    /// `(d`
    ReadPort { dst: u8 },
    /// `)s`
    WritePort { src: u8 },
    /// `?cb`
    Compare { cond: Condition, rhs: u8 },
    /// `_d`
    Select { dst: u8 },
    /// `.a`
    Jump { target: u8 },
    /// `;a`
    Call { target: u8 },
    /// `,`
    Return,
    /// Any other opcode `s` followed by `d`: copies register `s` into register `d`.
    Copy { src: u8, dst: u8 },
}

impl Instruction {
    /// Decodes the instruction starting with `op`, pulling operand bytes from `next`.
    ///
    /// `next` is called exactly as many times as the instruction has operands, in stream
    /// order.
    pub fn decode(op: u8, mut next: impl FnMut() -> u8) -> Self {
        if let Some(bin) = BinaryOp::from_opcode(op) {
            let lhs = next();
            let rhs = next();
            return Self::Binary { op: bin, lhs, rhs };
        }
        match op {
            opcode::NUL | opcode::HALT => Self::Halt { opcode: op },
            b'0'..=b'9' => Self::Digit(op - b'0'),
            b if opcode::is_whitespace(b) => Self::Space { opcode: op },
            opcode::CHAR_LITERAL => Self::CharLiteral(next()),
            opcode::ASSIGN => Self::Assign { dst: next() },
            opcode::LOAD => {
                let dst = next();
                let mode = match next() {
                    opcode::LOAD_MODE_BYTE => LoadMode::Byte(next()),
                    opcode::LOAD_MODE_HEX => LoadMode::Hex(next()),
                    opcode::LOAD_MODE_COPY => LoadMode::Copy(next()),
                    other => LoadMode::Invalid(other),
                };
                Self::Load { dst, mode }
            }
            opcode::NOT => Self::Not { src: next() },
            opcode::SHL => Self::Shift {
                dir: ShiftDir::Left,
                src: next(),
            },
            opcode::SHR => Self::Shift {
                dir: ShiftDir::Right,
                src: next(),
            },
            opcode::LOAD_MEM => Self::LoadMem { dst: next() },
            opcode::STORE_MEM => Self::StoreMem { src: next() },
            opcode::READ_PORT => Self::ReadPort { dst: next() },
            opcode::WRITE_PORT => Self::WritePort { src: next() },
            opcode::COMPARE => {
                let cond = Condition::from_selector(next());
                Self::Compare { cond, rhs: next() }
            }
            opcode::SELECT => Self::Select { dst: next() },
            opcode::JUMP => Self::Jump { target: next() },
            opcode::CALL => Self::Call { target: next() },
            opcode::RETURN => Self::Return,
            src => Self::Copy { src, dst: next() },
        }
    }

    /// Human-readable meaning, used as the disassembler comment column.
    pub fn describe(&self) -> String {
        match *self {
            Self::Halt { .. } => "halt".to_string(),
            Self::Space { .. } => "(whitespace) acc = 0".to_string(),
            Self::Digit(d) => format!("acc = acc*10 + {d}"),
            Self::CharLiteral(c) => format!("acc = {} ({c})", ByteLit(c)),
            Self::Assign { dst } => format!("{} = acc", reg(dst)),
            Self::Load { dst, mode } => match mode {
                LoadMode::Byte(b) => format!("{} = {} ({b})", reg(dst), ByteLit(b)),
                LoadMode::Hex(h) => {
                    let v = opcode::hex_digit_value(h);
                    format!("{} = 0x{v:X} ({v})", reg(dst))
                }
                LoadMode::Copy(src) => format!("{} = {}", reg(dst), reg(src)),
                LoadMode::Invalid(_) => "??? (invalid load mode)".to_string(),
            },
            Self::Binary { op, lhs, rhs } => format!(
                "acc = {} {} {}",
                reg(lhs),
                char::from(op.opcode()),
                reg(rhs)
            ),
            Self::Not { src } => format!("acc = ~{}", reg(src)),
            Self::Shift { dir, src } => match dir {
                ShiftDir::Left => format!("acc = {} << acc", reg(src)),
                ShiftDir::Right => format!("acc = {} >> acc", reg(src)),
            },
            Self::LoadMem { dst } => format!("{} = mem[acc]", reg(dst)),
            Self::StoreMem { src } => format!("mem[acc] = {}", reg(src)),
            Self::ReadPort { dst } => format!("{} = port[acc]", reg(dst)),
            Self::WritePort { src } => format!("port[acc] = {}", reg(src)),
            Self::Compare { cond, rhs } => match cond {
                Condition::Invalid(_) => "flag = 0 (invalid selector)".to_string(),
                _ => format!("flag = acc {} {}", cond.symbol(), reg(rhs)),
            },
            Self::Select { dst } => format!("if flag: {} = acc", reg(dst)),
            Self::Jump { target } => format!("jump to {}", reg(target)),
            Self::Call { target } => format!("call {}", reg(target)),
            Self::Return => "return".to_string(),
            Self::Copy { src, dst } => format!("{} = {} (copy)", reg(dst), reg(src)),
        }
    }
}

/// Renders the instruction back in its source form (`+ab`, `:agX`, ...).
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = Vec::with_capacity(4);
        self.encode_into(&mut out);
        for b in out {
            match b {
                0x20..=0x7E => write!(f, "{}", char::from(b))?,
                b'\t' => f.write_str("\\t")?,
                b'\n' => f.write_str("\\n")?,
                b'\r' => f.write_str("\\r")?,
                0 => f.write_str("\\0")?,
                other => write!(f, "\\x{other:02X}")?,
            }
        }
        Ok(())
    }
}

impl Instruction {
    /// Appends the encoded bytes of this instruction to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        match *self {
            Self::Halt { opcode } | Self::Space { opcode } => out.push(opcode),
            Self::Digit(d) => out.push(b'0' + d),
            Self::CharLiteral(c) => out.extend_from_slice(&[opcode::CHAR_LITERAL, c]),
            Self::Assign { dst } => out.extend_from_slice(&[opcode::ASSIGN, dst]),
            Self::Load { dst, mode } => {
                out.extend_from_slice(&[opcode::LOAD, dst]);
                match mode {
                    LoadMode::Byte(b) => out.extend_from_slice(&[opcode::LOAD_MODE_BYTE, b]),
                    LoadMode::Hex(h) => out.extend_from_slice(&[opcode::LOAD_MODE_HEX, h]),
                    LoadMode::Copy(s) => out.extend_from_slice(&[opcode::LOAD_MODE_COPY, s]),
                    LoadMode::Invalid(m) => out.push(m),
                }
            }
            Self::Binary { op, lhs, rhs } => out.extend_from_slice(&[op.opcode(), lhs, rhs]),
            Self::Not { src } => out.extend_from_slice(&[opcode::NOT, src]),
            Self::Shift { dir, src } => {
                let op = match dir {
                    ShiftDir::Left => opcode::SHL,
                    ShiftDir::Right => opcode::SHR,
                };
                out.extend_from_slice(&[op, src]);
            }
            Self::LoadMem { dst } => out.extend_from_slice(&[opcode::LOAD_MEM, dst]),
            Self::StoreMem { src } => out.extend_from_slice(&[opcode::STORE_MEM, src]),
            Self::ReadPort { dst } => out.extend_from_slice(&[opcode::READ_PORT, dst]),
            Self::WritePort { src } => out.extend_from_slice(&[opcode::WRITE_PORT, src]),
            Self::Compare { cond, rhs } => {
                out.extend_from_slice(&[opcode::COMPARE, cond.selector(), rhs])
            }
            Self::Select { dst } => out.extend_from_slice(&[opcode::SELECT, dst]),
            Self::Jump { target } => out.extend_from_slice(&[opcode::JUMP, target]),
            Self::Call { target } => out.extend_from_slice(&[opcode::CALL, target]),
            Self::Return => out.push(opcode::RETURN),
            Self::Copy { src, dst } => out.extend_from_slice(&[src, dst]),
        }
    }
}

/// Formats a register name: printable names as themselves, others as hex.
fn reg(name: u8) -> String {
    if name.is_ascii_graphic() {
        char::from(name).to_string()
    } else {
        format!("r{name:02X}")
    }
}

struct ByteLit(u8);

impl fmt::Display for ByteLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (0x20..0x7F).contains(&self.0) {
            write!(f, "'{}'", char::from(self.0))
        } else {
            write!(f, "0x{:02X}", self.0)
        }
    }
}
