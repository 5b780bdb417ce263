//! Opcode and selector bytes.
//!
//! Opcodes are plain characters so programs can be written in a text editor. Any byte not
//! listed here (other than NUL, whitespace and the decimal digits) is a fallback register
//! copy: the opcode itself names the source register.

pub const NUL: u8 = 0x00;
pub const HALT: u8 = b'$';

pub const CHAR_LITERAL: u8 = b'\'';
pub const ASSIGN: u8 = b'=';
pub const LOAD: u8 = b':';

pub const ADD: u8 = b'+';
pub const SUB: u8 = b'-';
pub const MUL: u8 = b'*';
pub const DIV: u8 = b'/';
pub const REM: u8 = b'%';
pub const AND: u8 = b'&';
pub const OR: u8 = b'|';
pub const XOR: u8 = b'^';
pub const NOT: u8 = b'~';
pub const SHL: u8 = b'<';
pub const SHR: u8 = b'>';

pub const LOAD_MEM: u8 = b'@';
pub const STORE_MEM: u8 = b'!';
pub const READ_PORT: u8 = b'(';
pub const WRITE_PORT: u8 = b')';

pub const COMPARE: u8 = b'?';
pub const SELECT: u8 = b'_';
pub const JUMP: u8 = b'.';
pub const CALL: u8 = b';';
pub const RETURN: u8 = b',';

/// `:` sub-modes.
pub const LOAD_MODE_BYTE: u8 = b'g';
pub const LOAD_MODE_HEX: u8 = b'x';
pub const LOAD_MODE_COPY: u8 = b'.';

/// `?` relational selectors.
pub const COND_EQ: u8 = b'=';
pub const COND_NE: u8 = b'!';
pub const COND_GT: u8 = b'>';
pub const COND_LT: u8 = b'<';

/// Layout whitespace: a no-op apart from clearing the accumulator.
pub fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

/// Maps a hex digit character to its value (`'0'..='9'`, case-insensitive `'a'..='f'`).
///
/// Other bytes are not rejected; they map through the same wrapping arithmetic, so `:` never
/// needs an error path.
pub fn hex_digit_value(byte: u8) -> u8 {
    if byte <= b'9' {
        byte.wrapping_sub(b'0')
    } else {
        (byte | 0x20).wrapping_sub(b'a').wrapping_add(10)
    }
}
