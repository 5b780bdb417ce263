//! Disassembler for Glyph program images.
//!
//! Instruction boundaries come from [`Instruction::decode`], the same routine the engine
//! dispatches through. An instruction cut off by the end of the image is decoded with NUL
//! operands, which is exactly what the engine would see before halting.
//!
//! Addresses are 16 bits wide and wrap past `0xFFFF`; callers listing larger inputs are
//! expected to reject them.

use std::fmt::Write as _;

use crate::insn::Instruction;

/// One instruction located in an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedInsn<'a> {
    /// Load address of the opcode byte.
    pub addr: u16,
    /// Raw bytes present in the image (shorter than the encoding when truncated).
    pub bytes: &'a [u8],
    pub insn: Instruction,
    /// The image ended before all operands were read.
    pub truncated: bool,
}

/// Iterator over the instructions of an image loaded at `base`.
#[derive(Debug, Clone)]
pub struct Disassembler<'a> {
    data: &'a [u8],
    pos: usize,
    base: u16,
}

impl<'a> Disassembler<'a> {
    pub fn new(data: &'a [u8], base: u16) -> Self {
        Self { data, pos: 0, base }
    }

    /// Offset of the next undecoded byte.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for Disassembler<'a> {
    type Item = DecodedInsn<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let data = self.data;
        let op = *data.get(start)?;

        let mut pos = start + 1;
        let mut truncated = false;
        let insn = Instruction::decode(op, || match data.get(pos) {
            Some(&b) => {
                pos += 1;
                b
            }
            None => {
                truncated = true;
                0
            }
        });

        self.pos = pos;
        Some(DecodedInsn {
            addr: self.base.wrapping_add(start as u16),
            bytes: &data[start..pos],
            insn,
            truncated,
        })
    }
}

/// Formats a single listing line: `AAAA: <source>  ; <meaning>`.
pub fn format_line(decoded: &DecodedInsn<'_>) -> String {
    let mut line = format!(
        "{:04X}: {:<9} ; {}",
        decoded.addr,
        decoded.insn.to_string(),
        decoded.insn.describe()
    );
    if decoded.truncated {
        line.push_str(" (truncated)");
    }
    line
}

/// Renders a full disassembly listing with header and footer.
pub fn render(data: &[u8], base: u16) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "; Glyph disassembly - {} bytes", data.len());
    let _ = writeln!(out, "; Base address: 0x{base:04X}");
    out.push('\n');

    let mut dis = Disassembler::new(data, base);
    for decoded in dis.by_ref() {
        out.push_str(&format_line(&decoded));
        out.push('\n');
    }

    let end = base.wrapping_add(dis.position() as u16);
    let _ = writeln!(out, "\n; End at 0x{end:04X}");
    out
}
