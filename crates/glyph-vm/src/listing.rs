//! Address listing: shows the load address of every byte of an image, which is what
//! jump and call targets have to be computed from.

use std::fmt::Write as _;

const COLUMNS: usize = 4;
const RULE: &str =
    "----------------------------------------------------------------------";

/// Renders `data` as rows of `ADDR HEX CHR` cells, four per row, starting at `base`.
/// Non-printable bytes show as `.` in the character column.
/// Addresses wrap past `0xFFFF`.
pub fn render(data: &[u8], base: u16) -> String {
    let mut out = String::new();
    out.push_str("ADDR  HEX  CHR  | ADDR  HEX  CHR  | ADDR  HEX  CHR  | ADDR  HEX  CHR\n");
    out.push_str(RULE);
    out.push('\n');

    for (row_idx, row) in data.chunks(COLUMNS).enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(col, &byte)| {
                let addr = base.wrapping_add((row_idx * COLUMNS + col) as u16);
                let shown = if (0x20..0x7F).contains(&byte) {
                    char::from(byte)
                } else {
                    '.'
                };
                format!("{addr:04X}  {byte:02X}   '{shown}'")
            })
            .collect();
        out.push_str(&cells.join("  | "));
        out.push('\n');
    }

    out.push_str(RULE);
    out.push('\n');
    let last = base.wrapping_add(data.len() as u16).wrapping_sub(1);
    let _ = writeln!(
        out,
        "Total: {} bytes (0x{base:04X} - 0x{last:04X})",
        data.len()
    );
    out
}
