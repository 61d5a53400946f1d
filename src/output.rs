use std::fmt::Write as _;

use crate::registers::Registers;

/// Render the register file, one line per register.
///
/// Minimal form is plain `name value` pairs, suited for blackbox tests.
pub fn format_registers(regs: &Registers, minimal: bool) -> String {
    let mut out = String::new();
    if minimal {
        for (reg, val) in regs.iter() {
            let _ = writeln!(out, "{reg} {val}");
        }
        let _ = writeln!(out, "PC {}", regs.pc());
        let _ = writeln!(out, "CC {:03b}", regs.cond().bits());
        return out;
    }

    out.push_str("\x1b[2m┌────────────────────────────────────┐\x1b[0m\n");
    out.push_str("\x1b[2m│        \x1b[3mhex     int    uint    char\x1b[0m\x1b[2m │\x1b[0m\n");
    for (reg, val) in regs.iter() {
        let _ = write!(out, "\x1b[2m│\x1b[0m \x1b[1m{reg}\x1b[0m  ");
        let _ = write!(out, "0x{:04x}  {:-6}  {:-6}", val, val as i16, val);
        let _ = write!(out, "   {}", char_display(val));
        out.push_str(" \x1b[2m│\x1b[0m\n");
    }
    let _ = write!(out, "\x1b[2m│\x1b[0m \x1b[1mPC\x1b[0m  0x{:04x}", regs.pc());
    out.push_str("                ");
    let _ = write!(out, " \x1b[1mCC\x1b[0m  {}", regs.cond());
    out.push_str(" \x1b[2m│\x1b[0m\n");
    out.push_str("\x1b[2m└────────────────────────────────────┘\x1b[0m\n");
    out
}

/// Three-column rendering of a register as a character.
fn char_display(value: u16) -> String {
    match value {
        // ASCII control characters which are arbitrarily considered significant
        0x00 => "NUL".into(),
        0x08 => "BS ".into(),
        0x09 => "HT ".into(),
        0x0a => "LF ".into(),
        0x0b => "VT ".into(),
        0x0c => "FF ".into(),
        0x0d => "CR ".into(),
        0x1b => "ESC".into(),
        0x7f => "DEL".into(),

        // Space
        0x20 => "[_]".into(),

        // Printable ASCII characters
        0x21..=0x7e => format!("{:<3}", value as u8 as char),

        // Any ASCII character not already matched (unimportant control characters)
        0x00..=0x7f => "\x1b[2m───\x1b[0m".into(),
        // Any non-ASCII character
        0x0080.. => "\x1b[2m┄┄┄\x1b[0m".into(),
    }
}
