use std::cmp::Ordering;
use std::fmt;

/// Represents the CPU registers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Register {
    R0 = 0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    /// Holds the return address after `JSR`/`JSRR`.
    R7,
}

impl Register {
    pub const ALL: [Register; 8] = [
        Register::R0,
        Register::R1,
        Register::R2,
        Register::R3,
        Register::R4,
        Register::R5,
        Register::R6,
        Register::R7,
    ];

    /// Register named by the 3-bit field starting at bit `shift`.
    #[inline]
    pub fn from_field(instr: u16, shift: u32) -> Self {
        Self::ALL[((instr >> shift) & 0b111) as usize]
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", *self as u8)
    }
}

/// Set by a subset of instructions, representing whether the result was negative, zero, or positive.
///
/// Discriminants match the `n`, `z`, `p` bits of a `BR` instruction.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flag {
    N = 0b100,
    Z = 0b010,
    P = 0b001,
}

impl Flag {
    pub fn from_value(val: u16) -> Self {
        match (val as i16).cmp(&0) {
            Ordering::Less => Flag::N,
            Ordering::Equal => Flag::Z,
            Ordering::Greater => Flag::P,
        }
    }

    #[inline]
    pub fn bits(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Flag::N => "NEG",
            Flag::Z => "ZRO",
            Flag::P => "POS",
        };
        f.write_str(name)
    }
}

/// Register file: eight general purpose registers, program counter and condition code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registers {
    reg: [u16; 8],
    pc: u16,
    /// Exactly one flag is set at any time, starting with zero to match the cleared registers.
    cond: Flag,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            reg: [0; 8],
            pc: 0,
            cond: Flag::Z,
        }
    }
}

impl Registers {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, reg: Register) -> u16 {
        self.reg[reg as usize]
    }

    #[inline]
    pub fn set(&mut self, reg: Register, val: u16) {
        self.reg[reg as usize] = val;
    }

    #[inline]
    pub fn pc(&self) -> u16 {
        self.pc
    }

    #[inline]
    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    pub fn cond(&self) -> Flag {
        self.cond
    }

    /// Recompute the condition code from the current value of `reg`.
    #[inline]
    pub fn update_flags(&mut self, reg: Register) {
        self.cond = Flag::from_value(self.get(reg));
    }

    /// Write `val` to `reg`, then update the condition code from it.
    #[inline]
    pub fn set_with_flags(&mut self, reg: Register, val: u16) {
        self.set(reg, val);
        self.update_flags(reg);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Register, u16)> + '_ {
        Register::ALL.into_iter().map(|reg| (reg, self.get(reg)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_matches_value() {
        let mut regs = Registers::new();
        #[rustfmt::skip]
        let cases = [
            (0x0000, Flag::Z),
            (0x0001, Flag::P),
            (0x7fff, Flag::P),
            (0x8000, Flag::N),
            (0xffff, Flag::N),
        ];
        for (val, expected) in cases {
            regs.set_with_flags(Register::R3, val);
            assert_eq!(regs.cond(), expected, "flag for 0x{val:04x}");
            // One-hot
            assert_eq!(regs.cond().bits().count_ones(), 1);
        }
    }

    #[test]
    fn starts_zeroed() {
        let regs = Registers::new();
        assert!(regs.iter().all(|(_, val)| val == 0));
        assert_eq!(regs.pc(), 0);
        assert_eq!(regs.cond(), Flag::Z);
    }

    #[test]
    fn register_fields() {
        // ADD R5, R2, R7
        let instr = 0b0001_101_010_0_00_111;
        assert_eq!(Register::from_field(instr, 9), Register::R5);
        assert_eq!(Register::from_field(instr, 6), Register::R2);
        assert_eq!(Register::from_field(instr, 0), Register::R7);
        assert_eq!(Register::R5.to_string(), "R5");
    }
}
