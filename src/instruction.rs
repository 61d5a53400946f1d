use std::fmt;

use crate::registers::Register;
use crate::trap::TrapVector;

/// Widen the low `bits` bits of `val` to 16 bits, replicating the sign bit.
#[inline]
pub fn sign_extend(val: u16, bits: u32) -> u16 {
    debug_assert!(bits > 0 && bits < 16);
    // Bits lower than and including sign bit
    let field = val & ((1u16 << bits) - 1);
    if (field >> (bits - 1)) & 1 == 1 {
        field | (0xFFFF << bits)
    } else {
        field
    }
}

/// High nibble of an instruction word.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Opcode {
    Br = 0x0,
    Add = 0x1,
    Ld = 0x2,
    St = 0x3,
    Jsr = 0x4,
    And = 0x5,
    Ldr = 0x6,
    Str = 0x7,
    Rti = 0x8,
    Not = 0x9,
    Ldi = 0xA,
    Sti = 0xB,
    Jmp = 0xC,
    Res = 0xD,
    Lea = 0xE,
    Trap = 0xF,
}

impl Opcode {
    const TABLE: [Opcode; 16] = [
        Opcode::Br,
        Opcode::Add,
        Opcode::Ld,
        Opcode::St,
        Opcode::Jsr,
        Opcode::And,
        Opcode::Ldr,
        Opcode::Str,
        Opcode::Rti,
        Opcode::Not,
        Opcode::Ldi,
        Opcode::Sti,
        Opcode::Jmp,
        Opcode::Res,
        Opcode::Lea,
        Opcode::Trap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Br => "BR",
            Opcode::Add => "ADD",
            Opcode::Ld => "LD",
            Opcode::St => "ST",
            Opcode::Jsr => "JSR",
            Opcode::And => "AND",
            Opcode::Ldr => "LDR",
            Opcode::Str => "STR",
            Opcode::Rti => "RTI",
            Opcode::Not => "NOT",
            Opcode::Ldi => "LDI",
            Opcode::Sti => "STI",
            Opcode::Jmp => "JMP",
            Opcode::Res => "RES",
            Opcode::Lea => "LEA",
            Opcode::Trap => "TRAP",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = u8;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::TABLE.get(value as usize).copied().ok_or(value)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Second operand of `ADD` and `AND`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operand {
    Reg(Register),
    /// Already sign-extended.
    Imm(u16),
}

/// A decoded instruction word.
///
/// Every offset and immediate is stored sign-extended to 16 bits.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Instruction {
    /// Add SR (source register) with operand and store in DR (destination register)
    Add {
        dest_r: Register,
        src_r: Register,
        operand: Operand,
    },
    /// Bitwise-and SR with operand and store in DR
    And {
        dest_r: Register,
        src_r: Register,
        operand: Operand,
    },
    Not {
        dest_r: Register,
        src_r: Register,
    },
    /// Load value directly from a PC-relative address into DR
    Ld {
        dest_r: Register,
        pc_offset9: u16,
    },
    /// Load value from the address stored at a PC-relative address
    Ldi {
        dest_r: Register,
        pc_offset9: u16,
    },
    Ldr {
        dest_r: Register,
        base_r: Register,
        offset6: u16,
    },
    /// Load the PC-relative address itself
    Lea {
        dest_r: Register,
        pc_offset9: u16,
    },
    St {
        src_r: Register,
        pc_offset9: u16,
    },
    Sti {
        src_r: Register,
        pc_offset9: u16,
    },
    Str {
        src_r: Register,
        base_r: Register,
        offset6: u16,
    },
    /// Branch if any flag in `mask` (`n`, `z`, `p` bits) is set
    Br {
        mask: u16,
        pc_offset9: u16,
    },
    /// Set PC to BR. `JMP R7` is `RET`.
    Jmp {
        base_r: Register,
    },
    /// Store return address in R7 and jump PC-relative
    Jsr {
        pc_offset11: u16,
    },
    /// Store return address in R7 and jump to subroutine stored at BR
    Jsrr {
        base_r: Register,
    },
    Trap {
        vector: u8,
    },
    /// `RTI` or `RES`, neither of which is implemented by the architecture.
    Reserved {
        opcode: Opcode,
    },
}

impl Instruction {
    /// `None` only if the opcode has no entry in the table.
    pub fn decode(instr: u16) -> Option<Self> {
        let opcode = Opcode::try_from((instr >> 12) as u8).ok()?;
        let dest_r = Register::from_field(instr, 9);
        let base_r = Register::from_field(instr, 6);
        let pc_offset9 = sign_extend(instr, 9);
        let offset6 = sign_extend(instr, 6);

        let instruction = match opcode {
            Opcode::Add | Opcode::And => {
                // Check if imm
                let operand = if instr & 0b100000 == 0 {
                    Operand::Reg(Register::from_field(instr, 0))
                } else {
                    Operand::Imm(sign_extend(instr, 5))
                };
                if opcode == Opcode::Add {
                    Self::Add {
                        dest_r,
                        src_r: base_r,
                        operand,
                    }
                } else {
                    Self::And {
                        dest_r,
                        src_r: base_r,
                        operand,
                    }
                }
            }
            Opcode::Not => Self::Not {
                dest_r,
                src_r: base_r,
            },
            Opcode::Ld => Self::Ld { dest_r, pc_offset9 },
            Opcode::Ldi => Self::Ldi { dest_r, pc_offset9 },
            Opcode::Ldr => Self::Ldr {
                dest_r,
                base_r,
                offset6,
            },
            Opcode::Lea => Self::Lea { dest_r, pc_offset9 },
            Opcode::St => Self::St {
                src_r: dest_r,
                pc_offset9,
            },
            Opcode::Sti => Self::Sti {
                src_r: dest_r,
                pc_offset9,
            },
            Opcode::Str => Self::Str {
                src_r: dest_r,
                base_r,
                offset6,
            },
            Opcode::Br => Self::Br {
                mask: (instr >> 9) & 0b111,
                pc_offset9,
            },
            Opcode::Jmp => Self::Jmp { base_r },
            Opcode::Jsr => {
                if instr & 0x800 == 0 {
                    Self::Jsrr { base_r }
                } else {
                    Self::Jsr {
                        pc_offset11: sign_extend(instr, 11),
                    }
                }
            }
            Opcode::Trap => Self::Trap {
                vector: (instr & 0xFF) as u8,
            },
            Opcode::Rti | Opcode::Res => Self::Reserved { opcode },
        };
        Some(instruction)
    }

    /// Whether executing this instruction recomputes the condition code.
    pub fn sets_flags(&self) -> bool {
        matches!(
            self,
            Self::Add { .. }
                | Self::And { .. }
                | Self::Not { .. }
                | Self::Ld { .. }
                | Self::Ldi { .. }
                | Self::Ldr { .. }
                | Self::Lea { .. }
        )
    }
}

/// Signed decimal form used for offsets and immediates.
struct Imm(u16);

impl fmt::Display for Imm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0 as i16)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg) => write!(f, "{reg}"),
            Operand::Imm(val) => write!(f, "{}", Imm(*val)),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Add {
                dest_r,
                src_r,
                operand,
            } => write!(f, "ADD {dest_r}, {src_r}, {operand}"),
            Self::And {
                dest_r,
                src_r,
                operand,
            } => write!(f, "AND {dest_r}, {src_r}, {operand}"),
            Self::Not { dest_r, src_r } => write!(f, "NOT {dest_r}, {src_r}"),
            Self::Ld { dest_r, pc_offset9 } => write!(f, "LD {dest_r}, {}", Imm(pc_offset9)),
            Self::Ldi { dest_r, pc_offset9 } => write!(f, "LDI {dest_r}, {}", Imm(pc_offset9)),
            Self::Ldr {
                dest_r,
                base_r,
                offset6,
            } => write!(f, "LDR {dest_r}, {base_r}, {}", Imm(offset6)),
            Self::Lea { dest_r, pc_offset9 } => write!(f, "LEA {dest_r}, {}", Imm(pc_offset9)),
            Self::St { src_r, pc_offset9 } => write!(f, "ST {src_r}, {}", Imm(pc_offset9)),
            Self::Sti { src_r, pc_offset9 } => write!(f, "STI {src_r}, {}", Imm(pc_offset9)),
            Self::Str {
                src_r,
                base_r,
                offset6,
            } => write!(f, "STR {src_r}, {base_r}, {}", Imm(offset6)),
            // Never branches
            Self::Br { mask: 0, .. } => write!(f, "NOP"),
            Self::Br { mask, pc_offset9 } => {
                write!(f, "BR")?;
                for (bit, name) in [(0b100, 'n'), (0b010, 'z'), (0b001, 'p')] {
                    if mask & bit != 0 {
                        write!(f, "{name}")?;
                    }
                }
                write!(f, " {}", Imm(pc_offset9))
            }
            Self::Jmp {
                base_r: Register::R7,
            } => write!(f, "RET"),
            Self::Jmp { base_r } => write!(f, "JMP {base_r}"),
            Self::Jsr { pc_offset11 } => write!(f, "JSR {}", Imm(pc_offset11)),
            Self::Jsrr { base_r } => write!(f, "JSRR {base_r}"),
            Self::Trap { vector } => match TrapVector::try_from(vector) {
                Ok(trap) => write!(f, "{trap}"),
                Err(vector) => write!(f, "TRAP x{vector:02X}"),
            },
            Self::Reserved { opcode } => write!(f, "{opcode}"),
        }
    }
}
