use std::{error::Error, fmt, io};

use crate::instruction::Opcode;

/// Condition which stops the machine. None of these can be recovered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// Opcode has no handler. Unreachable with the 16-entry opcode table.
    UnknownOpcode { addr: u16, instr: u16 },
    /// `RTI` or `RES`.
    ReservedOpcode {
        addr: u16,
        instr: u16,
        opcode: Opcode,
    },
    UnknownTrap { addr: u16, vector: u8 },
    /// Only possible with a [`Memory`](crate::Memory) smaller than the address space.
    AddressOutOfBounds { address: u16, size: usize },
}

/// Failure to read or place a program image.
#[derive(Debug)]
pub enum ImageError {
    Io(io::Error),
    Unaligned { len: usize },
    TooLarge { words: usize, capacity: usize },
}

impl Error for RunError {}

impl Error for ImageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ImageError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOpcode { addr, instr } => write!(
                f,
                "Unknown operation {:#x} in instruction 0x{instr:04x} at address 0x{addr:04x}",
                instr >> 12,
            ),
            Self::ReservedOpcode {
                addr,
                instr,
                opcode,
            } => write!(
                f,
                "Reserved operation {opcode} in instruction 0x{instr:04x} at address 0x{addr:04x}",
            ),
            Self::UnknownTrap { addr, vector } => write!(
                f,
                "Unknown trap vector 0x{vector:02x} at address 0x{addr:04x}",
            ),
            Self::AddressOutOfBounds { address, size } => write!(
                f,
                "Memory address 0x{address:04x} is out of bounds for memory of {size} cells",
            ),
        }
    }
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "Failed to read program image: {err}"),
            Self::Unaligned { len } => write!(
                f,
                "Program image is not aligned to 16 bits ({len} bytes)",
            ),
            Self::TooLarge { words, capacity } => write!(
                f,
                "Program image of {words} words does not fit in the {capacity} words after the origin",
            ),
        }
    }
}
