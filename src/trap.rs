use std::fmt;

/// Built-in console services reachable through `TRAP`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TrapVector {
    /// Read one character into R0, without echo.
    Getc = 0x20,
    /// Write the low byte of R0.
    Out = 0x21,
    /// Write the string of one-character words at R0.
    Puts = 0x22,
    /// Prompt, then read and echo one character into R0.
    In = 0x23,
    /// Write the string of two-character words at R0.
    Putsp = 0x24,
    /// Stop the machine.
    Halt = 0x25,
}

impl TrapVector {
    pub fn name(self) -> &'static str {
        match self {
            Self::Getc => "GETC",
            Self::Out => "OUT",
            Self::Puts => "PUTS",
            Self::In => "IN",
            Self::Putsp => "PUTSP",
            Self::Halt => "HALT",
        }
    }
}

impl TryFrom<u8> for TrapVector {
    type Error = u8;
    fn try_from(vector: u8) -> Result<Self, Self::Error> {
        Ok(match vector {
            0x20 => Self::Getc,
            0x21 => Self::Out,
            0x22 => Self::Puts,
            0x23 => Self::In,
            0x24 => Self::Putsp,
            0x25 => Self::Halt,
            _ => return Err(vector),
        })
    }
}

impl fmt::Display for TrapVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_vectors() {
        for vector in 0x20..=0x25u8 {
            let trap = TrapVector::try_from(vector).expect("canonical vector");
            assert_eq!(trap as u8, vector);
        }
        assert_eq!(TrapVector::try_from(0x25), Ok(TrapVector::Halt));
        assert_eq!(TrapVector::try_from(0x1f), Err(0x1f));
        assert_eq!(TrapVector::try_from(0x99), Err(0x99));
    }
}
