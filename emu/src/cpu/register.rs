use serde::{Deserialize, Serialize};

/// A register designator: one of the 16 addressable slots r0-r15.
///
/// Semantically just an index; r13, r14 and r15 render as `sp`, `lr` and
/// `pc` in mnemonics by convention. Constructed from raw encoding fields
/// with the value masked to 4 bits, so a `Register` is always valid.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct Register(u8);

impl Register {
    /// Stack pointer (r13) by convention.
    pub const SP: Self = Self(13);

    /// Link register (r14).
    pub const LR: Self = Self(14);

    /// Program counter (r15).
    pub const PC: Self = Self(15);

    #[must_use]
    pub const fn number(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn is_pc(self) -> bool {
        self.0 == 15
    }
}

impl From<u8> for Register {
    fn from(number: u8) -> Self {
        Self(number & 0xf)
    }
}

impl From<u16> for Register {
    fn from(number: u16) -> Self {
        Self((number & 0xf) as u8)
    }
}

impl From<u32> for Register {
    fn from(number: u32) -> Self {
        Self((number & 0xf) as u8)
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            13 => f.write_str("sp"),
            14 => f.write_str("lr"),
            15 => f.write_str("pc"),
            n => write!(f, "r{n}"),
        }
    }
}
