//! # Processor Operating Modes
//!
//! The core has **seven operating modes**, stored in bits 4-0 of the CPSR.
//!
//! ```text
//! ┌─────────────┬──────────┬───────────────────────────────────────────────┐
//! │    Mode     │ Encoding │                  Purpose                      │
//! ├─────────────┼──────────┼───────────────────────────────────────────────┤
//! │ User        │  0x10    │ Normal program execution (unprivileged)       │
//! │ FIQ         │  0x11    │ Fast interrupt handling                       │
//! │ IRQ         │  0x12    │ General interrupt handling                    │
//! │ Supervisor  │  0x13    │ Protected mode (software interrupt)           │
//! │ Abort       │  0x17    │ Memory access failures                        │
//! │ Undefined   │  0x1b    │ Undefined instruction handling                │
//! │ System      │  0x1f    │ Privileged mode sharing User registers        │
//! └─────────────┴──────────┴───────────────────────────────────────────────┘
//! ```
//!
//! Every mode except User and System is an exception mode with its own
//! banked r13/r14 and a SPSR; FIQ additionally banks r8-r12. Any encoded
//! value outside the table is invalid.

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// The processor operating mode, stored in bits 4-0 of the CPSR/SPSR.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Mode {
    /// Normal program execution (unprivileged). Cannot modify the
    /// privileged CPSR bits and has no SPSR.
    User = 0x10,

    /// Fast Interrupt Request mode. Banks r8-r14 for minimal context-save
    /// overhead.
    Fiq = 0x11,

    /// Interrupt Request mode.
    Irq = 0x12,

    /// Supervisor mode, entered via reset or SWI.
    Supervisor = 0x13,

    /// Abort mode, entered after a failed memory access.
    Abort = 0x17,

    /// Undefined instruction mode.
    Undefined = 0x1b,

    /// Privileged, but shares the User register bank and has no SPSR.
    System = 0x1f,
}

impl Mode {
    /// Whether this mode owns a banked SPSR (every mode except User and
    /// System).
    #[must_use]
    pub const fn has_spsr(self) -> bool {
        !matches!(self, Self::User | Self::System)
    }
}

impl From<Mode> for u32 {
    fn from(m: Mode) -> Self {
        m as Self
    }
}

impl TryFrom<u32> for Mode {
    type Error = StateError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        match n {
            0x10 => Ok(Self::User),
            0x11 => Ok(Self::Fiq),
            0x12 => Ok(Self::Irq),
            0x13 => Ok(Self::Supervisor),
            0x17 => Ok(Self::Abort),
            0x1b => Ok(Self::Undefined),
            0x1f => Ok(Self::System),
            _ => Err(StateError::InvalidMode(n)),
        }
    }
}
