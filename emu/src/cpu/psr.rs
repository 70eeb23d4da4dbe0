//! # Program Status Registers (CPSR and SPSR)
//!
//! ```text
//! 31 30 29 28 27      8 7 6 5 4   0
//! ┌──┬──┬──┬──┬────────┬─┬─┬─┬─────┐
//! │N │Z │C │V │Reserved│I│F│T│Mode │
//! └──┴──┴──┴──┴────────┴─┴─┴─┴─────┘
//! ```
//!
//! - **Flags (28-31)**: tested by [`Condition`] predicates
//! - **I/F bits (6-7)**: IRQ/FIQ disable
//! - **T bit (5)**: ARM (0) or THUMB (1) state
//! - **Mode (0-4)**: see [`Mode`](super::mode::Mode)
//!
//! The remaining bits are unused in this profile but preserved on
//! read/write. Each exception mode has a SPSR that receives the CPSR on
//! exception entry; see `register_bank`.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::{condition::Condition, mode::Mode};
use crate::error::StateError;

/// A program status register (CPSR or SPSR), wrapping the raw `u32`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psr(u32);

impl Psr {
    /// Whether an instruction with the given condition executes under the
    /// current flags.
    #[must_use]
    pub fn can_execute(self, cond: Condition) -> bool {
        use Condition::{AL, CC, CS, EQ, GE, GT, HI, LE, LS, LT, MI, NE, NV, PL, VC, VS};
        match cond {
            EQ => self.zero_flag(),
            NE => !self.zero_flag(),
            CS => self.carry_flag(),
            CC => !self.carry_flag(),
            MI => self.sign_flag(),
            PL => !self.sign_flag(),
            VS => self.overflow_flag(),
            VC => !self.overflow_flag(),
            HI => self.carry_flag() && !self.zero_flag(),
            LS => !self.carry_flag() || self.zero_flag(),
            GE => self.sign_flag() == self.overflow_flag(),
            LT => self.sign_flag() != self.overflow_flag(),
            GT => !self.zero_flag() && (self.sign_flag() == self.overflow_flag()),
            LE => self.zero_flag() || (self.sign_flag() != self.overflow_flag()),
            AL => true,
            // Reserved since ARMv3; never executes here.
            NV => false,
        }
    }

    /// N => Bit 31, (0=Not Signed, 1=Signed)
    #[must_use]
    pub fn sign_flag(self) -> bool {
        self.0.get_bit(31)
    }

    /// Z => Bit 30, (0=Not Zero, 1=Zero)
    #[must_use]
    pub fn zero_flag(self) -> bool {
        self.0.get_bit(30)
    }

    /// C => Bit 29, (0=Borrow/No Carry, 1=Carry/No Borrow)
    #[must_use]
    pub fn carry_flag(self) -> bool {
        self.0.get_bit(29)
    }

    /// V => Bit 28, (0=No Overflow, 1=Overflow)
    #[must_use]
    pub fn overflow_flag(self) -> bool {
        self.0.get_bit(28)
    }

    /// I => Bit 7, (0=Enable, 1=Disable)
    #[must_use]
    pub fn irq_disable(self) -> bool {
        self.0.get_bit(7)
    }

    /// F => Bit 6, (0=Enable, 1=Disable)
    #[must_use]
    pub fn fiq_disable(self) -> bool {
        self.0.get_bit(6)
    }

    /// T => Bit 5, (0=ARM, 1=THUMB)
    #[must_use]
    pub fn state_bit(self) -> bool {
        self.0.get_bit(5)
    }

    /// M4-M0 => Bits 4-0.
    ///
    /// The CPSR is kept valid by construction, but a SPSR written through
    /// the raw accessors may hold garbage mode bits; this falls back to
    /// Supervisor with a diagnostic rather than failing an infallible path.
    #[must_use]
    pub fn mode(self) -> Mode {
        self.checked_mode().unwrap_or_else(|_| {
            logger::warn(format!(
                "invalid mode bits 0b{:05b} in PSR 0x{:08x}, defaulting to Supervisor",
                self.0 & 0x1f,
                self.0
            ));
            Mode::Supervisor
        })
    }

    /// Like [`Self::mode`], but surfaces invalid mode bits as an error.
    pub fn checked_mode(self) -> Result<Mode, StateError> {
        Mode::try_from(self.0 & 0x1f)
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.0.set_bit(31, value);
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.0.set_bit(30, value);
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.0.set_bit(29, value);
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.0.set_bit(28, value);
    }

    pub fn set_irq_disable(&mut self, value: bool) {
        self.0.set_bit(7, value);
    }

    pub fn set_fiq_disable(&mut self, value: bool) {
        self.0.set_bit(6, value);
    }

    pub fn set_state_bit(&mut self, value: bool) {
        self.0.set_bit(5, value);
    }

    /// The mode bits M4-M0.
    pub fn set_mode(&mut self, m: Mode) {
        self.0 = (self.0 & !0x1f) | m as u32;
    }

    #[must_use]
    pub fn cpu_state(self) -> CpuState {
        self.state_bit().into()
    }

    pub fn set_cpu_state(&mut self, state: CpuState) {
        self.set_state_bit(state.into());
    }
}

impl From<Mode> for Psr {
    fn from(m: Mode) -> Self {
        Self(m as u32)
    }
}

impl From<u32> for Psr {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Psr> for u32 {
    fn from(p: Psr) -> Self {
        p.0
    }
}

/// The execution state (ARM or THUMB), controlled by the T bit.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CpuState {
    /// THUMB: 16-bit instructions.
    Thumb,
    /// ARM: 32-bit instructions.
    Arm,
}

impl From<CpuState> for bool {
    fn from(state: CpuState) -> Self {
        match state {
            CpuState::Arm => false,
            CpuState::Thumb => true,
        }
    }
}

impl From<bool> for CpuState {
    fn from(state: bool) -> Self {
        if state {
            Self::Thumb
        } else {
            Self::Arm
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flag_accessors() {
        let mut cpsr = Psr::default();
        cpsr.set_sign_flag(true);
        assert!(cpsr.sign_flag());
        cpsr.set_zero_flag(true);
        assert!(cpsr.zero_flag());
        cpsr.set_carry_flag(true);
        assert!(cpsr.carry_flag());
        cpsr.set_overflow_flag(true);
        assert!(cpsr.overflow_flag());

        assert_eq!(u32::from(cpsr) >> 28, 0b1111);
    }

    #[test]
    fn control_bits() {
        let mut cpsr = Psr::default();
        cpsr.set_irq_disable(true);
        assert!(cpsr.irq_disable());
        cpsr.set_fiq_disable(true);
        assert!(cpsr.fiq_disable());
        cpsr.set_state_bit(true);
        assert!(cpsr.state_bit());
        assert_eq!(cpsr.cpu_state(), CpuState::Thumb);
    }

    #[test]
    fn mode_bits() {
        let mut cpsr = Psr::from(Mode::User);
        assert_eq!(cpsr.mode(), Mode::User);

        cpsr.set_mode(Mode::Fiq);
        assert_eq!(u32::from(cpsr) & 0x1f, 0x11);

        cpsr.set_sign_flag(true);
        cpsr.set_mode(Mode::System);
        assert_eq!(cpsr.mode(), Mode::System);
        assert!(cpsr.sign_flag());
    }

    #[test]
    fn invalid_mode_bits_are_detected() {
        let psr = Psr::from(0b00011_u32);
        assert_eq!(psr.checked_mode(), Err(StateError::InvalidMode(0b00011)));
    }

    #[test]
    fn condition_predicates() {
        let mut psr = Psr::default();

        psr.set_zero_flag(true);
        assert!(psr.can_execute(Condition::EQ));
        assert!(!psr.can_execute(Condition::NE));
        assert!(!psr.can_execute(Condition::GT));
        assert!(psr.can_execute(Condition::LE));

        psr.set_zero_flag(false);
        psr.set_sign_flag(true);
        psr.set_overflow_flag(true);
        assert!(psr.can_execute(Condition::GE));
        assert!(psr.can_execute(Condition::GT));
        assert!(!psr.can_execute(Condition::LT));

        psr.set_overflow_flag(false);
        assert!(psr.can_execute(Condition::LT));
        assert!(psr.can_execute(Condition::MI));

        psr.set_carry_flag(true);
        assert!(psr.can_execute(Condition::CS));
        assert!(psr.can_execute(Condition::HI));
        psr.set_zero_flag(true);
        assert!(!psr.can_execute(Condition::HI));
        assert!(psr.can_execute(Condition::LS));

        assert!(psr.can_execute(Condition::AL));
        assert!(!psr.can_execute(Condition::NV));
    }
}
