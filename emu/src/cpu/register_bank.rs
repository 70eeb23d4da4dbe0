//! # Banked Registers for Exception Modes
//!
//! When the processor switches modes, some register numbers resolve to
//! different physical slots:
//!
//! ```text
//! Register │ User/Sys │  FIQ   │  IRQ   │  SVC   │ Abort  │ Undef  │
//! ─────────┼──────────┼────────┼────────┼────────┼────────┼────────┤
//!   r0-r7  │  r0-r7   │ r0-r7  │ r0-r7  │ r0-r7  │ r0-r7  │ r0-r7  │
//!   r8-r12 │  r8-r12  │ banked │ r8-r12 │ r8-r12 │ r8-r12 │ r8-r12 │
//!   r13    │  r13     │ banked │ banked │ banked │ banked │ banked │
//!   r14    │  r14     │ banked │ banked │ banked │ banked │ banked │
//!   r15    │  r15     │  r15   │  r15   │  r15   │  r15   │  r15   │
//!   SPSR   │   ---    │ banked │ banked │ banked │ banked │ banked │
//! ```
//!
//! The slots live here; resolution happens at access time, so the current
//! register file always holds the User bank for r8-r14 and the banked
//! values survive mode switches untouched.

use serde::{Deserialize, Serialize};

use crate::cpu::mode::Mode;
use crate::cpu::psr::Psr;
use crate::error::StateError;

/// Storage for the registers that are banked per mode.
#[derive(Default, Serialize, Deserialize)]
pub(crate) struct RegisterBank {
    // FIQ banks r8-r14.
    pub r8_fiq: u32,
    pub r9_fiq: u32,
    pub r10_fiq: u32,
    pub r11_fiq: u32,
    pub r12_fiq: u32,
    pub r13_fiq: u32,
    pub r14_fiq: u32,

    // The remaining exception modes bank r13-r14 only.
    pub r13_svc: u32,
    pub r14_svc: u32,
    pub r13_abt: u32,
    pub r14_abt: u32,
    pub r13_irq: u32,
    pub r14_irq: u32,
    pub r13_und: u32,
    pub r14_und: u32,

    // One saved program status register per exception mode.
    pub spsr_fiq: Psr,
    pub spsr_svc: Psr,
    pub spsr_abt: Psr,
    pub spsr_irq: Psr,
    pub spsr_und: Psr,
}

impl RegisterBank {
    /// The banked slot backing register `number` in `mode`, or `None` when
    /// the number resolves to the current (User) file.
    pub fn slot(&self, mode: Mode, number: u8) -> Option<u32> {
        match (mode, number) {
            (Mode::Fiq, 8) => Some(self.r8_fiq),
            (Mode::Fiq, 9) => Some(self.r9_fiq),
            (Mode::Fiq, 10) => Some(self.r10_fiq),
            (Mode::Fiq, 11) => Some(self.r11_fiq),
            (Mode::Fiq, 12) => Some(self.r12_fiq),
            (Mode::Fiq, 13) => Some(self.r13_fiq),
            (Mode::Fiq, 14) => Some(self.r14_fiq),
            (Mode::Supervisor, 13) => Some(self.r13_svc),
            (Mode::Supervisor, 14) => Some(self.r14_svc),
            (Mode::Abort, 13) => Some(self.r13_abt),
            (Mode::Abort, 14) => Some(self.r14_abt),
            (Mode::Irq, 13) => Some(self.r13_irq),
            (Mode::Irq, 14) => Some(self.r14_irq),
            (Mode::Undefined, 13) => Some(self.r13_und),
            (Mode::Undefined, 14) => Some(self.r14_und),
            _ => None,
        }
    }

    /// Mutable variant of [`Self::slot`].
    pub fn slot_mut(&mut self, mode: Mode, number: u8) -> Option<&mut u32> {
        match (mode, number) {
            (Mode::Fiq, 8) => Some(&mut self.r8_fiq),
            (Mode::Fiq, 9) => Some(&mut self.r9_fiq),
            (Mode::Fiq, 10) => Some(&mut self.r10_fiq),
            (Mode::Fiq, 11) => Some(&mut self.r11_fiq),
            (Mode::Fiq, 12) => Some(&mut self.r12_fiq),
            (Mode::Fiq, 13) => Some(&mut self.r13_fiq),
            (Mode::Fiq, 14) => Some(&mut self.r14_fiq),
            (Mode::Supervisor, 13) => Some(&mut self.r13_svc),
            (Mode::Supervisor, 14) => Some(&mut self.r14_svc),
            (Mode::Abort, 13) => Some(&mut self.r13_abt),
            (Mode::Abort, 14) => Some(&mut self.r14_abt),
            (Mode::Irq, 13) => Some(&mut self.r13_irq),
            (Mode::Irq, 14) => Some(&mut self.r14_irq),
            (Mode::Undefined, 13) => Some(&mut self.r13_und),
            (Mode::Undefined, 14) => Some(&mut self.r14_und),
            _ => None,
        }
    }

    /// The SPSR of `mode`. User and System have none.
    pub fn spsr(&self, mode: Mode) -> Result<Psr, StateError> {
        match mode {
            Mode::Fiq => Ok(self.spsr_fiq),
            Mode::Supervisor => Ok(self.spsr_svc),
            Mode::Abort => Ok(self.spsr_abt),
            Mode::Irq => Ok(self.spsr_irq),
            Mode::Undefined => Ok(self.spsr_und),
            Mode::User | Mode::System => Err(StateError::NoSpsr(mode)),
        }
    }

    pub fn spsr_mut(&mut self, mode: Mode) -> Result<&mut Psr, StateError> {
        match mode {
            Mode::Fiq => Ok(&mut self.spsr_fiq),
            Mode::Supervisor => Ok(&mut self.spsr_svc),
            Mode::Abort => Ok(&mut self.spsr_abt),
            Mode::Irq => Ok(&mut self.spsr_irq),
            Mode::Undefined => Ok(&mut self.spsr_und),
            Mode::User | Mode::System => Err(StateError::NoSpsr(mode)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn low_registers_never_bank() {
        let bank = RegisterBank::default();
        for mode in [Mode::User, Mode::Fiq, Mode::Irq, Mode::Supervisor] {
            for number in 0..8 {
                assert_eq!(bank.slot(mode, number), None);
            }
            assert_eq!(bank.slot(mode, 15), None);
        }
    }

    #[test]
    fn fiq_banks_r8_through_r14() {
        let mut bank = RegisterBank::default();
        for number in 8..=14 {
            *bank.slot_mut(Mode::Fiq, number).unwrap() = u32::from(number);
        }
        for number in 8..=14 {
            assert_eq!(bank.slot(Mode::Fiq, number), Some(u32::from(number)));
            assert_eq!(bank.slot(Mode::Irq, number).is_some(), number >= 13);
        }
    }

    #[test]
    fn spsr_only_in_exception_modes() {
        let bank = RegisterBank::default();
        assert_eq!(bank.spsr(Mode::User), Err(StateError::NoSpsr(Mode::User)));
        assert_eq!(
            bank.spsr(Mode::System),
            Err(StateError::NoSpsr(Mode::System))
        );
        assert!(bank.spsr(Mode::Irq).is_ok());
    }

    #[test]
    fn banks_are_independent() {
        let mut bank = RegisterBank::default();
        *bank.slot_mut(Mode::Irq, 13).unwrap() = 100;
        *bank.slot_mut(Mode::Supervisor, 13).unwrap() = 200;
        assert_eq!(bank.slot(Mode::Irq, 13), Some(100));
        assert_eq!(bank.slot(Mode::Supervisor, 13), Some(200));
        assert_eq!(bank.slot(Mode::Abort, 13), Some(0));
    }
}
