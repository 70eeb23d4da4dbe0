//! The 16 data-processing opcodes.
//!
//! ```text
//! ┌────────┬─────────┬────────────────────────────────────────────────────┐
//! │ OpCode │  Instr  │ Operation                                          │
//! ├────────┼─────────┼────────────────────────────────────────────────────┤
//! │  0000  │   and   │ Rd = Rn AND Op2                                    │
//! │  0001  │   eor   │ Rd = Rn XOR Op2                                    │
//! │  0010  │   sub   │ Rd = Rn - Op2                                      │
//! │  0011  │   rsb   │ Rd = Op2 - Rn                                      │
//! │  0100  │   add   │ Rd = Rn + Op2                                      │
//! │  0101  │   adc   │ Rd = Rn + Op2 + C                                  │
//! │  0110  │   sbc   │ Rd = Rn - Op2 - !C                                 │
//! │  0111  │   rsc   │ Rd = Op2 - Rn - !C                                 │
//! │  1000  │   tst   │ Rn AND Op2, flags only                             │
//! │  1001  │   teq   │ Rn XOR Op2, flags only                             │
//! │  1010  │   cmp   │ Rn - Op2, flags only                               │
//! │  1011  │   cmn   │ Rn + Op2, flags only                               │
//! │  1100  │   orr   │ Rd = Rn OR Op2                                     │
//! │  1101  │   mov   │ Rd = Op2 (Rn ignored)                              │
//! │  1110  │   bic   │ Rd = Rn AND NOT Op2                                │
//! │  1111  │   mvn   │ Rd = NOT Op2 (Rn ignored)                          │
//! └────────┴─────────┴────────────────────────────────────────────────────┘
//! ```
//!
//! The logical/arithmetic distinction decides where C comes from: logical
//! operations take it from the barrel shifter, arithmetic operations from
//! the ALU itself.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::alu::{is_carry, is_carry_with_carry, is_overflow, is_overflow_with_carry};
use crate::cpu::processor::Processor;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum AluOpcode {
    And = 0x0,
    Eor = 0x1,
    Sub = 0x2,
    Rsb = 0x3,
    Add = 0x4,
    Adc = 0x5,
    Sbc = 0x6,
    Rsc = 0x7,
    Tst = 0x8,
    Teq = 0x9,
    Cmp = 0xA,
    Cmn = 0xB,
    Orr = 0xC,
    Mov = 0xD,
    Bic = 0xE,
    Mvn = 0xF,
}

impl From<u32> for AluOpcode {
    fn from(bits: u32) -> Self {
        match bits & 0xf {
            0x0 => Self::And,
            0x1 => Self::Eor,
            0x2 => Self::Sub,
            0x3 => Self::Rsb,
            0x4 => Self::Add,
            0x5 => Self::Adc,
            0x6 => Self::Sbc,
            0x7 => Self::Rsc,
            0x8 => Self::Tst,
            0x9 => Self::Teq,
            0xA => Self::Cmp,
            0xB => Self::Cmn,
            0xC => Self::Orr,
            0xD => Self::Mov,
            0xE => Self::Bic,
            _ => Self::Mvn,
        }
    }
}

impl std::fmt::Display for AluOpcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::And => f.write_str("and"),
            Self::Eor => f.write_str("eor"),
            Self::Sub => f.write_str("sub"),
            Self::Rsb => f.write_str("rsb"),
            Self::Add => f.write_str("add"),
            Self::Adc => f.write_str("adc"),
            Self::Sbc => f.write_str("sbc"),
            Self::Rsc => f.write_str("rsc"),
            Self::Tst => f.write_str("tst"),
            Self::Teq => f.write_str("teq"),
            Self::Cmp => f.write_str("cmp"),
            Self::Cmn => f.write_str("cmn"),
            Self::Orr => f.write_str("orr"),
            Self::Mov => f.write_str("mov"),
            Self::Bic => f.write_str("bic"),
            Self::Mvn => f.write_str("mvn"),
        }
    }
}

impl AluOpcode {
    /// Whether this is one of the compare-class opcodes that never write a
    /// result.
    #[must_use]
    pub const fn is_compare(self) -> bool {
        matches!(self, Self::Tst | Self::Teq | Self::Cmp | Self::Cmn)
    }

    /// Evaluates the opcode with `a` as the first operand and `b` as the
    /// already-shifted second operand.
    ///
    /// Always sets N and Z from the result. Arithmetic opcodes also set C
    /// and V; logical opcodes leave them to the shifter. The returned flag
    /// tells whether the result is written back.
    pub(crate) fn evaluate(self, a: u32, b: u32, p: &mut Processor) -> (u32, bool) {
        let carry_in = p.carry();
        let carry = u32::from(carry_in);
        let (result, write_back) = match self {
            Self::And => (a & b, true),
            Self::Eor => (a ^ b, true),
            Self::Sub => {
                p.set_carry(is_carry(a, b, true));
                p.set_overflow(is_overflow(a, b, true));
                (a.wrapping_sub(b), true)
            }
            Self::Rsb => {
                p.set_carry(is_carry(b, a, true));
                p.set_overflow(is_overflow(b, a, true));
                (b.wrapping_sub(a), true)
            }
            Self::Add => {
                p.set_carry(is_carry(a, b, false));
                p.set_overflow(is_overflow(a, b, false));
                (a.wrapping_add(b), true)
            }
            Self::Adc => {
                p.set_carry(is_carry_with_carry(a, b, carry_in, false));
                p.set_overflow(is_overflow_with_carry(a, b, carry_in, false));
                (a.wrapping_add(b).wrapping_add(carry), true)
            }
            Self::Sbc => {
                p.set_carry(is_carry_with_carry(a, b, carry_in, true));
                p.set_overflow(is_overflow_with_carry(a, b, carry_in, true));
                (a.wrapping_sub(b).wrapping_add(carry).wrapping_sub(1), true)
            }
            Self::Rsc => {
                p.set_carry(is_carry_with_carry(b, a, carry_in, true));
                p.set_overflow(is_overflow_with_carry(b, a, carry_in, true));
                (b.wrapping_sub(a).wrapping_add(carry).wrapping_sub(1), true)
            }
            Self::Tst => (a & b, false),
            Self::Teq => (a ^ b, false),
            Self::Cmp => {
                p.set_carry(is_carry(a, b, true));
                p.set_overflow(is_overflow(a, b, true));
                (a.wrapping_sub(b), false)
            }
            Self::Cmn => {
                p.set_carry(is_carry(a, b, false));
                p.set_overflow(is_overflow(a, b, false));
                (a.wrapping_add(b), false)
            }
            Self::Orr => (a | b, true),
            Self::Mov => (b, true),
            Self::Bic => (a & !b, true),
            Self::Mvn => (!b, true),
        };
        p.set_zero(result == 0);
        p.set_negative(result.get_bit(31));
        (result, write_back)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trips_through_bits() {
        for bits in 0..=0xf_u32 {
            assert_eq!(AluOpcode::from(bits) as u32, bits);
        }
    }

    #[test]
    fn compare_class() {
        assert!(AluOpcode::Tst.is_compare());
        assert!(AluOpcode::Teq.is_compare());
        assert!(AluOpcode::Cmp.is_compare());
        assert!(AluOpcode::Cmn.is_compare());
        assert!(!AluOpcode::And.is_compare());
        assert!(!AluOpcode::Mov.is_compare());
    }

    #[test]
    fn evaluate_add_sets_carry_and_zero() {
        let mut p = Processor::default();
        let (result, write_back) = AluOpcode::Add.evaluate(0xffff_ffff, 1, &mut p);
        assert_eq!(result, 0);
        assert!(write_back);
        assert!(p.carry());
        assert!(p.zero());
        assert!(!p.negative());
        assert!(!p.overflow());
    }

    #[test]
    fn evaluate_sub_carry_means_no_borrow() {
        let mut p = Processor::default();
        let (result, _) = AluOpcode::Sub.evaluate(5, 3, &mut p);
        assert_eq!(result, 2);
        assert!(p.carry());

        let (result, _) = AluOpcode::Sub.evaluate(3, 5, &mut p);
        assert_eq!(result, -2_i32 as u32);
        assert!(!p.carry());
        assert!(p.negative());
    }

    #[test]
    fn evaluate_adc_uses_carry_in() {
        let mut p = Processor::default();
        p.set_carry(true);
        let (result, _) = AluOpcode::Adc.evaluate(1, 2, &mut p);
        assert_eq!(result, 4);

        let mut p = Processor::default();
        let (result, _) = AluOpcode::Adc.evaluate(1, 2, &mut p);
        assert_eq!(result, 3);
    }

    #[test]
    fn evaluate_sbc_and_rsc() {
        let mut p = Processor::default();
        p.set_carry(true);
        let (result, _) = AluOpcode::Sbc.evaluate(10, 4, &mut p);
        assert_eq!(result, 6);

        let mut p = Processor::default();
        let (result, _) = AluOpcode::Sbc.evaluate(10, 4, &mut p);
        assert_eq!(result, 5);

        let mut p = Processor::default();
        p.set_carry(true);
        let (result, _) = AluOpcode::Rsc.evaluate(4, 10, &mut p);
        assert_eq!(result, 6);
    }

    #[test]
    fn evaluate_logical_leaves_carry_alone() {
        let mut p = Processor::default();
        p.set_carry(true);
        let (result, write_back) = AluOpcode::Tst.evaluate(0b1100, 0b0110, &mut p);
        assert_eq!(result, 0b0100);
        assert!(!write_back);
        assert!(p.carry());

        let (result, _) = AluOpcode::Bic.evaluate(0b1111, 0b0101, &mut p);
        assert_eq!(result, 0b1010);
        let (result, _) = AluOpcode::Mvn.evaluate(0, 0xffff_fff0, &mut p);
        assert_eq!(result, 0xf);
    }
}
