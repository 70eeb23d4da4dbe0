//! Flag arithmetic and the barrel shifter.
//!
//! The shifter preprocesses the second operand of data-processing
//! instructions and produces the C flag for logical operations. Immediate
//! amounts give an encoding-dependent meaning to 0 (`lsr #0` and `asr #0`
//! mean "by 32", `ror #0` is RRX); register-specified amounts treat 0 as
//! the identity with C unchanged.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::cpu::processor::Processor;
use crate::cpu::register::Register;
use crate::error::StateError;

/// Carry out of a 32-bit add or subtract.
///
/// For subtraction this follows the ARM convention C = NOT BorrowFrom:
/// `a - b` carries exactly when `a >= b`.
#[must_use]
pub fn is_carry(a: u32, b: u32, sub: bool) -> bool {
    if sub {
        a >= b
    } else {
        (u64::from(a) + u64::from(b)) >> 32 != 0
    }
}

/// Signed overflow of a 32-bit add or subtract.
#[must_use]
pub fn is_overflow(a: u32, b: u32, sub: bool) -> bool {
    let a_sign = a.get_bit(31);
    let b_sign = b.get_bit(31);
    if sub {
        let result_sign = a.wrapping_sub(b).get_bit(31);
        (a_sign != b_sign) && (result_sign == b_sign)
    } else {
        let result_sign = a.wrapping_add(b).get_bit(31);
        (a_sign == b_sign) && (result_sign != a_sign)
    }
}

/// Like [`is_carry`], with the carry-in folded into the computation
/// (`a + b + cin` for add, `a - b + cin - 1` for subtract).
#[must_use]
pub fn is_carry_with_carry(a: u32, b: u32, carry_in: bool, sub: bool) -> bool {
    let carry = u64::from(carry_in);
    if sub {
        // Borrow happens when a < b + (1 - cin).
        u64::from(a) >= u64::from(b) + 1 - carry
    } else {
        (u64::from(a) + u64::from(b) + carry) >> 32 != 0
    }
}

/// Like [`is_overflow`], with the carry-in folded into the computation.
#[must_use]
pub fn is_overflow_with_carry(a: u32, b: u32, carry_in: bool, sub: bool) -> bool {
    let a_sign = a.get_bit(31);
    let b_sign = b.get_bit(31);
    let carry = u32::from(carry_in);
    if sub {
        let result = a.wrapping_sub(b).wrapping_add(carry).wrapping_sub(1);
        (a_sign != b_sign) && (result.get_bit(31) == b_sign)
    } else {
        let result = a.wrapping_add(b).wrapping_add(carry);
        (a_sign == b_sign) && (result.get_bit(31) != a_sign)
    }
}

/// One of the four shift kinds the barrel shifter implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftKind {
    Lsl,
    Lsr,
    Asr,
    Ror,
}

impl From<u32> for ShiftKind {
    fn from(bits: u32) -> Self {
        match bits & 0b11 {
            0b00 => Self::Lsl,
            0b01 => Self::Lsr,
            0b10 => Self::Asr,
            _ => Self::Ror,
        }
    }
}

impl From<u16> for ShiftKind {
    fn from(bits: u16) -> Self {
        Self::from(u32::from(bits))
    }
}

impl std::fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lsl => f.write_str("lsl"),
            Self::Lsr => f.write_str("lsr"),
            Self::Asr => f.write_str("asr"),
            Self::Ror => f.write_str("ror"),
        }
    }
}

/// The value and carry produced by the shifter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftOutcome {
    pub value: u32,
    pub carry: bool,
}

/// Applies a shift with a nonzero amount. The amount may exceed 32.
fn shift_nonzero(kind: ShiftKind, amount: u32, value: u32) -> ShiftOutcome {
    debug_assert!(amount >= 1);
    match kind {
        ShiftKind::Lsl => match amount {
            // Widen so amounts of exactly 32 behave; Rust shifts are
            // modular at the type width.
            1..=32 => {
                let wide = u64::from(value) << amount;
                ShiftOutcome {
                    value: wide as u32,
                    carry: (wide >> 32) & 1 != 0,
                }
            }
            _ => ShiftOutcome {
                value: 0,
                carry: false,
            },
        },
        ShiftKind::Lsr => match amount {
            1..=32 => {
                let wide = u64::from(value) >> (amount - 1);
                ShiftOutcome {
                    value: (wide >> 1) as u32,
                    carry: wide & 1 != 0,
                }
            }
            _ => ShiftOutcome {
                value: 0,
                carry: false,
            },
        },
        ShiftKind::Asr => match amount {
            1..=31 => ShiftOutcome {
                value: ((value as i32) >> amount) as u32,
                carry: value.get_bit((amount - 1) as u8),
            },
            // Shifting all bits out leaves the sign everywhere.
            _ => ShiftOutcome {
                value: ((value as i32) >> 31) as u32,
                carry: value.get_bit(31),
            },
        },
        ShiftKind::Ror => {
            // ROR by n > 32 behaves as ROR by n - 32, repeatedly.
            let mut amount = amount;
            if amount > 32 {
                amount %= 32;
                if amount == 0 {
                    amount = 32;
                }
            }
            if amount == 32 {
                ShiftOutcome {
                    value,
                    carry: value.get_bit(31),
                }
            } else {
                let rotated = value.rotate_right(amount);
                ShiftOutcome {
                    value: rotated,
                    carry: value.get_bit((amount - 1) as u8),
                }
            }
        }
    }
}

/// Applies a shift whose amount came from an immediate field, giving the
/// amount 0 its encoding-dependent meaning.
#[must_use]
pub fn shift_immediate(kind: ShiftKind, amount: u32, value: u32, carry: bool) -> ShiftOutcome {
    if amount != 0 {
        return shift_nonzero(kind, amount, value);
    }
    match kind {
        // lsl #0: no shift performed, C untouched.
        ShiftKind::Lsl => ShiftOutcome { value, carry },
        // lsr #0 and asr #0 encode a shift by 32.
        ShiftKind::Lsr | ShiftKind::Asr => shift_nonzero(kind, 32, value),
        // ror #0 encodes RRX: rotate right by one through the carry.
        ShiftKind::Ror => ShiftOutcome {
            value: (value >> 1) | (u32::from(carry) << 31),
            carry: value.get_bit(0),
        },
    }
}

/// Applies a shift whose amount came from a register: 0 is the identity
/// with C unchanged, everything else follows the immediate table.
#[must_use]
pub fn shift_by_register(kind: ShiftKind, amount: u32, value: u32, carry: bool) -> ShiftOutcome {
    if amount == 0 {
        ShiftOutcome { value, carry }
    } else {
        shift_nonzero(kind, amount, value)
    }
}

/// Where a shift amount comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftAmount {
    /// A 5-bit immediate encoded in the instruction.
    Immediate(u8),
    /// The bottom byte of a register.
    Register(Register),
}

/// A shift descriptor as encoded in bits 11-4 of a register operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub kind: ShiftKind,
    pub amount: ShiftAmount,
}

impl Shift {
    /// Decodes the 8-bit shift field (instruction bits 11-4).
    #[must_use]
    pub fn from_encoding(bits: u32) -> Self {
        let kind = ShiftKind::from(bits >> 1);
        let amount = if bits.get_bit(0) {
            ShiftAmount::Register(Register::from(bits >> 4))
        } else {
            ShiftAmount::Immediate(((bits >> 3) & 0x1f) as u8)
        };
        Self { kind, amount }
    }

    #[must_use]
    pub const fn by_register(self) -> bool {
        matches!(self.amount, ShiftAmount::Register(_))
    }

    /// Shifts `value`, updating the processor's C flag.
    ///
    /// r15 cannot supply the amount.
    pub fn apply(self, value: u32, p: &mut Processor) -> Result<u32, StateError> {
        let carry = p.carry();
        let outcome = match self.amount {
            ShiftAmount::Immediate(amount) => {
                shift_immediate(self.kind, u32::from(amount), value, carry)
            }
            ShiftAmount::Register(register) => {
                if register.is_pc() {
                    return Err(StateError::PcForbidden("a shift amount"));
                }
                let amount = p.register(register) & 0xff;
                shift_by_register(self.kind, amount, value, carry)
            }
        };
        p.set_carry(outcome.carry);
        Ok(outcome.value)
    }
}

impl std::fmt::Display for Shift {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.amount {
            ShiftAmount::Register(register) => write!(f, "{} {register}", self.kind),
            ShiftAmount::Immediate(0) => Ok(()),
            ShiftAmount::Immediate(amount) => write!(f, "{} {amount}", self.kind),
        }
    }
}
