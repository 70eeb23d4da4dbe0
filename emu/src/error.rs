//! Error taxonomy of the core.
//!
//! Decode errors abort a step before any state other than r15 has changed;
//! execute-time errors are returned with r15 already advanced by the
//! instruction width. See [`crate::cpu::processor::Processor::run_next_instruction`].

use thiserror::Error;

use crate::cpu::mode::Mode;
pub use crate::memory::MemoryError;

/// A malformed encoding. Always carries the raw instruction so callers can
/// report or skip it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("undefined instruction 0x{0:08x}")]
    Undefined(u32),

    #[error("multiply 0x{0:08x} can't use r15")]
    MultiplyWithR15(u32),

    #[error("multiply 0x{0:08x} destination and operand must differ")]
    MultiplyOperandOverlap(u32),

    #[error("illegal shift in 0x{0:08x}")]
    IllegalShift(u32),

    #[error("illegal condition in conditional branch 0x{0:04x}")]
    ReservedCondition(u16),
}

impl DecodeError {
    /// The raw word (or halfword, zero-extended) that failed to decode.
    #[must_use]
    pub const fn raw(&self) -> u32 {
        match *self {
            Self::Undefined(raw)
            | Self::MultiplyWithR15(raw)
            | Self::MultiplyOperandOverlap(raw)
            | Self::IllegalShift(raw) => raw,
            Self::ReservedCondition(raw) => raw as u32,
        }
    }
}

/// Structural misuse of the architectural state.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("mode {0:?} doesn't have a SPSR")]
    NoSpsr(Mode),

    #[error("invalid mode value 0x{0:02x}")]
    InvalidMode(u32),

    #[error("r15 is not allowed as {0}")]
    PcForbidden(&'static str),
}

/// An error reported by a coprocessor handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct CoprocError(pub String);

/// Anything that can go wrong while executing an already-decoded
/// instruction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("coprocessor {number} error: {source}")]
    Coprocessor { number: u32, source: CoprocError },
}

/// The result of a single fetch/decode/execute step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("failed fetching instruction: {0}")]
    Fetch(MemoryError),

    #[error("failed decoding instruction: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed executing instruction: {0}")]
    Execute(#[from] ExecuteError),
}
