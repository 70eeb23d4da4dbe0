//! # ARMv4/v4T instruction semantics core
//!
//! This crate emulates and disassembles the classic 32-bit ARM instruction
//! set (ARMv4/v4T profile): the 32-bit ARM encoding and the 16-bit THUMB
//! encoding, against a banked register file, CPSR/SPSR, a paged memory
//! store and optional coprocessors.
//!
//! ## Module Overview
//!
//! | Module     | Description                                         |
//! |------------|-----------------------------------------------------|
//! | [`cpu`]    | Processor state, decoders, per-instruction rules    |
//! | [`memory`] | Memory interface and the paged reference store      |
//!
//! ## Quick Start
//!
//! ```
//! use emu::cpu::processor::Processor;
//! use emu::cpu::register::Register;
//! use emu::memory::Memory;
//!
//! let mut processor = Processor::default();
//! // Little-endian `add r0, r1, r2` mapped at 4096.
//! processor
//!     .memory_mut()
//!     .set_region(4096, &[0x02, 0x00, 0x81, 0xe0])
//!     .unwrap();
//! processor.set_register(Register::PC, 4096);
//! processor.set_register(Register::from(1_u8), 40);
//! processor.set_register(Register::from(2_u8), 2);
//! processor.run_next_instruction().unwrap();
//! assert_eq!(processor.register(Register::from(0_u8)), 42);
//! ```
//!
//! Decoding alone is exposed through [`cpu::parse_arm`] and
//! [`cpu::parse_thumb`], both pure and total.

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
mod bitwise;

pub mod cpu;
pub mod error;
pub mod memory;
