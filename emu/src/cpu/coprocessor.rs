//! The coprocessor dispatch interface.
//!
//! Handlers register with the processor and claim a 4-bit coprocessor
//! number; the core forwards cdp/ldc/stc/mcr/mrc to the handler whose
//! number matches the encoding. An instruction addressing a number nobody
//! claimed is a no-op.

use crate::cpu::processor::Processor;
use crate::cpu::register::Register;
use crate::error::CoprocError;

pub trait Coprocessor {
    /// The 4-bit coprocessor number this handler claims.
    fn number(&self) -> u32;

    /// A cdp instruction addressed this coprocessor.
    fn operation(&mut self, p: &mut Processor, raw: u32) -> Result<(), CoprocError>;

    /// An ldc/stc instruction addressed this coprocessor; the core has
    /// already computed the effective address.
    fn data_transfer(&mut self, p: &mut Processor, raw: u32, address: u32)
        -> Result<(), CoprocError>;

    /// An mcr/mrc instruction addressed this coprocessor; `load` is set
    /// for mrc (coprocessor to core register).
    fn register_transfer(
        &mut self,
        p: &mut Processor,
        raw: u32,
        rd: Register,
        load: bool,
    ) -> Result<(), CoprocError>;
}
