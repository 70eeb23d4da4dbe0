//! The processor: architectural state, banked register resolution, and the
//! fetch/decode/execute step.

use crate::cpu::arm;
use crate::cpu::arm::instructions::{ArmInstruction, ArmOpcode};
use crate::cpu::coprocessor::Coprocessor;
use crate::cpu::decode_cache::DecodeCache;
use crate::cpu::mode::Mode;
use crate::cpu::psr::{CpuState, Psr};
use crate::cpu::register::Register;
use crate::cpu::register_bank::RegisterBank;
use crate::cpu::registers::Registers;
use crate::cpu::thumb;
use crate::cpu::thumb::instruction::{ThumbInstruction, ThumbOpcode};
use crate::cpu::{parse_arm, parse_thumb};
use crate::error::{CoprocError, DecodeError, ExecuteError, MemoryError, StateError, StepError};
use crate::memory::{Memory, PagedMemory};

/// The emulated core: current and banked registers, CPSR/SPSRs, the memory
/// interface, registered coprocessors, and a small decode cache.
///
/// A fresh processor is in User mode, ARM state, interrupts enabled, with
/// an empty little-endian paged memory.
pub struct Processor {
    pub(crate) registers: Registers,
    pub(crate) cpsr: Psr,
    pub(crate) register_bank: RegisterBank,
    pub(crate) memory: Box<dyn Memory>,
    coprocessors: Vec<Box<dyn Coprocessor>>,
    cache: DecodeCache,
}

impl Default for Processor {
    fn default() -> Self {
        Self {
            registers: Registers::default(),
            cpsr: Psr::from(Mode::User),
            register_bank: RegisterBank::default(),
            memory: Box::new(PagedMemory::default()),
            coprocessors: Vec::new(),
            cache: DecodeCache::default(),
        }
    }
}

impl Processor {
    #[must_use]
    pub fn new(memory: Box<dyn Memory>) -> Self {
        Self {
            memory,
            ..Default::default()
        }
    }

    // --- Registers -------------------------------------------------------

    /// Reads a register as visible in the current mode.
    ///
    /// r0-r7 and r15 are never banked; r8-r12 are banked in FIQ only;
    /// r13-r14 are banked in every exception mode. User and System share
    /// one bank.
    #[must_use]
    pub fn register(&self, register: Register) -> u32 {
        self.register_bank
            .slot(self.mode(), register.number())
            .unwrap_or_else(|| self.registers.register_at(register.index()))
    }

    /// Writes a register as visible in the current mode.
    pub fn set_register(&mut self, register: Register, value: u32) {
        let mode = self.mode();
        match self.register_bank.slot_mut(mode, register.number()) {
            Some(slot) => *slot = value,
            None => self.registers.set_register_at(register.index(), value),
        }
    }

    /// Reads from the User bank regardless of the current mode.
    #[must_use]
    pub fn user_register(&self, register: Register) -> u32 {
        self.registers.register_at(register.index())
    }

    /// Writes to the User bank regardless of the current mode.
    pub fn set_user_register(&mut self, register: Register, value: u32) {
        self.registers.set_register_at(register.index(), value);
    }

    // --- Status registers ------------------------------------------------

    #[must_use]
    pub fn cpsr(&self) -> Psr {
        self.cpsr
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.cpsr.mode()
    }

    /// Switches the operating mode.
    ///
    /// Entering an exception mode from a different mode saves the
    /// pre-switch CPSR into the new mode's SPSR, so a later mode-returning
    /// CPSR write restores the caller's state. Switching to User or System
    /// touches no SPSR, and re-entering the current mode is a no-op.
    pub fn set_mode(&mut self, new_mode: Mode) {
        let previous = self.cpsr;
        if previous.mode() == new_mode {
            return;
        }
        self.cpsr.set_mode(new_mode);
        if let Ok(spsr) = self.register_bank.spsr_mut(new_mode) {
            *spsr = previous;
        }
    }

    /// Writes the CPSR.
    ///
    /// From User mode only the condition flags (bits 31:28) are writable;
    /// the rest is preserved and no mode switch happens. From privileged
    /// modes the whole word is written, switching modes first when the
    /// mode bits change (which saves the SPSR of the entered mode).
    pub fn set_cpsr(&mut self, value: u32) -> Result<(), StateError> {
        let current = self.cpsr;
        if current.mode() == Mode::User {
            self.cpsr = Psr::from((value & 0xf000_0000) | (u32::from(current) & 0x0fff_ffff));
            return Ok(());
        }
        let new_mode = Mode::try_from(value & 0x1f)?;
        if new_mode != current.mode() {
            self.set_mode(new_mode);
        }
        self.cpsr = Psr::from(value);
        Ok(())
    }

    /// The SPSR of the current mode; User and System have none.
    pub fn spsr(&self) -> Result<Psr, StateError> {
        self.register_bank.spsr(self.mode())
    }

    pub fn set_spsr(&mut self, value: u32) -> Result<(), StateError> {
        let mode = self.mode();
        let spsr = self.register_bank.spsr_mut(mode)?;
        *spsr = Psr::from(value);
        Ok(())
    }

    /// Puts back a CPSR snapshot taken before an operation; only the flag
    /// bits can have changed in between.
    pub(crate) fn restore_cpsr_flags(&mut self, previous: Psr) {
        self.cpsr = previous;
    }

    // --- Flags -----------------------------------------------------------

    #[must_use]
    pub fn negative(&self) -> bool {
        self.cpsr.sign_flag()
    }

    #[must_use]
    pub fn zero(&self) -> bool {
        self.cpsr.zero_flag()
    }

    #[must_use]
    pub fn carry(&self) -> bool {
        self.cpsr.carry_flag()
    }

    #[must_use]
    pub fn overflow(&self) -> bool {
        self.cpsr.overflow_flag()
    }

    pub fn set_negative(&mut self, value: bool) {
        self.cpsr.set_sign_flag(value);
    }

    pub fn set_zero(&mut self, value: bool) {
        self.cpsr.set_zero_flag(value);
    }

    pub fn set_carry(&mut self, value: bool) {
        self.cpsr.set_carry_flag(value);
    }

    pub fn set_overflow(&mut self, value: bool) {
        self.cpsr.set_overflow_flag(value);
    }

    #[must_use]
    pub fn irq_disabled(&self) -> bool {
        self.cpsr.irq_disable()
    }

    #[must_use]
    pub fn fiq_disabled(&self) -> bool {
        self.cpsr.fiq_disable()
    }

    #[must_use]
    pub fn thumb_state(&self) -> bool {
        self.cpsr.state_bit()
    }

    pub fn set_thumb_state(&mut self, thumb: bool) {
        self.cpsr.set_state_bit(thumb);
    }

    // --- Memory and coprocessors -----------------------------------------

    #[must_use]
    pub fn memory(&self) -> &dyn Memory {
        self.memory.as_ref()
    }

    pub fn memory_mut(&mut self) -> &mut dyn Memory {
        self.memory.as_mut()
    }

    pub fn set_memory(&mut self, memory: Box<dyn Memory>) {
        self.memory = memory;
    }

    pub fn set_big_endian(&mut self, big_endian: bool) {
        self.memory.set_big_endian(big_endian);
    }

    #[must_use]
    pub fn is_big_endian(&self) -> bool {
        self.memory.is_big_endian()
    }

    pub fn add_coprocessor(&mut self, coprocessor: Box<dyn Coprocessor>) {
        self.coprocessors.push(coprocessor);
    }

    /// Runs `f` against the handler claiming `number`. Nobody claiming it
    /// is a no-op.
    ///
    /// The registry is detached for the duration of the call so the
    /// handler can borrow the processor; a handler can't reach other
    /// coprocessors reentrantly.
    pub(crate) fn dispatch_coprocessor<F>(&mut self, number: u32, f: F) -> Result<(), ExecuteError>
    where
        F: FnOnce(&mut dyn Coprocessor, &mut Self) -> Result<(), CoprocError>,
    {
        let mut coprocessors = std::mem::take(&mut self.coprocessors);
        let result = match coprocessors
            .iter_mut()
            .find(|coprocessor| coprocessor.number() == number)
        {
            Some(coprocessor) => f(coprocessor.as_mut(), self),
            None => {
                logger::debug(format!("no coprocessor claims p{number}"));
                Ok(())
            }
        };
        self.coprocessors = coprocessors;
        result.map_err(|source| ExecuteError::Coprocessor { number, source })
    }

    // --- Interrupt lines -------------------------------------------------

    /// Delivers an IRQ: unless masked by the I bit, enters IRQ mode
    /// (saving the CPSR into `SPSR_irq`), points r14 at the interrupted
    /// instruction plus 4 so handlers can return with `subs pc, lr, 4`,
    /// and jumps to the 0x18 vector.
    pub fn send_irq(&mut self) {
        if self.cpsr.irq_disable() {
            return;
        }
        let return_address = self.registers.program_counter().wrapping_add(4);
        self.set_mode(Mode::Irq);
        self.set_register(Register::LR, return_address);
        self.registers.set_program_counter(0x18);
    }

    /// Like [`Self::send_irq`] for the FIQ line: F bit mask, FIQ mode,
    /// vector 0x1c.
    pub fn send_fiq(&mut self) {
        if self.cpsr.fiq_disable() {
            return;
        }
        let return_address = self.registers.program_counter().wrapping_add(4);
        self.set_mode(Mode::Fiq);
        self.set_register(Register::LR, return_address);
        self.registers.set_program_counter(0x1c);
    }

    // --- Fetch/decode/execute --------------------------------------------

    fn fetch_arm(&mut self) -> Result<u32, MemoryError> {
        let pc = self.registers.program_counter() & 0xffff_fffc;
        self.registers.set_program_counter(pc);
        self.memory.read_word(pc)
    }

    fn fetch_thumb(&mut self) -> Result<u16, MemoryError> {
        let pc = self.registers.program_counter() & 0xffff_fffe;
        self.registers.set_program_counter(pc);
        self.memory.read_halfword(pc)
    }

    fn decode_arm_cached(&mut self, raw: u32) -> Result<ArmOpcode, DecodeError> {
        if let Some(opcode) = self.cache.get_arm(raw) {
            return Ok(opcode);
        }
        let opcode = parse_arm(raw)?;
        self.cache.store_arm(opcode);
        Ok(opcode)
    }

    fn decode_thumb_cached(&mut self, raw: u16) -> Result<ThumbOpcode, DecodeError> {
        if let Some(opcode) = self.cache.get_thumb(raw) {
            return Ok(opcode);
        }
        let opcode = parse_thumb(raw)?;
        self.cache.store_thumb(opcode);
        Ok(opcode)
    }

    /// Disassembles the instruction the next step would execute. Never
    /// fails; fetch and decode problems are embedded in the output.
    pub fn pending_instruction_string(&mut self) -> String {
        let pc = self.registers.program_counter();
        if self.cpsr.cpu_state() == CpuState::Thumb {
            let raw = match self.memory.read_halfword(pc) {
                Ok(raw) => raw,
                Err(error) => return format!("{pc:08x}: error: {error}"),
            };
            return match self.decode_thumb_cached(raw) {
                Ok(opcode) => format!("{pc:08x}: {raw:04x} {opcode}"),
                Err(error) => format!("{pc:08x}: {raw:04x} error: {error}"),
            };
        }
        let raw = match self.memory.read_word(pc) {
            Ok(raw) => raw,
            Err(error) => return format!("{pc:08x}: error: {error}"),
        };
        match self.decode_arm_cached(raw) {
            Ok(opcode) => format!("{pc:08x}: {raw:08x} {opcode}"),
            Err(error) => format!("{pc:08x}: {raw:08x} error: {error}"),
        }
    }

    /// Fetches the instruction at r15, advances r15 by the instruction
    /// width, then decodes and executes it.
    ///
    /// A fetch failure leaves r15 untouched (apart from forced alignment).
    /// Decode and execute errors are returned with r15 already advanced,
    /// so callers can resume past the offending instruction or halt.
    pub fn run_next_instruction(&mut self) -> Result<(), StepError> {
        match self.cpsr.cpu_state() {
            CpuState::Thumb => {
                let raw = self.fetch_thumb().map_err(StepError::Fetch)?;
                let pc = self.registers.program_counter();
                self.registers
                    .set_program_counter(pc.wrapping_add(thumb::SIZE_OF_INSTRUCTION));
                let opcode = self.decode_thumb_cached(raw)?;
                self.execute_thumb(opcode)?;
            }
            CpuState::Arm => {
                let raw = self.fetch_arm().map_err(StepError::Fetch)?;
                let pc = self.registers.program_counter();
                self.registers
                    .set_program_counter(pc.wrapping_add(arm::SIZE_OF_INSTRUCTION));
                let opcode = self.decode_arm_cached(raw)?;
                self.execute_arm(opcode)?;
            }
        }
        Ok(())
    }

    /// Executes one decoded ARM instruction against the current state.
    /// An unmet condition is a successful no-op.
    pub fn execute_arm(&mut self, opcode: ArmOpcode) -> Result<(), ExecuteError> {
        if !self.cpsr.can_execute(opcode.condition) {
            return Ok(());
        }
        let raw = opcode.raw;
        match opcode.instruction {
            ArmInstruction::DataProcessing {
                opcode,
                set_conditions,
                rn,
                rd,
                operand2,
            } => self.data_processing(opcode, set_conditions, rn, rd, operand2),
            ArmInstruction::PsrTransfer { use_cpsr, op } => self.psr_transfer(use_cpsr, op),
            ArmInstruction::Multiply {
                long,
                signed,
                accumulate,
                set_conditions,
                rd,
                rn,
                rs,
                rm,
            } => {
                self.multiply(long, signed, accumulate, set_conditions, rd, rn, rs, rm);
                Ok(())
            }
            ArmInstruction::SingleDataSwap {
                byte_quantity,
                rd,
                rm,
                rn,
            } => self.single_data_swap(byte_quantity, rd, rm, rn),
            ArmInstruction::BranchExchange { rn } => {
                self.branch_exchange(rn);
                Ok(())
            }
            ArmInstruction::HalfwordDataTransfer {
                load,
                signed,
                halfword,
                write_back,
                up,
                preindex,
                rd,
                rn,
                offset,
            } => self.halfword_data_transfer(
                load, signed, halfword, write_back, up, preindex, rd, rn, offset,
            ),
            ArmInstruction::SingleDataTransfer {
                load,
                byte_quantity,
                write_back,
                up,
                preindex,
                rd,
                rn,
                offset,
            } => self.single_data_transfer(
                load,
                byte_quantity,
                write_back,
                up,
                preindex,
                rd,
                rn,
                offset,
            ),
            ArmInstruction::BlockDataTransfer {
                load,
                write_back,
                force_user,
                up,
                preindex,
                rn,
                register_list,
            } => self.block_data_transfer(
                load,
                write_back,
                force_user,
                up,
                preindex,
                rn,
                register_list,
            ),
            ArmInstruction::Branch { link, offset } => {
                self.branch(link, offset);
                Ok(())
            }
            ArmInstruction::CoprocDataTransfer {
                write_back,
                up,
                preindex,
                rn,
                coproc_number,
                offset,
                ..
            } => self.coproc_data_transfer(raw, write_back, up, preindex, rn, coproc_number, offset),
            ArmInstruction::CoprocDataOperation { coproc_number, .. } => {
                self.coproc_data_operation(raw, coproc_number)
            }
            ArmInstruction::CoprocRegisterTransfer {
                load,
                rd,
                coproc_number,
                ..
            } => self.coproc_register_transfer(raw, coproc_number, rd, load),
            ArmInstruction::SoftwareInterrupt { .. } => {
                self.software_interrupt();
                Ok(())
            }
        }
    }

    /// Executes one decoded THUMB instruction against the current state.
    pub fn execute_thumb(&mut self, opcode: ThumbOpcode) -> Result<(), ExecuteError> {
        match opcode.instruction {
            ThumbInstruction::MoveShiftedRegister {
                operation,
                offset5,
                rs,
                rd,
            } => {
                self.move_shifted_register(operation, offset5, rs, rd);
                Ok(())
            }
            ThumbInstruction::AddSubtract {
                immediate,
                subtract,
                rn_offset3,
                rs,
                rd,
            } => {
                self.add_subtract(immediate, subtract, rn_offset3, rs, rd);
                Ok(())
            }
            ThumbInstruction::MoveCompareAddSubtractImmediate {
                operation,
                rd,
                offset8,
            } => {
                self.move_compare_add_subtract_imm(operation, rd, offset8);
                Ok(())
            }
            ThumbInstruction::AluOperation { operation, rs, rd } => {
                self.alu_operation(operation, rs, rd);
                Ok(())
            }
            ThumbInstruction::HighRegisterOperation { operation, rs, rd } => {
                self.high_register_operation(operation, rs, rd);
                Ok(())
            }
            ThumbInstruction::PcRelativeLoad { rd, word8 } => self.pc_relative_load(rd, word8),
            ThumbInstruction::LoadStoreRegisterOffset {
                load,
                byte_quantity,
                ro,
                rb,
                rd,
            } => self.load_store_register_offset(load, byte_quantity, ro, rb, rd),
            ThumbInstruction::LoadStoreSignExtendedHalfword {
                h,
                sign_extend,
                ro,
                rb,
                rd,
            } => self.load_store_sign_extended(h, sign_extend, ro, rb, rd),
            ThumbInstruction::LoadStoreImmediateOffset {
                load,
                byte_quantity,
                offset5,
                rb,
                rd,
            } => self.load_store_immediate_offset(load, byte_quantity, offset5, rb, rd),
            ThumbInstruction::LoadStoreHalfword {
                load,
                offset5,
                rb,
                rd,
            } => self.load_store_halfword(load, offset5, rb, rd),
            ThumbInstruction::SpRelativeLoadStore { load, rd, word8 } => {
                self.sp_relative_load_store(load, rd, word8)
            }
            ThumbInstruction::LoadAddress { sp, rd, word8 } => {
                self.load_address(sp, rd, word8);
                Ok(())
            }
            ThumbInstruction::AddToStackPointer { negative, offset7 } => {
                self.add_to_stack_pointer(negative, offset7);
                Ok(())
            }
            ThumbInstruction::PushPopRegisters {
                load,
                store_lr_load_pc,
                register_list,
            } => self.push_pop_registers(load, store_lr_load_pc, register_list),
            ThumbInstruction::MultipleLoadStore {
                load,
                rb,
                register_list,
            } => self.multiple_load_store(load, rb, register_list),
            ThumbInstruction::ConditionalBranch { condition, offset8 } => {
                self.conditional_branch(condition, offset8);
                Ok(())
            }
            ThumbInstruction::SoftwareInterrupt { .. } => {
                self.thumb_software_interrupt();
                Ok(())
            }
            ThumbInstruction::UnconditionalBranch { offset11 } => {
                self.unconditional_branch(offset11);
                Ok(())
            }
            ThumbInstruction::LongBranchAndLink {
                low_offset,
                offset11,
            } => {
                self.long_branch_and_link(low_offset, offset11);
                Ok(())
            }
        }
    }
}
