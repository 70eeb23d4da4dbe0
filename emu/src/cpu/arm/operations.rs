//! Execution rules for the ARM instruction set.
//!
//! Every method assumes r15 was already advanced past the instruction by
//! the fetch step, so a read of r15 here observes `instruction + 4`; the
//! rules add the remaining prefetch offset where the architecture wants
//! `instruction + 8` (or `+ 12` for a stored r15).

use crate::bitwise::Bits;
use crate::cpu::alu::{is_carry, is_overflow};
use crate::cpu::arm::alu_opcode::AluOpcode;
use crate::cpu::arm::instructions::{
    HalfwordOffset, Operand2, PsrOp, PsrOperand, TransferOffset,
};
use crate::cpu::mode::Mode;
use crate::cpu::processor::Processor;
use crate::cpu::psr::CpuState;
use crate::cpu::register::Register;
use crate::error::{ExecuteError, StateError};

impl Processor {
    /// Evaluates the second operand, updating C through the shifter for
    /// register operands.
    fn data_processing_operand(&mut self, operand2: Operand2) -> Result<u32, StateError> {
        match operand2 {
            Operand2::Immediate { base, rotate } => Ok(Operand2::immediate_value(base, rotate)),
            Operand2::Register { rm, shift } => {
                let mut value = self.register(rm);
                if rm.is_pc() {
                    value = value.wrapping_add(4);
                    if shift.by_register() {
                        value = value.wrapping_add(4);
                    }
                }
                shift.apply(value, self)
            }
        }
    }

    pub(crate) fn data_processing(
        &mut self,
        opcode: AluOpcode,
        set_conditions: bool,
        rn: Register,
        rd: Register,
        operand2: Operand2,
    ) -> Result<(), ExecuteError> {
        // Opcodes always set flags; the previous CPSR comes back at the
        // end when the s bit is clear.
        let previous = self.cpsr();
        let operand2_value = self.data_processing_operand(operand2)?;
        let mut operand1 = self.register(rn);
        if rn.is_pc() {
            operand1 = operand1.wrapping_add(4);
            if matches!(operand2, Operand2::Register { shift, .. } if shift.by_register()) {
                operand1 = operand1.wrapping_add(4);
            }
        }
        let (result, write_back) = opcode.evaluate(operand1, operand2_value, self);
        if write_back {
            self.set_register(rd, result);
            // A write to r15 with the s bit set atomically returns from an
            // exception by restoring the saved status register.
            if rd.is_pc() && set_conditions {
                let saved = self.spsr()?;
                self.set_cpsr(saved.into())?;
                return Ok(());
            }
        }
        if !set_conditions {
            self.restore_cpsr_flags(previous);
        }
        Ok(())
    }

    pub(crate) fn psr_transfer(&mut self, use_cpsr: bool, op: PsrOp) -> Result<(), ExecuteError> {
        match op {
            PsrOp::Read { rd } => {
                if rd.is_pc() {
                    return Err(StateError::PcForbidden("the mrs destination").into());
                }
                let value = if use_cpsr { self.cpsr() } else { self.spsr()? };
                self.set_register(rd, value.into());
                Ok(())
            }
            PsrOp::Write {
                operand,
                flags_only,
            } => {
                let mut value = match operand {
                    PsrOperand::Register(rm) => {
                        if rm.is_pc() {
                            return Err(StateError::PcForbidden("the msr source").into());
                        }
                        self.register(rm)
                    }
                    PsrOperand::Immediate { base, rotate } => {
                        Operand2::immediate_value(base, rotate)
                    }
                };
                // The flags-only form touches bits 31:28 only, and User
                // mode never gets to touch anything else.
                if flags_only || self.mode() == Mode::User {
                    let current: u32 = if use_cpsr {
                        self.cpsr().into()
                    } else {
                        self.spsr()?.into()
                    };
                    value = (value & 0xf000_0000) | (current & 0x0fff_ffff);
                }
                if use_cpsr {
                    self.set_cpsr(value)?;
                } else {
                    self.set_spsr(value)?;
                }
                Ok(())
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn multiply(
        &mut self,
        long: bool,
        signed: bool,
        accumulate: bool,
        set_conditions: bool,
        rd: Register,
        rn: Register,
        rs: Register,
        rm: Register,
    ) {
        let a = self.register(rm);
        let b = self.register(rs);
        if !long {
            let mut result = a.wrapping_mul(b);
            if accumulate {
                result = result.wrapping_add(self.register(rn));
            }
            self.set_register(rd, result);
            if set_conditions {
                self.set_negative(result.get_bit(31));
                self.set_zero(result == 0);
            }
            return;
        }
        // rd is RdHi, rn is RdLo.
        let accumulator = if accumulate {
            (u64::from(self.register(rd)) << 32) | u64::from(self.register(rn))
        } else {
            0
        };
        let result = if signed {
            (i64::from(a as i32))
                .wrapping_mul(i64::from(b as i32))
                .wrapping_add(accumulator as i64) as u64
        } else {
            u64::from(a)
                .wrapping_mul(u64::from(b))
                .wrapping_add(accumulator)
        };
        self.set_register(rn, result as u32);
        self.set_register(rd, (result >> 32) as u32);
        if set_conditions {
            self.set_negative(result >> 63 != 0);
            self.set_zero(result == 0);
        }
    }

    pub(crate) fn single_data_swap(
        &mut self,
        byte_quantity: bool,
        rd: Register,
        rm: Register,
        rn: Register,
    ) -> Result<(), ExecuteError> {
        let address = self.register(rn);
        if byte_quantity {
            let value = self.memory.read_byte(address)?;
            let to_write = self.register(rm);
            self.set_register(rd, u32::from(value));
            self.memory.write_byte(address, to_write as u8)?;
        } else {
            let value = self.memory.read_word(address)?;
            let to_write = self.register(rm);
            self.set_register(rd, value);
            self.memory.write_word(address, to_write)?;
        }
        Ok(())
    }

    pub(crate) fn branch_exchange(&mut self, rn: Register) {
        let destination = self.register(rn);
        if destination.get_bit(0) {
            self.cpsr.set_cpu_state(CpuState::Thumb);
            self.registers.set_program_counter(destination & !1);
        } else {
            self.registers.set_program_counter(destination);
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn halfword_data_transfer(
        &mut self,
        load: bool,
        signed: bool,
        halfword: bool,
        write_back: bool,
        up: bool,
        preindex: bool,
        rd: Register,
        rn: Register,
        offset: HalfwordOffset,
    ) -> Result<(), ExecuteError> {
        let offset_value = match offset {
            HalfwordOffset::Immediate(value) => value,
            HalfwordOffset::Register(rm) => self.register(rm),
        };
        let mut address = self.register(rn);
        if rn.is_pc() {
            address = address.wrapping_add(4);
        }
        if preindex {
            address = if up {
                address.wrapping_add(offset_value)
            } else {
                address.wrapping_sub(offset_value)
            };
        }
        if load {
            let data = if halfword {
                let value = self.memory.read_halfword(address)?;
                if signed {
                    value as i16 as i32 as u32
                } else {
                    u32::from(value)
                }
            } else {
                let value = self.memory.read_byte(address)?;
                if signed {
                    value as i8 as i32 as u32
                } else {
                    u32::from(value)
                }
            };
            self.set_register(rd, data);
        } else {
            let mut data = self.register(rd);
            if rd.is_pc() {
                data = data.wrapping_add(8);
            }
            self.memory.write_halfword(address, data as u16)?;
        }
        if !preindex {
            if rn.is_pc() {
                return Err(StateError::PcForbidden("a transfer base with post-indexing").into());
            }
            let new_base = if up {
                address.wrapping_add(offset_value)
            } else {
                address.wrapping_sub(offset_value)
            };
            self.set_register(rn, new_base);
        } else if write_back {
            if rn.is_pc() {
                return Err(StateError::PcForbidden("a transfer base with writeback").into());
            }
            self.set_register(rn, address);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn single_data_transfer(
        &mut self,
        load: bool,
        byte_quantity: bool,
        write_back: bool,
        up: bool,
        preindex: bool,
        rd: Register,
        rn: Register,
        offset: TransferOffset,
    ) -> Result<(), ExecuteError> {
        let offset_value = match offset {
            TransferOffset::Immediate(value) => value,
            TransferOffset::Register { rm, shift } => {
                if rm.is_pc() {
                    return Err(StateError::PcForbidden("an offset in a data transfer").into());
                }
                let value = self.register(rm);
                shift.apply(value, self)?
            }
        };
        let mut address = self.register(rn);
        if rn.is_pc() {
            address = address.wrapping_add(4);
        }
        if preindex {
            address = if up {
                address.wrapping_add(offset_value)
            } else {
                address.wrapping_sub(offset_value)
            };
        }
        if load {
            let value = if byte_quantity {
                u32::from(self.memory.read_byte(address)?)
            } else {
                self.memory.read_word(address)?
            };
            self.set_register(rd, value);
        } else {
            let mut to_store = self.register(rd);
            if rd.is_pc() {
                to_store = to_store.wrapping_add(8);
            }
            if byte_quantity {
                self.memory.write_byte(address, to_store as u8)?;
            } else {
                self.memory.write_word(address, to_store)?;
            }
        }
        if !preindex {
            if rn.is_pc() {
                return Err(StateError::PcForbidden("a transfer base with post-indexing").into());
            }
            let new_base = if up {
                address.wrapping_add(offset_value)
            } else {
                address.wrapping_sub(offset_value)
            };
            self.set_register(rn, new_base);
        } else if write_back {
            if rn.is_pc() {
                return Err(StateError::PcForbidden("a transfer base with writeback").into());
            }
            self.set_register(rn, address);
        }
        Ok(())
    }

    fn block_data_store(
        &mut self,
        force_user: bool,
        write_back: bool,
        up: bool,
        preindex: bool,
        rn: Register,
        register_list: u16,
    ) -> Result<(), ExecuteError> {
        let mut to_store = Vec::with_capacity(16);
        for i in 0..16_u8 {
            if register_list.get_bit(i) {
                let register = Register::from(i);
                let value = if force_user {
                    self.user_register(register)
                } else {
                    self.register(register)
                };
                to_store.push(value);
            }
        }
        // Transfers go to ascending addresses, so storing downwards walks
        // the list in the opposite order.
        if !up {
            to_store.reverse();
        }
        let mut address = self.register(rn);
        for value in to_store {
            if preindex {
                address = if up {
                    address.wrapping_add(4)
                } else {
                    address.wrapping_sub(4)
                };
            }
            self.memory.write_word(address, value)?;
            if !preindex {
                address = if up {
                    address.wrapping_add(4)
                } else {
                    address.wrapping_sub(4)
                };
            }
        }
        if write_back {
            self.set_register(rn, address);
        }
        Ok(())
    }

    fn block_data_load(
        &mut self,
        force_user: bool,
        write_back: bool,
        up: bool,
        preindex: bool,
        rn: Register,
        register_list: u16,
    ) -> Result<(), ExecuteError> {
        let use_user_bank = force_user && !register_list.get_bit(15);
        let mut to_read = Vec::with_capacity(16);
        let mut loaded_base = false;
        for i in 0..16_u8 {
            if register_list.get_bit(i) {
                if rn == Register::from(i) {
                    loaded_base = true;
                }
                to_read.push(Register::from(i));
            }
        }
        if !up {
            to_read.reverse();
        }
        let mut address = self.register(rn);
        for register in to_read {
            if preindex {
                address = if up {
                    address.wrapping_add(4)
                } else {
                    address.wrapping_sub(4)
                };
            }
            let value = self.memory.read_word(address)?;
            if use_user_bank {
                self.set_user_register(register, value);
            } else {
                self.set_register(register, value);
            }
            if !preindex {
                address = if up {
                    address.wrapping_add(4)
                } else {
                    address.wrapping_sub(4)
                };
            }
        }
        if write_back && !loaded_base {
            self.set_register(rn, address);
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn block_data_transfer(
        &mut self,
        load: bool,
        write_back: bool,
        force_user: bool,
        up: bool,
        preindex: bool,
        rn: Register,
        register_list: u16,
    ) -> Result<(), ExecuteError> {
        if load {
            self.block_data_load(force_user, write_back, up, preindex, rn, register_list)?;
        } else {
            self.block_data_store(force_user, write_back, up, preindex, rn, register_list)?;
        }
        // ldm with the s bit and r15 in the list restores the saved status
        // register after the transfer.
        if force_user && load && register_list.get_bit(15) {
            let saved = self.spsr()?;
            self.set_cpsr(saved.into())?;
        }
        Ok(())
    }

    pub(crate) fn branch(&mut self, link: bool, offset: i32) {
        let pc = self.registers.program_counter();
        if link {
            self.set_register(Register::LR, pc);
        }
        // Sign-extend the 24-bit field and shift left 2.
        let displacement = (offset << 8) >> 6;
        let new_pc = (pc as i32).wrapping_add(4).wrapping_add(displacement);
        self.registers.set_program_counter(new_pc as u32);
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn coproc_data_transfer(
        &mut self,
        raw: u32,
        write_back: bool,
        up: bool,
        preindex: bool,
        rn: Register,
        coproc_number: u32,
        offset: u32,
    ) -> Result<(), ExecuteError> {
        let offset = offset << 2;
        let mut address = self.register(rn);
        if preindex {
            address = if up {
                address.wrapping_add(offset)
            } else {
                address.wrapping_sub(offset)
            };
        }
        self.dispatch_coprocessor(coproc_number, |coprocessor, p| {
            coprocessor.data_transfer(p, raw, address)
        })?;
        if write_back {
            if !preindex {
                address = if up {
                    address.wrapping_add(offset)
                } else {
                    address.wrapping_sub(offset)
                };
            }
            self.set_register(rn, address);
        }
        Ok(())
    }

    pub(crate) fn coproc_data_operation(
        &mut self,
        raw: u32,
        coproc_number: u32,
    ) -> Result<(), ExecuteError> {
        self.dispatch_coprocessor(coproc_number, |coprocessor, p| coprocessor.operation(p, raw))
    }

    pub(crate) fn coproc_register_transfer(
        &mut self,
        raw: u32,
        coproc_number: u32,
        rd: Register,
        load: bool,
    ) -> Result<(), ExecuteError> {
        self.dispatch_coprocessor(coproc_number, |coprocessor, p| {
            coprocessor.register_transfer(p, raw, rd, load)
        })
    }

    pub(crate) fn software_interrupt(&mut self) {
        let return_address = self.registers.program_counter();
        self.set_mode(Mode::Supervisor);
        self.set_register(Register::LR, return_address);
        self.registers.set_program_counter(0x8);
    }

    /// cmp semantics shared with the THUMB high-register form.
    pub(crate) fn compare(&mut self, a: u32, b: u32) {
        self.set_carry(is_carry(a, b, true));
        self.set_overflow(is_overflow(a, b, true));
        let result = a.wrapping_sub(b);
        self.set_zero(result == 0);
        self.set_negative(result.get_bit(31));
    }
}
