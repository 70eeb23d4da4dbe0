//! Execution rules for the THUMB instruction set.
//!
//! THUMB execution is implicitly unconditional except for the conditional
//! branch. r15 was already advanced by 2 at fetch time, so the rules that
//! want the architectural `instruction + 4` add another 2.

use crate::bitwise::Bits;
use crate::cpu::alu::{is_carry, is_overflow, shift_immediate, ShiftKind};
use crate::cpu::condition::Condition;
use crate::cpu::mode::Mode;
use crate::cpu::processor::Processor;
use crate::cpu::psr::CpuState;
use crate::cpu::register::Register;
use crate::cpu::thumb::alu_opcode::ThumbAluOpcode;
use crate::cpu::thumb::instruction::{HighRegisterOp, McasOp};
use crate::error::ExecuteError;

impl Processor {
    pub(crate) fn move_shifted_register(
        &mut self,
        operation: ShiftKind,
        offset5: u16,
        rs: Register,
        rd: Register,
    ) {
        let value = self.register(rs);
        let outcome = shift_immediate(operation, u32::from(offset5), value, self.carry());
        self.set_carry(outcome.carry);
        self.set_zero(outcome.value == 0);
        self.set_negative(outcome.value.get_bit(31));
        self.set_register(rd, outcome.value);
    }

    pub(crate) fn add_subtract(
        &mut self,
        immediate: bool,
        subtract: bool,
        rn_offset3: u16,
        rs: Register,
        rd: Register,
    ) {
        let start = self.register(rs);
        let difference = if immediate {
            u32::from(rn_offset3)
        } else {
            self.register(Register::from(rn_offset3))
        };
        self.set_carry(is_carry(start, difference, subtract));
        self.set_overflow(is_overflow(start, difference, subtract));
        let result = if subtract {
            start.wrapping_sub(difference)
        } else {
            start.wrapping_add(difference)
        };
        self.set_zero(result == 0);
        self.set_negative(result.get_bit(31));
        self.set_register(rd, result);
    }

    pub(crate) fn move_compare_add_subtract_imm(
        &mut self,
        operation: McasOp,
        rd: Register,
        offset8: u32,
    ) {
        let start = self.register(rd);
        let result = match operation {
            McasOp::Mov => offset8,
            McasOp::Cmp | McasOp::Sub => {
                self.set_carry(is_carry(start, offset8, true));
                self.set_overflow(is_overflow(start, offset8, true));
                start.wrapping_sub(offset8)
            }
            McasOp::Add => {
                self.set_carry(is_carry(start, offset8, false));
                self.set_overflow(is_overflow(start, offset8, false));
                start.wrapping_add(offset8)
            }
        };
        self.set_zero(result == 0);
        self.set_negative(result.get_bit(31));
        if operation != McasOp::Cmp {
            self.set_register(rd, result);
        }
    }

    pub(crate) fn alu_operation(&mut self, operation: ThumbAluOpcode, rs: Register, rd: Register) {
        let a = self.register(rd);
        let b = self.register(rs);
        let (result, write_back) = operation.evaluate(a, b, self);
        if write_back {
            self.set_register(rd, result);
        }
    }

    pub(crate) fn high_register_operation(
        &mut self,
        operation: HighRegisterOp,
        rs: Register,
        rd: Register,
    ) {
        // In THUMB state a read of r15 observes the instruction plus 4.
        let mut a = self.register(rd);
        if rd.is_pc() {
            a = a.wrapping_add(2);
        }
        let mut b = self.register(rs);
        if rs.is_pc() {
            b = b.wrapping_add(2);
        }
        match operation {
            HighRegisterOp::Add => self.set_register(rd, a.wrapping_add(b)),
            HighRegisterOp::Cmp => self.compare(a, b),
            HighRegisterOp::Mov => self.set_register(rd, b),
            HighRegisterOp::Bx => self.exchange_to(b),
        }
    }

    /// The BX rule: bit 0 of the target selects THUMB and is cleared from
    /// the pc; a clear bit 0 lands in ARM state.
    pub(crate) fn exchange_to(&mut self, destination: u32) {
        if destination.get_bit(0) {
            self.cpsr.set_cpu_state(CpuState::Thumb);
            self.registers.set_program_counter(destination & !1);
        } else {
            self.cpsr.set_cpu_state(CpuState::Arm);
            self.registers.set_program_counter(destination);
        }
    }

    pub(crate) fn pc_relative_load(
        &mut self,
        rd: Register,
        word8: u16,
    ) -> Result<(), ExecuteError> {
        let mut base = self.registers.program_counter().wrapping_add(2);
        base &= 0xffff_fffc;
        base = base.wrapping_add(u32::from(word8) << 2);
        let value = self.memory.read_word(base)?;
        self.set_register(rd, value);
        Ok(())
    }

    pub(crate) fn load_store_register_offset(
        &mut self,
        load: bool,
        byte_quantity: bool,
        ro: Register,
        rb: Register,
        rd: Register,
    ) -> Result<(), ExecuteError> {
        let address = self.register(rb).wrapping_add(self.register(ro));
        if load {
            let value = if byte_quantity {
                u32::from(self.memory.read_byte(address)?)
            } else {
                self.memory.read_word(address)?
            };
            self.set_register(rd, value);
        } else {
            let value = self.register(rd);
            if byte_quantity {
                self.memory.write_byte(address, value as u8)?;
            } else {
                self.memory.write_word(address, value)?;
            }
        }
        Ok(())
    }

    pub(crate) fn load_store_sign_extended(
        &mut self,
        h: bool,
        sign_extend: bool,
        ro: Register,
        rb: Register,
        rd: Register,
    ) -> Result<(), ExecuteError> {
        let address = self.register(rb).wrapping_add(self.register(ro));
        if sign_extend {
            let value = if h {
                self.memory.read_halfword(address)? as i16 as i32 as u32
            } else {
                self.memory.read_byte(address)? as i8 as i32 as u32
            };
            self.set_register(rd, value);
            return Ok(());
        }
        if h {
            let value = self.memory.read_halfword(address)?;
            self.set_register(rd, u32::from(value));
            return Ok(());
        }
        let value = self.register(rd);
        self.memory.write_halfword(address, value as u16)?;
        Ok(())
    }

    pub(crate) fn load_store_immediate_offset(
        &mut self,
        load: bool,
        byte_quantity: bool,
        offset5: u16,
        rb: Register,
        rd: Register,
    ) -> Result<(), ExecuteError> {
        let offset = if byte_quantity {
            u32::from(offset5)
        } else {
            u32::from(offset5) << 2
        };
        let address = self.register(rb).wrapping_add(offset);
        if load {
            let value = if byte_quantity {
                u32::from(self.memory.read_byte(address)?)
            } else {
                self.memory.read_word(address)?
            };
            self.set_register(rd, value);
        } else {
            let value = self.register(rd);
            if byte_quantity {
                self.memory.write_byte(address, value as u8)?;
            } else {
                self.memory.write_word(address, value)?;
            }
        }
        Ok(())
    }

    pub(crate) fn load_store_halfword(
        &mut self,
        load: bool,
        offset5: u16,
        rb: Register,
        rd: Register,
    ) -> Result<(), ExecuteError> {
        let address = self
            .register(rb)
            .wrapping_add(u32::from(offset5) << 1);
        if load {
            let value = self.memory.read_halfword(address)?;
            self.set_register(rd, u32::from(value));
        } else {
            let value = self.register(rd);
            self.memory.write_halfword(address, value as u16)?;
        }
        Ok(())
    }

    pub(crate) fn sp_relative_load_store(
        &mut self,
        load: bool,
        rd: Register,
        word8: u16,
    ) -> Result<(), ExecuteError> {
        let address = self
            .register(Register::SP)
            .wrapping_add(u32::from(word8) << 2);
        if load {
            let value = self.memory.read_word(address)?;
            self.set_register(rd, value);
        } else {
            let value = self.register(rd);
            self.memory.write_word(address, value)?;
        }
        Ok(())
    }

    pub(crate) fn load_address(&mut self, sp: bool, rd: Register, word8: u16) {
        let mut value = if sp {
            self.register(Register::SP)
        } else {
            self.registers.program_counter().wrapping_add(2) & 0xffff_fffc
        };
        value = value.wrapping_add(u32::from(word8) << 2);
        self.set_register(rd, value);
    }

    pub(crate) fn add_to_stack_pointer(&mut self, negative: bool, offset7: u16) {
        let offset = u32::from(offset7) << 2;
        let sp = self.register(Register::SP);
        let sp = if negative {
            sp.wrapping_sub(offset)
        } else {
            sp.wrapping_add(offset)
        };
        self.set_register(Register::SP, sp);
    }

    pub(crate) fn push_pop_registers(
        &mut self,
        load: bool,
        store_lr_load_pc: bool,
        register_list: u8,
    ) -> Result<(), ExecuteError> {
        let mut address = self.register(Register::SP);
        if load {
            for i in 0..8_u8 {
                if (register_list >> i) & 1 != 0 {
                    let value = self.memory.read_word(address)?;
                    self.set_register(Register::from(i), value);
                    address = address.wrapping_add(4);
                }
            }
            if store_lr_load_pc {
                let value = self.memory.read_word(address)?;
                // The loaded value selects the state, like bx.
                self.exchange_to(value);
                address = address.wrapping_add(4);
            }
        } else {
            let mut to_store = Vec::with_capacity(9);
            for i in 0..8_u8 {
                if (register_list >> i) & 1 != 0 {
                    to_store.push(self.register(Register::from(i)));
                }
            }
            if store_lr_load_pc {
                to_store.push(self.register(Register::LR));
            }
            // The stack grows down but the lowest register lands at the
            // lowest address.
            for value in to_store.into_iter().rev() {
                address = address.wrapping_sub(4);
                self.memory.write_word(address, value)?;
            }
        }
        self.set_register(Register::SP, address);
        Ok(())
    }

    pub(crate) fn multiple_load_store(
        &mut self,
        load: bool,
        rb: Register,
        register_list: u8,
    ) -> Result<(), ExecuteError> {
        let mut address = self.register(rb);
        for i in 0..8_u8 {
            if (register_list >> i) & 1 == 0 {
                continue;
            }
            let register = Register::from(i);
            if load {
                let value = self.memory.read_word(address)?;
                self.set_register(register, value);
            } else {
                let value = self.register(register);
                self.memory.write_word(address, value)?;
            }
            address = address.wrapping_add(4);
        }
        self.set_register(rb, address);
        Ok(())
    }

    pub(crate) fn conditional_branch(&mut self, condition: Condition, offset8: u16) {
        if !self.cpsr.can_execute(condition) {
            return;
        }
        let offset = (u32::from(offset8) << 1).sign_extended(9);
        let target = self
            .registers
            .program_counter()
            .wrapping_add(2)
            .wrapping_add(offset);
        self.registers.set_program_counter(target);
    }

    pub(crate) fn thumb_software_interrupt(&mut self) {
        let return_address = self.registers.program_counter();
        self.set_mode(Mode::Supervisor);
        self.set_register(Register::LR, return_address);
        self.registers.set_program_counter(0x8);
        self.cpsr.set_cpu_state(CpuState::Arm);
    }

    pub(crate) fn unconditional_branch(&mut self, offset11: u16) {
        let offset = (u32::from(offset11) << 1).sign_extended(12);
        let target = self
            .registers
            .program_counter()
            .wrapping_add(2)
            .wrapping_add(offset);
        self.registers.set_program_counter(target);
    }

    pub(crate) fn long_branch_and_link(&mut self, low_offset: bool, offset11: u16) {
        let pc = self.registers.program_counter();
        if low_offset {
            let target = self
                .register(Register::LR)
                .wrapping_add(u32::from(offset11) << 1);
            self.set_register(Register::LR, pc | 1);
            self.registers.set_program_counter(target);
        } else {
            let offset = (u32::from(offset11) << 12).sign_extended(23);
            self.set_register(Register::LR, pc.wrapping_add(2).wrapping_add(offset));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cpu::mode::Mode;
    use crate::cpu::parse_thumb;
    use crate::cpu::processor::Processor;
    use crate::cpu::register::Register;
    use crate::memory::Memory;
    use pretty_assertions::assert_eq;

    fn r(number: u8) -> Register {
        Register::from(number)
    }

    fn test_processor() -> Processor {
        let mut p = Processor::default();
        p.memory_mut().set_region(4096, &[0; 4096]).unwrap();
        p.set_thumb_state(true);
        p
    }

    fn execute(p: &mut Processor, raw: u16) {
        let opcode = parse_thumb(raw).unwrap();
        p.execute_thumb(opcode).unwrap();
    }

    #[test]
    fn add_subtract_register_form() {
        let mut p = test_processor();
        p.set_register(r(1), 40);
        p.set_register(r(2), 2);
        execute(&mut p, 0x1888); // add r0, r1, r2
        assert_eq!(p.register(r(0)), 42);
        assert!(!p.zero());
        assert!(!p.negative());
        assert!(!p.carry());

        // sub r1, r0, 7 underflows: N set, borrow means C clear.
        p.set_register(r(0), 6);
        execute(&mut p, 0b0001_1111_1100_0001);
        assert_eq!(p.register(r(1)), -1_i32 as u32);
        assert!(p.negative());
        assert!(!p.carry());
        assert!(!p.overflow());

        // add with wrap to zero sets C and Z.
        p.set_register(r(1), u32::MAX);
        p.set_register(r(2), 1);
        execute(&mut p, 0x1888); // add r0, r1, r2
        assert_eq!(p.register(r(0)), 0);
        assert!(p.zero());
        assert!(p.carry());
        assert!(!p.overflow());
    }

    #[test]
    fn move_shifted_register_uses_the_shifter_table() {
        let mut p = test_processor();
        p.set_register(r(3), 1);
        execute(&mut p, 0b0000_0001_0001_1010); // lsl r2, r3, 4
        assert_eq!(p.register(r(2)), 16);
        assert!(!p.zero());

        // lsr r2, r3, 0 means a shift by 32.
        p.set_register(r(3), 0x8000_0000);
        execute(&mut p, 0b0000_1000_0001_1010);
        assert_eq!(p.register(r(2)), 0);
        assert!(p.carry());
        assert!(p.zero());
    }

    #[test]
    fn move_compare_add_subtract_immediate() {
        let mut p = test_processor();
        execute(&mut p, 0b0010_0001_1111_1111); // mov r1, 255
        assert_eq!(p.register(r(1)), 255);

        execute(&mut p, 0b0010_1001_1111_1111); // cmp r1, 255
        assert!(p.zero());
        assert!(p.carry());
        assert_eq!(p.register(r(1)), 255);

        execute(&mut p, 0b0011_0001_0000_0001); // add r1, 1
        assert_eq!(p.register(r(1)), 256);

        execute(&mut p, 0b0011_1001_0000_0010); // sub r1, 2
        assert_eq!(p.register(r(1)), 254);
    }

    #[test]
    fn alu_operation_writes_back() {
        let mut p = test_processor();
        p.set_register(r(0), 1000);
        p.set_register(r(3), 8);
        execute(&mut p, 0b0100_0000_0001_1000); // and r0, r3
        assert_eq!(p.register(r(0)), 8);
        assert!(!p.negative());
        assert!(!p.zero());

        // tst doesn't write back.
        p.set_register(r(6), 0xf0);
        p.set_register(r(7), 0x0f);
        execute(&mut p, 0b0100_0010_0011_1110); // tst r6, r7
        assert_eq!(p.register(r(6)), 0xf0);
        assert!(p.zero());
    }

    #[test]
    fn high_register_operations() {
        // add r1, r8
        let mut p = test_processor();
        p.set_register(r(8), 10);
        p.set_register(r(1), 10);
        execute(&mut p, 0b0100_0100_0100_0001);
        assert_eq!(p.register(r(1)), 20);

        // cmp r9, r0 with equal values.
        let mut p = test_processor();
        p.set_register(r(9), 10);
        p.set_register(r(0), 10);
        execute(&mut p, 0b0100_0101_1000_0001);
        assert!(p.zero());
        assert!(p.carry());
        assert!(!p.negative());

        // mov r9, r0
        let mut p = test_processor();
        p.set_register(r(0), 1337);
        execute(&mut p, 0b0100_0110_1000_0001);
        assert_eq!(p.register(r(9)), 1337);
    }

    #[test]
    fn bx_exchanges_state_by_the_low_bit() {
        let mut p = test_processor();
        p.set_register(Register::LR, 123);
        execute(&mut p, 0b0100_0111_0111_0000); // bx lr
        assert_eq!(p.register(Register::PC), 122);
        assert!(p.thumb_state());

        let mut p = test_processor();
        p.set_register(Register::LR, 124);
        execute(&mut p, 0b0100_0111_0111_0000);
        assert_eq!(p.register(Register::PC), 124);
        assert!(!p.thumb_state());
    }

    #[test]
    fn pc_relative_load_aligns_the_base() {
        let mut p = test_processor();
        p.set_register(Register::PC, 4098);
        p.memory_mut().write_word(4096 + 4 + 352, 999).unwrap();
        execute(&mut p, 0b0100_1001_0101_1000); // ldr r1, [pc, 352]
        assert_eq!(p.register(r(1)), 999);
    }

    #[test]
    fn load_store_register_offset() {
        let mut p = test_processor();
        p.set_register(r(0), 2500);
        p.set_register(r(1), 2500);
        p.set_register(r(2), 0xfeef_ac1f);
        execute(&mut p, 0b0101_0000_0100_1010); // str r2, [r1, r0]
        assert_eq!(p.memory().read_word(5000), Ok(0xfeef_ac1f));

        p.set_register(r(2), 0);
        execute(&mut p, 0b0101_1000_0100_1010); // ldr r2, [r1, r0]
        assert_eq!(p.register(r(2)), 0xfeef_ac1f);

        execute(&mut p, 0b0101_0100_0100_1010); // strb r2, [r1, r0]
        assert_eq!(p.memory().read_byte(5000), Ok(0x1f));
        execute(&mut p, 0b0101_1100_0100_1011); // ldrb r3, [r1, r0]
        assert_eq!(p.register(r(3)), 0x1f);
    }

    #[test]
    fn load_store_sign_extended() {
        let mut p = test_processor();
        p.set_register(r(1), 5000);
        p.set_register(r(2), 0);
        p.set_register(r(0), 0xffff_8001);
        execute(&mut p, 0b0101_0010_1000_1000); // strh r0, [r1, r2]
        assert_eq!(p.memory().read_halfword(5000), Ok(0x8001));

        execute(&mut p, 0b0101_1010_1000_1011); // ldrh r3, [r1, r2]
        assert_eq!(p.register(r(3)), 0x8001);

        execute(&mut p, 0b0101_1110_1000_1011); // ldsh r3, [r1, r2]
        assert_eq!(p.register(r(3)), 0xffff_8001);

        p.memory_mut().write_byte(5000, -5_i8 as u8).unwrap();
        execute(&mut p, 0b0101_0110_1000_1011); // ldsb r3, [r1, r2]
        assert_eq!(p.register(r(3)), -5_i32 as u32);
    }

    #[test]
    fn load_store_immediate_offset() {
        let mut p = test_processor();
        p.set_register(r(7), 5000);
        p.set_register(r(0), 0xffff_ffff);
        execute(&mut p, 0b0110_0000_1011_1000); // str r0, [r7, 8]
        assert_eq!(p.memory().read_word(5008), Ok(0xffff_ffff));

        execute(&mut p, 0b0110_1000_1011_1001); // ldr r1, [r7, 8]
        assert_eq!(p.register(r(1)), 0xffff_ffff);

        execute(&mut p, 0b0111_0000_1011_1000); // strb r0, [r7, 2]
        assert_eq!(p.memory().read_byte(5002), Ok(0xff));
    }

    #[test]
    fn load_store_halfword() {
        let mut p = test_processor();
        p.set_register(r(0), 5000);
        p.set_register(r(1), 0x1337);
        execute(&mut p, 0b1000_0000_0100_0001); // strh r1, [r0, 2]
        assert_eq!(p.memory().read_halfword(5002), Ok(0x1337));

        p.set_register(r(1), 0);
        execute(&mut p, 0b1000_1000_0100_0001); // ldrh r1, [r0, 2]
        assert_eq!(p.register(r(1)), 0x1337);
    }

    #[test]
    fn sp_relative_load_store() {
        let mut p = test_processor();
        p.set_register(Register::SP, 5000);
        p.set_register(r(0), 999);
        execute(&mut p, 0b1001_0000_0000_0111); // str r0, [sp, 28]
        assert_eq!(p.memory().read_word(5028), Ok(999));

        p.set_register(r(0), 0);
        execute(&mut p, 0b1001_1000_0000_0111); // ldr r0, [sp, 28]
        assert_eq!(p.register(r(0)), 999);
    }

    #[test]
    fn load_address_from_pc_and_sp() {
        let mut p = test_processor();
        p.set_register(Register::PC, 4098);
        execute(&mut p, 0b1010_0000_0000_1010); // add r0, pc, 40
        assert_eq!(p.register(r(0)), 4100 + 40);

        p.set_register(Register::SP, 2000);
        execute(&mut p, 0b1010_1000_0000_1010); // add r0, sp, 40
        assert_eq!(p.register(r(0)), 2040);
    }

    #[test]
    fn add_to_stack_pointer() {
        let mut p = test_processor();
        p.set_register(Register::SP, 1000);
        execute(&mut p, 0xb007); // add sp, 28
        assert_eq!(p.register(Register::SP), 1028);
        execute(&mut p, 0xb087); // add sp, -28
        assert_eq!(p.register(Register::SP), 1000);
    }

    #[test]
    fn push_pop_round_trip() {
        let mut p = test_processor();
        p.set_register(Register::SP, 0x1800);
        p.set_register(Register::LR, 0x1234);
        for i in 4..8 {
            p.set_register(r(i), u32::from(i) * 100);
        }
        execute(&mut p, 0xb5f0); // push {r4-r7, lr}
        assert_eq!(p.register(Register::SP), 0x1800 - 20);
        assert_eq!(p.memory().read_word(0x1800 - 4), Ok(0x1234));
        assert_eq!(p.memory().read_word(0x1800 - 8), Ok(700));
        assert_eq!(p.memory().read_word(0x1800 - 20), Ok(400));

        for i in 4..8 {
            p.set_register(r(i), 0);
        }
        // pop {r4-r7, pc}: the loaded pc had bit 0 clear, so this lands in
        // ARM state.
        execute(&mut p, 0xbdf0);
        assert_eq!(p.register(Register::SP), 0x1800);
        assert_eq!(p.register(r(4)), 400);
        assert_eq!(p.register(r(7)), 700);
        assert_eq!(p.register(Register::PC), 0x1234);
        assert!(!p.thumb_state());
    }

    #[test]
    fn pop_into_pc_keeps_thumb_when_bit_zero_is_set() {
        let mut p = test_processor();
        p.set_register(Register::SP, 0x1800);
        p.memory_mut().write_word(0x1800, 0x1235).unwrap();
        execute(&mut p, 0xbd00); // pop {pc}
        assert_eq!(p.register(Register::PC), 0x1234);
        assert!(p.thumb_state());
        assert_eq!(p.register(Register::SP), 0x1804);
    }

    #[test]
    fn multiple_load_store_writes_back_the_base() {
        let mut p = test_processor();
        p.set_register(r(1), 0x1400);
        p.set_register(r(0), 11);
        p.set_register(r(2), 22);
        execute(&mut p, 0b1100_0001_0000_0101); // stmia r1!, {r0, r2}
        assert_eq!(p.register(r(1)), 0x1408);
        assert_eq!(p.memory().read_word(0x1400), Ok(11));
        assert_eq!(p.memory().read_word(0x1404), Ok(22));

        p.set_register(r(1), 0x1400);
        p.set_register(r(0), 0);
        p.set_register(r(2), 0);
        execute(&mut p, 0b1100_1001_0000_0101); // ldmia r1!, {r0, r2}
        assert_eq!(p.register(r(0)), 11);
        assert_eq!(p.register(r(2)), 22);
        assert_eq!(p.register(r(1)), 0x1408);
    }

    #[test]
    fn conditional_branch_takes_the_offset_when_met() {
        let mut p = test_processor();
        p.set_register(Register::PC, 1000);
        execute(&mut p, 0b1101_1011_1111_1100); // blt -8
        // N == V, so the branch falls through.
        assert_eq!(p.register(Register::PC), 1000);

        p.set_negative(true);
        execute(&mut p, 0b1101_1011_1111_1100);
        assert_eq!(p.register(Register::PC), 1000 + 2 - 8);
    }

    #[test]
    fn unconditional_branch() {
        let mut p = test_processor();
        p.set_register(Register::PC, 1000);
        execute(&mut p, 0b1110_0001_0010_1111); // b 606
        assert_eq!(p.register(Register::PC), 1000 + 2 + 606);
    }

    #[test]
    fn long_branch_and_link_pair() {
        let mut p = test_processor();
        p.memory_mut().write_halfword(4096, 0xf7ff).unwrap();
        p.memory_mut().write_halfword(4098, 0xfffc).unwrap();
        p.set_register(Register::PC, 4096);
        p.run_next_instruction().unwrap();
        p.run_next_instruction().unwrap();
        assert_eq!(p.register(Register::PC), 4092);
        assert_eq!(p.register(Register::LR), 4101);
    }

    #[test]
    fn thumb_software_interrupt_enters_arm_supervisor() {
        let mut p = test_processor();
        p.memory_mut().write_halfword(4096, 0xdf18).unwrap(); // swi 24
        p.set_register(Register::PC, 4096);
        p.run_next_instruction().unwrap();
        assert_eq!(p.mode(), Mode::Supervisor);
        assert_eq!(p.register(Register::PC), 0x8);
        assert_eq!(p.register(Register::LR), 4098);
        assert!(!p.thumb_state());
    }
}
