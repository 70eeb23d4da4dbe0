//! THUMB instruction decoding and disassembly.

use crate::bitwise::Bits;
use crate::cpu::alu::ShiftKind;
use crate::cpu::condition::Condition;
use crate::cpu::register::Register;
use crate::cpu::thumb::alu_opcode::ThumbAluOpcode;
use crate::error::DecodeError;

/// The four operations of the move/compare/add/subtract immediate format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McasOp {
    Mov,
    Cmp,
    Add,
    Sub,
}

impl From<u16> for McasOp {
    fn from(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => Self::Mov,
            0b01 => Self::Cmp,
            0b10 => Self::Add,
            _ => Self::Sub,
        }
    }
}

impl std::fmt::Display for McasOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mov => f.write_str("mov"),
            Self::Cmp => f.write_str("cmp"),
            Self::Add => f.write_str("add"),
            Self::Sub => f.write_str("sub"),
        }
    }
}

/// The four operations of the high-register format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighRegisterOp {
    Add,
    Cmp,
    Mov,
    Bx,
}

impl From<u16> for HighRegisterOp {
    fn from(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => Self::Add,
            0b01 => Self::Cmp,
            0b10 => Self::Mov,
            _ => Self::Bx,
        }
    }
}

/// A decoded 16-bit THUMB instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbInstruction {
    MoveShiftedRegister {
        operation: ShiftKind,
        offset5: u16,
        rs: Register,
        rd: Register,
    },
    AddSubtract {
        immediate: bool,
        subtract: bool,
        /// A register number or a 3-bit immediate, depending on the flag.
        rn_offset3: u16,
        rs: Register,
        rd: Register,
    },
    MoveCompareAddSubtractImmediate {
        operation: McasOp,
        rd: Register,
        offset8: u32,
    },
    AluOperation {
        operation: ThumbAluOpcode,
        rs: Register,
        rd: Register,
    },
    HighRegisterOperation {
        operation: HighRegisterOp,
        rs: Register,
        rd: Register,
    },
    PcRelativeLoad {
        rd: Register,
        word8: u16,
    },
    LoadStoreRegisterOffset {
        load: bool,
        byte_quantity: bool,
        ro: Register,
        rb: Register,
        rd: Register,
    },
    LoadStoreSignExtendedHalfword {
        h: bool,
        sign_extend: bool,
        ro: Register,
        rb: Register,
        rd: Register,
    },
    LoadStoreImmediateOffset {
        load: bool,
        byte_quantity: bool,
        offset5: u16,
        rb: Register,
        rd: Register,
    },
    LoadStoreHalfword {
        load: bool,
        offset5: u16,
        rb: Register,
        rd: Register,
    },
    SpRelativeLoadStore {
        load: bool,
        rd: Register,
        word8: u16,
    },
    LoadAddress {
        sp: bool,
        rd: Register,
        word8: u16,
    },
    AddToStackPointer {
        negative: bool,
        offset7: u16,
    },
    PushPopRegisters {
        load: bool,
        store_lr_load_pc: bool,
        register_list: u8,
    },
    MultipleLoadStore {
        load: bool,
        rb: Register,
        register_list: u8,
    },
    ConditionalBranch {
        condition: Condition,
        offset8: u16,
    },
    SoftwareInterrupt {
        comment: u8,
    },
    UnconditionalBranch {
        offset11: u16,
    },
    LongBranchAndLink {
        /// The second halfword of the pair carries the low offset half.
        low_offset: bool,
        offset11: u16,
    },
}

/// A decoded instruction together with the raw halfword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbOpcode {
    pub instruction: ThumbInstruction,
    pub raw: u16,
}

impl ThumbOpcode {
    /// The halfword this instruction was decoded from.
    #[must_use]
    pub const fn raw(&self) -> u16 {
        self.raw
    }
}

impl TryFrom<u16> for ThumbOpcode {
    type Error = DecodeError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Ok(Self {
            instruction: decode(raw)?,
            raw,
        })
    }
}

/// The format dispatcher, keyed on the top bits; the most determined
/// patterns come first.
fn decode(raw: u16) -> Result<ThumbInstruction, DecodeError> {
    use ThumbInstruction::*;

    if raw.get_bits(8..=15) == 0b1101_1111 {
        return Ok(SoftwareInterrupt {
            comment: (raw & 0xff) as u8,
        });
    }
    if raw.get_bits(12..=15) == 0b1101 {
        let condition = Condition::from(raw.get_bits(8..=11) as u8);
        // AL means unconditional and belongs to format 18.
        if condition == Condition::AL {
            return Err(DecodeError::ReservedCondition(raw));
        }
        return Ok(ConditionalBranch {
            condition,
            offset8: raw.get_bits(0..=7),
        });
    }
    if raw.get_bits(12..=15) == 0b1110 {
        return Ok(UnconditionalBranch {
            offset11: raw.get_bits(0..=10),
        });
    }
    if raw.get_bits(12..=15) == 0b1111 {
        return Ok(LongBranchAndLink {
            low_offset: raw.get_bit(11),
            offset11: raw.get_bits(0..=10),
        });
    }
    if raw.get_bits(12..=15) == 0b1100 {
        return Ok(MultipleLoadStore {
            load: raw.get_bit(11),
            rb: Register::from(raw.get_bits(8..=10)),
            register_list: (raw & 0xff) as u8,
        });
    }
    if raw.get_bits(8..=15) == 0b1011_0000 {
        return Ok(AddToStackPointer {
            negative: raw.get_bit(7),
            offset7: raw.get_bits(0..=6),
        });
    }
    if raw.get_bits(12..=15) == 0b1011 {
        return Ok(PushPopRegisters {
            load: raw.get_bit(11),
            store_lr_load_pc: raw.get_bit(8),
            register_list: (raw & 0xff) as u8,
        });
    }
    if raw.get_bits(12..=15) == 0b1001 {
        return Ok(SpRelativeLoadStore {
            load: raw.get_bit(11),
            rd: Register::from(raw.get_bits(8..=10)),
            word8: raw.get_bits(0..=7),
        });
    }
    if raw.get_bits(12..=15) == 0b1010 {
        return Ok(LoadAddress {
            sp: raw.get_bit(11),
            rd: Register::from(raw.get_bits(8..=10)),
            word8: raw.get_bits(0..=7),
        });
    }
    if raw.get_bits(12..=15) == 0b1000 {
        return Ok(LoadStoreHalfword {
            load: raw.get_bit(11),
            offset5: raw.get_bits(6..=10),
            rb: Register::from(raw.get_bits(3..=5)),
            rd: Register::from(raw.get_bits(0..=2)),
        });
    }
    if raw.get_bits(13..=15) == 0b011 {
        return Ok(LoadStoreImmediateOffset {
            load: raw.get_bit(11),
            byte_quantity: raw.get_bit(12),
            offset5: raw.get_bits(6..=10),
            rb: Register::from(raw.get_bits(3..=5)),
            rd: Register::from(raw.get_bits(0..=2)),
        });
    }
    if raw.get_bits(12..=15) == 0b0101 {
        if raw.get_bit(9) {
            return Ok(LoadStoreSignExtendedHalfword {
                h: raw.get_bit(11),
                sign_extend: raw.get_bit(10),
                ro: Register::from(raw.get_bits(6..=8)),
                rb: Register::from(raw.get_bits(3..=5)),
                rd: Register::from(raw.get_bits(0..=2)),
            });
        }
        return Ok(LoadStoreRegisterOffset {
            load: raw.get_bit(11),
            byte_quantity: raw.get_bit(10),
            ro: Register::from(raw.get_bits(6..=8)),
            rb: Register::from(raw.get_bits(3..=5)),
            rd: Register::from(raw.get_bits(0..=2)),
        });
    }
    if raw.get_bits(11..=15) == 0b01001 {
        return Ok(PcRelativeLoad {
            rd: Register::from(raw.get_bits(8..=10)),
            word8: raw.get_bits(0..=7),
        });
    }
    if raw.get_bits(10..=15) == 0b010000 {
        return Ok(AluOperation {
            operation: ThumbAluOpcode::from(raw.get_bits(6..=9)),
            rs: Register::from(raw.get_bits(3..=5)),
            rd: Register::from(raw.get_bits(0..=2)),
        });
    }
    if raw.get_bits(10..=15) == 0b010001 {
        // H1/H2 extend the 3-bit fields to the full register range.
        let mut rd = raw.get_bits(0..=2);
        if raw.get_bit(7) {
            rd |= 1 << 3;
        }
        let mut rs = raw.get_bits(3..=5);
        if raw.get_bit(6) {
            rs |= 1 << 3;
        }
        return Ok(HighRegisterOperation {
            operation: HighRegisterOp::from(raw.get_bits(8..=9)),
            rs: Register::from(rs),
            rd: Register::from(rd),
        });
    }
    if raw.get_bits(11..=15) == 0b00011 {
        return Ok(AddSubtract {
            immediate: raw.get_bit(10),
            subtract: raw.get_bit(9),
            rn_offset3: raw.get_bits(6..=8),
            rs: Register::from(raw.get_bits(3..=5)),
            rd: Register::from(raw.get_bits(0..=2)),
        });
    }
    if raw.get_bits(13..=15) == 0b000 {
        return Ok(MoveShiftedRegister {
            operation: ShiftKind::from(raw.get_bits(11..=12)),
            offset5: raw.get_bits(6..=10),
            rs: Register::from(raw.get_bits(3..=5)),
            rd: Register::from(raw.get_bits(0..=2)),
        });
    }
    // All that remains is 001x: move/compare/add/subtract immediate.
    Ok(MoveCompareAddSubtractImmediate {
        operation: McasOp::from(raw.get_bits(11..=12)),
        rd: Register::from(raw.get_bits(8..=10)),
        offset8: u32::from(raw.get_bits(0..=7)),
    })
}

/// Renders an 8-bit register list with dash ranges, without the braces.
fn thumb_register_list_string(bits: u8) -> String {
    let mut s = String::new();
    let mut consecutive: u8 = 0;
    // One extra iteration flushes a run ending in r7.
    for i in 0..=8_u8 {
        if i < 8 && (bits >> i) & 1 != 0 {
            consecutive += 1;
        } else if consecutive != 0 {
            let start = i - consecutive;
            let end = i - 1;
            consecutive = 0;
            if !s.is_empty() {
                s.push_str(", ");
            }
            if start == end {
                s.push_str(&format!("r{end}"));
            } else {
                s.push_str(&format!("r{start}-r{end}"));
            }
        }
    }
    s
}

impl ThumbOpcode {
    /// The assembler mnemonic of this instruction.
    #[must_use]
    pub fn disassemble(&self) -> String {
        match self.instruction {
            ThumbInstruction::MoveShiftedRegister {
                operation,
                offset5,
                rs,
                rd,
            } => format!("{operation} {rd}, {rs}, {offset5}"),
            ThumbInstruction::AddSubtract {
                immediate,
                subtract,
                rn_offset3,
                rs,
                rd,
            } => {
                let op = if subtract { "sub" } else { "add" };
                if immediate {
                    format!("{op} {rd}, {rs}, {rn_offset3}")
                } else {
                    format!("{op} {rd}, {rs}, {}", Register::from(rn_offset3))
                }
            }
            ThumbInstruction::MoveCompareAddSubtractImmediate {
                operation,
                rd,
                offset8,
            } => format!("{operation} {rd}, {offset8}"),
            ThumbInstruction::AluOperation { operation, rs, rd } => {
                format!("{operation} {rd}, {rs}")
            }
            ThumbInstruction::HighRegisterOperation { operation, rs, rd } => match operation {
                HighRegisterOp::Add => format!("add {rd}, {rs}"),
                HighRegisterOp::Cmp => format!("cmp {rd}, {rs}"),
                HighRegisterOp::Mov => format!("mov {rd}, {rs}"),
                HighRegisterOp::Bx => format!("bx {rs}"),
            },
            ThumbInstruction::PcRelativeLoad { rd, word8 } => {
                format!("ldr {rd}, [pc, {}]", word8 << 2)
            }
            ThumbInstruction::LoadStoreRegisterOffset {
                load,
                byte_quantity,
                ro,
                rb,
                rd,
            } => {
                let op = if load { "ldr" } else { "str" };
                let b = if byte_quantity { "b" } else { "" };
                format!("{op}{b} {rd}, [{rb}, {ro}]")
            }
            ThumbInstruction::LoadStoreSignExtendedHalfword {
                h,
                sign_extend,
                ro,
                rb,
                rd,
            } => {
                let op = match (sign_extend, h) {
                    (false, false) => "strh",
                    (false, true) => "ldrh",
                    (true, false) => "ldsb",
                    (true, true) => "ldsh",
                };
                format!("{op} {rd}, [{rb}, {ro}]")
            }
            ThumbInstruction::LoadStoreImmediateOffset {
                load,
                byte_quantity,
                offset5,
                rb,
                rd,
            } => {
                let op = if load { "ldr" } else { "str" };
                let b = if byte_quantity { "b" } else { "" };
                let offset = if byte_quantity { offset5 } else { offset5 << 2 };
                format!("{op}{b} {rd}, [{rb}, {offset}]")
            }
            ThumbInstruction::LoadStoreHalfword {
                load,
                offset5,
                rb,
                rd,
            } => {
                let op = if load { "ldrh" } else { "strh" };
                format!("{op} {rd}, [{rb}, {}]", offset5 << 1)
            }
            ThumbInstruction::SpRelativeLoadStore { load, rd, word8 } => {
                let op = if load { "ldr" } else { "str" };
                format!("{op} {rd}, [sp, {}]", word8 << 2)
            }
            ThumbInstruction::LoadAddress { sp, rd, word8 } => {
                let source = if sp { "sp" } else { "pc" };
                format!("add {rd}, {source}, {}", word8 << 2)
            }
            ThumbInstruction::AddToStackPointer { negative, offset7 } => {
                let mut offset = i32::from(offset7) << 2;
                if negative {
                    offset = -offset;
                }
                format!("add sp, {offset}")
            }
            ThumbInstruction::PushPopRegisters {
                load,
                store_lr_load_pc,
                register_list,
            } => {
                let op = if load { "pop" } else { "push" };
                let mut list = thumb_register_list_string(register_list);
                if store_lr_load_pc {
                    if !list.is_empty() {
                        list.push_str(", ");
                    }
                    list.push_str(if load { "pc" } else { "lr" });
                }
                format!("{op} {{{list}}}")
            }
            ThumbInstruction::MultipleLoadStore {
                load,
                rb,
                register_list,
            } => {
                let op = if load { "ldmia" } else { "stmia" };
                format!("{op} {rb}!, {{{}}}", thumb_register_list_string(register_list))
            }
            ThumbInstruction::ConditionalBranch { condition, offset8 } => {
                let offset = (u32::from(offset8) << 1).sign_extended(9) as i32;
                format!("b{condition} {offset}")
            }
            ThumbInstruction::SoftwareInterrupt { comment } => format!("swi {comment}"),
            ThumbInstruction::UnconditionalBranch { offset11 } => {
                let offset = (u32::from(offset11) << 1).sign_extended(12) as i32;
                format!("b {offset}")
            }
            ThumbInstruction::LongBranchAndLink {
                low_offset,
                offset11,
            } => {
                if low_offset {
                    format!("bl lr + {} (long branch and link)", offset11 << 1)
                } else {
                    let offset = (u32::from(offset11) << 12).sign_extended(23) as i32;
                    format!("add lr, pc, {offset} (long branch and link)")
                }
            }
        }
    }
}

impl std::fmt::Display for ThumbOpcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.disassemble())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::parse_thumb;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_is_total() {
        for raw in 0..=u16::MAX {
            match parse_thumb(raw) {
                Ok(opcode) => assert_eq!(opcode.raw(), raw),
                Err(error) => assert_eq!(error.raw(), u32::from(raw)),
            }
        }
    }

    #[test]
    fn decode_add_subtract() {
        let opcode = parse_thumb(0x1888).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::AddSubtract {
                immediate: false,
                subtract: false,
                rn_offset3: 2,
                rs: Register::from(1_u8),
                rd: Register::from(0_u8),
            }
        );
        assert_eq!(opcode.disassemble(), "add r0, r1, r2");

        // sub r1, r0, 7
        let opcode = parse_thumb(0b0001_1111_1100_0001).unwrap();
        assert_eq!(opcode.disassemble(), "sub r1, r0, 7");
    }

    #[test]
    fn decode_move_shifted_register() {
        let opcode = parse_thumb(0b0000_0001_0001_1010).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::MoveShiftedRegister {
                operation: ShiftKind::Lsl,
                offset5: 4,
                rs: Register::from(3_u8),
                rd: Register::from(2_u8),
            }
        );
        assert_eq!(opcode.disassemble(), "lsl r2, r3, 4");
    }

    #[test]
    fn decode_move_compare_add_subtract_immediate() {
        let opcode = parse_thumb(0b0010_0001_1111_1111).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::MoveCompareAddSubtractImmediate {
                operation: McasOp::Mov,
                rd: Register::from(1_u8),
                offset8: 255,
            }
        );
        assert_eq!(opcode.disassemble(), "mov r1, 255");

        assert_eq!(parse_thumb(0b0011_1010_0000_0101).unwrap().disassemble(), "sub r2, 5");
    }

    #[test]
    fn decode_alu_operation() {
        let opcode = parse_thumb(0b0100_0011_0110_0000).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::AluOperation {
                operation: ThumbAluOpcode::Mul,
                rs: Register::from(4_u8),
                rd: Register::from(0_u8),
            }
        );
        assert_eq!(opcode.disassemble(), "mul r0, r4");

        assert_eq!(parse_thumb(0b0100_0000_0001_1000).unwrap().disassemble(), "and r0, r3");
        assert_eq!(parse_thumb(0b0100_0010_0011_1110).unwrap().disassemble(), "tst r6, r7");
        assert_eq!(parse_thumb(0b0100_0001_1110_0011).unwrap().disassemble(), "ror r3, r4");
    }

    #[test]
    fn decode_high_register_operation() {
        let opcode = parse_thumb(0b0100_0111_0111_0000).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::HighRegisterOperation {
                operation: HighRegisterOp::Bx,
                rs: Register::LR,
                rd: Register::from(0_u8),
            }
        );
        assert_eq!(opcode.disassemble(), "bx lr");

        // add r1, r8
        let opcode = parse_thumb(0b0100_0100_0100_0001).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::HighRegisterOperation {
                operation: HighRegisterOp::Add,
                rs: Register::from(8_u8),
                rd: Register::from(1_u8),
            }
        );
        assert_eq!(opcode.disassemble(), "add r1, r8");

        // mov r9, r0
        assert_eq!(
            parse_thumb(0b0100_0110_1000_0001).unwrap().disassemble(),
            "mov r9, r0"
        );
    }

    #[test]
    fn decode_pc_relative_load() {
        let opcode = parse_thumb(0b0100_1001_0101_1000).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::PcRelativeLoad {
                rd: Register::from(1_u8),
                word8: 0x58,
            }
        );
        assert_eq!(opcode.disassemble(), "ldr r1, [pc, 352]");
    }

    #[test]
    fn decode_load_store_register_offset() {
        let opcode = parse_thumb(0b0101_0000_0100_1010).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::LoadStoreRegisterOffset {
                load: false,
                byte_quantity: false,
                ro: Register::from(1_u8),
                rb: Register::from(1_u8),
                rd: Register::from(2_u8),
            }
        );

        assert_eq!(
            parse_thumb(0b0101_1000_0100_1010).unwrap().disassemble(),
            "ldr r2, [r1, r1]"
        );
        assert_eq!(
            parse_thumb(0b0101_0100_0100_1010).unwrap().disassemble(),
            "strb r2, [r1, r1]"
        );
    }

    #[test]
    fn decode_load_store_sign_extended() {
        assert_eq!(
            parse_thumb(0b0101_0010_1000_1000).unwrap().disassemble(),
            "strh r0, [r1, r2]"
        );
        assert_eq!(
            parse_thumb(0b0101_1010_1000_1000).unwrap().disassemble(),
            "ldrh r0, [r1, r2]"
        );
        assert_eq!(
            parse_thumb(0b0101_0110_1000_1000).unwrap().disassemble(),
            "ldsb r0, [r1, r2]"
        );
        assert_eq!(
            parse_thumb(0b0101_1110_1000_1000).unwrap().disassemble(),
            "ldsh r0, [r1, r2]"
        );
    }

    #[test]
    fn decode_load_store_immediate_offset() {
        // str r0, [r7, 8]
        let opcode = parse_thumb(0b0110_0000_1011_1000).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::LoadStoreImmediateOffset {
                load: false,
                byte_quantity: false,
                offset5: 2,
                rb: Register::from(7_u8),
                rd: Register::from(0_u8),
            }
        );
        assert_eq!(opcode.disassemble(), "str r0, [r7, 8]");

        // ldrb r0, [r7, 2]
        assert_eq!(
            parse_thumb(0b0111_1000_1011_1000).unwrap().disassemble(),
            "ldrb r0, [r7, 2]"
        );
    }

    #[test]
    fn decode_load_store_halfword() {
        let opcode = parse_thumb(0b1000_1000_0100_0001).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::LoadStoreHalfword {
                load: true,
                offset5: 1,
                rb: Register::from(0_u8),
                rd: Register::from(1_u8),
            }
        );
        assert_eq!(opcode.disassemble(), "ldrh r1, [r0, 2]");
        assert_eq!(
            parse_thumb(0b1000_0000_0100_0001).unwrap().disassemble(),
            "strh r1, [r0, 2]"
        );
    }

    #[test]
    fn decode_sp_relative_and_load_address() {
        assert_eq!(
            parse_thumb(0b1001_1000_0000_0111).unwrap().disassemble(),
            "ldr r0, [sp, 28]"
        );
        assert_eq!(
            parse_thumb(0b1001_0000_0000_0111).unwrap().disassemble(),
            "str r0, [sp, 28]"
        );
        assert_eq!(
            parse_thumb(0b1010_0000_0000_1010).unwrap().disassemble(),
            "add r0, pc, 40"
        );
        assert_eq!(
            parse_thumb(0b1010_1000_0000_1010).unwrap().disassemble(),
            "add r0, sp, 40"
        );
    }

    #[test]
    fn decode_add_to_stack_pointer() {
        let opcode = parse_thumb(0xb082).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::AddToStackPointer {
                negative: true,
                offset7: 2,
            }
        );
        assert_eq!(opcode.disassemble(), "add sp, -8");
        assert_eq!(parse_thumb(0xb002).unwrap().disassemble(), "add sp, 8");
    }

    #[test]
    fn decode_push_pop() {
        let opcode = parse_thumb(0xb580).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::PushPopRegisters {
                load: false,
                store_lr_load_pc: true,
                register_list: 0x80,
            }
        );
        assert_eq!(opcode.disassemble(), "push {r7, lr}");

        assert_eq!(parse_thumb(0xbd80).unwrap().disassemble(), "pop {r7, pc}");
        assert_eq!(parse_thumb(0xb4f0).unwrap().disassemble(), "push {r4-r7}");
    }

    #[test]
    fn decode_multiple_load_store() {
        let opcode = parse_thumb(0b1100_1001_1010_0000).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::MultipleLoadStore {
                load: true,
                rb: Register::from(1_u8),
                register_list: 0xa0,
            }
        );
        assert_eq!(opcode.disassemble(), "ldmia r1!, {r5, r7}");
        assert_eq!(
            parse_thumb(0b1100_0001_0000_0111).unwrap().disassemble(),
            "stmia r1!, {r0-r2}"
        );
    }

    #[test]
    fn decode_conditional_branch() {
        let opcode = parse_thumb(0b1101_1011_1111_1100).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::ConditionalBranch {
                condition: Condition::LT,
                offset8: 0xfc,
            }
        );
        assert_eq!(opcode.disassemble(), "blt -8");
    }

    #[test]
    fn conditional_branch_with_al_is_an_error() {
        let raw = 0b1101_1110_0000_0000;
        assert_eq!(
            parse_thumb(raw),
            Err(DecodeError::ReservedCondition(raw))
        );
    }

    #[test]
    fn condition_fifteen_is_a_software_interrupt() {
        let opcode = parse_thumb(0xdf18).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::SoftwareInterrupt { comment: 24 }
        );
        assert_eq!(opcode.disassemble(), "swi 24");
    }

    #[test]
    fn decode_unconditional_branch() {
        let opcode = parse_thumb(0b1110_0001_0010_1111).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::UnconditionalBranch { offset11: 0x12f }
        );
        assert_eq!(opcode.disassemble(), "b 606");
    }

    #[test]
    fn decode_long_branch_and_link() {
        let opcode = parse_thumb(0xf7ff).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::LongBranchAndLink {
                low_offset: false,
                offset11: 0x7ff,
            }
        );
        assert_eq!(
            opcode.disassemble(),
            "add lr, pc, -4096 (long branch and link)"
        );

        let opcode = parse_thumb(0xfffc).unwrap();
        assert_eq!(
            opcode.instruction,
            ThumbInstruction::LongBranchAndLink {
                low_offset: true,
                offset11: 0x7fc,
            }
        );
        assert_eq!(
            opcode.disassemble(),
            "bl lr + 4088 (long branch and link)"
        );
    }
}
