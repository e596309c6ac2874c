//! Instruction disassembler.
//!
//! Decodes a code slice starting at an absolute file offset into
//! [`Instruction`] records. The `0xFC` misc prefix is folded with its LEB
//! sub-opcode into a 16-bit tag before lookup. Unknown one-byte opcodes
//! produce an `unknown` record with no immediates so analysis can report
//! them per function instead of aborting the whole parse; a malformed misc
//! prefix is a hard error because its operand layout cannot be guessed.

use super::error::{ErrorKind, ParseError};
use super::reader::Reader;
use super::{Immediate, Instruction, Opcode};

/// Highest assigned misc sub-opcode (`table.fill`).
const MAX_MISC_SUB: u32 = 0x11;

pub fn disassemble(code: &[u8], base: u64) -> Result<Vec<Instruction>, ParseError> {
    let mut r = Reader::new(code, base);
    let mut instructions = Vec::new();

    while !r.at_end() {
        let start = r.offset();
        let byte = r.read_byte()?;

        let opcode = if byte == Opcode::MISC_PREFIX {
            let sub = r.read_u32()?;
            if sub > MAX_MISC_SUB {
                return Err(ParseError::new(
                    ErrorKind::InvalidOpcode,
                    start,
                    format!("unknown misc opcode 0xfc {sub:#x}"),
                ));
            }
            Opcode::misc(sub)
        } else {
            Opcode(u16::from(byte))
        };

        let immediates = read_immediates(&mut r, opcode)?;
        instructions.push(Instruction {
            offset: start,
            opcode,
            name: opcode.mnemonic(),
            immediates,
        });
    }

    Ok(instructions)
}

fn read_immediates(r: &mut Reader<'_>, opcode: Opcode) -> Result<Vec<Immediate>, ParseError> {
    let imms = match opcode {
        Opcode::BLOCK | Opcode::LOOP | Opcode::IF => vec![Immediate::Byte(r.read_byte()?)],

        Opcode::BR
        | Opcode::BR_IF
        | Opcode::CALL
        | Opcode::LOCAL_GET
        | Opcode::LOCAL_SET
        | Opcode::LOCAL_TEE
        | Opcode::GLOBAL_GET
        | Opcode::GLOBAL_SET
        | Opcode::DATA_DROP
        | Opcode::ELEM_DROP
        | Opcode::TABLE_GROW
        | Opcode::TABLE_SIZE
        | Opcode::TABLE_FILL => vec![Immediate::U32(r.read_u32()?)],

        Opcode::BR_TABLE => {
            let count = r.read_u32()?;
            let mut labels = Vec::with_capacity(count as usize + 1);
            for _ in 0..=count {
                labels.push(r.read_u32()?);
            }
            vec![Immediate::Labels(labels)]
        }

        Opcode::CALL_INDIRECT | Opcode::TABLE_INIT | Opcode::TABLE_COPY => {
            vec![Immediate::U32(r.read_u32()?), Immediate::U32(r.read_u32()?)]
        }

        // Loads and stores: alignment hint, then static offset.
        Opcode(0x28..=0x3E) => {
            vec![Immediate::U32(r.read_u32()?), Immediate::U32(r.read_u32()?)]
        }

        Opcode::MEMORY_SIZE | Opcode::MEMORY_GROW | Opcode::MEMORY_FILL => {
            vec![Immediate::Byte(r.read_byte()?)]
        }

        Opcode::MEMORY_COPY => vec![Immediate::Byte(r.read_byte()?), Immediate::Byte(r.read_byte()?)],

        Opcode::MEMORY_INIT => vec![Immediate::U32(r.read_u32()?), Immediate::Byte(r.read_byte()?)],

        Opcode::I32_CONST => vec![Immediate::S32(r.read_s32()?)],
        Opcode::I64_CONST => vec![Immediate::S64(r.read_s64()?)],
        Opcode::F32_CONST => vec![Immediate::F32(r.read_f32()?)],
        Opcode::F64_CONST => vec![Immediate::F64(r.read_f64()?)],

        _ => Vec::new(),
    };
    Ok(imms)
}
