//! Static stack signatures and shape classification per opcode.
//!
//! The interpreter drives every data-flow opcode off this table: how many
//! values it pops, what it pushes. Control flow, variable access, and calls
//! are handled structurally by the builder and have no entry here beyond
//! what the flat frame analysis needs.

use crate::wasm::{Opcode, ValType};

const I32: ValType = ValType::I32;
const I64: ValType = ValType::I64;
const F32: ValType = ValType::F32;
const F64: ValType = ValType::F64;

#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub inputs: &'static [ValType],
    pub outputs: &'static [ValType],
}

const fn sig(inputs: &'static [ValType], outputs: &'static [ValType]) -> Signature {
    Signature { inputs, outputs }
}

/// Stack signature of an opcode, `None` for opcodes the table does not
/// cover (unknown ones, or structural ones like `block` and `call`).
pub fn signature(op: Opcode) -> Option<Signature> {
    let s = match op {
        Opcode::UNREACHABLE | Opcode::NOP | Opcode::RETURN | Opcode::END | Opcode::BR => {
            sig(&[], &[])
        }
        Opcode::BR_IF => sig(&[I32], &[]),
        Opcode::DROP => sig(&[I32], &[]),
        Opcode::SELECT => sig(&[I32, I32, I32], &[I32]),

        Opcode::I32_CONST => sig(&[], &[I32]),
        Opcode::I64_CONST => sig(&[], &[I64]),
        Opcode::F32_CONST => sig(&[], &[F32]),
        Opcode::F64_CONST => sig(&[], &[F64]),

        Opcode::I32_EQZ => sig(&[I32], &[I32]),
        Opcode::I32_EQ
        | Opcode::I32_NE
        | Opcode::I32_LT_S
        | Opcode::I32_LT_U
        | Opcode::I32_GT_S
        | Opcode::I32_GT_U
        | Opcode::I32_LE_S
        | Opcode::I32_LE_U
        | Opcode::I32_GE_S
        | Opcode::I32_GE_U => sig(&[I32, I32], &[I32]),

        Opcode::I64_EQZ => sig(&[I64], &[I32]),
        Opcode::I64_EQ
        | Opcode::I64_NE
        | Opcode::I64_LT_S
        | Opcode::I64_LT_U
        | Opcode::I64_GT_S
        | Opcode::I64_GT_U
        | Opcode::I64_LE_S
        | Opcode::I64_LE_U
        | Opcode::I64_GE_S
        | Opcode::I64_GE_U => sig(&[I64, I64], &[I32]),

        Opcode::F32_EQ
        | Opcode::F32_NE
        | Opcode::F32_LT
        | Opcode::F32_GT
        | Opcode::F32_LE
        | Opcode::F32_GE => sig(&[F32, F32], &[I32]),
        Opcode::F64_EQ
        | Opcode::F64_NE
        | Opcode::F64_LT
        | Opcode::F64_GT
        | Opcode::F64_LE
        | Opcode::F64_GE => sig(&[F64, F64], &[I32]),

        Opcode::I32_CLZ | Opcode::I32_CTZ | Opcode::I32_POPCNT => sig(&[I32], &[I32]),
        Opcode::I32_ADD
        | Opcode::I32_SUB
        | Opcode::I32_MUL
        | Opcode::I32_DIV_S
        | Opcode::I32_DIV_U
        | Opcode::I32_REM_S
        | Opcode::I32_REM_U
        | Opcode::I32_AND
        | Opcode::I32_OR
        | Opcode::I32_XOR
        | Opcode::I32_SHL
        | Opcode::I32_SHR_S
        | Opcode::I32_SHR_U
        | Opcode::I32_ROTL
        | Opcode::I32_ROTR => sig(&[I32, I32], &[I32]),

        Opcode::I64_CLZ | Opcode::I64_CTZ | Opcode::I64_POPCNT => sig(&[I64], &[I64]),
        Opcode::I64_ADD
        | Opcode::I64_SUB
        | Opcode::I64_MUL
        | Opcode::I64_DIV_S
        | Opcode::I64_DIV_U
        | Opcode::I64_REM_S
        | Opcode::I64_REM_U
        | Opcode::I64_AND
        | Opcode::I64_OR
        | Opcode::I64_XOR
        | Opcode::I64_SHL
        | Opcode::I64_SHR_S
        | Opcode::I64_SHR_U
        | Opcode::I64_ROTL
        | Opcode::I64_ROTR => sig(&[I64, I64], &[I64]),

        Opcode::F32_ABS
        | Opcode::F32_NEG
        | Opcode::F32_CEIL
        | Opcode::F32_FLOOR
        | Opcode::F32_TRUNC
        | Opcode::F32_NEAREST
        | Opcode::F32_SQRT => sig(&[F32], &[F32]),
        Opcode::F32_ADD
        | Opcode::F32_SUB
        | Opcode::F32_MUL
        | Opcode::F32_DIV
        | Opcode::F32_MIN
        | Opcode::F32_MAX
        | Opcode::F32_COPYSIGN => sig(&[F32, F32], &[F32]),

        Opcode::F64_ABS
        | Opcode::F64_NEG
        | Opcode::F64_CEIL
        | Opcode::F64_FLOOR
        | Opcode::F64_TRUNC
        | Opcode::F64_NEAREST
        | Opcode::F64_SQRT => sig(&[F64], &[F64]),
        Opcode::F64_ADD
        | Opcode::F64_SUB
        | Opcode::F64_MUL
        | Opcode::F64_DIV
        | Opcode::F64_MIN
        | Opcode::F64_MAX
        | Opcode::F64_COPYSIGN => sig(&[F64, F64], &[F64]),

        Opcode::I32_WRAP_I64 => sig(&[I64], &[I32]),
        Opcode::I32_TRUNC_F32_S | Opcode::I32_TRUNC_F32_U => sig(&[F32], &[I32]),
        Opcode::I32_TRUNC_F64_S | Opcode::I32_TRUNC_F64_U => sig(&[F64], &[I32]),
        Opcode::I64_EXTEND_I32_S | Opcode::I64_EXTEND_I32_U => sig(&[I32], &[I64]),
        Opcode::I64_TRUNC_F32_S | Opcode::I64_TRUNC_F32_U => sig(&[F32], &[I64]),
        Opcode::I64_TRUNC_F64_S | Opcode::I64_TRUNC_F64_U => sig(&[F64], &[I64]),
        Opcode::F32_CONVERT_I32_S | Opcode::F32_CONVERT_I32_U => sig(&[I32], &[F32]),
        Opcode::F32_CONVERT_I64_S | Opcode::F32_CONVERT_I64_U => sig(&[I64], &[F32]),
        Opcode::F32_DEMOTE_F64 => sig(&[F64], &[F32]),
        Opcode::F64_CONVERT_I32_S | Opcode::F64_CONVERT_I32_U => sig(&[I32], &[F64]),
        Opcode::F64_CONVERT_I64_S | Opcode::F64_CONVERT_I64_U => sig(&[I64], &[F64]),
        Opcode::F64_PROMOTE_F32 => sig(&[F32], &[F64]),
        Opcode::I32_REINTERPRET_F32 => sig(&[F32], &[I32]),
        Opcode::I64_REINTERPRET_F64 => sig(&[F64], &[I64]),
        Opcode::F32_REINTERPRET_I32 => sig(&[I32], &[F32]),
        Opcode::F64_REINTERPRET_I64 => sig(&[I64], &[F64]),

        Opcode::I32_EXTEND8_S | Opcode::I32_EXTEND16_S => sig(&[I32], &[I32]),
        Opcode::I64_EXTEND8_S | Opcode::I64_EXTEND16_S | Opcode::I64_EXTEND32_S => {
            sig(&[I64], &[I64])
        }

        Opcode::I32_LOAD
        | Opcode::I32_LOAD8_S
        | Opcode::I32_LOAD8_U
        | Opcode::I32_LOAD16_S
        | Opcode::I32_LOAD16_U => sig(&[I32], &[I32]),
        Opcode::I64_LOAD
        | Opcode::I64_LOAD8_S
        | Opcode::I64_LOAD8_U
        | Opcode::I64_LOAD16_S
        | Opcode::I64_LOAD16_U
        | Opcode::I64_LOAD32_S
        | Opcode::I64_LOAD32_U => sig(&[I32], &[I64]),
        Opcode::F32_LOAD => sig(&[I32], &[F32]),
        Opcode::F64_LOAD => sig(&[I32], &[F64]),

        Opcode::I32_STORE | Opcode::I32_STORE8 | Opcode::I32_STORE16 => sig(&[I32, I32], &[]),
        Opcode::I64_STORE
        | Opcode::I64_STORE8
        | Opcode::I64_STORE16
        | Opcode::I64_STORE32 => sig(&[I32, I64], &[]),
        Opcode::F32_STORE => sig(&[I32, F32], &[]),
        Opcode::F64_STORE => sig(&[I32, F64], &[]),

        Opcode::MEMORY_SIZE => sig(&[], &[I32]),
        Opcode::MEMORY_GROW => sig(&[I32], &[I32]),

        Opcode::I32_TRUNC_SAT_F32_S | Opcode::I32_TRUNC_SAT_F32_U => sig(&[F32], &[I32]),
        Opcode::I32_TRUNC_SAT_F64_S | Opcode::I32_TRUNC_SAT_F64_U => sig(&[F64], &[I32]),
        Opcode::I64_TRUNC_SAT_F32_S | Opcode::I64_TRUNC_SAT_F32_U => sig(&[F32], &[I64]),
        Opcode::I64_TRUNC_SAT_F64_S | Opcode::I64_TRUNC_SAT_F64_U => sig(&[F64], &[I64]),

        Opcode::MEMORY_INIT | Opcode::MEMORY_COPY | Opcode::MEMORY_FILL => {
            sig(&[I32, I32, I32], &[])
        }
        Opcode::DATA_DROP | Opcode::ELEM_DROP => sig(&[], &[]),
        // Table values are funcrefs; the i32 stand-in keeps the arity right
        // without growing the kind set past the MVP four.
        Opcode::TABLE_INIT | Opcode::TABLE_COPY | Opcode::TABLE_FILL => {
            sig(&[I32, I32, I32], &[])
        }
        Opcode::TABLE_GROW => sig(&[I32, I32], &[I32]),
        Opcode::TABLE_SIZE => sig(&[], &[I32]),

        _ => return None,
    };
    Some(s)
}

/// Ops rendered as infix `(l op r)`.
pub fn is_binary(op: Opcode) -> bool {
    matches!(
        op,
        Opcode::I32_EQ
            | Opcode::I32_NE
            | Opcode::I32_LT_S
            | Opcode::I32_LT_U
            | Opcode::I32_GT_S
            | Opcode::I32_GT_U
            | Opcode::I32_LE_S
            | Opcode::I32_LE_U
            | Opcode::I32_GE_S
            | Opcode::I32_GE_U
            | Opcode::I64_EQ
            | Opcode::I64_NE
            | Opcode::I64_LT_S
            | Opcode::I64_LT_U
            | Opcode::I64_GT_S
            | Opcode::I64_GT_U
            | Opcode::I64_LE_S
            | Opcode::I64_LE_U
            | Opcode::I64_GE_S
            | Opcode::I64_GE_U
            | Opcode::F32_EQ
            | Opcode::F32_NE
            | Opcode::F32_LT
            | Opcode::F32_GT
            | Opcode::F32_LE
            | Opcode::F32_GE
            | Opcode::F64_EQ
            | Opcode::F64_NE
            | Opcode::F64_LT
            | Opcode::F64_GT
            | Opcode::F64_LE
            | Opcode::F64_GE
            | Opcode::I32_ADD
            | Opcode::I32_SUB
            | Opcode::I32_MUL
            | Opcode::I32_DIV_S
            | Opcode::I32_DIV_U
            | Opcode::I32_REM_S
            | Opcode::I32_REM_U
            | Opcode::I32_AND
            | Opcode::I32_OR
            | Opcode::I32_XOR
            | Opcode::I32_SHL
            | Opcode::I32_SHR_S
            | Opcode::I32_SHR_U
            | Opcode::I32_ROTL
            | Opcode::I32_ROTR
            | Opcode::I64_ADD
            | Opcode::I64_SUB
            | Opcode::I64_MUL
            | Opcode::I64_DIV_S
            | Opcode::I64_DIV_U
            | Opcode::I64_REM_S
            | Opcode::I64_REM_U
            | Opcode::I64_AND
            | Opcode::I64_OR
            | Opcode::I64_XOR
            | Opcode::I64_SHL
            | Opcode::I64_SHR_S
            | Opcode::I64_SHR_U
            | Opcode::I64_ROTL
            | Opcode::I64_ROTR
            | Opcode::F32_ADD
            | Opcode::F32_SUB
            | Opcode::F32_MUL
            | Opcode::F32_DIV
            | Opcode::F32_MIN
            | Opcode::F32_MAX
            | Opcode::F32_COPYSIGN
            | Opcode::F64_ADD
            | Opcode::F64_SUB
            | Opcode::F64_MUL
            | Opcode::F64_DIV
            | Opcode::F64_MIN
            | Opcode::F64_MAX
            | Opcode::F64_COPYSIGN
    )
}

/// Ops rendered as a prefix name over one argument.
pub fn is_unary(op: Opcode) -> bool {
    matches!(
        op,
        Opcode::I32_EQZ
            | Opcode::I64_EQZ
            | Opcode::I32_CLZ
            | Opcode::I32_CTZ
            | Opcode::I32_POPCNT
            | Opcode::I64_CLZ
            | Opcode::I64_CTZ
            | Opcode::I64_POPCNT
            | Opcode::F32_ABS
            | Opcode::F32_NEG
            | Opcode::F32_CEIL
            | Opcode::F32_FLOOR
            | Opcode::F32_TRUNC
            | Opcode::F32_NEAREST
            | Opcode::F32_SQRT
            | Opcode::F64_ABS
            | Opcode::F64_NEG
            | Opcode::F64_CEIL
            | Opcode::F64_FLOOR
            | Opcode::F64_TRUNC
            | Opcode::F64_NEAREST
            | Opcode::F64_SQRT
            | Opcode::I32_WRAP_I64
            | Opcode::I32_TRUNC_F32_S
            | Opcode::I32_TRUNC_F32_U
            | Opcode::I32_TRUNC_F64_S
            | Opcode::I32_TRUNC_F64_U
            | Opcode::I64_EXTEND_I32_S
            | Opcode::I64_EXTEND_I32_U
            | Opcode::I64_TRUNC_F32_S
            | Opcode::I64_TRUNC_F32_U
            | Opcode::I64_TRUNC_F64_S
            | Opcode::I64_TRUNC_F64_U
            | Opcode::F32_CONVERT_I32_S
            | Opcode::F32_CONVERT_I32_U
            | Opcode::F32_CONVERT_I64_S
            | Opcode::F32_CONVERT_I64_U
            | Opcode::F32_DEMOTE_F64
            | Opcode::F64_CONVERT_I32_S
            | Opcode::F64_CONVERT_I32_U
            | Opcode::F64_CONVERT_I64_S
            | Opcode::F64_CONVERT_I64_U
            | Opcode::F64_PROMOTE_F32
            | Opcode::I32_REINTERPRET_F32
            | Opcode::I64_REINTERPRET_F64
            | Opcode::F32_REINTERPRET_I32
            | Opcode::F64_REINTERPRET_I64
            | Opcode::I32_EXTEND8_S
            | Opcode::I32_EXTEND16_S
            | Opcode::I64_EXTEND8_S
            | Opcode::I64_EXTEND16_S
            | Opcode::I64_EXTEND32_S
            | Opcode::I32_TRUNC_SAT_F32_S
            | Opcode::I32_TRUNC_SAT_F32_U
            | Opcode::I32_TRUNC_SAT_F64_S
            | Opcode::I32_TRUNC_SAT_F64_U
            | Opcode::I64_TRUNC_SAT_F32_S
            | Opcode::I64_TRUNC_SAT_F32_U
            | Opcode::I64_TRUNC_SAT_F64_S
            | Opcode::I64_TRUNC_SAT_F64_U
    )
}

pub fn is_load(op: Opcode) -> bool {
    matches!(op, Opcode(0x28..=0x35))
}

pub fn is_store(op: Opcode) -> bool {
    matches!(op, Opcode(0x36..=0x3E))
}
