//! Opcode tags and mnemonics.
//!
//! Opcodes are 16-bit tags: plain one-byte opcodes keep their byte value,
//! and `0xFC`-prefixed (misc) opcodes fold their LEB sub-opcode into
//! `0xFC00 | sub`. This keeps the whole instruction set addressable by a
//! single copyable key.

/// A 16-bit opcode tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Opcode(pub u16);

impl Opcode {
    // Control.
    pub const UNREACHABLE: Opcode = Opcode(0x00);
    pub const NOP: Opcode = Opcode(0x01);
    pub const BLOCK: Opcode = Opcode(0x02);
    pub const LOOP: Opcode = Opcode(0x03);
    pub const IF: Opcode = Opcode(0x04);
    pub const ELSE: Opcode = Opcode(0x05);
    pub const END: Opcode = Opcode(0x0B);
    pub const BR: Opcode = Opcode(0x0C);
    pub const BR_IF: Opcode = Opcode(0x0D);
    pub const BR_TABLE: Opcode = Opcode(0x0E);
    pub const RETURN: Opcode = Opcode(0x0F);
    pub const CALL: Opcode = Opcode(0x10);
    pub const CALL_INDIRECT: Opcode = Opcode(0x11);

    // Parametric.
    pub const DROP: Opcode = Opcode(0x1A);
    pub const SELECT: Opcode = Opcode(0x1B);

    // Variables.
    pub const LOCAL_GET: Opcode = Opcode(0x20);
    pub const LOCAL_SET: Opcode = Opcode(0x21);
    pub const LOCAL_TEE: Opcode = Opcode(0x22);
    pub const GLOBAL_GET: Opcode = Opcode(0x23);
    pub const GLOBAL_SET: Opcode = Opcode(0x24);

    // Memory loads.
    pub const I32_LOAD: Opcode = Opcode(0x28);
    pub const I64_LOAD: Opcode = Opcode(0x29);
    pub const F32_LOAD: Opcode = Opcode(0x2A);
    pub const F64_LOAD: Opcode = Opcode(0x2B);
    pub const I32_LOAD8_S: Opcode = Opcode(0x2C);
    pub const I32_LOAD8_U: Opcode = Opcode(0x2D);
    pub const I32_LOAD16_S: Opcode = Opcode(0x2E);
    pub const I32_LOAD16_U: Opcode = Opcode(0x2F);
    pub const I64_LOAD8_S: Opcode = Opcode(0x30);
    pub const I64_LOAD8_U: Opcode = Opcode(0x31);
    pub const I64_LOAD16_S: Opcode = Opcode(0x32);
    pub const I64_LOAD16_U: Opcode = Opcode(0x33);
    pub const I64_LOAD32_S: Opcode = Opcode(0x34);
    pub const I64_LOAD32_U: Opcode = Opcode(0x35);

    // Memory stores.
    pub const I32_STORE: Opcode = Opcode(0x36);
    pub const I64_STORE: Opcode = Opcode(0x37);
    pub const F32_STORE: Opcode = Opcode(0x38);
    pub const F64_STORE: Opcode = Opcode(0x39);
    pub const I32_STORE8: Opcode = Opcode(0x3A);
    pub const I32_STORE16: Opcode = Opcode(0x3B);
    pub const I64_STORE8: Opcode = Opcode(0x3C);
    pub const I64_STORE16: Opcode = Opcode(0x3D);
    pub const I64_STORE32: Opcode = Opcode(0x3E);
    pub const MEMORY_SIZE: Opcode = Opcode(0x3F);
    pub const MEMORY_GROW: Opcode = Opcode(0x40);

    // Constants.
    pub const I32_CONST: Opcode = Opcode(0x41);
    pub const I64_CONST: Opcode = Opcode(0x42);
    pub const F32_CONST: Opcode = Opcode(0x43);
    pub const F64_CONST: Opcode = Opcode(0x44);

    // i32 comparisons.
    pub const I32_EQZ: Opcode = Opcode(0x45);
    pub const I32_EQ: Opcode = Opcode(0x46);
    pub const I32_NE: Opcode = Opcode(0x47);
    pub const I32_LT_S: Opcode = Opcode(0x48);
    pub const I32_LT_U: Opcode = Opcode(0x49);
    pub const I32_GT_S: Opcode = Opcode(0x4A);
    pub const I32_GT_U: Opcode = Opcode(0x4B);
    pub const I32_LE_S: Opcode = Opcode(0x4C);
    pub const I32_LE_U: Opcode = Opcode(0x4D);
    pub const I32_GE_S: Opcode = Opcode(0x4E);
    pub const I32_GE_U: Opcode = Opcode(0x4F);

    // i64 comparisons.
    pub const I64_EQZ: Opcode = Opcode(0x50);
    pub const I64_EQ: Opcode = Opcode(0x51);
    pub const I64_NE: Opcode = Opcode(0x52);
    pub const I64_LT_S: Opcode = Opcode(0x53);
    pub const I64_LT_U: Opcode = Opcode(0x54);
    pub const I64_GT_S: Opcode = Opcode(0x55);
    pub const I64_GT_U: Opcode = Opcode(0x56);
    pub const I64_LE_S: Opcode = Opcode(0x57);
    pub const I64_LE_U: Opcode = Opcode(0x58);
    pub const I64_GE_S: Opcode = Opcode(0x59);
    pub const I64_GE_U: Opcode = Opcode(0x5A);

    // Float comparisons.
    pub const F32_EQ: Opcode = Opcode(0x5B);
    pub const F32_NE: Opcode = Opcode(0x5C);
    pub const F32_LT: Opcode = Opcode(0x5D);
    pub const F32_GT: Opcode = Opcode(0x5E);
    pub const F32_LE: Opcode = Opcode(0x5F);
    pub const F32_GE: Opcode = Opcode(0x60);
    pub const F64_EQ: Opcode = Opcode(0x61);
    pub const F64_NE: Opcode = Opcode(0x62);
    pub const F64_LT: Opcode = Opcode(0x63);
    pub const F64_GT: Opcode = Opcode(0x64);
    pub const F64_LE: Opcode = Opcode(0x65);
    pub const F64_GE: Opcode = Opcode(0x66);

    // i32 arithmetic.
    pub const I32_CLZ: Opcode = Opcode(0x67);
    pub const I32_CTZ: Opcode = Opcode(0x68);
    pub const I32_POPCNT: Opcode = Opcode(0x69);
    pub const I32_ADD: Opcode = Opcode(0x6A);
    pub const I32_SUB: Opcode = Opcode(0x6B);
    pub const I32_MUL: Opcode = Opcode(0x6C);
    pub const I32_DIV_S: Opcode = Opcode(0x6D);
    pub const I32_DIV_U: Opcode = Opcode(0x6E);
    pub const I32_REM_S: Opcode = Opcode(0x6F);
    pub const I32_REM_U: Opcode = Opcode(0x70);
    pub const I32_AND: Opcode = Opcode(0x71);
    pub const I32_OR: Opcode = Opcode(0x72);
    pub const I32_XOR: Opcode = Opcode(0x73);
    pub const I32_SHL: Opcode = Opcode(0x74);
    pub const I32_SHR_S: Opcode = Opcode(0x75);
    pub const I32_SHR_U: Opcode = Opcode(0x76);
    pub const I32_ROTL: Opcode = Opcode(0x77);
    pub const I32_ROTR: Opcode = Opcode(0x78);

    // i64 arithmetic.
    pub const I64_CLZ: Opcode = Opcode(0x79);
    pub const I64_CTZ: Opcode = Opcode(0x7A);
    pub const I64_POPCNT: Opcode = Opcode(0x7B);
    pub const I64_ADD: Opcode = Opcode(0x7C);
    pub const I64_SUB: Opcode = Opcode(0x7D);
    pub const I64_MUL: Opcode = Opcode(0x7E);
    pub const I64_DIV_S: Opcode = Opcode(0x7F);
    pub const I64_DIV_U: Opcode = Opcode(0x80);
    pub const I64_REM_S: Opcode = Opcode(0x81);
    pub const I64_REM_U: Opcode = Opcode(0x82);
    pub const I64_AND: Opcode = Opcode(0x83);
    pub const I64_OR: Opcode = Opcode(0x84);
    pub const I64_XOR: Opcode = Opcode(0x85);
    pub const I64_SHL: Opcode = Opcode(0x86);
    pub const I64_SHR_S: Opcode = Opcode(0x87);
    pub const I64_SHR_U: Opcode = Opcode(0x88);
    pub const I64_ROTL: Opcode = Opcode(0x89);
    pub const I64_ROTR: Opcode = Opcode(0x8A);

    // f32 arithmetic.
    pub const F32_ABS: Opcode = Opcode(0x8B);
    pub const F32_NEG: Opcode = Opcode(0x8C);
    pub const F32_CEIL: Opcode = Opcode(0x8D);
    pub const F32_FLOOR: Opcode = Opcode(0x8E);
    pub const F32_TRUNC: Opcode = Opcode(0x8F);
    pub const F32_NEAREST: Opcode = Opcode(0x90);
    pub const F32_SQRT: Opcode = Opcode(0x91);
    pub const F32_ADD: Opcode = Opcode(0x92);
    pub const F32_SUB: Opcode = Opcode(0x93);
    pub const F32_MUL: Opcode = Opcode(0x94);
    pub const F32_DIV: Opcode = Opcode(0x95);
    pub const F32_MIN: Opcode = Opcode(0x96);
    pub const F32_MAX: Opcode = Opcode(0x97);
    pub const F32_COPYSIGN: Opcode = Opcode(0x98);

    // f64 arithmetic.
    pub const F64_ABS: Opcode = Opcode(0x99);
    pub const F64_NEG: Opcode = Opcode(0x9A);
    pub const F64_CEIL: Opcode = Opcode(0x9B);
    pub const F64_FLOOR: Opcode = Opcode(0x9C);
    pub const F64_TRUNC: Opcode = Opcode(0x9D);
    pub const F64_NEAREST: Opcode = Opcode(0x9E);
    pub const F64_SQRT: Opcode = Opcode(0x9F);
    pub const F64_ADD: Opcode = Opcode(0xA0);
    pub const F64_SUB: Opcode = Opcode(0xA1);
    pub const F64_MUL: Opcode = Opcode(0xA2);
    pub const F64_DIV: Opcode = Opcode(0xA3);
    pub const F64_MIN: Opcode = Opcode(0xA4);
    pub const F64_MAX: Opcode = Opcode(0xA5);
    pub const F64_COPYSIGN: Opcode = Opcode(0xA6);

    // Conversions.
    pub const I32_WRAP_I64: Opcode = Opcode(0xA7);
    pub const I32_TRUNC_F32_S: Opcode = Opcode(0xA8);
    pub const I32_TRUNC_F32_U: Opcode = Opcode(0xA9);
    pub const I32_TRUNC_F64_S: Opcode = Opcode(0xAA);
    pub const I32_TRUNC_F64_U: Opcode = Opcode(0xAB);
    pub const I64_EXTEND_I32_S: Opcode = Opcode(0xAC);
    pub const I64_EXTEND_I32_U: Opcode = Opcode(0xAD);
    pub const I64_TRUNC_F32_S: Opcode = Opcode(0xAE);
    pub const I64_TRUNC_F32_U: Opcode = Opcode(0xAF);
    pub const I64_TRUNC_F64_S: Opcode = Opcode(0xB0);
    pub const I64_TRUNC_F64_U: Opcode = Opcode(0xB1);
    pub const F32_CONVERT_I32_S: Opcode = Opcode(0xB2);
    pub const F32_CONVERT_I32_U: Opcode = Opcode(0xB3);
    pub const F32_CONVERT_I64_S: Opcode = Opcode(0xB4);
    pub const F32_CONVERT_I64_U: Opcode = Opcode(0xB5);
    pub const F32_DEMOTE_F64: Opcode = Opcode(0xB6);
    pub const F64_CONVERT_I32_S: Opcode = Opcode(0xB7);
    pub const F64_CONVERT_I32_U: Opcode = Opcode(0xB8);
    pub const F64_CONVERT_I64_S: Opcode = Opcode(0xB9);
    pub const F64_CONVERT_I64_U: Opcode = Opcode(0xBA);
    pub const F64_PROMOTE_F32: Opcode = Opcode(0xBB);
    pub const I32_REINTERPRET_F32: Opcode = Opcode(0xBC);
    pub const I64_REINTERPRET_F64: Opcode = Opcode(0xBD);
    pub const F32_REINTERPRET_I32: Opcode = Opcode(0xBE);
    pub const F64_REINTERPRET_I64: Opcode = Opcode(0xBF);

    // Sign extension.
    pub const I32_EXTEND8_S: Opcode = Opcode(0xC0);
    pub const I32_EXTEND16_S: Opcode = Opcode(0xC1);
    pub const I64_EXTEND8_S: Opcode = Opcode(0xC2);
    pub const I64_EXTEND16_S: Opcode = Opcode(0xC3);
    pub const I64_EXTEND32_S: Opcode = Opcode(0xC4);

    // Misc prefix (0xFC): non-trapping truncation.
    pub const I32_TRUNC_SAT_F32_S: Opcode = Opcode(0xFC00);
    pub const I32_TRUNC_SAT_F32_U: Opcode = Opcode(0xFC01);
    pub const I32_TRUNC_SAT_F64_S: Opcode = Opcode(0xFC02);
    pub const I32_TRUNC_SAT_F64_U: Opcode = Opcode(0xFC03);
    pub const I64_TRUNC_SAT_F32_S: Opcode = Opcode(0xFC04);
    pub const I64_TRUNC_SAT_F32_U: Opcode = Opcode(0xFC05);
    pub const I64_TRUNC_SAT_F64_S: Opcode = Opcode(0xFC06);
    pub const I64_TRUNC_SAT_F64_U: Opcode = Opcode(0xFC07);

    // Misc prefix (0xFC): bulk memory and table operations.
    pub const MEMORY_INIT: Opcode = Opcode(0xFC08);
    pub const DATA_DROP: Opcode = Opcode(0xFC09);
    pub const MEMORY_COPY: Opcode = Opcode(0xFC0A);
    pub const MEMORY_FILL: Opcode = Opcode(0xFC0B);
    pub const TABLE_INIT: Opcode = Opcode(0xFC0C);
    pub const ELEM_DROP: Opcode = Opcode(0xFC0D);
    pub const TABLE_COPY: Opcode = Opcode(0xFC0E);
    pub const TABLE_GROW: Opcode = Opcode(0xFC0F);
    pub const TABLE_SIZE: Opcode = Opcode(0xFC10);
    pub const TABLE_FILL: Opcode = Opcode(0xFC11);

    /// The misc-prefix byte itself.
    pub const MISC_PREFIX: u8 = 0xFC;

    /// Fold a misc sub-opcode into its 16-bit tag.
    pub fn misc(sub: u32) -> Opcode {
        Opcode(0xFC00 | (sub as u16))
    }

    pub fn is_misc(self) -> bool {
        self.0 & 0xFF00 == 0xFC00
    }

    /// Mnemonic for this tag, or `"unknown"` for unassigned values.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::UNREACHABLE => "unreachable",
            Opcode::NOP => "nop",
            Opcode::BLOCK => "block",
            Opcode::LOOP => "loop",
            Opcode::IF => "if",
            Opcode::ELSE => "else",
            Opcode::END => "end",
            Opcode::BR => "br",
            Opcode::BR_IF => "br_if",
            Opcode::BR_TABLE => "br_table",
            Opcode::RETURN => "return",
            Opcode::CALL => "call",
            Opcode::CALL_INDIRECT => "call_indirect",
            Opcode::DROP => "drop",
            Opcode::SELECT => "select",
            Opcode::LOCAL_GET => "local.get",
            Opcode::LOCAL_SET => "local.set",
            Opcode::LOCAL_TEE => "local.tee",
            Opcode::GLOBAL_GET => "global.get",
            Opcode::GLOBAL_SET => "global.set",
            Opcode::I32_LOAD => "i32.load",
            Opcode::I64_LOAD => "i64.load",
            Opcode::F32_LOAD => "f32.load",
            Opcode::F64_LOAD => "f64.load",
            Opcode::I32_LOAD8_S => "i32.load8_s",
            Opcode::I32_LOAD8_U => "i32.load8_u",
            Opcode::I32_LOAD16_S => "i32.load16_s",
            Opcode::I32_LOAD16_U => "i32.load16_u",
            Opcode::I64_LOAD8_S => "i64.load8_s",
            Opcode::I64_LOAD8_U => "i64.load8_u",
            Opcode::I64_LOAD16_S => "i64.load16_s",
            Opcode::I64_LOAD16_U => "i64.load16_u",
            Opcode::I64_LOAD32_S => "i64.load32_s",
            Opcode::I64_LOAD32_U => "i64.load32_u",
            Opcode::I32_STORE => "i32.store",
            Opcode::I64_STORE => "i64.store",
            Opcode::F32_STORE => "f32.store",
            Opcode::F64_STORE => "f64.store",
            Opcode::I32_STORE8 => "i32.store8",
            Opcode::I32_STORE16 => "i32.store16",
            Opcode::I64_STORE8 => "i64.store8",
            Opcode::I64_STORE16 => "i64.store16",
            Opcode::I64_STORE32 => "i64.store32",
            Opcode::MEMORY_SIZE => "memory.size",
            Opcode::MEMORY_GROW => "memory.grow",
            Opcode::I32_CONST => "i32.const",
            Opcode::I64_CONST => "i64.const",
            Opcode::F32_CONST => "f32.const",
            Opcode::F64_CONST => "f64.const",
            Opcode::I32_EQZ => "i32.eqz",
            Opcode::I32_EQ => "i32.eq",
            Opcode::I32_NE => "i32.ne",
            Opcode::I32_LT_S => "i32.lt_s",
            Opcode::I32_LT_U => "i32.lt_u",
            Opcode::I32_GT_S => "i32.gt_s",
            Opcode::I32_GT_U => "i32.gt_u",
            Opcode::I32_LE_S => "i32.le_s",
            Opcode::I32_LE_U => "i32.le_u",
            Opcode::I32_GE_S => "i32.ge_s",
            Opcode::I32_GE_U => "i32.ge_u",
            Opcode::I64_EQZ => "i64.eqz",
            Opcode::I64_EQ => "i64.eq",
            Opcode::I64_NE => "i64.ne",
            Opcode::I64_LT_S => "i64.lt_s",
            Opcode::I64_LT_U => "i64.lt_u",
            Opcode::I64_GT_S => "i64.gt_s",
            Opcode::I64_GT_U => "i64.gt_u",
            Opcode::I64_LE_S => "i64.le_s",
            Opcode::I64_LE_U => "i64.le_u",
            Opcode::I64_GE_S => "i64.ge_s",
            Opcode::I64_GE_U => "i64.ge_u",
            Opcode::F32_EQ => "f32.eq",
            Opcode::F32_NE => "f32.ne",
            Opcode::F32_LT => "f32.lt",
            Opcode::F32_GT => "f32.gt",
            Opcode::F32_LE => "f32.le",
            Opcode::F32_GE => "f32.ge",
            Opcode::F64_EQ => "f64.eq",
            Opcode::F64_NE => "f64.ne",
            Opcode::F64_LT => "f64.lt",
            Opcode::F64_GT => "f64.gt",
            Opcode::F64_LE => "f64.le",
            Opcode::F64_GE => "f64.ge",
            Opcode::I32_CLZ => "i32.clz",
            Opcode::I32_CTZ => "i32.ctz",
            Opcode::I32_POPCNT => "i32.popcnt",
            Opcode::I32_ADD => "i32.add",
            Opcode::I32_SUB => "i32.sub",
            Opcode::I32_MUL => "i32.mul",
            Opcode::I32_DIV_S => "i32.div_s",
            Opcode::I32_DIV_U => "i32.div_u",
            Opcode::I32_REM_S => "i32.rem_s",
            Opcode::I32_REM_U => "i32.rem_u",
            Opcode::I32_AND => "i32.and",
            Opcode::I32_OR => "i32.or",
            Opcode::I32_XOR => "i32.xor",
            Opcode::I32_SHL => "i32.shl",
            Opcode::I32_SHR_S => "i32.shr_s",
            Opcode::I32_SHR_U => "i32.shr_u",
            Opcode::I32_ROTL => "i32.rotl",
            Opcode::I32_ROTR => "i32.rotr",
            Opcode::I64_CLZ => "i64.clz",
            Opcode::I64_CTZ => "i64.ctz",
            Opcode::I64_POPCNT => "i64.popcnt",
            Opcode::I64_ADD => "i64.add",
            Opcode::I64_SUB => "i64.sub",
            Opcode::I64_MUL => "i64.mul",
            Opcode::I64_DIV_S => "i64.div_s",
            Opcode::I64_DIV_U => "i64.div_u",
            Opcode::I64_REM_S => "i64.rem_s",
            Opcode::I64_REM_U => "i64.rem_u",
            Opcode::I64_AND => "i64.and",
            Opcode::I64_OR => "i64.or",
            Opcode::I64_XOR => "i64.xor",
            Opcode::I64_SHL => "i64.shl",
            Opcode::I64_SHR_S => "i64.shr_s",
            Opcode::I64_SHR_U => "i64.shr_u",
            Opcode::I64_ROTL => "i64.rotl",
            Opcode::I64_ROTR => "i64.rotr",
            Opcode::F32_ABS => "f32.abs",
            Opcode::F32_NEG => "f32.neg",
            Opcode::F32_CEIL => "f32.ceil",
            Opcode::F32_FLOOR => "f32.floor",
            Opcode::F32_TRUNC => "f32.trunc",
            Opcode::F32_NEAREST => "f32.nearest",
            Opcode::F32_SQRT => "f32.sqrt",
            Opcode::F32_ADD => "f32.add",
            Opcode::F32_SUB => "f32.sub",
            Opcode::F32_MUL => "f32.mul",
            Opcode::F32_DIV => "f32.div",
            Opcode::F32_MIN => "f32.min",
            Opcode::F32_MAX => "f32.max",
            Opcode::F32_COPYSIGN => "f32.copysign",
            Opcode::F64_ABS => "f64.abs",
            Opcode::F64_NEG => "f64.neg",
            Opcode::F64_CEIL => "f64.ceil",
            Opcode::F64_FLOOR => "f64.floor",
            Opcode::F64_TRUNC => "f64.trunc",
            Opcode::F64_NEAREST => "f64.nearest",
            Opcode::F64_SQRT => "f64.sqrt",
            Opcode::F64_ADD => "f64.add",
            Opcode::F64_SUB => "f64.sub",
            Opcode::F64_MUL => "f64.mul",
            Opcode::F64_DIV => "f64.div",
            Opcode::F64_MIN => "f64.min",
            Opcode::F64_MAX => "f64.max",
            Opcode::F64_COPYSIGN => "f64.copysign",
            Opcode::I32_WRAP_I64 => "i32.wrap_i64",
            Opcode::I32_TRUNC_F32_S => "i32.trunc_f32_s",
            Opcode::I32_TRUNC_F32_U => "i32.trunc_f32_u",
            Opcode::I32_TRUNC_F64_S => "i32.trunc_f64_s",
            Opcode::I32_TRUNC_F64_U => "i32.trunc_f64_u",
            Opcode::I64_EXTEND_I32_S => "i64.extend_i32_s",
            Opcode::I64_EXTEND_I32_U => "i64.extend_i32_u",
            Opcode::I64_TRUNC_F32_S => "i64.trunc_f32_s",
            Opcode::I64_TRUNC_F32_U => "i64.trunc_f32_u",
            Opcode::I64_TRUNC_F64_S => "i64.trunc_f64_s",
            Opcode::I64_TRUNC_F64_U => "i64.trunc_f64_u",
            Opcode::F32_CONVERT_I32_S => "f32.convert_i32_s",
            Opcode::F32_CONVERT_I32_U => "f32.convert_i32_u",
            Opcode::F32_CONVERT_I64_S => "f32.convert_i64_s",
            Opcode::F32_CONVERT_I64_U => "f32.convert_i64_u",
            Opcode::F32_DEMOTE_F64 => "f32.demote_f64",
            Opcode::F64_CONVERT_I32_S => "f64.convert_i32_s",
            Opcode::F64_CONVERT_I32_U => "f64.convert_i32_u",
            Opcode::F64_CONVERT_I64_S => "f64.convert_i64_s",
            Opcode::F64_CONVERT_I64_U => "f64.convert_i64_u",
            Opcode::F64_PROMOTE_F32 => "f64.promote_f32",
            Opcode::I32_REINTERPRET_F32 => "i32.reinterpret_f32",
            Opcode::I64_REINTERPRET_F64 => "i64.reinterpret_f64",
            Opcode::F32_REINTERPRET_I32 => "f32.reinterpret_i32",
            Opcode::F64_REINTERPRET_I64 => "f64.reinterpret_i64",
            Opcode::I32_EXTEND8_S => "i32.extend8_s",
            Opcode::I32_EXTEND16_S => "i32.extend16_s",
            Opcode::I64_EXTEND8_S => "i64.extend8_s",
            Opcode::I64_EXTEND16_S => "i64.extend16_s",
            Opcode::I64_EXTEND32_S => "i64.extend32_s",
            Opcode::I32_TRUNC_SAT_F32_S => "i32.trunc_sat_f32_s",
            Opcode::I32_TRUNC_SAT_F32_U => "i32.trunc_sat_f32_u",
            Opcode::I32_TRUNC_SAT_F64_S => "i32.trunc_sat_f64_s",
            Opcode::I32_TRUNC_SAT_F64_U => "i32.trunc_sat_f64_u",
            Opcode::I64_TRUNC_SAT_F32_S => "i64.trunc_sat_f32_s",
            Opcode::I64_TRUNC_SAT_F32_U => "i64.trunc_sat_f32_u",
            Opcode::I64_TRUNC_SAT_F64_S => "i64.trunc_sat_f64_s",
            Opcode::I64_TRUNC_SAT_F64_U => "i64.trunc_sat_f64_u",
            Opcode::MEMORY_INIT => "memory.init",
            Opcode::DATA_DROP => "data.drop",
            Opcode::MEMORY_COPY => "memory.copy",
            Opcode::MEMORY_FILL => "memory.fill",
            Opcode::TABLE_INIT => "table.init",
            Opcode::ELEM_DROP => "elem.drop",
            Opcode::TABLE_COPY => "table.copy",
            Opcode::TABLE_GROW => "table.grow",
            Opcode::TABLE_SIZE => "table.size",
            Opcode::TABLE_FILL => "table.fill",
            _ => "unknown",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
