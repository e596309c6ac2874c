//! Per-section parsers.
//!
//! Each parser takes a section's content slice plus the absolute file
//! offset of that content, so every error and instruction offset stays
//! absolute. Section contents are independent: a failure in one section
//! aborts only that section's parse.

use std::collections::HashMap;

use super::disasm::disassemble;
use super::error::{ErrorKind, ParseError};
use super::opcode::Opcode;
use super::reader::Reader;
use super::{Instruction, ValType};

const FUNC_TYPE_MARKER: u8 = 0x60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncType {
    pub params: Vec<ValType>,
    pub results: Vec<ValType>,
}

/// Table/memory size bounds. When a max is present it is at least min.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub min: u32,
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalType {
    pub ty: ValType,
    pub mutable: bool,
}

#[derive(Debug, Clone)]
pub enum ImportDesc {
    Func { type_idx: u32 },
    Table { elem_type: u8, limits: Limits },
    Memory { limits: Limits },
    Global(GlobalType),
}

#[derive(Debug, Clone)]
pub struct Import {
    pub module: String,
    pub name: String,
    pub desc: ImportDesc,
}

impl Import {
    pub fn is_func(&self) -> bool {
        matches!(self.desc, ImportDesc::Func { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Func,
    Table,
    Memory,
    Global,
}

impl ExportKind {
    pub fn name(self) -> &'static str {
        match self {
            ExportKind::Func => "func",
            ExportKind::Table => "table",
            ExportKind::Memory => "memory",
            ExportKind::Global => "global",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Export {
    pub name: String,
    pub kind: ExportKind,
    pub index: u32,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub elem_type: u8,
    pub limits: Limits,
}

#[derive(Debug, Clone)]
pub struct Global {
    pub ty: GlobalType,
    /// The constant init expression, disassembled up to and including `end`.
    pub init: Vec<Instruction>,
}

#[derive(Debug, Clone)]
pub struct ElementSegment {
    pub table_index: u32,
    pub offset: Vec<Instruction>,
    pub func_indices: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct DataSegment {
    pub memory_index: u32,
    pub offset: Vec<Instruction>,
    pub data: Vec<u8>,
}

/// Run-length local declaration: `count` locals of kind `ty`.
#[derive(Debug, Clone, Copy)]
pub struct LocalEntry {
    pub count: u32,
    pub ty: ValType,
}

#[derive(Debug, Clone)]
pub struct FunctionBody {
    /// Absolute file offset of the body's size field.
    pub offset: u64,
    pub locals: Vec<LocalEntry>,
    pub instructions: Vec<Instruction>,
}

/// Names recovered from the custom `name` section.
#[derive(Debug, Clone, Default)]
pub struct NameMap {
    pub function_names: HashMap<u32, String>,
    pub local_names: HashMap<u32, HashMap<u32, String>>,
}

pub fn parse_type_section(content: &[u8], base: u64) -> Result<Vec<FuncType>, ParseError> {
    let mut r = Reader::new(content, base);
    let count = r
        .read_u32()
        .map_err(|e| e.in_section(ErrorKind::InvalidSection, "failed to read type count"))?;

    let mut types = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let marker_offset = r.offset();
        let marker = r.read_byte()?;
        if marker != FUNC_TYPE_MARKER {
            return Err(ParseError::new(
                ErrorKind::InvalidSection,
                marker_offset,
                format!("expected functype marker 0x60, got 0x{marker:02x}"),
            ));
        }
        let params = read_valtype_vec(&mut r)?;
        let results = read_valtype_vec(&mut r)?;
        types.push(FuncType { params, results });
    }
    Ok(types)
}

fn read_valtype_vec(r: &mut Reader<'_>) -> Result<Vec<ValType>, ParseError> {
    let count = r.read_u32()?;
    let mut kinds = Vec::with_capacity(count as usize);
    for _ in 0..count {
        kinds.push(read_valtype(r)?);
    }
    Ok(kinds)
}

fn read_valtype(r: &mut Reader<'_>) -> Result<ValType, ParseError> {
    let offset = r.offset();
    let b = r.read_byte()?;
    ValType::from_byte(b).ok_or_else(|| {
        ParseError::new(
            ErrorKind::InvalidSection,
            offset,
            format!("unknown value type 0x{b:02x}"),
        )
    })
}

pub fn parse_import_section(content: &[u8], base: u64) -> Result<Vec<Import>, ParseError> {
    let mut r = Reader::new(content, base);
    let count = r
        .read_u32()
        .map_err(|e| e.in_section(ErrorKind::InvalidSection, "failed to read import count"))?;

    let mut imports = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let module = r.read_name()?;
        let name = r.read_name()?;
        let kind_offset = r.offset();
        let kind = r.read_byte()?;
        let desc = match kind {
            0x00 => ImportDesc::Func {
                type_idx: r.read_u32()?,
            },
            0x01 => {
                let elem_type = r.read_byte()?;
                let limits = read_limits(&mut r)?;
                ImportDesc::Table { elem_type, limits }
            }
            0x02 => ImportDesc::Memory {
                limits: read_limits(&mut r)?,
            },
            0x03 => {
                let ty = read_valtype(&mut r)?;
                let mutable = r.read_byte()? == 1;
                ImportDesc::Global(GlobalType { ty, mutable })
            }
            other => {
                return Err(ParseError::new(
                    ErrorKind::InvalidSection,
                    kind_offset,
                    format!("unknown import kind 0x{other:02x}"),
                ))
            }
        };
        imports.push(Import { module, name, desc });
    }
    Ok(imports)
}

/// Limits encode a flags byte; bit 0 says whether a max follows.
fn read_limits(r: &mut Reader<'_>) -> Result<Limits, ParseError> {
    let flags_offset = r.offset();
    let flags = r.read_byte()?;
    let min = r.read_u32()?;
    let max = if flags & 0x01 != 0 {
        let max = r.read_u32()?;
        if max < min {
            return Err(ParseError::new(
                ErrorKind::InvalidSection,
                flags_offset,
                format!("limits max {max} below min {min}"),
            ));
        }
        Some(max)
    } else {
        None
    };
    Ok(Limits { min, max })
}

pub fn parse_function_section(content: &[u8], base: u64) -> Result<Vec<u32>, ParseError> {
    let mut r = Reader::new(content, base);
    let count = r
        .read_u32()
        .map_err(|e| e.in_section(ErrorKind::InvalidSection, "failed to read function count"))?;
    let mut indices = Vec::with_capacity(count as usize);
    for _ in 0..count {
        indices.push(r.read_u32()?);
    }
    Ok(indices)
}

pub fn parse_table_section(content: &[u8], base: u64) -> Result<Vec<Table>, ParseError> {
    let mut r = Reader::new(content, base);
    let count = r
        .read_u32()
        .map_err(|e| e.in_section(ErrorKind::InvalidSection, "failed to read table count"))?;
    let mut tables = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let elem_type = r.read_byte()?;
        let limits = read_limits(&mut r)?;
        tables.push(Table { elem_type, limits });
    }
    Ok(tables)
}

pub fn parse_memory_section(content: &[u8], base: u64) -> Result<Vec<Limits>, ParseError> {
    let mut r = Reader::new(content, base);
    let count = r
        .read_u32()
        .map_err(|e| e.in_section(ErrorKind::InvalidSection, "failed to read memory count"))?;
    let mut memories = Vec::with_capacity(count as usize);
    for _ in 0..count {
        memories.push(read_limits(&mut r)?);
    }
    Ok(memories)
}

pub fn parse_global_section(content: &[u8], base: u64) -> Result<Vec<Global>, ParseError> {
    let mut r = Reader::new(content, base);
    let count = r
        .read_u32()
        .map_err(|e| e.in_section(ErrorKind::InvalidSection, "failed to read global count"))?;
    let mut globals = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let ty = read_valtype(&mut r)?;
        let mutable = r.read_byte()? == 1;
        let init = read_init_expr(&mut r)?;
        globals.push(Global {
            ty: GlobalType { ty, mutable },
            init,
        });
    }
    Ok(globals)
}

pub fn parse_export_section(content: &[u8], base: u64) -> Result<Vec<Export>, ParseError> {
    let mut r = Reader::new(content, base);
    let count = r
        .read_u32()
        .map_err(|e| e.in_section(ErrorKind::InvalidSection, "failed to read export count"))?;
    let mut exports = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name = r.read_name()?;
        let kind_offset = r.offset();
        let kind = match r.read_byte()? {
            0x00 => ExportKind::Func,
            0x01 => ExportKind::Table,
            0x02 => ExportKind::Memory,
            0x03 => ExportKind::Global,
            other => {
                return Err(ParseError::new(
                    ErrorKind::InvalidSection,
                    kind_offset,
                    format!("unknown export kind 0x{other:02x}"),
                ))
            }
        };
        let index = r.read_u32()?;
        exports.push(Export { name, kind, index });
    }
    Ok(exports)
}

pub fn parse_start_section(content: &[u8], base: u64) -> Result<u32, ParseError> {
    let mut r = Reader::new(content, base);
    r.read_u32()
        .map_err(|e| e.in_section(ErrorKind::InvalidSection, "failed to read start index"))
}

pub fn parse_element_section(content: &[u8], base: u64) -> Result<Vec<ElementSegment>, ParseError> {
    let mut r = Reader::new(content, base);
    let count = r
        .read_u32()
        .map_err(|e| e.in_section(ErrorKind::InvalidSection, "failed to read element count"))?;
    let mut segments = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let table_index = r.read_u32()?;
        let offset = read_init_expr(&mut r)?;
        let func_count = r.read_u32()?;
        let mut func_indices = Vec::with_capacity(func_count as usize);
        for _ in 0..func_count {
            func_indices.push(r.read_u32()?);
        }
        segments.push(ElementSegment {
            table_index,
            offset,
            func_indices,
        });
    }
    Ok(segments)
}

pub fn parse_data_section(content: &[u8], base: u64) -> Result<Vec<DataSegment>, ParseError> {
    let mut r = Reader::new(content, base);
    let count = r
        .read_u32()
        .map_err(|e| e.in_section(ErrorKind::InvalidSection, "failed to read data count"))?;
    let mut segments = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let memory_index = r.read_u32()?;
        let offset = read_init_expr(&mut r)?;
        let size = r.read_u32()?;
        let data = r.read_bytes(size as usize)?.to_vec();
        segments.push(DataSegment {
            memory_index,
            offset,
            data,
        });
    }
    Ok(segments)
}

pub fn parse_code_section(content: &[u8], base: u64) -> Result<Vec<FunctionBody>, ParseError> {
    let mut r = Reader::new(content, base);
    let count = r
        .read_u32()
        .map_err(|e| e.in_section(ErrorKind::InvalidSection, "failed to read function count"))?;

    let mut bodies = Vec::with_capacity(count as usize);
    for i in 0..count {
        let body_offset = r.offset();
        let body_size = r.read_u32()?;
        if body_size as usize > r.remaining() {
            return Err(ParseError::new(
                ErrorKind::SectionOverflow,
                body_offset,
                format!("function {i} body exceeds section bounds"),
            ));
        }
        let content_offset = r.offset();
        let body_data = r.read_bytes(body_size as usize)?;
        let mut body = parse_function_body(body_data, content_offset)?;
        body.offset = body_offset;
        bodies.push(body);
    }
    Ok(bodies)
}

fn parse_function_body(data: &[u8], base: u64) -> Result<FunctionBody, ParseError> {
    let mut r = Reader::new(data, base);

    let decl_count = r.read_u32()?;
    let mut locals = Vec::with_capacity(decl_count as usize);
    for _ in 0..decl_count {
        let count = r.read_u32()?;
        let ty = read_valtype(&mut r)?;
        locals.push(LocalEntry { count, ty });
    }

    let code_offset = r.offset();
    let instructions = disassemble(r.rest(), code_offset)?;

    Ok(FunctionBody {
        offset: base,
        locals,
        instructions,
    })
}

/// Scan a constant init expression up to its terminating `end` and
/// disassemble it. Only the operand layouts that can legally appear in a
/// constant expression are skipped explicitly.
fn read_init_expr(r: &mut Reader<'_>) -> Result<Vec<Instruction>, ParseError> {
    let start_pos = r.pos();
    let start_offset = r.offset();
    let data_start = r.rest();

    loop {
        let op_offset = r.offset();
        let op = match r.read_byte() {
            Ok(b) => b,
            Err(_) => {
                return Err(ParseError::new(
                    ErrorKind::Truncated,
                    op_offset,
                    "init expr missing end",
                ))
            }
        };
        if op == 0x0B {
            break;
        }
        match Opcode(u16::from(op)) {
            Opcode::I32_CONST => {
                r.read_s32()?;
            }
            Opcode::I64_CONST => {
                r.read_s64()?;
            }
            Opcode::F32_CONST => {
                r.read_f32()?;
            }
            Opcode::F64_CONST => {
                r.read_f64()?;
            }
            Opcode::GLOBAL_GET => {
                r.read_u32()?;
            }
            _ => {}
        }
    }

    let raw = &data_start[..r.pos() - start_pos];
    disassemble(raw, start_offset)
}

/// Parse the custom `name` section payload. Subsection ids 1 (function
/// names) and 2 (local names) are decoded; anything malformed is skipped so
/// a damaged name section never sinks the module.
pub fn parse_name_section(payload: &[u8], base: u64) -> NameMap {
    let mut r = Reader::new(payload, base);
    let mut names = NameMap::default();

    while !r.at_end() {
        let Ok(subsection_id) = r.read_byte() else {
            break;
        };
        let Ok(size) = r.read_u32() else {
            break;
        };
        let sub_end = r.pos() + size as usize;
        if sub_end > r.pos() + r.remaining() {
            break;
        }

        match subsection_id {
            1 => read_function_names(&mut r, sub_end, &mut names),
            2 => read_local_names(&mut r, sub_end, &mut names),
            _ => {}
        }

        // Realign to the declared subsection end whether or not the
        // subsection decoded cleanly.
        while r.pos() < sub_end {
            if r.read_byte().is_err() {
                return names;
            }
        }
    }

    names
}

fn read_function_names(r: &mut Reader<'_>, sub_end: usize, names: &mut NameMap) {
    let Ok(count) = r.read_u32() else { return };
    for _ in 0..count {
        if r.pos() >= sub_end {
            return;
        }
        let Ok(idx) = r.read_u32() else { return };
        let Ok(name) = r.read_name() else { return };
        names.function_names.insert(idx, name);
    }
}

fn read_local_names(r: &mut Reader<'_>, sub_end: usize, names: &mut NameMap) {
    let Ok(count) = r.read_u32() else { return };
    for _ in 0..count {
        if r.pos() >= sub_end {
            return;
        }
        let Ok(func_idx) = r.read_u32() else { return };
        let Ok(local_count) = r.read_u32() else { return };
        let mut locals = HashMap::new();
        for _ in 0..local_count {
            if r.pos() >= sub_end {
                break;
            }
            let Ok(local_idx) = r.read_u32() else { break };
            let Ok(name) = r.read_name() else { break };
            locals.insert(local_idx, name);
        }
        names.local_names.insert(func_idx, locals);
    }
}
