//! Module resolution: stitch section records into one coherent view.
//!
//! Function-index order is imports first (in import order, filtered to
//! function imports), then defined functions in code-section order, so
//! indices are dense from 0 and lookup by index is a direct slice access.
//! Display names are chosen by precedence: export name, then custom
//! name-section entry, then a synthesized `func_N` (imports render as
//! `module.name`).

use std::collections::HashMap;

use super::error::{ErrorKind, ParseError};
use super::reader::Reader;
use super::sections::{
    parse_code_section, parse_data_section, parse_element_section, parse_export_section,
    parse_function_section, parse_global_section, parse_import_section, parse_memory_section,
    parse_name_section, parse_start_section, parse_table_section, parse_type_section, DataSegment,
    ElementSegment, Export, ExportKind, FuncType, FunctionBody, Global, Import, ImportDesc,
    Limits, NameMap, Table,
};
use super::{Immediate, Instruction, Module, Opcode, SectionId};

/// One entry of the unified function table.
#[derive(Debug, Clone)]
pub struct Function {
    pub index: u32,
    pub name: String,
    pub imported: bool,
    pub ty: Option<FuncType>,
    /// Index into [`ResolvedModule::imports`] for imported functions.
    pub import: Option<usize>,
    pub body: Option<FunctionBody>,
}

impl Function {
    pub fn param_count(&self) -> usize {
        self.ty.as_ref().map_or(0, |t| t.params.len())
    }
}

/// A custom section other than `name`, retained by name and skipped.
#[derive(Debug, Clone)]
pub struct CustomSection {
    pub name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedModule {
    pub version: u32,
    pub types: Vec<FuncType>,
    pub imports: Vec<Import>,
    pub functions: Vec<Function>,
    pub tables: Vec<Table>,
    pub memories: Vec<Limits>,
    pub globals: Vec<Global>,
    pub exports: Vec<Export>,
    pub start: Option<u32>,
    pub elements: Vec<ElementSegment>,
    pub data: Vec<DataSegment>,
    pub names: Option<NameMap>,
    pub custom: Vec<CustomSection>,
}

pub fn resolve(module: &Module) -> Result<ResolvedModule, ParseError> {
    let mut rm = ResolvedModule {
        version: module.version,
        ..ResolvedModule::default()
    };

    let mut func_type_indices = Vec::new();
    let mut bodies = Vec::new();

    for section in &module.sections {
        let base = section.content_offset();
        let content = section.content.as_slice();
        match section.id {
            SectionId::Type => {
                rm.types = parse_type_section(content, base)
                    .map_err(|e| section_context(e, "type"))?;
            }
            SectionId::Import => {
                rm.imports = parse_import_section(content, base)
                    .map_err(|e| section_context(e, "import"))?;
            }
            SectionId::Function => {
                func_type_indices = parse_function_section(content, base)
                    .map_err(|e| section_context(e, "function"))?;
            }
            SectionId::Table => {
                rm.tables = parse_table_section(content, base)
                    .map_err(|e| section_context(e, "table"))?;
            }
            SectionId::Memory => {
                rm.memories = parse_memory_section(content, base)
                    .map_err(|e| section_context(e, "memory"))?;
            }
            SectionId::Global => {
                rm.globals = parse_global_section(content, base)
                    .map_err(|e| section_context(e, "global"))?;
            }
            SectionId::Export => {
                rm.exports = parse_export_section(content, base)
                    .map_err(|e| section_context(e, "export"))?;
            }
            SectionId::Start => {
                rm.start = Some(
                    parse_start_section(content, base)
                        .map_err(|e| section_context(e, "start"))?,
                );
            }
            SectionId::Element => {
                rm.elements = parse_element_section(content, base)
                    .map_err(|e| section_context(e, "element"))?;
            }
            SectionId::Code => {
                bodies = parse_code_section(content, base)
                    .map_err(|e| section_context(e, "code"))?;
            }
            SectionId::Data => {
                rm.data = parse_data_section(content, base)
                    .map_err(|e| section_context(e, "data"))?;
            }
            SectionId::Custom => read_custom_section(&mut rm, content, base),
            SectionId::Unknown(_) => {}
        }
    }

    build_function_table(&mut rm, &func_type_indices, bodies);
    apply_names(&mut rm);

    Ok(rm)
}

fn section_context(e: ParseError, what: &str) -> ParseError {
    let (kind, offset) = (e.kind, e.offset);
    ParseError::with_cause(kind, offset, format!("{what} section"), e)
}

fn build_function_table(rm: &mut ResolvedModule, type_indices: &[u32], bodies: Vec<FunctionBody>) {
    let mut index = 0u32;

    for (import_pos, import) in rm.imports.iter().enumerate() {
        let ImportDesc::Func { type_idx } = import.desc else {
            continue;
        };
        rm.functions.push(Function {
            index,
            name: format!("{}.{}", import.module, import.name),
            imported: true,
            ty: rm.types.get(type_idx as usize).cloned(),
            import: Some(import_pos),
            body: None,
        });
        index += 1;
    }

    let mut bodies = bodies.into_iter();
    for &type_idx in type_indices {
        rm.functions.push(Function {
            index,
            name: format!("func_{index}"),
            imported: false,
            ty: rm.types.get(type_idx as usize).cloned(),
            import: None,
            body: bodies.next(),
        });
        index += 1;
    }
}

/// Overlay export names, then name-section names where no export claimed
/// the index.
fn apply_names(rm: &mut ResolvedModule) {
    let mut export_names: HashMap<u32, &str> = HashMap::new();
    for export in &rm.exports {
        if export.kind == ExportKind::Func {
            export_names.insert(export.index, &export.name);
        }
    }

    let mut assigned: Vec<(usize, String)> = Vec::new();
    for (pos, function) in rm.functions.iter().enumerate() {
        if let Some(name) = export_names.get(&function.index) {
            assigned.push((pos, (*name).to_string()));
        } else if let Some(names) = &rm.names {
            if let Some(name) = names.function_names.get(&function.index) {
                assigned.push((pos, name.clone()));
            }
        }
    }
    for (pos, name) in assigned {
        rm.functions[pos].name = name;
    }
}

fn read_custom_section(rm: &mut ResolvedModule, content: &[u8], base: u64) {
    let mut r = Reader::new(content, base);
    let Ok(name) = r.read_name() else { return };
    let payload = r.rest();
    if name == "name" {
        rm.names = Some(parse_name_section(payload, r.offset()));
    } else {
        rm.custom.push(CustomSection {
            name,
            data: payload.to_vec(),
        });
    }
}

impl ResolvedModule {
    /// Function by its dense index.
    pub fn function(&self, index: u32) -> Option<&Function> {
        self.functions.get(index as usize)
    }

    pub fn function_by_name(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Number of imported functions (they occupy the low indices).
    pub fn imported_function_count(&self) -> usize {
        self.functions.iter().filter(|f| f.imported).count()
    }

    /// Signature of a function by index, resolving through the type table.
    pub fn function_type(&self, index: u32) -> Option<&FuncType> {
        self.function(index).and_then(|f| f.ty.as_ref())
    }

    /// Materialize initial linear memory by placing each data segment at
    /// its constant offset. Segments without an `i32.const` offset are
    /// skipped.
    pub fn build_memory(&self) -> Vec<u8> {
        let mut end = 0usize;
        for segment in &self.data {
            if let Some(offset) = const_expr_i32(&segment.offset) {
                end = end.max(offset as usize + segment.data.len());
            }
        }

        let mut memory = vec![0u8; end];
        for segment in &self.data {
            if let Some(offset) = const_expr_i32(&segment.offset) {
                let start = offset as usize;
                memory[start..start + segment.data.len()].copy_from_slice(&segment.data);
            }
        }
        memory
    }

    /// Read a string out of the materialized memory image.
    pub fn read_string(&self, addr: u32, len: u32) -> Option<String> {
        let memory = self.build_memory();
        let start = addr as usize;
        let end = start.checked_add(len as usize)?;
        if end > memory.len() {
            return None;
        }
        Some(String::from_utf8_lossy(&memory[start..end]).into_owned())
    }

    /// The literal a global's init expression evaluates to, if it is a
    /// plain constant.
    pub fn global_init_literal<'a>(&self, global: &'a Global) -> Option<&'a Immediate> {
        const_expr_literal(&global.init)
    }
}

/// The leading constant of an init expression, if any.
pub fn const_expr_literal(instrs: &[Instruction]) -> Option<&Immediate> {
    instrs.iter().find_map(|instr| match instr.opcode {
        Opcode::I32_CONST | Opcode::I64_CONST | Opcode::F32_CONST | Opcode::F64_CONST => {
            instr.immediates.first()
        }
        _ => None,
    })
}

/// An init expression's value as a u32 offset (`i32.const` only).
pub fn const_expr_i32(instrs: &[Instruction]) -> Option<u32> {
    instrs.iter().find_map(|instr| {
        if instr.opcode == Opcode::I32_CONST {
            instr.immediates.first().and_then(Immediate::as_u32)
        } else {
            None
        }
    })
}
