//! Text renderers over the resolved model: WAT for the whole module or a
//! single function, and the offset-annotated disassembly listing used by
//! the instruction view.

use std::collections::HashMap;
use std::fmt::Write;

use crate::annotations::Annotations;

use super::resolve::{Function, ResolvedModule};
use super::sections::{ExportKind, FuncType, Global, ImportDesc, Limits};
use super::{Instruction, Opcode};

impl ResolvedModule {
    /// Render the whole module as WAT.
    pub fn to_wat(&self) -> String {
        let mut out = String::new();

        let mut func_exports = HashMap::new();
        let mut mem_exports = HashMap::new();
        let mut global_exports = HashMap::new();
        for export in &self.exports {
            match export.kind {
                ExportKind::Func => {
                    func_exports.insert(export.index, export.name.as_str());
                }
                ExportKind::Memory => {
                    mem_exports.insert(export.index, export.name.as_str());
                }
                ExportKind::Global => {
                    global_exports.insert(export.index, export.name.as_str());
                }
                ExportKind::Table => {}
            }
        }

        out.push_str("(module\n");

        for import in &self.imports {
            let desc = match &import.desc {
                ImportDesc::Func { type_idx } => self
                    .types
                    .get(*type_idx as usize)
                    .map_or_else(|| "(func)".to_string(), format_func_type),
                ImportDesc::Memory { limits } => format!("(memory {})", format_limits(limits)),
                ImportDesc::Table { limits, .. } => {
                    format!("(table {} funcref)", format_limits(limits))
                }
                ImportDesc::Global(g) => {
                    if g.mutable {
                        format!("(global (mut {}))", g.ty)
                    } else {
                        format!("(global {})", g.ty)
                    }
                }
            };
            let _ = writeln!(out, "  (import {:?} {:?} {})", import.module, import.name, desc);
        }

        for function in &self.functions {
            if function.imported {
                continue;
            }
            out.push_str(&format_function_wat(function, func_exports.get(&function.index).copied()));
        }

        for (i, memory) in self.memories.iter().enumerate() {
            match mem_exports.get(&(i as u32)) {
                Some(name) => {
                    let _ = writeln!(out, "  (memory (export {name:?}) {})", format_limits(memory));
                }
                None => {
                    let _ = writeln!(out, "  (memory {})", format_limits(memory));
                }
            }
        }

        for (i, global) in self.globals.iter().enumerate() {
            out.push_str(&format_global(global, global_exports.get(&(i as u32)).copied()));
        }

        out.push(')');
        out
    }
}

fn format_limits(limits: &Limits) -> String {
    match limits.max {
        Some(max) => format!("{} {}", limits.min, max),
        None => limits.min.to_string(),
    }
}

fn format_func_type(ty: &FuncType) -> String {
    let mut parts = Vec::new();
    if !ty.params.is_empty() {
        let params: Vec<&str> = ty.params.iter().map(|p| p.name()).collect();
        parts.push(format!("(param {})", params.join(" ")));
    }
    if !ty.results.is_empty() {
        let results: Vec<&str> = ty.results.iter().map(|r| r.name()).collect();
        parts.push(format!("(result {})", results.join(" ")));
    }
    if parts.is_empty() {
        "(func)".to_string()
    } else {
        format!("(func {})", parts.join(" "))
    }
}

fn format_function_wat(function: &Function, export_name: Option<&str>) -> String {
    let mut out = String::from("  (func");

    if let Some(name) = export_name {
        let _ = write!(out, " (export {name:?})");
    }
    if let Some(ty) = &function.ty {
        if !ty.params.is_empty() {
            out.push_str(" (param");
            for p in &ty.params {
                out.push(' ');
                out.push_str(p.name());
            }
            out.push(')');
        }
        if !ty.results.is_empty() {
            out.push_str(" (result");
            for r in &ty.results {
                out.push(' ');
                out.push_str(r.name());
            }
            out.push(')');
        }
    }
    out.push('\n');

    if let Some(body) = &function.body {
        for local in &body.locals {
            for _ in 0..local.count {
                let _ = writeln!(out, "    (local {})", local.ty);
            }
        }
        for instr in &body.instructions {
            if instr.opcode == Opcode::END {
                continue;
            }
            let _ = writeln!(out, "    {}", format_instruction(instr));
        }
    }

    out.push_str("  )\n");
    out
}

fn format_global(global: &Global, export_name: Option<&str>) -> String {
    let mut out = String::from("  (global");
    if let Some(name) = export_name {
        let _ = write!(out, " (export {name:?})");
    }
    if global.ty.mutable {
        let _ = write!(out, " (mut {})", global.ty.ty);
    } else {
        let _ = write!(out, " {}", global.ty.ty);
    }
    for instr in &global.init {
        if instr.opcode == Opcode::END {
            continue;
        }
        let _ = write!(out, " ({})", format_instruction(instr));
    }
    out.push_str(")\n");
    out
}

/// `mnemonic imm imm …` with label vectors rendered as `[a, b, c]`.
pub fn format_instruction(instr: &Instruction) -> String {
    if instr.immediates.is_empty() {
        return instr.name.to_string();
    }
    let mut out = instr.name.to_string();
    for imm in &instr.immediates {
        let _ = write!(out, " {imm}");
    }
    out
}

/// Render one function as an offset-annotated listing:
/// `OFFSET: mnemonic immediates`, optionally indented by block structure,
/// with sidecar comments interleaved.
pub fn disassemble_function(
    function: &Function,
    indented: bool,
    annotations: Option<&Annotations>,
) -> String {
    if function.imported {
        return format!("; imported: {}", function.name);
    }

    let name = annotations
        .and_then(|a| a.function_name(function.index))
        .unwrap_or(&function.name);

    let mut out = String::new();
    let _ = writeln!(out, "; Function {}: {}", function.index, name);
    if let Some(comment) = annotations.and_then(|a| a.function_comment(function.index)) {
        let _ = writeln!(out, "; {comment}");
    }
    if let Some(ty) = &function.ty {
        let _ = writeln!(out, "; Params: {}, Results: {}", ty.params.len(), ty.results.len());
    }

    let Some(body) = &function.body else {
        return out;
    };

    let mut local_idx = function.param_count();
    for local in &body.locals {
        for _ in 0..local.count {
            let _ = writeln!(out, ";   local[{local_idx}]: {}", local.ty);
            local_idx += 1;
        }
    }
    out.push('\n');

    let mut indent = 0usize;
    for instr in &body.instructions {
        let comment = annotations
            .and_then(|a| a.offset_comment(instr.offset))
            .map(|c| format!(" ; {c}"))
            .unwrap_or_default();

        if indented {
            if matches!(instr.opcode, Opcode::END | Opcode::ELSE) {
                indent = indent.saturating_sub(1);
            }
            let _ = writeln!(
                out,
                "{:08x}: {}{}{}",
                instr.offset,
                "  ".repeat(indent),
                format_instruction(instr),
                comment
            );
            if matches!(
                instr.opcode,
                Opcode::BLOCK | Opcode::LOOP | Opcode::IF | Opcode::ELSE
            ) {
                indent += 1;
            }
        } else {
            let _ = writeln!(out, "{:08x}: {}{}", instr.offset, format_instruction(instr), comment);
        }
    }

    out
}
