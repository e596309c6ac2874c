//! Pseudocode emission with line→offset mapping, plus the module-wide
//! error collector.
//!
//! The emitter records, for every line it writes, the set of source byte
//! offsets the line originates from. Structural lines (headers, braces,
//! `case` labels) map to their statement's offsets, the signature line to
//! the body's start, and the final closing brace to the last instruction,
//! so a consumer can cross-highlight any line against the hex view.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::wasm::resolve::{Function, ResolvedModule};
use crate::wasm::Opcode;

use super::ast::{CallTarget, Expr, FuncBody, Stmt, StmtKind};
use super::names::NameResolver;
use super::{builder, loops, simplify, DecompileError};

#[derive(Debug, Clone, Serialize)]
pub struct LineMapping {
    pub line: usize,
    pub offsets: Vec<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecompileResult {
    pub code: String,
    pub mappings: Vec<LineMapping>,
}

/// Decompile one defined function: build, simplify, recover structure,
/// emit.
pub fn decompile_function(module: &ResolvedModule, index: u32) -> Result<DecompileResult> {
    let Some(function) = module.function(index) else {
        bail!("no function with index {index}");
    };
    if function.imported {
        bail!("function {index} ({}) is imported", function.name);
    }

    let mut body = builder::build_statements(module, function);
    simplify::simplify_body(&mut body);
    loops::recover_loops(&mut body);
    loops::recover_if_else(&mut body);
    loops::collapse_switch_blocks(&mut body);

    Ok(emit(module, function, &body))
}

/// Decompile every defined function, separated by blank lines.
pub fn decompile_module(module: &ResolvedModule) -> String {
    let mut out = String::new();
    for function in &module.functions {
        if function.imported {
            continue;
        }
        if let Ok(result) = decompile_function(module, function.index) {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&result.code);
        }
    }
    out
}

fn emit(module: &ResolvedModule, function: &Function, body: &FuncBody) -> DecompileResult {
    let names = NameResolver::new(module, function.index, function.param_count());
    let body_offset = function.body.as_ref().map_or(0, |b| b.offset);
    let last_offset = function
        .body
        .as_ref()
        .and_then(|b| b.instructions.last())
        .map_or(body_offset, |i| i.offset);

    let mut e = Emitter {
        names,
        out: String::new(),
        line: 1,
        mappings: BTreeMap::new(),
    };

    let signature = format_signature(function, &e.names);
    e.write_line(0, &format!("{signature} {{"), &[body_offset]);

    for stmt in &body.stmts {
        e.write_stmt(stmt, 1);
    }
    if let Some(ret) = &body.ret {
        let text = format!("return {}", e.expr(ret));
        let offsets = if body.ret_offsets.is_empty() {
            vec![last_offset]
        } else {
            body.ret_offsets.clone()
        };
        e.write_line(1, &text, &offsets);
    }

    e.write_line(0, "}", &[last_offset]);

    DecompileResult {
        code: e.out,
        mappings: e
            .mappings
            .into_iter()
            .map(|(line, offsets)| LineMapping {
                line,
                offsets: offsets.into_iter().collect(),
            })
            .collect(),
    }
}

fn format_signature(function: &Function, names: &NameResolver<'_>) -> String {
    let mut params = String::new();
    let mut ret = String::new();
    if let Some(ty) = &function.ty {
        for (i, p) in ty.params.iter().enumerate() {
            if i > 0 {
                params.push_str(", ");
            }
            let _ = write!(params, "{} {}", p, names.local(i as u32));
        }
        if !ty.results.is_empty() {
            let results: Vec<&str> = ty.results.iter().map(|r| r.name()).collect();
            ret = format!(" -> {}", results.join(", "));
        }
    }
    format!("func {}({params}){ret}", function.name)
}

struct Emitter<'a> {
    names: NameResolver<'a>,
    out: String,
    line: usize,
    mappings: BTreeMap<usize, BTreeSet<u64>>,
}

impl Emitter<'_> {
    fn write_line(&mut self, indent: usize, text: &str, offsets: &[u64]) {
        for _ in 0..indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
        if !offsets.is_empty() {
            self.mappings
                .entry(self.line)
                .or_default()
                .extend(offsets.iter().copied());
        }
        self.line += 1;
    }

    fn write_stmt(&mut self, stmt: &Stmt, indent: usize) {
        let offsets = &stmt.offsets;
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                let text = format!("{} = {}", self.expr(target), self.expr(value));
                self.write_line(indent, &text, offsets);
            }
            StmtKind::Store {
                addr,
                value,
                offset,
                ..
            } => {
                let addr = self.expr(addr);
                let text = if *offset > 0 {
                    format!("mem[{addr} + {offset}] = {}", self.expr(value))
                } else {
                    format!("mem[{addr}] = {}", self.expr(value))
                };
                self.write_line(indent, &text, offsets);
            }
            StmtKind::Call(call) => {
                let text = self.expr(call);
                self.write_line(indent, &text, offsets);
            }
            StmtKind::Return(value) => {
                let text = match value {
                    Some(v) => format!("return {}", self.expr(v)),
                    None => "return".to_string(),
                };
                self.write_line(indent, &text, offsets);
            }
            StmtKind::Drop(value) => {
                let text = format!("_ = {}", self.expr(value));
                self.write_line(indent, &text, offsets);
            }
            StmtKind::If {
                cond,
                then_body,
                else_body,
            } => {
                let text = format!("if {} {{", self.expr(cond));
                self.write_line(indent, &text, offsets);
                for inner in then_body {
                    self.write_stmt(inner, indent + 1);
                }
                if !else_body.is_empty() {
                    self.write_line(indent, "} else {", offsets);
                    for inner in else_body {
                        self.write_stmt(inner, indent + 1);
                    }
                }
                self.write_line(indent, "}", offsets);
            }
            StmtKind::Loop { label, body } => {
                self.write_line(indent, &format!("loop L{label} {{"), offsets);
                for inner in body {
                    self.write_stmt(inner, indent + 1);
                }
                self.write_line(indent, "}", offsets);
            }
            StmtKind::Block { label, body } => {
                self.write_line(indent, &format!("block L{label} {{"), offsets);
                for inner in body {
                    self.write_stmt(inner, indent + 1);
                }
                self.write_line(indent, "}", offsets);
            }
            StmtKind::Break { label, cond } => {
                let text = match cond {
                    Some(c) => format!("if {} break L{label}", self.expr(c)),
                    None => format!("break L{label}"),
                };
                self.write_line(indent, &text, offsets);
            }
            StmtKind::Switch {
                value,
                cases,
                default,
            } => {
                let text = format!("switch {} {{", self.expr(value));
                self.write_line(indent, &text, offsets);
                for (i, label) in cases.iter().enumerate() {
                    self.write_line(indent, &format!("  case {i}: break L{label}"), offsets);
                }
                self.write_line(indent, &format!("  default: break L{default}"), offsets);
                self.write_line(indent, "}", offsets);
            }
            StmtKind::FlatSwitch {
                value,
                cases,
                default,
            } => {
                let text = format!("switch {} {{", self.expr(value));
                self.write_line(indent, &text, offsets);
                for case in cases {
                    self.write_line(indent, &format!("case {}:", case.value), offsets);
                    for inner in &case.body {
                        self.write_stmt(inner, indent + 1);
                    }
                }
                if !default.is_empty() {
                    self.write_line(indent, "default:", offsets);
                    for inner in default {
                        self.write_stmt(inner, indent + 1);
                    }
                }
                self.write_line(indent, "}", offsets);
            }
            StmtKind::While { cond, body } => {
                let text = format!("while {} {{", self.expr(cond));
                self.write_line(indent, &text, offsets);
                for inner in body {
                    self.write_stmt(inner, indent + 1);
                }
                self.write_line(indent, "}", offsets);
            }
            StmtKind::Continue => self.write_line(indent, "continue", offsets),
            StmtKind::Error {
                message, offset, ..
            } => {
                let text = format!("// ERROR at 0x{offset:x}: {message}");
                self.write_line(indent, &text, offsets);
            }
        }
    }

    fn expr(&self, e: &Expr) -> String {
        match e {
            Expr::Local { index, .. } | Expr::Param { index, .. } => self.names.local(*index),
            Expr::Global { index, .. } => self.names.global(*index),
            Expr::Const(literal) => literal.to_string(),
            Expr::Binary {
                op, left, right, ..
            } => format!(
                "({} {} {})",
                self.expr(left),
                op_symbol(*op),
                self.expr(right)
            ),
            Expr::Unary { op, arg, .. } => format!("{}({})", unary_name(*op), self.expr(arg)),
            Expr::Call { target, args, .. } => self.call(*target, args),
            Expr::Load { addr, offset, .. } => {
                let addr = self.expr(addr);
                if *offset > 0 {
                    format!("mem[{addr} + {offset}]")
                } else {
                    format!("mem[{addr}]")
                }
            }
            Expr::Ternary {
                cond,
                then_result,
                else_result,
                ..
            } => format!(
                "({} ? {} : {})",
                self.expr(cond),
                self.opt_expr(then_result.as_deref()),
                self.opt_expr(else_result.as_deref()),
            ),
            Expr::Neg { arg, .. } => format!("-{}", self.expr(arg)),
            Expr::Not { arg } => format!("!({})", self.expr(arg)),
            Expr::Intrinsic { op, args } => {
                let args: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
                format!("{}({})", op.mnemonic(), args.join(", "))
            }
            Expr::Error {
                message, offset, ..
            } => format!("/* ERROR at 0x{offset:x}: {message} */"),
        }
    }

    fn opt_expr(&self, e: Option<&Expr>) -> String {
        match e {
            Some(e) => self.expr(e),
            None => "?".to_string(),
        }
    }

    fn call(&self, target: CallTarget, args: &[Expr]) -> String {
        let name = self.names.func(target);
        let args: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
        format!("{name}({})", args.join(", "))
    }
}

/// Infix symbol of a binary opcode; falls back to the mnemonic for ops
/// without a conventional symbol (`rotl`, `min`, `copysign`, …).
fn op_symbol(op: Opcode) -> &'static str {
    match op {
        Opcode::I32_ADD | Opcode::I64_ADD | Opcode::F32_ADD | Opcode::F64_ADD => "+",
        Opcode::I32_SUB | Opcode::I64_SUB | Opcode::F32_SUB | Opcode::F64_SUB => "-",
        Opcode::I32_MUL | Opcode::I64_MUL | Opcode::F32_MUL | Opcode::F64_MUL => "*",
        Opcode::I32_DIV_S
        | Opcode::I32_DIV_U
        | Opcode::I64_DIV_S
        | Opcode::I64_DIV_U
        | Opcode::F32_DIV
        | Opcode::F64_DIV => "/",
        Opcode::I32_REM_S | Opcode::I32_REM_U | Opcode::I64_REM_S | Opcode::I64_REM_U => "%",
        Opcode::I32_AND | Opcode::I64_AND => "&",
        Opcode::I32_OR | Opcode::I64_OR => "|",
        Opcode::I32_XOR | Opcode::I64_XOR => "^",
        Opcode::I32_SHL | Opcode::I64_SHL => "<<",
        Opcode::I32_SHR_S | Opcode::I32_SHR_U | Opcode::I64_SHR_S | Opcode::I64_SHR_U => ">>",
        Opcode::I32_EQ | Opcode::I64_EQ | Opcode::F32_EQ | Opcode::F64_EQ => "==",
        Opcode::I32_NE | Opcode::I64_NE | Opcode::F32_NE | Opcode::F64_NE => "!=",
        Opcode::I32_LT_S
        | Opcode::I32_LT_U
        | Opcode::I64_LT_S
        | Opcode::I64_LT_U
        | Opcode::F32_LT
        | Opcode::F64_LT => "<",
        Opcode::I32_GT_S
        | Opcode::I32_GT_U
        | Opcode::I64_GT_S
        | Opcode::I64_GT_U
        | Opcode::F32_GT
        | Opcode::F64_GT => ">",
        Opcode::I32_LE_S
        | Opcode::I32_LE_U
        | Opcode::I64_LE_S
        | Opcode::I64_LE_U
        | Opcode::F32_LE
        | Opcode::F64_LE => "<=",
        Opcode::I32_GE_S
        | Opcode::I32_GE_U
        | Opcode::I64_GE_S
        | Opcode::I64_GE_U
        | Opcode::F32_GE
        | Opcode::F64_GE => ">=",
        other => other.mnemonic(),
    }
}

/// Prefix name of a unary opcode.
fn unary_name(op: Opcode) -> &'static str {
    match op {
        Opcode::I32_EQZ | Opcode::I64_EQZ => "!",
        Opcode::I32_CLZ | Opcode::I64_CLZ => "clz",
        Opcode::I32_CTZ | Opcode::I64_CTZ => "ctz",
        Opcode::I32_POPCNT | Opcode::I64_POPCNT => "popcnt",
        Opcode::I32_WRAP_I64 => "i32",
        Opcode::I64_EXTEND_I32_S | Opcode::I64_EXTEND_I32_U => "i64",
        Opcode::I32_TRUNC_SAT_F32_S
        | Opcode::I32_TRUNC_SAT_F32_U
        | Opcode::I32_TRUNC_SAT_F64_S
        | Opcode::I32_TRUNC_SAT_F64_U => "i32_trunc_sat",
        Opcode::I64_TRUNC_SAT_F32_S
        | Opcode::I64_TRUNC_SAT_F32_U
        | Opcode::I64_TRUNC_SAT_F64_S
        | Opcode::I64_TRUNC_SAT_F64_U => "i64_trunc_sat",
        Opcode::I32_REINTERPRET_F32 => "i32_reinterpret",
        Opcode::I64_REINTERPRET_F64 => "i64_reinterpret",
        Opcode::F32_REINTERPRET_I32 => "f32_reinterpret",
        Opcode::F64_REINTERPRET_I64 => "f64_reinterpret",
        other => other.mnemonic(),
    }
}

/// Per-function error breakdown for one module.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionErrors {
    pub func_index: u32,
    pub func_name: String,
    #[serde(skip)]
    pub errors: Vec<DecompileError>,
}

#[derive(Debug, Default, Serialize)]
pub struct ModuleErrors {
    pub functions: Vec<FunctionErrors>,
    pub total_errors: usize,
    /// Totals grouped by the opcode the error was recorded at.
    pub by_opcode: HashMap<String, usize>,
}

/// Run the statement builder over every defined function and gather the
/// accumulated analysis errors.
pub fn collect_errors(module: &ResolvedModule) -> ModuleErrors {
    let mut result = ModuleErrors::default();

    for function in &module.functions {
        if function.imported {
            continue;
        }
        let body = builder::build_statements(module, function);
        if body.errors.is_empty() {
            continue;
        }
        result.total_errors += body.errors.len();
        for error in &body.errors {
            let key = if error.opcode.is_empty() {
                error.message.clone()
            } else {
                error.opcode.clone()
            };
            *result.by_opcode.entry(key).or_insert(0) += 1;
        }
        result.functions.push(FunctionErrors {
            func_index: function.index,
            func_name: function.name.clone(),
            errors: body.errors,
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wasm::{parse, resolve};

    fn resolve_bytes(bytes: &[u8]) -> ResolvedModule {
        resolve::resolve(&parse(bytes).unwrap()).unwrap()
    }

    fn add_module() -> Vec<u8> {
        let mut bytes = b"\x00asm\x01\x00\x00\x00".to_vec();
        bytes.extend_from_slice(&[0x01, 0x07, 0x01, 0x60, 0x02, 0x7F, 0x7F, 0x01, 0x7F]);
        bytes.extend_from_slice(&[0x03, 0x02, 0x01, 0x00]);
        bytes.extend_from_slice(&[0x07, 0x07, 0x01, 0x03, b'a', b'd', b'd', 0x00, 0x00]);
        bytes.extend_from_slice(&[
            0x0A, 0x09, 0x01, 0x07, 0x00, 0x20, 0x00, 0x20, 0x01, 0x6A, 0x0B,
        ]);
        bytes
    }

    #[test]
    fn add_decompiles_to_return_sum() {
        let rm = resolve_bytes(&add_module());
        let result = decompile_function(&rm, 0).unwrap();
        assert!(result.code.contains("func add(i32 p0, i32 p1) -> i32 {"));
        assert!(result.code.contains("return (p0 + p1)"));
    }

    #[test]
    fn neg_simplification_shows_in_output() {
        // (i32) -> i32: i32.const 0; local.get 0; i32.sub; end
        let mut bytes = b"\x00asm\x01\x00\x00\x00".to_vec();
        bytes.extend_from_slice(&[0x01, 0x06, 0x01, 0x60, 0x01, 0x7F, 0x01, 0x7F]);
        bytes.extend_from_slice(&[0x03, 0x02, 0x01, 0x00]);
        bytes.extend_from_slice(&[0x0A, 0x09, 0x01, 0x07, 0x00, 0x41, 0x00, 0x20, 0x00, 0x6B, 0x0B]);
        let rm = resolve_bytes(&bytes);
        let result = decompile_function(&rm, 0).unwrap();
        assert!(result.code.contains("return -p0"), "code: {}", result.code);
    }

    #[test]
    fn eqz_renders_as_not() {
        // (i32) -> i32: local.get 0; i32.eqz; end
        let mut bytes = b"\x00asm\x01\x00\x00\x00".to_vec();
        bytes.extend_from_slice(&[0x01, 0x06, 0x01, 0x60, 0x01, 0x7F, 0x01, 0x7F]);
        bytes.extend_from_slice(&[0x03, 0x02, 0x01, 0x00]);
        bytes.extend_from_slice(&[0x0A, 0x07, 0x01, 0x05, 0x00, 0x20, 0x00, 0x45, 0x0B]);
        let rm = resolve_bytes(&bytes);
        let result = decompile_function(&rm, 0).unwrap();
        assert!(result.code.contains("return !(p0)"), "code: {}", result.code);
    }

    #[test]
    fn every_line_is_mapped() {
        let rm = resolve_bytes(&add_module());
        let result = decompile_function(&rm, 0).unwrap();
        let mapped: std::collections::HashSet<usize> =
            result.mappings.iter().map(|m| m.line).collect();
        for (i, line) in result.code.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            assert!(mapped.contains(&(i + 1)), "line {} unmapped: {line:?}", i + 1);
        }
    }

    #[test]
    fn decompiling_an_import_is_an_error() {
        let mut bytes = b"\x00asm\x01\x00\x00\x00".to_vec();
        bytes.extend_from_slice(&[0x01, 0x05, 0x01, 0x60, 0x01, 0x7F, 0x00]);
        bytes.extend_from_slice(&[
            0x02, 0x0B, 0x01, 0x03, b'e', b'n', b'v', 0x03, b'l', b'o', b'g', 0x00, 0x00,
        ]);
        let rm = resolve_bytes(&bytes);
        assert!(decompile_function(&rm, 0).is_err());
    }

    #[test]
    fn underflow_still_emits_a_body() {
        // () -> i32 with a bare i32.add: errors recorded, body emitted.
        let mut bytes = b"\x00asm\x01\x00\x00\x00".to_vec();
        bytes.extend_from_slice(&[0x01, 0x05, 0x01, 0x60, 0x00, 0x01, 0x7F]);
        bytes.extend_from_slice(&[0x03, 0x02, 0x01, 0x00]);
        bytes.extend_from_slice(&[0x0A, 0x05, 0x01, 0x03, 0x00, 0x6A, 0x0B]);
        let rm = resolve_bytes(&bytes);

        let errors = collect_errors(&rm);
        assert_eq!(errors.functions.len(), 1);
        assert!(errors.total_errors >= 1);
        assert!(errors.by_opcode.contains_key("i32.add"));

        let result = decompile_function(&rm, 0).unwrap();
        assert!(result.code.contains("/* ERROR at 0x"), "code: {}", result.code);
        assert!(result.code.ends_with("}\n"));
    }
}
