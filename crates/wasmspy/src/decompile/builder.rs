//! Lockstep symbolic interpreter and statement builder.
//!
//! One pass over a function's instruction list drives both an abstract
//! value stack (tracking provenance) and an open-block stack (tracking
//! `block`/`loop`/`if` nesting). Statements accumulate into the innermost
//! open block and fold outward as blocks close. Branches translate their
//! relative depth into the synthetic label of the targeted open block.
//!
//! Analysis never aborts: a pop from an empty stack in unreachable code
//! fabricates a benign `i32 0` (approximating the format's
//! stack-polymorphic typing of unreachable code), and in reachable code it
//! injects an error value and records the failure in the function's error
//! list.

use std::collections::BTreeSet;

use crate::wasm::resolve::{Function, ResolvedModule};
use crate::wasm::sections::FuncType;
use crate::wasm::{Immediate, Instruction, Opcode, ValType};

use super::ast::{CallTarget, Expr, FuncBody, Stmt, StmtKind};
use super::sig;
use super::value::{Literal, Origin, Ternary, Value, ValueId, ValuePool};
use super::{AnalysisErrorKind, DecompileError};

enum BlockKind {
    Plain,
    Loop,
    If,
}

struct OpenBlock {
    kind: BlockKind,
    label: u32,
    result: Option<ValType>,
    stack_depth: usize,
    stmts: Vec<Stmt>,
    /// Then-branch statements, parked here once `else` is seen.
    saved_then: Option<Vec<Stmt>>,
    cond: Option<Expr>,
    then_result: Option<Expr>,
    open_offset: u64,
}

pub struct StmtBuilder<'a> {
    module: &'a ResolvedModule,
    function: &'a Function,
    instructions: &'a [Instruction],
    num_params: usize,
    pool: ValuePool,
    locals: Vec<ValueId>,
    stack: Vec<ValueId>,
    blocks: Vec<OpenBlock>,
    stmts: Vec<Stmt>,
    next_label: u32,
    current: usize,
    unreachable: bool,
    errors: Vec<DecompileError>,
}

/// Recover the statement tree of one defined function.
pub fn build_statements(module: &ResolvedModule, function: &Function) -> FuncBody {
    let Some(body) = &function.body else {
        return FuncBody::default();
    };

    let mut builder = StmtBuilder {
        module,
        function,
        instructions: &body.instructions,
        num_params: function.param_count(),
        pool: ValuePool::default(),
        locals: Vec::new(),
        stack: Vec::new(),
        blocks: Vec::new(),
        stmts: Vec::new(),
        next_label: 0,
        current: 0,
        unreachable: false,
        errors: Vec::new(),
    };
    builder.init_locals();
    builder.run()
}

impl<'a> StmtBuilder<'a> {
    /// Locals start as the parameters (in index order) followed by the
    /// declared locals, expanded from their run-length entries.
    fn init_locals(&mut self) {
        if let Some(ty) = &self.function.ty {
            for (i, &param) in ty.params.iter().enumerate() {
                let id = self.pool.alloc(Value {
                    ty: param,
                    instr: None,
                    origin: Origin::Param(i as u32),
                });
                self.locals.push(id);
            }
        }
        if let Some(body) = &self.function.body {
            let mut index = self.locals.len() as u32;
            for entry in &body.locals {
                for _ in 0..entry.count {
                    let id = self.pool.alloc(Value {
                        ty: entry.ty,
                        instr: None,
                        origin: Origin::Local(index),
                    });
                    self.locals.push(id);
                    index += 1;
                }
            }
        }
    }

    fn run(mut self) -> FuncBody {
        for i in 0..self.instructions.len() {
            self.current = i;
            self.process(i);
        }

        let mut ret = None;
        let mut ret_offsets = BTreeSet::new();
        if let Some(&top) = self.stack.last() {
            self.pool
                .collect_offsets(self.instructions, top, &mut ret_offsets);
            ret = Some(self.value_to_expr(top));
        }
        if ret.is_some() && ret_offsets.is_empty() {
            if let Some(last) = self.instructions.last() {
                ret_offsets.insert(last.offset);
            }
        }

        FuncBody {
            stmts: self.stmts,
            ret,
            ret_offsets: ret_offsets.into_iter().collect(),
            errors: self.errors,
        }
    }

    fn process(&mut self, i: usize) {
        let instr = &self.instructions[i];
        match instr.opcode {
            Opcode::BLOCK => self.open_block(BlockKind::Plain, instr),
            Opcode::LOOP => self.open_block(BlockKind::Loop, instr),
            Opcode::IF => {
                let cond = self.pop();
                let cond = self.value_to_expr(cond);
                self.next_label += 1;
                self.blocks.push(OpenBlock {
                    kind: BlockKind::If,
                    label: self.next_label,
                    result: block_result(instr),
                    stack_depth: self.stack.len(),
                    stmts: Vec::new(),
                    saved_then: None,
                    cond: Some(cond),
                    then_result: None,
                    open_offset: instr.offset,
                });
                self.unreachable = false;
            }
            Opcode::ELSE => self.start_else(),
            Opcode::END => self.close_block(instr),

            Opcode::UNREACHABLE => self.unreachable = true,
            Opcode::NOP => {}

            Opcode::BR => {
                let target = self.block_label(instr.immediate_u32(0));
                self.emit(Stmt::new(
                    StmtKind::Break {
                        label: target,
                        cond: None,
                    },
                    vec![instr.offset],
                ));
                self.unreachable = true;
            }
            Opcode::BR_IF => {
                let cond = self.pop();
                let target = self.block_label(instr.immediate_u32(0));
                let offsets = self.offsets_of(&[cond]);
                let cond = self.value_to_expr(cond);
                self.emit(Stmt::new(
                    StmtKind::Break {
                        label: target,
                        cond: Some(cond),
                    },
                    offsets,
                ));
            }
            Opcode::BR_TABLE => {
                let scrutinee = self.pop();
                if let Some(Immediate::Labels(labels)) = instr.immediates.first() {
                    if !labels.is_empty() {
                        let cases: Vec<u32> = labels[..labels.len() - 1]
                            .iter()
                            .map(|&depth| self.block_label(depth))
                            .collect();
                        let default = self.block_label(labels[labels.len() - 1]);
                        let offsets = self.offsets_of(&[scrutinee]);
                        let value = self.value_to_expr(scrutinee);
                        self.emit(Stmt::new(
                            StmtKind::Switch {
                                value,
                                cases,
                                default,
                            },
                            offsets,
                        ));
                    }
                }
                self.unreachable = true;
            }

            Opcode::RETURN => {
                let (value, offsets) = if self.stack.is_empty() {
                    (None, vec![instr.offset])
                } else {
                    let v = self.pop();
                    let offsets = self.offsets_of(&[v]);
                    (Some(self.value_to_expr(v)), offsets)
                };
                self.emit(Stmt::new(StmtKind::Return(value), offsets));
                self.unreachable = true;
            }

            Opcode::LOCAL_GET => {
                let index = instr.immediate_u32(0);
                match self.locals.get(index as usize) {
                    Some(&slot) => {
                        let ty = self.pool.get(slot).ty;
                        let origin = if (index as usize) < self.num_params {
                            Origin::Param(index)
                        } else {
                            Origin::Local(index)
                        };
                        self.push(Value {
                            ty,
                            instr: Some(i),
                            origin,
                        });
                    }
                    None => {
                        let value = self.index_error(instr, "local", index);
                        self.stack.push(value);
                    }
                }
            }
            Opcode::LOCAL_SET => {
                let index = instr.immediate_u32(0);
                let value = self.pop();
                if let Some(slot) = self.locals.get_mut(index as usize) {
                    *slot = value;
                }
                let ty = self.pool.get(value).ty;
                let offsets = self.offsets_of(&[value]);
                let value = self.value_to_expr(value);
                self.emit(Stmt::new(
                    StmtKind::Assign {
                        target: self.var_expr(index, ty),
                        value,
                    },
                    offsets,
                ));
            }
            Opcode::LOCAL_TEE => {
                let index = instr.immediate_u32(0);
                if let Some(&top) = self.stack.last() {
                    if let Some(slot) = self.locals.get_mut(index as usize) {
                        *slot = top;
                    }
                    let ty = self.pool.get(top).ty;
                    let offsets = self.offsets_of(&[top]);
                    let value = self.value_to_expr(top);
                    self.emit(Stmt::new(
                        StmtKind::Assign {
                            target: self.var_expr(index, ty),
                            value,
                        },
                        offsets,
                    ));
                }
            }
            Opcode::GLOBAL_GET => {
                let index = instr.immediate_u32(0);
                let ty = self
                    .module
                    .globals
                    .get(index as usize)
                    .map_or(ValType::I32, |g| g.ty.ty);
                self.push(Value {
                    ty,
                    instr: Some(i),
                    origin: Origin::Global(index),
                });
            }
            Opcode::GLOBAL_SET => {
                let index = instr.immediate_u32(0);
                let value = self.pop();
                let ty = self.pool.get(value).ty;
                let offsets = self.offsets_of(&[value]);
                let value = self.value_to_expr(value);
                self.emit(Stmt::new(
                    StmtKind::Assign {
                        target: Expr::Global { index, ty },
                        value,
                    },
                    offsets,
                ));
            }

            Opcode::I32_CONST | Opcode::I64_CONST | Opcode::F32_CONST | Opcode::F64_CONST => {
                let literal = const_literal(instr);
                self.push(Value {
                    ty: literal.ty(),
                    instr: Some(i),
                    origin: Origin::Const(literal),
                });
            }

            Opcode::CALL => self.call_direct(i, instr),
            Opcode::CALL_INDIRECT => self.call_indirect(i, instr),

            Opcode::DROP => {
                let value = self.pop();
                let offsets = self.offsets_of(&[value]);
                let value = self.value_to_expr(value);
                self.emit(Stmt::new(StmtKind::Drop(value), offsets));
            }
            Opcode::SELECT => {
                let cond = self.pop();
                let else_val = self.pop();
                let then_val = self.pop();
                let ty = self.pool.get(then_val).ty;
                let ternary = Ternary {
                    cond: self.value_to_expr(cond),
                    then_result: Some(self.value_to_expr(then_val)),
                    else_result: Some(self.value_to_expr(else_val)),
                };
                self.push(Value {
                    ty,
                    instr: Some(i),
                    origin: Origin::Op {
                        instr: i,
                        inputs: vec![then_val, else_val, cond],
                        ternary: Some(Box::new(ternary)),
                    },
                });
            }

            op if sig::is_store(op) => {
                let value = self.pop();
                let addr = self.pop();
                let offsets = self.offsets_of(&[value, addr]);
                let value = self.value_to_expr(value);
                let addr = self.value_to_expr(addr);
                self.emit(Stmt::new(
                    StmtKind::Store {
                        op,
                        addr,
                        value,
                        offset: instr.immediate_u32(1),
                    },
                    offsets,
                ));
            }
            op if sig::is_load(op) => {
                let addr = self.pop();
                let ty = sig::signature(op)
                    .and_then(|s| s.outputs.first().copied())
                    .unwrap_or(ValType::I32);
                self.push(Value {
                    ty,
                    instr: Some(i),
                    origin: Origin::Load {
                        instr: i,
                        addr,
                        offset: instr.immediate_u32(1),
                    },
                });
            }

            op => self.generic_op(i, instr, op),
        }
    }

    fn open_block(&mut self, kind: BlockKind, instr: &Instruction) {
        self.next_label += 1;
        self.blocks.push(OpenBlock {
            kind,
            label: self.next_label,
            result: block_result(instr),
            stack_depth: self.stack.len(),
            stmts: Vec::new(),
            saved_then: None,
            cond: None,
            then_result: None,
            open_offset: instr.offset,
        });
        self.unreachable = false;
    }

    /// `else`: park the then-branch, capture its result value if the block
    /// yields one, and restart accumulation for the else-branch.
    fn start_else(&mut self) {
        let Some(top) = self.blocks.last_mut() else {
            return;
        };
        if top.result.is_some() && self.stack.len() > top.stack_depth {
            let value = self.stack.pop().expect("stack checked above");
            top.then_result = Some(value_expr(&self.pool, self.instructions, value));
        }
        let then_stmts = std::mem::take(&mut top.stmts);
        top.saved_then = Some(then_stmts);
        let depth = top.stack_depth;
        self.stack.truncate(depth);
        self.unreachable = false;
    }

    fn close_block(&mut self, instr: &Instruction) {
        let Some(mut block) = self.blocks.pop() else {
            // The function's final `end`.
            return;
        };

        let mut else_result = None;
        if matches!(block.kind, BlockKind::If) && block.result.is_some() {
            if self.stack.len() > block.stack_depth {
                let value = self.stack.pop().expect("stack checked above");
                let expr = value_expr(&self.pool, self.instructions, value);
                if block.saved_then.is_some() {
                    else_result = Some(expr);
                } else {
                    block.then_result = Some(expr);
                }
            }
        }
        self.stack.truncate(block.stack_depth);

        if let Some(result) = block.result {
            if matches!(block.kind, BlockKind::If) {
                let ternary = Ternary {
                    cond: block.cond.clone().unwrap_or(Expr::Const(Literal::I32(0))),
                    then_result: block.then_result.clone(),
                    else_result,
                };
                self.push(Value {
                    ty: result,
                    instr: Some(self.current),
                    origin: Origin::Op {
                        instr: self.current,
                        inputs: Vec::new(),
                        ternary: Some(Box::new(ternary)),
                    },
                });
            } else {
                // Neutral placeholder for a value-yielding block or loop.
                self.push(Value {
                    ty: result,
                    instr: Some(self.current),
                    origin: Origin::Const(Literal::zero(result)),
                });
            }
        }
        self.unreachable = false;

        let offsets = dedup_offsets(&[block.open_offset, instr.offset]);
        let stmt = match block.kind {
            BlockKind::Plain => {
                if block.stmts.is_empty() {
                    None
                } else {
                    Some(StmtKind::Block {
                        label: block.label,
                        body: block.stmts,
                    })
                }
            }
            BlockKind::Loop => Some(StmtKind::Loop {
                label: block.label,
                body: block.stmts,
            }),
            BlockKind::If => {
                let (then_body, else_body) = match block.saved_then {
                    Some(then_stmts) => (then_stmts, block.stmts),
                    None => (block.stmts, Vec::new()),
                };
                Some(StmtKind::If {
                    cond: block.cond.unwrap_or(Expr::Const(Literal::I32(0))),
                    then_body,
                    else_body,
                })
            }
        };
        if let Some(kind) = stmt {
            self.emit(Stmt::new(kind, offsets));
        }
    }

    fn call_direct(&mut self, i: usize, instr: &Instruction) {
        let index = instr.immediate_u32(0);
        let module = self.module;
        let Some(ty) = module.function_type(index) else {
            let message = format!("unknown function index {index}");
            self.record_error(AnalysisErrorKind::InvalidIndex, instr, &message);
            self.emit(Stmt::new(
                StmtKind::Error {
                    message,
                    offset: instr.offset,
                    opcode: instr.name.to_string(),
                },
                vec![instr.offset],
            ));
            return;
        };
        self.apply_call(i, instr, ty, CallTarget::Direct(index), None);
    }

    fn call_indirect(&mut self, i: usize, instr: &Instruction) {
        let type_idx = instr.immediate_u32(0);
        let callee = self.pop();
        let module = self.module;
        let Some(ty) = module.types.get(type_idx as usize) else {
            let offsets = self.offsets_of(&[callee]);
            let callee = self.value_to_expr(callee);
            self.emit(Stmt::new(
                StmtKind::Call(Expr::Call {
                    target: CallTarget::Indirect,
                    args: vec![callee],
                    ty: None,
                }),
                offsets,
            ));
            return;
        };
        self.apply_call(i, instr, ty, CallTarget::Indirect, Some(callee));
    }

    /// Pop arguments, then either emit a call statement (no results) or
    /// push result values tagged to the call instruction.
    fn apply_call(
        &mut self,
        i: usize,
        instr: &Instruction,
        ty: &FuncType,
        target: CallTarget,
        callee: Option<ValueId>,
    ) {
        let mut inputs = Vec::with_capacity(ty.params.len() + 1);
        for _ in 0..ty.params.len() {
            inputs.push(self.pop());
        }
        inputs.reverse();
        if let Some(callee) = callee {
            inputs.insert(0, callee);
        }

        if ty.results.is_empty() {
            let offsets = self.offsets_of(&inputs);
            let args = inputs.iter().map(|&v| self.value_to_expr(v)).collect();
            self.emit(Stmt::new(
                StmtKind::Call(Expr::Call {
                    target,
                    args,
                    ty: None,
                }),
                offsets,
            ));
        } else {
            for &result in &ty.results {
                self.push(Value {
                    ty: result,
                    instr: Some(i),
                    origin: Origin::Op {
                        instr: i,
                        inputs: inputs.clone(),
                        ternary: None,
                    },
                });
            }
        }
    }

    /// Everything driven purely by its stack signature, plus the
    /// unsupported-opcode fallback.
    fn generic_op(&mut self, i: usize, instr: &Instruction, op: Opcode) {
        let Some(signature) = sig::signature(op) else {
            let message = format!("unsupported: {} (0x{:x})", instr.name, instr.opcode.0);
            self.record_error(AnalysisErrorKind::UnknownOpcode, instr, &message);
            self.emit(Stmt::new(
                StmtKind::Error {
                    message,
                    offset: instr.offset,
                    opcode: instr.name.to_string(),
                },
                vec![instr.offset],
            ));
            return;
        };

        let mut inputs = Vec::with_capacity(signature.inputs.len());
        for _ in 0..signature.inputs.len() {
            inputs.push(self.pop());
        }
        inputs.reverse();
        for &out in signature.outputs {
            self.push(Value {
                ty: out,
                instr: Some(i),
                origin: Origin::Op {
                    instr: i,
                    inputs: inputs.clone(),
                    ternary: None,
                },
            });
        }
    }

    fn push(&mut self, value: Value) {
        let id = self.pool.alloc(value);
        self.stack.push(id);
    }

    /// The stack-underflow policy lives here: unreachable code fabricates a
    /// benign zero, reachable code records the failure and injects an error
    /// value so analysis can continue.
    fn pop(&mut self) -> ValueId {
        if let Some(id) = self.stack.pop() {
            return id;
        }
        let instr = &self.instructions[self.current];
        if self.unreachable {
            return self.pool.alloc(Value {
                ty: ValType::I32,
                instr: Some(self.current),
                origin: Origin::Const(Literal::I32(0)),
            });
        }
        let message = format!("stack underflow at {} (0x{:x})", instr.name, instr.opcode.0);
        self.record_error(AnalysisErrorKind::StackUnderflow, instr, &message);
        self.pool.alloc(Value {
            ty: ValType::I32,
            instr: Some(self.current),
            origin: Origin::Error {
                message,
                offset: instr.offset,
                opcode: instr.name,
            },
        })
    }

    fn index_error(&mut self, instr: &Instruction, what: &str, index: u32) -> ValueId {
        let message = format!("{what} index {index} out of bounds");
        self.record_error(AnalysisErrorKind::InvalidIndex, instr, &message);
        self.pool.alloc(Value {
            ty: ValType::I32,
            instr: Some(self.current),
            origin: Origin::Error {
                message,
                offset: instr.offset,
                opcode: instr.name,
            },
        })
    }

    fn record_error(&mut self, kind: AnalysisErrorKind, instr: &Instruction, message: &str) {
        self.errors.push(DecompileError {
            kind,
            offset: instr.offset,
            opcode: instr.name.to_string(),
            message: message.to_string(),
        });
    }

    fn emit(&mut self, stmt: Stmt) {
        match self.blocks.last_mut() {
            Some(block) => block.stmts.push(stmt),
            None => self.stmts.push(stmt),
        }
    }

    /// Label of the open block at the given relative depth (0 = innermost).
    fn block_label(&self, depth: u32) -> u32 {
        let len = self.blocks.len();
        match len.checked_sub(1 + depth as usize) {
            Some(idx) => self.blocks[idx].label,
            None => 0,
        }
    }

    fn var_expr(&self, index: u32, ty: ValType) -> Expr {
        if (index as usize) < self.num_params {
            Expr::Param { index, ty }
        } else {
            Expr::Local { index, ty }
        }
    }

    /// Offsets for a statement: the current instruction plus everything
    /// that flowed into the given values.
    fn offsets_of(&self, values: &[ValueId]) -> Vec<u64> {
        let mut set = BTreeSet::new();
        set.insert(self.instructions[self.current].offset);
        for &v in values {
            self.pool.collect_offsets(self.instructions, v, &mut set);
        }
        set.into_iter().collect()
    }

    fn value_to_expr(&self, id: ValueId) -> Expr {
        value_expr(&self.pool, self.instructions, id)
    }
}

/// Convert an abstract value into an expression by its provenance.
fn value_expr(pool: &ValuePool, instructions: &[Instruction], id: ValueId) -> Expr {
    let value = pool.get(id);
    match &value.origin {
        Origin::Param(index) => Expr::Param {
            index: *index,
            ty: value.ty,
        },
        Origin::Local(index) => Expr::Local {
            index: *index,
            ty: value.ty,
        },
        Origin::Global(index) => Expr::Global {
            index: *index,
            ty: value.ty,
        },
        Origin::Const(literal) => Expr::Const(*literal),
        Origin::Error {
            message, offset, ..
        } => Expr::Error {
            message: message.clone(),
            offset: *offset,
        },
        Origin::Load {
            instr,
            addr,
            offset,
        } => Expr::Load {
            op: instructions[*instr].opcode,
            addr: Box::new(value_expr(pool, instructions, *addr)),
            offset: *offset,
            ty: value.ty,
        },
        Origin::Op {
            instr,
            inputs,
            ternary,
        } => {
            if let Some(ternary) = ternary {
                return Expr::Ternary {
                    cond: Box::new(ternary.cond.clone()),
                    then_result: ternary.then_result.clone().map(Box::new),
                    else_result: ternary.else_result.clone().map(Box::new),
                    ty: value.ty,
                };
            }
            let instr = &instructions[*instr];
            let op = instr.opcode;
            let arg = |i: usize| value_expr(pool, instructions, inputs[i]);

            if sig::is_binary(op) && inputs.len() >= 2 {
                Expr::Binary {
                    op,
                    left: Box::new(arg(0)),
                    right: Box::new(arg(1)),
                    ty: value.ty,
                }
            } else if sig::is_unary(op) && !inputs.is_empty() {
                Expr::Unary {
                    op,
                    arg: Box::new(arg(0)),
                    ty: value.ty,
                }
            } else if op == Opcode::CALL {
                Expr::Call {
                    target: CallTarget::Direct(instr.immediate_u32(0)),
                    args: (0..inputs.len()).map(arg).collect(),
                    ty: Some(value.ty),
                }
            } else if op == Opcode::CALL_INDIRECT {
                Expr::Call {
                    target: CallTarget::Indirect,
                    args: (0..inputs.len()).map(arg).collect(),
                    ty: Some(value.ty),
                }
            } else {
                Expr::Intrinsic {
                    op,
                    args: (0..inputs.len()).map(arg).collect(),
                }
            }
        }
    }
}

fn block_result(instr: &Instruction) -> Option<ValType> {
    match instr.immediates.first() {
        Some(&Immediate::Byte(0x40)) => None,
        Some(&Immediate::Byte(b)) => ValType::from_byte(b),
        _ => None,
    }
}

fn const_literal(instr: &Instruction) -> Literal {
    match instr.immediates.first() {
        Some(&Immediate::S32(v)) => Literal::I32(v),
        Some(&Immediate::S64(v)) => Literal::I64(v),
        Some(&Immediate::F32(v)) => Literal::F32(v),
        Some(&Immediate::F64(v)) => Literal::F64(v),
        _ => Literal::I32(0),
    }
}

fn dedup_offsets(offsets: &[u64]) -> Vec<u64> {
    let set: BTreeSet<u64> = offsets.iter().copied().collect();
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::super::ast::StmtKind;
    use super::*;
    use crate::wasm::{parse, resolve};

    fn module_with_body(
        type_bytes: &[u8],
        body_code: &[u8],
        extra_locals: &[(u8, u8)],
    ) -> ResolvedModule {
        let mut bytes = b"\x00asm\x01\x00\x00\x00".to_vec();
        let mut type_section = vec![0x01];
        type_section.extend_from_slice(type_bytes);
        bytes.push(0x01);
        bytes.push(type_section.len() as u8);
        bytes.extend_from_slice(&type_section);
        bytes.extend_from_slice(&[0x03, 0x02, 0x01, 0x00]);

        let mut body = vec![extra_locals.len() as u8];
        for &(count, ty) in extra_locals {
            body.push(count);
            body.push(ty);
        }
        body.extend_from_slice(body_code);
        let mut code = vec![0x01, body.len() as u8];
        code.extend_from_slice(&body);
        bytes.push(0x0A);
        bytes.push(code.len() as u8);
        bytes.extend_from_slice(&code);

        resolve::resolve(&parse(&bytes).unwrap()).unwrap()
    }

    #[test]
    fn add_returns_binary_over_params() {
        let rm = module_with_body(
            &[0x60, 0x02, 0x7F, 0x7F, 0x01, 0x7F],
            &[0x20, 0x00, 0x20, 0x01, 0x6A, 0x0B],
            &[],
        );
        let body = build_statements(&rm, rm.function(0).unwrap());
        assert!(body.stmts.is_empty());
        assert!(body.errors.is_empty());
        match body.ret {
            Some(Expr::Binary {
                op,
                ref left,
                ref right,
                ..
            }) => {
                assert_eq!(op, Opcode::I32_ADD);
                assert_eq!(**left, Expr::Param { index: 0, ty: ValType::I32 });
                assert_eq!(**right, Expr::Param { index: 1, ty: ValType::I32 });
            }
            ref other => panic!("expected binary return, got {other:?}"),
        }
        assert!(!body.ret_offsets.is_empty());
    }

    #[test]
    fn local_set_emits_assignment() {
        // () -> (), local v0: i32; i32.const 7; local.set 0; end
        let rm = module_with_body(
            &[0x60, 0x00, 0x00],
            &[0x41, 0x07, 0x21, 0x00, 0x0B],
            &[(1, 0x7F)],
        );
        let body = build_statements(&rm, rm.function(0).unwrap());
        assert_eq!(body.stmts.len(), 1);
        match &body.stmts[0].kind {
            StmtKind::Assign { target, value } => {
                assert_eq!(*target, Expr::Local { index: 0, ty: ValType::I32 });
                assert_eq!(*value, Expr::Const(Literal::I32(7)));
            }
            other => panic!("expected assign, got {other:?}"),
        }
        assert!(!body.stmts[0].offsets.is_empty());
    }

    #[test]
    fn reachable_underflow_records_error_and_continues() {
        // () -> i32 with a bare i32.add.
        let rm = module_with_body(&[0x60, 0x00, 0x01, 0x7F], &[0x6A, 0x0B], &[]);
        let body = build_statements(&rm, rm.function(0).unwrap());
        assert!(body
            .errors
            .iter()
            .any(|e| e.kind == AnalysisErrorKind::StackUnderflow));
        match body.ret {
            Some(Expr::Binary { ref left, .. }) => {
                assert!(matches!(**left, Expr::Error { .. }));
            }
            ref other => panic!("expected binary over error values, got {other:?}"),
        }
    }

    #[test]
    fn unreachable_underflow_is_silent() {
        // () -> (): unreachable; drop; end - drop pops from an empty stack
        // in unreachable code.
        let rm = module_with_body(&[0x60, 0x00, 0x00], &[0x00, 0x1A, 0x0B], &[]);
        let body = build_statements(&rm, rm.function(0).unwrap());
        assert!(body.errors.is_empty());
        assert_eq!(body.stmts.len(), 1);
        match &body.stmts[0].kind {
            StmtKind::Drop(Expr::Const(Literal::I32(0))) => {}
            other => panic!("expected drop of fabricated zero, got {other:?}"),
        }
    }

    #[test]
    fn branch_depth_resolves_to_open_block_labels() {
        // block; block; br 1; end; end - br 1 targets the outer block.
        let rm = module_with_body(
            &[0x60, 0x00, 0x00],
            &[0x02, 0x40, 0x02, 0x40, 0x0C, 0x01, 0x0B, 0x0B, 0x0B],
            &[],
        );
        let body = build_statements(&rm, rm.function(0).unwrap());
        // Outer block (label 1) holds inner block (label 2).
        match &body.stmts[0].kind {
            StmtKind::Block { label: 1, body } => match &body[0].kind {
                StmtKind::Block { label: 2, body } => match &body[0].kind {
                    StmtKind::Break { label: 1, cond: None } => {}
                    other => panic!("expected break to label 1, got {other:?}"),
                },
                other => panic!("expected inner block, got {other:?}"),
            },
            other => panic!("expected outer block, got {other:?}"),
        }
    }

    #[test]
    fn if_else_branches_keep_roles() {
        // (i32) -> (): if (p0) { v... } else { ... } encoded as
        // local.get 0; if void; i32.const 1; drop; else; i32.const 2; drop; end; end
        let rm = module_with_body(
            &[0x60, 0x01, 0x7F, 0x00],
            &[
                0x20, 0x00, 0x04, 0x40, 0x41, 0x01, 0x1A, 0x05, 0x41, 0x02, 0x1A, 0x0B, 0x0B,
            ],
            &[],
        );
        let body = build_statements(&rm, rm.function(0).unwrap());
        match &body.stmts[0].kind {
            StmtKind::If {
                cond,
                then_body,
                else_body,
            } => {
                assert_eq!(*cond, Expr::Param { index: 0, ty: ValType::I32 });
                assert!(matches!(
                    then_body[0].kind,
                    StmtKind::Drop(Expr::Const(Literal::I32(1)))
                ));
                assert!(matches!(
                    else_body[0].kind,
                    StmtKind::Drop(Expr::Const(Literal::I32(2)))
                ));
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn select_lowers_to_ternary() {
        // (i32,i32,i32) -> i32: local.get 0; local.get 1; local.get 2; select; end
        let rm = module_with_body(
            &[0x60, 0x03, 0x7F, 0x7F, 0x7F, 0x01, 0x7F],
            &[0x20, 0x00, 0x20, 0x01, 0x20, 0x02, 0x1B, 0x0B],
            &[],
        );
        let body = build_statements(&rm, rm.function(0).unwrap());
        match body.ret {
            Some(Expr::Ternary {
                ref cond,
                ref then_result,
                ref else_result,
                ..
            }) => {
                assert_eq!(**cond, Expr::Param { index: 2, ty: ValType::I32 });
                assert_eq!(
                    *then_result.as_deref().unwrap(),
                    Expr::Param { index: 0, ty: ValType::I32 }
                );
                assert_eq!(
                    *else_result.as_deref().unwrap(),
                    Expr::Param { index: 1, ty: ValType::I32 }
                );
            }
            ref other => panic!("expected ternary, got {other:?}"),
        }
    }
}
