//! Flat per-instruction frame analysis.
//!
//! A simplified symbolic pass that ignores block structure and records,
//! for every instruction, the value stack as it looked *before* the
//! instruction and the locals as they looked after it. This powers the
//! instruction-level stack view; the statement builder does its own,
//! block-aware simulation.

use crate::wasm::resolve::{Function, ResolvedModule};
use crate::wasm::{Opcode, ValType};

use super::sig;
use super::value::{Literal, Origin, Value, ValueId, ValuePool};
use super::{AnalysisErrorKind, DecompileError};

/// Snapshot around one instruction (an index into the function's
/// instruction list).
#[derive(Debug, Clone)]
pub struct Frame {
    pub instr: usize,
    pub stack: Vec<ValueId>,
    pub locals: Vec<ValueId>,
}

#[derive(Debug, Default)]
pub struct FrameAnalysis {
    pub pool: ValuePool,
    pub frames: Vec<Frame>,
    pub errors: Vec<DecompileError>,
}

pub fn analyze_frames(module: &ResolvedModule, function: &Function) -> FrameAnalysis {
    let mut analysis = FrameAnalysis::default();
    let Some(body) = &function.body else {
        return analysis;
    };

    let mut locals: Vec<ValueId> = Vec::new();
    if let Some(ty) = &function.ty {
        for (i, &param) in ty.params.iter().enumerate() {
            locals.push(analysis.pool.alloc(Value {
                ty: param,
                instr: None,
                origin: Origin::Param(i as u32),
            }));
        }
    }
    let mut index = locals.len() as u32;
    for entry in &body.locals {
        for _ in 0..entry.count {
            locals.push(analysis.pool.alloc(Value {
                ty: entry.ty,
                instr: None,
                origin: Origin::Local(index),
            }));
            index += 1;
        }
    }

    let num_params = function.param_count();
    let mut stack: Vec<ValueId> = Vec::new();

    for (i, instr) in body.instructions.iter().enumerate() {
        let before = stack.clone();

        match instr.opcode {
            Opcode::LOCAL_GET => {
                let idx = instr.immediate_u32(0);
                match locals.get(idx as usize) {
                    Some(&slot) => {
                        let ty = analysis.pool.get(slot).ty;
                        let origin = if (idx as usize) < num_params {
                            Origin::Param(idx)
                        } else {
                            Origin::Local(idx)
                        };
                        stack.push(analysis.pool.alloc(Value {
                            ty,
                            instr: Some(i),
                            origin,
                        }));
                    }
                    None => analysis.errors.push(DecompileError {
                        kind: AnalysisErrorKind::InvalidIndex,
                        offset: instr.offset,
                        opcode: instr.name.to_string(),
                        message: format!("local index {idx} out of bounds"),
                    }),
                }
            }
            Opcode::LOCAL_SET => {
                let idx = instr.immediate_u32(0);
                match stack.pop() {
                    Some(value) => {
                        if let Some(slot) = locals.get_mut(idx as usize) {
                            *slot = value;
                        }
                    }
                    None => analysis.record_underflow(instr),
                }
            }
            Opcode::LOCAL_TEE => {
                let idx = instr.immediate_u32(0);
                match stack.last() {
                    Some(&value) => {
                        if let Some(slot) = locals.get_mut(idx as usize) {
                            *slot = value;
                        }
                    }
                    None => analysis.record_underflow(instr),
                }
            }
            Opcode::GLOBAL_GET => {
                let idx = instr.immediate_u32(0);
                let ty = module
                    .globals
                    .get(idx as usize)
                    .map_or(ValType::I32, |g| g.ty.ty);
                stack.push(analysis.pool.alloc(Value {
                    ty,
                    instr: Some(i),
                    origin: Origin::Global(idx),
                }));
            }
            Opcode::GLOBAL_SET => {
                if stack.pop().is_none() {
                    analysis.record_underflow(instr);
                }
            }
            Opcode::I32_CONST | Opcode::I64_CONST | Opcode::F32_CONST | Opcode::F64_CONST => {
                let literal = match instr.immediates.first() {
                    Some(&crate::wasm::Immediate::S32(v)) => Literal::I32(v),
                    Some(&crate::wasm::Immediate::S64(v)) => Literal::I64(v),
                    Some(&crate::wasm::Immediate::F32(v)) => Literal::F32(v),
                    Some(&crate::wasm::Immediate::F64(v)) => Literal::F64(v),
                    _ => Literal::I32(0),
                };
                stack.push(analysis.pool.alloc(Value {
                    ty: literal.ty(),
                    instr: Some(i),
                    origin: Origin::Const(literal),
                }));
            }
            Opcode::CALL | Opcode::CALL_INDIRECT => {
                let ty = if instr.opcode == Opcode::CALL {
                    module.function_type(instr.immediate_u32(0)).cloned()
                } else {
                    if stack.pop().is_none() {
                        analysis.record_underflow(instr);
                    }
                    module.types.get(instr.immediate_u32(0) as usize).cloned()
                };
                if let Some(ty) = ty {
                    let mut inputs = Vec::with_capacity(ty.params.len());
                    for _ in 0..ty.params.len() {
                        match stack.pop() {
                            Some(v) => inputs.push(v),
                            None => analysis.record_underflow(instr),
                        }
                    }
                    inputs.reverse();
                    for &result in &ty.results {
                        stack.push(analysis.pool.alloc(Value {
                            ty: result,
                            instr: Some(i),
                            origin: Origin::Op {
                                instr: i,
                                inputs: inputs.clone(),
                                ternary: None,
                            },
                        }));
                    }
                }
            }
            op => {
                if let Some(signature) = sig::signature(op) {
                    let mut inputs = Vec::with_capacity(signature.inputs.len());
                    for _ in 0..signature.inputs.len() {
                        match stack.pop() {
                            Some(v) => inputs.push(v),
                            None => analysis.record_underflow(instr),
                        }
                    }
                    inputs.reverse();
                    for &out in signature.outputs {
                        stack.push(analysis.pool.alloc(Value {
                            ty: out,
                            instr: Some(i),
                            origin: Origin::Op {
                                instr: i,
                                inputs: inputs.clone(),
                                ternary: None,
                            },
                        }));
                    }
                }
            }
        }

        analysis.frames.push(Frame {
            instr: i,
            stack: before,
            locals: locals.clone(),
        });
    }

    analysis
}

impl FrameAnalysis {
    fn record_underflow(&mut self, instr: &crate::wasm::Instruction) {
        self.errors.push(DecompileError {
            kind: AnalysisErrorKind::StackUnderflow,
            offset: instr.offset,
            opcode: instr.name.to_string(),
            message: format!("stack underflow at {}", instr.name),
        });
    }
}
