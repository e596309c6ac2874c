//! Decompilation: symbolic execution, structural recovery, pseudocode
//! emission.
//!
//! The pipeline over one function is:
//!
//! 1. [`builder::build_statements`] - run the abstract stack machine in
//!    lockstep with statement building, producing a [`ast::FuncBody`].
//! 2. [`simplify::simplify_body`] - constant folding and idiom rewrites.
//! 3. [`loops::recover_loops`] - rewrite the block/loop/branch idiom into
//!    `while` with `continue`/`break`.
//! 4. [`loops::recover_if_else`] - rewrite conditional forward jumps into
//!    `if`.
//! 5. [`loops::collapse_switch_blocks`] - flatten the `br_table` staircase
//!    into a single switch.
//! 6. [`codegen`] - emit pseudocode and the line→offset mapping.
//!
//! The recovery order is load-bearing: if/else recovery must not run before
//! loop recovery or it consumes the loop idiom's outer block.

pub mod ast;
pub mod builder;
pub mod callgraph;
pub mod codegen;
pub mod frames;
pub mod loops;
pub mod names;
pub mod sig;
pub mod simplify;
pub mod value;

pub use ast::{CallTarget, Expr, FuncBody, Stmt, StmtKind, SwitchCase};
pub use builder::build_statements;
pub use callgraph::CallGraph;
pub use codegen::{
    collect_errors, decompile_function, decompile_module, DecompileResult, FunctionErrors,
    LineMapping, ModuleErrors,
};
pub use frames::{analyze_frames, Frame, FrameAnalysis};
pub use loops::{collapse_switch_blocks, recover_if_else, recover_loops};
pub use simplify::simplify_body;
pub use value::{Literal, Origin, Value, ValueId, ValuePool};

use thiserror::Error;

/// Non-fatal analysis failure classes, accumulated per function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisErrorKind {
    StackUnderflow,
    InvalidIndex,
    TypeMismatch,
    UnknownOpcode,
}

/// One recorded analysis failure. The builder keeps going after recording
/// one, substituting an error expression or statement at the failure site.
#[derive(Debug, Clone, Error)]
#[error("{message} at offset 0x{offset:x} ({opcode})")]
pub struct DecompileError {
    pub kind: AnalysisErrorKind,
    pub offset: u64,
    pub opcode: String,
    pub message: String,
}
