//! WebAssembly inspection core: parser, disassembler, decompiler.
//!
//! Turns a compiled module into a structured model, decodes its
//! instruction stream, and reconstructs readable pseudocode with stable
//! offset↔line mappings from each function's stack-machine bytecode.
//!
//! # Architecture
//!
//! The pipeline has five stages:
//!
//! 1. **Parse** ([`wasm::parser`]) - verify magic/version and frame the
//!    file into sections; per-section parsers produce typed records.
//! 2. **Resolve** ([`wasm::resolve`]) - stitch sections into a
//!    [`ResolvedModule`] with a dense function table and display names
//!    (export > name section > synthesized).
//! 3. **Symbolic execution** ([`decompile::builder`]) - an abstract stack
//!    machine tracks value provenance while building statements.
//! 4. **Structural recovery** ([`decompile::simplify`],
//!    [`decompile::loops`]) - constant folding, idiom rewrites, and
//!    while/if/switch recovery from label-oriented control flow.
//! 5. **Emission** ([`decompile::codegen`]) - pseudocode plus a
//!    line→source-offset mapping.
//!
//! Everything is a pure function over the input bytes: no I/O during
//! analysis, no internal synchronization. A [`Workspace`] holds parsed
//! modules and their annotation sidecars per path; callers serialise
//! access to it, while a built [`ResolvedModule`] may be shared freely by
//! readers.

pub mod annotations;
pub mod decompile;
pub mod wasm;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use annotations::Annotations;
pub use decompile::{CallGraph, DecompileResult, ModuleErrors};
pub use wasm::{Module, ParseError, ResolvedModule};

/// Parse a module file into its section-level form.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Module> {
    wasm::parse_file(path)
}

/// Parse a byte buffer into its section-level form.
pub fn parse(bytes: &[u8]) -> Result<Module, ParseError> {
    wasm::parse(bytes)
}

/// Resolve a parsed module into the unified view used by all analyses.
pub fn resolve(module: &Module) -> Result<ResolvedModule, ParseError> {
    wasm::resolve(module)
}

/// Parse and resolve in one step.
pub fn load(path: impl AsRef<Path>) -> Result<ResolvedModule> {
    let path = path.as_ref();
    let module = parse_file(path)?;
    wasm::resolve(&module).with_context(|| format!("failed to resolve {}", path.display()))
}

/// Render one function as an offset-annotated instruction listing.
pub fn disassemble_function(
    module: &ResolvedModule,
    index: u32,
    indented: bool,
    annotations: Option<&Annotations>,
) -> Result<String> {
    let function = module
        .function(index)
        .with_context(|| format!("no function with index {index}"))?;
    Ok(wasm::wat::disassemble_function(function, indented, annotations))
}

/// Decompile one defined function to pseudocode plus its line mapping.
pub fn decompile(module: &ResolvedModule, index: u32) -> Result<DecompileResult> {
    decompile::decompile_function(module, index)
}

/// Gather the analysis errors of every defined function.
pub fn collect_errors(module: &ResolvedModule) -> ModuleErrors {
    decompile::collect_errors(module)
}

/// Build the static call graph.
pub fn build_call_graph(module: &ResolvedModule) -> CallGraph {
    CallGraph::build(module)
}

/// Open modules and their annotation sidecars, keyed by path.
///
/// Not internally synchronized: concurrent callers are expected to
/// serialise access themselves.
#[derive(Default)]
pub struct Workspace {
    modules: HashMap<PathBuf, ResolvedModule>,
    annotations: HashMap<PathBuf, Annotations>,
}

impl Workspace {
    pub fn new() -> Workspace {
        Workspace::default()
    }

    /// Parse, resolve, and cache a module, loading its sidecar alongside.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<&ResolvedModule> {
        let path = path.as_ref();
        let resolved = load(path)?;
        self.annotations
            .insert(path.to_path_buf(), annotations::load(path));
        self.modules.insert(path.to_path_buf(), resolved);
        Ok(&self.modules[path])
    }

    pub fn module(&self, path: impl AsRef<Path>) -> Option<&ResolvedModule> {
        self.modules.get(path.as_ref())
    }

    pub fn annotations(&self, path: impl AsRef<Path>) -> Option<&Annotations> {
        self.annotations.get(path.as_ref())
    }

    pub fn annotations_mut(&mut self, path: impl AsRef<Path>) -> &mut Annotations {
        self.annotations
            .entry(path.as_ref().to_path_buf())
            .or_default()
    }

    /// Persist a module's annotations next to it.
    pub fn save_annotations(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let Some(annotations) = self.annotations.get(path) else {
            return Ok(());
        };
        annotations::save(path, annotations)
    }

    pub fn close(&mut self, path: impl AsRef<Path>) {
        self.modules.remove(path.as_ref());
        self.annotations.remove(path.as_ref());
    }
}
