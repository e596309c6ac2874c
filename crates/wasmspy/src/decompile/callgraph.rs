//! Static call graph over the resolved function table.

use std::collections::HashMap;
use std::fmt::Write;

use crate::wasm::resolve::ResolvedModule;
use crate::wasm::Opcode;

/// Bidirectional adjacency over function indices, built from direct
/// `call` instructions. Indirect calls have no static callee and are not
/// edges.
#[derive(Debug, Default)]
pub struct CallGraph {
    pub callers: HashMap<u32, Vec<u32>>,
    pub callees: HashMap<u32, Vec<u32>>,
}

impl CallGraph {
    pub fn build(module: &ResolvedModule) -> CallGraph {
        let mut graph = CallGraph::default();
        for function in &module.functions {
            let Some(body) = &function.body else { continue };
            for instr in &body.instructions {
                if instr.opcode == Opcode::CALL {
                    graph.add_edge(function.index, instr.immediate_u32(0));
                }
            }
        }
        graph
    }

    fn add_edge(&mut self, caller: u32, callee: u32) {
        let callees = self.callees.entry(caller).or_default();
        if callees.contains(&callee) {
            return;
        }
        callees.push(callee);
        self.callers.entry(callee).or_default().push(caller);
    }

    /// Defined functions nobody calls: the module's entry points.
    pub fn roots(&self, module: &ResolvedModule) -> Vec<u32> {
        module
            .functions
            .iter()
            .filter(|f| !f.imported)
            .filter(|f| self.callers.get(&f.index).map_or(true, Vec::is_empty))
            .map(|f| f.index)
            .collect()
    }

    /// One `caller -> callee, callee` line per defined function with
    /// outgoing edges.
    pub fn render(&self, module: &ResolvedModule) -> String {
        let mut out = String::new();
        for function in &module.functions {
            if function.imported || function.body.is_none() {
                continue;
            }
            let Some(callees) = self.callees.get(&function.index) else {
                continue;
            };
            if callees.is_empty() {
                continue;
            }
            out.push_str(&function.name);
            out.push_str(" -> ");
            for (i, &callee) in callees.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                match module.function(callee) {
                    Some(f) if !f.name.is_empty() => out.push_str(&f.name),
                    _ => {
                        let _ = write!(out, "func_{callee}");
                    }
                }
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wasm::{parse, resolve};

    /// Two functions: `main` (exported) calls `helper`; helper calls the
    /// imported `env.log`.
    fn call_module() -> ResolvedModule {
        let mut bytes = b"\x00asm\x01\x00\x00\x00".to_vec();
        // Types: 0: () -> (), 1: (i32) -> ()
        bytes.extend_from_slice(&[0x01, 0x08, 0x02, 0x60, 0x00, 0x00, 0x60, 0x01, 0x7F, 0x00]);
        // Import env.log of type 1 -> function index 0.
        bytes.extend_from_slice(&[
            0x02, 0x0B, 0x01, 0x03, b'e', b'n', b'v', 0x03, b'l', b'o', b'g', 0x00, 0x01,
        ]);
        // Two defined functions of type 0: indices 1 (main) and 2 (helper).
        bytes.extend_from_slice(&[0x03, 0x03, 0x02, 0x00, 0x00]);
        // Export "main" = function 1.
        bytes.extend_from_slice(&[0x07, 0x08, 0x01, 0x04, b'm', b'a', b'i', b'n', 0x00, 0x01]);
        // Code: main = call 2; end.  helper = i32.const 5; call 0; end.
        bytes.extend_from_slice(&[
            0x0A, 0x0D, 0x02, 0x04, 0x00, 0x10, 0x02, 0x0B, 0x06, 0x00, 0x41, 0x05, 0x10, 0x00,
            0x0B,
        ]);
        resolve::resolve(&parse(&bytes).unwrap()).unwrap()
    }

    #[test]
    fn edges_are_bidirectional() {
        let rm = call_module();
        let graph = CallGraph::build(&rm);
        assert_eq!(graph.callees.get(&1), Some(&vec![2]));
        assert_eq!(graph.callers.get(&2), Some(&vec![1]));
        assert_eq!(graph.callers.get(&0), Some(&vec![2]));
    }

    #[test]
    fn roots_are_uncalled_defined_functions() {
        let rm = call_module();
        let graph = CallGraph::build(&rm);
        assert_eq!(graph.roots(&rm), vec![1]);
    }

    #[test]
    fn render_uses_display_names() {
        let rm = call_module();
        let graph = CallGraph::build(&rm);
        let text = graph.render(&rm);
        assert!(text.contains("main -> func_2"));
        assert!(text.contains("func_2 -> env.log"));
    }
}
