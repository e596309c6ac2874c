//! End-to-end decompilation scenarios over literal module bytes.

mod common;

use common::{body, export_func, func_type, module, vec_of};
use wasmspy::decompile::{
    build_statements, collapse_switch_blocks, recover_if_else, recover_loops, simplify,
    StmtKind,
};
use wasmspy::ResolvedModule;

fn resolve(bytes: &[u8]) -> ResolvedModule {
    wasmspy::resolve(&wasmspy::parse(bytes).unwrap()).unwrap()
}

fn single_function(params: &[u8], results: &[u8], code: &[u8]) -> ResolvedModule {
    resolve(&module(&[
        (1, vec_of(&[func_type(params, results)])),
        (3, vec_of(&[vec![0x00]])),
        (10, vec_of(&[body(&[], code)])),
    ]))
}

#[test]
fn add_decompiles_to_return_sum() {
    let rm = resolve(&module(&[
        (1, vec_of(&[func_type(&[0x7F, 0x7F], &[0x7F])])),
        (3, vec_of(&[vec![0x00]])),
        (7, vec_of(&[export_func("add", 0)])),
        (
            10,
            vec_of(&[body(&[], &[0x20, 0x00, 0x20, 0x01, 0x6A, 0x0B])]),
        ),
    ]));

    let result = wasmspy::decompile(&rm, 0).unwrap();
    assert!(result.code.contains("func add(i32 p0, i32 p1) -> i32 {"));
    assert!(result.code.contains("return (p0 + p1)"));
}

#[test]
fn zero_minus_param_simplifies_to_neg() {
    // i32.const 0; local.get 0; i32.sub; end
    let rm = single_function(&[0x7F], &[0x7F], &[0x41, 0x00, 0x20, 0x00, 0x6B, 0x0B]);
    let result = wasmspy::decompile(&rm, 0).unwrap();
    assert!(result.code.contains("return -p0"), "code:\n{}", result.code);
}

#[test]
fn eqz_renders_as_not() {
    let rm = single_function(&[0x7F], &[0x7F], &[0x20, 0x00, 0x45, 0x0B]);
    let result = wasmspy::decompile(&rm, 0).unwrap();
    assert!(result.code.contains("return !(p0)"), "code:\n{}", result.code);
}

#[test]
fn canonical_loop_recovers_as_while() {
    // block { loop { br_if 1 p0; p0 = p0 - 1; br 0 } }
    let code = [
        0x02, 0x40, // block void
        0x03, 0x40, // loop void
        0x20, 0x00, // local.get 0
        0x0D, 0x01, // br_if 1  (escape the block)
        0x20, 0x00, 0x41, 0x01, 0x6B, 0x21, 0x00, // p0 = p0 - 1
        0x0C, 0x00, // br 0     (back-edge)
        0x0B, // end loop
        0x0B, // end block
        0x0B, // end function
    ];
    let rm = single_function(&[0x7F], &[], &code);
    let result = wasmspy::decompile(&rm, 0).unwrap();

    // The escape fires on p0, so the loop runs while !(p0); the body
    // keeps the decrement and the back-edge is consumed.
    assert!(result.code.contains("while !(p0) {"), "code:\n{}", result.code);
    assert!(result.code.contains("p0 = (p0 - 1)"), "code:\n{}", result.code);
    assert!(!result.code.contains("block"), "code:\n{}", result.code);
    assert!(!result.code.contains("loop"), "code:\n{}", result.code);
}

#[test]
fn loop_internal_branches_become_continue_and_break() {
    // block L1 { loop L2 { br_if L1 p0; p0 = p0 - 1; br_if L2 p0;
    // br L1; br L2 } }
    let code = [
        0x02, 0x40, // block
        0x03, 0x40, // loop
        0x20, 0x00, 0x0D, 0x01, // br_if 1 (escape)
        0x20, 0x00, 0x41, 0x01, 0x6B, 0x21, 0x00, // p0 = p0 - 1
        0x20, 0x00, 0x0D, 0x00, // br_if 0 (conditional continue)
        0x0C, 0x01, // br 1 (break out)
        0x0C, 0x00, // br 0 (back-edge)
        0x0B, 0x0B, 0x0B,
    ];
    let rm = single_function(&[0x7F], &[], &code);
    let result = wasmspy::decompile(&rm, 0).unwrap();

    assert!(result.code.contains("while !(p0) {"), "code:\n{}", result.code);
    assert!(result.code.contains("continue"), "code:\n{}", result.code);
    assert!(result.code.contains("break L0"), "code:\n{}", result.code);
}

#[test]
fn forward_jump_block_recovers_as_if() {
    // block { br_if 0 p0; p1 = 7 }
    let code = [
        0x02, 0x40, // block
        0x20, 0x00, 0x0D, 0x00, // br_if 0 p0
        0x41, 0x07, 0x21, 0x01, // p1 = 7
        0x0B, 0x0B,
    ];
    let rm = single_function(&[0x7F, 0x7F], &[], &code);
    let result = wasmspy::decompile(&rm, 0).unwrap();

    assert!(result.code.contains("if !(p0) {"), "code:\n{}", result.code);
    assert!(!result.code.contains("block"), "code:\n{}", result.code);
}

#[test]
fn br_table_staircase_collapses_to_flat_switch() {
    // Three case blocks plus an outer default target; each case body
    // drops a distinct constant and breaks to the outer block.
    let code = [
        0x02, 0x40, // block L1 (outer)
        0x02, 0x40, // block L2
        0x02, 0x40, // block L3
        0x02, 0x40, // block L4
        0x20, 0x00, // local.get 0
        0x0E, 0x03, 0x02, 0x01, 0x00, 0x03, // br_table [2,1,0] default 3
        0x0B, // end L4
        0x41, 0x0A, 0x1A, // _ = 10
        0x0C, 0x02, // br L1
        0x0B, // end L3
        0x41, 0x14, 0x1A, // _ = 20
        0x0C, 0x01, // br L1
        0x0B, // end L2
        0x41, 0x1E, 0x1A, // _ = 30
        0x0B, // end L1
        0x0B, // end function
    ];
    let rm = single_function(&[0x7F], &[], &code);

    let function = rm.function(0).unwrap();
    let mut tree = build_statements(&rm, function);
    simplify::simplify_body(&mut tree);
    recover_loops(&mut tree);
    recover_if_else(&mut tree);
    collapse_switch_blocks(&mut tree);

    let StmtKind::FlatSwitch {
        cases, default, ..
    } = &tree.stmts[0].kind
    else {
        panic!("expected flat switch, got {:?}", tree.stmts[0].kind);
    };
    assert_eq!(cases.len(), 3);
    for case in cases {
        // The trailing break to the outer block is stripped; only the
        // drop remains.
        assert_eq!(case.body.len(), 1, "case {}: {:?}", case.value, case.body);
        assert!(matches!(case.body[0].kind, StmtKind::Drop(_)));
    }
    assert!(default.is_empty());

    let result = wasmspy::decompile(&rm, 0).unwrap();
    assert!(result.code.contains("switch p0 {"), "code:\n{}", result.code);
    assert!(result.code.contains("case 0:"), "code:\n{}", result.code);
    assert!(result.code.contains("case 2:"), "code:\n{}", result.code);
}

#[test]
fn every_nonblank_line_maps_to_an_offset() {
    let cases: Vec<ResolvedModule> = vec![
        single_function(&[0x7F, 0x7F], &[0x7F], &[0x20, 0x00, 0x20, 0x01, 0x6A, 0x0B]),
        single_function(
            &[0x7F],
            &[],
            &[
                0x02, 0x40, 0x03, 0x40, 0x20, 0x00, 0x0D, 0x01, 0x20, 0x00, 0x41, 0x01, 0x6B,
                0x21, 0x00, 0x0C, 0x00, 0x0B, 0x0B, 0x0B,
            ],
        ),
        single_function(
            &[0x7F],
            &[0x7F],
            &[
                0x20, 0x00, 0x04, 0x7F, 0x41, 0x01, 0x05, 0x41, 0x02, 0x0B, 0x0B,
            ],
        ),
    ];

    for rm in &cases {
        let result = wasmspy::decompile(rm, 0).unwrap();
        let mapped: std::collections::HashSet<usize> =
            result.mappings.iter().map(|m| m.line).collect();
        for (i, line) in result.code.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            assert!(
                mapped.contains(&(i + 1)),
                "line {} unmapped: {line:?}\ncode:\n{}",
                i + 1,
                result.code
            );
        }
        for mapping in &result.mappings {
            assert!(!mapping.offsets.is_empty());
        }
    }
}

#[test]
fn simplifier_is_a_fixpoint_after_recovery() {
    let rm = single_function(
        &[0x7F],
        &[],
        &[
            0x02, 0x40, 0x03, 0x40, 0x20, 0x00, 0x0D, 0x01, 0x20, 0x00, 0x41, 0x01, 0x6B, 0x21,
            0x00, 0x0C, 0x00, 0x0B, 0x0B, 0x0B,
        ],
    );
    let function = rm.function(0).unwrap();

    let mut tree = build_statements(&rm, function);
    simplify::simplify_body(&mut tree);
    recover_loops(&mut tree);
    recover_if_else(&mut tree);
    collapse_switch_blocks(&mut tree);

    let once = tree.stmts.clone();
    simplify::simplify_body(&mut tree);
    assert_eq!(tree.stmts, once);
}

#[test]
fn if_with_value_becomes_ternary() {
    // local.get 0; if (result i32) { 1 } else { 2 }; end
    let rm = single_function(
        &[0x7F],
        &[0x7F],
        &[0x20, 0x00, 0x04, 0x7F, 0x41, 0x01, 0x05, 0x41, 0x02, 0x0B, 0x0B],
    );
    let result = wasmspy::decompile(&rm, 0).unwrap();
    assert!(
        result.code.contains("return (p0 ? 1 : 2)"),
        "code:\n{}",
        result.code
    );
}

#[test]
fn reachable_underflow_still_emits_a_full_body() {
    // () -> i32: bare i32.add; end.
    let rm = single_function(&[], &[0x7F], &[0x6A, 0x0B]);

    let errors = wasmspy::collect_errors(&rm);
    assert!(errors.total_errors >= 1);
    assert_eq!(errors.functions.len(), 1);

    let result = wasmspy::decompile(&rm, 0).unwrap();
    assert!(result.code.contains("/* ERROR at 0x"), "code:\n{}", result.code);
    assert!(result.code.starts_with("func "));
    assert!(result.code.ends_with("}\n"));
}

#[test]
fn call_graph_over_module() {
    // main (exported) calls helper; helper calls imported env.log.
    let bytes = module(&[
        (
            1,
            vec_of(&[func_type(&[0x7F], &[]), func_type(&[], &[])]),
        ),
        (2, vec_of(&[common::import_func("env", "log", 0)])),
        (3, vec_of(&[vec![0x01], vec![0x01]])),
        (7, vec_of(&[export_func("main", 1)])),
        (
            10,
            vec_of(&[
                body(&[], &[0x10, 0x02, 0x0B]),
                body(&[], &[0x41, 0x05, 0x10, 0x00, 0x0B]),
            ]),
        ),
    ]);
    let rm = resolve(&bytes);

    let graph = wasmspy::build_call_graph(&rm);
    assert_eq!(graph.callees.get(&1), Some(&vec![2]));
    assert_eq!(graph.callers.get(&0), Some(&vec![2]));
    assert_eq!(graph.roots(&rm), vec![1]);

    let rendered = graph.render(&rm);
    assert!(rendered.contains("main -> func_2"));
    assert!(rendered.contains("env.log"));
}

#[test]
fn call_statement_renders_with_arguments() {
    // main calls env.log(42).
    let bytes = module(&[
        (1, vec_of(&[func_type(&[0x7F], &[]), func_type(&[], &[])])),
        (2, vec_of(&[common::import_func("env", "log", 0)])),
        (3, vec_of(&[vec![0x01]])),
        (10, vec_of(&[body(&[], &[0x41, 0x2A, 0x10, 0x00, 0x0B])])),
    ]);
    let rm = resolve(&bytes);
    let result = wasmspy::decompile(&rm, 1).unwrap();
    assert!(result.code.contains("env.log(42)"), "code:\n{}", result.code);
}
