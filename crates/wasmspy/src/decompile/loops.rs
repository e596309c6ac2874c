//! Structural recovery: turning label-oriented control flow back into
//! loops, conditionals, and switches.
//!
//! Three passes, run in this order after simplification:
//!
//! 1. [`recover_loops`] - `block L { loop M { br_if L !cond; …; br M } }`
//!    becomes `while cond { … }`, with branches to M rewritten as
//!    `continue` and branches to L as `break`.
//! 2. [`recover_if_else`] - `block L { br_if L cond; … }` (a conditional
//!    forward jump over the rest of the block) becomes `if !cond { … }`.
//! 3. [`collapse_switch_blocks`] - the `br_table`-over-nested-blocks
//!    staircase becomes one flat switch with inline case bodies.

use super::ast::{FuncBody, Stmt, StmtKind, SwitchCase};
use super::simplify::negate_cond;

pub fn recover_loops(body: &mut FuncBody) {
    let stmts = std::mem::take(&mut body.stmts);
    body.stmts = recover_loops_in(stmts);
}

fn recover_loops_in(stmts: Vec<Stmt>) -> Vec<Stmt> {
    stmts.into_iter().map(recover_loops_in_stmt).collect()
}

fn recover_loops_in_stmt(stmt: Stmt) -> Stmt {
    let Stmt { kind, offsets } = stmt;
    let kind = match kind {
        StmtKind::Block { label, body } => match try_convert_to_while(label, body) {
            Ok(while_kind) => while_kind,
            Err(body) => StmtKind::Block {
                label,
                body: recover_loops_in(body),
            },
        },
        StmtKind::Loop { label, body } => StmtKind::Loop {
            label,
            body: recover_loops_in(body),
        },
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => StmtKind::If {
            cond,
            then_body: recover_loops_in(then_body),
            else_body: recover_loops_in(else_body),
        },
        StmtKind::While { cond, body } => StmtKind::While {
            cond,
            body: recover_loops_in(body),
        },
        StmtKind::FlatSwitch {
            value,
            cases,
            default,
        } => StmtKind::FlatSwitch {
            value,
            cases: cases
                .into_iter()
                .map(|c| SwitchCase {
                    value: c.value,
                    body: recover_loops_in(c.body),
                })
                .collect(),
            default: recover_loops_in(default),
        },
        other => other,
    };
    Stmt { kind, offsets }
}

/// The canonical compiled-while shape is a block whose only child is a
/// loop that opens with a conditional escape to the block and closes with
/// an unconditional back-edge to itself.
fn try_convert_to_while(block_label: u32, mut body: Vec<Stmt>) -> Result<StmtKind, Vec<Stmt>> {
    if body.len() != 1 || !matches!(body[0].kind, StmtKind::Loop { .. }) {
        return Err(body);
    }
    let StmtKind::Loop {
        label: loop_label,
        body: loop_body,
    } = body[0].kind.clone()
    else {
        return Err(body);
    };

    if loop_body.len() < 2 {
        return Err(body);
    }
    let escapes = matches!(
        &loop_body[0].kind,
        StmtKind::Break { label, cond: Some(_) } if *label == block_label
    );
    let back_edge = matches!(
        &loop_body[loop_body.len() - 1].kind,
        StmtKind::Break { label, cond: None } if *label == loop_label
    );
    if !escapes || !back_edge {
        return Err(body);
    }

    let mut loop_body = loop_body;
    loop_body.pop();
    let first = loop_body.remove(0);
    let StmtKind::Break {
        cond: Some(cond), ..
    } = first.kind
    else {
        return Err(body);
    };

    let inner = recover_loops_in(loop_body);
    let inner = convert_breaks(inner, loop_label, block_label);
    body.clear();

    Ok(StmtKind::While {
        cond: negate_cond(cond),
        body: inner,
    })
}

/// Rewrite branch targets inside a recovered while body: the loop's own
/// label means continue, the enclosing block's label means break.
fn convert_breaks(stmts: Vec<Stmt>, loop_label: u32, block_label: u32) -> Vec<Stmt> {
    stmts
        .into_iter()
        .map(|s| convert_break_in_stmt(s, loop_label, block_label))
        .collect()
}

fn convert_break_in_stmt(stmt: Stmt, loop_label: u32, block_label: u32) -> Stmt {
    let Stmt { kind, offsets } = stmt;
    let kind = match kind {
        StmtKind::Break { label, cond } if label == loop_label => match cond {
            Some(cond) => StmtKind::If {
                cond,
                then_body: vec![Stmt::new(StmtKind::Continue, offsets.clone())],
                else_body: Vec::new(),
            },
            None => StmtKind::Continue,
        },
        StmtKind::Break { label, cond } if label == block_label => match cond {
            Some(cond) => StmtKind::If {
                cond,
                then_body: vec![Stmt::new(
                    StmtKind::Break {
                        label: 0,
                        cond: None,
                    },
                    offsets.clone(),
                )],
                else_body: Vec::new(),
            },
            None => StmtKind::Break {
                label: 0,
                cond: None,
            },
        },
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => StmtKind::If {
            cond,
            then_body: convert_breaks(then_body, loop_label, block_label),
            else_body: convert_breaks(else_body, loop_label, block_label),
        },
        StmtKind::Loop { label, body } => StmtKind::Loop {
            label,
            body: convert_breaks(body, loop_label, block_label),
        },
        StmtKind::Block { label, body } => StmtKind::Block {
            label,
            body: convert_breaks(body, loop_label, block_label),
        },
        StmtKind::While { cond, body } => StmtKind::While {
            cond,
            body: convert_breaks(body, loop_label, block_label),
        },
        other => other,
    };
    Stmt { kind, offsets }
}

pub fn recover_if_else(body: &mut FuncBody) {
    let stmts = std::mem::take(&mut body.stmts);
    body.stmts = recover_if_else_in(stmts);
}

fn recover_if_else_in(stmts: Vec<Stmt>) -> Vec<Stmt> {
    stmts.into_iter().map(recover_if_else_in_stmt).collect()
}

fn recover_if_else_in_stmt(stmt: Stmt) -> Stmt {
    let Stmt { kind, offsets } = stmt;
    let kind = match kind {
        StmtKind::Block { label, body } => match try_convert_block_to_if(label, body) {
            Ok(if_kind) => if_kind,
            Err(body) => StmtKind::Block {
                label,
                body: recover_if_else_in(body),
            },
        },
        StmtKind::Loop { label, body } => StmtKind::Loop {
            label,
            body: recover_if_else_in(body),
        },
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => StmtKind::If {
            cond,
            then_body: recover_if_else_in(then_body),
            else_body: recover_if_else_in(else_body),
        },
        StmtKind::While { cond, body } => StmtKind::While {
            cond,
            body: recover_if_else_in(body),
        },
        StmtKind::FlatSwitch {
            value,
            cases,
            default,
        } => StmtKind::FlatSwitch {
            value,
            cases: cases
                .into_iter()
                .map(|c| SwitchCase {
                    value: c.value,
                    body: recover_if_else_in(c.body),
                })
                .collect(),
            default: recover_if_else_in(default),
        },
        other => other,
    };
    Stmt { kind, offsets }
}

/// A block that opens with a conditional break to its own end is the
/// compiler's "if" pattern: skip the rest when the condition holds.
fn try_convert_block_to_if(block_label: u32, mut body: Vec<Stmt>) -> Result<StmtKind, Vec<Stmt>> {
    if body.len() < 2 {
        return Err(body);
    }
    let leading = matches!(
        &body[0].kind,
        StmtKind::Break { label, cond: Some(_) } if *label == block_label
    );
    if !leading {
        return Err(body);
    }

    let first = body.remove(0);
    let StmtKind::Break {
        cond: Some(cond), ..
    } = first.kind
    else {
        body.insert(0, first);
        return Err(body);
    };

    Ok(StmtKind::If {
        cond: negate_cond(cond),
        then_body: recover_if_else_in(body),
        else_body: Vec::new(),
    })
}

pub fn collapse_switch_blocks(body: &mut FuncBody) {
    let stmts = std::mem::take(&mut body.stmts);
    body.stmts = collapse_in(stmts);
}

fn collapse_in(stmts: Vec<Stmt>) -> Vec<Stmt> {
    stmts.into_iter().map(collapse_in_stmt).collect()
}

fn collapse_in_stmt(stmt: Stmt) -> Stmt {
    let Stmt { kind, offsets } = stmt;
    let (kind, offsets) = match kind {
        StmtKind::Block { label, body } => match try_collapse_switch(label, body) {
            Ok((flat, switch_offsets)) => (flat, switch_offsets),
            Err(body) => (
                StmtKind::Block {
                    label,
                    body: collapse_in(body),
                },
                offsets,
            ),
        },
        StmtKind::Loop { label, body } => (
            StmtKind::Loop {
                label,
                body: collapse_in(body),
            },
            offsets,
        ),
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => (
            StmtKind::If {
                cond,
                then_body: collapse_in(then_body),
                else_body: collapse_in(else_body),
            },
            offsets,
        ),
        StmtKind::While { cond, body } => (
            StmtKind::While {
                cond,
                body: collapse_in(body),
            },
            offsets,
        ),
        StmtKind::FlatSwitch {
            value,
            cases,
            default,
        } => (
            StmtKind::FlatSwitch {
                value,
                cases: cases
                    .into_iter()
                    .map(|c| SwitchCase {
                        value: c.value,
                        body: collapse_in(c.body),
                    })
                    .collect(),
                default: collapse_in(default),
            },
            offsets,
        ),
        other => (other, offsets),
    };
    Stmt { kind, offsets }
}

/// Walk the staircase of nested blocks under `outer`. Each level's case
/// body is the code that follows the next-inner block; the innermost level
/// must end in a raw `Switch` whose labels all point at staircase blocks.
fn try_collapse_switch(
    outer_label: u32,
    outer_body: Vec<Stmt>,
) -> Result<(StmtKind, Vec<u64>), Vec<Stmt>> {
    // Staircase labels outermost-first, and the statements following each
    // block inside its parent.
    let mut labels = vec![outer_label];
    let mut tails: Vec<Vec<Stmt>> = vec![Vec::new()];
    let mut current = outer_body.clone();

    loop {
        let Some(first) = current.first() else { break };
        let StmtKind::Block { label, body } = &first.kind else {
            break;
        };
        labels.push(*label);
        tails.push(current[1..].to_vec());
        current = body.clone();
    }

    if labels.len() < 2 {
        return Err(outer_body);
    }

    let Some(switch) = current.iter().find_map(|s| match &s.kind {
        StmtKind::Switch {
            value,
            cases,
            default,
        } => Some((value.clone(), cases.clone(), *default, s.offsets.clone())),
        _ => None,
    }) else {
        return Err(outer_body);
    };
    let (value, case_labels, default_label, switch_offsets) = switch;

    let position_of = |label: u32| labels.iter().position(|&l| l == label);

    let mut cases = Vec::with_capacity(case_labels.len());
    for (i, &label) in case_labels.iter().enumerate() {
        let Some(pos) = position_of(label) else {
            return Err(outer_body);
        };
        cases.push(SwitchCase {
            value: i,
            body: extract_case_body(&tails[pos], outer_label),
        });
    }

    let default = match position_of(default_label) {
        Some(pos) => extract_case_body(&tails[pos], outer_label),
        None => Vec::new(),
    };

    Ok((
        StmtKind::FlatSwitch {
            value,
            cases,
            default,
        },
        switch_offsets,
    ))
}

/// A case body is the staircase tail with its terminal fall-through break
/// to the outermost block removed.
fn extract_case_body(stmts: &[Stmt], outer_label: u32) -> Vec<Stmt> {
    stmts
        .iter()
        .filter(|s| {
            !matches!(
                &s.kind,
                StmtKind::Break { label, cond: None } if *label == outer_label
            )
        })
        .cloned()
        .map(collapse_in_stmt)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::ast::Expr;
    use super::super::value::Literal;
    use super::*;
    use crate::wasm::{Opcode, ValType};

    fn param(index: u32) -> Expr {
        Expr::Param {
            index,
            ty: ValType::I32,
        }
    }

    fn stmt(kind: StmtKind) -> Stmt {
        Stmt::new(kind, vec![0])
    }

    fn drop_marker(v: i32) -> Stmt {
        stmt(StmtKind::Drop(Expr::Const(Literal::I32(v))))
    }

    fn body_of(stmts: Vec<Stmt>) -> FuncBody {
        FuncBody {
            stmts,
            ..FuncBody::default()
        }
    }

    #[test]
    fn while_recovery() {
        // block L1 { loop L2 { br_if L1 (p0 == 0); body; br_if L2 c;
        // br L1; br L2 } } - the trailing br L2 is the back-edge.
        let cond = Expr::Binary {
            op: Opcode::I32_EQ,
            left: Box::new(param(0)),
            right: Box::new(Expr::Const(Literal::I32(0))),
            ty: ValType::I32,
        };
        let loop_body = vec![
            stmt(StmtKind::Break {
                label: 1,
                cond: Some(cond),
            }),
            drop_marker(1),
            stmt(StmtKind::Break {
                label: 2,
                cond: Some(param(1)),
            }),
            stmt(StmtKind::Break {
                label: 1,
                cond: None,
            }),
            stmt(StmtKind::Break {
                label: 2,
                cond: None,
            }),
        ];
        // After conversion the body is: drop; if c { continue }; break L0.
        let mut body = body_of(vec![stmt(StmtKind::Block {
            label: 1,
            body: vec![stmt(StmtKind::Loop {
                label: 2,
                body: loop_body,
            })],
        })]);

        recover_loops(&mut body);

        let StmtKind::While { cond, body } = &body.stmts[0].kind else {
            panic!("expected while, got {:?}", body.stmts[0].kind);
        };
        // The escape condition is negated: p0 == 0 guards the exit, so the
        // loop runs while p0 != 0.
        match cond {
            Expr::Binary { op, .. } => assert_eq!(*op, Opcode::I32_NE),
            other => panic!("expected relation, got {other:?}"),
        }
        assert!(matches!(body[0].kind, StmtKind::Drop(_)));
        // br_if L2 -> if c { continue }
        let StmtKind::If { then_body, .. } = &body[1].kind else {
            panic!("expected if-continue, got {:?}", body[1].kind);
        };
        assert!(matches!(then_body[0].kind, StmtKind::Continue));
        // br L1 -> break L0
        assert!(matches!(
            body[2].kind,
            StmtKind::Break { label: 0, cond: None }
        ));
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn if_recovery() {
        // block L1 { br_if L1 (p0); body } -> if !(p0) { body }
        let mut body = body_of(vec![stmt(StmtKind::Block {
            label: 1,
            body: vec![
                stmt(StmtKind::Break {
                    label: 1,
                    cond: Some(param(0)),
                }),
                drop_marker(1),
            ],
        })]);

        recover_if_else(&mut body);

        let StmtKind::If {
            cond,
            then_body,
            else_body,
        } = &body.stmts[0].kind
        else {
            panic!("expected if, got {:?}", body.stmts[0].kind);
        };
        assert_eq!(
            *cond,
            Expr::Not {
                arg: Box::new(param(0))
            }
        );
        assert!(matches!(then_body[0].kind, StmtKind::Drop(_)));
        assert!(else_body.is_empty());
    }

    #[test]
    fn if_recovery_runs_after_loop_recovery() {
        // The loop idiom block must become a while, not an if, even though
        // running if-recovery first could misread a conditional break.
        let loop_body = vec![
            stmt(StmtKind::Break {
                label: 1,
                cond: Some(param(0)),
            }),
            drop_marker(1),
            stmt(StmtKind::Break {
                label: 2,
                cond: None,
            }),
        ];
        let mut body = body_of(vec![stmt(StmtKind::Block {
            label: 1,
            body: vec![stmt(StmtKind::Loop {
                label: 2,
                body: loop_body,
            })],
        })]);

        recover_loops(&mut body);
        recover_if_else(&mut body);

        assert!(matches!(body.stmts[0].kind, StmtKind::While { .. }));
    }

    #[test]
    fn switch_collapsing() {
        // block L1 { block L2 { block L3 { block L4 {
        //   switch p0 -> [L2, L3, L4] default L1 }
        //   case0; br L1 } case1; br L1 } case2 }
        //
        // Staircase case bodies follow each block inside its parent.
        let innermost = vec![stmt(StmtKind::Switch {
            value: param(0),
            cases: vec![2, 3, 4],
            default: 1,
        })];
        let l4 = stmt(StmtKind::Block {
            label: 4,
            body: innermost,
        });
        let l3 = stmt(StmtKind::Block {
            label: 3,
            body: vec![
                l4,
                drop_marker(2),
                stmt(StmtKind::Break {
                    label: 1,
                    cond: None,
                }),
            ],
        });
        let l2 = stmt(StmtKind::Block {
            label: 2,
            body: vec![
                l3,
                drop_marker(1),
                stmt(StmtKind::Break {
                    label: 1,
                    cond: None,
                }),
            ],
        });
        let l1 = stmt(StmtKind::Block {
            label: 1,
            body: vec![l2, drop_marker(0)],
        });
        let mut body = body_of(vec![l1]);

        collapse_switch_blocks(&mut body);

        let StmtKind::FlatSwitch {
            cases, default, ..
        } = &body.stmts[0].kind
        else {
            panic!("expected flat switch, got {:?}", body.stmts[0].kind);
        };
        assert_eq!(cases.len(), 3);
        // case 0 -> label 2: code after block 2 inside block 1, break
        // removed.
        assert_eq!(cases[0].value, 0);
        assert!(matches!(cases[0].body[0].kind, StmtKind::Drop(Expr::Const(Literal::I32(0)))));
        assert_eq!(cases[0].body.len(), 1);
        // case 1 -> label 3: drop(1), fall-through break stripped.
        assert!(matches!(cases[1].body[0].kind, StmtKind::Drop(Expr::Const(Literal::I32(1)))));
        assert_eq!(cases[1].body.len(), 1);
        // case 2 -> label 4: drop(2).
        assert!(matches!(cases[2].body[0].kind, StmtKind::Drop(Expr::Const(Literal::I32(2)))));
        // default -> label 1: nothing follows the outer block.
        assert!(default.is_empty());
    }
}
