//! Expression and statement simplification.
//!
//! Rewrites are purely syntactic and idempotent: running the pass a second
//! time yields the same tree. Constant folding wraps to 32 bits when the
//! left operand is an i32.

use crate::wasm::{Opcode, ValType};

use super::ast::{Expr, FuncBody, Stmt, StmtKind, SwitchCase};
use super::value::Literal;

/// Simplify every statement and the return expression of a body in place.
pub fn simplify_body(body: &mut FuncBody) {
    let stmts = std::mem::take(&mut body.stmts);
    body.stmts = stmts.into_iter().map(simplify_stmt).collect();
    if let Some(ret) = body.ret.take() {
        body.ret = Some(simplify_expr(ret));
    }
}

pub fn simplify_expr(e: Expr) -> Expr {
    match e {
        Expr::Binary {
            op,
            left,
            right,
            ty,
        } => simplify_binary(op, *left, *right, ty),
        Expr::Unary { op, arg, ty } => simplify_unary(op, *arg, ty),
        Expr::Ternary {
            cond,
            then_result,
            else_result,
            ty,
        } => simplify_ternary(*cond, then_result, else_result, ty),
        Expr::Neg { arg, ty } => Expr::Neg {
            arg: Box::new(simplify_expr(*arg)),
            ty,
        },
        Expr::Not { arg } => {
            let arg = simplify_expr(*arg);
            match arg {
                // !!x is x.
                Expr::Not { arg: inner } => *inner,
                arg => Expr::Not { arg: Box::new(arg) },
            }
        }
        Expr::Call { target, args, ty } => Expr::Call {
            target,
            args: args.into_iter().map(simplify_expr).collect(),
            ty,
        },
        Expr::Load {
            op,
            addr,
            offset,
            ty,
        } => Expr::Load {
            op,
            addr: Box::new(simplify_expr(*addr)),
            offset,
            ty,
        },
        Expr::Intrinsic { op, args } => Expr::Intrinsic {
            op,
            args: args.into_iter().map(simplify_expr).collect(),
        },
        other => other,
    }
}

fn simplify_binary(op: Opcode, left: Expr, right: Expr, ty: ValType) -> Expr {
    let left = simplify_expr(left);
    let right = simplify_expr(right);

    let lconst = as_literal(&left);
    let rconst = as_literal(&right);

    if let (Some(l), Some(r)) = (lconst, rconst) {
        if let Some(folded) = fold_binary(op, l, r) {
            return folded;
        }
    }

    match op {
        Opcode::I32_SUB | Opcode::I64_SUB => {
            // 0 - x reads as a negation.
            if lconst.is_some_and(Literal::is_zero) {
                return Expr::Neg {
                    arg: Box::new(right),
                    ty,
                };
            }
            if rconst.is_some_and(Literal::is_zero) {
                return left;
            }
        }
        Opcode::I32_ADD | Opcode::I64_ADD => {
            if lconst.is_some_and(Literal::is_zero) {
                return right;
            }
            if rconst.is_some_and(Literal::is_zero) {
                return left;
            }
        }
        Opcode::I32_MUL | Opcode::I64_MUL => {
            if lconst.is_some_and(Literal::is_zero) {
                return left;
            }
            if rconst.is_some_and(Literal::is_zero) {
                return right;
            }
            if lconst.is_some_and(Literal::is_one) {
                return right;
            }
            if rconst.is_some_and(Literal::is_one) {
                return left;
            }
        }
        Opcode::I32_DIV_S | Opcode::I32_DIV_U | Opcode::I64_DIV_S | Opcode::I64_DIV_U => {
            if rconst.is_some_and(Literal::is_one) {
                return left;
            }
        }
        Opcode::I32_AND | Opcode::I64_AND => {
            if lconst.is_some_and(Literal::is_zero) || rconst.is_some_and(Literal::is_zero) {
                return Expr::Const(Literal::zero(ty));
            }
        }
        Opcode::I32_OR | Opcode::I64_OR => {
            if lconst.is_some_and(Literal::is_zero) {
                return right;
            }
            if rconst.is_some_and(Literal::is_zero) {
                return left;
            }
        }
        Opcode::I32_SHL
        | Opcode::I32_SHR_S
        | Opcode::I32_SHR_U
        | Opcode::I64_SHL
        | Opcode::I64_SHR_S
        | Opcode::I64_SHR_U => {
            if rconst.is_some_and(Literal::is_zero) {
                return left;
            }
        }
        _ => {}
    }

    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        ty,
    }
}

fn simplify_unary(op: Opcode, arg: Expr, ty: ValType) -> Expr {
    let arg = simplify_expr(arg);

    if let Some(literal) = as_literal(&arg) {
        if op == Opcode::I32_EQZ || op == Opcode::I64_EQZ {
            let result = i32::from(literal.is_zero());
            return Expr::Const(Literal::I32(result));
        }
    }

    // !(−x) has the same truth value as !x.
    if let Expr::Neg { arg: inner, .. } = &arg {
        if op == Opcode::I32_EQZ || op == Opcode::I64_EQZ {
            return Expr::Unary {
                op,
                arg: inner.clone(),
                ty,
            };
        }
    }

    Expr::Unary {
        op,
        arg: Box::new(arg),
        ty,
    }
}

fn simplify_ternary(
    cond: Expr,
    then_result: Option<Box<Expr>>,
    else_result: Option<Box<Expr>>,
    ty: ValType,
) -> Expr {
    let cond = simplify_expr(cond);
    let then_result = then_result.map(|e| simplify_expr(*e));
    let else_result = else_result.map(|e| simplify_expr(*e));

    if let Some(literal) = as_literal(&cond) {
        let winner = if literal.is_zero() {
            else_result.clone()
        } else {
            then_result.clone()
        };
        if let Some(expr) = winner {
            return expr;
        }
    }

    Expr::Ternary {
        cond: Box::new(cond),
        then_result: then_result.map(Box::new),
        else_result: else_result.map(Box::new),
        ty,
    }
}

fn fold_binary(op: Opcode, left: Literal, right: Literal) -> Option<Expr> {
    let l = left.as_i64()?;
    let r = right.as_i64()?;

    let result = match op {
        Opcode::I32_ADD | Opcode::I64_ADD => l.wrapping_add(r),
        Opcode::I32_SUB | Opcode::I64_SUB => l.wrapping_sub(r),
        Opcode::I32_MUL | Opcode::I64_MUL => l.wrapping_mul(r),
        Opcode::I32_AND | Opcode::I64_AND => l & r,
        Opcode::I32_OR | Opcode::I64_OR => l | r,
        Opcode::I32_XOR | Opcode::I64_XOR => l ^ r,
        _ => return None,
    };

    let literal = if left.ty() == ValType::I32 {
        Literal::I32(result as i32)
    } else {
        Literal::I64(result)
    };
    Some(Expr::Const(literal))
}

fn as_literal(e: &Expr) -> Option<Literal> {
    match e {
        Expr::Const(literal) => Some(*literal),
        _ => None,
    }
}

pub fn simplify_stmt(stmt: Stmt) -> Stmt {
    let Stmt { kind, offsets } = stmt;
    let kind = match kind {
        StmtKind::Assign { target, value } => StmtKind::Assign {
            target,
            value: simplify_expr(value),
        },
        StmtKind::Store {
            op,
            addr,
            value,
            offset,
        } => StmtKind::Store {
            op,
            addr: simplify_expr(addr),
            value: simplify_expr(value),
            offset,
        },
        StmtKind::Call(call) => StmtKind::Call(simplify_expr(call)),
        StmtKind::Return(value) => StmtKind::Return(value.map(simplify_expr)),
        StmtKind::Drop(value) => StmtKind::Drop(simplify_expr(value)),
        StmtKind::If {
            cond,
            then_body,
            else_body,
        } => {
            let cond = simplify_expr(cond);
            let then_body: Vec<Stmt> = then_body.into_iter().map(simplify_stmt).collect();
            let else_body: Vec<Stmt> = else_body.into_iter().map(simplify_stmt).collect();
            // A jump-over-then shape reads better with the test flipped.
            if then_body.is_empty() && !else_body.is_empty() {
                StmtKind::If {
                    cond: negate_cond(cond),
                    then_body: else_body,
                    else_body: Vec::new(),
                }
            } else {
                StmtKind::If {
                    cond,
                    then_body,
                    else_body,
                }
            }
        }
        StmtKind::Loop { label, body } => StmtKind::Loop {
            label,
            body: body.into_iter().map(simplify_stmt).collect(),
        },
        StmtKind::Block { label, body } => StmtKind::Block {
            label,
            body: body.into_iter().map(simplify_stmt).collect(),
        },
        StmtKind::Break { label, cond } => StmtKind::Break {
            label,
            cond: cond.map(simplify_expr),
        },
        StmtKind::Switch {
            value,
            cases,
            default,
        } => StmtKind::Switch {
            value: simplify_expr(value),
            cases,
            default,
        },
        StmtKind::FlatSwitch {
            value,
            cases,
            default,
        } => StmtKind::FlatSwitch {
            value: simplify_expr(value),
            cases: cases
                .into_iter()
                .map(|c| SwitchCase {
                    value: c.value,
                    body: c.body.into_iter().map(simplify_stmt).collect(),
                })
                .collect(),
            default: default.into_iter().map(simplify_stmt).collect(),
        },
        StmtKind::While { cond, body } => StmtKind::While {
            cond: simplify_expr(cond),
            body: body.into_iter().map(simplify_stmt).collect(),
        },
        other @ (StmtKind::Continue | StmtKind::Error { .. }) => other,
    };
    Stmt { kind, offsets }
}

/// Syntactic negation: invert relational operators, strip `eqz`, unwrap a
/// `Not`, and otherwise wrap in `Not`.
pub fn negate_cond(e: Expr) -> Expr {
    match e {
        Expr::Not { arg } => *arg,
        Expr::Unary { op, arg, .. } if op == Opcode::I32_EQZ || op == Opcode::I64_EQZ => *arg,
        Expr::Binary {
            op,
            left,
            right,
            ty,
        } => match inverse_relation(op) {
            Some(op) => Expr::Binary {
                op,
                left,
                right,
                ty,
            },
            None => Expr::Not {
                arg: Box::new(Expr::Binary {
                    op,
                    left,
                    right,
                    ty,
                }),
            },
        },
        other => Expr::Not {
            arg: Box::new(other),
        },
    }
}

fn inverse_relation(op: Opcode) -> Option<Opcode> {
    let inv = match op {
        Opcode::I32_EQ => Opcode::I32_NE,
        Opcode::I32_NE => Opcode::I32_EQ,
        Opcode::I32_LT_S => Opcode::I32_GE_S,
        Opcode::I32_GT_S => Opcode::I32_LE_S,
        Opcode::I32_LE_S => Opcode::I32_GT_S,
        Opcode::I32_GE_S => Opcode::I32_LT_S,
        Opcode::I32_LT_U => Opcode::I32_GE_U,
        Opcode::I32_GT_U => Opcode::I32_LE_U,
        Opcode::I32_LE_U => Opcode::I32_GT_U,
        Opcode::I32_GE_U => Opcode::I32_LT_U,
        Opcode::I64_EQ => Opcode::I64_NE,
        Opcode::I64_NE => Opcode::I64_EQ,
        Opcode::I64_LT_S => Opcode::I64_GE_S,
        Opcode::I64_GT_S => Opcode::I64_LE_S,
        Opcode::I64_LE_S => Opcode::I64_GT_S,
        Opcode::I64_GE_S => Opcode::I64_LT_S,
        Opcode::I64_LT_U => Opcode::I64_GE_U,
        Opcode::I64_GT_U => Opcode::I64_LE_U,
        Opcode::I64_LE_U => Opcode::I64_GT_U,
        Opcode::I64_GE_U => Opcode::I64_LT_U,
        _ => return None,
    };
    Some(inv)
}
