//! fold-constants: compile-time evaluation of constant expressions.
//!
//! Children fold first. A folded expression is a new arena node and the
//! parent's child slot is rewritten to point at it; the original node stays
//! in the arena untouched. Folding an already folded tree changes nothing.
//!
//! # Scope
//!
//! - Integer, float and boolean arithmetic
//! - Comparisons
//! - String concatenation
//! - Unary negation and not
//! - Dead branch elimination (`if true`/`if false`)
//!
//! Division by zero and overflow are left for runtime.

use rustc_hash::FxHashMap;

use kiln_ir::{BinaryOp, ExprArena, ExprId, ExprKind, Literal, StringInterner, UnaryOp};
use kiln_types::member::MemberId;
use kiln_types::{ensure_sufficient_stack, Idx};

use super::Pipeline;
use crate::CompilationUnit;

pub(super) fn fold_member(pipeline: &Pipeline<'_>, unit: &mut CompilationUnit, member: MemberId) {
    let Some(body) = unit.members.get(member).body() else {
        return;
    };
    let mut folder = Folder {
        arena: &mut unit.arena,
        types: &mut unit.expr_types,
        interner: pipeline.interner,
        folded: 0,
    };
    let root = folder.fold(body);
    if folder.folded > 0 {
        tracing::trace!(folded = folder.folded, "folded constants");
    }
    if root != body {
        unit.members.get_mut(member).set_body(root);
    }
}

struct Folder<'a> {
    arena: &'a mut ExprArena,
    types: &'a mut FxHashMap<ExprId, Idx>,
    interner: &'a StringInterner,
    folded: usize,
}

impl Folder<'_> {
    /// Fold the tree under `id`; returns the id that should replace it.
    fn fold(&mut self, id: ExprId) -> ExprId {
        if !id.is_valid() {
            return id;
        }
        ensure_sufficient_stack(|| {
            self.fold_children(id);
            self.try_fold(id).unwrap_or(id)
        })
    }

    /// Rewrite each child slot of `id` with its folded replacement.
    fn fold_children(&mut self, id: ExprId) {
        let mut kind = self.arena.kind(id).clone();
        let mut changed = false;
        let mut slot = |this: &mut Self, child: &mut ExprId| {
            let folded = this.fold(*child);
            if folded != *child {
                *child = folded;
                changed = true;
            }
        };
        match &mut kind {
            ExprKind::Literal(_) | ExprKind::Ident(_) | ExprKind::This | ExprKind::Error => {}
            ExprKind::Field { receiver, .. } => slot(self, receiver),
            ExprKind::Call { receiver, args, .. } => {
                if let Some(receiver) = receiver {
                    slot(self, receiver);
                }
                for arg in args {
                    slot(self, arg);
                }
            }
            ExprKind::New { args, .. } | ExprKind::Block(args) => {
                for arg in args {
                    slot(self, arg);
                }
            }
            ExprKind::Binary { left, right, .. } => {
                slot(self, left);
                slot(self, right);
            }
            ExprKind::Unary { operand, .. } => slot(self, operand),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                slot(self, cond);
                slot(self, then_branch);
                slot(self, else_branch);
            }
            ExprKind::Match { scrutinee, arms } => {
                slot(self, scrutinee);
                for arm in arms {
                    slot(self, &mut arm.body);
                }
            }
            ExprKind::Let { init, .. } => slot(self, init),
        }
        if changed {
            self.arena.expr_mut(id).kind = kind;
        }
    }

    fn try_fold(&mut self, id: ExprId) -> Option<ExprId> {
        match *self.arena.kind(id) {
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => fold_if(self.arena, cond, then_branch, else_branch),
            ExprKind::Binary { op, left, right } => {
                let lhs = self.arena.literal(left)?;
                let rhs = self.arena.literal(right)?;
                let value = fold_binary(op, lhs, rhs, self.interner)?;
                Some(self.push(id, value))
            }
            ExprKind::Unary { op, operand } => {
                let value = fold_unary(op, self.arena.literal(operand)?)?;
                Some(self.push(id, value))
            }
            _ => None,
        }
    }

    /// A literal node replacing `original`, with the same span and type.
    fn push(&mut self, original: ExprId, value: Literal) -> ExprId {
        let span = self.arena.span(original);
        let folded = self.arena.alloc(ExprKind::Literal(value), span);
        if let Some(&ty) = self.types.get(&original) {
            self.types.insert(folded, ty);
        }
        self.folded += 1;
        folded
    }
}

/// Dead branch elimination: `if true { A } else { B }` is `A`.
fn fold_if(arena: &ExprArena, cond: ExprId, then_branch: ExprId, else_branch: ExprId) -> Option<ExprId> {
    match arena.literal(cond)? {
        Literal::Bool(true) => Some(then_branch),
        // `if false { A }` with no else has nothing to keep.
        Literal::Bool(false) if else_branch.is_valid() => Some(else_branch),
        _ => None,
    }
}

/// Evaluate a binary operation on two literals.
///
/// Returns `None` when the operation is not constant or would fail at
/// runtime (division by zero, integer overflow).
fn fold_binary(op: BinaryOp, left: Literal, right: Literal, interner: &StringInterner) -> Option<Literal> {
    use Literal::{Bool, Float, Int, Str};

    match (op, left, right) {
        // Integer arithmetic (with overflow detection).
        (BinaryOp::Add, Int(a), Int(b)) => a.checked_add(b).map(Int),
        (BinaryOp::Sub, Int(a), Int(b)) => a.checked_sub(b).map(Int),
        (BinaryOp::Mul, Int(a), Int(b)) => a.checked_mul(b).map(Int),
        (BinaryOp::Div | BinaryOp::Mod, Int(_), Int(0)) => None,
        (BinaryOp::Div, Int(a), Int(b)) => a.checked_div(b).map(Int),
        (BinaryOp::Mod, Int(a), Int(b)) => a.checked_rem(b).map(Int),
        (BinaryOp::BitAnd, Int(a), Int(b)) => Some(Int(a & b)),
        (BinaryOp::BitOr, Int(a), Int(b)) => Some(Int(a | b)),
        (BinaryOp::BitXor, Int(a), Int(b)) => Some(Int(a ^ b)),
        (BinaryOp::Shl, Int(a), Int(b)) => {
            let shift = u32::try_from(b).ok().filter(|&s| s < 64)?;
            let result = a.wrapping_shl(shift);
            // Shifting back must recover the operand, otherwise bits were lost.
            (result.wrapping_shr(shift) == a).then_some(Int(result))
        }
        (BinaryOp::Shr, Int(a), Int(b)) => {
            let shift = u32::try_from(b).ok().filter(|&s| s < 64)?;
            Some(Int(a >> shift))
        }

        // Float arithmetic.
        (BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div, Float(a), Float(b)) => {
            let (a, b) = (f64::from_bits(a), f64::from_bits(b));
            let value = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                _ if b == 0.0 => return None,
                _ => a / b,
            };
            Some(Literal::float(value))
        }

        // Comparisons.
        (op, Int(a), Int(b)) if op.is_comparison() => Some(Bool(compare(op, a.cmp(&b)))),
        (op, Float(a), Float(b)) if op.is_comparison() => f64::from_bits(a)
            .partial_cmp(&f64::from_bits(b))
            .map(|ord| Bool(compare(op, ord))),
        (BinaryOp::Eq, Bool(a), Bool(b)) => Some(Bool(a == b)),
        (BinaryOp::NotEq, Bool(a), Bool(b)) => Some(Bool(a != b)),
        (BinaryOp::Eq, Str(a), Str(b)) => Some(Bool(a == b)),
        (BinaryOp::NotEq, Str(a), Str(b)) => Some(Bool(a != b)),

        // Boolean logic.
        (BinaryOp::And, Bool(a), Bool(b)) => Some(Bool(a && b)),
        (BinaryOp::Or, Bool(a), Bool(b)) => Some(Bool(a || b)),

        // String concatenation.
        (BinaryOp::Add, Str(a), Str(b)) => {
            let joined = format!("{}{}", interner.lookup(a), interner.lookup(b));
            Some(Str(interner.intern(&joined)))
        }

        _ => None,
    }
}

fn compare(op: BinaryOp, ord: std::cmp::Ordering) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};
    match op {
        BinaryOp::Eq => ord == Equal,
        BinaryOp::NotEq => ord != Equal,
        BinaryOp::Lt => ord == Less,
        BinaryOp::LtEq => ord != Greater,
        BinaryOp::Gt => ord == Greater,
        BinaryOp::GtEq => ord != Less,
        _ => false,
    }
}

fn fold_unary(op: UnaryOp, operand: Literal) -> Option<Literal> {
    match (op, operand) {
        (UnaryOp::Neg, Literal::Int(v)) => v.checked_neg().map(Literal::Int),
        (UnaryOp::Neg, Literal::Float(bits)) => Some(Literal::float(-f64::from_bits(bits))),
        (UnaryOp::Not, Literal::Bool(b)) => Some(Literal::Bool(!b)),
        (UnaryOp::BitNot, Literal::Int(v)) => Some(Literal::Int(!v)),
        _ => None,
    }
}
