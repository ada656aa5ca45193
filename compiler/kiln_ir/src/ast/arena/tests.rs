use super::*;
use crate::ast::expr::BinaryOp;

#[test]
fn alloc_returns_sequential_ids() {
    let mut arena = ExprArena::new();
    let a = arena.alloc(ExprKind::Literal(Literal::Int(1)), Span::new(0, 1));
    let b = arena.alloc(ExprKind::Literal(Literal::Int(2)), Span::new(2, 3));
    assert_eq!(a.index(), 0);
    assert_eq!(b.index(), 1);
    assert_eq!(arena.literal(b), Some(Literal::Int(2)));
}

#[test]
fn walk_is_pre_order() {
    let mut arena = ExprArena::new();
    let one = arena.alloc(ExprKind::Literal(Literal::Int(1)), Span::DUMMY);
    let two = arena.alloc(ExprKind::Literal(Literal::Int(2)), Span::DUMMY);
    let add = arena.alloc(
        ExprKind::Binary {
            op: BinaryOp::Add,
            left: one,
            right: two,
        },
        Span::DUMMY,
    );
    let mut seen = Vec::new();
    arena.walk(add, |id| seen.push(id));
    assert_eq!(seen, vec![add, one, two]);
}

#[test]
fn if_without_else_skips_invalid_child() {
    let mut arena = ExprArena::new();
    let cond = arena.alloc(ExprKind::Literal(Literal::Bool(true)), Span::DUMMY);
    let then_branch = arena.alloc(ExprKind::Literal(Literal::Int(0)), Span::DUMMY);
    let if_expr = arena.alloc(
        ExprKind::If {
            cond,
            then_branch,
            else_branch: ExprId::INVALID,
        },
        Span::DUMMY,
    );
    assert_eq!(arena.children(if_expr), vec![cond, then_branch]);
}
