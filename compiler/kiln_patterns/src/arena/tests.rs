use pretty_assertions::assert_eq;

use kiln_ir::{ExprArena, Literal, PatternKind};
use kiln_types::Idx;

use super::{PatKind, PatternArena, PatternState};
use crate::test_support::{sp, Classes};

#[test]
fn wildcard_is_typed_from_birth() {
    let mut arena = PatternArena::new();
    let w = arena.wildcard(sp(0));
    assert_eq!(arena.state(w), PatternState::Typed);
    assert_eq!(arena.ty(w), Idx::ANY);
    assert!(arena.is_irrefutable(w));
    assert!(arena.is_exhaustive(w));
}

#[test]
fn other_patterns_start_unbound() {
    let classes = Classes::new();
    let mut arena = PatternArena::new();
    let c = arena.constant(Literal::Int(1), sp(0));
    let b = arena.binding(classes.name("x"), None, sp(1));
    assert_eq!(arena.state(c), PatternState::Unbound);
    assert_eq!(arena.state(b), PatternState::Unbound);
}

#[test]
fn import_copies_nested_syntax() {
    let classes = Classes::new();
    let mut syntax = ExprArena::new();
    let inner = syntax.alloc_pattern(PatternKind::Constant(Literal::Int(3)), sp(4));
    let wild = syntax.alloc_pattern(PatternKind::Wildcard, sp(6));
    let root = syntax.alloc_pattern(
        PatternKind::Deconstruct {
            class: classes.name("Square"),
            fields: vec![inner, wild],
        },
        sp(0),
    );

    let mut arena = PatternArena::new();
    let id = arena.import(&syntax, root);
    let PatKind::Deconstruct { class, fields } = arena.kind(id).clone() else {
        panic!("expected a deconstruct pattern");
    };
    assert_eq!(class, classes.name("Square"));
    assert_eq!(arena.kind(fields[0]), &PatKind::Constant(Literal::Int(3)));
    assert!(arena.is_wildcard(fields[1]));
    assert_eq!(arena.span(id), sp(0));
    assert_eq!(arena.len(), 3);
}

#[test]
fn constants_are_refutable_but_switchable() {
    let mut arena = PatternArena::new();
    let c = arena.constant(Literal::Bool(true), sp(0));
    assert!(!arena.is_irrefutable(c));
    assert!(arena.is_switchable(c));
}

#[test]
fn binding_inherits_refutability_of_inner() {
    let classes = Classes::new();
    let mut arena = PatternArena::new();
    let bare = arena.binding(classes.name("x"), None, sp(0));
    let one = arena.constant(Literal::Int(1), sp(1));
    let guarded = arena.binding(classes.name("y"), Some(one), sp(2));
    assert!(arena.is_irrefutable(bare));
    assert!(!arena.is_irrefutable(guarded));
    assert!(arena.is_switchable(guarded));
}

#[test]
fn nested_constant_is_not_switchable() {
    let mut classes = Classes::new();
    let shape = classes.shapes();
    let mut arena = PatternArena::new();
    let zero = arena.constant(Literal::float(0.0), sp(1));
    let raw = arena.deconstruct(classes.name("Circle"), vec![zero], sp(0));
    let typed = arena
        .with_type(raw, shape, &classes.pool, &classes)
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(!arena.is_switchable(typed));

    let any = arena.wildcard(sp(2));
    let raw = arena.deconstruct(classes.name("Circle"), vec![any], sp(0));
    let typed = arena
        .with_type(raw, shape, &classes.pool, &classes)
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(arena.is_switchable(typed));
    assert!(!arena.is_irrefutable(typed));
}

#[test]
fn bindings_are_collected_in_source_order() {
    let mut classes = Classes::new();
    let shape = classes.shapes();
    let (w, h) = (classes.name("w"), classes.name("h"));
    let mut arena = PatternArena::new();
    let bw = arena.binding(w, None, sp(1));
    let bh = arena.binding(h, None, sp(2));
    let raw = arena.deconstruct(classes.name("Square"), vec![bw, bh], sp(0));
    let typed = arena
        .with_type(raw, shape, &classes.pool, &classes)
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(arena.bindings(typed), vec![(w, Idx::FLOAT), (h, Idx::FLOAT)]);
}
