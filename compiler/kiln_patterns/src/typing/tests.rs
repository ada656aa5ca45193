use pretty_assertions::assert_eq;

use kiln_diagnostic::ErrorCode;
use kiln_ir::Literal;
use kiln_types::Idx;

use super::{literal_type, PatternError};
use crate::test_support::{sp, Classes};
use crate::{PatKind, PatternArena, PatternState};

#[test]
fn literal_types() {
    assert_eq!(literal_type(Literal::Int(1)), Idx::INT);
    assert_eq!(literal_type(Literal::float(1.5)), Idx::FLOAT);
    assert_eq!(literal_type(Literal::Bool(false)), Idx::BOOL);
    assert_eq!(literal_type(Literal::Char('x')), Idx::CHAR);
}

#[test]
fn typing_allocates_a_new_node() {
    let classes = Classes::new();
    let mut arena = PatternArena::new();
    let raw = arena.constant(Literal::Int(7), sp(0));
    let typed = arena
        .with_type(raw, Idx::INT, &classes.pool, &classes)
        .unwrap_or_else(|e| panic!("{e}"));
    assert_ne!(raw, typed);
    assert_eq!(arena.state(raw), PatternState::Unbound);
    assert_eq!(arena.state(typed), PatternState::Typed);
    assert_eq!(arena.ty(typed), Idx::INT);
    assert_eq!(arena.subject(typed), Idx::INT);
}

#[test]
fn wildcard_types_to_itself() {
    let classes = Classes::new();
    let mut arena = PatternArena::new();
    let w = arena.wildcard(sp(0));
    let typed = arena
        .with_type(w, Idx::STR, &classes.pool, &classes)
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(w, typed);
    assert_eq!(arena.len(), 1);
}

#[test]
fn same_raw_pattern_types_against_two_subjects() {
    let classes = Classes::new();
    let mut arena = PatternArena::new();
    let raw = arena.binding(classes.name("x"), None, sp(0));
    let a = arena
        .with_type(raw, Idx::INT, &classes.pool, &classes)
        .unwrap_or_else(|e| panic!("{e}"));
    let b = arena
        .with_type(raw, Idx::STR, &classes.pool, &classes)
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(arena.ty(a), Idx::INT);
    assert_eq!(arena.ty(b), Idx::STR);
}

#[test]
fn constant_of_wrong_type_is_rejected() {
    let classes = Classes::new();
    let mut arena = PatternArena::new();
    let raw = arena.constant(Literal::Bool(true), sp(3));
    let Err(err) = arena.with_type(raw, Idx::INT, &classes.pool, &classes) else {
        panic!("a bool constant cannot match an int");
    };
    assert_eq!(
        err,
        PatternError::TypeMismatch {
            pattern: Idx::BOOL,
            subject: Idx::INT,
            span: sp(3),
        }
    );
    let diagnostic = err.to_diagnostic(&classes.pool, &classes.interner);
    assert_eq!(diagnostic.code, ErrorCode::E3003);
    assert_eq!(diagnostic.span, sp(3));
}

#[test]
fn any_subject_accepts_every_constant() {
    let classes = Classes::new();
    let mut arena = PatternArena::new();
    let raw = arena.constant(Literal::Char('a'), sp(0));
    assert!(arena.with_type(raw, Idx::ANY, &classes.pool, &classes).is_ok());
}

#[test]
fn deconstruct_types_fields_against_components() {
    let mut classes = Classes::new();
    let shape = classes.shapes();
    let mut arena = PatternArena::new();
    let r = arena.binding(classes.name("r"), None, sp(1));
    let raw = arena.deconstruct(classes.name("Circle"), vec![r], sp(0));
    let typed = arena
        .with_type(raw, shape, &classes.pool, &classes)
        .unwrap_or_else(|e| panic!("{e}"));
    let PatKind::Deconstruct { fields, .. } = arena.kind(typed).clone() else {
        panic!("expected a deconstruct pattern");
    };
    assert_eq!(arena.ty(fields[0]), Idx::FLOAT);
    assert_eq!(arena.ty(typed), classes.pool.class(classes.name("Circle")));
}

#[test]
fn deconstruct_arity_mismatch() {
    let mut classes = Classes::new();
    let shape = classes.shapes();
    let square = classes.name("Square");
    let mut arena = PatternArena::new();
    let w = arena.wildcard(sp(1));
    let raw = arena.deconstruct(square, vec![w], sp(0));
    let Err(err) = arena.with_type(raw, shape, &classes.pool, &classes) else {
        panic!("arity mismatch was accepted");
    };
    assert_eq!(
        err,
        PatternError::Arity {
            class: square,
            expected: 2,
            found: 1,
            span: sp(0),
        }
    );
    assert_eq!(
        err.to_diagnostic(&classes.pool, &classes.interner).code,
        ErrorCode::E3004
    );
}

#[test]
fn unrelated_class_is_rejected() {
    let mut classes = Classes::new();
    classes.shapes();
    let other = classes.declare("Color", None, Vec::new());
    let mut arena = PatternArena::new();
    let raw = arena.deconstruct(classes.name("Circle"), vec![], sp(0));
    assert!(matches!(
        arena.with_type(raw, other, &classes.pool, &classes),
        Err(PatternError::TypeMismatch { .. })
    ));
}
