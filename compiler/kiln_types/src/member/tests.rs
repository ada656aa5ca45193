use super::*;
use kiln_ir::StringInterner;
use pretty_assertions::assert_eq;

fn annotation(kind: AnnotationKind) -> Annotation {
    Annotation {
        name: Name::EMPTY,
        args: Vec::new(),
        span: Span::DUMMY,
        kind,
    }
}

fn member(name: Name, kind: MemberKind, owner: Option<MemberId>) -> Member {
    Member {
        name,
        span: Span::DUMMY,
        kind,
        declared: ParsedType::Infer,
        ty: Idx::NONE,
        modifiers: Modifiers::empty(),
        annotations: Vec::new(),
        access: Access::Public,
        owner,
        state: ResolutionState::Unresolved,
    }
}

fn class_kind() -> MemberKind {
    MemberKind::Class {
        type_params: Vec::new(),
        superclass: None,
        interfaces: Vec::new(),
        super_ty: None,
        interface_tys: Vec::new(),
        permits: Vec::new(),
        members: Vec::new(),
    }
}

#[test]
fn states_advance_in_order() {
    use ResolutionState::*;
    let order = [Unresolved, TypesResolved, Resolved, Checked, ConstantsFolded];
    for pair in order.windows(2) {
        assert!(pair[0] < pair[1]);
        assert_eq!(pair[1].predecessor(), Some(pair[0]));
    }
    assert_eq!(Unresolved.predecessor(), None);
    assert!(ConstantsFolded.is_terminal());
    assert!(!Checked.is_terminal());
}

#[test]
fn builtin_annotations_are_recognized() {
    assert_eq!(AnnotationKind::builtin("Override"), Some(AnnotationKind::Override));
    assert_eq!(AnnotationKind::builtin("Deprecated"), Some(AnnotationKind::Deprecated));
    assert_eq!(AnnotationKind::builtin("Entity"), None);
}

#[test]
fn capabilities_read_member_state() {
    let interner = StringInterner::new();
    let mut m = member(interner.intern("area"), MemberKind::Field { init: None }, None);
    m.modifiers = Modifiers::STATIC | Modifiers::FINAL;
    m.annotations.push(annotation(AnnotationKind::Deprecated));
    m.access = Access::Protected;

    assert!(is_static(&m));
    assert!(is_final(&m));
    assert!(!is_abstract(&m));
    assert!(is_deprecated(&m));
    assert!(!is_marked_override(&m));
    assert!(!is_sealed(&m));
    assert_eq!(Named::name(&m), interner.intern("area"));
}

#[test]
fn access_weakening_compares_levels() {
    let interner = StringInterner::new();
    let mut base = member(interner.intern("f"), MemberKind::Field { init: None }, None);
    let mut derived = base.clone();
    base.access = Access::Public;
    derived.access = Access::Protected;
    assert!(is_access_weaker(&derived, &base));
    assert!(!is_access_weaker(&base, &derived));
}

#[test]
fn params_share_annotation_capability() {
    let interner = StringInterner::new();
    let param = Param {
        name: interner.intern("shape"),
        declared: ParsedType::Infer,
        ty: Idx::ANY,
        annotations: vec![annotation(AnnotationKind::SuppressWarnings)],
        span: Span::DUMMY,
    };
    assert!(suppresses_warnings(&param));
    assert_eq!(Typed::ty(&param), Idx::ANY);
}

#[test]
fn arena_tracks_top_level_owner() {
    let interner = StringInterner::new();
    let mut arena = MemberArena::new();
    let outer = arena.alloc(member(interner.intern("Outer"), class_kind(), None));
    let inner = arena.alloc(member(interner.intern("Inner"), class_kind(), Some(outer)));
    let field = arena.alloc(member(
        interner.intern("x"),
        MemberKind::Field { init: None },
        Some(inner),
    ));
    assert_eq!(arena.top_level(field), outer);
    assert_eq!(arena.top_level(outer), outer);
    assert_eq!(arena.ids().collect::<Vec<_>>(), vec![outer, inner, field]);
}

#[test]
fn body_slot_is_rewritable() {
    let interner = StringInterner::new();
    let mut m = member(
        interner.intern("run"),
        MemberKind::Method {
            type_params: Vec::new(),
            params: Vec::new(),
            body: Some(ExprId::new(0)),
        },
        None,
    );
    m.set_body(ExprId::new(7));
    assert_eq!(m.body(), Some(ExprId::new(7)));
    assert!(m.is_method());
    assert!(m.params().is_empty());
}
