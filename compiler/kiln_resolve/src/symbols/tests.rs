use pretty_assertions::assert_eq;

use kiln_ir::{Access, Modifiers, Name, SharedInterner, Span};
use kiln_types::member::MemberId;
use kiln_types::{ClassHierarchy, Idx};

use super::{Signature, Symbol, SymbolKind, SymbolTable};
use crate::UnitId;

fn symbol(name: Name, kind: SymbolKind, unit: u32, member: u32) -> Symbol {
    Symbol {
        name,
        kind,
        unit: UnitId::new(unit),
        member: MemberId::new(member),
        owner: None,
        access: Access::Public,
        modifiers: Modifiers::empty(),
        deprecated: false,
        span: Span::DUMMY,
        arity: 0,
        signature: None,
    }
}

#[test]
fn canonical_class_is_earliest_in_program_order() {
    let interner = SharedInterner::new();
    let table = SymbolTable::new();
    let point = interner.intern("Point");

    // Unit 1 publishes before unit 0, as a worker thread might.
    let late = table.declare_class(symbol(point, SymbolKind::Class, 1, 0), Vec::new(), None);
    let early = table.declare_class(symbol(point, SymbolKind::Class, 0, 3), Vec::new(), None);

    assert_eq!(table.lookup_class(point), Some(early));
    assert_eq!(table.class_declarations(point), vec![early, late]);
    assert_eq!(table.lookup(point).map(|s| s.unit), Some(UnitId::new(0)));
}

#[test]
fn members_are_listed_per_class_in_declaration_order() {
    let interner = SharedInterner::new();
    let table = SymbolTable::new();
    let (class, size, grow) = (
        interner.intern("Buffer"),
        interner.intern("size"),
        interner.intern("grow"),
    );
    let owner = table.declare_class(symbol(class, SymbolKind::Class, 0, 0), Vec::new(), None);
    let field = table.declare_member(owner, symbol(size, SymbolKind::Field, 0, 1));
    let first = table.declare_member(owner, symbol(grow, SymbolKind::Method, 0, 2));
    let second = table.declare_member(owner, symbol(grow, SymbolKind::Method, 0, 3));

    let methods: Vec<_> = table
        .members_named(class, grow, SymbolKind::Method)
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(methods, vec![first, second]);
    assert!(table.members_named(class, grow, SymbolKind::Field).is_empty());

    let fields: Vec<_> = table
        .find_members(class, |s| s.kind == SymbolKind::Field)
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(fields, vec![field]);
    assert_eq!(table.len(), 4);
}

#[test]
fn unknown_class_has_no_members() {
    let interner = SharedInterner::new();
    let table = SymbolTable::new();
    let missing = interner.intern("Missing");

    assert!(table.is_empty());
    assert_eq!(table.lookup_class(missing), None);
    assert!(table.find_members(missing, |_| true).is_empty());
    assert!(table.superclass(missing).is_none());
    assert!(table.type_params(missing).is_empty());
}

#[test]
fn hierarchy_reflects_published_facts() {
    let interner = SharedInterner::new();
    let table = SymbolTable::new();
    let (shape, circle, radius, cached) = (
        interner.intern("Shape"),
        interner.intern("Circle"),
        interner.intern("radius"),
        interner.intern("cached"),
    );
    table.declare_class(
        symbol(shape, SymbolKind::Class, 0, 0),
        Vec::new(),
        Some(vec![circle]),
    );
    let circle_sym = table.declare_class(symbol(circle, SymbolKind::Class, 0, 1), Vec::new(), None);
    let radius_sym = table.declare_member(circle_sym, symbol(radius, SymbolKind::Field, 0, 2));
    let mut static_field = symbol(cached, SymbolKind::Field, 0, 3);
    static_field.modifiers = Modifiers::STATIC;
    let cached_sym = table.declare_member(circle_sym, static_field);

    let shape_ty = Idx::from_raw(Idx::PRIMITIVE_COUNT + 10);
    table.publish_class(circle_sym, Some(shape_ty), Vec::new());
    for sym in [radius_sym, cached_sym] {
        table.publish_signature(
            sym,
            Signature {
                ty: Idx::FLOAT,
                ..Signature::default()
            },
        );
    }

    assert_eq!(table.superclass(circle), Some(shape_ty));
    assert_eq!(table.closed_variants(shape), Some(vec![circle]));
    assert_eq!(table.closed_variants(circle), None);
    // Static fields are not components.
    assert_eq!(table.components(circle), vec![Idx::FLOAT]);
}

#[test]
fn unpublished_signature_reads_as_any() {
    let interner = SharedInterner::new();
    let table = SymbolTable::new();
    let class = interner.intern("Lazy");
    let owner = table.declare_class(symbol(class, SymbolKind::Class, 0, 0), Vec::new(), None);
    let value = table.declare_member(owner, symbol(interner.intern("value"), SymbolKind::Field, 0, 1));

    assert_eq!(table.get(value).ty(), Idx::ANY);
    table.publish_signature(
        value,
        Signature {
            ty: Idx::INT,
            ..Signature::default()
        },
    );
    assert_eq!(table.get(value).ty(), Idx::INT);
    assert_eq!(table.components(class), vec![Idx::INT]);
}

#[test]
fn modifiers_classify_symbols() {
    let interner = SharedInterner::new();
    let mut s = symbol(interner.intern("Base"), SymbolKind::Class, 0, 0);
    assert!(!s.is_abstract());
    s.modifiers = Modifiers::INTERFACE;
    assert!(s.is_abstract());
    s.modifiers = Modifiers::STATIC | Modifiers::FINAL;
    assert!(s.is_static());
    assert!(!s.is_abstract());
}

#[test]
fn default_signature_has_no_type_yet() {
    let signature = Signature::default();
    assert!(signature.ty.is_none());
    assert!(signature.params.is_empty());
    assert!(signature.type_params.is_empty());
}
