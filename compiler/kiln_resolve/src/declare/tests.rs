use pretty_assertions::assert_eq;

use kiln_ir::{Access, Modifiers, ParsedType, SharedInterner};
use kiln_types::member::{AnnotationKind, MemberKind, ResolutionState};
use kiln_types::{ClassHierarchy, Pool};

use super::declare_unit;
use crate::testing::Fixture;
use crate::{SymbolKind, SymbolTable, UnitId};

#[test]
fn declares_classes_and_members_in_order() {
    let interner = SharedInterner::new();
    let mut f = Fixture::new("shapes", &interner);
    let int = f.ty("int");
    let radius = f.field_decl("radius", int);
    let ret = f.ty("int");
    let area = f.method("area", ret);
    let class = f.class("Circle").with_field(radius).with_method(area);
    f.push(class);

    let (pool, symbols) = (Pool::new(), SymbolTable::new());
    let unit = declare_unit(UnitId::new(0), f.finish(), &pool, &symbols, &interner);

    assert_eq!(unit.name, "shapes");
    assert_eq!(unit.members.len(), 3);
    assert_eq!(unit.classes.len(), 1);
    assert_eq!(unit.symbols.len(), 3);
    assert!(unit.all_members_at(ResolutionState::Unresolved));

    let circle = unit.classes[0];
    let MemberKind::Class { members, .. } = &unit.members.get(circle).kind else {
        panic!("expected a class member");
    };
    let names: Vec<_> = members
        .iter()
        .map(|&m| interner.lookup(unit.members.get(m).name))
        .collect();
    assert_eq!(names, vec!["radius", "area"]);

    let area_sym = symbols.get(unit.symbol(members[1]));
    assert_eq!(area_sym.kind, SymbolKind::Method);
    assert_eq!(area_sym.owner, Some(interner.intern("Circle")));
    assert!(area_sym.signature.is_none());
}

#[test]
fn publishes_type_params_and_permits() {
    let interner = SharedInterner::new();
    let mut f = Fixture::new("closed", &interner);
    let t = f.type_param("T");
    let (circle, square) = (f.name("Circle"), f.name("Square"));
    let class = f.class("Shape").with_type_param(t).sealed([circle, square]);
    f.push(class);

    let (pool, symbols) = (Pool::new(), SymbolTable::new());
    let unit = declare_unit(UnitId::new(0), f.finish(), &pool, &symbols, &interner);

    let shape = interner.intern("Shape");
    let params = symbols.type_params(shape);
    assert_eq!(params.len(), 1);
    assert_eq!(pool.param(params[0]).name, interner.intern("T"));
    assert_eq!(symbols.closed_variants(shape), Some(vec![circle, square]));
    assert_eq!(unit.members.get(unit.classes[0]).type_params()[0].id, params[0]);
}

#[test]
fn interface_methods_without_body_are_abstract_and_public() {
    let interner = SharedInterner::new();
    let mut f = Fixture::new("iface", &interner);
    let ret = f.ty("int");
    let size = f.method("size", ret).with_access(Access::Private);
    let class = f
        .class("Sized")
        .with_modifiers(Modifiers::INTERFACE)
        .with_method(size);
    f.push(class);

    let (pool, symbols) = (Pool::new(), SymbolTable::new());
    let unit = declare_unit(UnitId::new(0), f.finish(), &pool, &symbols, &interner);

    let Some(size) = unit.find(interner.intern("size")) else {
        panic!("method not declared");
    };
    let member = unit.members.get(size);
    assert!(member.modifiers.contains(Modifiers::ABSTRACT));
    assert_eq!(member.access, Access::Public);
    assert!(symbols.get(unit.symbol(size)).is_abstract());
}

#[test]
fn builtin_annotations_are_recognised_at_declaration() {
    let interner = SharedInterner::new();
    let mut f = Fixture::new("annotated", &interner);
    let deprecated = f.annotation("Deprecated");
    let custom = f.annotation("Audit");
    let old = f
        .method("old", ParsedType::Infer)
        .with_annotation(deprecated)
        .with_annotation(custom);
    let class = f.class("Legacy").with_method(old);
    f.push(class);

    let (pool, symbols) = (Pool::new(), SymbolTable::new());
    let unit = declare_unit(UnitId::new(0), f.finish(), &pool, &symbols, &interner);

    let Some(old) = unit.find(interner.intern("old")) else {
        panic!("method not declared");
    };
    let kinds: Vec<_> = unit
        .members
        .get(old)
        .annotations
        .iter()
        .map(|a| a.kind)
        .collect();
    assert_eq!(kinds, vec![AnnotationKind::Deprecated, AnnotationKind::Unresolved]);
    assert!(symbols.get(unit.symbol(old)).deprecated);
}
