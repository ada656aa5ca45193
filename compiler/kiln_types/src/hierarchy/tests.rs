use super::*;
use crate::test_support::World;
use kiln_ir::Variance;
use pretty_assertions::assert_eq;

#[test]
fn ancestors_are_breadth_first_and_unique() {
    let mut w = World::new();
    let base = w.class("Base");
    let named = w.class("Named");
    w.class("Mid");
    w.class("Leaf");
    w.extends("Mid", base);
    w.implements("Mid", named);
    w.extends("Leaf", w.pool.class(w.name("Mid")));
    w.implements("Leaf", named);

    let leaf = w.pool.class(w.name("Leaf"));
    let shown: Vec<String> = ancestors(&w.pool, &w, leaf).into_iter().map(|t| w.show(t)).collect();
    assert_eq!(shown, vec!["Leaf", "Mid", "Named", "Base"]);
}

#[test]
fn cyclic_hierarchy_terminates() {
    let mut w = World::new();
    let a = w.class("A");
    let b = w.class("B");
    w.extends("A", b);
    w.extends("B", a);
    assert_eq!(ancestors(&w.pool, &w, a).len(), 2);
    assert_eq!(find_ancestor(&w.pool, &w, a, w.name("C")), None);
}

#[test]
fn find_ancestor_instantiates_arguments() {
    let mut w = World::new();
    w.generic("List", &[("T", Variance::Invariant)]);
    let e = w.generic("ArrayList", &[("E", Variance::Invariant)])[0];
    w.implements("ArrayList", w.apply("List", &[w.pool.var(e)]));

    let concrete = w.apply("ArrayList", &[Idx::INT]);
    let found = find_ancestor(&w.pool, &w, concrete, w.name("List"));
    assert_eq!(found.map(|t| w.show(t)), Some("List<int>".to_string()));
}

#[test]
fn components_follow_receiver_arguments() {
    let mut w = World::new();
    let t = w.generic("Pair", &[("T", Variance::Covariant)])[0];
    let var = w.pool.var(t);
    World::components(&mut w, "Pair", vec![var, Idx::INT]);
    let pair = w.apply("Pair", &[Idx::STR]);
    assert_eq!(components_of(&w.pool, &w, pair), vec![Idx::STR, Idx::INT]);
}

#[test]
fn variant_type_flows_scrutinee_arguments() {
    let mut w = World::new();
    w.generic("Option", &[("T", Variance::Covariant)]);
    let some_t = w.generic("Some", &[("T", Variance::Covariant)])[0];
    w.extends("Some", w.apply("Option", &[w.pool.var(some_t)]));
    w.class("None");
    w.extends("None", w.apply("Option", &[Idx::ANY]));
    w.seal("Option", &["Some", "None"]);

    let scrutinee = w.apply("Option", &[Idx::STR]);
    let some = variant_type(&w.pool, &w, w.name("Some"), scrutinee);
    assert_eq!(w.show(some), "Some<string>");
    let none = variant_type(&w.pool, &w, w.name("None"), scrutinee);
    assert_eq!(w.show(none), "None");

    let raw = w.pool.class(w.name("Option"));
    assert_eq!(w.show(variant_type(&w.pool, &w, w.name("Some"), raw)), "Some<?>");
}
