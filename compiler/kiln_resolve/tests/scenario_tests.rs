//! End-to-end programs through every phase.

mod common;

use pretty_assertions::assert_eq;

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::{BinaryOp, ExprId, Literal, Modifiers, SharedInterner, SourceUnit};
use kiln_patterns::{BranchInstruction, GroupAnalysis, LoweringStrategy, PatternCompiler};
use kiln_resolve::testing::Fixture;
use kiln_resolve::{Resolution, Session, UnitId};
use kiln_types::member::ResolutionState;
use kiln_types::Idx;

use common::{codes, compile, count, messages};

/// Re-judge the match at `expr` in unit 0 without reporting.
fn analysis(session: &Session, expr: ExprId) -> GroupAnalysis {
    let Some(unit) = session.unit(UnitId::new(0)) else {
        panic!("unit missing");
    };
    let Some(group) = unit.match_groups.get(&expr) else {
        panic!("no match group recorded");
    };
    let compiler = PatternCompiler::new(session.pool(), session.symbols(), session.interner());
    let mut quiet: Vec<Diagnostic> = Vec::new();
    compiler.check_group(&unit.patterns, group, &mut quiet)
}

/// `class <name> { <other> partner; <other> next() { partner } }`
fn partner_unit(interner: &SharedInterner, unit: &str, name: &str, other: &str) -> SourceUnit {
    let mut f = Fixture::new(unit, interner);
    let ty = f.ty(other);
    let partner = f.field_decl("partner", ty);
    let body = f.ident("partner");
    let ret = f.ty(other);
    let next = f.method("next", ret).with_body(body);
    let class = f.class(name).with_field(partner).with_method(next);
    f.push(class);
    f.finish()
}

#[test]
fn mutually_referencing_units_resolve_cleanly() {
    let interner = SharedInterner::new();
    let session = compile(
        &interner,
        vec![
            partner_unit(&interner, "a", "A", "B"),
            partner_unit(&interner, "b", "B", "A"),
        ],
    );

    assert!(session.diagnostics().is_empty(), "{:?}", messages(&session));
    for unit in session.units() {
        assert!(unit.all_members_at(ResolutionState::ConstantsFolded));
    }
    let Some(a) = session.unit(UnitId::new(0)) else {
        panic!("unit a missing");
    };
    let Some(next) = a.find(interner.intern("next")) else {
        panic!("next not declared");
    };
    assert_eq!(
        session.pool().display(a.members.get(next).ty, session.interner()),
        "B"
    );
}

/// `sealed class Shape permits Circle, Square`, both variants extending it,
/// and `int area(Shape s) { match s { <arms> } }` in class `Geometry`.
fn shapes(
    interner: &SharedInterner,
    root: Modifiers,
    arms: impl FnOnce(&mut Fixture) -> Vec<(kiln_ir::PatternId, ExprId)>,
) -> (SourceUnit, ExprId) {
    let mut f = Fixture::new("shapes", interner);
    let (circle, square) = (f.name("Circle"), f.name("Square"));
    let shape = f.class("Shape").sealed([circle, square]).with_modifiers(root);
    f.push(shape);
    for variant in ["Circle", "Square"] {
        let sup = f.ty("Shape");
        let class = f.class(variant).with_superclass(sup);
        f.push(class);
    }

    let scrutinee = f.ident("s");
    let arms = arms(&mut f);
    let body = f.match_on(scrutinee, arms);
    let (ty, ret) = (f.ty("Shape"), f.ty("int"));
    let s = f.param("s", ty);
    let area = f.method("area", ret).with_param(s).with_body(body);
    let geometry = f.class("Geometry").with_method(area);
    f.push(geometry);
    (f.finish(), body)
}

#[test]
fn missing_sealed_variant_is_not_exhaustive() {
    let interner = SharedInterner::new();
    let (source, body) = shapes(&interner, Modifiers::ABSTRACT, |f| {
        let circle = f.pat_class("Circle", Vec::new());
        let one = f.int(1);
        vec![(circle, one)]
    });
    let session = compile(&interner, vec![source]);

    assert_eq!(codes(&session), vec![ErrorCode::E3001], "{:?}", messages(&session));
    assert!(messages(&session)[0].contains("Square"));
    assert!(!analysis(&session, body).is_exhaustive());
}

#[test]
fn covering_every_sealed_variant_is_exhaustive() {
    let interner = SharedInterner::new();
    let (source, body) = shapes(&interner, Modifiers::ABSTRACT, |f| {
        let circle = f.pat_class("Circle", Vec::new());
        let square = f.pat_class("Square", Vec::new());
        let (one, two) = (f.int(1), f.int(2));
        vec![(circle, one), (square, two)]
    });
    let session = compile(&interner, vec![source]);
    assert!(session.diagnostics().is_empty(), "{:?}", messages(&session));
    assert!(analysis(&session, body).is_exhaustive());
}

#[test]
fn concrete_sealed_root_is_its_own_case() {
    let interner = SharedInterner::new();
    let (source, body) = shapes(&interner, Modifiers::empty(), |f| {
        let circle = f.pat_class("Circle", Vec::new());
        let square = f.pat_class("Square", Vec::new());
        let (one, two) = (f.int(1), f.int(2));
        vec![(circle, one), (square, two)]
    });
    let mut f = Fixture::new("factory", &interner);
    let (ty, ret) = (f.ty("Shape"), f.ty("Shape"));
    let plain = f.new_object(ty, Vec::new());
    let make = f.method("make", ret).with_body(plain);
    let factory = f.class("Factory").with_method(make);
    f.push(factory);
    let session = compile(&interner, vec![source, f.finish()]);

    // `new Shape()` is a value neither arm matches.
    assert_eq!(codes(&session), vec![ErrorCode::E3001], "{:?}", messages(&session));
    assert!(messages(&session)[0].contains("`Shape`"));
    assert!(!analysis(&session, body).is_exhaustive());
    let Some(unit) = session.unit(UnitId::new(0)) else {
        panic!("unit missing");
    };
    let Some(lowered) = unit.lowered.get(&body) else {
        panic!("match was not lowered");
    };
    assert_eq!(lowered.instructions.last(), Some(&BranchInstruction::MatchError));
    assert!(!lowered
        .instructions
        .iter()
        .any(|i| matches!(i, BranchInstruction::Jump(_))));
}

#[test]
fn constant_with_default_is_exhaustive_and_switchable() {
    let interner = SharedInterner::new();
    let mut f = Fixture::new("codes", &interner);
    let scrutinee = f.ident("x");
    let one = f.pat_lit(Literal::Int(1));
    let rest = f.pat_wild();
    let (ten, zero) = (f.int(10), f.int(0));
    let body = f.match_on(scrutinee, vec![(one, ten), (rest, zero)]);
    let (ty, ret) = (f.ty("int"), f.ty("int"));
    let x = f.param("x", ty);
    let code = f.method("code", ret).with_param(x).with_body(body);
    let class = f.class("Codes").with_method(code);
    f.push(class);
    let session = compile(&interner, vec![f.finish()]);

    assert!(session.diagnostics().is_empty(), "{:?}", messages(&session));
    let Some(unit) = session.unit(UnitId::new(0)) else {
        panic!("unit missing");
    };
    let Some(lowered) = unit.lowered.get(&body) else {
        panic!("match was not lowered");
    };
    assert_eq!(lowered.strategy, LoweringStrategy::BranchChain);
    let judged = analysis(&session, body);
    assert!(judged.is_exhaustive());
    assert!(judged.switchable);
    assert_eq!(lowered.arms.len(), 2);
    assert_eq!(unit.type_of(body), Idx::INT);
}

#[test]
fn arm_after_catch_all_is_unreachable() {
    let interner = SharedInterner::new();
    let mut f = Fixture::new("dead", &interner);
    let scrutinee = f.ident("flag");
    let any = f.pat_wild();
    let yes = f.pat_lit(Literal::Bool(true));
    let (zero, one) = (f.int(0), f.int(1));
    let body = f.match_on(scrutinee, vec![(any, zero), (yes, one)]);
    let (ty, ret) = (f.ty("bool"), f.ty("int"));
    let flag = f.param("flag", ty);
    let pick = f.method("pick", ret).with_param(flag).with_body(body);
    let class = f.class("Dead").with_method(pick);
    f.push(class);
    let session = compile(&interner, vec![f.finish()]);

    // A warning alone does not count as an error.
    assert_eq!(codes(&session), vec![ErrorCode::E3002]);
    assert_eq!(session.error_count(), 0);
}

#[test]
fn pattern_bindings_are_locals_of_their_arm() {
    let interner = SharedInterner::new();
    let mut f = Fixture::new("bind", &interner);
    let scrutinee = f.ident("n");
    let bound = f.pat_bind("m", None);
    let (m, one) = (f.ident("m"), f.int(1));
    let arm_body = f.binary(BinaryOp::Add, m, one);
    let body = f.match_on(scrutinee, vec![(bound, arm_body)]);
    let (ty, ret) = (f.ty("int"), f.ty("int"));
    let n = f.param("n", ty);
    let inc = f.method("inc", ret).with_param(n).with_body(body);
    let class = f.class("Bind").with_method(inc);
    f.push(class);
    let session = compile(&interner, vec![f.finish()]);

    assert!(session.diagnostics().is_empty(), "{:?}", messages(&session));
    let Some(unit) = session.unit(UnitId::new(0)) else {
        panic!("unit missing");
    };
    assert_eq!(unit.resolution(m), Some(Resolution::Local(interner.intern("m"))));
    assert_eq!(unit.type_of(m), Idx::INT);
}

#[test]
fn unknown_class_in_pattern_is_reported_once() {
    let interner = SharedInterner::new();
    let (source, _) = shapes(&interner, Modifiers::ABSTRACT, |f| {
        let ghost = f.pat_class("Ghost", Vec::new());
        let rest = f.pat_wild();
        let (one, two) = (f.int(1), f.int(2));
        vec![(ghost, one), (rest, two)]
    });
    let session = compile(&interner, vec![source]);
    assert_eq!(count(&session, ErrorCode::E2003), 1, "{:?}", messages(&session));
    assert_eq!(count(&session, ErrorCode::E3001), 0);
}
