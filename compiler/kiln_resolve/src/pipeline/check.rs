//! check: validates a resolved member. Every violation is reported and
//! checking carries on.

use smallvec::SmallVec;

use kiln_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use kiln_ir::{Access, ExprId, ExprKind, Modifiers, Name, Variance};
use kiln_patterns::PatternCompiler;
use kiln_types::member::{
    is_access_weaker, is_final, is_marked_override, is_static, Member, MemberId, MemberKind,
};
use kiln_types::{
    ancestors, check_bound, concrete_type, is_same_type, is_super_class_of, is_super_type_of,
    variance_violations, ClassHierarchy, Idx, TypeContext, TypePosition,
};

use super::Pipeline;
use crate::{CompilationUnit, Resolution, SymbolKind};

pub(super) fn check_member(
    pipeline: &Pipeline<'_>,
    unit: &mut CompilationUnit,
    member: MemberId,
    sink: &mut dyn DiagnosticSink,
) {
    let checker = Checker {
        pipeline,
        unit: &*unit,
        member,
    };
    checker.duplicates(sink);
    match &unit.members.get(member).kind {
        MemberKind::Class { .. } => checker.implementation(sink),
        MemberKind::Method { .. } => {
            checker.overriding(sink);
            checker.assignability(sink);
            checker.variance(sink);
        }
        MemberKind::Field { .. } => {
            checker.assignability(sink);
            checker.variance(sink);
        }
    }
    checker.access(sink);
    checker.bounds(sink);
    lower_matches(pipeline, unit, member, sink);
}

struct Checker<'p, 'u> {
    pipeline: &'p Pipeline<'p>,
    unit: &'u CompilationUnit,
    member: MemberId,
}

impl Checker<'_, '_> {
    fn m(&self) -> &Member {
        self.unit.members.get(self.member)
    }

    fn class(&self) -> &Member {
        self.unit.members.get(self.unit.members.top_level(self.member))
    }

    fn name(&self, name: Name) -> &'static str {
        self.pipeline.interner.lookup(name)
    }

    fn show(&self, ty: Idx) -> String {
        self.pipeline.pool.display(ty, self.pipeline.interner)
    }

    /// Duplicate classes program-wide, duplicate fields and duplicate method
    /// signatures within a class. The first declaration wins; later ones are
    /// reported.
    fn duplicates(&self, sink: &mut dyn DiagnosticSink) {
        let m = self.m();
        let duplicate = match &m.kind {
            MemberKind::Class { .. } => {
                let decls = self.pipeline.symbols.class_declarations(m.name);
                decls.first().is_some_and(|&first| first != self.unit.symbol(self.member))
            }
            MemberKind::Field { .. } | MemberKind::Method { .. } => {
                let Some(owner) = m.owner else {
                    return;
                };
                let MemberKind::Class { members, .. } = &self.unit.members.get(owner).kind else {
                    return;
                };
                members
                    .iter()
                    .take_while(|&&id| id != self.member)
                    .map(|&id| self.unit.members.get(id))
                    .any(|other| other.name == m.name && same_signature(other, m))
            }
        };
        if duplicate {
            sink.report(Diagnostic::error(ErrorCode::E4002, m.span).with_arg(self.name(m.name)));
        }
    }

    /// A concrete class implements every abstract method it inherits.
    fn implementation(&self, sink: &mut dyn DiagnosticSink) {
        let Pipeline { pool, symbols, .. } = *self.pipeline;
        let class = self.m();
        if class
            .modifiers
            .intersects(Modifiers::ABSTRACT | Modifiers::INTERFACE | Modifiers::ANNOTATION)
        {
            return;
        }

        let mut concrete: Vec<(Name, SmallVec<[Idx; 4]>)> = Vec::new();
        let mut abstract_methods: Vec<(Name, Name, SmallVec<[Idx; 4]>)> = Vec::new();
        for anc in ancestors(pool, symbols, class.ty) {
            let Some(base) = pool.base_name(anc) else {
                continue;
            };
            let ctx = TypeContext::from_class_args(symbols, base, &pool.args(anc));
            for (_, symbol) in symbols.find_members(base, |s| s.kind == SymbolKind::Method) {
                let params: SmallVec<[Idx; 4]> = symbol
                    .signature
                    .iter()
                    .flat_map(|s| s.params.iter())
                    .map(|&p| concrete_type(pool, p, &ctx))
                    .collect();
                if symbol.is_abstract() {
                    abstract_methods.push((base, symbol.name, params));
                } else {
                    concrete.push((symbol.name, params));
                }
            }
        }
        for (owner, name, params) in abstract_methods {
            let implemented = concrete
                .iter()
                .any(|(n, p)| *n == name && *p == params);
            if !implemented {
                sink.report(
                    Diagnostic::error(ErrorCode::E4006, class.span)
                        .with_arg(self.name(class.name))
                        .with_arg(self.name(name))
                        .with_arg(self.name(owner)),
                );
            }
        }
    }

    /// Overriding rules against the nearest superclass method with the same
    /// name and parameter types.
    fn overriding(&self, sink: &mut dyn DiagnosticSink) {
        let Pipeline { pool, symbols, .. } = *self.pipeline;
        let m = self.m();
        if is_static(m) {
            return;
        }
        let params: Vec<Idx> = m.params().iter().map(|p| p.ty).collect();
        let mut same_arity = false;
        let mut overridden = None;
        for anc in ancestors(pool, symbols, self.class().ty).into_iter().skip(1) {
            let Some(base) = pool.base_name(anc) else {
                continue;
            };
            let ctx = TypeContext::from_class_args(symbols, base, &pool.args(anc));
            for (_, symbol) in symbols.members_named(base, m.name, SymbolKind::Method) {
                if symbol.arity != params.len() || symbol.is_static() {
                    continue;
                }
                same_arity = true;
                let Some(sig) = &symbol.signature else {
                    continue;
                };
                let exact = sig
                    .params
                    .iter()
                    .zip(&params)
                    .all(|(&p, &q)| is_same_type(concrete_type(pool, p, &ctx), q));
                if exact {
                    overridden = Some((base, symbol.clone(), concrete_type(pool, sig.ty, &ctx)));
                    break;
                }
            }
            if overridden.is_some() {
                break;
            }
        }

        let Some((owner, symbol, ret)) = overridden else {
            if is_marked_override(m) {
                let diagnostic = if same_arity {
                    Diagnostic::error(ErrorCode::E4003, m.span)
                        .with_arg(self.name(m.name))
                        .with_arg(self.name(m.name))
                        .with_arg("parameter types differ")
                } else {
                    Diagnostic::error(ErrorCode::E4005, m.span).with_arg(self.name(m.name))
                };
                sink.report(diagnostic);
            }
            return;
        };

        let target = format!("{}.{}", self.name(owner), self.name(symbol.name));
        if is_final(&symbol) {
            sink.report(
                Diagnostic::error(ErrorCode::E4004, m.span)
                    .with_arg(self.name(m.name))
                    .with_arg(self.name(owner)),
            );
        }
        if !is_super_type_of(pool, symbols, ret, m.ty) {
            sink.report(
                Diagnostic::error(ErrorCode::E4003, m.span)
                    .with_arg(self.name(m.name))
                    .with_arg(&target)
                    .with_arg(format!(
                        "return type `{}` is not compatible with `{}`",
                        self.show(m.ty),
                        self.show(ret)
                    )),
            );
        }
        if is_access_weaker(m, &symbol) {
            sink.report(
                Diagnostic::error(ErrorCode::E4003, m.span)
                    .with_arg(self.name(m.name))
                    .with_arg(&target)
                    .with_arg(format!("weaker access; was {}", symbol.access)),
            );
        }
    }

    /// Field initializers and method bodies against the declared type.
    fn assignability(&self, sink: &mut dyn DiagnosticSink) {
        let m = self.m();
        let Some(body) = m.body() else {
            return;
        };
        if m.ty == Idx::VOID {
            return;
        }
        let found = self.unit.type_of(body);
        if !is_super_type_of(self.pipeline.pool, self.pipeline.symbols, m.ty, found) {
            sink.report(
                Diagnostic::error(ErrorCode::E2001, self.unit.arena.span(body))
                    .with_arg(self.show(m.ty))
                    .with_arg(self.show(found)),
            );
        }
    }

    /// Declaration-site variance of the class's type parameters.
    fn variance(&self, sink: &mut dyn DiagnosticSink) {
        let Pipeline {
            pool,
            symbols,
            interner,
        } = *self.pipeline;
        let m = self.m();
        if is_static(m) || self.class().type_params().is_empty() {
            return;
        }
        let class_params = |name: Name| -> Vec<Variance> {
            symbols
                .type_params(name)
                .into_iter()
                .map(|p| pool.param(p).variance)
                .collect()
        };
        let mut errors = Vec::new();
        match &m.kind {
            MemberKind::Field { .. } => {
                errors.extend(variance_violations(pool, m.ty, TypePosition::Field, &class_params));
            }
            MemberKind::Method { params, .. } => {
                for param in params {
                    errors.extend(variance_violations(
                        pool,
                        param.ty,
                        TypePosition::Parameter,
                        &class_params,
                    ));
                }
                errors.extend(variance_violations(pool, m.ty, TypePosition::Return, &class_params));
            }
            MemberKind::Class { .. } => {}
        }
        for err in errors {
            sink.report(err.to_diagnostic(m.span, pool, interner));
        }
    }

    /// Every symbol the body refers to must be visible from here.
    fn access(&self, sink: &mut dyn DiagnosticSink) {
        let Some(body) = self.m().body() else {
            return;
        };
        let Pipeline { pool, symbols, .. } = *self.pipeline;
        let class = self.class();
        let mut uses: Vec<(ExprId, Resolution)> = Vec::new();
        self.unit.arena.walk(body, |id| {
            if let Some(resolution) = self.unit.resolution(id) {
                uses.push((id, resolution));
            }
        });
        for (id, resolution) in uses {
            let sym = match resolution {
                Resolution::Field(sym) | Resolution::Method(sym) | Resolution::Class(sym) => sym,
                Resolution::Local(_) | Resolution::Unresolved => continue,
            };
            let symbol = symbols.get(sym);
            let same_unit = symbol.unit == self.unit.id;
            let allowed = match symbol.access {
                Access::Public => true,
                Access::Package => same_unit,
                Access::Private => match symbol.owner {
                    Some(owner) => same_unit && owner == class.name,
                    None => same_unit,
                },
                Access::Protected => match symbol.owner {
                    Some(owner) => {
                        owner == class.name
                            || is_super_class_of(pool, symbols, pool.class(owner), class.ty)
                    }
                    None => same_unit,
                },
            };
            if !allowed {
                let owner = symbol.owner.unwrap_or(symbol.name);
                sink.report(
                    Diagnostic::error(ErrorCode::E4001, self.unit.arena.span(id))
                        .with_arg(self.name(symbol.name))
                        .with_arg(symbol.access)
                        .with_arg(self.name(owner)),
                );
            }
        }
    }

    /// Type arguments written in this member against their parameters'
    /// bounds. Deferred to here so every unit's bounds are resolved.
    fn bounds(&self, sink: &mut dyn DiagnosticSink) {
        let Pipeline {
            pool,
            symbols,
            interner,
        } = *self.pipeline;
        for usage in self.unit.bound_uses.iter().filter(|u| u.member == self.member) {
            let Some(base) = pool.base_name(usage.ty) else {
                continue;
            };
            let args = pool.args(usage.ty);
            let ctx = TypeContext::from_class_args(symbols, base, &args);
            for (param, &arg) in symbols.type_params(base).into_iter().zip(&args) {
                if let Err(err) = check_bound(pool, symbols, param, arg, &ctx) {
                    sink.report(err.to_diagnostic(usage.span, pool, interner));
                }
            }
        }
    }
}

/// Same name and, for methods, identical parameter types.
fn same_signature(a: &Member, b: &Member) -> bool {
    match (&a.kind, &b.kind) {
        (MemberKind::Field { .. }, MemberKind::Field { .. }) => true,
        (MemberKind::Method { params: pa, .. }, MemberKind::Method { params: pb, .. }) => {
            pa.len() == pb.len() && pa.iter().zip(pb).all(|(x, y)| is_same_type(x.ty, y.ty))
        }
        _ => false,
    }
}

/// Judge and lower every match in the member's body.
fn lower_matches(
    pipeline: &Pipeline<'_>,
    unit: &mut CompilationUnit,
    member: MemberId,
    sink: &mut dyn DiagnosticSink,
) {
    let Some(body) = unit.members.get(member).body() else {
        return;
    };
    let mut matches: Vec<ExprId> = Vec::new();
    unit.arena.walk(body, |id| {
        if matches!(unit.arena.kind(id), ExprKind::Match { .. }) {
            matches.push(id);
        }
    });
    let compiler = PatternCompiler::new(pipeline.pool, pipeline.symbols, pipeline.interner);
    for id in matches {
        let Some(group) = unit.match_groups.get(&id) else {
            continue;
        };
        let (analysis, lowered) = compiler.compile_match(&mut unit.patterns, group, sink);
        tracing::trace!(
            exhaustive = analysis.is_exhaustive(),
            strategy = ?lowered.strategy,
            "lowered match"
        );
        unit.lowered.insert(id, lowered);
    }
}
