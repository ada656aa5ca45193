//! resolve-types: declared types become pool types.

use kiln_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use kiln_ir::{Name, ParsedType, Span, Variance};
use kiln_types::member::{GenericParam, MemberArena, MemberId, MemberKind};
use kiln_types::{ensure_sufficient_stack, self_type, ClassHierarchy, Idx, TypeParamId};
use smallvec::SmallVec;

use super::Pipeline;
use crate::{BoundUse, CompilationUnit, Signature};

/// Type parameters in scope at a member: the enclosing class's, then the
/// member's own, which shadow them.
#[derive(Clone, Debug, Default)]
pub(super) struct TypeScope {
    params: Vec<(Name, TypeParamId)>,
}

impl TypeScope {
    pub(super) fn for_member(members: &MemberArena, member: MemberId) -> Self {
        let mut scope = TypeScope::default();
        let m = members.get(member);
        if let Some(owner) = m.owner {
            scope.extend(members.get(members.top_level(owner)).type_params());
        }
        scope.extend(m.type_params());
        scope
    }

    fn extend(&mut self, params: &[GenericParam]) {
        self.params.extend(params.iter().map(|p| (p.name, p.id)));
    }

    fn get(&self, name: Name) -> Option<TypeParamId> {
        self.params
            .iter()
            .rev()
            .find(|(n, _)| *n == name)
            .map(|(_, id)| *id)
    }
}

/// Lowers [`ParsedType`]s within one member, reporting unknown names and
/// arity mismatches. Generic uses are recorded for bound checking.
pub(super) struct TypeLowerer<'p, 's> {
    pipeline: &'p Pipeline<'p>,
    scope: TypeScope,
    member: MemberId,
    sink: &'s mut dyn DiagnosticSink,
    pub(super) uses: Vec<BoundUse>,
}

impl<'p, 's> TypeLowerer<'p, 's> {
    pub(super) fn new(
        pipeline: &'p Pipeline<'p>,
        scope: TypeScope,
        member: MemberId,
        sink: &'s mut dyn DiagnosticSink,
    ) -> Self {
        TypeLowerer {
            pipeline,
            scope,
            member,
            sink,
            uses: Vec::new(),
        }
    }

    pub(super) fn lower(&mut self, ty: &ParsedType) -> Idx {
        ensure_sufficient_stack(|| match ty {
            ParsedType::Infer => Idx::ANY,
            ParsedType::Wildcard {
                variance: Variance::Invariant,
                ..
            } => self.pipeline.pool.any_wildcard(),
            ParsedType::Wildcard {
                variance, bound, ..
            } => {
                let bound = bound.as_deref().map_or(Idx::ANY, |b| self.lower(b));
                self.pipeline.pool.wildcard(*variance, bound)
            }
            ParsedType::Named { name, args, span } => self.named(*name, args, *span),
        })
    }

    fn named(&mut self, name: Name, args: &[ParsedType], span: Span) -> Idx {
        let Pipeline {
            pool,
            symbols,
            interner,
        } = *self.pipeline;

        if let Some(param) = self.scope.get(name) {
            self.check_arity(name, 0, args.len(), span);
            return pool.var(param);
        }
        if let Some(primitive) = Idx::primitive(interner.lookup(name)) {
            self.check_arity(name, 0, args.len(), span);
            return primitive;
        }
        if symbols.lookup_class(name).is_none() {
            self.sink.report(
                Diagnostic::error(ErrorCode::E2002, span).with_arg(interner.lookup(name)),
            );
            return pool.unresolved(name);
        }

        let expected = symbols.type_params(name).len();
        if args.is_empty() {
            // Raw use.
            return pool.class(name);
        }
        if !self.check_arity(name, expected, args.len(), span) {
            return pool.class(name);
        }
        let args: Vec<Idx> = args.iter().map(|a| self.lower(a)).collect();
        let ty = pool.applied(name, args);
        self.uses.push(BoundUse {
            member: self.member,
            span,
            ty,
        });
        ty
    }

    fn check_arity(&mut self, name: Name, expected: usize, found: usize, span: Span) -> bool {
        if expected == found || found == 0 {
            return true;
        }
        self.sink.report(
            Diagnostic::error(ErrorCode::E2007, span)
                .with_arg(self.pipeline.interner.lookup(name))
                .with_arg(expected)
                .with_arg(found),
        );
        false
    }

    fn bounds(&mut self, params: &[GenericParam]) {
        for param in params {
            let bounds: Vec<Idx> = param.bounds.iter().map(|b| self.lower(b)).collect();
            self.pipeline.pool.set_bounds(param.id, bounds);
        }
    }
}

pub(super) fn resolve_member_types(
    pipeline: &Pipeline<'_>,
    unit: &mut CompilationUnit,
    member: MemberId,
    sink: &mut dyn DiagnosticSink,
) {
    let scope = TypeScope::for_member(&unit.members, member);
    let symbol = unit.symbol(member);
    let m = unit.members.get(member);
    let name = m.name;
    let mut lowerer = TypeLowerer::new(pipeline, scope, member, sink);

    match &m.kind {
        MemberKind::Class {
            type_params,
            superclass,
            interfaces,
            ..
        } => {
            lowerer.bounds(type_params);
            let super_ty = superclass.as_ref().map(|s| lowerer.lower(s));
            let interface_tys: Vec<Idx> = interfaces.iter().map(|i| lowerer.lower(i)).collect();
            let ty = self_type(pipeline.pool, pipeline.symbols, name);
            let type_param_ids = type_params.iter().map(|p| p.id).collect();

            pipeline
                .symbols
                .publish_class(symbol, super_ty, interface_tys.clone());
            pipeline.symbols.publish_signature(
                symbol,
                Signature {
                    ty,
                    params: SmallVec::new(),
                    type_params: type_param_ids,
                },
            );
            let uses = lowerer.uses;
            let m = unit.members.get_mut(member);
            m.ty = ty;
            if let MemberKind::Class {
                super_ty: slot,
                interface_tys: islot,
                ..
            } = &mut m.kind
            {
                *slot = super_ty;
                *islot = interface_tys;
            }
            unit.bound_uses.extend(uses);
        }
        MemberKind::Field { .. } => {
            let ty = lowerer.lower(&m.declared);
            pipeline.symbols.publish_signature(
                symbol,
                Signature {
                    ty,
                    ..Signature::default()
                },
            );
            let uses = lowerer.uses;
            unit.members.get_mut(member).ty = ty;
            unit.bound_uses.extend(uses);
        }
        MemberKind::Method {
            type_params,
            params,
            ..
        } => {
            lowerer.bounds(type_params);
            let param_tys: SmallVec<[Idx; 4]> =
                params.iter().map(|p| lowerer.lower(&p.declared)).collect();
            // No written return type means the method returns nothing.
            let ret = match &m.declared {
                ParsedType::Infer => Idx::VOID,
                declared => lowerer.lower(declared),
            };
            pipeline.symbols.publish_signature(
                symbol,
                Signature {
                    ty: ret,
                    params: param_tys.clone(),
                    type_params: type_params.iter().map(|p| p.id).collect(),
                },
            );
            let uses = lowerer.uses;
            let m = unit.members.get_mut(member);
            m.ty = ret;
            if let MemberKind::Method { params, .. } = &mut m.kind {
                for (param, ty) in params.iter_mut().zip(param_tys) {
                    param.ty = ty;
                }
            }
            unit.bound_uses.extend(uses);
        }
    }
}
