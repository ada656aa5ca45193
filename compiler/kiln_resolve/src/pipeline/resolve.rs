//! resolve: binds names, types every expression and picks overloads.

use kiln_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use kiln_ir::{BinaryOp, ExprId, ExprKind, MatchArm, Modifiers, Name, ParsedType, Span, UnaryOp, Variance};
use kiln_patterns::{literal_type, GroupArm, MatchGroup, PatId, PatKind, PatternCompiler};
use kiln_types::member::{suppresses_warnings, Annotation, AnnotationKind, MemberId, MemberKind};
use kiln_types::{
    ancestors, concrete_type, ensure_sufficient_stack, is_super_type_of, Idx, TypeContext, TypeData,
};

use super::overload::{self, OverloadError};
use super::types::{TypeLowerer, TypeScope};
use super::Pipeline;
use crate::{BoundUse, CompilationUnit, Resolution, Symbol, SymbolId, SymbolKind};

pub(super) fn resolve_member(
    pipeline: &Pipeline<'_>,
    unit: &mut CompilationUnit,
    member: MemberId,
    sink: &mut dyn DiagnosticSink,
) {
    resolve_annotations(pipeline, unit, member, sink);

    let m = unit.members.get(member);
    let Some(body) = m.body() else {
        return;
    };
    let class_member = unit.members.get(unit.members.top_level(member));
    let suppress = suppresses_warnings(m) || suppresses_warnings(class_member);
    let locals = m.params().iter().map(|p| (p.name, p.ty)).collect();
    let class_name = class_member.name;
    let class_ty = class_member.ty;
    let scope = TypeScope::for_member(&unit.members, member);

    let mut resolver = Resolver {
        pipeline,
        unit: &mut *unit,
        sink: &mut *sink,
        class_name,
        class_ty,
        scope,
        member,
        locals,
        suppress,
        uses: Vec::new(),
    };
    resolver.expr(body);
    let uses = resolver.uses;
    unit.bound_uses.extend(uses);
}

/// Annotations not recognised as built-ins must name an annotation class.
fn resolve_annotations(
    pipeline: &Pipeline<'_>,
    unit: &mut CompilationUnit,
    member: MemberId,
    sink: &mut dyn DiagnosticSink,
) {
    let resolve = |annotation: &mut Annotation, sink: &mut dyn DiagnosticSink| {
        if annotation.kind != AnnotationKind::Unresolved {
            return;
        }
        match pipeline.symbols.class_modifiers(annotation.name) {
            Some(modifiers) if modifiers.contains(Modifiers::ANNOTATION) => {
                annotation.kind = AnnotationKind::User(annotation.name);
            }
            _ => sink.report(
                Diagnostic::error(ErrorCode::E4007, annotation.span)
                    .with_arg(pipeline.interner.lookup(annotation.name)),
            ),
        }
    };
    let m = unit.members.get_mut(member);
    for annotation in &mut m.annotations {
        resolve(annotation, sink);
    }
    if let MemberKind::Method { params, .. } = &mut m.kind {
        for annotation in params.iter_mut().flat_map(|p| p.annotations.iter_mut()) {
            resolve(annotation, sink);
        }
    }
}

struct Resolver<'p, 'u> {
    pipeline: &'p Pipeline<'p>,
    unit: &'u mut CompilationUnit,
    sink: &'u mut dyn DiagnosticSink,
    class_name: Name,
    class_ty: Idx,
    scope: TypeScope,
    member: MemberId,
    /// Innermost last.
    locals: Vec<(Name, Idx)>,
    /// Deprecation warnings are silenced.
    suppress: bool,
    uses: Vec<BoundUse>,
}

impl Resolver<'_, '_> {
    fn expr(&mut self, id: ExprId) -> Idx {
        if !id.is_valid() {
            return Idx::VOID;
        }
        let ty = ensure_sufficient_stack(|| self.expr_kind(id));
        self.unit.expr_types.insert(id, ty);
        ty
    }

    fn expr_kind(&mut self, id: ExprId) -> Idx {
        let span = self.unit.arena.span(id);
        match self.unit.arena.kind(id).clone() {
            ExprKind::Literal(lit) => literal_type(lit),
            ExprKind::Ident(name) => self.ident(id, name, span),
            ExprKind::This => self.class_ty,
            ExprKind::Field { receiver, name } => self.field(id, receiver, name, span),
            ExprKind::Call {
                receiver,
                method,
                args,
            } => self.call(id, receiver, method, &args, span),
            ExprKind::New { class, args } => self.new_instance(id, &class, &args, span),
            ExprKind::Binary { op, left, right } => self.binary(op, left, right),
            ExprKind::Unary { op, operand } => self.unary(op, operand),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let cond_ty = self.expr(cond);
                self.expect(Idx::BOOL, cond_ty, self.unit.arena.span(cond));
                let then_ty = self.expr(then_branch);
                if !else_branch.is_valid() {
                    return Idx::VOID;
                }
                let else_ty = self.expr(else_branch);
                self.join(then_ty, else_ty)
            }
            ExprKind::Match { scrutinee, arms } => self.match_expr(id, scrutinee, &arms, span),
            ExprKind::Let { name, ty, init } => {
                let init_ty = self.expr(init);
                let declared = match ty {
                    ParsedType::Infer => init_ty,
                    ty => {
                        let declared = self.lower(&ty);
                        self.expect(declared, init_ty, self.unit.arena.span(init));
                        declared
                    }
                };
                self.locals.push((name, declared));
                Idx::VOID
            }
            ExprKind::Block(items) => {
                let mark = self.locals.len();
                let mut ty = Idx::VOID;
                for item in items {
                    ty = self.expr(item);
                }
                self.locals.truncate(mark);
                ty
            }
            ExprKind::Error => Idx::ANY,
        }
    }

    fn ident(&mut self, id: ExprId, name: Name, span: Span) -> Idx {
        if let Some(&(_, ty)) = self.locals.iter().rev().find(|(n, _)| *n == name) {
            self.resolve_as(id, Resolution::Local(name));
            return ty;
        }
        if let Some((sym, symbol, ty)) = self.find_field(self.class_ty, name) {
            self.use_symbol(id, Resolution::Field(sym), &symbol, span);
            return ty;
        }
        if let Some(sym) = self.pipeline.symbols.lookup_class(name) {
            let symbol = self.pipeline.symbols.get(sym);
            self.use_symbol(id, Resolution::Class(sym), &symbol, span);
            return self.pipeline.pool.class(name);
        }
        self.sink.report(
            Diagnostic::error(ErrorCode::E2003, span).with_arg(self.pipeline.interner.lookup(name)),
        );
        self.resolve_as(id, Resolution::Unresolved);
        self.pipeline.pool.unresolved(name)
    }

    fn field(&mut self, id: ExprId, receiver: ExprId, name: Name, span: Span) -> Idx {
        let receiver_ty = self.expr(receiver);
        let pool = self.pipeline.pool;
        if pool.is_lenient(receiver_ty) {
            return Idx::ANY;
        }
        match self.find_field(receiver_ty, name) {
            Some((sym, symbol, ty)) => {
                self.use_symbol(id, Resolution::Field(sym), &symbol, span);
                ty
            }
            None => {
                self.no_member(receiver_ty, name, span);
                Idx::ANY
            }
        }
    }

    fn call(
        &mut self,
        id: ExprId,
        receiver: Option<ExprId>,
        method: Name,
        args: &[ExprId],
        span: Span,
    ) -> Idx {
        let receiver_ty = match receiver {
            Some(r) => self.expr(r),
            None => self.class_ty,
        };
        let arg_tys: Vec<Idx> = args.iter().map(|&a| self.expr(a)).collect();
        let pool = self.pipeline.pool;
        if pool.is_lenient(receiver_ty) {
            return Idx::ANY;
        }
        let class_ty = self.class_type_of(receiver_ty);
        let interner = self.pipeline.interner;
        match overload::select(self.pipeline, class_ty, method, &arg_tys) {
            Ok(selected) => {
                for err in &selected.unbound {
                    self.sink.report(err.to_diagnostic(span, pool, interner));
                }
                let symbol = self.pipeline.symbols.get(selected.id);
                self.use_symbol(id, Resolution::Method(selected.id), &symbol, span);
                selected.ret
            }
            Err(OverloadError::NoSuchMethod) => {
                self.no_member(receiver_ty, method, span);
                Idx::ANY
            }
            Err(OverloadError::NoneApplicable) => {
                let rendered: Vec<String> =
                    arg_tys.iter().map(|&t| pool.display(t, interner)).collect();
                self.sink.report(
                    Diagnostic::error(ErrorCode::E2004, span)
                        .with_arg(interner.lookup(method))
                        .with_arg(rendered.join(", ")),
                );
                self.resolve_as(id, Resolution::Unresolved);
                Idx::ANY
            }
            Err(OverloadError::Ambiguous(count)) => {
                self.sink.report(
                    Diagnostic::error(ErrorCode::E2006, span)
                        .with_arg(interner.lookup(method))
                        .with_arg(count),
                );
                self.resolve_as(id, Resolution::Unresolved);
                Idx::ANY
            }
        }
    }

    fn new_instance(&mut self, id: ExprId, class: &ParsedType, args: &[ExprId], span: Span) -> Idx {
        for &arg in args {
            self.expr(arg);
        }
        let ty = self.lower(class);
        let Some(base) = self.pipeline.pool.base_name(ty) else {
            return ty;
        };
        let Some(sym) = self.pipeline.symbols.lookup_class(base) else {
            return ty;
        };
        let symbol = self.pipeline.symbols.get(sym);
        if symbol.is_abstract() {
            self.sink.report(
                Diagnostic::error(ErrorCode::E4009, span)
                    .with_arg(self.pipeline.interner.lookup(base)),
            );
        }
        self.use_symbol(id, Resolution::Class(sym), &symbol, span);
        ty
    }

    fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> Idx {
        let lt = self.expr(left);
        let rt = self.expr(right);
        let pool = self.pipeline.pool;
        let right_span = self.unit.arena.span(right);
        let left_span = self.unit.arena.span(left);
        if op.is_logical() {
            self.expect(Idx::BOOL, lt, left_span);
            self.expect(Idx::BOOL, rt, right_span);
            return Idx::BOOL;
        }
        if matches!(op, BinaryOp::Eq | BinaryOp::NotEq) {
            return Idx::BOOL;
        }
        if pool.is_lenient(lt) || pool.is_lenient(rt) {
            return if op.is_comparison() { Idx::BOOL } else { Idx::ANY };
        }
        if op == BinaryOp::Add && (lt == Idx::STR || rt == Idx::STR) {
            return Idx::STR;
        }
        let integral = matches!(
            op,
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr
        );
        let numeric = |t: Idx| t == Idx::INT || (t == Idx::FLOAT && !integral);
        let mut ok = true;
        for (ty, span) in [(lt, left_span), (rt, right_span)] {
            if !numeric(ty) {
                self.mismatch(Idx::INT, ty, span);
                ok = false;
            }
        }
        if op.is_comparison() {
            Idx::BOOL
        } else if !ok {
            Idx::ANY
        } else if lt == Idx::FLOAT || rt == Idx::FLOAT {
            Idx::FLOAT
        } else {
            Idx::INT
        }
    }

    fn unary(&mut self, op: UnaryOp, operand: ExprId) -> Idx {
        let ty = self.expr(operand);
        let span = self.unit.arena.span(operand);
        if self.pipeline.pool.is_lenient(ty) {
            return if op == UnaryOp::Not { Idx::BOOL } else { ty };
        }
        match op {
            UnaryOp::Not => {
                self.expect(Idx::BOOL, ty, span);
                Idx::BOOL
            }
            UnaryOp::Neg if ty == Idx::INT || ty == Idx::FLOAT => ty,
            UnaryOp::BitNot if ty == Idx::INT => ty,
            UnaryOp::Neg | UnaryOp::BitNot => {
                self.mismatch(Idx::INT, ty, span);
                Idx::ANY
            }
        }
    }

    fn match_expr(&mut self, id: ExprId, scrutinee: ExprId, arms: &[MatchArm], span: Span) -> Idx {
        let subject = self.expr(scrutinee);
        let pipeline = *self.pipeline;
        let compiler = PatternCompiler::new(pipeline.pool, pipeline.symbols, pipeline.interner);
        let mut group = MatchGroup::new(subject, span);
        let mut result: Option<Idx> = None;

        for arm in arms {
            let unit = &mut *self.unit;
            let raw = unit.patterns.import(&unit.arena, arm.pattern);
            let pattern = if self.unknown_classes(raw) {
                None
            } else {
                compiler.type_arm(&mut self.unit.patterns, raw, subject, &mut *self.sink)
            };
            group.arms.push(GroupArm {
                pattern,
                span: arm.span,
            });

            let mark = self.locals.len();
            if let Some(typed) = pattern {
                self.locals.extend(self.unit.patterns.bindings(typed));
            }
            let body_ty = self.expr(arm.body);
            self.locals.truncate(mark);
            result = Some(match result {
                None => body_ty,
                Some(prev) => self.join(prev, body_ty),
            });
        }
        self.unit.match_groups.insert(id, group);
        result.unwrap_or(Idx::VOID)
    }

    /// Report deconstructed classes that do not exist. Such an arm is not
    /// typed at all.
    fn unknown_classes(&mut self, pattern: PatId) -> bool {
        let mut unknown = false;
        let mut stack = vec![pattern];
        while let Some(p) = stack.pop() {
            match self.unit.patterns.kind(p).clone() {
                PatKind::Deconstruct { class, fields } => {
                    if self.pipeline.symbols.lookup_class(class).is_none() {
                        self.sink.report(
                            Diagnostic::error(ErrorCode::E2003, self.unit.patterns.span(p))
                                .with_arg(self.pipeline.interner.lookup(class)),
                        );
                        unknown = true;
                    }
                    stack.extend(fields);
                }
                PatKind::Binding { inner, .. } => stack.extend(inner),
                PatKind::Wildcard | PatKind::Constant(_) => {}
            }
        }
        unknown
    }

    // Helpers

    fn lower(&mut self, ty: &ParsedType) -> Idx {
        let mut lowerer = TypeLowerer::new(self.pipeline, self.scope.clone(), self.member, &mut *self.sink);
        let idx = lowerer.lower(ty);
        self.uses.append(&mut lowerer.uses);
        idx
    }

    /// The class type whose members a value of `ty` exposes.
    fn class_type_of(&self, ty: Idx) -> Idx {
        let pool = self.pipeline.pool;
        match pool.get(ty) {
            TypeData::Var { param, .. } => pool.upper_bound(param),
            TypeData::Wildcard {
                variance: Variance::Covariant,
                bound,
            } => bound,
            _ => ty,
        }
    }

    /// A field named `name` visible on `receiver`, typed for that receiver.
    fn find_field(&self, receiver: Idx, name: Name) -> Option<(SymbolId, Symbol, Idx)> {
        let Pipeline { pool, symbols, .. } = *self.pipeline;
        let receiver = self.class_type_of(receiver);
        ancestors(pool, symbols, receiver).into_iter().find_map(|anc| {
            let base = pool.base_name(anc)?;
            let (sym, symbol) = symbols
                .members_named(base, name, SymbolKind::Field)
                .into_iter()
                .next()?;
            let ctx = TypeContext::from_class_args(symbols, base, &pool.args(anc));
            let ty = concrete_type(pool, symbol.ty(), &ctx);
            Some((sym, symbol, ty))
        })
    }

    fn no_member(&mut self, receiver: Idx, name: Name, span: Span) {
        let Pipeline { pool, interner, .. } = *self.pipeline;
        self.sink.report(
            Diagnostic::error(ErrorCode::E2010, span)
                .with_arg(pool.display(receiver, interner))
                .with_arg(interner.lookup(name)),
        );
    }

    fn resolve_as(&mut self, id: ExprId, resolution: Resolution) {
        self.unit.resolutions.insert(id, resolution);
    }

    /// Record a use and warn if the target is deprecated. Uses inside the
    /// declaring class do not warn.
    fn use_symbol(&mut self, id: ExprId, resolution: Resolution, symbol: &Symbol, span: Span) {
        self.resolve_as(id, resolution);
        let inside = symbol.owner == Some(self.class_name)
            || (symbol.kind == SymbolKind::Class && symbol.name == self.class_name);
        if symbol.deprecated && !self.suppress && !inside {
            self.sink.report(
                Diagnostic::of(ErrorCode::E4008, span)
                    .with_arg(self.pipeline.interner.lookup(symbol.name)),
            );
        }
    }

    fn expect(&mut self, expected: Idx, found: Idx, span: Span) {
        if !is_super_type_of(self.pipeline.pool, self.pipeline.symbols, expected, found) {
            self.mismatch(expected, found, span);
        }
    }

    fn mismatch(&mut self, expected: Idx, found: Idx, span: Span) {
        let Pipeline { pool, interner, .. } = *self.pipeline;
        self.sink.report(
            Diagnostic::error(ErrorCode::E2001, span)
                .with_arg(pool.display(expected, interner))
                .with_arg(pool.display(found, interner)),
        );
    }

    /// Common type of two branches: the wider one if they are related,
    /// otherwise `any`.
    fn join(&self, a: Idx, b: Idx) -> Idx {
        let Pipeline { pool, symbols, .. } = *self.pipeline;
        if a == b || b == Idx::VOID {
            a
        } else if a == Idx::VOID {
            b
        } else if is_super_type_of(pool, symbols, a, b) {
            a
        } else if is_super_type_of(pool, symbols, b, a) {
            b
        } else {
            Idx::ANY
        }
    }
}
