//! Builders for syntax trees in tests.
//!
//! There is no parser in the semantic core, so tests assemble
//! [`SourceUnit`]s directly. Every node gets a fresh span, which keeps
//! distinct diagnostics distinct under deduplication.

use kiln_ir::{
    AnnotationDecl, BinaryOp, ClassDecl, ExprId, ExprKind, FieldDecl, Literal, MatchArm,
    MethodDecl, Name, ParamDecl, ParsedType, PatternId, PatternKind, SharedInterner, SourceUnit,
    Span, TypeParamDecl, UnaryOp, Variance,
};
use kiln_patterns::LoweredMatch;
use kiln_types::member::{Member, MemberId};

use crate::{CodeEmitter, CompilationUnit};

/// Assembles one unit.
pub struct Fixture {
    interner: SharedInterner,
    unit: SourceUnit,
    next_offset: u32,
}

impl Fixture {
    pub fn new(name: &str, interner: &SharedInterner) -> Self {
        Fixture {
            interner: interner.clone(),
            unit: SourceUnit::new(name),
            next_offset: 0,
        }
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    /// A span not used by any other node of this fixture.
    pub fn span(&mut self) -> Span {
        let start = self.next_offset;
        self.next_offset += 4;
        Span::new(start, start + 3)
    }

    // Types

    pub fn ty(&mut self, name: &str) -> ParsedType {
        let span = self.span();
        ParsedType::named(self.name(name), span)
    }

    pub fn generic(&mut self, name: &str, args: Vec<ParsedType>) -> ParsedType {
        let span = self.span();
        ParsedType::generic(self.name(name), args, span)
    }

    /// `? extends bound`
    pub fn extends(&mut self, bound: ParsedType) -> ParsedType {
        let span = self.span();
        ParsedType::wildcard(Variance::Covariant, Some(bound), span)
    }

    /// `? super bound`
    pub fn super_of(&mut self, bound: ParsedType) -> ParsedType {
        let span = self.span();
        ParsedType::wildcard(Variance::Contravariant, Some(bound), span)
    }

    // Expressions

    pub fn expr(&mut self, kind: ExprKind) -> ExprId {
        let span = self.span();
        self.unit.arena.alloc(kind, span)
    }

    pub fn int(&mut self, value: i64) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Int(value)))
    }

    pub fn float(&mut self, value: f64) -> ExprId {
        self.expr(ExprKind::Literal(Literal::float(value)))
    }

    pub fn boolean(&mut self, value: bool) -> ExprId {
        self.expr(ExprKind::Literal(Literal::Bool(value)))
    }

    pub fn string(&mut self, value: &str) -> ExprId {
        let name = self.name(value);
        self.expr(ExprKind::Literal(Literal::Str(name)))
    }

    pub fn ident(&mut self, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Ident(name))
    }

    pub fn this(&mut self) -> ExprId {
        self.expr(ExprKind::This)
    }

    pub fn field(&mut self, receiver: ExprId, name: &str) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Field { receiver, name })
    }

    pub fn call(&mut self, receiver: Option<ExprId>, method: &str, args: Vec<ExprId>) -> ExprId {
        let method = self.name(method);
        self.expr(ExprKind::Call {
            receiver,
            method,
            args,
        })
    }

    pub fn new_object(&mut self, class: ParsedType, args: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::New { class, args })
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.expr(ExprKind::Binary { op, left, right })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> ExprId {
        self.expr(ExprKind::Unary { op, operand })
    }

    pub fn if_else(&mut self, cond: ExprId, then_branch: ExprId, else_branch: Option<ExprId>) -> ExprId {
        self.expr(ExprKind::If {
            cond,
            then_branch,
            else_branch: else_branch.unwrap_or(ExprId::INVALID),
        })
    }

    pub fn let_in(&mut self, name: &str, ty: ParsedType, init: ExprId) -> ExprId {
        let name = self.name(name);
        self.expr(ExprKind::Let { name, ty, init })
    }

    pub fn block(&mut self, items: Vec<ExprId>) -> ExprId {
        self.expr(ExprKind::Block(items))
    }

    pub fn match_on(&mut self, scrutinee: ExprId, arms: Vec<(PatternId, ExprId)>) -> ExprId {
        let arms = arms
            .into_iter()
            .map(|(pattern, body)| {
                let span = self.span();
                MatchArm {
                    pattern,
                    body,
                    span,
                }
            })
            .collect();
        self.expr(ExprKind::Match { scrutinee, arms })
    }

    // Patterns

    fn pattern(&mut self, kind: PatternKind) -> PatternId {
        let span = self.span();
        self.unit.arena.alloc_pattern(kind, span)
    }

    pub fn pat_wild(&mut self) -> PatternId {
        self.pattern(PatternKind::Wildcard)
    }

    pub fn pat_lit(&mut self, value: Literal) -> PatternId {
        self.pattern(PatternKind::Constant(value))
    }

    pub fn pat_bind(&mut self, name: &str, inner: Option<PatternId>) -> PatternId {
        let name = self.name(name);
        self.pattern(PatternKind::Binding { name, inner })
    }

    pub fn pat_class(&mut self, class: &str, fields: Vec<PatternId>) -> PatternId {
        let class = self.name(class);
        self.pattern(PatternKind::Deconstruct { class, fields })
    }

    // Declarations

    pub fn class(&mut self, name: &str) -> ClassDecl {
        let span = self.span();
        ClassDecl::new(self.name(name), span)
    }

    pub fn field_decl(&mut self, name: &str, ty: ParsedType) -> FieldDecl {
        let span = self.span();
        FieldDecl::new(self.name(name), ty, span)
    }

    pub fn method(&mut self, name: &str, ret: ParsedType) -> MethodDecl {
        let span = self.span();
        MethodDecl::new(self.name(name), ret, span)
    }

    pub fn param(&mut self, name: &str, ty: ParsedType) -> ParamDecl {
        let span = self.span();
        ParamDecl::new(self.name(name), ty, span)
    }

    pub fn type_param(&mut self, name: &str) -> TypeParamDecl {
        let span = self.span();
        TypeParamDecl::new(self.name(name), span)
    }

    pub fn annotation(&mut self, name: &str) -> AnnotationDecl {
        let span = self.span();
        AnnotationDecl::new(self.name(name), span)
    }

    pub fn push(&mut self, class: ClassDecl) {
        self.unit.push_class(class);
    }

    pub fn finish(self) -> SourceUnit {
        self.unit
    }
}

/// A [`CodeEmitter`] that records what it was handed, one line per call.
#[derive(Clone, Debug)]
pub struct RecordingEmitter {
    pub events: Vec<String>,
    interner: SharedInterner,
}

impl RecordingEmitter {
    pub fn new(interner: &SharedInterner) -> Self {
        RecordingEmitter {
            events: Vec::new(),
            interner: interner.clone(),
        }
    }
}

impl CodeEmitter for RecordingEmitter {
    fn begin_unit(&mut self, unit: &CompilationUnit) {
        self.events.push(format!("unit {}", unit.name));
    }

    fn emit_member(&mut self, _unit: &CompilationUnit, id: MemberId, member: &Member) {
        let name = self.interner.lookup(member.name);
        self.events.push(format!("member {} {name}", id.index()));
    }

    fn emit_match(&mut self, _unit: &CompilationUnit, expr: ExprId, lowered: &LoweredMatch) {
        self.events
            .push(format!("match {} {:?}", expr.index(), lowered.strategy));
    }
}
