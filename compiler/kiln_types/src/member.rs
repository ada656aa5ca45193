//! The member model: fields, methods and classes after declaration.
//!
//! A [`Member`] is created from declaration syntax when its unit is
//! declared and then advances through [`ResolutionState`] exactly once per
//! stage. Shared behaviour is split into small capability traits, with the
//! default logic in free functions so that members and parameters share it.

use kiln_ir::{Access, ExprId, Modifiers, Name, ParsedType, Span};

use crate::{Idx, TypeParamId};

/// Index of a member in its unit's [`MemberArena`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct MemberId(u32);

impl MemberId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        MemberId(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Per-member progress through the pipeline.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum ResolutionState {
    #[default]
    Unresolved,
    TypesResolved,
    Resolved,
    Checked,
    /// Terminal.
    ConstantsFolded,
}

impl ResolutionState {
    /// The state a member must be in before the stage producing `self` runs.
    pub fn predecessor(self) -> Option<ResolutionState> {
        match self {
            ResolutionState::Unresolved => None,
            ResolutionState::TypesResolved => Some(ResolutionState::Unresolved),
            ResolutionState::Resolved => Some(ResolutionState::TypesResolved),
            ResolutionState::Checked => Some(ResolutionState::Resolved),
            ResolutionState::ConstantsFolded => Some(ResolutionState::Checked),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == ResolutionState::ConstantsFolded
    }
}

/// What an annotation refers to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AnnotationKind {
    Override,
    Deprecated,
    SuppressWarnings,
    /// A user class declared with [`Modifiers::ANNOTATION`].
    User(Name),
    /// Not yet resolved, or failed to resolve.
    Unresolved,
}

impl AnnotationKind {
    /// Kind of a built-in annotation spelled `name`.
    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "Override" => Some(AnnotationKind::Override),
            "Deprecated" => Some(AnnotationKind::Deprecated),
            "SuppressWarnings" => Some(AnnotationKind::SuppressWarnings),
            _ => None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Annotation {
    pub name: Name,
    pub args: Vec<ExprId>,
    pub span: Span,
    pub kind: AnnotationKind,
}

/// A formal parameter of a method.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Param {
    pub name: Name,
    pub declared: ParsedType,
    pub ty: Idx,
    pub annotations: Vec<Annotation>,
    pub span: Span,
}

/// A declared type parameter, with its bounds as written.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct GenericParam {
    pub id: TypeParamId,
    pub name: Name,
    pub bounds: Vec<ParsedType>,
    pub span: Span,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum MemberKind {
    Field {
        init: Option<ExprId>,
    },
    Method {
        type_params: Vec<GenericParam>,
        params: Vec<Param>,
        body: Option<ExprId>,
    },
    Class {
        type_params: Vec<GenericParam>,
        superclass: Option<ParsedType>,
        interfaces: Vec<ParsedType>,
        /// Resolved superclass; `None` until resolve-types or if absent.
        super_ty: Option<Idx>,
        interface_tys: Vec<Idx>,
        permits: Vec<Name>,
        members: Vec<MemberId>,
    },
}

/// A field, method or class.
///
/// `ty` is the field type, the method return type, or the class's own type
/// (`Box<T>` for `class Box<T>`). `declared` is what resolve-types reads.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Member {
    pub name: Name,
    pub span: Span,
    pub kind: MemberKind,
    pub declared: ParsedType,
    pub ty: Idx,
    pub modifiers: Modifiers,
    pub annotations: Vec<Annotation>,
    pub access: Access,
    /// Enclosing class; `None` for top-level classes.
    pub owner: Option<MemberId>,
    pub state: ResolutionState,
}

impl Member {
    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. })
    }

    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, MemberKind::Class { .. })
    }

    /// Method parameters; empty for fields and classes.
    pub fn params(&self) -> &[Param] {
        match &self.kind {
            MemberKind::Method { params, .. } => params,
            _ => &[],
        }
    }

    /// Declared type parameters of a method or class.
    pub fn type_params(&self) -> &[GenericParam] {
        match &self.kind {
            MemberKind::Method { type_params, .. } | MemberKind::Class { type_params, .. } => {
                type_params
            }
            MemberKind::Field { .. } => &[],
        }
    }

    /// The expression evaluated for this member: a field initializer or a
    /// method body.
    pub fn body(&self) -> Option<ExprId> {
        match self.kind {
            MemberKind::Field { init } => init,
            MemberKind::Method { body, .. } => body,
            MemberKind::Class { .. } => None,
        }
    }

    /// Rewrite the field initializer or method body slot.
    pub fn set_body(&mut self, expr: ExprId) {
        match &mut self.kind {
            MemberKind::Field { init } => *init = Some(expr),
            MemberKind::Method { body, .. } => *body = Some(expr),
            MemberKind::Class { .. } => {}
        }
    }
}

/// Storage for one unit's members.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct MemberArena {
    members: Vec<Member>,
}

impl MemberArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, member: Member) -> MemberId {
        let raw = u32::try_from(self.members.len())
            .unwrap_or_else(|_| panic!("member arena exceeded u32::MAX members"));
        self.members.push(member);
        MemberId::new(raw)
    }

    #[inline]
    pub fn get(&self, id: MemberId) -> &Member {
        &self.members[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: MemberId) -> &mut Member {
        &mut self.members[id.index()]
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Ids in declaration order: each class precedes its members.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "alloc keeps the member count within u32"
    )]
    pub fn ids(&self) -> impl Iterator<Item = MemberId> {
        (0..self.members.len()).map(|i| MemberId::new(i as u32))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MemberId, &Member)> {
        self.ids().zip(self.members.iter())
    }

    /// The outermost class enclosing `id` (or `id` itself).
    pub fn top_level(&self, id: MemberId) -> MemberId {
        let mut current = id;
        while let Some(owner) = self.get(current).owner {
            current = owner;
        }
        current
    }
}

// Capabilities

pub trait Named {
    fn name(&self) -> Name;
    fn span(&self) -> Span;
}

pub trait Typed {
    /// Resolved type; [`Idx::NONE`] before resolve-types.
    fn ty(&self) -> Idx;
    fn declared(&self) -> &ParsedType;
}

pub trait Annotated {
    fn annotations(&self) -> &[Annotation];
}

pub trait Modified {
    fn modifiers(&self) -> Modifiers;
}

pub trait AccessControlled {
    fn access(&self) -> Access;
}

impl Named for Member {
    fn name(&self) -> Name {
        self.name
    }

    fn span(&self) -> Span {
        self.span
    }
}

impl Typed for Member {
    fn ty(&self) -> Idx {
        self.ty
    }

    fn declared(&self) -> &ParsedType {
        &self.declared
    }
}

impl Annotated for Member {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

impl Modified for Member {
    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl AccessControlled for Member {
    fn access(&self) -> Access {
        self.access
    }
}

impl Named for Param {
    fn name(&self) -> Name {
        self.name
    }

    fn span(&self) -> Span {
        self.span
    }
}

impl Typed for Param {
    fn ty(&self) -> Idx {
        self.ty
    }

    fn declared(&self) -> &ParsedType {
        &self.declared
    }
}

impl Annotated for Param {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

pub fn has_annotation(item: &impl Annotated, kind: AnnotationKind) -> bool {
    item.annotations().iter().any(|a| a.kind == kind)
}

pub fn is_deprecated(item: &impl Annotated) -> bool {
    has_annotation(item, AnnotationKind::Deprecated)
}

pub fn is_marked_override(item: &impl Annotated) -> bool {
    has_annotation(item, AnnotationKind::Override)
}

/// `@SuppressWarnings` silences warnings raised inside the annotated item.
pub fn suppresses_warnings(item: &impl Annotated) -> bool {
    has_annotation(item, AnnotationKind::SuppressWarnings)
}

pub fn is_static(item: &impl Modified) -> bool {
    item.modifiers().contains(Modifiers::STATIC)
}

pub fn is_final(item: &impl Modified) -> bool {
    item.modifiers().contains(Modifiers::FINAL)
}

pub fn is_abstract(item: &impl Modified) -> bool {
    item.modifiers()
        .intersects(Modifiers::ABSTRACT | Modifiers::INTERFACE)
}

pub fn is_sealed(item: &impl Modified) -> bool {
    item.modifiers().contains(Modifiers::SEALED)
}

/// Whether `overriding` is less visible than the member it overrides.
pub fn is_access_weaker(overriding: &impl AccessControlled, overridden: &impl AccessControlled) -> bool {
    overriding.access() < overridden.access()
}

#[cfg(test)]
mod tests;
