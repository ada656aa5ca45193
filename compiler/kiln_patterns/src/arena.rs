//! Typed pattern storage.
//!
//! Patterns are imported from the syntax arena into a [`PatternArena`] and
//! then typed against their subject. Typing never mutates a node: it
//! allocates a typed copy and returns the new id, so an untyped pattern can
//! be typed again against another subject.

use kiln_ir::{ExprArena, Literal, Name, PatternId, PatternKind, Span};
use kiln_types::Idx;

/// Index of a pattern node in a [`PatternArena`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct PatId(u32);

impl PatId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// `Unbound → Typed → Compiled`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum PatternState {
    Unbound,
    Typed,
    Compiled,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum PatKind {
    Wildcard,
    Constant(Literal),
    Binding { name: Name, inner: Option<PatId> },
    Deconstruct { class: Name, fields: Vec<PatId> },
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PatternNode {
    pub kind: PatKind,
    pub span: Span,
    /// Type of values this pattern matches; `NONE` until typed.
    pub(crate) ty: Idx,
    /// Type of the value being matched; `NONE` until typed.
    pub(crate) subject: Idx,
    /// Class of the subject type, when it is a class type.
    pub(crate) own_class: Option<Name>,
    pub(crate) state: PatternState,
}

#[derive(Clone, Default, Debug)]
pub struct PatternArena {
    nodes: Vec<PatternNode>,
}

impl PatternArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, node: PatternNode) -> PatId {
        let raw = u32::try_from(self.nodes.len())
            .unwrap_or_else(|_| panic!("pattern arena exceeded u32::MAX nodes"));
        self.nodes.push(node);
        PatId(raw)
    }

    fn alloc(&mut self, kind: PatKind, span: Span) -> PatId {
        // A wildcard is typed from birth: it matches every subject as `any`.
        let (ty, state) = match kind {
            PatKind::Wildcard => (Idx::ANY, PatternState::Typed),
            _ => (Idx::NONE, PatternState::Unbound),
        };
        self.push(PatternNode {
            kind,
            span,
            ty,
            subject: Idx::NONE,
            own_class: None,
            state,
        })
    }

    pub fn wildcard(&mut self, span: Span) -> PatId {
        self.alloc(PatKind::Wildcard, span)
    }

    pub fn constant(&mut self, value: Literal, span: Span) -> PatId {
        self.alloc(PatKind::Constant(value), span)
    }

    pub fn binding(&mut self, name: Name, inner: Option<PatId>, span: Span) -> PatId {
        self.alloc(PatKind::Binding { name, inner }, span)
    }

    pub fn deconstruct(&mut self, class: Name, fields: Vec<PatId>, span: Span) -> PatId {
        self.alloc(PatKind::Deconstruct { class, fields }, span)
    }

    /// Copy a raw syntax pattern (and its subpatterns) into this arena.
    pub fn import(&mut self, syntax: &ExprArena, id: PatternId) -> PatId {
        let pattern = syntax.pattern(id);
        let span = pattern.span;
        match &pattern.kind {
            PatternKind::Wildcard => self.wildcard(span),
            PatternKind::Constant(lit) => self.constant(*lit, span),
            PatternKind::Binding { name, inner } => {
                let inner = inner.map(|p| self.import(syntax, p));
                self.binding(*name, inner, span)
            }
            PatternKind::Deconstruct { class, fields } => {
                let fields = fields.iter().map(|&f| self.import(syntax, f)).collect();
                self.deconstruct(*class, fields, span)
            }
        }
    }

    #[inline]
    pub fn node(&self, id: PatId) -> &PatternNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: PatId) -> &PatKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: PatId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn state(&self, id: PatId) -> PatternState {
        self.nodes[id.index()].state
    }

    pub(crate) fn mark_compiled(&mut self, id: PatId) {
        self.nodes[id.index()].state = PatternState::Compiled;
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Type of values the pattern matches. The wildcard's is always `any`.
    pub fn ty(&self, id: PatId) -> Idx {
        match self.kind(id) {
            PatKind::Wildcard => Idx::ANY,
            _ => self.node(id).ty,
        }
    }

    /// Type of the value the pattern was typed against.
    pub fn subject(&self, id: PatId) -> Idx {
        self.node(id).subject
    }

    pub fn is_wildcard(&self, id: PatId) -> bool {
        matches!(self.kind(id), PatKind::Wildcard)
    }

    /// Matches every value of its subject type.
    pub fn is_irrefutable(&self, id: PatId) -> bool {
        match self.kind(id) {
            PatKind::Wildcard => true,
            PatKind::Constant(_) => false,
            PatKind::Binding { inner, .. } => inner.map_or(true, |p| self.is_irrefutable(p)),
            PatKind::Deconstruct { class, fields } => {
                self.is_own_class(id, *class) && fields.iter().all(|&f| self.is_irrefutable(f))
            }
        }
    }

    /// A single pattern is exhaustive when it alone covers its subject type.
    pub fn is_exhaustive(&self, id: PatId) -> bool {
        self.is_irrefutable(id)
    }

    /// Whether the pattern fits jump-table or branch-chain lowering: one
    /// test of the subject itself decides it.
    pub fn is_switchable(&self, id: PatId) -> bool {
        match self.kind(id) {
            PatKind::Wildcard | PatKind::Constant(_) => true,
            PatKind::Binding { inner, .. } => inner.map_or(true, |p| {
                matches!(self.kind(p), PatKind::Wildcard | PatKind::Constant(_))
            }),
            PatKind::Deconstruct { fields, .. } => fields.iter().all(|&f| self.is_irrefutable(f)),
        }
    }

    /// Names bound by the pattern with their types, in source order.
    pub fn bindings(&self, id: PatId) -> Vec<(Name, Idx)> {
        let mut out = Vec::new();
        self.collect_bindings(id, &mut out);
        out
    }

    fn collect_bindings(&self, id: PatId, out: &mut Vec<(Name, Idx)>) {
        match self.kind(id) {
            PatKind::Wildcard | PatKind::Constant(_) => {}
            PatKind::Binding { name, inner } => {
                let ty = match self.node(id).subject {
                    ty if ty.is_none() => Idx::ANY,
                    ty => ty,
                };
                out.push((*name, ty));
                if let Some(inner) = inner {
                    self.collect_bindings(*inner, out);
                }
            }
            PatKind::Deconstruct { fields, .. } => {
                for &field in fields {
                    self.collect_bindings(field, out);
                }
            }
        }
    }

    /// The deconstructed class is the subject's own class, so no instance
    /// test is needed.
    pub(crate) fn is_own_class(&self, id: PatId, class: Name) -> bool {
        self.node(id).own_class == Some(class)
    }
}

#[cfg(test)]
mod tests;
