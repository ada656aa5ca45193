//! Per-unit storage for expressions and raw patterns.

use super::expr::{Expr, ExprId, ExprKind, Literal, Pattern, PatternId, PatternKind};
use crate::Span;

/// Flat storage for one unit's expressions and patterns.
///
/// Nodes are only ever appended. Constant folding allocates the folded node
/// and rewrites the child id stored in the parent, so earlier ids stay valid.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    patterns: Vec<Pattern>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        let raw = u32::try_from(self.exprs.len())
            .unwrap_or_else(|_| panic!("expression arena exceeded u32::MAX nodes"));
        self.exprs.push(Expr::new(kind, span));
        ExprId::new(raw)
    }

    pub fn alloc_pattern(&mut self, kind: PatternKind, span: Span) -> PatternId {
        let raw = u32::try_from(self.patterns.len())
            .unwrap_or_else(|_| panic!("pattern arena exceeded u32::MAX nodes"));
        self.patterns.push(Pattern { kind, span });
        PatternId::new(raw)
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    pub fn expr_mut(&mut self, id: ExprId) -> &mut Expr {
        &mut self.exprs[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: ExprId) -> Span {
        self.exprs[id.index()].span
    }

    #[inline]
    pub fn pattern(&self, id: PatternId) -> &Pattern {
        &self.patterns[id.index()]
    }

    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// The literal stored at `id`, if the node is a literal.
    pub fn literal(&self, id: ExprId) -> Option<Literal> {
        match self.kind(id) {
            ExprKind::Literal(lit) => Some(*lit),
            _ => None,
        }
    }

    /// Direct children of `id`, in evaluation order.
    pub fn children(&self, id: ExprId) -> Vec<ExprId> {
        match self.kind(id) {
            ExprKind::Literal(_) | ExprKind::Ident(_) | ExprKind::This | ExprKind::Error => {
                Vec::new()
            }
            ExprKind::Field { receiver, .. } => vec![*receiver],
            ExprKind::Call { receiver, args, .. } => {
                receiver.iter().chain(args.iter()).copied().collect()
            }
            ExprKind::New { args, .. } | ExprKind::Block(args) => args.clone(),
            ExprKind::Binary { left, right, .. } => vec![*left, *right],
            ExprKind::Unary { operand, .. } => vec![*operand],
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => [*cond, *then_branch, *else_branch]
                .into_iter()
                .filter(|id| id.is_valid())
                .collect(),
            ExprKind::Match { scrutinee, arms } => std::iter::once(*scrutinee)
                .chain(arms.iter().map(|arm| arm.body))
                .collect(),
            ExprKind::Let { init, .. } => vec![*init],
        }
    }

    /// Pre-order walk of the tree rooted at `root`.
    pub fn walk(&self, root: ExprId, mut visit: impl FnMut(ExprId)) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !id.is_valid() {
                continue;
            }
            visit(id);
            let mut children = self.children(id);
            children.reverse();
            stack.extend(children);
        }
    }
}

#[cfg(test)]
mod tests;
