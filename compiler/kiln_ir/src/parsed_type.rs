//! Type references as written in source, before resolution.

use std::fmt;

use crate::{Name, Span};

/// Variance of a type parameter or wildcard.
///
/// Declared on class type parameters (`out T`, `in T`) and carried by
/// wildcard arguments (`? extends T`, `? super T`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Variance {
    #[default]
    Invariant,
    Covariant,
    Contravariant,
}

impl Variance {
    /// Variance seen through an enclosing position of variance `outer`.
    #[must_use]
    pub fn compose(self, outer: Variance) -> Variance {
        match (outer, self) {
            (Variance::Invariant, _) | (_, Variance::Invariant) => Variance::Invariant,
            (Variance::Covariant, v) => v,
            (Variance::Contravariant, v) => v.flip(),
        }
    }

    #[must_use]
    pub fn flip(self) -> Variance {
        match self {
            Variance::Invariant => Variance::Invariant,
            Variance::Covariant => Variance::Contravariant,
            Variance::Contravariant => Variance::Covariant,
        }
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variance::Invariant => write!(f, "invariant"),
            Variance::Covariant => write!(f, "covariant"),
            Variance::Contravariant => write!(f, "contravariant"),
        }
    }
}

/// An unresolved type reference.
///
/// Resolve-types replaces every one of these with a pool type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParsedType {
    /// `Name` or `Name<Args...>`. Primitive names (`int`, `string`, ...) are
    /// ordinary named references at this level.
    Named {
        name: Name,
        args: Vec<ParsedType>,
        span: Span,
    },
    /// `?`, `? extends Bound`, `? super Bound`.
    Wildcard {
        variance: Variance,
        bound: Option<Box<ParsedType>>,
        span: Span,
    },
    /// No annotation was written.
    Infer,
}

impl ParsedType {
    pub fn named(name: Name, span: Span) -> Self {
        ParsedType::Named {
            name,
            args: Vec::new(),
            span,
        }
    }

    pub fn generic(name: Name, args: Vec<ParsedType>, span: Span) -> Self {
        ParsedType::Named { name, args, span }
    }

    pub fn wildcard(variance: Variance, bound: Option<ParsedType>, span: Span) -> Self {
        ParsedType::Wildcard {
            variance,
            bound: bound.map(Box::new),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParsedType::Named { span, .. } | ParsedType::Wildcard { span, .. } => *span,
            ParsedType::Infer => Span::DUMMY,
        }
    }
}
