//! Applying a subject type to a pattern.

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::{Literal, Name, Span, StringInterner, Variance};
use kiln_types::{
    components_of, is_super_class_of, variant_type, ClassHierarchy, Idx, Pool, TypeData,
};

use crate::{PatId, PatKind, PatternArena, PatternNode, PatternState};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern of type {pattern:?} can never match {subject:?}")]
    TypeMismatch { pattern: Idx, subject: Idx, span: Span },
    #[error("{class:?} has {expected} components, pattern has {found}")]
    Arity {
        class: Name,
        expected: usize,
        found: usize,
        span: Span,
    },
}

impl PatternError {
    pub fn span(&self) -> Span {
        match self {
            PatternError::TypeMismatch { span, .. } | PatternError::Arity { span, .. } => *span,
        }
    }

    pub fn to_diagnostic(&self, pool: &Pool, interner: &StringInterner) -> Diagnostic {
        match *self {
            PatternError::TypeMismatch {
                pattern,
                subject,
                span,
            } => Diagnostic::error(ErrorCode::E3003, span)
                .with_arg(pool.display(pattern, interner))
                .with_arg(pool.display(subject, interner)),
            PatternError::Arity {
                class,
                expected,
                found,
                span,
            } => Diagnostic::error(ErrorCode::E3004, span)
                .with_arg(interner.lookup(class))
                .with_arg(expected)
                .with_arg(found),
        }
    }
}

/// Type of a literal constant.
pub fn literal_type(value: Literal) -> Idx {
    match value {
        Literal::Int(_) => Idx::INT,
        Literal::Float(_) => Idx::FLOAT,
        Literal::Bool(_) => Idx::BOOL,
        Literal::Char(_) => Idx::CHAR,
        Literal::Str(_) => Idx::STR,
    }
}

impl PatternArena {
    /// Type `id` against a subject of type `subject`.
    ///
    /// Returns a new typed node; `id` itself is left as it was. A wildcard
    /// returns itself for every subject.
    pub fn with_type(
        &mut self,
        id: PatId,
        subject: Idx,
        pool: &Pool,
        hierarchy: &dyn ClassHierarchy,
    ) -> Result<PatId, PatternError> {
        let span = self.span(id);
        match self.kind(id).clone() {
            PatKind::Wildcard => Ok(id),
            PatKind::Constant(value) => {
                let ty = literal_type(value);
                if !could_match(pool, hierarchy, subject, ty) {
                    return Err(PatternError::TypeMismatch {
                        pattern: ty,
                        subject,
                        span,
                    });
                }
                Ok(self.typed(PatKind::Constant(value), span, ty, subject, pool))
            }
            PatKind::Binding { name, inner } => {
                let inner = inner
                    .map(|p| self.with_type(p, subject, pool, hierarchy))
                    .transpose()?;
                Ok(self.typed(PatKind::Binding { name, inner }, span, subject, subject, pool))
            }
            PatKind::Deconstruct { class, fields } => {
                let class_ty = pool.class(class);
                if !could_match(pool, hierarchy, subject, class_ty) {
                    return Err(PatternError::TypeMismatch {
                        pattern: class_ty,
                        subject,
                        span,
                    });
                }
                let ty = variant_type(pool, hierarchy, class, subject);
                let components = components_of(pool, hierarchy, ty);
                if components.len() != fields.len() {
                    return Err(PatternError::Arity {
                        class,
                        expected: components.len(),
                        found: fields.len(),
                        span,
                    });
                }
                let fields = fields
                    .iter()
                    .zip(components)
                    .map(|(&field, component)| self.with_type(field, component, pool, hierarchy))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.typed(PatKind::Deconstruct { class, fields }, span, ty, subject, pool))
            }
        }
    }

    fn typed(&mut self, kind: PatKind, span: Span, ty: Idx, subject: Idx, pool: &Pool) -> PatId {
        self.push(PatternNode {
            kind,
            span,
            ty,
            subject,
            own_class: pool.base_name(subject),
            state: PatternState::Typed,
        })
    }
}

/// Whether some value of type `subject` could also have type `pattern`.
fn could_match(pool: &Pool, hierarchy: &dyn ClassHierarchy, subject: Idx, pattern: Idx) -> bool {
    if pool.is_lenient(subject) || pool.is_lenient(pattern) {
        return true;
    }
    match pool.get(subject) {
        TypeData::Var { param, .. } => {
            could_match(pool, hierarchy, pool.upper_bound(param), pattern)
        }
        TypeData::Wildcard {
            variance: Variance::Covariant,
            bound,
        } => could_match(pool, hierarchy, bound, pattern),
        TypeData::Wildcard { .. } => true,
        _ => {
            is_super_class_of(pool, hierarchy, subject, pattern)
                || is_super_class_of(pool, hierarchy, pattern, subject)
        }
    }
}

#[cfg(test)]
mod tests;
