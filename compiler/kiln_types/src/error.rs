//! Typed failures of type-model queries.

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::{Span, StringInterner, Variance};

use crate::{Idx, Pool, TypeParamId, TypePosition};

/// A type-model failure. Callers convert it with [`TypeError::to_diagnostic`]
/// and continue with `any` in place of the offending type.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("type argument {arg:?} violates bound {bound:?} of {param:?}")]
    BoundViolation {
        param: TypeParamId,
        arg: Idx,
        bound: Idx,
    },
    #[error("{variance} type parameter {param:?} in {position} position")]
    VarianceViolation {
        param: TypeParamId,
        variance: Variance,
        position: TypePosition,
    },
    #[error("no binding inferred for {param:?}")]
    Unbound { param: TypeParamId },
}

impl TypeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TypeError::BoundViolation { .. } => ErrorCode::E2008,
            TypeError::VarianceViolation { .. } => ErrorCode::E2009,
            TypeError::Unbound { .. } => ErrorCode::E2005,
        }
    }

    pub fn to_diagnostic(&self, span: Span, pool: &Pool, interner: &StringInterner) -> Diagnostic {
        let param_name = |param: TypeParamId| interner.lookup(pool.param(param).name);
        match *self {
            TypeError::BoundViolation { param, arg, bound } => Diagnostic::error(self.code(), span)
                .with_arg(pool.display(arg, interner))
                .with_arg(pool.display(bound, interner))
                .with_arg(param_name(param)),
            TypeError::VarianceViolation {
                param,
                variance,
                position,
            } => Diagnostic::error(self.code(), span)
                .with_arg(variance)
                .with_arg(param_name(param))
                .with_arg(position),
            TypeError::Unbound { param } => Diagnostic::error(self.code(), span)
                .with_arg(param_name(param))
                .with_arg(interner.lookup(pool.param(param).owner))
                .with_note("the type argument defaults to `any`"),
        }
    }
}
