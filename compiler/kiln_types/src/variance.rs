//! Declaration-site variance checking.

use std::fmt;

use kiln_ir::Variance;

use crate::stack::ensure_sufficient_stack;
use crate::{Idx, Pool, TypeData, TypeError};

/// Where in a member signature a type occurs.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypePosition {
    Parameter,
    Return,
    Field,
}

impl TypePosition {
    /// Polarity of the position: parameters consume, returns and fields
    /// produce.
    pub fn variance(self) -> Variance {
        match self {
            TypePosition::Parameter => Variance::Contravariant,
            TypePosition::Return | TypePosition::Field => Variance::Covariant,
        }
    }
}

impl fmt::Display for TypePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypePosition::Parameter => write!(f, "parameter"),
            TypePosition::Return => write!(f, "return"),
            TypePosition::Field => write!(f, "field"),
        }
    }
}

/// Type variables of `ty` whose declared variance conflicts with where they
/// occur, when `ty` sits at `position`.
///
/// Polarity composes through type arguments (using each class parameter's
/// declared variance, looked up by `class_params`) and wildcard bounds. An
/// invariant occurrence is a violation for both covariant and
/// contravariant parameters.
pub fn variance_violations(
    pool: &Pool,
    ty: Idx,
    position: TypePosition,
    class_params: &dyn Fn(kiln_ir::Name) -> Vec<Variance>,
) -> Vec<TypeError> {
    let mut out = Vec::new();
    walk(pool, ty, position.variance(), position, class_params, &mut out);
    out
}

fn walk(
    pool: &Pool,
    ty: Idx,
    polarity: Variance,
    position: TypePosition,
    class_params: &dyn Fn(kiln_ir::Name) -> Vec<Variance>,
    out: &mut Vec<TypeError>,
) {
    if ty.is_primitive() {
        return;
    }
    match pool.get(ty) {
        TypeData::Var { param, variance } => {
            let conflicts = variance != Variance::Invariant && variance != polarity;
            let reported = out.iter().any(
                |e| matches!(e, TypeError::VarianceViolation { param: p, .. } if *p == param),
            );
            if conflicts && !reported {
                out.push(TypeError::VarianceViolation {
                    param,
                    variance,
                    position,
                });
            }
        }
        TypeData::Applied { base, args } => {
            let declared = class_params(base);
            for (i, &arg) in args.iter().enumerate() {
                let inner = match pool.get(arg) {
                    // A use-site wildcard replaces the declared variance.
                    TypeData::Wildcard { variance, .. } => variance.compose(polarity),
                    _ => declared.get(i).copied().unwrap_or_default().compose(polarity),
                };
                ensure_sufficient_stack(|| walk(pool, arg, inner, position, class_params, out));
            }
        }
        TypeData::Wildcard { variance, bound } => {
            if variance != Variance::Invariant {
                walk(pool, bound, polarity, position, class_params, out);
            }
        }
        _ => {}
    }
}
