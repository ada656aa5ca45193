//! Substitution of type variables.

use kiln_ir::Variance;

use crate::stack::ensure_sufficient_stack;
use crate::{Idx, Pool, TypeArgs, TypeContext, TypeData};

/// Replace the type variables of `ty` bound in `ctx`.
///
/// One pass only: a variable's replacement is not substituted again, so a
/// binding like `T := List<T>` cannot loop. Variables `ctx` does not bind
/// come back unchanged, and a type with nothing to replace returns its own
/// index.
pub fn concrete_type(pool: &Pool, ty: Idx, ctx: &TypeContext) -> Idx {
    if ctx.is_empty() || ty.is_primitive() || ty.is_none() {
        return ty;
    }
    ensure_sufficient_stack(|| match pool.get(ty) {
        TypeData::Var { param, .. } => ctx.get(param).unwrap_or(ty),
        TypeData::Applied { base, args } => {
            let replaced: TypeArgs = args.iter().map(|&a| concrete_type(pool, a, ctx)).collect();
            if replaced == args {
                ty
            } else {
                pool.intern(TypeData::Applied {
                    base,
                    args: replaced,
                })
            }
        }
        TypeData::Wildcard { variance, bound } => {
            let replaced = concrete_type(pool, bound, ctx);
            if replaced == bound {
                return ty;
            }
            match pool.get(replaced) {
                // `? extends T` with `T := ? extends X` is `? extends X`.
                TypeData::Wildcard {
                    variance: inner,
                    bound: inner_bound,
                } if inner == variance => pool.wildcard(variance, inner_bound),
                TypeData::Wildcard { .. } => pool.any_wildcard(),
                _ if variance == Variance::Invariant => ty,
                _ => pool.wildcard(variance, replaced),
            }
        }
        TypeData::Any
        | TypeData::Void
        | TypeData::Int
        | TypeData::Float
        | TypeData::Bool
        | TypeData::Char
        | TypeData::Str
        | TypeData::Class(_)
        | TypeData::Unresolved(_) => ty,
    })
}

/// The form of `ty` usable as a formal parameter or bound.
///
/// Wildcards yield their bound (`any` for `?`); everything else is itself.
pub fn as_parameter_type(pool: &Pool, ty: Idx) -> Idx {
    match pool.get(ty) {
        TypeData::Wildcard { bound, .. } => bound,
        _ => ty,
    }
}
