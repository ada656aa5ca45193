//! Type relations: identity, subtyping and subclassing.
//!
//! Variance decides direction:
//!
//! | Supertype side | Accepts `sub` when |
//! |---|---|
//! | covariant variable / `? extends B` | `B ⊒ sub` |
//! | contravariant variable / `? super B` | `sub ⊒ B` |
//! | invariant variable | `sub` is the same variable |
//! | `?` | always |
//!
//! `any` and unresolved placeholders relate in both directions so a
//! reported error does not cascade.

use kiln_ir::{Name, Variance};

use crate::stack::ensure_sufficient_stack;
use crate::{
    ancestors, concrete_type, find_ancestor, ClassHierarchy, Idx, Pool, TypeContext, TypeData,
    TypeError, TypeParamId,
};

/// Bound-following recursion deeper than this is treated as unrelated.
const MAX_DEPTH: u32 = 64;

/// Exact type identity.
#[inline]
pub fn is_same_type(a: Idx, b: Idx) -> bool {
    a == b
}

/// Whether a value of type `sub` may be used where `sup` is expected.
pub fn is_super_type_of(pool: &Pool, hierarchy: &dyn ClassHierarchy, sup: Idx, sub: Idx) -> bool {
    Relate { pool, hierarchy }.super_type(sup, sub, 0)
}

/// Whether `sub`'s class is `sup`'s class or inherits from it, ignoring
/// type arguments.
pub fn is_super_class_of(pool: &Pool, hierarchy: &dyn ClassHierarchy, sup: Idx, sub: Idx) -> bool {
    Relate { pool, hierarchy }.super_class(sup, sub, 0)
}

/// Check `arg` against the bounds of `param`, with bounds instantiated
/// under `ctx`.
pub fn check_bound(
    pool: &Pool,
    hierarchy: &dyn ClassHierarchy,
    param: TypeParamId,
    arg: Idx,
    ctx: &TypeContext,
) -> Result<(), TypeError> {
    let rel = Relate { pool, hierarchy };
    for &bound in &pool.param(param).bounds {
        let bound = concrete_type(pool, bound, ctx);
        let ok = match pool.get(arg) {
            TypeData::Wildcard {
                variance: Variance::Covariant,
                bound: upper,
            } => rel.super_type(bound, upper, 0) || rel.super_type(upper, bound, 0),
            TypeData::Wildcard { .. } => true,
            _ => rel.super_type(bound, arg, 0),
        };
        if !ok {
            return Err(TypeError::BoundViolation { param, arg, bound });
        }
    }
    Ok(())
}

struct Relate<'a> {
    pool: &'a Pool,
    hierarchy: &'a dyn ClassHierarchy,
}

impl Relate<'_> {
    fn super_type(&self, sup: Idx, sub: Idx, depth: u32) -> bool {
        if sup == sub || self.pool.is_lenient(sup) || self.pool.is_lenient(sub) {
            return true;
        }
        if depth > MAX_DEPTH {
            return false;
        }
        ensure_sufficient_stack(|| self.super_type_structural(sup, sub, depth + 1))
    }

    fn super_type_structural(&self, sup: Idx, sub: Idx, depth: u32) -> bool {
        let sup_data = self.pool.get(sup);
        match sup_data {
            TypeData::Var { param, variance } => {
                let bound = self.pool.upper_bound(param);
                return match variance {
                    Variance::Covariant => self.super_type(bound, sub, depth),
                    Variance::Contravariant => self.super_type(sub, bound, depth),
                    Variance::Invariant => false,
                };
            }
            TypeData::Wildcard { .. } => return self.contains(sup, sub, depth),
            _ => {}
        }

        match self.pool.get(sub) {
            TypeData::Var { param, .. } => {
                return self
                    .pool
                    .param(param)
                    .bounds
                    .iter()
                    .any(|&b| self.super_type(sup, b, depth));
            }
            TypeData::Wildcard {
                variance: Variance::Covariant,
                bound,
            } => return self.super_type(sup, bound, depth),
            TypeData::Wildcard { .. } => return false,
            _ => {}
        }

        match sup_data {
            TypeData::Class(base) => find_ancestor(self.pool, self.hierarchy, sub, base).is_some(),
            TypeData::Applied { base, args } => {
                let Some(anc) = find_ancestor(self.pool, self.hierarchy, sub, base) else {
                    return false;
                };
                let anc_args = self.pool.args(anc);
                if anc_args.is_empty() {
                    // Raw use of a generic class.
                    return true;
                }
                let params = self.hierarchy.type_params(base);
                args.iter()
                    .zip(anc_args.iter())
                    .enumerate()
                    .all(|(i, (&sup_arg, &sub_arg))| {
                        let declared = params
                            .get(i)
                            .map_or(Variance::Invariant, |&p| self.pool.param(p).variance);
                        self.argument_contains(sup_arg, sub_arg, declared, depth)
                    })
            }
            _ => false,
        }
    }

    /// Whether type argument `sup_arg` admits `sub_arg` for a class
    /// parameter declared with `declared` variance.
    fn argument_contains(&self, sup_arg: Idx, sub_arg: Idx, declared: Variance, depth: u32) -> bool {
        if sup_arg == sub_arg || self.pool.is_lenient(sup_arg) || self.pool.is_lenient(sub_arg) {
            return true;
        }
        if matches!(self.pool.get(sup_arg), TypeData::Wildcard { .. }) {
            return self.contains(sup_arg, sub_arg, depth);
        }
        if matches!(self.pool.get(sub_arg), TypeData::Wildcard { .. }) {
            return false;
        }
        match declared {
            Variance::Covariant => self.super_type(sup_arg, sub_arg, depth),
            Variance::Contravariant => self.super_type(sub_arg, sup_arg, depth),
            Variance::Invariant => false,
        }
    }

    /// Wildcard containment: does wildcard `sup` admit `sub`?
    fn contains(&self, sup: Idx, sub: Idx, depth: u32) -> bool {
        let TypeData::Wildcard { variance, bound } = self.pool.get(sup) else {
            return false;
        };
        let sub_data = self.pool.get(sub);
        match variance {
            Variance::Invariant => true,
            Variance::Covariant => {
                let upper = match sub_data {
                    TypeData::Wildcard {
                        variance: Variance::Covariant,
                        bound,
                    } => bound,
                    TypeData::Wildcard { .. } => Idx::ANY,
                    _ => sub,
                };
                // `? extends any` admits everything, including `?`.
                bound == Idx::ANY || (upper != Idx::ANY && self.super_type(bound, upper, depth))
            }
            Variance::Contravariant => match sub_data {
                TypeData::Wildcard {
                    variance: Variance::Contravariant,
                    bound: lower,
                } => self.super_type(lower, bound, depth),
                TypeData::Wildcard { .. } => false,
                _ => self.super_type(sub, bound, depth),
            },
        }
    }

    fn super_class(&self, sup: Idx, sub: Idx, depth: u32) -> bool {
        if sup == sub || self.pool.is_lenient(sup) || self.pool.is_lenient(sub) {
            return true;
        }
        if depth > MAX_DEPTH {
            return false;
        }
        let Some(target) = self.erasure(sup) else {
            return false;
        };
        match self.pool.get(sub) {
            TypeData::Var { param, .. } => self
                .pool
                .param(param)
                .bounds
                .iter()
                .any(|&b| self.super_class(sup, b, depth + 1)),
            TypeData::Wildcard { bound, .. } => self.super_class(sup, bound, depth + 1),
            _ => ancestors(self.pool, self.hierarchy, sub)
                .into_iter()
                .any(|anc| self.pool.base_name(anc) == Some(target)),
        }
    }

    fn erasure(&self, ty: Idx) -> Option<Name> {
        let mut current = ty;
        for _ in 0..MAX_DEPTH {
            match self.pool.get(current) {
                TypeData::Class(name) | TypeData::Applied { base: name, .. } => return Some(name),
                TypeData::Var { param, .. } => current = self.pool.upper_bound(param),
                TypeData::Wildcard { bound, .. } => current = bound,
                _ => return None,
            }
        }
        None
    }
}
