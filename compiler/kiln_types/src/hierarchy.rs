//! The seam between the type model and whatever stores class declarations.
//!
//! Supertypes and components are expressed in terms of the class's own type
//! variables; the helpers here instantiate them for a concrete type.

use rustc_hash::FxHashSet;

use kiln_ir::Name;

use crate::{concrete_type, Idx, Pool, TypeContext, TypeParamId};

/// Class-level facts the type model needs but does not own.
pub trait ClassHierarchy {
    /// Declared superclass, written over the class's own type variables.
    fn superclass(&self, class: Name) -> Option<Idx>;

    fn interfaces(&self, class: Name) -> Vec<Idx>;

    fn type_params(&self, class: Name) -> Vec<TypeParamId>;

    /// Permitted direct subclasses if `class` is closed (sealed).
    fn closed_variants(&self, class: Name) -> Option<Vec<Name>>;

    /// `class` has no direct instances (abstract class or interface).
    fn is_abstract(&self, class: Name) -> bool;

    /// Deconstruction components, in declaration order.
    fn components(&self, class: Name) -> Vec<Idx>;
}

/// `class<T1, ..., Tn>` over the class's own type variables.
pub fn self_type(pool: &Pool, hierarchy: &dyn ClassHierarchy, class: Name) -> Idx {
    let params = hierarchy.type_params(class);
    pool.applied(class, params.into_iter().map(|p| pool.var(p)))
}

/// Superclass and interfaces of `ty`, instantiated with `ty`'s arguments.
pub fn direct_supertypes(pool: &Pool, hierarchy: &dyn ClassHierarchy, ty: Idx) -> Vec<Idx> {
    let Some(base) = pool.base_name(ty) else {
        return Vec::new();
    };
    let ctx = TypeContext::from_class_args(hierarchy, base, &pool.args(ty));
    hierarchy
        .superclass(base)
        .into_iter()
        .chain(hierarchy.interfaces(base))
        .map(|sup| concrete_type(pool, sup, &ctx))
        .collect()
}

/// `ty` followed by every class type it inherits from, breadth first.
///
/// Each class appears once even if reachable along several paths, and a
/// cyclic hierarchy terminates.
pub fn ancestors(pool: &Pool, hierarchy: &dyn ClassHierarchy, ty: Idx) -> Vec<Idx> {
    let mut seen = FxHashSet::default();
    let mut out = Vec::new();
    let mut queue = std::collections::VecDeque::from([ty]);
    while let Some(current) = queue.pop_front() {
        let Some(base) = pool.base_name(current) else {
            continue;
        };
        if !seen.insert(base) {
            continue;
        }
        out.push(current);
        queue.extend(direct_supertypes(pool, hierarchy, current));
    }
    out
}

/// The instantiation of `target` among `ty`'s ancestors.
///
/// `find_ancestor(ArrayList<int>, List)` yields `List<int>`.
pub fn find_ancestor(
    pool: &Pool,
    hierarchy: &dyn ClassHierarchy,
    ty: Idx,
    target: Name,
) -> Option<Idx> {
    ancestors(pool, hierarchy, ty)
        .into_iter()
        .find(|&anc| pool.base_name(anc) == Some(target))
}

/// Components of `ty`'s class, instantiated with `ty`'s arguments.
pub fn components_of(pool: &Pool, hierarchy: &dyn ClassHierarchy, ty: Idx) -> Vec<Idx> {
    let Some(base) = pool.base_name(ty) else {
        return Vec::new();
    };
    let ctx = TypeContext::from_class_args(hierarchy, base, &pool.args(ty));
    hierarchy
        .components(base)
        .into_iter()
        .map(|c| concrete_type(pool, c, &ctx))
        .collect()
}

/// The type a value of `scrutinee` has once known to be a `variant`.
///
/// Type arguments flow from the scrutinee through the variant's supertype
/// declaration; parameters the scrutinee does not determine become `?`.
pub fn variant_type(
    pool: &Pool,
    hierarchy: &dyn ClassHierarchy,
    variant: Name,
    scrutinee: Idx,
) -> Idx {
    let params = hierarchy.type_params(variant);
    if params.is_empty() {
        return pool.class(variant);
    }
    let generic = self_type(pool, hierarchy, variant);
    let mut ctx = TypeContext::new();
    if let Some(base) = pool.base_name(scrutinee) {
        if let Some(anc) = find_ancestor(pool, hierarchy, generic, base) {
            ctx.infer(pool, hierarchy, anc, scrutinee);
        }
    }
    for param in params {
        if !ctx.contains(param) {
            ctx.bind(param, pool.any_wildcard());
        }
    }
    concrete_type(pool, generic, &ctx)
}

#[cfg(test)]
mod tests;
