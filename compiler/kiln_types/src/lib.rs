//! Type model for the Kiln compiler.
//!
//! - [`Pool`] interns every type; [`Idx`] is the only handle callers hold.
//! - Type variables carry a [`Variance`](kiln_ir::Variance) that decides
//!   the direction of [`is_super_type_of`].
//! - [`concrete_type`] substitutes through a caller-owned [`TypeContext`]
//!   and always terminates.
//! - Class facts come from a [`ClassHierarchy`] implemented by the symbol
//!   table, so this crate never sees declarations directly.
//! - [`member`] is the shared model of fields, methods and classes.

mod context;
mod error;
mod hierarchy;
mod idx;
pub mod member;
mod pool;
mod relate;
mod stack;
mod subst;
mod variance;

#[cfg(test)]
mod test_support;

pub use context::TypeContext;
pub use error::TypeError;
pub use hierarchy::{
    ancestors, components_of, direct_supertypes, find_ancestor, self_type, variant_type,
    ClassHierarchy,
};
pub use idx::{Idx, TypeParamId};
pub use pool::{Pool, TypeArgs, TypeData, TypeParam};
pub use relate::{check_bound, is_same_type, is_super_class_of, is_super_type_of};
pub use stack::ensure_sufficient_stack;
pub use subst::{as_parameter_type, concrete_type};
pub use variance::{variance_violations, TypePosition};
