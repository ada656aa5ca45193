//! Binding contexts for substitution.

use rustc_hash::FxHashMap;

use kiln_ir::{Name, Variance};

use crate::stack::ensure_sufficient_stack;
use crate::{find_ancestor, ClassHierarchy, Idx, Pool, TypeData, TypeError, TypeParamId};

/// Map from type parameter to the type it stands for at one use site.
///
/// Built per call site and owned by the caller; no type ever holds one.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TypeContext {
    bindings: FxHashMap<TypeParamId, Idx>,
}

impl TypeContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `param`, replacing any earlier binding.
    pub fn bind(&mut self, param: TypeParamId, ty: Idx) {
        self.bindings.insert(param, ty);
    }

    pub fn get(&self, param: TypeParamId) -> Option<Idx> {
        self.bindings.get(&param).copied()
    }

    pub fn contains(&self, param: TypeParamId) -> bool {
        self.bindings.contains_key(&param)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Bind `class`'s parameters positionally to `args`.
    ///
    /// A raw use (no arguments) binds nothing.
    pub fn from_class_args(hierarchy: &dyn ClassHierarchy, class: Name, args: &[Idx]) -> Self {
        let mut ctx = Self::new();
        for (param, &arg) in hierarchy.type_params(class).into_iter().zip(args) {
            ctx.bind(param, arg);
        }
        ctx
    }

    /// Context for members declared in `owner`, accessed through `receiver`.
    ///
    /// `owner` may be any ancestor of the receiver's class.
    pub fn for_receiver(
        pool: &Pool,
        hierarchy: &dyn ClassHierarchy,
        receiver: Idx,
        owner: Name,
    ) -> Self {
        match find_ancestor(pool, hierarchy, receiver, owner) {
            Some(anc) => Self::from_class_args(hierarchy, owner, &pool.args(anc)),
            None => Self::new(),
        }
    }

    /// Bind type variables in `param_ty` by matching it against `arg_ty`.
    ///
    /// The first binding of a variable wins; later conflicting arguments
    /// surface as applicability failures, not as rebinding.
    pub fn infer(&mut self, pool: &Pool, hierarchy: &dyn ClassHierarchy, param_ty: Idx, arg_ty: Idx) {
        if param_ty.is_primitive() {
            return;
        }
        ensure_sufficient_stack(|| match pool.get(param_ty) {
            TypeData::Var { param, .. } => {
                if !self.contains(param) {
                    let arg = match pool.get(arg_ty) {
                        TypeData::Wildcard {
                            variance: Variance::Covariant,
                            bound,
                        } => bound,
                        _ => arg_ty,
                    };
                    self.bind(param, arg);
                }
            }
            TypeData::Applied { base, args } => {
                if let Some(anc) = find_ancestor(pool, hierarchy, arg_ty, base) {
                    for (p, a) in args.iter().zip(pool.args(anc)) {
                        self.infer(pool, hierarchy, *p, a);
                    }
                }
            }
            TypeData::Wildcard { bound, .. } => self.infer(pool, hierarchy, bound, arg_ty),
            _ => {}
        });
    }

    /// Bind every parameter of `params` that inference left open to `any`,
    /// returning one error per such parameter.
    pub fn fill_unbound(&mut self, params: &[TypeParamId]) -> Vec<TypeError> {
        let mut errors = Vec::new();
        for &param in params {
            if !self.contains(param) {
                self.bind(param, Idx::ANY);
                errors.push(TypeError::Unbound { param });
            }
        }
        errors
    }
}
