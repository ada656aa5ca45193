//! The type pool: interned storage for every type in a compilation session.
//!
//! Types are immutable once interned. Building a new type (for example by
//! substitution) interns a new entry and hands back a new [`Idx`]; callers
//! "replace" a type by writing that index into their own slot.
//!
//! # Thread Safety
//!
//! One pool is shared by every unit of a session, including units running
//! on worker threads, so the pool is internally synchronized with a
//! `RwLock`. Reads vastly outnumber writes after resolve-types.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use kiln_ir::{Name, StringInterner, Variance};

use crate::{Idx, TypeParamId};

/// Type arguments of an applied type. Most generic types take one or two.
pub type TypeArgs = SmallVec<[Idx; 4]>;

/// Structural description of one pool entry.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeData {
    Any,
    Void,
    Int,
    Float,
    Bool,
    Char,
    Str,
    /// A non-generic class, or a generic class used raw.
    Class(Name),
    /// `Base<Args...>`
    Applied { base: Name, args: TypeArgs },
    /// A type variable. The variance is copied from its parameter.
    Var {
        param: TypeParamId,
        variance: Variance,
    },
    /// `?` (invariant, bound `any`), `? extends B` (covariant), `? super B`
    /// (contravariant).
    Wildcard { variance: Variance, bound: Idx },
    /// A reference that failed to resolve. Compatible with everything so a
    /// single missing name reports once.
    Unresolved(Name),
}

/// A declared type parameter.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TypeParam {
    pub name: Name,
    /// The class or method declaring the parameter.
    pub owner: Name,
    pub variance: Variance,
    /// Upper bounds. Empty means bounded by `any`.
    pub bounds: SmallVec<[Idx; 2]>,
}

struct PoolData {
    types: Vec<TypeData>,
    dedup: FxHashMap<TypeData, Idx>,
    params: Vec<TypeParam>,
}

impl PoolData {
    fn with_primitives() -> Self {
        let mut data = PoolData {
            types: Vec::with_capacity(256),
            dedup: FxHashMap::default(),
            params: Vec::new(),
        };
        // Order matches the `Idx` constants.
        for ty in [
            TypeData::Any,
            TypeData::Void,
            TypeData::Int,
            TypeData::Float,
            TypeData::Bool,
            TypeData::Char,
            TypeData::Str,
        ] {
            data.push(ty);
        }
        data
    }

    fn push(&mut self, ty: TypeData) -> Idx {
        let raw = u32::try_from(self.types.len())
            .unwrap_or_else(|_| panic!("type pool exceeded {} entries", u32::MAX));
        let idx = Idx::from_raw(raw);
        self.types.push(ty.clone());
        self.dedup.insert(ty, idx);
        idx
    }
}

/// Interned type storage.
pub struct Pool {
    inner: RwLock<PoolData>,
}

impl Pool {
    pub fn new() -> Self {
        Pool {
            inner: RwLock::new(PoolData::with_primitives()),
        }
    }

    /// Intern `ty`, returning the existing index for a structurally equal type.
    pub fn intern(&self, ty: TypeData) -> Idx {
        if let Some(&idx) = self.inner.read().dedup.get(&ty) {
            return idx;
        }
        let mut inner = self.inner.write();
        if let Some(&idx) = inner.dedup.get(&ty) {
            return idx;
        }
        inner.push(ty)
    }

    /// Structural data of `idx`.
    ///
    /// # Panics
    /// Panics on an index not produced by this pool, which is an internal
    /// invariant breach.
    pub fn get(&self, idx: Idx) -> TypeData {
        match self.inner.read().types.get(idx.index()) {
            Some(ty) => ty.clone(),
            None => panic!("internal compiler error: {idx:?} is not in the type pool"),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Construction

    pub fn class(&self, name: Name) -> Idx {
        self.intern(TypeData::Class(name))
    }

    /// `base<args>`. With no arguments this is the plain class type.
    pub fn applied(&self, base: Name, args: impl IntoIterator<Item = Idx>) -> Idx {
        let args: TypeArgs = args.into_iter().collect();
        if args.is_empty() {
            return self.class(base);
        }
        self.intern(TypeData::Applied { base, args })
    }

    /// The type variable of `param`.
    pub fn var(&self, param: TypeParamId) -> Idx {
        let variance = self.param(param).variance;
        self.intern(TypeData::Var { param, variance })
    }

    pub fn wildcard(&self, variance: Variance, bound: Idx) -> Idx {
        self.intern(TypeData::Wildcard { variance, bound })
    }

    /// The unbounded wildcard `?`.
    pub fn any_wildcard(&self) -> Idx {
        self.wildcard(Variance::Invariant, Idx::ANY)
    }

    pub fn unresolved(&self, name: Name) -> Idx {
        self.intern(TypeData::Unresolved(name))
    }

    // Type parameters

    /// Declare a new type parameter with no bounds yet.
    pub fn new_type_param(&self, name: Name, owner: Name, variance: Variance) -> TypeParamId {
        let mut inner = self.inner.write();
        let raw = u32::try_from(inner.params.len())
            .unwrap_or_else(|_| panic!("type pool exceeded {} type parameters", u32::MAX));
        inner.params.push(TypeParam {
            name,
            owner,
            variance,
            bounds: SmallVec::new(),
        });
        TypeParamId::from_raw(raw)
    }

    /// Record the resolved bounds of `param`. Called once, by resolve-types.
    pub fn set_bounds(&self, param: TypeParamId, bounds: impl IntoIterator<Item = Idx>) {
        let bounds: SmallVec<[Idx; 2]> = bounds.into_iter().collect();
        if let Some(slot) = self.inner.write().params.get_mut(param.index()) {
            slot.bounds = bounds;
        }
    }

    /// # Panics
    /// Panics on an id not produced by this pool.
    pub fn param(&self, param: TypeParamId) -> TypeParam {
        match self.inner.read().params.get(param.index()) {
            Some(p) => p.clone(),
            None => panic!("internal compiler error: {param:?} is not in the type pool"),
        }
    }

    /// First declared bound, or `any`.
    pub fn upper_bound(&self, param: TypeParamId) -> Idx {
        self.param(param).bounds.first().copied().unwrap_or(Idx::ANY)
    }

    // Queries

    /// Class name of a class or applied type.
    pub fn base_name(&self, idx: Idx) -> Option<Name> {
        match self.get(idx) {
            TypeData::Class(name) | TypeData::Applied { base: name, .. } => Some(name),
            _ => None,
        }
    }

    /// Type arguments of an applied type; empty for everything else.
    pub fn args(&self, idx: Idx) -> TypeArgs {
        match self.get(idx) {
            TypeData::Applied { args, .. } => args,
            _ => TypeArgs::new(),
        }
    }

    /// `any` and unresolved placeholders relate to every type.
    pub fn is_lenient(&self, idx: Idx) -> bool {
        idx == Idx::ANY || matches!(self.get(idx), TypeData::Unresolved(_))
    }

    pub fn is_unresolved(&self, idx: Idx) -> bool {
        matches!(self.get(idx), TypeData::Unresolved(_))
    }

    /// True if an unresolved placeholder occurs anywhere inside `idx`.
    pub fn contains_unresolved(&self, idx: Idx) -> bool {
        match self.get(idx) {
            TypeData::Unresolved(_) => true,
            TypeData::Applied { args, .. } => args.iter().any(|&a| self.contains_unresolved(a)),
            TypeData::Wildcard { bound, .. } => self.contains_unresolved(bound),
            _ => false,
        }
    }

    // Formatting

    /// Render `idx` the way it would be written in source.
    pub fn display(&self, idx: Idx, interner: &StringInterner) -> String {
        let mut buf = String::new();
        self.display_into(idx, interner, &mut buf);
        buf
    }

    fn display_into(&self, idx: Idx, interner: &StringInterner, buf: &mut String) {
        if idx.is_none() {
            buf.push_str("<none>");
            return;
        }
        match self.get(idx) {
            TypeData::Any => buf.push_str("any"),
            TypeData::Void => buf.push_str("void"),
            TypeData::Int => buf.push_str("int"),
            TypeData::Float => buf.push_str("float"),
            TypeData::Bool => buf.push_str("bool"),
            TypeData::Char => buf.push_str("char"),
            TypeData::Str => buf.push_str("string"),
            TypeData::Class(name) | TypeData::Unresolved(name) => {
                buf.push_str(interner.lookup(name));
            }
            TypeData::Applied { base, args } => {
                buf.push_str(interner.lookup(base));
                buf.push('<');
                for (i, &arg) in args.iter().enumerate() {
                    if i > 0 {
                        buf.push_str(", ");
                    }
                    self.display_into(arg, interner, buf);
                }
                buf.push('>');
            }
            TypeData::Var { param, .. } => buf.push_str(interner.lookup(self.param(param).name)),
            TypeData::Wildcard { variance, bound } => {
                buf.push('?');
                match variance {
                    Variance::Invariant => return,
                    Variance::Covariant => buf.push_str(" extends "),
                    Variance::Contravariant => buf.push_str(" super "),
                }
                self.display_into(bound, interner, buf);
            }
        }
    }
}

impl Default for Pool {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Pool")
            .field("types", &inner.types.len())
            .field("params", &inner.params.len())
            .finish()
    }
}
