//! A small in-memory class hierarchy for unit tests.

use rustc_hash::FxHashMap;

use kiln_ir::{Name, StringInterner, Variance};

use crate::{ClassHierarchy, Idx, Pool, TypeParamId};

#[derive(Default)]
struct ClassInfo {
    superclass: Option<Idx>,
    interfaces: Vec<Idx>,
    params: Vec<TypeParamId>,
    variants: Option<Vec<Name>>,
    components: Vec<Idx>,
}

pub struct World {
    pub interner: StringInterner,
    pub pool: Pool,
    classes: FxHashMap<Name, ClassInfo>,
}

impl World {
    pub fn new() -> Self {
        World {
            interner: StringInterner::new(),
            pool: Pool::new(),
            classes: FxHashMap::default(),
        }
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    /// Declare a non-generic class and return its type.
    pub fn class(&mut self, text: &str) -> Idx {
        let name = self.name(text);
        self.classes.entry(name).or_default();
        self.pool.class(name)
    }

    /// Declare a generic class and return its parameters.
    pub fn generic(&mut self, text: &str, params: &[(&str, Variance)]) -> Vec<TypeParamId> {
        let name = self.name(text);
        let ids: Vec<TypeParamId> = params
            .iter()
            .map(|(p, v)| self.pool.new_type_param(self.interner.intern(p), name, *v))
            .collect();
        self.classes.entry(name).or_default().params.clone_from(&ids);
        ids
    }

    pub fn apply(&self, text: &str, args: &[Idx]) -> Idx {
        self.pool.applied(self.name(text), args.iter().copied())
    }

    pub fn extends(&mut self, text: &str, superclass: Idx) {
        let name = self.name(text);
        self.classes.entry(name).or_default().superclass = Some(superclass);
    }

    pub fn implements(&mut self, text: &str, interface: Idx) {
        let name = self.name(text);
        self.classes.entry(name).or_default().interfaces.push(interface);
    }

    pub fn seal(&mut self, text: &str, variants: &[&str]) {
        let name = self.name(text);
        let variants = variants.iter().map(|v| self.name(v)).collect();
        self.classes.entry(name).or_default().variants = Some(variants);
    }

    pub fn components(&mut self, text: &str, components: Vec<Idx>) {
        let name = self.name(text);
        self.classes.entry(name).or_default().components = components;
    }

    pub fn show(&self, ty: Idx) -> String {
        self.pool.display(ty, &self.interner)
    }
}

impl ClassHierarchy for World {
    fn superclass(&self, class: Name) -> Option<Idx> {
        self.classes.get(&class).and_then(|c| c.superclass)
    }

    fn interfaces(&self, class: Name) -> Vec<Idx> {
        self.classes
            .get(&class)
            .map(|c| c.interfaces.clone())
            .unwrap_or_default()
    }

    fn type_params(&self, class: Name) -> Vec<TypeParamId> {
        self.classes
            .get(&class)
            .map(|c| c.params.clone())
            .unwrap_or_default()
    }

    fn closed_variants(&self, class: Name) -> Option<Vec<Name>> {
        self.classes.get(&class).and_then(|c| c.variants.clone())
    }

    /// Sealed classes are abstract here; nothing else is.
    fn is_abstract(&self, class: Name) -> bool {
        self.classes.get(&class).is_some_and(|c| c.variants.is_some())
    }

    fn components(&self, class: Name) -> Vec<Idx> {
        self.classes
            .get(&class)
            .map(|c| c.components.clone())
            .unwrap_or_default()
    }
}

/// Type shapes for property tests, built into a [`World`] on demand.
#[derive(Clone, Debug)]
pub enum Shape {
    Prim(u32),
    Class(u8),
    Applied(u8, Vec<Shape>),
    Var(u8),
    Wildcard(u8, Box<Shape>),
}

pub fn shape() -> impl proptest::strategy::Strategy<Value = Shape> {
    use proptest::prelude::*;
    let leaf = prop_oneof![
        (0..Idx::PRIMITIVE_COUNT).prop_map(Shape::Prim),
        (0u8..3).prop_map(Shape::Class),
        (0u8..3).prop_map(Shape::Var),
    ];
    leaf.prop_recursive(4, 24, 3, |inner| {
        prop_oneof![
            (0u8..2, proptest::collection::vec(inner.clone(), 1..3))
                .prop_map(|(base, args)| Shape::Applied(base, args)),
            (0u8..3, inner).prop_map(|(v, bound)| Shape::Wildcard(v, Box::new(bound))),
        ]
    })
}

impl World {
    /// Three type parameters `T0` (invariant), `T1` (covariant) and `T2`
    /// (contravariant) owned by a class `Owner`, for use with [`Shape::Var`].
    pub fn shape_params(&mut self) -> Vec<TypeParamId> {
        self.generic(
            "Owner",
            &[
                ("T0", Variance::Invariant),
                ("T1", Variance::Covariant),
                ("T2", Variance::Contravariant),
            ],
        )
    }

    pub fn build(&self, shape: &Shape, params: &[TypeParamId]) -> Idx {
        match shape {
            Shape::Prim(raw) => Idx::from_raw(*raw),
            Shape::Class(i) => self.pool.class(self.name(&format!("C{i}"))),
            Shape::Applied(base, args) => {
                let args: Vec<Idx> = args.iter().map(|a| self.build(a, params)).collect();
                self.pool.applied(self.name(&format!("G{base}")), args)
            }
            Shape::Var(i) => self.pool.var(params[usize::from(*i) % params.len()]),
            Shape::Wildcard(v, bound) => {
                let variance = match v {
                    0 => Variance::Invariant,
                    1 => Variance::Covariant,
                    _ => Variance::Contravariant,
                };
                let bound = if variance == Variance::Invariant {
                    Idx::ANY
                } else {
                    self.build(bound, params)
                };
                self.pool.wildcard(variance, bound)
            }
        }
    }
}
