//! Class table for pattern tests.

use rustc_hash::FxHashMap;

use kiln_ir::{Name, Span, StringInterner};
use kiln_types::{ClassHierarchy, Idx, Pool, TypeParamId};

#[derive(Default)]
struct Entry {
    superclass: Option<Idx>,
    variants: Option<Vec<Name>>,
    is_abstract: bool,
    components: Vec<Idx>,
}

pub struct Classes {
    pub interner: StringInterner,
    pub pool: Pool,
    table: FxHashMap<Name, Entry>,
}

impl Classes {
    pub fn new() -> Self {
        Classes {
            interner: StringInterner::new(),
            pool: Pool::new(),
            table: FxHashMap::default(),
        }
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    /// Declare `text` with the given components, extending `parent`.
    pub fn declare(&mut self, text: &str, parent: Option<Idx>, components: Vec<Idx>) -> Idx {
        let name = self.name(text);
        let entry = self.table.entry(name).or_default();
        entry.superclass = parent;
        entry.components = components;
        self.pool.class(name)
    }

    /// Close `text` over `variants`. The class is abstract unless
    /// [`Classes::make_concrete`] says otherwise.
    pub fn seal(&mut self, text: &str, variants: &[&str]) {
        let name = self.name(text);
        let variants = variants.iter().map(|v| self.name(v)).collect();
        let entry = self.table.entry(name).or_default();
        entry.variants = Some(variants);
        entry.is_abstract = true;
    }

    pub fn make_concrete(&mut self, text: &str) {
        let name = self.name(text);
        self.table.entry(name).or_default().is_abstract = false;
    }

    /// `abstract sealed Shape permits Circle(float), Square(float, float)`.
    pub fn shapes(&mut self) -> Idx {
        let shape = self.declare("Shape", None, Vec::new());
        self.declare("Circle", Some(shape), vec![Idx::FLOAT]);
        self.declare("Square", Some(shape), vec![Idx::FLOAT, Idx::FLOAT]);
        self.seal("Shape", &["Circle", "Square"]);
        shape
    }
}

impl ClassHierarchy for Classes {
    fn superclass(&self, class: Name) -> Option<Idx> {
        self.table.get(&class).and_then(|c| c.superclass)
    }

    fn interfaces(&self, _class: Name) -> Vec<Idx> {
        Vec::new()
    }

    fn type_params(&self, _class: Name) -> Vec<TypeParamId> {
        Vec::new()
    }

    fn closed_variants(&self, class: Name) -> Option<Vec<Name>> {
        self.table.get(&class).and_then(|c| c.variants.clone())
    }

    fn is_abstract(&self, class: Name) -> bool {
        self.table.get(&class).is_some_and(|c| c.is_abstract)
    }

    fn components(&self, class: Name) -> Vec<Idx> {
        self.table
            .get(&class)
            .map(|c| c.components.clone())
            .unwrap_or_default()
    }
}

pub fn sp(start: u32) -> Span {
    Span::new(start, start + 1)
}
