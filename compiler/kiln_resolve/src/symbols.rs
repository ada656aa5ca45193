//! Program-wide symbol table.
//!
//! Append-only and shared by every unit. The declare phase publishes names
//! (classes with their type parameters, fields, methods); resolve-types
//! then publishes signatures. Lookups never require the target to be
//! resolved, which is what makes mutually referencing declarations safe.
//!
//! Guards are never held across calls: every query clones what it needs
//! and releases the lock, since `parking_lot` read locks are not reentrant
//! once a writer is queued.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use kiln_ir::{Access, Modifiers, Name, Span};
use kiln_types::member::{AccessControlled, MemberId, Modified};
use kiln_types::{ClassHierarchy, Idx, TypeParamId};

use crate::UnitId;

/// Index of a symbol in the [`SymbolTable`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SymbolKind {
    Class,
    Field,
    Method,
}

/// Resolved signature of a member.
///
/// `ty` is the field type, method return type or class self type; `params`
/// are method parameter types.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Signature {
    pub ty: Idx,
    pub params: SmallVec<[Idx; 4]>,
    pub type_params: Vec<TypeParamId>,
}

impl Default for Signature {
    fn default() -> Self {
        Signature {
            ty: Idx::NONE,
            params: SmallVec::new(),
            type_params: Vec::new(),
        }
    }
}

/// A declaration visible program-wide.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Symbol {
    pub name: Name,
    pub kind: SymbolKind,
    pub unit: UnitId,
    pub member: MemberId,
    /// Declaring class of a field or method.
    pub owner: Option<Name>,
    pub access: Access,
    pub modifiers: Modifiers,
    pub deprecated: bool,
    pub span: Span,
    /// Parameter count of a method, known before its signature.
    pub arity: usize,
    /// `None` until resolve-types publishes it.
    pub signature: Option<Signature>,
}

impl Symbol {
    /// Declaration order across the whole program.
    pub fn order(&self) -> (UnitId, MemberId) {
        (self.unit, self.member)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(Modifiers::STATIC)
    }

    pub fn is_abstract(&self) -> bool {
        self.modifiers
            .intersects(Modifiers::ABSTRACT | Modifiers::INTERFACE)
    }

    /// Published type, or `any` if the signature is not known yet.
    pub fn ty(&self) -> Idx {
        self.signature.as_ref().map_or(Idx::ANY, |s| s.ty)
    }
}

impl Modified for Symbol {
    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl AccessControlled for Symbol {
    fn access(&self) -> Access {
        self.access
    }
}

/// Class-level facts for [`ClassHierarchy`].
#[derive(Clone, Debug, Default)]
struct ClassEntry {
    type_params: Vec<TypeParamId>,
    superclass: Option<Idx>,
    interfaces: Vec<Idx>,
    permits: Option<Vec<Name>>,
    members: Vec<SymbolId>,
}

#[derive(Default)]
struct SymbolData {
    symbols: Vec<Symbol>,
    /// Every class declaration per name, in publication order.
    class_decls: FxHashMap<Name, Vec<SymbolId>>,
    /// One entry per class symbol.
    classes: FxHashMap<SymbolId, ClassEntry>,
}

impl SymbolData {
    /// The declaration a class name refers to: the earliest in program
    /// order, so the answer does not depend on which thread published first.
    fn canonical(&self, name: Name) -> Option<SymbolId> {
        self.class_decls
            .get(&name)?
            .iter()
            .copied()
            .min_by_key(|&id| self.symbols[id.index()].order())
    }

    fn entry(&self, name: Name) -> Option<&ClassEntry> {
        self.classes.get(&self.canonical(name)?)
    }
}

/// The shared, append-only symbol context.
#[derive(Default)]
pub struct SymbolTable {
    inner: RwLock<SymbolData>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(data: &mut SymbolData, symbol: Symbol) -> SymbolId {
        let raw = u32::try_from(data.symbols.len())
            .unwrap_or_else(|_| panic!("symbol table exceeded u32::MAX symbols"));
        data.symbols.push(symbol);
        SymbolId(raw)
    }

    /// Publish a class name with its type parameters.
    ///
    /// `permits` is `Some` for a sealed class.
    pub fn declare_class(
        &self,
        symbol: Symbol,
        type_params: Vec<TypeParamId>,
        permits: Option<Vec<Name>>,
    ) -> SymbolId {
        let mut data = self.inner.write();
        let name = symbol.name;
        let id = Self::push(&mut data, symbol);
        data.class_decls.entry(name).or_default().push(id);
        data.classes.insert(
            id,
            ClassEntry {
                type_params,
                permits,
                ..ClassEntry::default()
            },
        );
        id
    }

    /// Publish a field or method of the class declared as `class`.
    pub fn declare_member(&self, class: SymbolId, symbol: Symbol) -> SymbolId {
        let mut data = self.inner.write();
        let id = Self::push(&mut data, symbol);
        if let Some(entry) = data.classes.get_mut(&class) {
            entry.members.push(id);
        }
        id
    }

    /// Publish the resolved supertypes of a class.
    pub fn publish_class(&self, class: SymbolId, superclass: Option<Idx>, interfaces: Vec<Idx>) {
        let mut data = self.inner.write();
        if let Some(entry) = data.classes.get_mut(&class) {
            entry.superclass = superclass;
            entry.interfaces = interfaces;
        }
    }

    pub fn publish_signature(&self, id: SymbolId, signature: Signature) {
        self.inner.write().symbols[id.index()].signature = Some(signature);
    }

    pub fn get(&self, id: SymbolId) -> Symbol {
        self.inner.read().symbols[id.index()].clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The class a program-wide name refers to.
    pub fn lookup(&self, name: Name) -> Option<Symbol> {
        let data = self.inner.read();
        let id = data.canonical(name)?;
        Some(data.symbols[id.index()].clone())
    }

    pub fn lookup_class(&self, name: Name) -> Option<SymbolId> {
        self.inner.read().canonical(name)
    }

    /// Every declaration of a class name, in program order.
    pub fn class_declarations(&self, name: Name) -> Vec<SymbolId> {
        let data = self.inner.read();
        let mut ids = data.class_decls.get(&name).cloned().unwrap_or_default();
        ids.sort_by_key(|&id| data.symbols[id.index()].order());
        ids
    }

    /// Members of `class` itself (not inherited) named `name`, in
    /// declaration order.
    pub fn members_named(&self, class: Name, name: Name, kind: SymbolKind) -> Vec<(SymbolId, Symbol)> {
        let data = self.inner.read();
        let Some(entry) = data.entry(class) else {
            return Vec::new();
        };
        entry
            .members
            .iter()
            .map(|&id| (id, &data.symbols[id.index()]))
            .filter(|(_, s)| s.name == name && s.kind == kind)
            .map(|(id, s)| (id, s.clone()))
            .collect()
    }

    /// Every member of `class` itself matching `pred`, in declaration order.
    pub fn find_members(&self, class: Name, pred: impl Fn(&Symbol) -> bool) -> Vec<(SymbolId, Symbol)> {
        let data = self.inner.read();
        let Some(entry) = data.entry(class) else {
            return Vec::new();
        };
        entry
            .members
            .iter()
            .map(|&id| (id, &data.symbols[id.index()]))
            .filter(|(_, s)| pred(s))
            .map(|(id, s)| (id, s.clone()))
            .collect()
    }

    /// Modifiers of the class a name refers to.
    pub fn class_modifiers(&self, name: Name) -> Option<Modifiers> {
        self.lookup(name).map(|s| s.modifiers)
    }
}

impl ClassHierarchy for SymbolTable {
    fn superclass(&self, class: Name) -> Option<Idx> {
        self.inner.read().entry(class).and_then(|e| e.superclass)
    }

    fn interfaces(&self, class: Name) -> Vec<Idx> {
        self.inner
            .read()
            .entry(class)
            .map(|e| e.interfaces.clone())
            .unwrap_or_default()
    }

    fn type_params(&self, class: Name) -> Vec<TypeParamId> {
        self.inner
            .read()
            .entry(class)
            .map(|e| e.type_params.clone())
            .unwrap_or_default()
    }

    fn closed_variants(&self, class: Name) -> Option<Vec<Name>> {
        self.inner.read().entry(class).and_then(|e| e.permits.clone())
    }

    fn is_abstract(&self, class: Name) -> bool {
        self.lookup(class).is_some_and(|s| s.is_abstract())
    }

    /// Instance fields with a published type, in declaration order.
    fn components(&self, class: Name) -> Vec<Idx> {
        let data = self.inner.read();
        let Some(entry) = data.entry(class) else {
            return Vec::new();
        };
        entry
            .members
            .iter()
            .map(|&id| &data.symbols[id.index()])
            .filter(|s| s.kind == SymbolKind::Field && !s.is_static())
            .map(Symbol::ty)
            .collect()
    }
}

#[cfg(test)]
mod tests;
