//! Declare phase: lower declaration syntax into members and publish every
//! declaration-level name.
//!
//! Runs before any unit resolves anything, so that every class, field and
//! method is visible program-wide by the time resolve-types starts.

use kiln_ir::{
    Access, AnnotationDecl, ClassDecl, FieldDecl, MethodDecl, Modifiers, Name, ParsedType,
    SourceUnit, StringInterner, TypeParamDecl,
};
use kiln_types::member::{
    is_sealed, Annotation, AnnotationKind, GenericParam, Member, MemberId, MemberKind, Param,
    ResolutionState,
};
use kiln_types::{Idx, Pool};

use crate::{CompilationUnit, Symbol, SymbolId, SymbolKind, SymbolTable, UnitId};

/// Build a unit from its syntax and publish its names.
#[tracing::instrument(level = "debug", skip_all, fields(unit = %source.name))]
pub fn declare_unit(
    id: UnitId,
    source: SourceUnit,
    pool: &Pool,
    symbols: &SymbolTable,
    interner: &StringInterner,
) -> CompilationUnit {
    let SourceUnit {
        name,
        classes,
        arena,
    } = source;
    let mut declarer = Declarer {
        unit: CompilationUnit::new(id, name, arena),
        pool,
        symbols,
        interner,
    };
    for class in classes {
        declarer.class(class);
    }
    tracing::debug!(members = declarer.unit.members.len(), "declared unit");
    declarer.unit
}

struct Declarer<'a> {
    unit: CompilationUnit,
    pool: &'a Pool,
    symbols: &'a SymbolTable,
    interner: &'a StringInterner,
}

impl Declarer<'_> {
    fn class(&mut self, decl: ClassDecl) {
        let ClassDecl {
            name,
            type_params,
            superclass,
            interfaces,
            permits,
            fields,
            methods,
            access,
            modifiers,
            annotations,
            span,
        } = decl;
        let type_params = self.generic_params(name, type_params);
        let annotations = self.annotations(annotations);
        let declared = ParsedType::named(name, span);
        let id = self.alloc(Member {
            name,
            span,
            kind: MemberKind::Class {
                type_params: type_params.clone(),
                superclass,
                interfaces,
                super_ty: None,
                interface_tys: Vec::new(),
                permits: permits.clone(),
                members: Vec::new(),
            },
            declared,
            ty: Idx::NONE,
            modifiers,
            annotations,
            access,
            owner: None,
            state: ResolutionState::Unresolved,
        });
        let sealed = is_sealed(self.unit.members.get(id)).then_some(permits);
        let symbol = self.symbols.declare_class(
            self.symbol_for(id, SymbolKind::Class, None, 0),
            type_params.iter().map(|p| p.id).collect(),
            sealed,
        );
        self.unit.symbols.push(symbol);
        self.unit.classes.push(id);

        let interface = modifiers.contains(Modifiers::INTERFACE);
        let mut members = Vec::with_capacity(fields.len() + methods.len());
        for field in fields {
            members.push(self.field(field, id, symbol, name));
        }
        for method in methods {
            members.push(self.method(method, id, symbol, name, interface));
        }
        if let MemberKind::Class { members: slot, .. } = &mut self.unit.members.get_mut(id).kind {
            *slot = members;
        }
    }

    fn field(&mut self, decl: FieldDecl, owner: MemberId, class: SymbolId, class_name: Name) -> MemberId {
        let FieldDecl {
            name,
            ty,
            init,
            access,
            modifiers,
            annotations,
            span,
        } = decl;
        let annotations = self.annotations(annotations);
        let id = self.alloc(Member {
            name,
            span,
            kind: MemberKind::Field { init },
            declared: ty,
            ty: Idx::NONE,
            modifiers,
            annotations,
            access,
            owner: Some(owner),
            state: ResolutionState::Unresolved,
        });
        let symbol = self.symbols.declare_member(
            class,
            self.symbol_for(id, SymbolKind::Field, Some(class_name), 0),
        );
        self.unit.symbols.push(symbol);
        id
    }

    fn method(
        &mut self,
        decl: MethodDecl,
        owner: MemberId,
        class: SymbolId,
        class_name: Name,
        in_interface: bool,
    ) -> MemberId {
        let MethodDecl {
            name,
            type_params,
            params,
            ret,
            body,
            access,
            mut modifiers,
            annotations,
            span,
        } = decl;
        if in_interface && body.is_none() {
            modifiers |= Modifiers::ABSTRACT;
        }
        let type_params = self.generic_params(name, type_params);
        let params: Vec<Param> = params
            .into_iter()
            .map(|p| Param {
                name: p.name,
                declared: p.ty,
                ty: Idx::NONE,
                annotations: self.annotations(p.annotations),
                span: p.span,
            })
            .collect();
        let arity = params.len();
        let annotations = self.annotations(annotations);
        let id = self.alloc(Member {
            name,
            span,
            kind: MemberKind::Method {
                type_params,
                params,
                body,
            },
            declared: ret,
            ty: Idx::NONE,
            modifiers,
            annotations,
            access: if in_interface { Access::Public } else { access },
            owner: Some(owner),
            state: ResolutionState::Unresolved,
        });
        let symbol = self.symbols.declare_member(
            class,
            self.symbol_for(id, SymbolKind::Method, Some(class_name), arity),
        );
        self.unit.symbols.push(symbol);
        id
    }

    /// Allocate a pool parameter per declared one. Bounds are resolved by
    /// resolve-types.
    fn generic_params(&self, owner: Name, decls: Vec<TypeParamDecl>) -> Vec<GenericParam> {
        decls
            .into_iter()
            .map(|decl| GenericParam {
                id: self.pool.new_type_param(decl.name, owner, decl.variance),
                name: decl.name,
                bounds: decl.bounds,
                span: decl.span,
            })
            .collect()
    }

    /// Built-in annotations are recognised by name now; the rest resolve
    /// against annotation classes in resolve.
    fn annotations(&self, decls: Vec<AnnotationDecl>) -> Vec<Annotation> {
        decls
            .into_iter()
            .map(|decl| Annotation {
                name: decl.name,
                kind: AnnotationKind::builtin(self.interner.lookup(decl.name))
                    .unwrap_or(AnnotationKind::Unresolved),
                args: decl.args,
                span: decl.span,
            })
            .collect()
    }

    fn alloc(&mut self, member: Member) -> MemberId {
        self.unit.members.alloc(member)
    }

    fn symbol_for(&self, id: MemberId, kind: SymbolKind, owner: Option<Name>, arity: usize) -> Symbol {
        let member = self.unit.members.get(id);
        Symbol {
            name: member.name,
            kind,
            unit: self.unit.id,
            member: id,
            owner,
            access: member.access,
            modifiers: member.modifiers,
            deprecated: kiln_types::member::is_deprecated(member),
            span: member.span,
            arity,
            signature: None,
        }
    }
}

#[cfg(test)]
mod tests;
