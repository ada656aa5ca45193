//! Declaration syntax: the parser's output for one compilation unit.

use std::fmt;

use bitflags::bitflags;

use super::arena::ExprArena;
use super::expr::ExprId;
use crate::{Name, ParsedType, Span, Variance};

bitflags! {
    /// Declaration modifiers.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct Modifiers: u16 {
        const STATIC = 1 << 0;
        const FINAL = 1 << 1;
        const ABSTRACT = 1 << 2;
        /// Closed class: only the classes in its `permits` list extend it.
        const SEALED = 1 << 3;
        const INTERFACE = 1 << 4;
        /// The class may be used as an annotation.
        const ANNOTATION = 1 << 5;
    }
}

/// Access level, ordered from most to least restrictive.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub enum Access {
    Private,
    /// Visible within the declaring compilation unit.
    #[default]
    Package,
    Protected,
    Public,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Private => write!(f, "private"),
            Access::Package => write!(f, "package-private"),
            Access::Protected => write!(f, "protected"),
            Access::Public => write!(f, "public"),
        }
    }
}

/// `@Name(args...)`
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct AnnotationDecl {
    pub name: Name,
    pub args: Vec<ExprId>,
    pub span: Span,
}

impl AnnotationDecl {
    pub fn new(name: Name, span: Span) -> Self {
        AnnotationDecl {
            name,
            args: Vec::new(),
            span,
        }
    }
}

/// `T`, `out T extends Bound`, `in T`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeParamDecl {
    pub name: Name,
    pub variance: Variance,
    pub bounds: Vec<ParsedType>,
    pub span: Span,
}

impl TypeParamDecl {
    pub fn new(name: Name, span: Span) -> Self {
        TypeParamDecl {
            name,
            variance: Variance::Invariant,
            bounds: Vec::new(),
            span,
        }
    }

    #[must_use]
    pub fn with_variance(mut self, variance: Variance) -> Self {
        self.variance = variance;
        self
    }

    #[must_use]
    pub fn with_bound(mut self, bound: ParsedType) -> Self {
        self.bounds.push(bound);
        self
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ParamDecl {
    pub name: Name,
    pub ty: ParsedType,
    pub annotations: Vec<AnnotationDecl>,
    pub span: Span,
}

impl ParamDecl {
    pub fn new(name: Name, ty: ParsedType, span: Span) -> Self {
        ParamDecl {
            name,
            ty,
            annotations: Vec::new(),
            span,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: ParsedType,
    pub init: Option<ExprId>,
    pub access: Access,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationDecl>,
    pub span: Span,
}

impl FieldDecl {
    pub fn new(name: Name, ty: ParsedType, span: Span) -> Self {
        FieldDecl {
            name,
            ty,
            init: None,
            access: Access::Public,
            modifiers: Modifiers::empty(),
            annotations: Vec::new(),
            span,
        }
    }

    #[must_use]
    pub fn with_init(mut self, init: ExprId) -> Self {
        self.init = Some(init);
        self
    }

    #[must_use]
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: AnnotationDecl) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodDecl {
    pub name: Name,
    pub type_params: Vec<TypeParamDecl>,
    pub params: Vec<ParamDecl>,
    pub ret: ParsedType,
    /// `None` for abstract and interface methods.
    pub body: Option<ExprId>,
    pub access: Access,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationDecl>,
    pub span: Span,
}

impl MethodDecl {
    pub fn new(name: Name, ret: ParsedType, span: Span) -> Self {
        MethodDecl {
            name,
            type_params: Vec::new(),
            params: Vec::new(),
            ret,
            body: None,
            access: Access::Public,
            modifiers: Modifiers::empty(),
            annotations: Vec::new(),
            span,
        }
    }

    #[must_use]
    pub fn with_param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn with_type_param(mut self, param: TypeParamDecl) -> Self {
        self.type_params.push(param);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: ExprId) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: AnnotationDecl) -> Self {
        self.annotations.push(annotation);
        self
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ClassDecl {
    pub name: Name,
    pub type_params: Vec<TypeParamDecl>,
    pub superclass: Option<ParsedType>,
    pub interfaces: Vec<ParsedType>,
    /// Permitted direct subclasses of a sealed class.
    pub permits: Vec<Name>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub access: Access,
    pub modifiers: Modifiers,
    pub annotations: Vec<AnnotationDecl>,
    pub span: Span,
}

impl ClassDecl {
    pub fn new(name: Name, span: Span) -> Self {
        ClassDecl {
            name,
            type_params: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            permits: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            access: Access::Public,
            modifiers: Modifiers::empty(),
            annotations: Vec::new(),
            span,
        }
    }

    #[must_use]
    pub fn with_type_param(mut self, param: TypeParamDecl) -> Self {
        self.type_params.push(param);
        self
    }

    #[must_use]
    pub fn with_superclass(mut self, superclass: ParsedType) -> Self {
        self.superclass = Some(superclass);
        self
    }

    #[must_use]
    pub fn with_interface(mut self, interface: ParsedType) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Marks the class sealed and records its permitted subclasses.
    #[must_use]
    pub fn sealed(mut self, permits: impl IntoIterator<Item = Name>) -> Self {
        self.modifiers |= Modifiers::SEALED;
        self.permits.extend(permits);
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDecl) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: AnnotationDecl) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// One source file's parsed declarations plus its expression arena.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct SourceUnit {
    /// File path or other display name.
    pub name: String,
    pub classes: Vec<ClassDecl>,
    pub arena: ExprArena,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>) -> Self {
        SourceUnit {
            name: name.into(),
            classes: Vec::new(),
            arena: ExprArena::new(),
        }
    }

    pub fn push_class(&mut self, class: ClassDecl) {
        self.classes.push(class);
    }
}
