//! Kiln IR - shared syntax and identifier types.
//!
//! This crate holds what every other compiler crate agrees on:
//! - Spans for source positions
//! - Interned names
//! - Unresolved type references (`ParsedType`) and variance
//! - Declaration, expression and pattern syntax
//!
//! # Design Philosophy
//!
//! - **Intern strings**: identifiers are `Name(u32)`.
//! - **Flatten trees**: expressions and patterns are arena ids, so replacing
//!   a node rewrites a parent slot instead of mutating a shared node.

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
mod interner;
mod name;
mod parsed_type;
mod span;

pub use ast::{
    Access, AnnotationDecl, BinaryOp, ClassDecl, Expr, ExprArena, ExprId, ExprKind, FieldDecl,
    Literal, MatchArm, MethodDecl, Modifiers, ParamDecl, Pattern, PatternId, PatternKind,
    SourceUnit, TypeParamDecl, UnaryOp,
};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use parsed_type::{ParsedType, Variance};
pub use span::Span;
