//! Syntax tree handed over by the parser.
//!
//! Declarations are plain owned structs; expressions and patterns live in a
//! per-unit [`ExprArena`] and refer to each other by id.

mod arena;
mod expr;
mod items;

pub use arena::ExprArena;
pub use expr::{
    BinaryOp, Expr, ExprId, ExprKind, Literal, MatchArm, Pattern, PatternId, PatternKind,
    UnaryOp,
};
pub use items::{
    Access, AnnotationDecl, ClassDecl, FieldDecl, MethodDecl, Modifiers, ParamDecl, SourceUnit,
    TypeParamDecl,
};
