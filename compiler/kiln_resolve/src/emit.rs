//! The seam to code generation.

use kiln_ir::ExprId;
use kiln_patterns::LoweredMatch;
use kiln_types::member::{Member, MemberId};

use crate::CompilationUnit;

/// Receives finished units from [`Session::emit`](crate::Session::emit).
///
/// Only called when no error was reported, so every member carries its
/// final type and every match has been lowered.
pub trait CodeEmitter {
    fn begin_unit(&mut self, _unit: &CompilationUnit) {}

    /// Called once per member, in declaration order.
    fn emit_member(&mut self, unit: &CompilationUnit, id: MemberId, member: &Member);

    /// Called once per lowered match, in expression order.
    fn emit_match(&mut self, _unit: &CompilationUnit, _expr: ExprId, _lowered: &LoweredMatch) {}

    fn end_unit(&mut self, _unit: &CompilationUnit) {}
}
