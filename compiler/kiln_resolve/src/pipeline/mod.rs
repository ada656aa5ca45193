//! The four-stage resolution pipeline.
//!
//! Every member goes through, in order:
//!
//! 1. **resolve-types**: declared types become pool types, signatures are
//!    published.
//! 2. **resolve**: identifiers bind, calls pick an overload, expressions
//!    get types, annotations resolve, match arms are typed.
//! 3. **check**: access, overriding, implementation, duplicates,
//!    assignability, declaration-site variance, bounds, and match
//!    exhaustiveness with branch lowering.
//! 4. **fold-constants**: compile-time evaluation of constant expressions.
//!
//! Recoverable problems are reported to the sink and the member advances
//! anyway. Running a stage out of order is an internal compiler error.

mod check;
mod fold;
mod overload;
mod resolve;
mod types;

use std::fmt;

use kiln_diagnostic::DiagnosticSink;
use kiln_ir::StringInterner;
use kiln_types::member::{MemberId, ResolutionState};
use kiln_types::Pool;

use crate::{CompilationUnit, SymbolTable};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Stage {
    ResolveTypes,
    Resolve,
    Check,
    FoldConstants,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::ResolveTypes,
        Stage::Resolve,
        Stage::Check,
        Stage::FoldConstants,
    ];

    /// State a member is in once this stage ran on it.
    pub fn target(self) -> ResolutionState {
        match self {
            Stage::ResolveTypes => ResolutionState::TypesResolved,
            Stage::Resolve => ResolutionState::Resolved,
            Stage::Check => ResolutionState::Checked,
            Stage::FoldConstants => ResolutionState::ConstantsFolded,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::ResolveTypes => "resolve-types",
            Stage::Resolve => "resolve",
            Stage::Check => "check",
            Stage::FoldConstants => "fold-constants",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared context of every stage: the type pool, the program-wide symbol
/// table and the interner.
#[derive(Copy, Clone)]
pub struct Pipeline<'a> {
    pub pool: &'a Pool,
    pub symbols: &'a SymbolTable,
    pub interner: &'a StringInterner,
}

impl<'a> Pipeline<'a> {
    pub fn new(pool: &'a Pool, symbols: &'a SymbolTable, interner: &'a StringInterner) -> Self {
        Pipeline {
            pool,
            symbols,
            interner,
        }
    }

    pub fn resolve_types(
        &self,
        unit: &mut CompilationUnit,
        member: MemberId,
        sink: &mut dyn DiagnosticSink,
    ) {
        self.run(Stage::ResolveTypes, unit, member, sink);
    }

    pub fn resolve(&self, unit: &mut CompilationUnit, member: MemberId, sink: &mut dyn DiagnosticSink) {
        self.run(Stage::Resolve, unit, member, sink);
    }

    pub fn check(&self, unit: &mut CompilationUnit, member: MemberId, sink: &mut dyn DiagnosticSink) {
        self.run(Stage::Check, unit, member, sink);
    }

    /// Idempotent: a member already folded is left untouched.
    pub fn fold_constants(
        &self,
        unit: &mut CompilationUnit,
        member: MemberId,
        sink: &mut dyn DiagnosticSink,
    ) {
        self.run(Stage::FoldConstants, unit, member, sink);
    }

    /// Run `stage` on one member.
    ///
    /// # Panics
    /// Panics with an internal compiler error if the member is not in the
    /// state the stage requires.
    pub fn run(
        &self,
        stage: Stage,
        unit: &mut CompilationUnit,
        member: MemberId,
        sink: &mut dyn DiagnosticSink,
    ) {
        let state = unit.members.get(member).state;
        if stage == Stage::FoldConstants && state.is_terminal() {
            return;
        }
        let required = stage.target().predecessor();
        if required != Some(state) {
            let name = self.interner.lookup(unit.members.get(member).name);
            panic!(
                "internal compiler error: {stage} on `{name}` in unit `{}` requires state {required:?}, found {state:?}",
                unit.name
            );
        }
        match stage {
            Stage::ResolveTypes => types::resolve_member_types(self, unit, member, sink),
            Stage::Resolve => resolve::resolve_member(self, unit, member, sink),
            Stage::Check => check::check_member(self, unit, member, sink),
            Stage::FoldConstants => fold::fold_member(self, unit, member),
        }
        unit.members.get_mut(member).state = stage.target();
    }

    /// Run `stage` on every member of `unit`, in declaration order, with
    /// the unit's own diagnostic buffer as the sink.
    #[tracing::instrument(level = "debug", skip_all, fields(unit = %unit.name, stage = %stage))]
    pub fn run_stage(&self, stage: Stage, unit: &mut CompilationUnit) {
        let mut sink = std::mem::take(&mut unit.diagnostics);
        let members: Vec<MemberId> = unit.members.ids().collect();
        for member in members {
            self.run(stage, unit, member, &mut sink);
        }
        unit.diagnostics = sink;
        unit.progress = stage.target();
        tracing::debug!(errors = unit.diagnostics.error_count(), "stage complete");
    }

    /// All four stages on a single unit.
    pub fn run_all(&self, unit: &mut CompilationUnit) {
        for stage in Stage::ALL {
            self.run_stage(stage, unit);
        }
    }
}
