//! Multi-unit compilation session.
//!
//! Phases run as barriers over every unit, each one a parallel pass:
//!
//! ```text
//! declare → resolve-types → resolve → check → fold-constants
//! ```
//!
//! Every declaration-level name is published by declare before any unit
//! starts resolve-types, and every signature is published before any unit
//! resolves a body. Units only share the pool, the interner and the symbol
//! table, all internally synchronized, so each worker owns its unit
//! outright.

use rayon::prelude::*;

use kiln_diagnostic::{
    Diagnostic, DiagnosticBuffer, DiagnosticConfig, DiagnosticSink, ErrorBudget, ErrorGuaranteed,
};
use kiln_ir::{SharedInterner, SourceUnit, StringInterner};
use kiln_types::member::ResolutionState;
use kiln_types::Pool;

use crate::{declare_unit, CodeEmitter, CompilationUnit, Pipeline, Stage, SymbolTable, UnitId};

/// Session-wide settings.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct SessionConfig {
    /// Stop scheduling further phases once this many errors were reported
    /// by the phases before. 0 means unlimited.
    pub error_limit: usize,
    /// Process units on worker threads.
    pub parallel: bool,
    pub diagnostics: DiagnosticConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            error_limit: 100,
            parallel: true,
            diagnostics: DiagnosticConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Never stop early and keep every diagnostic (for testing).
    pub fn unlimited() -> Self {
        SessionConfig {
            error_limit: 0,
            diagnostics: DiagnosticConfig::unlimited(),
            ..Self::default()
        }
    }
}

/// Misuse of the session API.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("session already compiled; units cannot be added")]
    AlreadyCompiled,
    #[error("session has not been compiled yet")]
    NotCompiled,
}

pub struct Session {
    config: SessionConfig,
    interner: SharedInterner,
    pool: Pool,
    symbols: SymbolTable,
    sources: Vec<SourceUnit>,
    units: Vec<CompilationUnit>,
    budget: ErrorBudget,
    compiled: bool,
}

impl Session {
    pub fn new(config: SessionConfig, interner: SharedInterner) -> Self {
        let budget = ErrorBudget::new(config.error_limit);
        Session {
            config,
            interner,
            pool: Pool::new(),
            symbols: SymbolTable::new(),
            sources: Vec::new(),
            units: Vec::new(),
            budget,
            compiled: false,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Queue a unit. Units are numbered, and diagnostics ordered, by the
    /// order they are added.
    pub fn add_unit(&mut self, source: SourceUnit) -> Result<UnitId, SessionError> {
        if self.compiled {
            return Err(SessionError::AlreadyCompiled);
        }
        let raw = u32::try_from(self.sources.len())
            .unwrap_or_else(|_| panic!("session exceeded u32::MAX units"));
        self.sources.push(source);
        Ok(UnitId::new(raw))
    }

    /// Run every phase over every queued unit.
    #[tracing::instrument(level = "debug", skip_all, fields(units = self.sources.len()))]
    pub fn compile(&mut self) -> Result<(), SessionError> {
        if self.compiled {
            return Err(SessionError::AlreadyCompiled);
        }
        self.compiled = true;
        let sources = std::mem::take(&mut self.sources);
        let (pool, symbols, interner) = (&self.pool, &self.symbols, &*self.interner);
        let declare = |(index, source): (usize, SourceUnit)| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "add_unit keeps the unit count within u32"
            )]
            let id = UnitId::new(index as u32);
            declare_unit(id, source, pool, symbols, interner)
        };
        let mut units: Vec<CompilationUnit> = if self.config.parallel {
            sources.into_par_iter().enumerate().map(declare).collect()
        } else {
            sources.into_iter().enumerate().map(declare).collect()
        };
        for unit in &mut units {
            unit.diagnostics = DiagnosticBuffer::with_config(self.config.diagnostics.clone());
        }
        tracing::debug!(symbols = self.symbols.len(), "declare phase complete");

        for stage in Stage::ALL {
            self.run_phase(stage, &mut units);
        }
        self.units = units;
        tracing::debug!(errors = self.error_count(), "compilation complete");
        Ok(())
    }

    fn run_phase(&self, stage: Stage, units: &mut [CompilationUnit]) {
        let budget = &self.budget;
        // Checked once per phase: every unit sees the same answer.
        if budget.limit_reached() {
            tracing::debug!(%stage, spent = budget.spent(), "error limit reached; skipping phase");
            return;
        }
        let pipeline = self.pipeline();
        let run = |unit: &mut CompilationUnit| {
            if stage.target().predecessor() != Some(unit.progress) {
                tracing::debug!(unit = %unit.name, %stage, "skipping phase");
                return;
            }
            let before = unit.diagnostics.error_count();
            pipeline.run_stage(stage, unit);
            budget.charge(unit.diagnostics.error_count() - before);
        };
        if self.config.parallel {
            units.par_iter_mut().for_each(run);
        } else {
            units.iter_mut().for_each(run);
        }
        tracing::debug!(%stage, spent = budget.spent(), "phase complete");
    }

    pub fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(&self.pool, &self.symbols, &self.interner)
    }

    pub fn units(&self) -> &[CompilationUnit] {
        &self.units
    }

    pub fn unit(&self, id: UnitId) -> Option<&CompilationUnit> {
        self.units.get(id.index())
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    /// Every diagnostic, in unit order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        DiagnosticBuffer::merge_in_order(self.units.iter().map(|u| &u.diagnostics))
    }

    pub fn error_count(&self) -> usize {
        self.units.iter().map(|u| u.diagnostics.error_count()).sum()
    }

    /// Hand every unit to `emitter`, unless an error was reported anywhere.
    ///
    /// # Panics
    /// Panics with an internal compiler error if called before
    /// [`Session::compile`], or if a unit did not reach the final stage
    /// without any error having been reported.
    pub fn emit(&self, emitter: &mut dyn CodeEmitter) -> Result<(), ErrorGuaranteed> {
        assert!(
            self.compiled,
            "internal compiler error: {}",
            SessionError::NotCompiled
        );
        if let Some(guar) = ErrorGuaranteed::from_error_count(self.error_count()) {
            return Err(guar);
        }
        for unit in &self.units {
            assert!(
                unit.all_members_at(ResolutionState::ConstantsFolded),
                "internal compiler error: unit `{}` reached emission at {:?}",
                unit.name,
                unit.progress
            );
            emitter.begin_unit(unit);
            for (id, member) in unit.members.iter() {
                emitter.emit_member(unit, id, member);
            }
            for (&expr, lowered) in sorted(&unit.lowered) {
                emitter.emit_match(unit, expr, lowered);
            }
            emitter.end_unit(unit);
        }
        Ok(())
    }
}

/// Map entries in key order, so emission order is deterministic.
fn sorted<K: Ord, V>(map: &rustc_hash::FxHashMap<K, V>) -> Vec<(&K, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}
