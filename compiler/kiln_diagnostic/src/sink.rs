//! Where stages send their diagnostics.
//!
//! Stages never return `Err` for a recoverable problem. They report into a
//! [`DiagnosticSink`] and keep going. Each compilation unit owns one
//! [`DiagnosticBuffer`]; the session merges buffers in unit order once all
//! stages are done, so output order does not depend on thread scheduling.

use rustc_hash::FxHashSet;

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed, Severity};

/// Accepts `(position, severity, message-key, message-args)` reports.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);

    /// Number of error-severity diagnostics accepted so far.
    fn error_count(&self) -> usize;

    fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }

    fn error_count(&self) -> usize {
        self.iter().filter(|d| d.is_error()).count()
    }
}

/// Configuration for diagnostic buffering.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Drop a diagnostic identical in code, position and arguments to one
    /// already buffered.
    pub deduplicate: bool,
    /// Promote warnings to errors.
    pub warnings_as_errors: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            deduplicate: true,
            warnings_as_errors: false,
        }
    }
}

impl DiagnosticConfig {
    /// Keep everything as reported (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            deduplicate: false,
            warnings_as_errors: false,
        }
    }
}

/// Per-unit diagnostic buffer.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticBuffer {
    diagnostics: Vec<Diagnostic>,
    seen: FxHashSet<(ErrorCode, kiln_ir::Span, Vec<String>)>,
    error_count: usize,
    config: DiagnosticConfig,
}

impl DiagnosticBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticBuffer {
            config,
            ..Self::default()
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics with the given code, in report order.
    pub fn with_code(&self, code: ErrorCode) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.code == code)
    }

    /// Proof of failure if any error was buffered.
    pub fn guarantee(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Concatenate buffers in the order given.
    pub fn merge_in_order<'a>(buffers: impl IntoIterator<Item = &'a DiagnosticBuffer>) -> Vec<Diagnostic> {
        buffers
            .into_iter()
            .flat_map(|b| b.diagnostics.iter().cloned())
            .collect()
    }
}

impl DiagnosticSink for DiagnosticBuffer {
    fn report(&mut self, mut diagnostic: Diagnostic) {
        if self.config.deduplicate
            && !self.seen.insert((diagnostic.code, diagnostic.span, diagnostic.args.clone()))
        {
            return;
        }
        if self.config.warnings_as_errors && diagnostic.severity == Severity::Warning {
            diagnostic.severity = Severity::Error;
        }
        if diagnostic.is_error() {
            self.error_count += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    fn error_count(&self) -> usize {
        self.error_count
    }
}

#[cfg(test)]
mod tests;
