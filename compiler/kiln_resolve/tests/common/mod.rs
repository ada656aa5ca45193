//! Shared helpers for the integration tests.

#![allow(dead_code)]

use kiln_diagnostic::ErrorCode;
use kiln_ir::{SharedInterner, SourceUnit};
use kiln_resolve::{Session, SessionConfig};

/// Compile `units` in order with no error limit.
pub fn compile(interner: &SharedInterner, units: Vec<SourceUnit>) -> Session {
    compile_with(SessionConfig::unlimited(), interner, units)
}

pub fn compile_with(config: SessionConfig, interner: &SharedInterner, units: Vec<SourceUnit>) -> Session {
    kiln_resolve::init_tracing();
    let mut session = Session::new(config, interner.clone());
    for unit in units {
        if let Err(err) = session.add_unit(unit) {
            panic!("add_unit failed: {err}");
        }
    }
    if let Err(err) = session.compile() {
        panic!("compile failed: {err}");
    }
    session
}

/// Codes of every diagnostic, in output order.
pub fn codes(session: &Session) -> Vec<ErrorCode> {
    session.diagnostics().iter().map(|d| d.code).collect()
}

pub fn count(session: &Session, code: ErrorCode) -> usize {
    session.diagnostics().iter().filter(|d| d.code == code).count()
}

/// Rendered messages, for assertion failure output.
pub fn messages(session: &Session) -> Vec<String> {
    session.diagnostics().iter().map(ToString::to_string).collect()
}
