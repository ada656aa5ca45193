//! Diagnostic system for the Kiln semantic core.
//!
//! A diagnostic is a value: an [`ErrorCode`] (the message key), a
//! [`Severity`], a mandatory [`Span`](kiln_ir::Span) and template
//! arguments. Stages report into a [`DiagnosticSink`] and continue; only
//! internal invariant breaches abort.
//!
//! # Error Guarantees
//!
//! ```text
//! // An ErrorGuaranteed exists only if an error was buffered
//! let proof = buffer.guarantee();
//!
//! // Emission refuses to run when errors exist
//! fn emit(&self) -> Result<(), ErrorGuaranteed> { ... }
//! ```

mod budget;
mod diagnostic;
mod error_code;
mod guarantee;
mod sink;

pub use budget::ErrorBudget;
pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::{Category, ErrorCode};
pub use guarantee::ErrorGuaranteed;
pub use sink::{DiagnosticBuffer, DiagnosticConfig, DiagnosticSink};
