//! Kiln resolve - symbol table, resolution pipeline and compilation
//! session.
//!
//! A [`Session`] takes parsed units, declares every name program-wide,
//! then drives each member through the four [`Stage`]s of the
//! [`Pipeline`]. Units run on rayon worker threads; the only shared state
//! is the type pool, the interner and the [`SymbolTable`], all internally
//! synchronized. Diagnostics are buffered per unit and merged in unit
//! order, so output is the same for any thread count.
//!
//! # Debugging
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=kiln_resolve=debug`) and call
//! [`init_tracing`] to see phase and stage spans as a tree.

mod declare;
mod emit;
mod pipeline;
mod session;
mod symbols;
pub mod testing;
mod unit;

use std::sync::Once;

pub use declare::declare_unit;
pub use emit::CodeEmitter;
pub use pipeline::{Pipeline, Stage};
pub use session::{Session, SessionConfig, SessionError};
pub use symbols::{Signature, Symbol, SymbolId, SymbolKind, SymbolTable};
pub use unit::{BoundUse, CompilationUnit, Resolution, UnitId};

static TRACING_INIT: Once = Once::new();

/// Install a hierarchical tracing subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset, or on any call after the first.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .init();
        }
    });
}
