//! Session-wide error budget shared by worker threads.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts errors across all units and says when to stop scheduling work.
///
/// Charging is lock-free. The budget only gates *starting* a phase; work
/// already in flight is never interrupted.
#[derive(Debug, Default)]
pub struct ErrorBudget {
    /// Maximum number of errors before stopping (0 = unlimited).
    limit: usize,
    spent: AtomicUsize,
}

impl ErrorBudget {
    pub fn new(limit: usize) -> Self {
        ErrorBudget {
            limit,
            spent: AtomicUsize::new(0),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(0)
    }

    /// Record `errors` more errors.
    pub fn charge(&self, errors: usize) {
        if errors > 0 {
            self.spent.fetch_add(errors, Ordering::Relaxed);
        }
    }

    pub fn spent(&self) -> usize {
        self.spent.load(Ordering::Relaxed)
    }

    pub fn limit_reached(&self) -> bool {
        self.limit > 0 && self.spent() >= self.limit
    }
}

#[cfg(test)]
mod tests;
