//! Run-scoped tracing context.
//!
//! Every reconciliation pass runs inside a `run` span carrying a fresh identifier so the
//! log lines of one pass can be correlated.

use tracing::Span;
use uuid::Uuid;

/// Generate an identifier for a new run.
#[must_use]
pub fn new_run_id() -> Uuid {
    Uuid::new_v4()
}

/// Span wrapping a single reconciliation pass.
#[must_use]
pub fn run_span(run_id: Uuid, dry_run: bool) -> Span {
    tracing::info_span!("run", run_id = %run_id, dry_run)
}
