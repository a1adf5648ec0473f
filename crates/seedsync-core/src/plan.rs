//! Diff computation gated by the guard pipeline.

use crate::guard::{GuardPipeline, GuardViolation};
use crate::model::{Diff, IdentifierSet};

/// Read-only view handed to every guard.
#[derive(Debug, Clone, Copy)]
pub struct PlanContext<'a> {
    /// Identifiers that should be loaded.
    pub desired: &'a IdentifierSet,
    /// Identifiers the daemon reports as loaded.
    pub current: &'a IdentifierSet,
    /// Diff computed from the two sets.
    pub diff: &'a Diff,
}

/// Compute the diff between `desired` and `current` and run it past `guards`.
///
/// # Errors
///
/// Returns the first [`GuardViolation`] raised by the pipeline.
pub fn plan(
    desired: &IdentifierSet,
    current: &IdentifierSet,
    guards: &GuardPipeline,
) -> Result<Diff, GuardViolation> {
    let diff = Diff::between(desired, current);
    guards.check(&PlanContext {
        desired,
        current,
        diff: &diff,
    })?;
    tracing::info!(
        desired = desired.len(),
        current = current.len(),
        to_add = diff.to_add.len(),
        to_remove = diff.to_remove.len(),
        "plan computed"
    );
    Ok(diff)
}
