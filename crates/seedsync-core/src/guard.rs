//! Pre-mutation guards that can abort a pass.
//!
//! # Design
//! - Each guard is independent and sees the same read-only [`PlanContext`].
//! - [`GuardPipeline`] runs guards in insertion order and stops at the first violation.

use thiserror::Error;

use crate::plan::PlanContext;

/// Reason a guard refused to let a pass mutate the daemon.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GuardViolation {
    /// The desired source returned fewer identifiers than expected.
    #[error("too few desired items ({observed} < minimum {minimum})")]
    TooFewDesired {
        /// Size of the desired set.
        observed: usize,
        /// Configured minimum.
        minimum: usize,
    },
    /// The diff would remove too large a share of what is loaded.
    #[error("removal ratio exceeded ({to_remove} of {current} loaded, limit {max_fraction})")]
    RemovalRatioExceeded {
        /// Number of identifiers slated for removal.
        to_remove: usize,
        /// Size of the current set.
        current: usize,
        /// Configured maximum fraction.
        max_fraction: f64,
    },
}

impl GuardViolation {
    /// Name of the guard that produced this violation.
    #[must_use]
    pub const fn guard(&self) -> &'static str {
        match self {
            Self::TooFewDesired { .. } => MinimumDesiredCount::NAME,
            Self::RemovalRatioExceeded { .. } => MaxRemovalFraction::NAME,
        }
    }
}

/// One pre-mutation check.
pub trait Guard: Send + Sync {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Inspect the planned diff.
    ///
    /// # Errors
    ///
    /// Returns the violation when the plan must not be applied.
    fn check(&self, ctx: &PlanContext<'_>) -> Result<(), GuardViolation>;
}

/// Abort when the desired set is smaller than `minimum`.
///
/// Protects against a truncated or empty upstream response being read as "delete everything".
#[derive(Debug, Clone, Copy)]
pub struct MinimumDesiredCount {
    /// Smallest acceptable desired set.
    pub minimum: usize,
}

impl MinimumDesiredCount {
    const NAME: &'static str = "minimum_desired_count";
}

impl Guard for MinimumDesiredCount {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn check(&self, ctx: &PlanContext<'_>) -> Result<(), GuardViolation> {
        let observed = ctx.desired.len();
        if observed < self.minimum {
            return Err(GuardViolation::TooFewDesired {
                observed,
                minimum: self.minimum,
            });
        }
        Ok(())
    }
}

/// Abort when more than `fraction` of the loaded torrents would be removed.
#[derive(Debug, Clone, Copy)]
pub struct MaxRemovalFraction {
    /// Largest acceptable `to_remove / current` ratio.
    pub fraction: f64,
}

impl MaxRemovalFraction {
    const NAME: &'static str = "max_removal_fraction";
}

impl Guard for MaxRemovalFraction {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[allow(clippy::cast_precision_loss)]
    fn check(&self, ctx: &PlanContext<'_>) -> Result<(), GuardViolation> {
        let current = ctx.current.len();
        if current == 0 {
            return Ok(());
        }
        let to_remove = ctx.diff.to_remove.len();
        if to_remove as f64 / current as f64 > self.fraction {
            return Err(GuardViolation::RemovalRatioExceeded {
                to_remove,
                current,
                max_fraction: self.fraction,
            });
        }
        Ok(())
    }
}

/// Ordered list of guards evaluated before any mutation.
#[derive(Default)]
pub struct GuardPipeline {
    guards: Vec<Box<dyn Guard>>,
}

impl GuardPipeline {
    /// Pipeline with no guards.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum-count guard followed by the removal-ratio guard.
    #[must_use]
    pub fn standard(minimum_expected_count: usize, max_removal_fraction: f64) -> Self {
        Self::new()
            .with(MinimumDesiredCount {
                minimum: minimum_expected_count,
            })
            .with(MaxRemovalFraction {
                fraction: max_removal_fraction,
            })
    }

    /// Append a guard; it runs after every guard already present.
    #[must_use]
    pub fn with(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    /// Guard names in evaluation order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|guard| guard.name()).collect()
    }

    /// Run every guard in order, stopping at the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first violation encountered.
    pub fn check(&self, ctx: &PlanContext<'_>) -> Result<(), GuardViolation> {
        for guard in &self.guards {
            guard.check(ctx).inspect_err(|violation| {
                tracing::warn!(guard = guard.name(), %violation, "guard tripped");
            })?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for GuardPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardPipeline")
            .field("guards", &self.names())
            .finish()
    }
}
