//! Error types for a reconciliation pass.

use std::error::Error;
use std::fmt;

use thiserror::Error;

use crate::guard::GuardViolation;

/// Pre-diff stage of the pass that failed fatally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Session bootstrap against the daemon.
    Authenticate,
    /// Retrieval of the desired identifier list.
    FetchDesired,
    /// Inventory read from the daemon.
    FetchCurrent,
}

impl Stage {
    /// Stable label used in logs and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authenticate => "authenticate",
            Self::FetchDesired => "fetch_desired",
            Self::FetchCurrent => "fetch_current",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failures of a pass. Neither variant leaves the daemon partially mutated.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A guard tripped before any mutation.
    #[error("reconciliation aborted: {0}")]
    Aborted(#[from] GuardViolation),
    /// Authentication, desired-list fetch, or inventory read failed.
    #[error("reconciliation failed during {stage}")]
    Fatal {
        /// Stage that failed.
        stage: Stage,
        /// Underlying failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl SyncError {
    /// Build a fatal error for `stage` from a collaborator failure.
    #[must_use]
    pub fn fatal(stage: Stage, source: anyhow::Error) -> Self {
        Self::Fatal {
            stage,
            source: source.into(),
        }
    }
}

/// Convenience alias for pass results.
pub type SyncResult<T> = Result<T, SyncError>;
