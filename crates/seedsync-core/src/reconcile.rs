//! Reconciliation pass: authenticate, snapshot both sides, plan, then remove and add.
//!
//! # Design
//! - [`ReconcilePass::prepare`] covers every step that may fail the run; nothing mutates there.
//! - [`ReconcilePass::apply`] never fails as a whole. Removal and addition are independent
//!   phases and every per-item problem lands in the [`RunReport`].
//! - Additions run through a bounded unordered stream; no item depends on another.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Stage, SyncError, SyncResult};
use crate::guard::GuardPipeline;
use crate::model::{AddResult, Diff, Identifier, IdentifierSet, SessionToken};
use crate::plan::plan;
use crate::service::{DesiredStateSource, TorrentDaemon};

/// Knobs for one pass.
#[derive(Debug, Clone, Copy)]
pub struct PassOptions {
    /// Upper bound on concurrent fetch-then-submit additions; `1` is sequential.
    pub add_concurrency: usize,
    /// Stop after planning without touching the daemon.
    pub dry_run: bool,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            add_concurrency: 4,
            dry_run: false,
        }
    }
}

/// Result of the batched removal phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemovalOutcome {
    /// Nothing to remove, or the pass was a dry run.
    Skipped,
    /// The daemon acknowledged the batch.
    Removed {
        /// Number of identifiers in the batch.
        count: usize,
    },
    /// The batch request failed.
    Failed {
        /// Failure description.
        reason: String,
    },
}

/// Aggregate outcome of a pass that got past the guards.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Diff the pass acted on.
    pub diff: Diff,
    /// Removal phase outcome.
    pub removal: RemovalOutcome,
    /// Identifiers the daemon accepted (including ones it already had).
    pub added: IdentifierSet,
    /// Identifiers whose payload could not be fetched, with the reason.
    pub skipped: BTreeMap<Identifier, String>,
    /// Identifiers the daemon rejected, with the reason.
    pub failed: BTreeMap<Identifier, String>,
    /// Whether mutation was suppressed.
    pub dry_run: bool,
    /// When the pass started.
    pub started_at: DateTime<Utc>,
    /// When the pass finished.
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    fn new(diff: Diff, started_at: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            diff,
            removal: RemovalOutcome::Skipped,
            added: IdentifierSet::new(),
            skipped: BTreeMap::new(),
            failed: BTreeMap::new(),
            dry_run,
            started_at,
            finished_at: started_at,
        }
    }

    /// Whether any item was skipped or rejected, or the removal batch failed.
    #[must_use]
    pub fn has_partial_failures(&self) -> bool {
        !self.skipped.is_empty()
            || !self.failed.is_empty()
            || matches!(self.removal, RemovalOutcome::Failed { .. })
    }
}

/// State captured once the pass cleared authentication, both snapshots, and the guards.
#[derive(Debug, Clone)]
pub struct PreparedPass {
    session: SessionToken,
    diff: Diff,
    started_at: DateTime<Utc>,
}

impl PreparedPass {
    /// Planned diff, available for auditing before anything mutates.
    #[must_use]
    pub const fn diff(&self) -> &Diff {
        &self.diff
    }
}

enum ItemOutcome {
    Added,
    Skipped(String),
    Failed(String),
}

/// One reconciliation pass against a daemon.
pub struct ReconcilePass {
    source: Arc<dyn DesiredStateSource>,
    daemon: Arc<dyn TorrentDaemon>,
    guards: GuardPipeline,
    options: PassOptions,
}

impl ReconcilePass {
    /// Wire a pass from its collaborators.
    #[must_use]
    pub fn new(
        source: Arc<dyn DesiredStateSource>,
        daemon: Arc<dyn TorrentDaemon>,
        guards: GuardPipeline,
        options: PassOptions,
    ) -> Self {
        Self {
            source,
            daemon,
            guards,
            options,
        }
    }

    /// Run the whole pass: [`Self::prepare`] then [`Self::apply`].
    ///
    /// # Errors
    ///
    /// See [`Self::prepare`].
    pub async fn run(&self) -> SyncResult<RunReport> {
        let prepared = self.prepare().await?;
        Ok(self.apply(prepared).await)
    }

    /// Authenticate, fetch desired and current sets, and plan the diff.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Fatal`] when authentication or either snapshot fails, and
    /// [`SyncError::Aborted`] when a guard trips. The daemon is never mutated here.
    pub async fn prepare(&self) -> SyncResult<PreparedPass> {
        let started_at = Utc::now();

        let session = self
            .daemon
            .authenticate()
            .await
            .map_err(|err| SyncError::fatal(Stage::Authenticate, err))?;
        debug!("daemon session established");

        let desired = self
            .source
            .desired()
            .await
            .map_err(|err| SyncError::fatal(Stage::FetchDesired, err))?;
        debug!(count = desired.len(), "desired set fetched");

        let current = self
            .daemon
            .list_current(&session)
            .await
            .map_err(|err| SyncError::fatal(Stage::FetchCurrent, err))?;
        debug!(count = current.len(), "current set fetched");

        let diff = plan(&desired, &current, &self.guards)?;

        Ok(PreparedPass {
            session,
            diff,
            started_at,
        })
    }

    /// Remove then add according to the prepared diff.
    pub async fn apply(&self, prepared: PreparedPass) -> RunReport {
        let PreparedPass {
            session,
            diff,
            started_at,
        } = prepared;

        if self.options.dry_run {
            info!("dry run; daemon left untouched");
            let mut report = RunReport::new(diff, started_at, true);
            report.finished_at = Utc::now();
            return report;
        }

        let removal = self.remove_phase(&session, &diff.to_remove).await;
        let outcomes = self.add_phase(&session, &diff.to_add).await;

        let mut report = RunReport::new(diff, started_at, false);
        report.removal = removal;
        for (id, outcome) in outcomes {
            match outcome {
                ItemOutcome::Added => {
                    report.added.insert(id);
                }
                ItemOutcome::Skipped(reason) => {
                    report.skipped.insert(id, reason);
                }
                ItemOutcome::Failed(reason) => {
                    report.failed.insert(id, reason);
                }
            }
        }
        report.finished_at = Utc::now();

        info!(
            added = report.added.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "reconciliation pass complete"
        );
        report
    }

    async fn remove_phase(&self, session: &SessionToken, ids: &IdentifierSet) -> RemovalOutcome {
        if ids.is_empty() {
            return RemovalOutcome::Skipped;
        }
        match self.daemon.remove(session, ids).await {
            Ok(()) => {
                info!(count = ids.len(), "removal batch applied");
                RemovalOutcome::Removed { count: ids.len() }
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(
                    count = ids.len(),
                    error = %reason,
                    "removal batch failed; continuing with additions"
                );
                RemovalOutcome::Failed { reason }
            }
        }
    }

    async fn add_phase(
        &self,
        session: &SessionToken,
        ids: &IdentifierSet,
    ) -> Vec<(Identifier, ItemOutcome)> {
        stream::iter(ids.iter().cloned())
            .map(|id| async move {
                let outcome = self.add_one(session, &id).await;
                (id, outcome)
            })
            .buffer_unordered(self.options.add_concurrency.max(1))
            .collect()
            .await
    }

    async fn add_one(&self, session: &SessionToken, id: &Identifier) -> ItemOutcome {
        let payload = match self.source.payload(id).await {
            Ok(payload) if payload.is_empty() => {
                warn!(%id, "payload empty; skipping");
                return ItemOutcome::Skipped("empty payload".to_string());
            }
            Ok(payload) => payload,
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(%id, error = %reason, "payload unavailable; skipping");
                return ItemOutcome::Skipped(reason);
            }
        };

        match self.daemon.add(session, payload).await {
            Ok(AddResult::Added) => {
                debug!(%id, "torrent added");
                ItemOutcome::Added
            }
            Ok(AddResult::Duplicate) => {
                debug!(%id, "daemon already had torrent");
                ItemOutcome::Added
            }
            Err(err) => {
                let reason = format!("{err:#}");
                warn!(%id, error = %reason, "daemon rejected torrent");
                ItemOutcome::Failed(reason)
            }
        }
    }
}
