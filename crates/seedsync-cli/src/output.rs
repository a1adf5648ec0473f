//! Stdout rendering and the end-of-run summary.

use std::io::Write;

use anyhow::anyhow;
use seedsync_core::{Diff, RemovalOutcome, RunReport};
use tracing::{info, warn};

use crate::client::{CliError, CliResult};

/// Print the planned diff as pretty JSON, one document per run.
pub(crate) fn render_diff(out: &mut impl Write, diff: &Diff) -> CliResult<()> {
    let text = serde_json::to_string_pretty(diff)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    writeln!(out, "{text}")
        .and_then(|()| out.flush())
        .map_err(|err| CliError::failure(anyhow!("failed to write diff: {err}")))
}

/// Log the end-of-run summary. Per-item problems were already logged as they happened.
pub(crate) fn log_summary(report: &RunReport) {
    let elapsed_ms = (report.finished_at - report.started_at).num_milliseconds();
    let removal = removal_label(&report.removal);
    if report.has_partial_failures() {
        warn!(
            to_add = report.diff.to_add.len(),
            to_remove = report.diff.to_remove.len(),
            removal,
            added = report.added.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            elapsed_ms,
            "reconciliation finished with item failures"
        );
    } else {
        info!(
            dry_run = report.dry_run,
            to_add = report.diff.to_add.len(),
            to_remove = report.diff.to_remove.len(),
            removal,
            added = report.added.len(),
            elapsed_ms,
            "reconciliation finished"
        );
    }
}

const fn removal_label(outcome: &RemovalOutcome) -> &'static str {
    match outcome {
        RemovalOutcome::Skipped => "skipped",
        RemovalOutcome::Removed { .. } => "removed",
        RemovalOutcome::Failed { .. } => "failed",
    }
}
