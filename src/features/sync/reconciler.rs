//! Reconciliation pass: replay the pending queue against the remote store.

use colored::Colorize;
use serde::Serialize;

use super::operation::{Operation, OperationKind, PendingOperation};
use super::queue::PendingQueue;
use crate::error::ChoreSyncError;
use crate::remote::{chores, Connectivity, InsertOutcome, RemoteStore};

/// How a single queued operation fared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// A new row was persisted.
    Created,
    /// The remote store already had it; a replay of an earlier attempt.
    Duplicate,
    /// Left in the queue for the next pass.
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationOutcome {
    pub id: String,
    pub kind: OperationKind,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

/// Result of one reconciliation pass.
///
/// `synced` counts both new rows and duplicates; `replayed` is the subset
/// that were duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub synced: usize,
    pub failed: usize,
    pub replayed: usize,
    /// The pass was skipped because the remote store was unreachable.
    pub offline: bool,
    pub outcomes: Vec<OperationOutcome>,
}

impl SyncReport {
    #[must_use]
    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: OperationOutcome) {
        match outcome.status {
            OutcomeStatus::Created => self.synced += 1,
            OutcomeStatus::Duplicate => {
                self.synced += 1;
                self.replayed += 1;
            },
            OutcomeStatus::Failed { .. } => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.synced + self.failed
    }
}

/// Send one operation to the remote store.
///
/// # Errors
///
/// Returns the remote error for anything other than created or duplicate.
pub fn dispatch(remote: &dyn RemoteStore, operation: &Operation) -> Result<InsertOutcome, ChoreSyncError> {
    match operation {
        Operation::CompleteChore(op) => chores::complete_chore(remote, op),
        Operation::CompleteNightlyZone(op) => chores::complete_nightly_zone(remote, op),
        Operation::RequestBonusTask(op) => chores::request_bonus_task(remote, op),
    }
}

/// Replay a snapshot of the queue in FIFO order.
///
/// Remote failures are counted per operation and never abort the pass.
/// Operations queued while the pass runs wait for the next one.
///
/// # Errors
///
/// Returns an error only if local storage fails.
pub fn reconcile(
    queue: &PendingQueue<'_>,
    remote: &dyn RemoteStore,
    connectivity: &dyn Connectivity,
) -> Result<SyncReport, ChoreSyncError> {
    if !connectivity.is_online() {
        tracing::debug!("offline, skipping reconciliation");
        return Ok(SyncReport::offline());
    }

    let snapshot = queue.list()?;
    let mut report = SyncReport::default();

    for pending in &snapshot {
        let status = replay_one(queue, remote, pending)?;
        report.record(OperationOutcome {
            id: pending.id.clone(),
            kind: pending.operation.kind(),
            status,
        });
    }

    if report.total() > 0 {
        tracing::info!(
            synced = report.synced,
            replayed = report.replayed,
            failed = report.failed,
            "reconciliation pass finished"
        );
    }
    Ok(report)
}

fn replay_one(
    queue: &PendingQueue<'_>,
    remote: &dyn RemoteStore,
    pending: &PendingOperation,
) -> Result<OutcomeStatus, ChoreSyncError> {
    let offline_id = pending.operation.offline_id();
    match dispatch(remote, &pending.operation) {
        Ok(outcome) => {
            queue.dequeue(&pending.id)?;
            let status = match outcome {
                InsertOutcome::Created(_) => OutcomeStatus::Created,
                InsertOutcome::Duplicate => OutcomeStatus::Duplicate,
            };
            tracing::debug!(id = %pending.id, offline_id, ?status, "operation synced");
            Ok(status)
        },
        Err(e) => {
            tracing::warn!(id = %pending.id, offline_id, error = %e, "operation failed, keeping it queued");
            Ok(OutcomeStatus::Failed {
                error: e.to_string(),
            })
        },
    }
}

/// Format a report for terminal output.
#[must_use]
pub fn format_sync_report(report: &SyncReport) -> String {
    if report.offline {
        return format!("{} Offline, nothing synced", "○".yellow());
    }
    if report.outcomes.is_empty() {
        return "Nothing to sync".dimmed().to_string();
    }

    let mut lines = Vec::new();
    for outcome in &report.outcomes {
        let line = match &outcome.status {
            OutcomeStatus::Created => format!("{} {} {}", "✓".green(), outcome.kind, outcome.id.dimmed()),
            OutcomeStatus::Duplicate => format!(
                "{} {} {} {}",
                "✓".green(),
                outcome.kind,
                outcome.id.dimmed(),
                "(already synced)".dimmed()
            ),
            OutcomeStatus::Failed { error } => format!(
                "{} {} {}: {}",
                "✗".red(),
                outcome.kind,
                outcome.id.dimmed(),
                error.red()
            ),
        };
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(format!(
        "Synced: {}  Failed: {}",
        report.synced.to_string().green(),
        if report.failed > 0 {
            report.failed.to_string().red().to_string()
        } else {
            report.failed.to_string()
        }
    ));

    lines.join("\n")
}
