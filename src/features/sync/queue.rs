//! Durable pending-operation queue.
//!
//! The whole queue is one JSON array stored under [`QUEUE_KEY`]. It is
//! append/remove only: operations are never edited in place.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::operation::{Operation, PendingOperation};
use crate::error::ChoreSyncError;
use crate::storage::KeyValueStore;

/// Storage key holding the queue.
pub const QUEUE_KEY: &str = "chore_chart_pending_queue";

/// Summary of the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub pending: usize,
    pub oldest_pending: Option<DateTime<Utc>>,
}

/// FIFO queue of writes waiting for the remote store.
pub struct PendingQueue<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> PendingQueue<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Append an operation, assigning its queue id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue cannot be persisted.
    pub fn enqueue(&self, operation: Operation) -> Result<PendingOperation, ChoreSyncError> {
        let pending = PendingOperation::new(operation);
        let mut queue = self.list()?;
        queue.push(pending.clone());
        self.save(&queue)?;

        tracing::debug!(
            id = %pending.id,
            kind = %pending.operation.kind(),
            "queued operation"
        );
        Ok(pending)
    }

    /// Remove one operation by id. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue cannot be persisted.
    pub fn dequeue(&self, id: &str) -> Result<bool, ChoreSyncError> {
        let mut queue = self.list()?;
        let before = queue.len();
        queue.retain(|op| op.id != id);
        if queue.len() == before {
            return Ok(false);
        }
        self.save(&queue)?;
        Ok(true)
    }

    /// All pending operations in the order they were queued.
    ///
    /// Unreadable stored content is treated as an empty queue.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails.
    pub fn list(&self) -> Result<Vec<PendingOperation>, ChoreSyncError> {
        let Some(raw) = self.store.get(QUEUE_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(queue) => Ok(queue),
            Err(e) => {
                tracing::warn!(error = %e, "pending queue is unreadable, treating as empty");
                Ok(Vec::new())
            },
        }
    }

    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn len(&self) -> Result<usize, ChoreSyncError> {
        Ok(self.list()?.len())
    }

    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn is_empty(&self) -> Result<bool, ChoreSyncError> {
        Ok(self.list()?.is_empty())
    }

    /// Drop every pending operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn clear(&self) -> Result<(), ChoreSyncError> {
        self.store.remove(QUEUE_KEY)
    }

    /// Assignment ids of chore completions still queued for a child on a day.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn pending_completions(
        &self,
        child_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<String>, ChoreSyncError> {
        Ok(self
            .list()?
            .into_iter()
            .filter_map(|pending| match pending.operation {
                Operation::CompleteChore(op)
                    if op.child_id == child_id && op.completion_date == date =>
                {
                    Some(op.assignment_id)
                },
                _ => None,
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn stats(&self) -> Result<QueueStats, ChoreSyncError> {
        let queue = self.list()?;
        Ok(QueueStats {
            pending: queue.len(),
            oldest_pending: queue.iter().map(|op| op.created_at).min(),
        })
    }

    fn save(&self, queue: &[PendingOperation]) -> Result<(), ChoreSyncError> {
        let raw = serde_json::to_string(queue)?;
        self.store.set(QUEUE_KEY, &raw)
    }
}
