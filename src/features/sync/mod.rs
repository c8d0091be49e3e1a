//! Offline write queue, read cache and reconciliation.
//!
//! Writes are queued locally and replayed against the remote store when it
//! is reachable. Reads go through a time-stamped cache that can serve stale
//! data while offline.
//!
//! - [`PendingQueue`]: durable FIFO of [`Operation`]s
//! - [`ReadCache`]: keyed JSON snapshots with capture timestamps
//! - [`reconcile`]: one replay pass, tolerant of partial failure
//! - [`ConnectivityMonitor`]: reconnect and periodic triggers
//! - [`SyncEngine`]: ties the above together for one process

pub mod cache;
pub mod engine;
pub mod monitor;
pub mod observers;
pub mod operation;
pub mod queue;
pub mod reconciler;

pub use cache::{CacheEntry, MaxAge, ReadCache, CACHE_KEY};
pub use engine::{Fetched, SyncEngine, DEFAULT_MAX_OBSERVERS};
pub use monitor::{ConnectivityMonitor, Trigger};
pub use observers::{ObserverId, ObserverRegistry};
pub use operation::{Operation, OperationKind, PendingOperation};
pub use queue::{PendingQueue, QueueStats, QUEUE_KEY};
pub use reconciler::{format_sync_report, reconcile, OperationOutcome, OutcomeStatus, SyncReport};
