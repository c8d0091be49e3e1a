//! The sync engine: one object per process owning the queue, the cache, the
//! in-progress flag and the observers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

use super::cache::{MaxAge, ReadCache};
use super::monitor::{ConnectivityMonitor, Trigger};
use super::observers::{ObserverId, ObserverRegistry};
use super::operation::{Operation, PendingOperation};
use super::queue::{PendingQueue, QueueStats};
use super::reconciler::{reconcile, SyncReport};
use crate::core::{format_date, local_today};
use crate::error::ChoreSyncError;
use crate::remote::{chores, Connectivity, RemoteStore};
use crate::storage::KeyValueStore;

/// Default bound on registered observers.
pub const DEFAULT_MAX_OBSERVERS: usize = 16;

/// A read served by [`SyncEngine::fetch_with_offline`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched {
    pub data: Value,
    pub from_cache: bool,
    pub offline: bool,
}

/// In-progress flag; at most one reconciliation pass at a time.
#[derive(Debug, Default)]
struct SyncGate {
    running: AtomicBool,
}

struct GateGuard<'g>(&'g AtomicBool);

impl SyncGate {
    fn try_begin(&self) -> Option<GateGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GateGuard(&self.running))
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SyncEngine<'a> {
    queue: PendingQueue<'a>,
    cache: ReadCache<'a>,
    remote: &'a dyn RemoteStore,
    connectivity: &'a dyn Connectivity,
    gate: SyncGate,
    observers: ObserverRegistry,
}

impl<'a> SyncEngine<'a> {
    #[must_use]
    pub fn new(
        store: &'a dyn KeyValueStore,
        remote: &'a dyn RemoteStore,
        connectivity: &'a dyn Connectivity,
    ) -> Self {
        Self {
            queue: PendingQueue::new(store),
            cache: ReadCache::new(store),
            remote,
            connectivity,
            gate: SyncGate::default(),
            observers: ObserverRegistry::new(DEFAULT_MAX_OBSERVERS),
        }
    }

    #[must_use]
    pub fn with_max_observers(mut self, max: usize) -> Self {
        self.observers = ObserverRegistry::new(max);
        self
    }

    #[must_use]
    pub const fn queue(&self) -> &PendingQueue<'a> {
        &self.queue
    }

    #[must_use]
    pub const fn cache(&self) -> &ReadCache<'a> {
        &self.cache
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    #[must_use]
    pub fn is_syncing(&self) -> bool {
        self.gate.is_running()
    }

    /// Register a listener for finished passes.
    ///
    /// # Errors
    ///
    /// Returns [`ChoreSyncError::TooManyObservers`] when the limit is reached.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&SyncReport) + 'static,
    ) -> Result<ObserverId, ChoreSyncError> {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Run one reconciliation pass and publish its report.
    ///
    /// Returns `None` without doing anything if a pass is already running.
    /// Observers are not notified when the pass was skipped for being offline.
    ///
    /// # Errors
    ///
    /// Returns an error only if local storage fails.
    pub fn sync_now(&self) -> Result<Option<SyncReport>, ChoreSyncError> {
        let report = {
            let Some(_pass) = self.gate.try_begin() else {
                tracing::debug!("reconciliation already in progress, dropping request");
                return Ok(None);
            };
            reconcile(&self.queue, self.remote, self.connectivity)?
        };

        if !report.offline {
            self.observers.publish(&report);
        }
        Ok(Some(report))
    }

    /// Handle a trigger from the connectivity monitor or the user.
    ///
    /// # Errors
    ///
    /// Returns an error only if local storage fails.
    pub fn on_trigger(&self, trigger: Trigger) -> Result<Option<SyncReport>, ChoreSyncError> {
        tracing::debug!(?trigger, "sync triggered");
        self.sync_now()
    }

    /// Queue an operation, then sync right away if online. The pass itself
    /// checks connectivity once; offline it returns without publishing.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot be queued.
    pub fn submit(&self, operation: Operation) -> Result<PendingOperation, ChoreSyncError> {
        let pending = self.queue.enqueue(operation)?;
        self.sync_now()?;
        Ok(pending)
    }

    /// Complete a chore for today. See [`Self::complete_chore_offline_on`].
    ///
    /// # Errors
    ///
    /// Returns an error if local storage fails.
    pub fn complete_chore_offline(
        &self,
        assignment_id: &str,
        child_id: &str,
        xp_earned: i64,
    ) -> Result<String, ChoreSyncError> {
        self.complete_chore_offline_on(assignment_id, child_id, xp_earned, local_today())
    }

    /// Queue a chore completion and add a pending record to the cached
    /// completions for that child and day. Returns the idempotency token.
    ///
    /// The pending record stays in the cache until the next successful fetch
    /// of the same key replaces it.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage fails.
    pub fn complete_chore_offline_on(
        &self,
        assignment_id: &str,
        child_id: &str,
        xp_earned: i64,
        date: NaiveDate,
    ) -> Result<String, ChoreSyncError> {
        let operation = Operation::complete_chore(assignment_id, child_id, xp_earned, date);
        let offline_id = operation.offline_id().to_string();
        self.queue.enqueue(operation)?;

        let key = chores::completions_cache_key(child_id, date);
        let mut rows = match self.cache.get(&key, MaxAge::Unbounded)? {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        };
        rows.push(json!({
            "id": offline_id,
            "assignment_id": assignment_id,
            "child_id": child_id,
            "xp_earned": xp_earned,
            "completion_date": format_date(date),
            "offline_id": offline_id,
            "pending": true,
        }));
        self.cache.put(&key, Value::Array(rows))?;

        self.sync_now()?;
        Ok(offline_id)
    }

    /// Read through the cache.
    ///
    /// Offline, any cached value is served regardless of age. Online, the
    /// fetch result replaces the cache entry; if the fetch fails, a cache
    /// entry no older than `max_age` is served instead.
    ///
    /// # Errors
    ///
    /// Returns [`ChoreSyncError::OfflineUnavailable`] when offline with
    /// nothing cached, or the fetch error when online with no fresh entry.
    pub fn fetch_with_offline<F>(
        &self,
        key: &str,
        max_age: Duration,
        fetch: F,
    ) -> Result<Fetched, ChoreSyncError>
    where
        F: FnOnce(&dyn RemoteStore) -> Result<Value, ChoreSyncError>,
    {
        if !self.connectivity.is_online() {
            return self
                .cache
                .get(key, MaxAge::Unbounded)?
                .map(|data| Fetched {
                    data,
                    from_cache: true,
                    offline: true,
                })
                .ok_or_else(|| ChoreSyncError::OfflineUnavailable(key.to_string()));
        }

        match fetch(self.remote) {
            Ok(data) => {
                self.cache.put(key, data.clone())?;
                Ok(Fetched {
                    data,
                    from_cache: false,
                    offline: false,
                })
            },
            Err(e) => {
                if let Some(data) = self.cache.get(key, MaxAge::Within(max_age))? {
                    tracing::warn!(key, error = %e, "fetch failed, serving cached data");
                    return Ok(Fetched {
                        data,
                        from_cache: true,
                        offline: false,
                    });
                }
                Err(e)
            },
        }
    }

    /// Today's chore completions for a child, through the cache.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch_with_offline`].
    pub fn todays_completions(
        &self,
        child_id: &str,
        max_age: Duration,
    ) -> Result<Fetched, ChoreSyncError> {
        self.completions_on(child_id, local_today(), max_age)
    }

    /// A child's chore completions for `date`, through the cache.
    ///
    /// # Errors
    ///
    /// See [`Self::fetch_with_offline`].
    pub fn completions_on(
        &self,
        child_id: &str,
        date: NaiveDate,
        max_age: Duration,
    ) -> Result<Fetched, ChoreSyncError> {
        let key = chores::completions_cache_key(child_id, date);
        self.fetch_with_offline(&key, max_age, |remote| {
            chores::todays_completions(remote, child_id, date).map(Value::Array)
        })
    }

    /// # Errors
    ///
    /// Returns an error if local storage fails.
    pub fn has_pending_sync(&self) -> Result<bool, ChoreSyncError> {
        Ok(!self.queue.is_empty()?)
    }

    /// # Errors
    ///
    /// Returns an error if local storage fails.
    pub fn pending_count(&self) -> Result<usize, ChoreSyncError> {
        self.queue.len()
    }

    /// Assignment ids still queued for a child on a day.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage fails.
    pub fn pending_completions(
        &self,
        child_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<String>, ChoreSyncError> {
        self.queue.pending_completions(child_id, date)
    }

    /// # Errors
    ///
    /// Returns an error if local storage fails.
    pub fn stats(&self) -> Result<QueueStats, ChoreSyncError> {
        self.queue.stats()
    }

    /// Poll connectivity until `keep_going` returns false, syncing whenever
    /// the monitor fires.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage fails.
    pub fn watch(
        &self,
        monitor: &mut ConnectivityMonitor,
        poll: Duration,
        mut keep_going: impl FnMut() -> bool,
    ) -> Result<(), ChoreSyncError> {
        tracing::info!(interval = ?monitor.interval(), "watching connectivity");
        while keep_going() {
            let online = self.connectivity.is_online();
            if let Some(trigger) = monitor.observe(online, Instant::now()) {
                self.on_trigger(trigger)?;
            }
            if !poll.is_zero() {
                std::thread::sleep(poll);
            }
        }
        Ok(())
    }
}
