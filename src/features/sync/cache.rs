//! Time-stamped read cache.
//!
//! All entries live in one JSON object under [`CACHE_KEY`], keyed by query.
//! There is no eviction: entries are replaced by key or wiped with `clear`.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChoreSyncError;
use crate::storage::KeyValueStore;

/// Storage key holding the cache.
pub const CACHE_KEY: &str = "chore_chart_cache";

/// A cached value and when it was captured (unix millis).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Value,
    pub timestamp: i64,
}

/// How old a cache entry may be and still count as a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxAge {
    Within(Duration),
    /// Ignore staleness. Used for forced-offline reads.
    Unbounded,
}

impl MaxAge {
    fn allows(self, age_ms: i64) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Within(max) => {
                let max_ms = i64::try_from(max.as_millis()).unwrap_or(i64::MAX);
                age_ms <= max_ms
            },
        }
    }
}

impl From<Duration> for MaxAge {
    fn from(max: Duration) -> Self {
        Self::Within(max)
    }
}

pub struct ReadCache<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> ReadCache<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Store `data` under `key` stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be persisted.
    pub fn put(&self, key: &str, data: Value) -> Result<(), ChoreSyncError> {
        self.put_at(key, data, Utc::now().timestamp_millis())
    }

    /// Store `data` under `key` with an explicit capture time.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache cannot be persisted.
    pub fn put_at(&self, key: &str, data: Value, timestamp: i64) -> Result<(), ChoreSyncError> {
        let mut entries = self.entries()?;
        entries.insert(key.to_string(), CacheEntry { data, timestamp });
        let raw = serde_json::to_string(&entries)?;
        self.store.set(CACHE_KEY, &raw)
    }

    /// Look up `key`. A missing or too-old entry is a miss, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails.
    pub fn get(&self, key: &str, max_age: MaxAge) -> Result<Option<Value>, ChoreSyncError> {
        self.get_at(key, max_age, Utc::now().timestamp_millis())
    }

    /// Look up `key` as of `now` (unix millis). An entry whose age cannot be
    /// computed is a miss.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails.
    pub fn get_at(
        &self,
        key: &str,
        max_age: MaxAge,
        now: i64,
    ) -> Result<Option<Value>, ChoreSyncError> {
        let hit = self
            .entries()?
            .remove(key)
            .filter(|entry| {
                now.checked_sub(entry.timestamp)
                    .is_some_and(|age_ms| max_age.allows(age_ms))
            })
            .map(|entry| entry.data);
        Ok(hit)
    }

    /// Wipe every entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn clear(&self) -> Result<(), ChoreSyncError> {
        self.store.remove(CACHE_KEY)
    }

    /// All entries by key. Unreadable stored content reads as empty.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails.
    pub fn entries(&self) -> Result<BTreeMap<String, CacheEntry>, ChoreSyncError> {
        let Some(raw) = self.store.get(CACHE_KEY)? else {
            return Ok(BTreeMap::new());
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(error = %e, "read cache is unreadable, treating as empty");
                Ok(BTreeMap::new())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::storage::Database;

    #[test]
    fn test_put_overwrites_by_key() {
        let db = Database::open_in_memory().unwrap();
        let cache = ReadCache::new(&db);

        cache.put("k", json!([1])).unwrap();
        cache.put("k", json!([2])).unwrap();
        cache.put("other", json!("x")).unwrap();

        assert_eq!(cache.get("k", MaxAge::Unbounded).unwrap(), Some(json!([2])));
        assert_eq!(cache.entries().unwrap().len(), 2);
    }

    #[test]
    fn test_zero_max_age_misses_after_time_passes() {
        let db = Database::open_in_memory().unwrap();
        let cache = ReadCache::new(&db);
        cache.put_at("k", json!({"v": 1}), 1_000).unwrap();

        let zero = MaxAge::Within(Duration::ZERO);
        assert_eq!(cache.get_at("k", zero, 1_000).unwrap(), Some(json!({"v": 1})));
        assert_eq!(cache.get_at("k", zero, 1_001).unwrap(), None);
    }

    #[test]
    fn test_unbounded_max_age_always_hits() {
        let db = Database::open_in_memory().unwrap();
        let cache = ReadCache::new(&db);
        cache.put_at("k", json!("v"), 0).unwrap();

        let ten_years_ms = 10 * 365 * 24 * 60 * 60 * 1000_i64;
        assert_eq!(
            cache.get_at("k", MaxAge::Unbounded, ten_years_ms).unwrap(),
            Some(json!("v"))
        );
    }

    #[test]
    fn test_within_max_age_boundary() {
        let db = Database::open_in_memory().unwrap();
        let cache = ReadCache::new(&db);
        cache.put_at("k", json!(1), 10_000).unwrap();

        let five_secs = MaxAge::from(Duration::from_secs(5));
        assert!(cache.get_at("k", five_secs, 15_000).unwrap().is_some());
        assert!(cache.get_at("k", five_secs, 15_001).unwrap().is_none());
    }

    #[test]
    fn test_missing_key_is_a_miss() {
        let db = Database::open_in_memory().unwrap();
        let cache = ReadCache::new(&db);
        assert_eq!(cache.get("nope", MaxAge::Unbounded).unwrap(), None);
    }

    #[test]
    fn test_clear() {
        let db = Database::open_in_memory().unwrap();
        let cache = ReadCache::new(&db);
        cache.put("k", json!(1)).unwrap();

        cache.clear().unwrap();
        assert!(cache.entries().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_cache_reads_as_empty() {
        let db = Database::open_in_memory().unwrap();
        db.set(CACHE_KEY, "[]garbage").unwrap();

        let cache = ReadCache::new(&db);
        assert_eq!(cache.get("k", MaxAge::Unbounded).unwrap(), None);

        cache.put("k", json!(1)).unwrap();
        assert_eq!(cache.get("k", MaxAge::Unbounded).unwrap(), Some(json!(1)));
    }

    #[test]
    fn test_corrupted_timestamp_is_a_miss() {
        let db = Database::open_in_memory().unwrap();
        db.set(
            CACHE_KEY,
            r#"{"k": {"data": 1, "timestamp": -9223372036854775808}}"#,
        )
        .unwrap();

        let cache = ReadCache::new(&db);
        let five_minutes = MaxAge::Within(Duration::from_secs(300));
        assert_eq!(cache.get("k", five_minutes).unwrap(), None);
        assert_eq!(cache.get_at("k", five_minutes, i64::MAX).unwrap(), None);
    }

    #[test]
    fn test_stored_shape() {
        let db = Database::open_in_memory().unwrap();
        let cache = ReadCache::new(&db);
        cache.put_at("k", json!([]), 42).unwrap();

        let raw: Value = serde_json::from_str(&db.get(CACHE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw, json!({"k": {"data": [], "timestamp": 42}}));
    }
}
