//! In-memory remote store for tests.
//!
//! Enforces the same unique keys as the hosted schema so replays come back
//! as duplicates.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use super::chores::{BONUS_TASK_COMPLETIONS, CHORE_COMPLETIONS, NIGHTLY_COMPLETIONS};
use super::{Filter, InsertOutcome, RemoteStore};
use crate::error::ChoreSyncError;

#[derive(Debug, Default)]
pub struct FakeRemote {
    tables: RefCell<BTreeMap<String, Vec<Value>>>,
    failing: RefCell<BTreeSet<String>>,
    next_id: Cell<u64>,
    inserts: Cell<usize>,
}

/// Unique constraints per table; each inner slice is one composite key.
fn unique_keys(table: &str) -> &'static [&'static [&'static str]] {
    match table {
        CHORE_COMPLETIONS => &[&["offline_id"]],
        NIGHTLY_COMPLETIONS => &[
            &["offline_id"],
            &["child_id", "zone_id", "week_start", "day_of_week"],
        ],
        BONUS_TASK_COMPLETIONS => &[
            &["offline_id"],
            &["bonus_task_id", "child_id", "completion_date"],
        ],
        _ => &[],
    }
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing constraints.
    pub fn seed(&self, table: &str, row: Value) {
        self.tables
            .borrow_mut()
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.borrow().get(table).cloned().unwrap_or_default()
    }

    /// Make every call touching `table` fail with a server error.
    pub fn fail_table(&self, table: &str) {
        self.failing.borrow_mut().insert(table.to_string());
    }

    pub fn heal_table(&self, table: &str) {
        self.failing.borrow_mut().remove(table);
    }

    /// Number of insert calls received, including duplicates.
    pub fn insert_calls(&self) -> usize {
        self.inserts.get()
    }

    fn check(&self, table: &str) -> Result<(), ChoreSyncError> {
        if self.failing.borrow().contains(table) {
            return Err(ChoreSyncError::Remote {
                status: Some(503),
                code: None,
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

impl RemoteStore for FakeRemote {
    fn insert(&self, table: &str, row: &Value) -> Result<InsertOutcome, ChoreSyncError> {
        self.inserts.set(self.inserts.get() + 1);
        self.check(table)?;

        let mut tables = self.tables.borrow_mut();
        let rows = tables.entry(table.to_string()).or_default();

        let clash = unique_keys(table).iter().any(|columns| {
            rows.iter()
                .any(|existing| columns.iter().all(|c| existing.get(c) == row.get(c)))
        });
        if clash {
            return Ok(InsertOutcome::Duplicate);
        }

        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let mut created = row.clone();
        if let Value::Object(map) = &mut created {
            map.entry("id").or_insert_with(|| Value::String(format!("row-{id}")));
        }
        rows.push(created.clone());
        Ok(InsertOutcome::Created(created))
    }

    fn update(&self, table: &str, id: &str, patch: &Value) -> Result<Value, ChoreSyncError> {
        self.check(table)?;
        let mut tables = self.tables.borrow_mut();
        let row = tables
            .get_mut(table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|r| Filter::new().equals("id", id).matches(r))
            })
            .ok_or_else(|| ChoreSyncError::NotFound(format!("{table} row {id}")))?;

        if let (Value::Object(target), Value::Object(changes)) = (row, patch) {
            for (k, v) in changes {
                target.insert(k.clone(), v.clone());
            }
            return Ok(Value::Object(target.clone()));
        }
        Err(ChoreSyncError::NotFound(format!("{table} row {id}")))
    }

    fn select(&self, table: &str, filter: &Filter) -> Result<Vec<Value>, ChoreSyncError> {
        self.check(table)?;
        Ok(self
            .rows(table)
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    fn delete(&self, table: &str, filter: &Filter) -> Result<usize, ChoreSyncError> {
        self.check(table)?;
        let mut tables = self.tables.borrow_mut();
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !filter.matches(r));
        Ok(before - rows.len())
    }
}
