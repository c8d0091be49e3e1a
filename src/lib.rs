//! chore-sync - offline-first sync for the family chore chart
//!
//! Chore completions and other writes are queued in a local `SQLite`
//! key-value store, optimistically merged into a read cache, and replayed
//! against the hosted database whenever it is reachable. Replays are
//! idempotent: every write carries a client-generated token the remote store
//! enforces as a unique key.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod output;
pub mod remote;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::ChoreSyncError;
pub use features::sync::SyncEngine;
