//! Feature implementations for chore-sync.

pub mod sync;
