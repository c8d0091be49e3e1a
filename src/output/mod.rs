//! Output formatting for chore-sync.

mod json;
mod pretty;

pub use json::*;
pub use pretty::*;
