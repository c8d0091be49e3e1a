//! Command implementations.
//!
//! Each command renders its result as a string in the requested
//! [`OutputFormat`](crate::cli::args::OutputFormat); `main` prints it.

mod backend;
mod cache;
mod chores;
mod completions;
mod sync;
mod watch;

pub use backend::Backend;
pub use cache::cache;
pub use chores::{complete, nightly, request_bonus, today};
pub use completions::generate_completions;
pub use sync::{summarize, sync};
pub use watch::watch;
