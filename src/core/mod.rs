//! Core utilities shared across features.

mod datetime;
mod ids;

pub use datetime::{format_date, local_today, week_start};
pub use ids::generate_offline_id;
