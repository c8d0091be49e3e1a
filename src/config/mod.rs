//! Configuration management for chore-sync.
//!
//! This module handles loading configuration from the data root.

mod paths;
mod settings;

pub use paths::{Paths, HOME_ENV};
pub use settings::{ColorSetting, Config, GeneralConfig, RemoteConfig, SyncConfig};
