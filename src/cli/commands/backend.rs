//! Remote store and connectivity wiring for a CLI invocation.

use crate::config::RemoteConfig;
use crate::error::ChoreSyncError;
use crate::remote::{Connectivity, Disconnected, PostgrestClient, RemoteStore, StaticConnectivity};

/// The remote side of the engine, chosen from config and flags.
pub struct Backend {
    remote: Box<dyn RemoteStore>,
    connectivity: Box<dyn Connectivity>,
}

impl Backend {
    /// Build the backend.
    ///
    /// Without a configured URL every remote call fails and the device is
    /// always offline. `force_offline` keeps the client but reports offline.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL is configured but the client cannot be built.
    pub fn connect(config: &RemoteConfig, force_offline: bool) -> Result<Self, ChoreSyncError> {
        let configured = config.url.as_deref().is_some_and(|url| !url.trim().is_empty());
        if !configured {
            tracing::debug!("no remote.url configured, running disconnected");
            return Ok(Self {
                remote: Box::new(Disconnected),
                connectivity: Box::new(Disconnected),
            });
        }

        let client = PostgrestClient::from_config(config)?;
        let connectivity: Box<dyn Connectivity> = if force_offline {
            Box::new(StaticConnectivity::new(false))
        } else {
            Box::new(client.clone())
        };

        Ok(Self {
            remote: Box::new(client),
            connectivity,
        })
    }

    #[must_use]
    pub fn remote(&self) -> &dyn RemoteStore {
        self.remote.as_ref()
    }

    #[must_use]
    pub fn connectivity(&self) -> &dyn Connectivity {
        self.connectivity.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_url_is_disconnected() {
        let backend = Backend::connect(&RemoteConfig::default(), false).unwrap();
        assert!(!backend.connectivity().is_online());
    }

    #[test]
    fn test_forced_offline_with_url() {
        let config = RemoteConfig {
            url: Some("https://family.example.co".to_string()),
            anon_key: Some("anon".to_string()),
            ..RemoteConfig::default()
        };
        let backend = Backend::connect(&config, true).unwrap();
        assert!(!backend.connectivity().is_online());
    }

    #[test]
    fn test_url_without_key_is_an_error() {
        let config = RemoteConfig {
            url: Some("https://family.example.co".to_string()),
            ..RemoteConfig::default()
        };
        assert!(Backend::connect(&config, false).is_err());
    }
}
