//! Connectivity monitor.
//!
//! Turns a stream of reachability observations into reconciliation
//! triggers: one when the device comes online, then one per interval while
//! it stays online.

use std::time::{Duration, Instant};

use serde::Serialize;

/// Why a reconciliation pass was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The device went from offline (or unknown) to online.
    CameOnline,
    /// Safety-net tick while already online.
    Periodic,
    /// Requested by the user.
    Manual,
}

#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    interval: Duration,
    was_online: Option<bool>,
    last_fired: Option<Instant>,
}

impl ConnectivityMonitor {
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            was_online: None,
            last_fired: None,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Feed one reachability observation taken at `now`.
    pub fn observe(&mut self, online: bool, now: Instant) -> Option<Trigger> {
        let previous = self.was_online.replace(online);
        if !online {
            return None;
        }

        let trigger = if previous != Some(true) {
            tracing::info!("connection restored");
            Some(Trigger::CameOnline)
        } else {
            match self.last_fired {
                Some(at) if now.saturating_duration_since(at) < self.interval => None,
                _ => Some(Trigger::Periodic),
            }
        };

        if trigger.is_some() {
            self.last_fired = Some(now);
        }
        trigger
    }
}
