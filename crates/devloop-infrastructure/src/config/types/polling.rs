//! Polling configuration types

use std::time::Duration;

use devloop_domain::constants::{
    DEFAULT_POLL_INTERVAL, DEFAULT_READINESS_TIMEOUT, DEFAULT_RELOAD_TIMEOUT,
};
use serde::{Deserialize, Serialize};

/// Poll budgets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Budget for the first readiness poll in seconds
    pub readiness_timeout_secs: u64,

    /// Budget for observing a reload in seconds
    pub reload_timeout_secs: u64,

    /// Sleep between attempts in milliseconds
    pub interval_ms: u64,
}

impl PollingConfig {
    /// Readiness budget
    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_secs(self.readiness_timeout_secs)
    }

    /// Reload budget
    pub fn reload_timeout(&self) -> Duration {
        Duration::from_secs(self.reload_timeout_secs)
    }

    /// Interval between attempts
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            readiness_timeout_secs: DEFAULT_READINESS_TIMEOUT.as_secs(),
            reload_timeout_secs: DEFAULT_RELOAD_TIMEOUT.as_secs(),
            interval_ms: u64::try_from(DEFAULT_POLL_INTERVAL.as_millis()).unwrap_or(500),
        }
    }
}
