//! Resilience configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CIRCUIT_BREAKER_FAILURE_THRESHOLD, CIRCUIT_BREAKER_HALF_OPEN_MAX_REQUESTS,
    CIRCUIT_BREAKER_RECOVERY_TIMEOUT_MS, CIRCUIT_BREAKER_WINDOW_SIZE,
};

/// Circuit breaker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Failures within the window that open the circuit
    pub failure_threshold: u32,

    /// Number of recent calls the breaker looks at
    pub window_size: u32,

    /// Time an open circuit waits before allowing a probe, in milliseconds
    pub recovery_timeout_ms: u64,

    /// Probe calls allowed while half-open
    pub half_open_max_requests: u32,
}

impl ResilienceConfig {
    /// Recovery timeout
    pub fn recovery_timeout(&self) -> Duration {
        Duration::from_millis(self.recovery_timeout_ms)
    }
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            failure_threshold: CIRCUIT_BREAKER_FAILURE_THRESHOLD,
            window_size: CIRCUIT_BREAKER_WINDOW_SIZE,
            recovery_timeout_ms: CIRCUIT_BREAKER_RECOVERY_TIMEOUT_MS,
            half_open_max_requests: CIRCUIT_BREAKER_HALF_OPEN_MAX_REQUESTS,
        }
    }
}
