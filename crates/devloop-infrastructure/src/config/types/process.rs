//! Process configuration types

use std::time::Duration;

use devloop_domain::constants::DEFAULT_OUTPUT_BUFFER_LINES;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_STOP_GRACE_MS;

/// External process configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Output lines retained per process
    pub output_buffer_lines: usize,

    /// Wait between SIGTERM and SIGKILL in milliseconds
    pub stop_grace_ms: u64,
}

impl ProcessConfig {
    /// Grace period before the process group is killed
    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            output_buffer_lines: DEFAULT_OUTPUT_BUFFER_LINES,
            stop_grace_ms: DEFAULT_STOP_GRACE_MS,
        }
    }
}
