//! Top-level configuration

use devloop_application::HarnessSettings;
use serde::{Deserialize, Serialize};

use super::{HttpConfig, LoggingConfig, PollingConfig, ProcessConfig, ResilienceConfig};
use devloop_domain::constants::FAILURE_OUTPUT_TAIL_LINES;

/// Complete devloop configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Endpoint and HTTP client settings
    pub http: HttpConfig,
    /// Poll budgets and interval
    pub polling: PollingConfig,
    /// External process settings
    pub process: ProcessConfig,
    /// Circuit breaker settings for the fixture server's greeting client
    pub resilience: ResilienceConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl HarnessConfig {
    /// Harness settings derived from this configuration
    pub fn harness_settings(&self) -> HarnessSettings {
        let mut settings = HarnessSettings::new(self.http.base_url.clone())
            .with_timeouts(self.polling.readiness_timeout(), self.polling.reload_timeout())
            .with_poll_interval(self.polling.interval());
        settings.output_tail_lines = FAILURE_OUTPUT_TAIL_LINES.min(self.process.output_buffer_lines);
        settings
    }
}
