//! Shared circuit breaker registry

use std::sync::Arc;

use dashmap::DashMap;
use devloop_infrastructure::config::ResilienceConfig;
use tracing::info;

use super::circuit_breaker::{CircuitBreaker, CircuitBreakerState};

/// Registry of named circuit breakers
///
/// Cloning shares the registry. Tests hold a clone and call
/// [`reset_all`](Self::reset_all) in setup and teardown so no breaker state
/// leaks between cases.
#[derive(Debug, Clone, Default)]
pub struct CircuitBreakerMaintenance {
    breakers: Arc<DashMap<String, Arc<CircuitBreaker>>>,
    config: ResilienceConfig,
}

impl CircuitBreakerMaintenance {
    /// Registry creating breakers with `config`
    pub fn new(config: ResilienceConfig) -> Self {
        Self {
            breakers: Arc::new(DashMap::new()),
            config,
        }
    }

    /// Breaker named `name`, created on first use
    pub fn breaker(&self, name: &str) -> Arc<CircuitBreaker> {
        Arc::clone(
            self.breakers
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(CircuitBreaker::new(name, &self.config)))
                .value(),
        )
    }

    /// State of the breaker named `name`, if it exists
    pub fn state_of(&self, name: &str) -> Option<CircuitBreakerState> {
        self.breakers.get(name).map(|b| b.state())
    }

    /// Reset every registered breaker to closed
    pub fn reset_all(&self) {
        for entry in self.breakers.iter() {
            entry.value().reset();
        }
        info!(breakers = self.breakers.len(), "Reset all circuit breakers");
    }
}
