//! Fault-tolerant greeting client

use std::sync::Arc;

use async_trait::async_trait;
use devloop_domain::error::Result;
use tracing::warn;

use super::client::{GreetingClient, SharedGreetingClient};
use super::maintenance::CircuitBreakerMaintenance;
use crate::constants::{FALLBACK_GREETING, GREETING_BREAKER};

/// Guards a greeting client with a named circuit breaker
///
/// Failures and open circuits are answered with the fallback greeting.
#[derive(Clone)]
pub struct FaultTolerantGreetingClient {
    inner: SharedGreetingClient,
    maintenance: CircuitBreakerMaintenance,
    breaker_name: String,
    fallback: String,
}

impl FaultTolerantGreetingClient {
    /// Wrap `inner`, using the `greeting` breaker from `maintenance`
    pub fn new(inner: SharedGreetingClient, maintenance: CircuitBreakerMaintenance) -> Self {
        Self {
            inner,
            maintenance,
            breaker_name: GREETING_BREAKER.to_string(),
            fallback: FALLBACK_GREETING.to_string(),
        }
    }

    /// Shared registry holding this client's breaker
    pub fn maintenance(&self) -> &CircuitBreakerMaintenance {
        &self.maintenance
    }

    /// Breaker guarding the calls
    pub fn breaker_name(&self) -> &str {
        &self.breaker_name
    }

    /// As a shared trait object
    pub fn into_shared(self) -> SharedGreetingClient {
        Arc::new(self)
    }
}

#[async_trait]
impl GreetingClient for FaultTolerantGreetingClient {
    async fn hello(&self) -> Result<String> {
        let breaker = self.maintenance.breaker(&self.breaker_name);
        if !breaker.is_call_permitted() {
            warn!(circuit_breaker = %self.breaker_name, "Circuit open, using fallback greeting");
            return Ok(self.fallback.clone());
        }
        match self.inner.hello().await {
            Ok(greeting) => {
                breaker.record_success();
                Ok(greeting)
            }
            Err(e) => {
                breaker.record_failure();
                warn!(circuit_breaker = %self.breaker_name, error = %e, "Greeting call failed, using fallback");
                Ok(self.fallback.clone())
            }
        }
    }
}

impl std::fmt::Debug for FaultTolerantGreetingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultTolerantGreetingClient")
            .field("breaker_name", &self.breaker_name)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}
