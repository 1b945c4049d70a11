//! Circuit breaker
//!
//! Calls are counted in consecutive windows of `window_size` calls. The
//! circuit opens once a window collects `failure_threshold` failures, lets
//! probe calls through after the recovery timeout, and closes again when
//! the probes succeed.

use std::fmt;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use devloop_infrastructure::config::ResilienceConfig;

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitBreakerState {
    /// Calls pass through
    Closed,
    /// Calls are short-circuited
    Open,
    /// Limited probe calls pass through
    HalfOpen,
}

impl fmt::Display for CircuitBreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// In-memory circuit breaker
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    window_size: u32,
    recovery_timeout: Duration,
    half_open_max_requests: u32,
    state: RwLock<CircuitBreakerState>,
    failure_count: AtomicU32,
    total_calls: AtomicU32,
    opened_at: RwLock<Option<Instant>>,
    half_open_calls: AtomicU32,
    half_open_successes: AtomicU32,
}

impl CircuitBreaker {
    /// Breaker named `name` with thresholds from `config`
    pub fn new(name: impl Into<String>, config: &ResilienceConfig) -> Self {
        Self {
            name: name.into(),
            failure_threshold: config.failure_threshold.max(1),
            window_size: config.window_size.max(1),
            recovery_timeout: config.recovery_timeout(),
            half_open_max_requests: config.half_open_max_requests.max(1),
            state: RwLock::new(CircuitBreakerState::Closed),
            failure_count: AtomicU32::new(0),
            total_calls: AtomicU32::new(0),
            opened_at: RwLock::new(None),
            half_open_calls: AtomicU32::new(0),
            half_open_successes: AtomicU32::new(0),
        }
    }

    /// Breaker name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state
    pub fn state(&self) -> CircuitBreakerState {
        self.state
            .read()
            .map(|s| *s)
            .unwrap_or(CircuitBreakerState::Closed)
    }

    /// Whether a call may go through now
    pub fn is_call_permitted(&self) -> bool {
        match self.state() {
            CircuitBreakerState::Closed => true,
            CircuitBreakerState::Open => {
                if self.recovery_elapsed() {
                    self.transition_to(CircuitBreakerState::HalfOpen);
                    self.half_open_calls.fetch_add(1, Ordering::Relaxed);
                    true
                } else {
                    false
                }
            }
            CircuitBreakerState::HalfOpen => {
                self.half_open_calls.fetch_add(1, Ordering::Relaxed) < self.half_open_max_requests
            }
        }
    }

    /// Record a successful call
    pub fn record_success(&self) {
        match self.state() {
            CircuitBreakerState::Closed => self.count_call(),
            CircuitBreakerState::HalfOpen => {
                let successes = self.half_open_successes.fetch_add(1, Ordering::Relaxed) + 1;
                if successes >= self.half_open_max_requests {
                    self.transition_to(CircuitBreakerState::Closed);
                }
            }
            CircuitBreakerState::Open => {}
        }
    }

    /// Record a failed call
    pub fn record_failure(&self) {
        match self.state() {
            CircuitBreakerState::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
                if failures >= self.failure_threshold {
                    self.transition_to(CircuitBreakerState::Open);
                } else {
                    self.count_call();
                }
            }
            CircuitBreakerState::HalfOpen => self.transition_to(CircuitBreakerState::Open),
            CircuitBreakerState::Open => {}
        }
    }

    /// Force the breaker back to a fresh closed state
    pub fn reset(&self) {
        if let Ok(mut state) = self.state.write() {
            *state = CircuitBreakerState::Closed;
        }
        self.clear_counters();
        tracing::debug!(circuit_breaker = %self.name, "Circuit breaker reset");
    }

    fn count_call(&self) {
        let total = self.total_calls.fetch_add(1, Ordering::Relaxed) + 1;
        if total >= self.window_size {
            self.total_calls.store(0, Ordering::Relaxed);
            self.failure_count.store(0, Ordering::Relaxed);
        }
    }

    fn recovery_elapsed(&self) -> bool {
        self.opened_at
            .read()
            .ok()
            .and_then(|opened| *opened)
            .is_some_and(|opened| opened.elapsed() >= self.recovery_timeout)
    }

    fn clear_counters(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
        self.total_calls.store(0, Ordering::Relaxed);
        self.half_open_calls.store(0, Ordering::Relaxed);
        self.half_open_successes.store(0, Ordering::Relaxed);
        if let Ok(mut opened_at) = self.opened_at.write() {
            *opened_at = None;
        }
    }

    fn transition_to(&self, new_state: CircuitBreakerState) {
        let Ok(mut state) = self.state.write() else {
            return;
        };
        let old_state = *state;
        if old_state == new_state {
            return;
        }
        tracing::info!(
            circuit_breaker = %self.name,
            from = %old_state,
            to = %new_state,
            "Circuit breaker state transition"
        );
        *state = new_state;
        drop(state);

        match new_state {
            CircuitBreakerState::Open => {
                self.half_open_calls.store(0, Ordering::Relaxed);
                self.half_open_successes.store(0, Ordering::Relaxed);
                if let Ok(mut opened_at) = self.opened_at.write() {
                    *opened_at = Some(Instant::now());
                }
            }
            CircuitBreakerState::Closed => self.clear_counters(),
            CircuitBreakerState::HalfOpen => {
                self.half_open_calls.store(0, Ordering::Relaxed);
                self.half_open_successes.store(0, Ordering::Relaxed);
            }
        }
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
