//! Greeting client and fault tolerance
//!
//! The fixture server calls a greeting service through [`GreetingClient`].
//! The production client is remote and guarded by a named circuit breaker;
//! tests swap in [`MockGreetingClient`] and reset every breaker through the
//! shared [`CircuitBreakerMaintenance`] registry before and after each case.

pub mod circuit_breaker;
pub mod client;
pub mod fault_tolerant;
pub mod maintenance;
pub mod mock;
pub mod remote;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerState};
pub use client::{GreetingClient, SharedGreetingClient};
pub use fault_tolerant::FaultTolerantGreetingClient;
pub use maintenance::CircuitBreakerMaintenance;
pub use mock::MockGreetingClient;
pub use remote::RemoteGreetingClient;
