//! Mock injection through the fault-tolerant greeting route
//!
//! Every case resets the shared circuit breakers in setup and teardown.

use std::sync::Arc;

use devloop_infrastructure::config::ResilienceConfig;
use devloop_server::constants::{FALLBACK_GREETING, FAULT_TOLERANT_ROUTE, GREETING_BREAKER};
use devloop_server::greeting::{
    CircuitBreakerMaintenance, CircuitBreakerState, FaultTolerantGreetingClient, GreetingClient,
    MockGreetingClient,
};
use devloop_server::transport::{GreetingState, greeting_rocket};
use rocket::http::Status;
use rocket::local::asynchronous::Client;

struct GreetingTest {
    mock: MockGreetingClient,
    maintenance: CircuitBreakerMaintenance,
    client: Client,
}

impl GreetingTest {
    async fn set_up() -> Self {
        let maintenance = CircuitBreakerMaintenance::new(ResilienceConfig {
            failure_threshold: 1,
            window_size: 4,
            recovery_timeout_ms: 60_000,
            half_open_max_requests: 1,
        });
        maintenance.reset_all();
        let mock = MockGreetingClient::new("howdy");
        let guarded = FaultTolerantGreetingClient::new(Arc::new(mock.clone()), maintenance.clone());
        let client = Client::tracked(greeting_rocket(GreetingState::new(guarded.into_shared())))
            .await
            .expect("valid rocket instance");
        Self {
            mock,
            maintenance,
            client,
        }
    }

    async fn call(&self) -> (Status, String) {
        let response = self.client.post(FAULT_TOLERANT_ROUTE).dispatch().await;
        let status = response.status();
        (status, response.into_string().await.unwrap_or_default())
    }
}

/// Teardown, also run when an assertion unwinds
impl Drop for GreetingTest {
    fn drop(&mut self) {
        self.mock.reset();
        self.maintenance.reset_all();
    }
}

#[rocket::async_test]
async fn test_stubbed_value_is_seen_directly_and_over_http() {
    let t = GreetingTest::set_up().await;
    t.mock.when_hello("MockHello");

    assert_eq!(t.mock.hello().await.unwrap(), "MockHello");
    assert_eq!(t.call().await, (Status::Ok, "MockHello".to_string()));
    assert_eq!(t.mock.invocations(), 2);
}

#[rocket::async_test]
async fn test_reset_restores_default_greeting() {
    let t = GreetingTest::set_up().await;
    t.mock.when_hello("MockHello");
    t.mock.reset();

    assert_eq!(t.call().await, (Status::Ok, "howdy".to_string()));
    assert_eq!(t.mock.invocations(), 1);
}

#[rocket::async_test]
async fn test_open_circuit_falls_back_until_reset() {
    let t = GreetingTest::set_up().await;
    t.mock.when_hello_fails("greeting service down");

    assert_eq!(t.call().await, (Status::Ok, FALLBACK_GREETING.to_string()));
    assert_eq!(
        t.maintenance.state_of(GREETING_BREAKER),
        Some(CircuitBreakerState::Open)
    );

    t.mock.when_hello("MockHello");
    assert_eq!(t.call().await.1, FALLBACK_GREETING);
    assert_eq!(t.mock.invocations(), 1, "open circuit must not reach the client");

    t.maintenance.reset_all();
    assert_eq!(t.call().await.1, "MockHello");
}

#[rocket::async_test]
async fn test_breaker_state_does_not_leak_between_cases() {
    let t = GreetingTest::set_up().await;
    assert_ne!(
        t.maintenance.state_of(GREETING_BREAKER),
        Some(CircuitBreakerState::Open)
    );
    assert_eq!(t.call().await.1, "howdy");
}

#[rocket::async_test]
async fn test_dropping_case_resets_mock_and_breakers() {
    let t = GreetingTest::set_up().await;
    t.mock.when_hello_fails("greeting service down");
    assert_eq!(t.call().await.1, FALLBACK_GREETING);
    let (mock, maintenance) = (t.mock.clone(), t.maintenance.clone());

    drop(t);

    assert_eq!(
        maintenance.state_of(GREETING_BREAKER),
        Some(CircuitBreakerState::Closed)
    );
    assert_eq!(mock.invocations(), 0);
    assert_eq!(mock.hello().await.unwrap(), "howdy");
}
