//! HTTP poller timing and matching tests

use std::time::{Duration, Instant};

use devloop_domain::ports::HttpPoller;
use devloop_domain::value_objects::{BodyMatcher, Observation, PollRequest, PollResult};
use devloop_infrastructure::adapters::ReqwestHttpPoller;
use devloop_infrastructure::config::HttpConfig;

use crate::test_utils::stub_server::{StubResponse, StubServer, refused_base_url};

const INTERVAL: Duration = Duration::from_millis(100);
const SLACK: Duration = Duration::from_millis(250);

fn poller() -> ReqwestHttpPoller {
    ReqwestHttpPoller::new(&HttpConfig {
        request_timeout_ms: 500,
        ..HttpConfig::default()
    })
    .unwrap()
}

fn request(base_url: &str, matcher: BodyMatcher, timeout: Duration) -> PollRequest {
    PollRequest {
        base_url: base_url.to_string(),
        path: "/hello".to_string(),
        matcher,
        timeout,
        interval: INTERVAL,
    }
}

#[test]
fn test_never_matching_poll_respects_timeout_bounds() {
    let timeout = Duration::from_millis(600);
    let request = request(&refused_base_url(), BodyMatcher::contains("ready"), timeout);

    let started = Instant::now();
    let result = poller().poll(&request);
    let elapsed = started.elapsed();

    assert!(elapsed >= timeout, "gave up early: {elapsed:?}");
    assert!(elapsed < timeout + INTERVAL + SLACK, "overran: {elapsed:?}");
    match result {
        PollResult::TimedOut(t) => {
            assert!(t.attempts >= 2);
            assert!(matches!(t.last, Observation::ConnectionFailed { .. }));
        }
        PollResult::Matched(r) => panic!("unexpected match: {r:?}"),
    }
}

#[test]
fn test_match_on_third_attempt_returns_promptly() {
    let server = StubServer::start(|n| {
        if n < 3 {
            StubResponse::ok("howdy")
        } else {
            StubResponse::ok("modified")
        }
    });
    let request = request(
        &server.base_url,
        BodyMatcher::contains("modified"),
        Duration::from_secs(10),
    );

    let started = Instant::now();
    let response = poller().poll(&request).into_result().unwrap();
    let elapsed = started.elapsed();

    assert_eq!(response.attempts, 3);
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "modified");
    assert!(elapsed <= INTERVAL * 3 + SLACK, "too slow: {elapsed:?}");
    assert_eq!(server.request_count(), 3);
}

#[test]
fn test_error_status_never_satisfies_matcher() {
    let server = StubServer::start(|_| StubResponse::status(500, "modified (compile error page)"));
    let request = request(
        &server.base_url,
        BodyMatcher::contains("modified"),
        Duration::from_millis(300),
    );

    match poller().poll(&request) {
        PollResult::TimedOut(t) => match t.last {
            Observation::Response { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("compile error"));
            }
            other => panic!("unexpected observation: {other:?}"),
        },
        PollResult::Matched(r) => panic!("5xx matched: {r:?}"),
    }
}

#[test]
fn test_zero_timeout_makes_single_attempt() {
    let server = StubServer::start(|_| StubResponse::ok("howdy"));
    let request = request(
        &server.base_url,
        BodyMatcher::contains("modified"),
        Duration::ZERO,
    );
    match poller().poll(&request) {
        PollResult::TimedOut(t) => assert_eq!(t.attempts, 1),
        PollResult::Matched(r) => panic!("unexpected match: {r:?}"),
    }
}
