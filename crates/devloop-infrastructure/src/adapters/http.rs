//! HTTP poller adapter
//!
//! Blocking `reqwest` client polling one endpoint until a matcher accepts
//! the body or the budget runs out. Connection failures and non-2xx
//! answers are ordinary non-matching attempts.

use std::thread;
use std::time::Duration;

use devloop_domain::error::Result;
use devloop_domain::ports::HttpPoller;
use devloop_domain::value_objects::{
    Observation, PollRequest, PollResult, PollTimeout, PolledResponse,
};
use reqwest::blocking::Client;
use tracing::{debug, trace};

use crate::config::HttpConfig;
use crate::constants::MIN_ATTEMPT_TIMEOUT;
use crate::error_ext::ErrorContext;
use crate::utils::TimedOperation;

/// [`HttpPoller`] backed by a blocking reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestHttpPoller {
    client: Client,
    request_timeout: Duration,
}

impl ReqwestHttpPoller {
    /// Build a poller from the HTTP settings
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .network_context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            request_timeout: config.request_timeout(),
        })
    }

    /// One GET request; `Err` carries the connection failure reason
    fn attempt(&self, url: &str, timeout: Duration) -> std::result::Result<(u16, String), String> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .map_err(|e| describe(&e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| format!("failed to read body: {}", describe(&e)))?;
        Ok((status, body))
    }
}

fn describe(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {error}")
    } else if error.is_connect() {
        format!("connection refused or unreachable: {error}")
    } else {
        error.to_string()
    }
}

impl HttpPoller for ReqwestHttpPoller {
    fn poll(&self, request: &PollRequest) -> PollResult {
        let url = request.url();
        let timer = TimedOperation::start();
        let mut attempts = 0u32;
        let mut last = Observation::NotAttempted;

        loop {
            attempts += 1;
            let remaining = timer.remaining(request.timeout).unwrap_or_default();
            let attempt_timeout = self.request_timeout.min(remaining).max(MIN_ATTEMPT_TIMEOUT);

            match self.attempt(&url, attempt_timeout) {
                Ok((status, body)) => {
                    let success = (200..300).contains(&status);
                    if success && request.matcher.matches(&body) {
                        debug!(
                            url = %url,
                            attempts,
                            elapsed_ms = timer.elapsed_ms(),
                            "Poll matched"
                        );
                        return PollResult::Matched(PolledResponse {
                            url,
                            status,
                            body,
                            attempts,
                            elapsed: timer.elapsed(),
                        });
                    }
                    trace!(url = %url, attempt = attempts, status, "Response did not match");
                    last = Observation::Response { status, body };
                }
                Err(reason) => {
                    trace!(url = %url, attempt = attempts, reason = %reason, "Request failed");
                    last = Observation::ConnectionFailed { reason };
                }
            }

            // A final attempt runs at the deadline, then the poll gives up
            match timer.remaining(request.timeout) {
                Some(remaining) if !remaining.is_zero() => {
                    thread::sleep(request.interval.min(remaining));
                }
                _ => break,
            }
        }

        debug!(url = %url, attempts, elapsed_ms = timer.elapsed_ms(), "Poll timed out");
        PollResult::TimedOut(PollTimeout {
            url,
            expectation: request.matcher.description().to_string(),
            timeout: request.timeout,
            attempts,
            last,
            output_tail: Vec::new(),
        })
    }
}
