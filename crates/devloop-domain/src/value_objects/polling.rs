//! HTTP polling value objects

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::OBSERVATION_BODY_LIMIT;
use crate::error::{Error, Result};

type BodyPredicate = dyn Fn(&str) -> bool + Send + Sync;

/// Named predicate over an HTTP response body
#[derive(Clone)]
pub struct BodyMatcher {
    description: String,
    predicate: Arc<BodyPredicate>,
}

impl BodyMatcher {
    /// Body contains `needle`
    pub fn contains(needle: impl Into<String>) -> Self {
        let needle = needle.into();
        Self {
            description: format!("contains {needle:?}"),
            predicate: Arc::new(move |body| body.contains(&needle)),
        }
    }

    /// Body contains every needle
    pub fn contains_all<I, S>(needles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let needles: Vec<String> = needles.into_iter().map(Into::into).collect();
        Self {
            description: format!("contains all of {needles:?}"),
            predicate: Arc::new(move |body| needles.iter().all(|n| body.contains(n.as_str()))),
        }
    }

    /// Body equals `expected` after trimming surrounding whitespace
    pub fn equals(expected: impl Into<String>) -> Self {
        let expected = expected.into();
        Self {
            description: format!("equals {expected:?}"),
            predicate: Arc::new(move |body| body.trim() == expected),
        }
    }

    /// Any predicate
    pub fn predicate<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Whether `body` satisfies the matcher
    pub fn matches(&self, body: &str) -> bool {
        (self.predicate)(body)
    }

    /// Human readable description
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for BodyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyMatcher")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// One polling job
#[derive(Debug, Clone)]
pub struct PollRequest {
    /// Base URL, e.g. `http://127.0.0.1:8080`
    pub base_url: String,
    /// Path appended to the base URL
    pub path: String,
    /// Condition the body has to satisfy
    pub matcher: BodyMatcher,
    /// Overall time budget
    pub timeout: Duration,
    /// Sleep between attempts
    pub interval: Duration,
}

impl PollRequest {
    /// Full URL of the polled endpoint
    pub fn url(&self) -> String {
        join_url(&self.base_url, &self.path)
    }
}

/// Join a base URL and a path with exactly one slash between them
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

/// What the last poll attempt saw
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Observation {
    /// No attempt was made
    #[default]
    NotAttempted,
    /// The server answered
    Response {
        /// HTTP status code
        status: u16,
        /// Body text
        body: String,
    },
    /// The request failed before a response arrived (refused, reset, timed out)
    ConnectionFailed {
        /// Failure description
        reason: String,
    },
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAttempted => write!(f, "no request was made"),
            Self::Response { status, body } => {
                write!(f, "HTTP {status}: {}", truncate(body, OBSERVATION_BODY_LIMIT))
            }
            Self::ConnectionFailed { reason } => write!(f, "connection failed: {reason}"),
        }
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes total)", &text[..end], text.len())
}

/// Successful poll outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolledResponse {
    /// Polled URL
    pub url: String,
    /// HTTP status of the matching response
    pub status: u16,
    /// Matching body
    pub body: String,
    /// Attempts used, including the matching one
    pub attempts: u32,
    /// Time from the first attempt until the match
    pub elapsed: Duration,
}

/// Exhausted poll outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTimeout {
    /// Polled URL
    pub url: String,
    /// Matcher description
    pub expectation: String,
    /// Time budget that ran out
    pub timeout: Duration,
    /// Attempts made
    pub attempts: u32,
    /// Last thing observed
    pub last: Observation,
    /// Tail of the served process output, when a harness attached it
    pub output_tail: Vec<String>,
}

impl PollTimeout {
    /// Attach process output lines for diagnostics
    pub fn with_output_tail(mut self, tail: Vec<String>) -> Self {
        self.output_tail = tail;
        self
    }
}

impl fmt::Display for PollTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Timed out after {:?} waiting for {} to satisfy `{}` ({} attempts); last observation: {}",
            self.timeout, self.url, self.expectation, self.attempts, self.last
        )?;
        if !self.output_tail.is_empty() {
            write!(f, "\n--- process output (tail) ---")?;
            for line in &self.output_tail {
                write!(f, "\n{line}")?;
            }
        }
        Ok(())
    }
}

/// Outcome of a polling job
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult {
    /// The matcher was satisfied
    Matched(PolledResponse),
    /// The time budget ran out
    TimedOut(PollTimeout),
}

impl PollResult {
    /// Whether the matcher was satisfied
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    /// Turn a timeout into [`Error::PollTimeout`]
    pub fn into_result(self) -> Result<PolledResponse> {
        match self {
            Self::Matched(response) => Ok(response),
            Self::TimedOut(timeout) => Err(Error::poll_timeout(timeout)),
        }
    }
}
