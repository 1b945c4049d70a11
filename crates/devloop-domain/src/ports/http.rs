//! HTTP poller port

use crate::value_objects::{PollRequest, PollResult};

/// Polls an HTTP endpoint until its body satisfies a matcher
///
/// Connection failures while the server is not yet listening are ordinary
/// non-matching attempts. Implementations block the calling thread between
/// attempts and never retry past `request.timeout`.
pub trait HttpPoller: Send + Sync {
    /// Run one polling job to completion
    fn poll(&self, request: &PollRequest) -> PollResult;
}
