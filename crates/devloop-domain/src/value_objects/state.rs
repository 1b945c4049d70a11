//! Harness lifecycle state

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a dev-mode harness
///
/// `NotStarted -> Starting -> Ready -> Mutating -> AwaitingReload -> Verified
/// -> Stopped`, with `Failed` reachable from every non-terminal state.
/// `Verified` may go back to `Mutating` for another cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarnessState {
    /// No process launched yet
    NotStarted,
    /// Process launched, readiness not yet observed
    Starting,
    /// Readiness observed
    Ready,
    /// A source patch is being applied
    Mutating,
    /// Waiting for the process to serve the patched behaviour
    AwaitingReload,
    /// The patched behaviour was observed
    Verified,
    /// Process stopped
    Stopped,
    /// A fatal error happened; only `stop` is allowed
    Failed,
}

impl HarnessState {
    /// `Stopped` is the only terminal state
    pub fn is_terminal(self) -> bool {
        self == Self::Stopped
    }

    /// States in which the endpoint is known to serve current sources
    pub fn is_serving(self) -> bool {
        matches!(self, Self::Ready | Self::Verified)
    }
}

impl fmt::Display for HarnessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Mutating => "mutating",
            Self::AwaitingReload => "awaiting reload",
            Self::Verified => "verified",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
