//! Domain layer constants
//!
//! Defaults shared by the harness and its adapters. Infrastructure-specific
//! constants (config file names, env prefixes) live in
//! `devloop_infrastructure::constants`.

use std::time::Duration;

// ============================================================================
// POLLING CONSTANTS
// ============================================================================

/// Default time budget for the first readiness poll
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(60);

/// Default time budget for observing a reload after a mutation
pub const DEFAULT_RELOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Default sleep between two poll attempts
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default readiness path
pub const DEFAULT_READINESS_PATH: &str = "/";

/// Maximum number of body bytes kept in a diagnostic observation
pub const OBSERVATION_BODY_LIMIT: usize = 2048;

// ============================================================================
// PROCESS CONSTANTS
// ============================================================================

/// Default number of output lines retained per process
pub const DEFAULT_OUTPUT_BUFFER_LINES: usize = 500;

/// Number of output lines attached to a failure report
pub const FAILURE_OUTPUT_TAIL_LINES: usize = 40;
