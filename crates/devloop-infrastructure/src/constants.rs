//! Infrastructure layer constants
//!
//! Contains constants that are part of the infrastructure implementation.
//! Harness defaults are defined in `devloop_domain::constants`.

use std::time::Duration;

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "devloop.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "devloop";

/// Environment variable prefix for configuration (`DEVLOOP__HTTP__BASE_URL`)
pub const CONFIG_ENV_PREFIX: &str = "DEVLOOP";

/// Separator between prefix and nested keys in environment variables
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable holding an `EnvFilter` directive
pub const LOG_FILTER_ENV: &str = "DEVLOOP_LOG";

/// File stem for rolling log files when the path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "devloop";

// ============================================================================
// HTTP CONSTANTS
// ============================================================================

/// Default base URL of the served project
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Default per-request timeout in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 2_000;

/// Default user agent for polling requests
pub const DEFAULT_USER_AGENT: &str = concat!("devloop/", env!("CARGO_PKG_VERSION"));

/// Lower bound for a single poll attempt, used for the attempt at the deadline
pub const MIN_ATTEMPT_TIMEOUT: Duration = Duration::from_millis(25);

// ============================================================================
// PROCESS CONSTANTS
// ============================================================================

/// Default grace period between SIGTERM and SIGKILL in milliseconds
pub const DEFAULT_STOP_GRACE_MS: u64 = 3_000;

/// How often a stopping process is checked for exit
pub const PROCESS_EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

// ============================================================================
// RESILIENCE CONSTANTS
// ============================================================================

/// Failures within the window that open a circuit
pub const CIRCUIT_BREAKER_FAILURE_THRESHOLD: u32 = 4;

/// Number of recent calls considered by a circuit breaker
pub const CIRCUIT_BREAKER_WINDOW_SIZE: u32 = 20;

/// Time an open circuit waits before probing again, in milliseconds
pub const CIRCUIT_BREAKER_RECOVERY_TIMEOUT_MS: u64 = 5_000;

/// Probe calls allowed while half-open
pub const CIRCUIT_BREAKER_HALF_OPEN_MAX_REQUESTS: u32 = 1;

// ============================================================================
// FIXTURE CONSTANTS
// ============================================================================

/// Directories never copied when materializing a fixture template
pub const FIXTURE_SKIPPED_DIRS: &[&str] = &["build", "target"];

/// Prefix of scratch directories holding materialized fixtures
pub const FIXTURE_TEMP_PREFIX: &str = "devloop-fixture-";
