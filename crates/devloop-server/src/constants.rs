//! Fixture server constants

/// Project manifest file name at the project root
pub const MANIFEST_FILENAME: &str = "devloop-project.toml";

/// Build output directory at the project root
pub const BUILD_DIR: &str = "build";

/// Build output file listing the compiled routes
pub const ROUTES_FILENAME: &str = "routes.json";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// Address the fixture server binds to
pub const BIND_ADDRESS: &str = "127.0.0.1";

/// Circuit breaker guarding the greeting client
pub const GREETING_BREAKER: &str = "greeting";

/// Greeting returned when the greeting call fails or its circuit is open
pub const FALLBACK_GREETING: &str = "fallback greeting";

/// Path the remote greeting client calls
pub const GREETING_PATH: &str = "/hello";

/// Route calling the greeting client through its fault tolerance layer
pub const FAULT_TOLERANT_ROUTE: &str = "/call-with-fault-tolerance-on-interface";

/// Rocket graceful shutdown budget in seconds
pub const SHUTDOWN_GRACE_SECS: u32 = 1;
