//! Configuration
//!
//! [`ConfigLoader`] merges defaults, an optional TOML file and `DEVLOOP__`
//! environment variables into a validated [`HarnessConfig`].

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use types::*;
