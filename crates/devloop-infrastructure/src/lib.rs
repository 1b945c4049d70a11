//! # devloop infrastructure layer
//!
//! Concrete implementations of the domain ports plus the cross-cutting
//! concerns every binary needs.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Figment-based configuration loading and validation |
//! | [`logging`] | `tracing-subscriber` initialisation |
//! | [`error_ext`] | Context helpers turning foreign errors into domain errors |
//! | [`adapters`] | `CommandProcessRunner`, `ReqwestHttpPoller`, `AtomicSourcePatcher`, fixture materialization |
//! | [`di`] | Explicit composition root wiring adapters into harnesses |
//! | [`utils`] | Timing helpers |

pub mod adapters;
pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod logging;
pub mod utils;

pub use adapters::{
    AtomicSourcePatcher, CommandProcessRunner, FixtureWorkspace, MaterializedFixture,
    ReqwestHttpPoller,
};
pub use config::{ConfigBuilder, ConfigLoader, HarnessConfig};
pub use di::{HarnessComponents, ScenarioLauncher};
pub use error_ext::ErrorContext;
pub use logging::init_logging;
