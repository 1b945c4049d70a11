//! # devloop
//!
//! Harness for dev-mode reload tests: start a build/serve process on a
//! fixture project, wait until it answers, patch a source file, and poll
//! until the patched behaviour is served.
//!
//! ## Example
//!
//! ```ignore
//! use devloop::prelude::*;
//!
//! let config = HarnessConfig::default();
//! let fixture = ProjectFixture::builder("multi-module-project", "/tmp/project")
//!     .program("devloop-fixture")
//!     .args(["clean", ":web:dev"])
//!     .build()?;
//! let harness = HarnessComponents::from_config(&config)?
//!     .harness(fixture, config.harness_settings());
//!
//! harness.run(|h| {
//!     h.start()?;
//!     h.await_ready("/", BodyMatcher::contains("ready"))?;
//!     h.mutate(
//!         "domain/src/customer_service.rs",
//!         &ReplacementSet::single("return \"howdy\"", "return \"modified\""),
//!     )?;
//!     h.await_reload("/hello", BodyMatcher::equals("modified"))
//! })?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - ports, value objects and the error type
//! - `application` - the harness state machine and scenarios
//! - `infrastructure` - process, HTTP and file adapters, config, logging

/// Domain layer - ports, value objects, errors
pub mod domain {
    pub use devloop_domain::*;
}

/// Application layer - harness and scenarios
pub mod application {
    pub use devloop_application::*;
}

/// Infrastructure layer - adapters, config, logging
pub mod infrastructure {
    pub use devloop_infrastructure::*;
}

pub mod cli;

/// Commonly used types
pub mod prelude {
    pub use devloop_application::{
        DevModeHarness, HarnessSettings, Scenario, ScenarioReport, SuiteBuilder,
    };
    pub use devloop_domain::error::{Error, Result};
    pub use devloop_domain::value_objects::{
        BodyMatcher, HarnessState, ProjectFixture, ReplacementSet,
    };
    pub use devloop_infrastructure::{HarnessComponents, HarnessConfig, ScenarioLauncher};
}

pub use cli::{Cli, Command, run};
