//! # devloop fixture server
//!
//! A small dev-mode server for multi-module fixture projects. It "builds" a
//! project by extracting the string literals that route handler functions
//! return, serves them over HTTP, and rebuilds on the next request after a
//! source file changes. It also hosts a fault-tolerant greeting client used
//! to exercise mock injection.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`project`] | Manifest, build, clean and live reload |
//! | [`greeting`] | Greeting client port, circuit breakers, mock |
//! | [`transport`] | Rocket routes |
//! | [`cli`] | `devloop-fixture` task parsing |
//! | [`init`] | Startup of the dev server |

pub mod cli;
pub mod constants;
pub mod greeting;
pub mod init;
pub mod project;
pub mod transport;

pub use cli::{Cli, Task, TaskPlan};
pub use init::run;
pub use project::{DevModeProject, ProjectManifest};
pub use transport::{GreetingState, fixture_rocket, greeting_rocket};
