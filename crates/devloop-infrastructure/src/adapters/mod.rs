//! Port adapters
//!
//! | Adapter | Port | Backing |
//! |---------|------|---------|
//! | [`CommandProcessRunner`] | `ProcessRunner` | `std::process` + process groups |
//! | [`ReqwestHttpPoller`] | `HttpPoller` | blocking `reqwest` client |
//! | [`AtomicSourcePatcher`] | `SourcePatcher` | `tempfile` persist over the target |
//! | [`FixtureWorkspace`] | - | `walkdir` copy into a scratch directory |

/// Fixture materialization
pub mod fixture;
/// HTTP poller adapter
pub mod http;
/// Source patcher adapter
pub mod patcher;
/// Process runner adapter
pub mod process;

pub use fixture::{FixtureWorkspace, MaterializedFixture};
pub use http::ReqwestHttpPoller;
pub use patcher::AtomicSourcePatcher;
pub use process::{CommandProcessRunner, OutputBuffer};
