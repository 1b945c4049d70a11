//! Domain Port Interfaces
//!
//! Boundary contracts between the harness and the outside world. The
//! application layer depends only on these traits; infrastructure provides
//! the real implementations and tests provide fakes.
//!
//! | Port | Description |
//! |------|-------------|
//! | [`ProcessRunner`] | Launch/terminate the build-and-serve process |
//! | [`HttpPoller`] | Retry-until-timeout HTTP GET with a body matcher |
//! | [`SourcePatcher`] | Atomic literal replacements in a source file |

/// HTTP poller port
pub mod http;
/// Source patcher port
pub mod patcher;
/// Process runner port
pub mod process;

pub use http::HttpPoller;
pub use patcher::SourcePatcher;
pub use process::{ManagedProcess, ProcessHandle, ProcessRunner};
