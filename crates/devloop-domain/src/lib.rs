//! # devloop domain layer
//!
//! Core types for the dev-mode reload harness: the error taxonomy, the
//! value objects describing fixtures, patches and polls, and the port traits
//! the harness drives.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | `Error`/`Result` shared by every crate |
//! | [`value_objects`] | Fixtures, replacement sets, poll requests/results, state |
//! | [`ports`] | `ProcessRunner`, `HttpPoller`, `SourcePatcher` |
//! | [`constants`] | Polling and process defaults |

pub mod constants;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use error::{Error, Result};
pub use ports::{HttpPoller, ManagedProcess, ProcessHandle, ProcessRunner, SourcePatcher};
pub use value_objects::*;
