//! Fixture project model
//!
//! A project is a directory with a `devloop-project.toml` manifest listing
//! its modules, their dependencies and the HTTP routes each module serves.

/// Literal extraction ("compilation") and build output
pub mod build;
/// Dev-mode project with live reload
pub mod dev_mode;
/// Project manifest
pub mod manifest;

pub use build::{BuildError, BuildState, CompiledProject, build_project, clean};
pub use dev_mode::DevModeProject;
pub use manifest::{ModuleSpec, ProjectInfo, ProjectManifest, RouteSpec};
