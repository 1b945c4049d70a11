//! Composition root
//!
//! Adapters are wired explicitly: the harness receives `Arc<dyn Port>`
//! values at construction time, and tests swap any of them for doubles.

/// Port implementations bundle
pub mod components;
/// Scenario execution on materialized fixtures
pub mod launcher;

pub use components::HarnessComponents;
pub use launcher::ScenarioLauncher;
