//! Application use cases

/// Dev-mode harness state machine
pub mod dev_mode_harness;
/// Scenario execution
pub mod scenario_runner;

pub use dev_mode_harness::{DevModeHarness, HarnessSettings};
pub use scenario_runner::{ScenarioReport, ScenarioRunner};
