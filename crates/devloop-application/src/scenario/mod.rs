//! Scenario model and suite building

/// Scenario definitions
pub mod model;
/// Scenario suites with opt-out markers
pub mod suite;

pub use model::{FixtureSpec, Scenario, SkipCondition, Step};
pub use suite::{SuiteBuilder, SuiteEntry, SuitePlan};
