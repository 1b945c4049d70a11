//! Application Layer - devloop
//!
//! Orchestrates the dev-mode loop on top of the domain ports. Nothing here
//! touches the OS directly: processes, HTTP and files are reached through
//! the `ProcessRunner`, `HttpPoller` and `SourcePatcher` ports, injected at
//! construction time.
//!
//! ## Use Cases
//!
//! - [`DevModeHarness`]: start, await readiness, mutate, await reload, stop
//! - [`ScenarioRunner`]: execute a declarative [`Scenario`] on a harness
//! - [`SuiteBuilder`]: register scenarios and resolve opt-out markers

pub mod scenario;
pub mod use_cases;

pub use scenario::{FixtureSpec, Scenario, SkipCondition, Step, SuiteBuilder, SuitePlan};
pub use use_cases::{DevModeHarness, HarnessSettings, ScenarioReport, ScenarioRunner};
