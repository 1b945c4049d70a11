//! Scenario suites
//!
//! Opt-out markers are evaluated once, when the suite is built, so a run
//! never changes its mind halfway through.

use std::collections::HashSet;

use devloop_domain::error::{Error, Result};
use tracing::info;

use super::model::Scenario;

/// A registered scenario and its skip decision
#[derive(Debug, Clone)]
pub struct SuiteEntry {
    /// The scenario
    pub scenario: Scenario,
    /// Reason it is skipped, if it is
    pub skip_reason: Option<String>,
}

impl SuiteEntry {
    /// Whether the scenario will run
    pub fn is_runnable(&self) -> bool {
        self.skip_reason.is_none()
    }
}

/// Outcome of building a suite
#[derive(Debug, Clone, Default)]
pub struct SuitePlan {
    entries: Vec<SuiteEntry>,
}

impl SuitePlan {
    /// All entries in registration order
    pub fn entries(&self) -> &[SuiteEntry] {
        &self.entries
    }

    /// Scenarios that will run
    pub fn runnable(&self) -> impl Iterator<Item = &Scenario> {
        self.entries
            .iter()
            .filter(|e| e.is_runnable())
            .map(|e| &e.scenario)
    }

    /// Scenarios that are skipped, with their reasons
    pub fn skipped(&self) -> impl Iterator<Item = (&Scenario, &str)> {
        self.entries
            .iter()
            .filter_map(|e| e.skip_reason.as_deref().map(|r| (&e.scenario, r)))
    }
}

/// Collects scenarios and decides which ones run
#[derive(Debug, Default)]
pub struct SuiteBuilder {
    scenarios: Vec<Scenario>,
}

impl SuiteBuilder {
    /// Empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scenario
    pub fn register(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Build against the process environment
    pub fn build(self) -> Result<SuitePlan> {
        self.build_with(|var| std::env::var(var).ok())
    }

    /// Build against an explicit environment lookup
    pub fn build_with<F>(self, env: F) -> Result<SuitePlan>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.scenarios.len());
        for scenario in self.scenarios {
            if !seen.insert(scenario.name.clone()) {
                return Err(Error::scenario(format!(
                    "Scenario '{}' is registered twice",
                    scenario.name
                )));
            }
            let skip_reason = scenario
                .disabled
                .as_ref()
                .and_then(|condition| condition.evaluate(&env));
            if let Some(reason) = &skip_reason {
                info!(scenario = %scenario.name, reason = %reason, "Scenario disabled");
            }
            entries.push(SuiteEntry {
                scenario,
                skip_reason,
            });
        }
        Ok(SuitePlan { entries })
    }
}
