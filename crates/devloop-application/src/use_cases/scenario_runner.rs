//! Scenario Runner Use Case
//!
//! Executes the steps of a [`Scenario`] on a harness. Step errors are
//! returned unchanged so callers can still match on the harness failure kind.

use std::time::{Duration, Instant};

use devloop_domain::error::{Error, Result};
use devloop_domain::value_objects::HarnessState;
use serde::Serialize;
use tracing::{error, info};

use super::dev_mode_harness::DevModeHarness;
use crate::scenario::{Scenario, Step};

/// Summary of a successful scenario run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// Steps executed
    pub steps_completed: usize,
    /// Mutate/reload cycles verified
    pub verified_cycles: u32,
    /// Harness state after stopping
    pub final_state: HarnessState,
    /// Wall time including start and stop
    pub elapsed: Duration,
}

/// Drives scenarios through dev-mode harnesses
#[derive(Debug, Default, Clone, Copy)]
pub struct ScenarioRunner;

impl ScenarioRunner {
    /// Create a runner
    pub fn new() -> Self {
        Self
    }

    /// Start the harness, run every step, and stop it on every path
    pub fn run(&self, scenario: &Scenario, mut harness: DevModeHarness) -> Result<ScenarioReport> {
        scenario.validate()?;
        let started = Instant::now();
        info!(scenario = %scenario.name, steps = scenario.steps.len(), "Running scenario");

        let mut completed = 0;
        let mut cycles = 0;
        let outcome = harness.run_and_stop(|h| {
            h.start()?;
            for (index, step) in scenario.steps.iter().enumerate() {
                Self::run_step(h, step).inspect_err(|e| {
                    error!(
                        scenario = %scenario.name,
                        step = index + 1,
                        action = %step,
                        error = %e,
                        "Scenario step failed"
                    );
                })?;
                completed = index + 1;
            }
            cycles = h.verified_cycles();
            Ok(())
        });

        outcome.map(|()| ScenarioReport {
            name: scenario.name.clone(),
            steps_completed: completed,
            verified_cycles: cycles,
            final_state: harness.state(),
            elapsed: started.elapsed(),
        })
    }

    fn run_step(harness: &mut DevModeHarness, step: &Step) -> Result<()> {
        let matcher = step.matcher();
        match (step, matcher) {
            (Step::AwaitReady { path, .. }, Some(m)) => harness.await_ready(path, m).map(drop),
            (Step::Expect { path, .. }, Some(m)) => harness.assert_response(path, m).map(drop),
            (Step::AwaitReload { path, .. }, Some(m)) => harness.await_reload(path, m).map(drop),
            (Step::Patch { file, replacements }, _) => harness.mutate(file, replacements),
            (step, None) => Err(Error::internal(format!("Step '{step}' has no matcher"))),
        }
    }
}
