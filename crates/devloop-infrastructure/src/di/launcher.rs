//! Scenario launcher
//!
//! Turns a [`Scenario`] into a running harness: materializes the fixture
//! template, builds the harness from configuration, runs the steps and
//! removes the scratch copy afterwards.

use std::path::{Path, PathBuf};

use devloop_application::{Scenario, ScenarioReport, ScenarioRunner};
use devloop_domain::error::Result;
use devloop_domain::value_objects::ProjectFixture;
use tracing::info;

use super::components::HarnessComponents;
use crate::adapters::FixtureWorkspace;
use crate::config::HarnessConfig;
use crate::logging::log_scenario_outcome;

/// Runs scenarios against real processes
#[derive(Debug, Clone)]
pub struct ScenarioLauncher {
    config: HarnessConfig,
    components: HarnessComponents,
    workspace: FixtureWorkspace,
    runner: ScenarioRunner,
}

impl ScenarioLauncher {
    /// Launcher with production adapters
    pub fn new(config: HarnessConfig) -> Result<Self> {
        let components = HarnessComponents::from_config(&config)?;
        Ok(Self::with_components(config, components))
    }

    /// Launcher with explicit components
    pub fn with_components(config: HarnessConfig, components: HarnessComponents) -> Self {
        Self {
            config,
            components,
            workspace: FixtureWorkspace::new(),
            runner: ScenarioRunner::new(),
        }
    }

    /// Create scratch copies under `dir` instead of the system temp dir
    pub fn with_workspace(mut self, workspace: FixtureWorkspace) -> Self {
        self.workspace = workspace;
        self
    }

    /// Effective configuration
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run one scenario end to end
    pub fn launch(&self, scenario: &Scenario) -> Result<ScenarioReport> {
        let outcome = self.launch_inner(scenario);
        log_scenario_outcome(&scenario.name, &outcome);
        outcome
    }

    fn launch_inner(&self, scenario: &Scenario) -> Result<ScenarioReport> {
        scenario.validate()?;
        let spec = &scenario.fixture;
        let template = scenario.template_dir();

        let mut builder = ProjectFixture::builder(&spec.name, &template)
            .program(resolve_program(&spec.program, scenario.source_dir.as_deref()))
            .args(spec.args.iter().cloned());
        for (key, value) in &spec.env {
            builder = builder.env(key, value);
        }
        let fixture = builder.build()?;

        let materialized = self.workspace.materialize(&template, &fixture)?;
        let mut settings = self.config.harness_settings();
        if let Some(base_url) = &spec.base_url {
            settings = settings.with_base_url(base_url.clone());
        }
        info!(
            scenario = %scenario.name,
            root = %materialized.root().display(),
            base_url = %settings.base_url,
            "Launching scenario"
        );

        let harness = self
            .components
            .harness(materialized.fixture().clone(), settings);
        // the harness is stopped before the scratch copy is removed
        let report = self.runner.run(scenario, harness);
        drop(materialized);
        report
    }
}

/// Resolve a relative program path (`./bin/serve`) against the scenario dir
///
/// Bare names (`devloop-fixture`) are left for `PATH` lookup.
fn resolve_program(program: &str, scenario_dir: Option<&Path>) -> String {
    let path = Path::new(program);
    let has_separator = path.components().count() > 1;
    match scenario_dir {
        Some(dir) if has_separator && path.is_relative() => {
            let joined: PathBuf = dir.join(path);
            std::path::absolute(&joined)
                .unwrap_or(joined)
                .to_string_lossy()
                .into_owned()
        }
        _ => program.to_string(),
    }
}
