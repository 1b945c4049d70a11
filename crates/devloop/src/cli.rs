//! `devloop` command line
//!
//! ```text
//! devloop verify scenarios/howdy.toml     # run scenarios, exit 1 on failure
//! devloop list scenarios/*.toml           # show which scenarios would run
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use devloop_application::{Scenario, ScenarioReport, SuiteBuilder, SuitePlan};
use devloop_infrastructure::config::{ConfigLoader, HarnessConfig};
use devloop_infrastructure::logging::init_logging;
use devloop_infrastructure::ScenarioLauncher;
use tracing::info;

/// Command line interface for devloop
#[derive(Parser, Debug)]
#[command(name = "devloop")]
#[command(about = "devloop - dev-mode reload harness")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run scenario files and report the outcome
    Verify {
        /// Scenario TOML files
        #[arg(required = true)]
        scenarios: Vec<PathBuf>,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which scenarios would run and which are skipped
    List {
        /// Scenario TOML files
        #[arg(required = true)]
        scenarios: Vec<PathBuf>,
    },
}

/// Run the command; failed scenarios produce exit code 1
pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Command::List { scenarios } => {
            let plan = build_plan(&scenarios)?;
            print!("{}", render_plan(&plan));
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify { scenarios, json } => verify(config, &scenarios, json),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<HarnessConfig> {
    let loader = match path {
        Some(path) => ConfigLoader::new().with_config_path(path),
        None => ConfigLoader::new(),
    };
    Ok(loader.load()?)
}

/// Load scenario files into a suite plan
pub fn build_plan(paths: &[PathBuf]) -> anyhow::Result<SuitePlan> {
    let mut suite = SuiteBuilder::new();
    for path in paths {
        suite = suite.register(Scenario::load(path)?);
    }
    Ok(suite.build()?)
}

/// Human readable plan listing
pub fn render_plan(plan: &SuitePlan) -> String {
    let mut out = String::new();
    for entry in plan.entries() {
        match &entry.skip_reason {
            None => out.push_str(&format!(
                "run   {} ({} steps)\n",
                entry.scenario.name,
                entry.scenario.steps.len()
            )),
            Some(reason) => out.push_str(&format!("skip  {}: {reason}\n", entry.scenario.name)),
        }
    }
    out
}

fn verify(config: HarnessConfig, paths: &[PathBuf], json: bool) -> anyhow::Result<ExitCode> {
    let plan = build_plan(paths)?;
    let launcher = ScenarioLauncher::new(config)?;

    let mut reports: Vec<ScenarioReport> = Vec::new();
    let mut failures = 0usize;
    // with --json, stdout carries only the report
    let status = |line: String| {
        if json {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    };
    for (scenario, reason) in plan.skipped() {
        status(format!("SKIP  {}: {reason}", scenario.name));
    }
    for scenario in plan.runnable() {
        match launcher.launch(scenario) {
            Ok(report) => {
                status(format!(
                    "PASS  {} ({} steps, {} reloads, {:.1}s)",
                    report.name,
                    report.steps_completed,
                    report.verified_cycles,
                    report.elapsed.as_secs_f64()
                ));
                reports.push(report);
            }
            Err(e) => {
                failures += 1;
                status(format!("FAIL  {}\n{e}", scenario.name));
            }
        }
    }

    info!(passed = reports.len(), failed = failures, "Verification finished");
    status(format!("{} passed, {failures} failed", reports.len()));
    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}
