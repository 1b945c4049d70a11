//! `devloop-fixture` command line

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use devloop_domain::error::{Error, Result};

use crate::constants::DEFAULT_PORT;

/// Builds and serves a fixture project in dev mode
#[derive(Parser, Debug, Clone)]
#[command(name = "devloop-fixture")]
#[command(about = "Fixture dev server - builds a multi-module project and reloads it on change")]
#[command(version)]
pub struct Cli {
    /// Tasks to run in order, e.g. `clean :web:dev`
    #[arg(required = true)]
    pub tasks: Vec<Task>,

    /// Project root (defaults to the current directory)
    #[arg(long)]
    pub project: Option<PathBuf>,

    /// Port to serve on
    #[arg(long, env = "DEVLOOP_FIXTURE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// One build task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Remove the build output
    Clean,
    /// Build `module` and serve it with live reload
    Dev {
        /// Module to serve
        module: String,
    },
}

impl FromStr for Task {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "clean" {
            return Ok(Self::Clean);
        }
        let module = s
            .strip_prefix(':')
            .unwrap_or(s)
            .strip_suffix(":dev")
            .filter(|m| !m.is_empty() && !m.contains(':'))
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "Unknown task '{s}', expected 'clean' or ':<module>:dev'"
                ))
            })?;
        Ok(Self::Dev {
            module: module.to_string(),
        })
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::Dev { module } => write!(f, ":{module}:dev"),
        }
    }
}

/// Validated task list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPlan {
    /// Run `clean` before serving
    pub clean: bool,
    /// Module to serve
    pub module: String,
}

impl Cli {
    /// Check the task order: any number of `clean`, then exactly one dev task
    pub fn plan(&self) -> Result<TaskPlan> {
        let Some((Task::Dev { module }, before)) = self.tasks.split_last() else {
            return Err(Error::invalid_argument(
                "The last task must be a dev task such as ':web:dev'",
            ));
        };
        if before.iter().any(|t| matches!(t, Task::Dev { .. })) {
            return Err(Error::invalid_argument("Only one dev task can run"));
        }
        Ok(TaskPlan {
            clean: before.contains(&Task::Clean),
            module: module.clone(),
        })
    }

    /// Project root
    pub fn project_root(&self) -> Result<PathBuf> {
        match &self.project {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir()
                .map_err(|e| Error::io_with_source("Failed to read current directory", e)),
        }
    }
}
