//! Scenario definitions
//!
//! A scenario is a dev-mode loop written down as data: which fixture to
//! serve, how to launch it, and the ordered steps to drive through the
//! harness. Scenarios are usually loaded from TOML files.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use devloop_domain::error::{Error, Result};
use devloop_domain::value_objects::{BodyMatcher, HarnessState, ReplacementSet};
use serde::{Deserialize, Serialize};

/// One dev-mode loop description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name, unique within a suite
    pub name: String,
    /// Optional opt-out marker evaluated when the suite is built
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<SkipCondition>,
    /// Fixture to serve
    pub fixture: FixtureSpec,
    /// Ordered steps
    pub steps: Vec<Step>,
    /// Directory the scenario was loaded from; relative template paths
    /// resolve against it
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

/// How to obtain and launch the fixture project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSpec {
    /// Project name
    pub name: String,
    /// Template directory copied into a scratch directory before launch
    pub template: PathBuf,
    /// Program building and serving the project
    pub program: String,
    /// Ordered build arguments
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment overrides
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Base URL override for this fixture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// One harness step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Wait until the process answers with readiness content
    AwaitReady {
        /// Polled path
        #[serde(default = "default_readiness_path")]
        path: String,
        /// Substrings the body must contain
        contains: Vec<String>,
    },
    /// Assert current content without changing state
    Expect {
        /// Polled path
        path: String,
        /// Substrings the body must contain
        contains: Vec<String>,
    },
    /// Apply literal replacements to a project-relative file
    Patch {
        /// File relative to the fixture root
        file: PathBuf,
        /// Replacements in order
        replacements: ReplacementSet,
    },
    /// Wait until the patched content is served
    AwaitReload {
        /// Polled path
        path: String,
        /// Substrings the body must contain
        contains: Vec<String>,
    },
}

fn default_readiness_path() -> String {
    devloop_domain::constants::DEFAULT_READINESS_PATH.to_string()
}

impl Step {
    /// Matcher built from the step's expected substrings
    pub fn matcher(&self) -> Option<BodyMatcher> {
        match self {
            Self::AwaitReady { contains, .. }
            | Self::Expect { contains, .. }
            | Self::AwaitReload { contains, .. } => {
                Some(BodyMatcher::contains_all(contains.iter().cloned()))
            }
            Self::Patch { .. } => None,
        }
    }

    /// State the harness must be in for this step
    fn accepts(&self, state: HarnessState) -> bool {
        match self {
            Self::AwaitReady { .. } => state == HarnessState::Starting,
            Self::Expect { .. } | Self::Patch { .. } => state.is_serving(),
            Self::AwaitReload { .. } => state == HarnessState::Mutating,
        }
    }

    /// State the harness ends in after this step succeeds
    fn next_state(&self, state: HarnessState) -> HarnessState {
        match self {
            Self::AwaitReady { .. } => HarnessState::Ready,
            Self::Expect { .. } => state,
            Self::Patch { .. } => HarnessState::Mutating,
            Self::AwaitReload { .. } => HarnessState::Verified,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitReady { path, .. } => write!(f, "await ready {path}"),
            Self::Expect { path, .. } => write!(f, "expect {path}"),
            Self::Patch { file, replacements } => write!(
                f,
                "patch {} ({} replacements)",
                file.display(),
                replacements.len()
            ),
            Self::AwaitReload { path, .. } => write!(f, "await reload {path}"),
        }
    }
}

/// Opt-out marker for a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum SkipCondition {
    /// Always skipped
    Always {
        /// Why the scenario is disabled
        reason: String,
    },
    /// Skipped when the variable is set to anything
    EnvSet {
        /// Variable name
        var: String,
        /// Why the scenario is disabled
        reason: String,
    },
    /// Skipped when the variable has exactly this value
    EnvEquals {
        /// Variable name
        var: String,
        /// Value that disables the scenario
        value: String,
        /// Why the scenario is disabled
        reason: String,
    },
}

impl SkipCondition {
    /// Skip reason if the condition holds under `env`
    pub fn evaluate<F>(&self, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            Self::Always { reason } => Some(reason.clone()),
            Self::EnvSet { var, reason } => env(var).map(|_| format!("{reason} ({var} is set)")),
            Self::EnvEquals { var, value, reason } => (env(var).as_deref()
                == Some(value.as_str()))
            .then(|| format!("{reason} ({var}={value})")),
        }
    }
}

impl Scenario {
    /// Parse a scenario from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(text)
            .map_err(|e| Error::scenario(format!("Invalid scenario definition: {e}")))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load and validate a scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::io_with_source(format!("Failed to read scenario {}", path.display()), e)
        })?;
        let mut scenario = Self::from_toml_str(&text)
            .map_err(|e| Error::scenario(format!("{}: {e}", path.display())))?;
        scenario.source_dir = path.parent().map(Path::to_path_buf);
        Ok(scenario)
    }

    /// Template directory resolved against the scenario's location
    pub fn template_dir(&self) -> PathBuf {
        match &self.source_dir {
            Some(dir) if self.fixture.template.is_relative() => dir.join(&self.fixture.template),
            _ => self.fixture.template.clone(),
        }
    }

    /// Check that the steps form a valid walk through the harness states
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::scenario("Scenario name cannot be empty"));
        }
        if self.steps.is_empty() {
            return Err(Error::scenario(format!("Scenario '{}' has no steps", self.name)));
        }

        let mut state = HarnessState::Starting;
        for (index, step) in self.steps.iter().enumerate() {
            if !step.accepts(state) {
                return Err(Error::scenario(format!(
                    "Scenario '{}' step {} ({step}) cannot run while the harness is {state}",
                    self.name,
                    index + 1
                )));
            }
            match step {
                Step::Patch { replacements, .. } if replacements.is_empty() => {
                    return Err(Error::scenario(format!(
                        "Scenario '{}' step {} patches nothing",
                        self.name,
                        index + 1
                    )));
                }
                Step::AwaitReady { contains, .. }
                | Step::Expect { contains, .. }
                | Step::AwaitReload { contains, .. }
                    if contains.is_empty() =>
                {
                    return Err(Error::scenario(format!(
                        "Scenario '{}' step {} ({step}) asserts nothing",
                        self.name,
                        index + 1
                    )));
                }
                _ => {}
            }
            state = step.next_state(state);
        }

        if state == HarnessState::Mutating {
            return Err(Error::scenario(format!(
                "Scenario '{}' ends with a patch that is never verified",
                self.name
            )));
        }
        Ok(())
    }
}
