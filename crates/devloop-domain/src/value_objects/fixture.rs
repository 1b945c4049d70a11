//! Project fixture value objects

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// A buildable multi-module project tree plus the command that serves it
///
/// Immutable once built; one fixture per test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFixture {
    name: String,
    root: PathBuf,
    program: String,
    arguments: Vec<String>,
    environment: BTreeMap<String, String>,
}

impl ProjectFixture {
    /// Start building a fixture for the project at `root`
    pub fn builder(name: impl Into<String>, root: impl Into<PathBuf>) -> ProjectFixtureBuilder {
        ProjectFixtureBuilder {
            name: name.into(),
            root: root.into(),
            program: None,
            arguments: Vec::new(),
            environment: BTreeMap::new(),
        }
    }

    /// Project name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Program used to build and serve the project
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Ordered build arguments
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Environment overrides on top of the inherited environment
    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    /// Same fixture rooted somewhere else (used after copying the tree)
    pub fn relocated(&self, root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..self.clone()
        }
    }

    /// Resolve a project-relative path against the fixture root
    ///
    /// Absolute paths and paths escaping the root through `..` are rejected.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> Result<PathBuf> {
        let relative = relative.as_ref();
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if escapes || relative.as_os_str().is_empty() {
            return Err(Error::invalid_argument(format!(
                "Fixture path must be relative to the project root: {}",
                relative.display()
            )));
        }
        Ok(self.root.join(relative))
    }

    /// Launch description for the process runner
    pub fn launch_spec(&self) -> LaunchSpec {
        LaunchSpec {
            program: self.program.clone(),
            arguments: self.arguments.clone(),
            working_dir: self.root.clone(),
            environment: self.environment.clone(),
        }
    }
}

/// Builder for [`ProjectFixture`]
#[derive(Debug, Clone)]
pub struct ProjectFixtureBuilder {
    name: String,
    root: PathBuf,
    program: Option<String>,
    arguments: Vec<String>,
    environment: BTreeMap<String, String>,
}

impl ProjectFixtureBuilder {
    /// Set the program to launch
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    /// Append one build argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    /// Append several build arguments in order
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    /// Override one environment variable
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Finish the fixture
    pub fn build(self) -> Result<ProjectFixture> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_argument("Fixture name cannot be empty"));
        }
        let program = self
            .program
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                Error::invalid_argument(format!("Fixture '{}' has no program", self.name))
            })?;
        Ok(ProjectFixture {
            name: self.name,
            root: self.root,
            program,
            arguments: self.arguments,
            environment: self.environment,
        })
    }
}

/// Everything needed to spawn the external process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Program to execute
    pub program: String,
    /// Ordered arguments
    pub arguments: Vec<String>,
    /// Working directory
    pub working_dir: PathBuf,
    /// Environment overrides
    pub environment: BTreeMap<String, String>,
}

impl LaunchSpec {
    /// Command line rendered for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.arguments.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
