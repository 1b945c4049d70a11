//! Project manifest

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use devloop_domain::error::{Error, Result};
use devloop_infrastructure::error_ext::ErrorContext;
use serde::{Deserialize, Serialize};

use crate::constants::MANIFEST_FILENAME;

/// Parsed `devloop-project.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Project coordinates
    pub project: ProjectInfo,
    /// Modules in declaration order
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
    /// Routes served by the modules
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

/// Project coordinates shown on the readiness page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Artifact name
    pub name: String,
    /// Group id
    pub group: String,
    /// Version
    pub version: String,
}

/// One module of the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Module name, also its directory under the project root
    pub name: String,
    /// Modules this one depends on
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// One HTTP route and the function whose literal it serves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    /// Request path, starting with `/`
    pub path: String,
    /// Module owning the source file
    pub module: String,
    /// Source file relative to the module directory
    pub source: PathBuf,
    /// Function returning the served string literal
    pub function: String,
}

impl ProjectManifest {
    /// Load and validate the manifest of the project at `root`
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILENAME);
        let text = std::fs::read_to_string(&path)
            .io_context(format!("Failed to read project manifest {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Parse and validate manifest text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let manifest: Self =
            toml::from_str(text).config_context("Invalid project manifest")?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn module(&self, name: &str) -> Option<&ModuleSpec> {
        self.modules.iter().find(|m| m.name == name)
    }

    fn validate(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        for module in &self.modules {
            if !names.insert(module.name.as_str()) {
                return Err(Error::configuration(format!(
                    "Module '{}' is declared twice",
                    module.name
                )));
            }
        }
        for module in &self.modules {
            if let Some(missing) = module.depends_on.iter().find(|d| !names.contains(d.as_str())) {
                return Err(Error::configuration(format!(
                    "Module '{}' depends on unknown module '{missing}'",
                    module.name
                )));
            }
        }
        for route in &self.routes {
            if !route.path.starts_with('/') {
                return Err(Error::configuration(format!(
                    "Route path '{}' must start with '/'",
                    route.path
                )));
            }
            if !names.contains(route.module.as_str()) {
                return Err(Error::configuration(format!(
                    "Route '{}' belongs to unknown module '{}'",
                    route.path, route.module
                )));
            }
        }
        for module in &self.modules {
            self.modules_for(&module.name)?;
        }
        Ok(())
    }

    /// `target` and its transitive dependencies, dependencies first
    pub fn modules_for(&self, target: &str) -> Result<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            manifest: &ProjectManifest,
            name: &str,
            marks: &mut HashMap<String, Mark>,
            order: &mut Vec<String>,
        ) -> Result<()> {
            match marks.get(name) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    return Err(Error::configuration(format!(
                        "Module dependency cycle through '{name}'"
                    )));
                }
                None => {}
            }
            let module = manifest
                .module(name)
                .ok_or_else(|| Error::configuration(format!("Unknown module '{name}'")))?;
            marks.insert(name.to_string(), Mark::Visiting);
            for dependency in &module.depends_on {
                visit(manifest, dependency, marks, order)?;
            }
            marks.insert(name.to_string(), Mark::Done);
            order.push(name.to_string());
            Ok(())
        }

        let mut marks = HashMap::new();
        let mut order = Vec::new();
        visit(self, target, &mut marks, &mut order)?;
        Ok(order)
    }
}
