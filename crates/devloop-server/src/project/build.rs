//! Project build
//!
//! Building a module means reading, for every route the module (or one of
//! its dependencies) serves, the first string literal returned by the
//! route's function. The result is written to `build/routes.json`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use devloop_domain::error::Result;
use devloop_infrastructure::adapters::patcher::write_atomically;
use devloop_infrastructure::error_ext::ErrorContext;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::manifest::{ProjectManifest, RouteSpec};
use crate::constants::{BUILD_DIR, ROUTES_FILENAME};

static FN_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid regex"));

/// Compilation failure shown instead of the served content
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("Compilation failed in {}: {message}", source_file.display())]
pub struct BuildError {
    /// File that failed to compile
    pub source_file: PathBuf,
    /// What went wrong
    pub message: String,
}

impl BuildError {
    fn new(source_file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            message: message.into(),
        }
    }
}

/// Successful build output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledProject {
    /// Module that was built
    pub module: String,
    /// Modules included in the build, dependencies first
    pub modules: Vec<String>,
    /// Served content per route path
    pub routes: BTreeMap<String, String>,
}

/// Outcome of the latest build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildState {
    /// Build succeeded
    Compiled(CompiledProject),
    /// Build failed
    Failed(BuildError),
}

impl BuildState {
    /// Served content for `path`, if the build succeeded and serves it
    pub fn route(&self, path: &str) -> Option<&str> {
        match self {
            Self::Compiled(project) => project.routes.get(path).map(String::as_str),
            Self::Failed(_) => None,
        }
    }
}

/// Build `module` of the project at `root`
pub fn build_project(root: &Path, manifest: &ProjectManifest, module: &str) -> BuildState {
    let modules = match manifest.modules_for(module) {
        Ok(modules) => modules,
        Err(e) => {
            return BuildState::Failed(BuildError::new(
                root.join(crate::constants::MANIFEST_FILENAME),
                e.to_string(),
            ));
        }
    };

    let mut routes = BTreeMap::new();
    for route in manifest.routes.iter().filter(|r| modules.contains(&r.module)) {
        match compile_route(root, route) {
            Ok(content) => {
                debug!(path = %route.path, function = %route.function, "Compiled route");
                routes.insert(route.path.clone(), content);
            }
            Err(e) => {
                warn!(error = %e, "Build failed");
                return BuildState::Failed(e);
            }
        }
    }

    let project = CompiledProject {
        module: module.to_string(),
        modules,
        routes,
    };
    if let Err(e) = write_output(root, &project) {
        warn!(error = %e, "Failed to write build output");
        return BuildState::Failed(BuildError::new(root.join(BUILD_DIR), e.to_string()));
    }
    info!(module, routes = project.routes.len(), "Build succeeded");
    BuildState::Compiled(project)
}

/// Remove the build directory of the project at `root`
pub fn clean(root: &Path) -> Result<()> {
    let build_dir = root.join(BUILD_DIR);
    match std::fs::remove_dir_all(&build_dir) {
        Ok(()) => {
            info!(dir = %build_dir.display(), "Cleaned build output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).io_context(format!("Failed to clean {}", build_dir.display())),
    }
}

fn write_output(root: &Path, project: &CompiledProject) -> Result<()> {
    let build_dir = root.join(BUILD_DIR);
    std::fs::create_dir_all(&build_dir)
        .io_context(format!("Failed to create {}", build_dir.display()))?;
    let json = serde_json::to_string_pretty(project).context("Failed to serialize build output")?;
    write_atomically(&build_dir.join(ROUTES_FILENAME), json.as_bytes())
}

fn compile_route(root: &Path, route: &RouteSpec) -> std::result::Result<String, BuildError> {
    let file = root.join(&route.module).join(&route.source);
    let source = std::fs::read_to_string(&file)
        .map_err(|e| BuildError::new(&file, format!("cannot read source: {e}")))?;
    extract_literal(&source, &route.function).map_err(|message| BuildError::new(&file, message))
}

/// First string literal inside the body of `fn <function>`
pub fn extract_literal(source: &str, function: &str) -> std::result::Result<String, String> {
    if !FN_IDENT.is_match(function) {
        return Err(format!("'{function}' is not a function name"));
    }
    let header = Regex::new(&format!(r"\bfn\s+{function}\s*(?:<[^>]*>)?\s*\([^)]*\)[^{{;]*\{{"))
        .map_err(|e| e.to_string())?;
    let found = header
        .find(source)
        .ok_or_else(|| format!("function '{function}' not found"))?;

    let mut depth = 1usize;
    let mut chars = source[found.end()..].chars();
    while let Some(c) = chars.next() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            '"' => return read_literal(&mut chars, function),
            _ => {}
        }
    }
    Err(format!("function '{function}' returns no string literal"))
}

fn read_literal(chars: &mut std::str::Chars<'_>, function: &str) -> std::result::Result<String, String> {
    let mut literal = String::new();
    while let Some(c) = chars.next() {
        match c {
            '"' => return Ok(literal),
            '\\' => match chars.next() {
                Some('n') => literal.push('\n'),
                Some('t') => literal.push('\t'),
                Some(other @ ('"' | '\\' | '\'')) => literal.push(other),
                Some(other) => return Err(format!("unsupported escape '\\{other}' in '{function}'")),
                None => break,
            },
            other => literal.push(other),
        }
    }
    Err(format!("unterminated string literal in '{function}'"))
}
