//! Fixture materialization
//!
//! Every harness gets a private copy of its template project so parallel
//! runs and mutated sources never leak into the template or each other.

use std::fs;
use std::path::{Path, PathBuf};

use devloop_domain::error::{Error, Result};
use devloop_domain::value_objects::ProjectFixture;
use tempfile::TempDir;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::constants::{FIXTURE_SKIPPED_DIRS, FIXTURE_TEMP_PREFIX};
use crate::error_ext::ErrorContext;

/// Copies fixture templates into scratch directories
#[derive(Debug, Clone, Default)]
pub struct FixtureWorkspace {
    parent_dir: Option<PathBuf>,
}

impl FixtureWorkspace {
    /// Workspace creating scratch directories in the system temp dir
    pub fn new() -> Self {
        Self::default()
    }

    /// Workspace creating scratch directories under `dir`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            parent_dir: Some(dir.into()),
        }
    }

    /// Copy `template` into a new scratch directory and root `fixture` there
    ///
    /// `build/` and `target/` directories are not copied.
    pub fn materialize(
        &self,
        template: impl AsRef<Path>,
        fixture: &ProjectFixture,
    ) -> Result<MaterializedFixture> {
        let template = template.as_ref();
        if !template.is_dir() {
            return Err(Error::io(format!(
                "Fixture template {} is not a directory",
                template.display()
            )));
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix(FIXTURE_TEMP_PREFIX);
        let dir = match &self.parent_dir {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .io_context("Failed to create fixture directory")?;

        let copied = copy_tree(template, dir.path())?;
        debug!(
            fixture = %fixture.name(),
            template = %template.display(),
            root = %dir.path().display(),
            files = copied,
            "Fixture materialized"
        );

        let fixture = fixture.relocated(dir.path());
        Ok(MaterializedFixture { dir, fixture })
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| FIXTURE_SKIPPED_DIRS.contains(&name))
}

/// Copy the tree under `from` into `to`, returning the number of files
fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    let mut files = 0;
    for entry in WalkDir::new(from).into_iter().filter_entry(|e| !is_skipped(e)) {
        let entry = entry.context(format!("Failed to walk {}", from.display()))?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(|_| Error::internal("walkdir yielded a path outside the template"))?;
        let destination = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)
                .io_context(format!("Failed to create {}", destination.display()))?;
        } else {
            fs::copy(entry.path(), &destination).io_context(format!(
                "Failed to copy {} to {}",
                entry.path().display(),
                destination.display()
            ))?;
            files += 1;
        }
    }
    Ok(files)
}

/// A fixture rooted in a scratch copy that is deleted on drop
#[derive(Debug)]
pub struct MaterializedFixture {
    dir: TempDir,
    fixture: ProjectFixture,
}

impl MaterializedFixture {
    /// The relocated fixture
    pub fn fixture(&self) -> &ProjectFixture {
        &self.fixture
    }

    /// Root of the scratch copy
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Keep the scratch copy on disk (for post-mortem inspection)
    pub fn keep(self) -> (PathBuf, ProjectFixture) {
        (self.dir.keep(), self.fixture)
    }
}
