//! Source patcher adapter

use std::fs;
use std::io::Write;
use std::path::Path;

use devloop_domain::error::{Error, Result};
use devloop_domain::ports::SourcePatcher;
use devloop_domain::value_objects::ReplacementSet;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error_ext::ErrorContext;

/// [`SourcePatcher`] that rewrites files through a same-directory temp file
///
/// The watcher of the served project only ever sees the old or the new
/// content, never a truncated file.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomicSourcePatcher;

impl AtomicSourcePatcher {
    /// Create a patcher
    pub fn new() -> Self {
        Self
    }
}

impl SourcePatcher for AtomicSourcePatcher {
    fn apply_replacements(&self, file: &Path, set: &ReplacementSet) -> Result<()> {
        let bytes = fs::read(file).io_context(format!("Failed to read {}", file.display()))?;
        let original = String::from_utf8(bytes).map_err(|e| {
            Error::io_with_source(format!("{} is not valid UTF-8", file.display()), e)
        })?;

        let patched = set.apply_to(file, &original)?;
        write_atomically(file, patched.as_bytes())?;

        debug!(
            file = %file.display(),
            replacements = set.len(),
            bytes = patched.len(),
            "Source patched"
        );
        Ok(())
    }
}

/// Replace `target` with `content` via rename, keeping its permissions
pub fn write_atomically(target: &Path, content: &[u8]) -> Result<()> {
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(target)
        .io_context(format!("Failed to stat {}", target.display()))?
        .permissions();

    let mut temp = NamedTempFile::new_in(dir)
        .io_context(format!("Failed to create temp file in {}", dir.display()))?;
    temp.write_all(content)
        .io_context(format!("Failed to write temp file for {}", target.display()))?;
    temp.as_file()
        .sync_all()
        .io_context(format!("Failed to sync temp file for {}", target.display()))?;
    fs::set_permissions(temp.path(), permissions)
        .io_context(format!("Failed to copy permissions to {}", temp.path().display()))?;

    temp.persist(target)
        .map_err(|e| e.error)
        .io_context(format!("Failed to replace {}", target.display()))?;
    Ok(())
}
