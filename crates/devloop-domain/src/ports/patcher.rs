//! Source patcher port

use std::path::Path;

use crate::error::Result;
use crate::value_objects::ReplacementSet;

/// Applies literal replacements to a source file
pub trait SourcePatcher: Send + Sync {
    /// Rewrite `file` with every entry of `set` applied
    ///
    /// The write is atomic with respect to readers of `file`. On any error
    /// (notably [`crate::error::Error::MissingSubstring`]) the file keeps its
    /// previous bytes.
    fn apply_replacements(&self, file: &Path, set: &ReplacementSet) -> Result<()>;
}
