//! Source replacement value objects
//!
//! A [`ReplacementSet`] is an ordered mapping from exact search text to
//! replacement text. Every entry is located in the original snapshot of the
//! file and all edits are applied in one pass, so text produced by one entry
//! is never matched by another.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One literal search/replace pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// Exact text to look for
    pub search: String,
    /// Text written in its place
    #[serde(rename = "replace")]
    pub replacement: String,
}

/// Ordered set of replacements applied to a single file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplacementSet {
    entries: Vec<Replacement>,
}

impl ReplacementSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set with a single entry
    pub fn single(search: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self::new().replace(search, replacement)
    }

    /// Add an entry, builder style
    pub fn replace(mut self, search: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.insert(search, replacement);
        self
    }

    /// Add an entry
    ///
    /// Re-inserting an existing search text updates its replacement and keeps
    /// the original position.
    pub fn insert(&mut self, search: impl Into<String>, replacement: impl Into<String>) {
        let search = search.into();
        let replacement = replacement.into();
        match self.entries.iter_mut().find(|e| e.search == search) {
            Some(existing) => existing.replacement = replacement,
            None => self.entries.push(Replacement {
                search,
                replacement,
            }),
        }
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[Replacement] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compute the patched content of `file` from its `original` text
    ///
    /// Fails with [`Error::MissingSubstring`] naming the first entry (in set
    /// order) whose search text is absent, and with
    /// [`Error::InvalidArgument`] for empty search texts or for matches of
    /// two entries that overlap in the original.
    pub fn apply_to(&self, file: &Path, original: &str) -> Result<String> {
        if let Some(empty) = self.entries.iter().position(|e| e.search.is_empty()) {
            return Err(Error::invalid_argument(format!(
                "Replacement #{} for {} has an empty search text",
                empty + 1,
                file.display()
            )));
        }

        if let Some(missing) = self.entries.iter().find(|e| !original.contains(&e.search)) {
            return Err(Error::missing_substring(file, missing.search.clone()));
        }

        // (start, end, entry index)
        let mut edits: Vec<(usize, usize, usize)> = self
            .entries
            .iter()
            .enumerate()
            .flat_map(|(idx, entry)| {
                original
                    .match_indices(entry.search.as_str())
                    .map(move |(start, text)| (start, start + text.len(), idx))
            })
            .collect();
        edits.sort_unstable();

        for pair in edits.windows(2) {
            let (_, prev_end, prev_idx) = pair[0];
            let (next_start, _, next_idx) = pair[1];
            if next_start < prev_end {
                return Err(Error::invalid_argument(format!(
                    "Replacements for {:?} and {:?} overlap in {}",
                    self.entries[prev_idx].search,
                    self.entries[next_idx].search,
                    file.display()
                )));
            }
        }

        let mut patched = String::with_capacity(original.len());
        let mut cursor = 0;
        for (start, end, idx) in edits {
            patched.push_str(&original[cursor..start]);
            patched.push_str(&self.entries[idx].replacement);
            cursor = end;
        }
        patched.push_str(&original[cursor..]);
        Ok(patched)
    }
}

impl<S: Into<String>, R: Into<String>> FromIterator<(S, R)> for ReplacementSet {
    fn from_iter<T: IntoIterator<Item = (S, R)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (search, replacement) in iter {
            set.insert(search, replacement);
        }
        set
    }
}
