//! Note record: the per-file metadata produced by the analyzer.

use serde::{Deserialize, Serialize};

/// Extension of documents considered part of the vault.
pub const NOTE_EXTENSION: &str = "md";

/// Directory value used for notes at the vault root.
pub const ROOT_DIRECTORY: &str = ".";

/// Metadata extracted from one markdown file.
///
/// Records are recomputed on every analyzer run and never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Vault-relative, `/`-separated path.
    pub path: String,
    pub title: String,
    /// Sorted, deduplicated.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Sorted, deduplicated.
    #[serde(default)]
    pub concepts: Vec<String>,
    /// Raw link targets as written in the note (wikilink targets or `.md` paths).
    #[serde(default)]
    pub existing_links: Vec<String>,
    #[serde(default)]
    pub headings: Vec<Heading>,
    #[serde(default)]
    pub word_count: usize,
    /// Vault-relative parent directory, [`ROOT_DIRECTORY`] at the root.
    #[serde(default)]
    pub directory: String,
}

/// A markdown heading with its level (1..=6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
}

impl NoteRecord {
    /// The record stored for a file that could not be read.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// File name without the extension, derived from `path`.
    #[must_use]
    pub fn stem(&self) -> &str {
        path_stem(&self.path)
    }
}

/// File stem of a `/`-separated vault path (`notes/Rust Basics.md` → `Rust Basics`).
#[must_use]
pub fn path_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}
