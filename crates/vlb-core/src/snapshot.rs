//! Vault snapshot: the analyzer's output and the suggester's input.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::NoteRecord;
use crate::error::{Result, SnapshotError, VlbError};

/// Keyed index from a concept or tag to the documents containing it.
pub type PathIndex = BTreeMap<String, BTreeSet<String>>;

/// Everything the suggester needs to know about a vault.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultSnapshot {
    pub files: BTreeMap<String, NoteRecord>,
    /// Lower-cased concept → paths.
    pub concept_index: PathIndex,
    pub tag_index: PathIndex,
    /// Source path → raw link targets. Only notes with outbound links appear.
    pub link_graph: PathIndex,
    pub stats: VaultStats,
}

/// Aggregate numbers reported after an analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VaultStats {
    pub total_files: usize,
    pub total_links: usize,
    pub files_with_links: usize,
    pub files_without_links: usize,
    pub avg_links_per_file: f64,
    pub total_concepts: usize,
    pub total_tags: usize,
}

impl VaultSnapshot {
    /// Build indices and stats from per-file records keyed by vault path.
    #[must_use]
    pub fn from_records(files: BTreeMap<String, NoteRecord>) -> Self {
        let mut concept_index = PathIndex::new();
        let mut tag_index = PathIndex::new();
        let mut link_graph = PathIndex::new();

        for (path, record) in &files {
            for concept in &record.concepts {
                concept_index
                    .entry(concept.to_lowercase())
                    .or_default()
                    .insert(path.clone());
            }
            for tag in &record.tags {
                tag_index.entry(tag.clone()).or_default().insert(path.clone());
            }
            if !record.existing_links.is_empty() {
                link_graph
                    .entry(path.clone())
                    .or_default()
                    .extend(record.existing_links.iter().cloned());
            }
        }

        let stats = VaultStats::compute(files.len(), &concept_index, &tag_index, &link_graph);

        Self {
            files,
            concept_index,
            tag_index,
            link_graph,
            stats,
        }
    }

    /// Check that every path referenced by an index is a known document.
    ///
    /// # Errors
    ///
    /// Returns the first [`SnapshotError`] found.
    pub fn validate(&self) -> std::result::Result<(), SnapshotError> {
        for (concept, paths) in &self.concept_index {
            if let Some(path) = paths.iter().find(|p| !self.files.contains_key(*p)) {
                return Err(SnapshotError::DanglingConcept {
                    concept: concept.clone(),
                    path: path.clone(),
                });
            }
        }
        for (tag, paths) in &self.tag_index {
            if let Some(path) = paths.iter().find(|p| !self.files.contains_key(*p)) {
                return Err(SnapshotError::DanglingTag {
                    tag: tag.clone(),
                    path: path.clone(),
                });
            }
        }
        if let Some(source) = self.link_graph.keys().find(|p| !self.files.contains_key(*p)) {
            return Err(SnapshotError::DanglingLinkSource(source.clone()));
        }
        Ok(())
    }

    /// Read a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`VlbError::NotFound`] if the file is missing and
    /// [`VlbError::Serialization`] if it is not a valid snapshot.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(VlbError::NotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Write the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`VlbError::Io`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, self)
    }
}

impl VaultStats {
    fn compute(
        total_files: usize,
        concept_index: &PathIndex,
        tag_index: &PathIndex,
        link_graph: &PathIndex,
    ) -> Self {
        let total_links = link_graph.values().map(BTreeSet::len).sum();
        let files_with_links = link_graph.values().filter(|links| !links.is_empty()).count();
        let avg_links_per_file = if total_files > 0 {
            total_links as f64 / total_files as f64
        } else {
            0.0
        };

        Self {
            total_files,
            total_links,
            files_with_links,
            files_without_links: total_files.saturating_sub(files_with_links),
            avg_links_per_file,
            total_concepts: concept_index.len(),
            total_tags: tag_index.len(),
        }
    }
}

/// Serialize `value` as pretty JSON into `path`.
///
/// # Errors
///
/// Returns [`VlbError::Io`] or [`VlbError::Serialization`].
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}
