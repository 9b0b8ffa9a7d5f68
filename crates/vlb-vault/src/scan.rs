//! Vault scanning: walks the vault and builds a [`VaultSnapshot`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use vlb_core::document::NOTE_EXTENSION;
use vlb_core::{NoteRecord, Result, VaultSnapshot, VlbError};

/// Options controlling which files the scan visits.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Directory names pruned from the walk, in addition to hidden ones.
    pub exclude_dirs: Vec<String>,
}

/// Analyze every non-hidden markdown note under `root`.
///
/// Unreadable notes are kept as empty records so one bad file never aborts
/// the scan.
///
/// # Errors
///
/// Returns [`VlbError::NotFound`] if `root` is not a directory.
pub fn analyze_vault(root: &Path, options: &ScanOptions) -> Result<VaultSnapshot> {
    let notes = collect_notes(root, options)?;

    let mut files = BTreeMap::new();
    for path in notes {
        let Some(rel) = relative_key(root, &path) else {
            continue;
        };
        let record = match fs::read_to_string(&path) {
            Ok(content) => vlb_parser::parse_note(&rel, &content),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unreadable note, recording empty entry");
                NoteRecord::empty()
            }
        };
        debug!(path = %rel, concepts = record.concepts.len(), tags = record.tags.len(), "analyzed note");
        files.insert(rel, record);
    }

    let snapshot = VaultSnapshot::from_records(files);
    info!(
        files = snapshot.stats.total_files,
        links = snapshot.stats.total_links,
        concepts = snapshot.stats.total_concepts,
        tags = snapshot.stats.total_tags,
        "vault analysis complete"
    );
    Ok(snapshot)
}

/// Paths of all markdown notes under `root`, sorted.
///
/// # Errors
///
/// Returns [`VlbError::NotFound`] if `root` is not a directory.
pub fn collect_notes(root: &Path, options: &ScanOptions) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(VlbError::NotFound(root.to_path_buf()));
    }

    let notes = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry, options))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable vault entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_note(entry.path()))
        .map(DirEntry::into_path)
        .collect();

    Ok(notes)
}

fn is_skipped(entry: &DirEntry, options: &ScanOptions) -> bool {
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }
    entry.file_type().is_dir() && options.exclude_dirs.iter().any(|d| d == name.as_ref())
}

fn is_note(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(NOTE_EXTENSION)
}

/// `/`-separated path of `path` relative to `root`.
#[must_use]
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}
