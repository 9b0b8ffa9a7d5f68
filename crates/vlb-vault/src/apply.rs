//! Applying suggestions to vault files.
//!
//! Each note is read once, all accepted links are inserted in memory, and the
//! result is written back in a single atomic replace. Nothing is written in
//! dry-run mode; the report is the same either way.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use chrono::Local;
use tracing::{debug, info, warn};

use vlb_core::document::path_stem;
use vlb_core::{Confidence, LinkFormat, Result, Suggestion, SuggestionMap, VlbError};

use crate::insert::{insert_link, Placement, RELATED_NOTES_HEADING};

/// Settings for one apply pass.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    pub min_confidence: Confidence,
    pub format: LinkFormat,
    pub dry_run: bool,
    pub backup: bool,
    pub related_heading: String,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            min_confidence: Confidence::Medium,
            format: LinkFormat::Markdown,
            dry_run: false,
            backup: false,
            related_heading: RELATED_NOTES_HEADING.to_string(),
        }
    }
}

/// Links added to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub file: String,
    pub links_added: usize,
    pub inline: usize,
    pub section: usize,
    pub backup: Option<PathBuf>,
}

/// Outcome of an apply pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub files_modified: usize,
    pub links_added: usize,
    pub changes: Vec<FileChange>,
    /// Sources named in the suggestions but absent from the vault.
    pub missing: Vec<String>,
    /// Sources that could not be read or written, with the error.
    pub failed: Vec<(String, String)>,
    pub dry_run: bool,
}

/// Inserts suggested links into the notes of one vault.
pub struct LinkApplier {
    root: PathBuf,
    options: ApplyOptions,
}

impl LinkApplier {
    /// Create an applier for the vault at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`VlbError::NotFound`] if `root` is not a directory.
    pub fn new(root: &Path, options: ApplyOptions) -> Result<Self> {
        if !root.is_dir() {
            return Err(VlbError::NotFound(root.to_path_buf()));
        }
        Ok(Self {
            root: root.to_path_buf(),
            options,
        })
    }

    /// Apply every qualifying suggestion and report what changed.
    pub fn apply(&self, suggestions: &SuggestionMap) -> ApplyReport {
        let mut report = ApplyReport {
            dry_run: self.options.dry_run,
            ..ApplyReport::default()
        };

        for (file, list) in suggestions {
            let accepted: Vec<&Suggestion> = list
                .iter()
                .filter(|s| s.confidence >= self.options.min_confidence)
                .collect();
            if accepted.is_empty() {
                continue;
            }

            let Some(full_path) = self.resolve(file) else {
                warn!(file = %file, "suggestion source escapes the vault, skipping");
                let err = VlbError::Vault(format!("{file} is outside the vault root"));
                report.failed.push((file.clone(), err.to_string()));
                continue;
            };
            if !full_path.is_file() {
                warn!(file = %file, "file not found, skipping");
                report.missing.push(file.clone());
                continue;
            }

            match self.apply_file(file, &full_path, &accepted) {
                Ok(Some(change)) => {
                    report.files_modified += 1;
                    report.links_added += change.links_added;
                    report.changes.push(change);
                }
                Ok(None) => debug!(file = %file, "no new links"),
                Err(err) => {
                    warn!(file = %file, error = %err, "could not update file");
                    report.failed.push((file.clone(), err.to_string()));
                }
            }
        }

        info!(
            files = report.files_modified,
            links = report.links_added,
            dry_run = report.dry_run,
            "apply pass complete"
        );
        report
    }

    fn apply_file(
        &self,
        file: &str,
        full_path: &Path,
        accepted: &[&Suggestion],
    ) -> Result<Option<FileChange>> {
        let original = fs::read_to_string(full_path)?;
        let (content, mut change) = plan_file(
            &original,
            accepted,
            self.options.format,
            &self.options.related_heading,
        );
        if content == original {
            return Ok(None);
        }
        change.file = file.to_string();

        if !self.options.dry_run {
            if self.options.backup {
                change.backup = Some(backup_file(full_path)?);
            }
            write_atomic(full_path, &content)?;
            info!(file = %file, links = change.links_added, "updated note");
        }
        Ok(Some(change))
    }

    /// Join a vault key onto the root, rejecting keys that leave the vault.
    fn resolve(&self, file: &str) -> Option<PathBuf> {
        let rel = Path::new(file);
        let normal = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        (normal && !file.is_empty()).then(|| self.root.join(rel))
    }
}

/// Insert all `suggestions` into `content`, cumulatively.
///
/// Returns the new content and a change record (with an empty `file`).
#[must_use]
pub fn plan_file(
    content: &str,
    suggestions: &[&Suggestion],
    format: LinkFormat,
    heading: &str,
) -> (String, FileChange) {
    let mut current = content.to_string();
    let mut change = FileChange {
        file: String::new(),
        links_added: 0,
        inline: 0,
        section: 0,
        backup: None,
    };

    for suggestion in suggestions {
        let Some((next, placement)) = insert_link(&current, suggestion, format, heading) else {
            continue;
        };
        current = next;
        change.links_added += 1;
        match placement {
            Placement::Inline => change.inline += 1,
            Placement::Section => change.section += 1,
        }
    }

    (current, change)
}

/// Copy `path` to a timestamped `.bak` sibling and return the backup path.
///
/// # Errors
///
/// Returns [`VlbError::Io`] if the copy fails.
pub fn backup_file(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let backup = path.with_file_name(format!("{}.{stamp}.bak", path_stem(&name)));
    fs::copy(path, &backup)?;
    Ok(backup)
}

/// Replace `path` with `content` via a temp file in the same directory.
///
/// # Errors
///
/// Returns [`VlbError::Io`] if the temp file cannot be written or renamed.
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions())?;
    }
    tmp.persist(path).map_err(|e| VlbError::Io(e.error))?;
    Ok(())
}
