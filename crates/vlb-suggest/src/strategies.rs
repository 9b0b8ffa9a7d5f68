//! Candidate-generating strategies.
//!
//! Each strategy looks at one source note and proposes targets with a fixed
//! weight per match. Strategies are independent; merging happens in
//! [`crate::scoring`].

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use vlb_core::document::{path_stem, ROOT_DIRECTORY};
use vlb_core::{NoteRecord, Reason, ReasonKind, VaultSnapshot};

pub const CONCEPT_WEIGHT: f64 = 0.4;
pub const TAG_WEIGHT: f64 = 0.3;
pub const SAME_DIRECTORY_WEIGHT: f64 = 0.2;
pub const RELATED_DIRECTORY_WEIGHT: f64 = 0.1;
/// Multiplied by the title similarity.
pub const TITLE_WEIGHT: f64 = 0.3;

const MIN_COMMON_TITLE_WORDS: usize = 2;
const MAX_TITLE_WORDS_IN_REASON: usize = 3;

static TITLE_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("valid title word regex"));

/// An unscored proposal to link `source` to `target`.
///
/// `source` is carried for tracing; ranking groups by `target` only.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub reason: Reason,
    pub weight: f64,
}

/// The note suggestions are generated for, with its link lookup prepared.
#[derive(Debug)]
pub struct Source<'a> {
    pub path: &'a str,
    pub record: &'a NoteRecord,
    linked: BTreeSet<String>,
}

impl<'a> Source<'a> {
    #[must_use]
    pub fn new(path: &'a str, record: &'a NoteRecord) -> Self {
        let linked = record
            .existing_links
            .iter()
            .map(|link| normalize_link(link))
            .filter(|link| !link.is_empty())
            .collect();
        Self {
            path,
            record,
            linked,
        }
    }

    /// Whether `target` may be proposed: not the source itself and not linked yet.
    ///
    /// A link counts when it names the target's path (with or without the
    /// extension), its file stem, or its title, ignoring case.
    #[must_use]
    pub fn accepts(&self, target: &str, target_record: Option<&NoteRecord>) -> bool {
        if target == self.path {
            return false;
        }
        let path = target.to_lowercase();
        let without_ext = path.strip_suffix(".md").unwrap_or(&path);
        let stem = path_stem(&path);
        let title = target_record.map(|r| r.title.trim().to_lowercase());

        let already_linked = self.linked.contains(&path)
            || self.linked.contains(without_ext)
            || self.linked.contains(stem)
            || title.is_some_and(|t| !t.is_empty() && self.linked.contains(&t));
        !already_linked
    }
}

/// Lower-case a raw link target and drop any `#heading` part.
fn normalize_link(link: &str) -> String {
    let target = link.split_once('#').map_or(link, |(before, _)| before);
    target.trim().to_lowercase()
}

/// Notes sharing a concept (case-insensitive).
#[must_use]
pub fn by_concept<'a>(snapshot: &'a VaultSnapshot, source: &Source<'a>) -> Vec<Candidate<'a>> {
    let mut out = Vec::new();
    for concept in &source.record.concepts {
        let Some(paths) = snapshot.concept_index.get(&concept.to_lowercase()) else {
            continue;
        };
        for target in paths {
            if source.accepts(target, snapshot.files.get(target)) {
                out.push(Candidate {
                    source: source.path,
                    target,
                    reason: Reason::new(ReasonKind::SharedConcept, concept.clone()),
                    weight: CONCEPT_WEIGHT,
                });
            }
        }
    }
    out
}

/// Notes sharing a tag.
#[must_use]
pub fn by_tag<'a>(snapshot: &'a VaultSnapshot, source: &Source<'a>) -> Vec<Candidate<'a>> {
    let mut out = Vec::new();
    for tag in &source.record.tags {
        let Some(paths) = snapshot.tag_index.get(tag) else {
            continue;
        };
        for target in paths {
            if source.accepts(target, snapshot.files.get(target)) {
                out.push(Candidate {
                    source: source.path,
                    target,
                    reason: Reason::new(ReasonKind::SharedTag, tag.clone()),
                    weight: TAG_WEIGHT,
                });
            }
        }
    }
    out
}

/// Notes in the same directory, or in an ancestor/descendant directory.
#[must_use]
pub fn by_directory<'a>(snapshot: &'a VaultSnapshot, source: &Source<'a>) -> Vec<Candidate<'a>> {
    let current = source.record.directory.as_str();
    if current.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    for (target, record) in &snapshot.files {
        let other = record.directory.as_str();
        if other.is_empty() || !source.accepts(target, Some(record)) {
            continue;
        }
        let (kind, detail, weight) = if other == current {
            (ReasonKind::SameDirectory, current, SAME_DIRECTORY_WEIGHT)
        } else if is_ancestor_dir(current, other) || is_ancestor_dir(other, current) {
            (ReasonKind::RelatedDirectory, other, RELATED_DIRECTORY_WEIGHT)
        } else {
            continue;
        };
        out.push(Candidate {
            source: source.path,
            target,
            reason: Reason::new(kind, detail),
            weight,
        });
    }
    out
}

/// Whether `ancestor` contains `dir`, compared by path segment.
///
/// The vault root is not treated as an ancestor.
#[must_use]
pub fn is_ancestor_dir(ancestor: &str, dir: &str) -> bool {
    if ancestor.is_empty() || ancestor == ROOT_DIRECTORY {
        return false;
    }
    dir.strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Notes whose titles share at least two words.
#[must_use]
pub fn by_title<'a>(snapshot: &'a VaultSnapshot, source: &Source<'a>) -> Vec<Candidate<'a>> {
    let current = title_words(&source.record.title);
    if current.len() < MIN_COMMON_TITLE_WORDS {
        return Vec::new();
    }

    let mut out = Vec::new();
    for (target, record) in &snapshot.files {
        if !source.accepts(target, Some(record)) {
            continue;
        }
        let other = title_words(&record.title);
        let common: Vec<&String> = current.intersection(&other).collect();
        if common.len() < MIN_COMMON_TITLE_WORDS {
            continue;
        }
        let similarity = common.len() as f64 / current.len().max(other.len()) as f64;
        let detail = common
            .iter()
            .take(MAX_TITLE_WORDS_IN_REASON)
            .map(|w| w.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        out.push(Candidate {
            source: source.path,
            target,
            reason: Reason::new(ReasonKind::SimilarTitle, detail),
            weight: TITLE_WEIGHT * similarity,
        });
    }
    out
}

/// Lower-cased word set of a title.
#[must_use]
pub fn title_words(title: &str) -> BTreeSet<String> {
    TITLE_WORD_RE
        .find_iter(&title.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn note(path: &str, title: &str, dir: &str) -> NoteRecord {
        NoteRecord {
            path: path.to_string(),
            title: title.to_string(),
            directory: dir.to_string(),
            ..NoteRecord::default()
        }
    }

    fn snapshot(records: Vec<NoteRecord>) -> VaultSnapshot {
        let files: BTreeMap<_, _> = records.into_iter().map(|r| (r.path.clone(), r)).collect();
        VaultSnapshot::from_records(files)
    }

    #[test]
    fn ancestor_check_is_segment_aware() {
        assert!(is_ancestor_dir("projects", "projects/alpha"));
        assert!(is_ancestor_dir("a", "a/b/c"));
        assert!(!is_ancestor_dir("Projects-A", "Projects-B"));
        assert!(!is_ancestor_dir("proj", "projects"));
        assert!(!is_ancestor_dir(".", "projects"));
        assert!(!is_ancestor_dir("projects", "projects"));
    }

    #[test]
    fn existing_links_match_path_stem_or_title() {
        let mut source = note("a.md", "A", ".");
        source.existing_links = vec![
            "notes/b.md".into(),
            "C Note#Details".into(),
            "delta".into(),
        ];
        let src = Source::new("a.md", &source);

        assert!(!src.accepts("a.md", None));
        assert!(!src.accepts("notes/b.md", None));
        assert!(!src.accepts("other/c.md", Some(&note("other/c.md", "C Note", "other"))));
        assert!(!src.accepts("x/Delta.md", None));
        assert!(src.accepts("x/echo.md", Some(&note("x/echo.md", "Echo", "x"))));
    }

    #[test]
    fn directory_strategy_weights() {
        let snap = snapshot(vec![
            note("p/a.md", "A", "p"),
            note("p/b.md", "B", "p"),
            note("p/sub/c.md", "C", "p/sub"),
            note("q/d.md", "D", "q"),
        ]);
        let record = &snap.files["p/a.md"];
        let candidates = by_directory(&snap, &Source::new("p/a.md", record));
        let found: Vec<(&str, f64)> = candidates.iter().map(|c| (c.target, c.weight)).collect();
        assert_eq!(found, vec![("p/b.md", 0.2), ("p/sub/c.md", 0.1)]);
        assert_eq!(candidates[1].reason.kind, ReasonKind::RelatedDirectory);
    }

    #[test]
    fn title_strategy_needs_two_common_words() {
        let snap = snapshot(vec![
            note("a.md", "Rust Async Patterns", "."),
            note("b.md", "Async Patterns in Rust", "."),
            note("c.md", "Rust Basics", "."),
        ]);
        let record = &snap.files["a.md"];
        let candidates = by_title(&snap, &Source::new("a.md", record));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].target, "b.md");
        assert!((candidates[0].weight - 0.3 * 3.0 / 4.0).abs() < 1e-12);
        assert_eq!(candidates[0].reason.detail, "async, patterns, rust");
    }

    #[test]
    fn concept_and_tag_strategies_skip_self() {
        let mut a = note("a.md", "A", ".");
        a.concepts = vec!["Ownership".into()];
        a.tags = vec!["rust".into()];
        let mut b = note("b.md", "B", ".");
        b.concepts = vec!["ownership".into()];
        b.tags = vec!["rust".into()];
        let snap = snapshot(vec![a, b]);
        let source = Source::new("a.md", &snap.files["a.md"]);

        let concepts = by_concept(&snap, &source);
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].target, "b.md");
        assert_eq!(concepts[0].reason.detail, "Ownership");

        let tags = by_tag(&snap, &source);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].weight, TAG_WEIGHT);
    }
}
