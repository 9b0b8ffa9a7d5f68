//! Pure extraction functions over markdown text.
//!
//! Every function takes the note text (or its body) and returns owned,
//! structured results. Nothing here touches the file system.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use vlb_core::document::{path_stem, ROOT_DIRECTORY};
use vlb_core::frontmatter::FrontMatter;
use vlb_core::Heading;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6})[ \t]+(.+)$").expect("valid heading regex"));
static INLINE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([\w/-]+)").expect("valid tag regex"));
static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold regex"));
static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid code regex"));
static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid html regex"));
static WIKILINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\]|]+)(?:\|[^\]]+)?\]\]").expect("valid wikilink regex")
});
static MD_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+\.md)\)").expect("valid markdown link regex")
});

/// Inline-code spans with more words than this are not concepts.
const MAX_CODE_CONCEPT_WORDS: usize = 3;

/// Concepts shorter than this (in characters) are discarded.
const MIN_CONCEPT_CHARS: usize = 3;

/// Title precedence: front-matter `title`, first `# ` heading, file stem.
#[must_use]
pub fn extract_title(frontmatter: &FrontMatter, headings: &[Heading], path: &str) -> String {
    if let Some(title) = &frontmatter.title {
        return title.clone();
    }
    if let Some(h1) = headings.iter().find(|h| h.level == 1) {
        return h1.text.clone();
    }
    path_stem(path).to_string()
}

/// Union of front-matter tags and inline `#tag` tokens, sorted and deduplicated.
#[must_use]
pub fn extract_tags(frontmatter: &FrontMatter, body: &str) -> Vec<String> {
    let mut tags: BTreeSet<String> = frontmatter.tags.iter().cloned().collect();
    tags.extend(
        INLINE_TAG_RE
            .captures_iter(body)
            .map(|c| c[1].to_string()),
    );
    tags.into_iter().collect()
}

/// All ATX headings in document order.
#[must_use]
pub fn extract_headings(body: &str) -> Vec<Heading> {
    HEADING_RE
        .captures_iter(body)
        .filter_map(|c| {
            let text = c[2].trim();
            if text.is_empty() {
                return None;
            }
            Some(Heading {
                level: c[1].len() as u8,
                text: text.to_string(),
            })
        })
        .collect()
}

/// Key phrases: headings, bold spans and short inline-code spans.
#[must_use]
pub fn extract_concepts(body: &str, headings: &[Heading]) -> Vec<String> {
    let headings = headings.iter().map(|h| h.text.as_str());
    let bold = BOLD_RE.captures_iter(body).filter_map(|c| c.get(1)).map(|m| m.as_str());
    let code = CODE_RE
        .captures_iter(body)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|term| term.split_whitespace().count() <= MAX_CODE_CONCEPT_WORDS);

    headings
        .chain(bold)
        .chain(code)
        .map(clean_concept)
        .filter(|c| c.chars().count() >= MIN_CONCEPT_CHARS)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Strip HTML tags and collapse whitespace.
#[must_use]
pub fn clean_concept(raw: &str) -> String {
    let stripped = HTML_TAG_RE.replace_all(raw, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Wikilink targets and markdown links to `.md` files, sorted and deduplicated.
#[must_use]
pub fn extract_links(body: &str) -> Vec<String> {
    let wiki = WIKILINK_RE.captures_iter(body).map(|c| c[1].trim().to_string());
    let markdown = MD_LINK_RE.captures_iter(body).map(|c| c[2].trim().to_string());
    wiki.chain(markdown)
        .filter(|target| !target.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Whitespace-separated token count.
#[must_use]
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Parent directory of a `/`-separated vault path, [`ROOT_DIRECTORY`] at the root.
#[must_use]
pub fn parent_directory(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) if !dir.is_empty() => dir.to_string(),
        _ => ROOT_DIRECTORY.to_string(),
    }
}
