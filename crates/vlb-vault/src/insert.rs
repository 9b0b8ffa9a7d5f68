//! Link insertion into note text.
//!
//! Pure functions: they take the current content and return new content.
//! The front-matter block is never searched or edited.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use vlb_core::frontmatter::body_offset;
use vlb_core::{LinkFormat, Suggestion};

/// Default heading of the section that collects links with no inline anchor.
pub const RELATED_NOTES_HEADING: &str = "## Related Notes";

/// Characters that end the word or phrase an inline link is attached to.
const PHRASE_TERMINATORS: &[char] = &[',', ';', '.', '!', '?', ')'];

static EXISTING_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[[^\]]*\]\]|\[[^\]]+\]\([^)]*\)").expect("valid link span regex")
});

static HEADING_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t].*$").expect("valid heading line regex"));

/// Where a link ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Right after a mention of one of the suggestion's anchors.
    Inline,
    /// As a list item under the related-notes heading.
    Section,
}

/// Whether `content` already links to the target, by title or by path.
///
/// Wikilinks match on the title (with or without an alias). Markdown links
/// match on the path, where each space may be any run of whitespace or none.
#[must_use]
pub fn link_exists(content: &str, target_path: &str, target_title: &str) -> bool {
    if !target_title.is_empty() {
        let pattern = format!(r"\[\[{}(?:\|[^\]]+)?\]\]", regex::escape(target_title));
        if Regex::new(&pattern).is_ok_and(|re| re.is_match(content)) {
            return true;
        }
    }

    let path_pattern = target_path
        .split(' ')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s*");
    let pattern = format!(r"\[[^\]]+\]\({path_pattern}\)");
    Regex::new(&pattern).is_ok_and(|re| re.is_match(content))
}

/// Byte offset for an inline link after the first mention of any anchor.
///
/// Anchors are tried in order; for each, the first case-insensitive match in
/// the body that is not inside an existing link or on a heading line wins. The offset is the end of
/// the enclosing word or phrase: the first whitespace or terminator character
/// at or after the end of the match, or the end of the text.
#[must_use]
pub fn find_anchor<I, S>(content: &str, anchors: I) -> Option<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let start = body_offset(content);
    let body = &content[start..];
    let excluded: Vec<Range<usize>> = EXISTING_LINK_RE
        .find_iter(body)
        .chain(HEADING_LINE_RE.find_iter(body))
        .map(|m| m.range())
        .collect();

    for anchor in anchors {
        let anchor = anchor.as_ref().trim();
        if anchor.is_empty() {
            continue;
        }
        let Ok(re) = Regex::new(&format!("(?i){}", regex::escape(anchor))) else {
            continue;
        };
        let hit = re
            .find_iter(body)
            .find(|m| !excluded.iter().any(|span| overlaps(span, &m.range())));
        if let Some(m) = hit {
            let end = start + m.end();
            let offset = content[end..]
                .find(|c: char| c.is_whitespace() || PHRASE_TERMINATORS.contains(&c))
                .map_or(content.len(), |i| end + i);
            return Some(offset);
        }
    }
    None
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

/// Insert ` link` at byte `offset`.
#[must_use]
pub fn insert_inline(content: &str, offset: usize, link: &str) -> String {
    let (before, after) = content.split_at(offset);
    format!("{before} {link}{after}")
}

/// Add `- link` under `heading`, creating the section at the end if needed.
///
/// An existing section gets the item after its last non-blank line. A new
/// section is separated from the preceding text by exactly one blank line.
#[must_use]
pub fn append_to_section(content: &str, heading: &str, link: &str) -> String {
    let heading = heading.trim();
    let item = format!("- {link}\n");

    let start = body_offset(content);
    let lines: Vec<(usize, &str)> = line_spans(content, start);

    let Some(heading_idx) = lines.iter().position(|(_, l)| l.trim_end() == heading) else {
        let text = content.trim_end();
        if text.is_empty() {
            return format!("{heading}\n\n{item}");
        }
        return format!("{text}\n\n{heading}\n\n{item}");
    };

    let level = heading_level(heading).unwrap_or(6);
    let section_end = lines[heading_idx + 1..]
        .iter()
        .position(|(_, l)| heading_level(l).is_some_and(|lvl| lvl <= level))
        .map_or(lines.len(), |i| heading_idx + 1 + i);

    let last_content = (heading_idx + 1..section_end)
        .rev()
        .find(|&i| !lines[i].1.trim().is_empty());

    match last_content {
        Some(i) => {
            let (offset, line) = lines[i];
            let insert_at = offset + line.len();
            let sep = if line.ends_with('\n') { "" } else { "\n" };
            format!("{}{sep}{item}{}", &content[..insert_at], &content[insert_at..])
        }
        None => {
            let (offset, line) = lines[heading_idx];
            let insert_at = offset + line.len();
            let sep = if line.ends_with('\n') { "\n" } else { "\n\n" };
            let rest = &content[insert_at..];
            let rest = if rest.trim().is_empty() { "" } else { rest };
            let tail = if rest.is_empty() || rest.starts_with('\n') {
                rest.to_string()
            } else {
                format!("\n{rest}")
            };
            format!("{}{sep}{item}{tail}", &content[..insert_at])
        }
    }
}

/// Lines of `content` from byte `start`, with their absolute offsets and terminators.
fn line_spans(content: &str, start: usize) -> Vec<(usize, &str)> {
    let mut offset = start;
    content[start..]
        .split_inclusive('\n')
        .map(|line| {
            let span = (offset, line);
            offset += line.len();
            span
        })
        .collect()
}

/// ATX heading level of a line, if it is a heading.
fn heading_level(line: &str) -> Option<usize> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    let rest = &line[hashes..];
    if (1..=6).contains(&hashes) && (rest.starts_with(' ') || rest.starts_with('\t')) {
        Some(hashes)
    } else {
        None
    }
}

/// Insert a link for `suggestion` unless one already exists.
///
/// Returns the new content and where the link went, or `None` when the
/// target is already linked.
#[must_use]
pub fn insert_link(
    content: &str,
    suggestion: &Suggestion,
    format: LinkFormat,
    heading: &str,
) -> Option<(String, Placement)> {
    if link_exists(content, &suggestion.target, &suggestion.target_title) {
        return None;
    }

    let link = format.render(&suggestion.target, &suggestion.target_title);
    match find_anchor(content, suggestion.anchors()) {
        Some(offset) => Some((insert_inline(content, offset, &link), Placement::Inline)),
        None => Some((append_to_section(content, heading, &link), Placement::Section)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vlb_core::{Confidence, Reason, ReasonKind, StrategyKind};

    fn suggestion(target: &str, title: &str, reasons: Vec<Reason>) -> Suggestion {
        Suggestion {
            target: target.to_string(),
            target_title: title.to_string(),
            score: 0.9,
            reasons,
            strategies: vec![StrategyKind::Concept],
            confidence: Confidence::High,
        }
    }

    #[test]
    fn wikilink_with_title_counts_as_existing() {
        let content = "Intro\nSee [[Target Title]] for more.\n";
        assert!(link_exists(content, "t.md", "Target Title"));
        assert!(link_exists("x [[Target Title|alias]] y", "t.md", "Target Title"));
        assert!(!link_exists("x [[Target]] y", "t.md", "Target Title"));
    }

    #[test]
    fn markdown_link_tolerates_whitespace_in_path() {
        let content = "see [Notes](my  notes/a b.md)";
        assert!(link_exists(content, "my notes/a b.md", "Other"));
        assert!(link_exists("see [N](mynotes/ab.md)", "my notes/a b.md", "Other"));
        assert!(!link_exists("see [N](other.md)", "my notes/a b.md", "Other"));
    }

    #[test]
    fn already_linked_suggestion_is_not_inserted() {
        let s = suggestion("t.md", "Target Title", vec![]);
        assert!(insert_link("[[Target Title]]\n", &s, LinkFormat::Wikilink, RELATED_NOTES_HEADING).is_none());
    }

    #[test]
    fn inline_insertion_goes_after_enclosing_word() {
        let content = "We discussed position sizing rules, then lunch.\n";
        let offset = find_anchor(content, ["Position Siz"]).unwrap();
        assert_eq!(
            insert_inline(content, offset, "[[Sizing]]"),
            "We discussed position sizing [[Sizing]] rules, then lunch.\n"
        );

        let offset = find_anchor(content, ["sizing rules"]).unwrap();
        assert_eq!(
            insert_inline(content, offset, "[[Rules]]"),
            "We discussed position sizing rules [[Rules]], then lunch.\n"
        );
    }

    #[test]
    fn anchor_at_end_of_text_appends() {
        let content = "ends with Rust";
        let offset = find_anchor(content, ["rust"]).unwrap();
        assert_eq!(offset, content.len());
    }

    #[test]
    fn anchors_skip_frontmatter_and_existing_links() {
        let content = "---\ntitle: Rust\n---\nSee [[Rust Basics]] and rust code.\n";
        let offset = find_anchor(content, ["rust"]).unwrap();
        assert_eq!(
            insert_inline(content, offset, "[[R]]"),
            "---\ntitle: Rust\n---\nSee [[Rust Basics]] and rust [[R]] code.\n"
        );
        assert_eq!(find_anchor("---\ntitle: Rust\n---\nnothing\n", ["rust"]), None);
    }

    #[test]
    fn anchors_never_land_in_headings() {
        let content = "# Risk Notes\n\n## Related Notes\n\n- [[A]]\n";
        assert_eq!(find_anchor(content, ["notes", "risk"]), None);

        let content = "# Risk\n\nManaging risk daily.\n";
        let offset = find_anchor(content, ["risk"]).unwrap();
        assert_eq!(&content[..offset], "# Risk\n\nManaging risk");
    }

    #[test]
    fn later_anchor_used_when_first_is_missing() {
        let content = "tagged #trading today\n";
        let offset = find_anchor(content, ["Missing Concept", "#trading"]).unwrap();
        assert_eq!(&content[..offset], "tagged #trading");
    }

    #[test]
    fn new_section_has_single_blank_line() {
        assert_eq!(
            append_to_section("Body text\n\n\n", RELATED_NOTES_HEADING, "[[A]]"),
            "Body text\n\n## Related Notes\n\n- [[A]]\n"
        );
        assert_eq!(
            append_to_section("Body text", RELATED_NOTES_HEADING, "[[A]]"),
            "Body text\n\n## Related Notes\n\n- [[A]]\n"
        );
        assert_eq!(
            append_to_section("", RELATED_NOTES_HEADING, "[[A]]"),
            "## Related Notes\n\n- [[A]]\n"
        );
    }

    #[test]
    fn existing_section_gets_additional_items() {
        let once = append_to_section("Body\n", RELATED_NOTES_HEADING, "[[A]]");
        let twice = append_to_section(&once, RELATED_NOTES_HEADING, "[[B]]");
        assert_eq!(twice, "Body\n\n## Related Notes\n\n- [[A]]\n- [[B]]\n");
        assert_eq!(twice.matches(RELATED_NOTES_HEADING).count(), 1);
    }

    #[test]
    fn section_followed_by_another_heading() {
        let content = "Body\n\n## Related Notes\n\n- [[A]]\n\n## Appendix\n\nmore\n";
        assert_eq!(
            append_to_section(content, RELATED_NOTES_HEADING, "[[B]]"),
            "Body\n\n## Related Notes\n\n- [[A]]\n- [[B]]\n\n## Appendix\n\nmore\n"
        );
    }

    #[test]
    fn empty_section_gets_blank_line_then_item() {
        assert_eq!(
            append_to_section("Body\n\n## Related Notes\n", RELATED_NOTES_HEADING, "[[A]]"),
            "Body\n\n## Related Notes\n\n- [[A]]\n"
        );
        assert_eq!(
            append_to_section("Body\n\n## Related Notes", RELATED_NOTES_HEADING, "[[A]]"),
            "Body\n\n## Related Notes\n\n- [[A]]\n"
        );
    }

    #[test]
    fn item_without_trailing_newline_is_terminated() {
        assert_eq!(
            append_to_section("## Related Notes\n\n- [[A]]", RELATED_NOTES_HEADING, "[[B]]"),
            "## Related Notes\n\n- [[A]]\n- [[B]]\n"
        );
    }

    #[test]
    fn insert_link_falls_back_to_section() {
        let s = suggestion(
            "notes/b.md",
            "B",
            vec![Reason::new(ReasonKind::SharedConcept, "Nowhere In Text")],
        );
        let (out, placement) =
            insert_link("Some body.\n", &s, LinkFormat::Markdown, RELATED_NOTES_HEADING).unwrap();
        assert_eq!(placement, Placement::Section);
        assert_eq!(out, "Some body.\n\n## Related Notes\n\n- [B](notes/b.md)\n");
    }

    #[test]
    fn insert_link_prefers_inline_anchor() {
        let s = suggestion(
            "notes/b.md",
            "B",
            vec![Reason::new(ReasonKind::SharedConcept, "borrow checker")],
        );
        let (out, placement) = insert_link(
            "The Borrow Checker rejects this.\n",
            &s,
            LinkFormat::Wikilink,
            RELATED_NOTES_HEADING,
        )
        .unwrap();
        assert_eq!(placement, Placement::Inline);
        assert_eq!(out, "The Borrow Checker [[B]] rejects this.\n");
    }
}
