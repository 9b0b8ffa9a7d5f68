//! # vlb-parser
//!
//! Markdown metadata extraction for VLB.
//!
//! Turns the text of one note into a [`NoteRecord`]: title, tags, concepts,
//! existing links, headings, word count and directory. Extraction runs on the
//! note body; the front-matter only contributes `title` and `tags`.

pub mod extract;

use vlb_core::frontmatter::{parse_frontmatter, split_frontmatter};
use vlb_core::NoteRecord;

pub use extract::{
    clean_concept, extract_concepts, extract_headings, extract_links, extract_tags,
    extract_title, parent_directory, word_count,
};

/// Build the record for the note at vault-relative `path` with text `content`.
#[must_use]
pub fn parse_note(path: &str, content: &str) -> NoteRecord {
    let frontmatter = parse_frontmatter(content);
    let body = split_frontmatter(content).map_or(content, |(_, body)| body);
    let headings = extract_headings(body);

    NoteRecord {
        path: path.to_string(),
        title: extract_title(&frontmatter, &headings, path),
        tags: extract_tags(&frontmatter, body),
        concepts: extract_concepts(body, &headings),
        existing_links: extract_links(body),
        word_count: word_count(content),
        directory: parent_directory(path),
        headings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NOTE: &str = r#"---
title: "Futures Journal"
tags: [trading, "journal"]
---

# Daily log

Opened a position on **crude oil**, see [[Risk Management|risk]] and
[checklist](process/checklist.md). #trading #futures

## Lessons
"#;

    #[test]
    fn parses_a_complete_note() {
        let record = parse_note("trading/futures.md", NOTE);
        assert_eq!(record.path, "trading/futures.md");
        assert_eq!(record.title, "Futures Journal");
        assert_eq!(record.tags, vec!["futures", "journal", "trading"]);
        assert_eq!(record.concepts, vec!["Daily log", "Lessons", "crude oil"]);
        assert_eq!(
            record.existing_links,
            vec!["Risk Management", "process/checklist.md"]
        );
        assert_eq!(record.headings.len(), 2);
        assert_eq!(record.directory, "trading");
        assert!(record.word_count > 10);
    }

    #[test]
    fn frontmatter_is_not_scanned_for_inline_tags() {
        let content = "---\ncolor: \"#ff0000\"\n---\nbody #real\n";
        let record = parse_note("a.md", content);
        assert_eq!(record.tags, vec!["real"]);
    }

    #[test]
    fn falls_back_to_stem_without_title_sources() {
        let record = parse_note("Plain Note.md", "just words\n");
        assert_eq!(record.title, "Plain Note");
        assert_eq!(record.directory, ".");
        assert!(record.concepts.is_empty());
    }

    proptest! {
        #[test]
        fn records_are_normalized(content in "[a-zA-Z #*`\\[\\]|\\n<>]{0,200}") {
            let record = parse_note("n.md", &content);
            prop_assert!(record.concepts.iter().all(|c| c.chars().count() >= 3));
            prop_assert!(record.concepts.iter().all(|c| c.trim() == c && !c.contains("  ")));
            prop_assert!(record.tags.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(record.existing_links.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(!record.title.is_empty());
        }
    }
}
