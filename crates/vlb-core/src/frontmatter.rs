//! YAML front-matter detection and parsing.
//!
//! Handles the `---` delimited block at the very top of a markdown file.
//! Format:
//! ```markdown
//! ---
//! title: "Trading Journal"
//! tags: [trading, journal]
//! ---
//!
//! # Body content here
//! ```
//!
//! Only the fields the analyzer needs are read. Malformed YAML falls back to a
//! line-oriented reader so a stray colon never hides a note's title.

use std::ops::Range;

use serde_yaml::Value;

/// The fields of a front-matter block the analyzer cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub tags: Vec<String>,
}

/// Split a markdown file into its front-matter YAML and body.
///
/// Returns `None` when the file does not open with a closed `---` block.
#[must_use]
pub fn split_frontmatter(content: &str) -> Option<(&str, &str)> {
    let (yaml, body_start) = locate(content)?;
    Some((&content[yaml], &content[body_start..]))
}

/// Byte offset at which the body starts (0 when there is no front-matter).
#[must_use]
pub fn body_offset(content: &str) -> usize {
    locate(content).map_or(0, |(_, body_start)| body_start)
}

/// Parse the front-matter of `content`, if any.
#[must_use]
pub fn parse_frontmatter(content: &str) -> FrontMatter {
    match split_frontmatter(content) {
        Some((yaml, _)) => parse_yaml_fields(yaml),
        None => FrontMatter::default(),
    }
}

fn locate(content: &str) -> Option<(Range<usize>, usize)> {
    let rest = content.strip_prefix("---")?;
    let line_end = rest.find('\n')?;
    if !rest[..line_end].trim().is_empty() {
        return None;
    }

    let yaml_start = 3 + line_end + 1;
    let after_open = &content[yaml_start..];
    let (yaml_end, close_end) = if after_open.starts_with("---") {
        (yaml_start, yaml_start + 3)
    } else {
        let pos = after_open.find("\n---")?;
        (yaml_start + pos, yaml_start + pos + 4)
    };

    // Skip the remainder of the closing delimiter line.
    let body_start = match content[close_end..].find('\n') {
        Some(nl) => close_end + nl + 1,
        None => content.len(),
    };

    Some((yaml_start..yaml_end, body_start))
}

fn parse_yaml_fields(yaml: &str) -> FrontMatter {
    match serde_yaml::from_str::<Value>(yaml) {
        Ok(Value::Mapping(map)) => FrontMatter {
            title: map
                .get("title")
                .and_then(scalar_to_string)
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            tags: map.get("tags").map(tags_from_value).unwrap_or_default(),
        },
        Ok(Value::Null) => FrontMatter::default(),
        _ => parse_lines(yaml),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn tags_from_value(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items
            .iter()
            .filter_map(scalar_to_string)
            .map(|t| clean_tag(&t))
            .filter(|t| !t.is_empty())
            .collect(),
        Value::String(s) => parse_inline_list(s),
        _ => Vec::new(),
    }
}

/// Line-oriented fallback for blocks serde_yaml rejects.
fn parse_lines(yaml: &str) -> FrontMatter {
    let mut fm = FrontMatter::default();
    for line in yaml.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "title" if fm.title.is_none() => {
                let title = unquote(value.trim());
                if !title.is_empty() {
                    fm.title = Some(title);
                }
            }
            "tags" => {
                let value = value.trim();
                if value.starts_with('[') {
                    fm.tags = parse_inline_list(value);
                }
            }
            _ => {}
        }
    }
    fm
}

/// Parse `[a, "b", 'c']` or `a, b` into cleaned entries.
fn parse_inline_list(value: &str) -> Vec<String> {
    let inner = value.trim();
    let inner = inner.strip_prefix('[').unwrap_or(inner);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    inner
        .split(',')
        .map(clean_tag)
        .filter(|t| !t.is_empty())
        .collect()
}

fn clean_tag(raw: &str) -> String {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_string()
}

fn unquote(s: &str) -> String {
    s.trim_matches(|c| c == '"' || c == '\'').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_frontmatter_extracts_yaml_and_body() {
        let content = "---\ntitle: Test\ntags: [a]\n---\n\n## Hello\n";
        let (yaml, body) = split_frontmatter(content).unwrap();
        assert_eq!(yaml, "title: Test\ntags: [a]");
        assert_eq!(body, "\n## Hello\n");
        assert_eq!(&content[body_offset(content)..], body);
    }

    #[test]
    fn split_frontmatter_requires_opener_at_start() {
        assert!(split_frontmatter("# Title\n---\ntitle: x\n---\n").is_none());
        assert!(split_frontmatter("  ---\ntitle: x\n---\n").is_none());
        assert_eq!(body_offset("# Title\n"), 0);
    }

    #[test]
    fn split_frontmatter_rejects_missing_closer() {
        assert!(split_frontmatter("---\ntitle: x\nbody\n").is_none());
    }

    #[test]
    fn empty_block_is_accepted() {
        let (yaml, body) = split_frontmatter("---\n---\nbody").unwrap();
        assert_eq!(yaml, "");
        assert_eq!(body, "body");
        assert_eq!(parse_frontmatter("---\n---\nbody"), FrontMatter::default());
    }

    #[test]
    fn parses_title_and_inline_tag_list() {
        let fm = parse_frontmatter("---\ntitle: \"Alpha Note\"\ntags: [\"rust\", 'cli', plain]\n---\n");
        assert_eq!(fm.title.as_deref(), Some("Alpha Note"));
        assert_eq!(fm.tags, vec!["rust", "cli", "plain"]);
    }

    #[test]
    fn parses_block_tag_list() {
        let fm = parse_frontmatter("---\ntags:\n  - one\n  - two\n---\n");
        assert_eq!(fm.title, None);
        assert_eq!(fm.tags, vec!["one", "two"]);
    }

    #[test]
    fn empty_tag_list_yields_no_tags() {
        let fm = parse_frontmatter("---\ntags: []\n---\n");
        assert!(fm.tags.is_empty());
    }

    #[test]
    fn malformed_yaml_falls_back_to_line_reader() {
        let content = "---\ntitle: Notes: part 2\ntags: [x, y]\n  bad: : indent\n---\n";
        let fm = parse_frontmatter(content);
        assert_eq!(fm.title.as_deref(), Some("Notes: part 2"));
        assert_eq!(fm.tags, vec!["x", "y"]);
    }

    #[test]
    fn numeric_title_is_stringified() {
        let fm = parse_frontmatter("---\ntitle: 2024\n---\n");
        assert_eq!(fm.title.as_deref(), Some("2024"));
    }
}
