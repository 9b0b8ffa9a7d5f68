//! Link rendering formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VlbError;

/// How an inserted link is written into a note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkFormat {
    /// `[Title](path/to/note.md)`
    #[default]
    Markdown,
    /// `[[Title]]`
    Wikilink,
}

impl LinkFormat {
    /// Render a link to `target_path` labelled with `target_title`.
    #[must_use]
    pub fn render(self, target_path: &str, target_title: &str) -> String {
        match self {
            LinkFormat::Markdown => format!("[{target_title}]({target_path})"),
            LinkFormat::Wikilink => format!("[[{target_title}]]"),
        }
    }
}

impl fmt::Display for LinkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkFormat::Markdown => f.write_str("markdown"),
            LinkFormat::Wikilink => f.write_str("wikilink"),
        }
    }
}

impl FromStr for LinkFormat {
    type Err = VlbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" => Ok(LinkFormat::Markdown),
            "wikilink" => Ok(LinkFormat::Wikilink),
            other => Err(VlbError::Config(format!(
                "unknown link format '{other}' (expected markdown or wikilink)"
            ))),
        }
    }
}
