//! Suggestion types shared by the suggester and the applier.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::ROOT_DIRECTORY;
use crate::error::VlbError;

/// Suggestions per source document, keyed by vault-relative path.
pub type SuggestionMap = BTreeMap<String, Vec<Suggestion>>;

/// The matching strategy that produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Concept,
    Tag,
    Directory,
    Title,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Concept => f.write_str("concept"),
            StrategyKind::Tag => f.write_str("tag"),
            StrategyKind::Directory => f.write_str("directory"),
            StrategyKind::Title => f.write_str("title"),
        }
    }
}

/// What a reason says about the pair of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    SharedConcept,
    SharedTag,
    SameDirectory,
    RelatedDirectory,
    SimilarTitle,
}

impl ReasonKind {
    #[must_use]
    pub fn strategy(self) -> StrategyKind {
        match self {
            ReasonKind::SharedConcept => StrategyKind::Concept,
            ReasonKind::SharedTag => StrategyKind::Tag,
            ReasonKind::SameDirectory | ReasonKind::RelatedDirectory => StrategyKind::Directory,
            ReasonKind::SimilarTitle => StrategyKind::Title,
        }
    }
}

/// A structured `(kind, detail)` explanation attached to a suggestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub kind: ReasonKind,
    pub detail: String,
}

impl Reason {
    #[must_use]
    pub fn new(kind: ReasonKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Phrase the applier looks for in the source note to place the link inline.
    #[must_use]
    pub fn anchor(&self) -> Option<String> {
        let detail = self.detail.trim();
        if detail.is_empty() {
            return None;
        }
        match self.kind {
            ReasonKind::SharedConcept => Some(detail.to_string()),
            ReasonKind::SharedTag => Some(format!("#{detail}")),
            ReasonKind::SameDirectory if detail != ROOT_DIRECTORY => Some(detail.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ReasonKind::SharedConcept => write!(f, "shared concept: {}", self.detail),
            ReasonKind::SharedTag => write!(f, "shared tag: #{}", self.detail),
            ReasonKind::SameDirectory => write!(f, "same directory: {}", self.detail),
            ReasonKind::RelatedDirectory => write!(f, "related directory ({})", self.detail),
            ReasonKind::SimilarTitle => write!(f, "similar title ({})", self.detail),
        }
    }
}

/// Coarse trust label derived from score and strategy count.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Derive confidence from a score and the number of distinct strategies behind it.
    #[must_use]
    pub fn classify(score: f64, strategy_count: usize) -> Self {
        if score >= 0.7 && strategy_count >= 3 {
            Confidence::High
        } else if score >= 0.5 && strategy_count >= 2 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => f.write_str("low"),
            Confidence::Medium => f.write_str("medium"),
            Confidence::High => f.write_str("high"),
        }
    }
}

impl FromStr for Confidence {
    type Err = VlbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            other => Err(VlbError::Config(format!(
                "unknown confidence '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

/// A ranked link proposal from one source document to `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub target: String,
    pub target_title: String,
    pub score: f64,
    pub reasons: Vec<Reason>,
    /// Sorted, deduplicated.
    pub strategies: Vec<StrategyKind>,
    pub confidence: Confidence,
}

impl Suggestion {
    /// Anchors of all reasons, in reason order.
    pub fn anchors(&self) -> impl Iterator<Item = String> + '_ {
        self.reasons.iter().filter_map(Reason::anchor)
    }
}

/// Named strategy profile selecting how eager the suggester is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyName {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

impl StrategyName {
    pub const ALL: [StrategyName; 3] = [
        StrategyName::Conservative,
        StrategyName::Balanced,
        StrategyName::Aggressive,
    ];

    /// Built-in thresholds for this profile.
    #[must_use]
    pub fn profile(self) -> StrategyProfile {
        match self {
            StrategyName::Conservative => StrategyProfile::new(0.7, 5),
            StrategyName::Balanced => StrategyProfile::new(0.5, 10),
            StrategyName::Aggressive => StrategyProfile::new(0.3, 20),
        }
    }
}

impl fmt::Display for StrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyName::Conservative => f.write_str("conservative"),
            StrategyName::Balanced => f.write_str("balanced"),
            StrategyName::Aggressive => f.write_str("aggressive"),
        }
    }
}

impl FromStr for StrategyName {
    type Err = VlbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StrategyName::ALL
            .into_iter()
            .find(|name| name.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                VlbError::Config(format!(
                    "unknown strategy '{s}' (expected conservative, balanced or aggressive)"
                ))
            })
    }
}

/// Score floor and per-document cap applied after ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyProfile {
    pub min_score: f64,
    pub max_links: usize,
}

impl StrategyProfile {
    #[must_use]
    pub fn new(min_score: f64, max_links: usize) -> Self {
        Self {
            min_score,
            max_links,
        }
    }
}
