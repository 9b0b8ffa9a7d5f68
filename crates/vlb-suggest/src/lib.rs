//! # vlb-suggest
//!
//! Link suggestion engine for VLB. Reads a [`VaultSnapshot`] and proposes,
//! for every note, other notes it should link to.
//!
//! Includes:
//! - four independent candidate strategies (concept, tag, directory, title)
//! - candidate merging, score capping and confidence labelling
//! - strategy-profile filtering
//! - review formatting (JSON, Table, Markdown)

pub mod formatter;
pub mod scoring;
pub mod strategies;

use tracing::{debug, info};
use vlb_core::{Result, StrategyProfile, Suggestion, SuggestionMap, VaultSnapshot};

use crate::strategies::{Candidate, Source};

/// Generates link suggestions over a validated snapshot.
pub struct Suggester<'a> {
    snapshot: &'a VaultSnapshot,
    profile: StrategyProfile,
}

impl<'a> Suggester<'a> {
    /// Create a suggester for `snapshot` using `profile` thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`vlb_core::VlbError::Snapshot`] if an index references a
    /// document that is not in the snapshot.
    pub fn new(snapshot: &'a VaultSnapshot, profile: StrategyProfile) -> Result<Self> {
        snapshot.validate()?;
        Ok(Self { snapshot, profile })
    }

    /// Suggestions for every note that has at least one surviving suggestion.
    #[must_use]
    pub fn suggest_all(&self) -> SuggestionMap {
        let mut out = SuggestionMap::new();
        for path in self.snapshot.files.keys() {
            let suggestions = self.suggest_for(path);
            if !suggestions.is_empty() {
                debug!(source = %path, count = suggestions.len(), "suggestions generated");
                out.insert(path.clone(), suggestions);
            }
        }
        info!(
            files = out.len(),
            total = out.values().map(Vec::len).sum::<usize>(),
            min_score = self.profile.min_score,
            max_links = self.profile.max_links,
            "suggestion pass complete"
        );
        out
    }

    /// Ranked and filtered suggestions for one note (empty if unknown).
    #[must_use]
    pub fn suggest_for(&self, path: &str) -> Vec<Suggestion> {
        let ranked = scoring::rank(self.snapshot, self.candidates_for(path));
        scoring::apply_profile(ranked, &self.profile)
    }

    /// Every raw candidate for one note, in strategy order.
    #[must_use]
    pub fn candidates_for(&self, path: &str) -> Vec<Candidate<'a>> {
        let Some((path, record)) = self.snapshot.files.get_key_value(path) else {
            return Vec::new();
        };
        let source = Source::new(path, record);

        let mut candidates = strategies::by_concept(self.snapshot, &source);
        candidates.extend(strategies::by_tag(self.snapshot, &source));
        candidates.extend(strategies::by_directory(self.snapshot, &source));
        candidates.extend(strategies::by_title(self.snapshot, &source));
        candidates
    }
}

/// Number of suggestions across all sources.
#[must_use]
pub fn total_suggestions(map: &SuggestionMap) -> usize {
    map.values().map(Vec::len).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use proptest::prelude::*;
    use vlb_core::{Confidence, StrategyKind, StrategyName};
    use vlb_parser::parse_note;

    fn vault(notes: &[(&str, &str)]) -> VaultSnapshot {
        let files: BTreeMap<_, _> = notes
            .iter()
            .map(|(path, content)| (path.to_string(), parse_note(path, content)))
            .collect();
        VaultSnapshot::from_records(files)
    }

    fn aggressive() -> StrategyProfile {
        StrategyName::Aggressive.profile()
    }

    #[test]
    fn shared_tag_only_gives_low_point_three() {
        let snapshot = vault(&[
            ("alpha/one.md", "Bought gold #trading\n"),
            ("beta/two.md", "Sold oil #trading\n"),
        ]);
        let suggester = Suggester::new(&snapshot, aggressive()).unwrap();
        let map = suggester.suggest_all();

        for (source, target) in [("alpha/one.md", "beta/two.md"), ("beta/two.md", "alpha/one.md")] {
            let list = &map[source];
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].target, target);
            assert_eq!(list[0].score, 0.3);
            assert_eq!(list[0].strategies, vec![StrategyKind::Tag]);
            assert_eq!(list[0].confidence, Confidence::Low);
        }
    }

    #[test]
    fn directory_only_scores() {
        let snapshot = vault(&[
            ("p/a.md", "alpha\n"),
            ("p/b.md", "beta\n"),
            ("p/sub/c.md", "gamma\n"),
        ]);
        let suggester = Suggester::new(&snapshot, StrategyProfile::new(0.0, 20)).unwrap();

        let for_a = suggester.suggest_for("p/a.md");
        let scores: Vec<(&str, f64)> =
            for_a.iter().map(|s| (s.target.as_str(), s.score)).collect();
        assert_eq!(scores, vec![("p/b.md", 0.2), ("p/sub/c.md", 0.1)]);
    }

    #[test]
    fn concept_tag_directory_reaches_point_nine_high() {
        let snapshot = vault(&[
            ("j/a.md", "## Position Sizing\n#risk\n"),
            ("j/b.md", "**position sizing** matters #risk\n"),
        ]);
        let suggester = Suggester::new(&snapshot, aggressive()).unwrap();
        let list = suggester.suggest_for("j/a.md");
        assert_eq!(list[0].score, 0.9);
        assert_eq!(list[0].confidence, Confidence::High);
    }

    #[test]
    fn already_linked_targets_are_never_proposed() {
        let snapshot = vault(&[
            ("a.md", "# Alpha\nSee [[Beta Note]] #x\n"),
            ("b.md", "# Beta Note\n#x\n"),
            ("c.md", "# Gamma\n#x\n"),
        ]);
        let suggester = Suggester::new(&snapshot, aggressive()).unwrap();
        let targets: Vec<String> = suggester
            .suggest_for("a.md")
            .into_iter()
            .map(|s| s.target)
            .collect();
        assert_eq!(targets, vec!["c.md"]);
    }

    #[test]
    fn balanced_profile_drops_weak_suggestions() {
        let snapshot = vault(&[("a/a.md", "#x\n"), ("b/b.md", "#x\n")]);
        let suggester = Suggester::new(&snapshot, StrategyName::Balanced.profile()).unwrap();
        assert!(suggester.suggest_all().is_empty());
    }

    #[test]
    fn invalid_snapshot_is_rejected() {
        let mut snapshot = vault(&[("a.md", "#x\n")]);
        snapshot
            .concept_index
            .insert("ghost".into(), ["missing.md".to_string()].into_iter().collect());
        assert!(Suggester::new(&snapshot, aggressive()).is_err());
    }

    #[test]
    fn unknown_source_yields_nothing() {
        let snapshot = vault(&[("a.md", "#x\n")]);
        let suggester = Suggester::new(&snapshot, aggressive()).unwrap();
        assert!(suggester.suggest_for("nope.md").is_empty());
    }

    proptest! {
        #[test]
        fn scores_stay_in_unit_range(
            tags in proptest::collection::vec(proptest::collection::vec("[a-c]", 0..3), 2..6),
            dirs in proptest::collection::vec("[pq](/[rs])?", 6),
        ) {
            let notes: Vec<(String, String)> = tags
                .iter()
                .enumerate()
                .map(|(i, tags)| {
                    let content = tags.iter().map(|t| format!("#{t} **{t}{t}{t}**")).collect::<Vec<_>>().join("\n");
                    (format!("{}/n{i}.md", dirs[i]), format!("# Note {i} shared words\n{content}\n"))
                })
                .collect();
            let refs: Vec<(&str, &str)> = notes.iter().map(|(p, c)| (p.as_str(), c.as_str())).collect();
            let snapshot = vault(&refs);
            let suggester = Suggester::new(&snapshot, StrategyProfile::new(0.0, 100)).unwrap();
            for (source, list) in suggester.suggest_all() {
                for s in &list {
                    prop_assert!(s.score >= 0.0 && s.score <= 1.0);
                    prop_assert!(s.target != source);
                    prop_assert_eq!(s.confidence, Confidence::classify(s.score, s.strategies.len()));
                }
                prop_assert!(list.windows(2).all(|w| w[0].score >= w[1].score));
            }
        }
    }
}
