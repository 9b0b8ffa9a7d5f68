//! Merging candidates into ranked suggestions.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use vlb_core::document::path_stem;
use vlb_core::{Confidence, Reason, StrategyKind, StrategyProfile, Suggestion, VaultSnapshot};

use crate::strategies::Candidate;

/// Scores are reported with this many decimal places.
const SCORE_SCALE: f64 = 1_000_000.0;

#[derive(Default)]
struct Accumulator {
    weight: f64,
    reasons: Vec<Reason>,
    strategies: BTreeSet<StrategyKind>,
}

/// Sum candidate weights per target and rank the results.
///
/// Weights accumulate across strategies, the score is capped at 1.0, and ties
/// are broken by target path.
#[must_use]
pub fn rank(snapshot: &VaultSnapshot, candidates: Vec<Candidate<'_>>) -> Vec<Suggestion> {
    let mut by_target: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for candidate in candidates {
        trace!(
            source = candidate.source,
            target = candidate.target,
            reason = %candidate.reason,
            weight = candidate.weight,
            "candidate"
        );
        let acc = by_target.entry(candidate.target).or_default();
        acc.weight += candidate.weight;
        acc.strategies.insert(candidate.reason.kind.strategy());
        acc.reasons.push(candidate.reason);
    }

    let mut ranked: Vec<Suggestion> = by_target
        .into_iter()
        .map(|(target, acc)| {
            let score = normalize_score(acc.weight);
            Suggestion {
                target: target.to_string(),
                target_title: target_title(snapshot, target),
                score,
                reasons: acc.reasons,
                confidence: Confidence::classify(score, acc.strategies.len()),
                strategies: acc.strategies.into_iter().collect(),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.target.cmp(&b.target))
    });
    ranked
}

/// Keep suggestions at or above the profile's floor, at most `max_links` of them.
#[must_use]
pub fn apply_profile(ranked: Vec<Suggestion>, profile: &StrategyProfile) -> Vec<Suggestion> {
    ranked
        .into_iter()
        .filter(|s| s.score >= profile.min_score)
        .take(profile.max_links)
        .collect()
}

/// Cap at 1.0 and round away floating-point noise from summing weights.
#[must_use]
pub fn normalize_score(weight: f64) -> f64 {
    (weight.clamp(0.0, 1.0) * SCORE_SCALE).round() / SCORE_SCALE
}

fn target_title(snapshot: &VaultSnapshot, target: &str) -> String {
    snapshot
        .files
        .get(target)
        .map(|r| r.title.trim())
        .filter(|t| !t.is_empty())
        .map_or_else(|| path_stem(target).to_string(), str::to_string)
}
