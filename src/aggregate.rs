//! # Aggregator
//! Pure per-skill reduction of evidence into `(evidence_score, expected_score)`.
//!
//! 1. Dedup by (source, sorted signal set, canonical skill); first occurrence wins.
//! 2. Item contribution = max weight among its own signals × source multiplier.
//! 3. `evidence_score` = Σ contributions.
//! 4. `expected_score` = policy expectation for the claim level (floored).
//!
//! Empty evidence is a valid outcome (score 0), never an error.

use crate::model::{ClaimedSkill, EvidenceItem, EvidenceSource, SkillCategory, StrengthSignal};
use crate::policy::ScoringPolicy;
use crate::report::ContributingEvidence;
use crate::weights::WeightTable;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub evidence_score: f32,
    pub expected_score: f32,
    /// Deduplicated items with their contribution, in input order.
    pub contributions: Vec<ContributingEvidence>,
    pub duplicates_removed: usize,
}

impl Aggregation {
    pub fn credibility(&self) -> f32 {
        crate::classify::credibility(self.evidence_score, self.expected_score)
    }
}

/// Drop repeated evidence, keeping the first of each dedup key.
/// Returns (kept, removed_count).
pub fn dedup(items: &[EvidenceItem]) -> (Vec<&EvidenceItem>, usize) {
    let mut seen = HashSet::with_capacity(items.len());
    let mut kept = Vec::with_capacity(items.len());
    let mut removed = 0usize;
    for it in items {
        if seen.insert(it.dedup_key()) {
            kept.push(it);
        } else {
            removed += 1;
        }
    }
    (kept, removed)
}

/// Max-not-sum: an item restating one strength several ways counts once.
pub fn item_contribution(
    item: &EvidenceItem,
    category: SkillCategory,
    weights: &WeightTable,
) -> f32 {
    best_signal_weight(item.source, &item.strength_signals, category, weights)
        * weights.multiplier(item.source)
}

fn best_signal_weight<'a>(
    source: EvidenceSource,
    signals: impl IntoIterator<Item = &'a StrengthSignal>,
    category: SkillCategory,
    weights: &WeightTable,
) -> f32 {
    signals
        .into_iter()
        .map(|sig| weights.weight(source, *sig, category))
        .fold(0.0, f32::max)
}

/// Score one skill from its own evidence partition.
pub fn aggregate(
    skill: &ClaimedSkill,
    items: &[EvidenceItem],
    weights: &WeightTable,
    policy: &ScoringPolicy,
) -> Aggregation {
    let (kept, duplicates_removed) = dedup(items);

    let contributions: Vec<ContributingEvidence> = kept
        .into_iter()
        .map(|item| ContributingEvidence {
            contribution: item_contribution(item, skill.category, weights),
            item: item.clone(),
        })
        .collect();

    let evidence_score = contributions.iter().map(|c| c.contribution).sum::<f32>();

    Aggregation {
        evidence_score,
        expected_score: policy.expected_score(skill.claim_level),
        contributions,
        duplicates_removed,
    }
}
