//! Report types: per-skill verdicts with explainability and the run summary.
//!
//! Everything here is plain serializable data (no live resources) so a
//! renderer or dashboard can consume it directly.

use crate::model::{ClaimLevel, EvidenceItem, EvidenceSource, Mode, SkillCategory};
use crate::profile::ProfileSummary;
use serde::{Deserialize, Serialize};

/// Categorical verdict derived from credibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Authentic,
    PartiallySupported,
    LikelyInflated,
}

impl Band {
    /// Lowercase, human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Band::Authentic => "authentic",
            Band::PartiallySupported => "partially supported",
            Band::LikelyInflated => "likely inflated",
        }
    }
}

/// How much concrete evidence backs a skill, from one source or overall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvidenceStrength {
    Strong,
    Moderate,
    Weak,
    #[default]
    NoEvidence,
}

impl EvidenceStrength {
    pub const fn label(self) -> &'static str {
        match self {
            EvidenceStrength::Strong => "Strong Evidence",
            EvidenceStrength::Moderate => "Moderate Evidence",
            EvidenceStrength::Weak => "Weak Evidence",
            EvidenceStrength::NoEvidence => "No Evidence",
        }
    }
}

/// Points one source added to a skill, and the label they earn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceStrength {
    pub source: EvidenceSource,
    pub points: f32,
    pub strength: EvidenceStrength,
}

/// One evidence item and the points it added to its skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributingEvidence {
    pub item: EvidenceItem,
    pub contribution: f32,
}

/// Scored result for one claimed skill. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillScore {
    pub skill_ref: String,
    pub category: SkillCategory,
    pub claim_level: ClaimLevel,
    pub evidence_score: f32,
    /// Always > 0 (policy floor).
    pub expected_score: f32,
    /// In `[0, 1]`.
    pub credibility: f32,
    pub band: Band,
    #[serde(default)]
    pub overall_strength: EvidenceStrength,
    /// One entry per evidence source, in source declaration order.
    #[serde(default)]
    pub evidence_breakdown: Vec<SourceStrength>,
    /// Descending by contribution.
    #[serde(default)]
    pub contributing_evidence: Vec<ContributingEvidence>,
    /// Student mode only, and only below Authentic.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    /// Items scored after dedup.
    pub evidence_count: usize,
    #[serde(default)]
    pub duplicates_removed: usize,
}

/// Band counts and shares over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_skills: usize,
    pub authentic: usize,
    pub partially_supported: usize,
    pub likely_inflated: usize,
    /// Unweighted mean credibility, in `[0, 1]`.
    #[serde(default)]
    pub average_score: f32,
    /// Band shares in percent (0 to 100). All zero for an empty run.
    #[serde(default)]
    pub authentic_percentage: f32,
    #[serde(default)]
    pub partial_percentage: f32,
    #[serde(default)]
    pub inflated_percentage: f32,
}

impl ReportSummary {
    pub fn from_scores(scores: &[SkillScore]) -> Self {
        let mut acc = Self {
            total_skills: scores.len(),
            ..Self::default()
        };
        for s in scores {
            match s.band {
                Band::Authentic => acc.authentic += 1,
                Band::PartiallySupported => acc.partially_supported += 1,
                Band::LikelyInflated => acc.likely_inflated += 1,
            }
        }
        if scores.is_empty() {
            return acc;
        }

        let total = scores.len() as f32;
        let sum: f32 = scores.iter().map(|s| s.credibility).sum();
        let pct = |n: usize| n as f32 * 100.0 / total;
        acc.average_score = (sum / total).clamp(0.0, 1.0);
        acc.authentic_percentage = pct(acc.authentic);
        acc.partial_percentage = pct(acc.partially_supported);
        acc.inflated_percentage = pct(acc.likely_inflated);
        acc
    }
}

/// Input records that were dropped or partially ignored. Counts only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataIssues {
    /// Evidence referencing a skill nobody claimed.
    pub unmatched_evidence: usize,
    /// Repeated claims of the same canonical skill (later ones dropped).
    pub duplicate_claims: usize,
    /// Claims with unrecognized category or claim level.
    pub invalid_claims: usize,
    /// Evidence with an unrecognized source, or with no usable signal left.
    pub invalid_evidence: usize,
    /// Unrecognized signal tags ignored on otherwise valid evidence.
    pub unknown_signals: usize,
}

impl DataIssues {
    pub fn total(&self) -> usize {
        self.unmatched_evidence
            + self.duplicate_claims
            + self.invalid_claims
            + self.invalid_evidence
            + self.unknown_signals
    }

    /// Field-wise sum.
    pub fn merge(mut self, other: DataIssues) -> Self {
        self.unmatched_evidence += other.unmatched_evidence;
        self.duplicate_claims += other.duplicate_claims;
        self.invalid_claims += other.invalid_claims;
        self.invalid_evidence += other.invalid_evidence;
        self.unknown_signals += other.unknown_signals;
        self
    }
}

/// Outcome of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Expected-score-weighted mean of per-skill credibility, in `[0, 1]`.
    pub overall_credibility: f32,
    pub mode: Mode,
    /// Same order as the claimed skills.
    pub skill_scores: Vec<SkillScore>,
    pub summary: ReportSummary,
    pub data_issues: DataIssues,
    /// Present when the request carried a code-hosting profile snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_summary: Option<ProfileSummary>,
}
