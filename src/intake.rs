//! Intake: string-typed records from upstream extractors → typed model.
//!
//! Malformed records are [`DataError`]s: dropped (or, for a single unknown
//! signal, ignored), counted in [`DataIssues`], and logged. Intake never fails.

use crate::error::DataError;
use crate::model::{ClaimLevel, ClaimedSkill, EvidenceItem, EvidenceSource, Mode, SkillCategory, StrengthSignal};
use crate::profile::ProfileSnapshot;
use crate::report::DataIssues;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// Claimed skill as extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimInput {
    pub name: String,
    pub category: String,
    #[serde(alias = "level")]
    pub claim_level: String,
}

/// Evidence record as extracted from a document section or profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceInput {
    #[serde(alias = "skill")]
    pub skill_ref: String,
    pub source: String,
    #[serde(default, alias = "signals")]
    pub strength_signals: Vec<String>,
    #[serde(default)]
    pub raw_excerpt: String,
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub claimed_skills: Vec<ClaimInput>,
    #[serde(default)]
    pub evidence: Vec<EvidenceInput>,
    #[serde(default)]
    pub mode: Mode,
    /// Pre-fetched external profile; turned into ExternalProfile evidence.
    #[serde(default)]
    pub profile: Option<ProfileSnapshot>,
}

/// Typed claims after vocabulary normalization and claim dedup.
#[derive(Debug, Clone, Default)]
pub struct NormalizedClaims {
    pub claims: Vec<ClaimedSkill>,
    pub issues: DataIssues,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedEvidence {
    pub items: Vec<EvidenceItem>,
    pub issues: DataIssues,
}

impl TryFrom<&ClaimInput> for ClaimedSkill {
    type Error = DataError;

    fn try_from(input: &ClaimInput) -> Result<Self, Self::Error> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DataError::EmptySkillName);
        }
        Ok(ClaimedSkill::new(
            name,
            input.category.parse::<SkillCategory>()?,
            input.claim_level.parse::<ClaimLevel>()?,
        ))
    }
}

/// Parse claims; drop unrecognized ones and later duplicates of a canonical name.
pub fn normalize_claims(inputs: &[ClaimInput]) -> NormalizedClaims {
    let mut out = NormalizedClaims::default();
    for input in inputs {
        match ClaimedSkill::try_from(input) {
            Ok(skill) => out.claims.push(skill),
            Err(err) => {
                warn!(error = %err, "dropping claimed skill");
                out.issues.invalid_claims += 1;
            }
        }
    }
    let (claims, dups) = dedup_claims(out.claims);
    out.claims = claims;
    out.issues.duplicate_claims += dups;
    out
}

/// Keep the first claim of each canonical skill name.
pub fn dedup_claims(claims: Vec<ClaimedSkill>) -> (Vec<ClaimedSkill>, usize) {
    let mut seen = HashSet::with_capacity(claims.len());
    let mut kept = Vec::with_capacity(claims.len());
    let mut dropped = 0usize;
    for c in claims {
        if seen.insert(c.key()) {
            kept.push(c);
        } else {
            warn!(error = %DataError::DuplicateClaim(c.name.clone()), "dropping claimed skill");
            dropped += 1;
        }
    }
    (kept, dropped)
}

/// Parse evidence records. Unknown signals are ignored (counted); an item
/// whose every signal is unknown, or whose source is unknown, is dropped.
pub fn normalize_evidence(inputs: &[EvidenceInput]) -> NormalizedEvidence {
    let mut out = NormalizedEvidence::default();
    for input in inputs {
        let source = match input.source.parse::<EvidenceSource>() {
            Ok(s) => s,
            Err(err) => {
                warn!(error = %err, skill = %input.skill_ref, "dropping evidence item");
                out.issues.invalid_evidence += 1;
                continue;
            }
        };

        let mut signals = BTreeSet::new();
        let mut unknown = 0usize;
        for raw in &input.strength_signals {
            match raw.parse::<StrengthSignal>() {
                Ok(sig) => {
                    signals.insert(sig);
                }
                Err(err) => {
                    debug!(error = %err, skill = %input.skill_ref, "ignoring strength signal");
                    unknown += 1;
                }
            }
        }
        out.issues.unknown_signals += unknown;

        if signals.is_empty() && unknown > 0 {
            warn!(skill = %input.skill_ref, "dropping evidence item with no recognized signal");
            out.issues.invalid_evidence += 1;
            continue;
        }

        out.items.push(EvidenceItem {
            skill_ref: input.skill_ref.trim().to_string(),
            source,
            strength_signals: signals,
            raw_excerpt: input.raw_excerpt.clone(),
        });
    }
    out
}
