//! Normalizer & classifier: evidence/expected ratio → bounded credibility → band.
//!
//! Both functions are pure and total. Thresholds are passed at call time so
//! threshold variants can be exercised side by side without shared state.

use crate::report::{Band, EvidenceStrength};
use serde::{Deserialize, Serialize};

pub const DEFAULT_AUTHENTIC: f32 = 0.75;
pub const DEFAULT_PARTIALLY_SUPPORTED: f32 = 0.40;

/// Lower bounds (inclusive) of the two upper bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandThresholds {
    pub authentic: f32,
    pub partially_supported: f32,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            authentic: DEFAULT_AUTHENTIC,
            partially_supported: DEFAULT_PARTIALLY_SUPPORTED,
        }
    }
}

fn default_source_strong() -> f32 {
    30.0
}
fn default_source_moderate() -> f32 {
    15.0
}
fn default_overall_strong() -> f32 {
    70.0
}
fn default_overall_moderate() -> f32 {
    35.0
}

/// Point bounds (inclusive) for the evidence strength labels, per source and
/// summed over all sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrengthThresholds {
    #[serde(default = "default_source_strong")]
    pub source_strong: f32,
    #[serde(default = "default_source_moderate")]
    pub source_moderate: f32,
    #[serde(default = "default_overall_strong")]
    pub overall_strong: f32,
    #[serde(default = "default_overall_moderate")]
    pub overall_moderate: f32,
}

impl Default for StrengthThresholds {
    fn default() -> Self {
        Self {
            source_strong: default_source_strong(),
            source_moderate: default_source_moderate(),
            overall_strong: default_overall_strong(),
            overall_moderate: default_overall_moderate(),
        }
    }
}

impl StrengthThresholds {
    /// Label for the points one source contributed.
    pub fn for_source(&self, points: f32) -> EvidenceStrength {
        evidence_strength(points, self.source_strong, self.source_moderate)
    }

    /// Label for a skill's whole evidence score.
    pub fn overall(&self, points: f32) -> EvidenceStrength {
        evidence_strength(points, self.overall_strong, self.overall_moderate)
    }
}

/// Anything above zero is at least Weak; zero or NaN is NoEvidence.
pub fn evidence_strength(points: f32, strong: f32, moderate: f32) -> EvidenceStrength {
    if points >= strong {
        EvidenceStrength::Strong
    } else if points >= moderate {
        EvidenceStrength::Moderate
    } else if points > 0.0 {
        EvidenceStrength::Weak
    } else {
        EvidenceStrength::NoEvidence
    }
}

/// `min(1, evidence / expected)`. Non-finite or negative input maps to 0.
pub fn credibility(evidence_score: f32, expected_score: f32) -> f32 {
    if !(expected_score.is_finite() && expected_score > 0.0) {
        return 0.0;
    }
    let ratio = evidence_score / expected_score;
    if ratio.is_nan() || ratio <= 0.0 {
        0.0
    } else {
        ratio.min(1.0)
    }
}

/// Closed at the low end: `c >= authentic` is Authentic,
/// `partially_supported <= c < authentic` is PartiallySupported.
pub fn classify(credibility: f32, thresholds: &BandThresholds) -> Band {
    if credibility >= thresholds.authentic {
        Band::Authentic
    } else if credibility >= thresholds.partially_supported {
        Band::PartiallySupported
    } else {
        // NaN lands here as well.
        Band::LikelyInflated
    }
}
