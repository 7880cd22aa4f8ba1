//! Error taxonomy of the scoring engine.
//!
//! Two categories only: [`DataError`] is recovered locally (the offending
//! record is dropped and counted), [`ConfigError`] is fatal at startup.

use crate::model::{ClaimLevel, EvidenceSource};
use std::path::PathBuf;

/// Malformed input record. Never aborts a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataError {
    #[error("evidence references unclaimed skill `{0}`")]
    UnknownSkill(String),
    #[error("claimed skill has an empty name")]
    EmptySkillName,
    #[error("skill `{0}` is claimed more than once")]
    DuplicateClaim(String),
    #[error("unrecognized skill category `{0}`")]
    UnknownCategory(String),
    #[error("unrecognized claim level `{0}`")]
    UnknownClaimLevel(String),
    #[error("unrecognized evidence source `{0}`")]
    UnknownSource(String),
    #[error("unrecognized strength signal `{0}`")]
    UnknownSignal(String),
}

/// Invalid or incomplete scoring configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {origin}: {message}")]
    Parse { origin: String, message: String },
    #[error("weight table has no multiplier for source {0}")]
    MissingSourceMultiplier(EvidenceSource),
    #[error("weight table has no entries")]
    NoWeightEntries,
    #[error("weight for {context} must be finite and >= 0 (found {value})")]
    InvalidWeight { context: String, value: f32 },
    #[error("multiplier {value} for source {evidence_source} exceeds cap {cap}")]
    MultiplierAboveCap {
        evidence_source: EvidenceSource,
        value: f32,
        cap: f32,
    },
    #[error("expected_score floor is not set")]
    FloorUnset,
    #[error("expected_score floor must be finite and > 0 (found {0})")]
    InvalidFloor(f32),
    #[error("no expected score configured for claim level {0}")]
    MissingLevelExpectation(ClaimLevel),
    #[error("expected score for {higher} must not be lower than for {lower}")]
    NonMonotonicExpectations { lower: ClaimLevel, higher: ClaimLevel },
    #[error("band thresholds must satisfy 0 < partially_supported <= authentic <= 1 (found {partially_supported}, {authentic})")]
    InvalidThresholds {
        authentic: f32,
        partially_supported: f32,
    },
    #[error("{scope} strength thresholds must satisfy 0 < moderate <= strong (found {moderate}, {strong})")]
    InvalidStrengthThresholds {
        scope: &'static str,
        strong: f32,
        moderate: f32,
    },
}

impl ConfigError {
    pub(crate) fn parse(origin: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Parse {
            origin: origin.into(),
            message: err.to_string(),
        }
    }
}
