//! Scoring policy: expected score per claim level (with a non-zero floor),
//! band thresholds, and explanation knobs. Loaded from TOML and validated
//! once; a bad policy is a [`ConfigError`] and the service refuses to start.
//!
//! ```toml
//! [expected]
//! floor = 10.0
//! basic = 20.0
//! intermediate = 40.0
//! advanced = 70.0
//! expert = 90.0
//!
//! [bands]
//! authentic = 0.75
//! partially_supported = 0.40
//!
//! [explain]
//! max_suggestions = 3
//! suggestion_min_weight = 20.0
//! low_evidence_count = 1
//!
//! [strength]
//! source_strong = 30.0
//! source_moderate = 15.0
//! overall_strong = 70.0
//! overall_moderate = 35.0
//! ```

use crate::classify::{BandThresholds, StrengthThresholds};
use crate::error::ConfigError;
use crate::model::ClaimLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_POLICY_PATH: &str = "config/scoring.toml";
pub const ENV_POLICY_PATH: &str = "CREDIBILITY_POLICY_PATH";

/// Expected evidence score per claim level; never below `floor`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedScores {
    pub floor: f32,
    pub basic: f32,
    pub intermediate: f32,
    pub advanced: f32,
    pub expert: f32,
}

impl Default for ExpectedScores {
    fn default() -> Self {
        Self {
            floor: 10.0,
            basic: 20.0,
            intermediate: 40.0,
            advanced: 70.0,
            expert: 90.0,
        }
    }
}

fn default_max_suggestions() -> usize {
    3
}
fn default_suggestion_min_weight() -> f32 {
    20.0
}
fn default_low_evidence_count() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainSettings {
    /// Upper bound on suggestions per skill.
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
    /// Missing signals worth less than this are not suggested.
    #[serde(default = "default_suggestion_min_weight")]
    pub suggestion_min_weight: f32,
    /// At or below this many evidence items a low-evidence note is added.
    #[serde(default = "default_low_evidence_count")]
    pub low_evidence_count: usize,
}

impl Default for ExplainSettings {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
            suggestion_min_weight: default_suggestion_min_weight(),
            low_evidence_count: default_low_evidence_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScoringPolicy {
    pub expected: ExpectedScores,
    pub bands: BandThresholds,
    pub explain: ExplainSettings,
    pub strength: StrengthThresholds,
}

// File layout. Level entries are optional here so a missing one is reported
// as a config error instead of a generic parse failure.
#[derive(Debug, Deserialize)]
struct PolicyFile {
    expected: ExpectedFile,
    #[serde(default)]
    bands: Option<BandThresholds>,
    #[serde(default)]
    explain: Option<ExplainSettings>,
    #[serde(default)]
    strength: Option<StrengthThresholds>,
}

#[derive(Debug, Deserialize)]
struct ExpectedFile {
    floor: Option<f32>,
    basic: Option<f32>,
    intermediate: Option<f32>,
    advanced: Option<f32>,
    expert: Option<f32>,
}

impl ScoringPolicy {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let file: PolicyFile =
            toml::from_str(toml_str).map_err(|e| ConfigError::parse("scoring toml", e))?;

        let e = file.expected;
        let floor = e.floor.ok_or(ConfigError::FloorUnset)?;
        let level = |v: Option<f32>, lvl: ClaimLevel| {
            v.ok_or(ConfigError::MissingLevelExpectation(lvl))
        };
        let policy = Self {
            expected: ExpectedScores {
                floor,
                basic: level(e.basic, ClaimLevel::Basic)?,
                intermediate: level(e.intermediate, ClaimLevel::Intermediate)?,
                advanced: level(e.advanced, ClaimLevel::Advanced)?,
                expert: level(e.expert, ClaimLevel::Expert)?,
            },
            bands: file.bands.unwrap_or_default(),
            explain: file.explain.unwrap_or_default(),
            strength: file.strength.unwrap_or_default(),
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                origin: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Check floor, per-level monotonicity, band and strength threshold ordering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let floor = self.expected.floor;
        if !floor.is_finite() || floor <= 0.0 {
            return Err(ConfigError::InvalidFloor(floor));
        }

        let mut prev: Option<(ClaimLevel, f32)> = None;
        for lvl in ClaimLevel::ALL {
            let v = self.expected.raw(lvl);
            if !v.is_finite() || v < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    context: format!("expected score {lvl}"),
                    value: v,
                });
            }
            if let Some((lower, pv)) = prev {
                if v < pv {
                    return Err(ConfigError::NonMonotonicExpectations { lower, higher: lvl });
                }
            }
            prev = Some((lvl, v));
        }

        let BandThresholds {
            authentic,
            partially_supported,
        } = self.bands;
        let ordered = partially_supported > 0.0
            && partially_supported <= authentic
            && authentic <= 1.0;
        if !ordered {
            return Err(ConfigError::InvalidThresholds {
                authentic,
                partially_supported,
            });
        }

        let s = &self.strength;
        for (scope, strong, moderate) in [
            ("source", s.source_strong, s.source_moderate),
            ("overall", s.overall_strong, s.overall_moderate),
        ] {
            if !(strong.is_finite() && moderate > 0.0 && moderate <= strong) {
                return Err(ConfigError::InvalidStrengthThresholds {
                    scope,
                    strong,
                    moderate,
                });
            }
        }
        Ok(())
    }

    /// Expected score for a claim level, never below the floor.
    pub fn expected_score(&self, level: ClaimLevel) -> f32 {
        self.expected.raw(level).max(self.expected.floor)
    }
}

impl ExpectedScores {
    fn raw(&self, level: ClaimLevel) -> f32 {
        match level {
            ClaimLevel::Basic => self.basic,
            ClaimLevel::Intermediate => self.intermediate,
            ClaimLevel::Advanced => self.advanced,
            ClaimLevel::Expert => self.expert,
        }
    }
}

/// Resolve the policy path from `CREDIBILITY_POLICY_PATH` or the default.
pub fn policy_path_from_env() -> PathBuf {
    std::env::var(ENV_POLICY_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_POLICY_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        [expected]
        floor = 10.0
        basic = 20.0
        intermediate = 40.0
        advanced = 70.0
        expert = 90.0

        [bands]
        authentic = 0.8
        partially_supported = 0.5

        [explain]
        max_suggestions = 2
    "#;

    #[test]
    fn parses_full_policy() {
        let p = ScoringPolicy::from_toml_str(FULL).unwrap();
        assert_eq!(p.expected_score(ClaimLevel::Advanced), 70.0);
        assert_eq!(p.bands.authentic, 0.8);
        assert_eq!(p.explain.max_suggestions, 2);
        // unspecified knobs keep their defaults
        assert_eq!(p.explain.suggestion_min_weight, 20.0);
    }

    #[test]
    fn default_policy_is_valid() {
        assert!(ScoringPolicy::default().validate().is_ok());
    }

    #[test]
    fn missing_floor_is_fatal() {
        let toml = r#"
            [expected]
            basic = 20.0
            intermediate = 40.0
            advanced = 70.0
            expert = 90.0
        "#;
        assert!(matches!(
            ScoringPolicy::from_toml_str(toml),
            Err(ConfigError::FloorUnset)
        ));
    }

    #[test]
    fn zero_floor_is_fatal() {
        let toml = FULL.replace("floor = 10.0", "floor = 0.0");
        assert!(matches!(
            ScoringPolicy::from_toml_str(&toml),
            Err(ConfigError::InvalidFloor(_))
        ));
    }

    #[test]
    fn missing_level_is_fatal() {
        let toml = FULL.replace("expert = 90.0", "");
        assert!(matches!(
            ScoringPolicy::from_toml_str(&toml),
            Err(ConfigError::MissingLevelExpectation(ClaimLevel::Expert))
        ));
    }

    #[test]
    fn non_monotonic_levels_are_fatal() {
        let toml = FULL.replace("expert = 90.0", "expert = 50.0");
        assert!(matches!(
            ScoringPolicy::from_toml_str(&toml),
            Err(ConfigError::NonMonotonicExpectations {
                lower: ClaimLevel::Advanced,
                higher: ClaimLevel::Expert
            })
        ));
    }

    #[test]
    fn inverted_thresholds_are_fatal() {
        let toml = FULL.replace("partially_supported = 0.5", "partially_supported = 0.9");
        assert!(matches!(
            ScoringPolicy::from_toml_str(&toml),
            Err(ConfigError::InvalidThresholds { .. })
        ));
    }

    #[test]
    fn strength_section_is_optional_and_validated() {
        let p = ScoringPolicy::from_toml_str(FULL).unwrap();
        assert_eq!(p.strength, StrengthThresholds::default());

        let tuned = format!("{FULL}\n[strength]\nsource_strong = 40.0\n");
        let p = ScoringPolicy::from_toml_str(&tuned).unwrap();
        assert_eq!(p.strength.source_strong, 40.0);
        assert_eq!(p.strength.source_moderate, 15.0);

        let inverted = format!("{FULL}\n[strength]\noverall_strong = 20.0\n");
        assert!(matches!(
            ScoringPolicy::from_toml_str(&inverted),
            Err(ConfigError::InvalidStrengthThresholds { scope: "overall", .. })
        ));
    }

    #[test]
    fn floor_lifts_small_expectations() {
        let mut p = ScoringPolicy::default();
        p.expected.basic = 2.0;
        assert_eq!(p.expected_score(ClaimLevel::Basic), 10.0);
    }

    #[test]
    fn expected_grows_with_claim_level() {
        let p = ScoringPolicy::default();
        let scores: Vec<f32> = ClaimLevel::ALL.iter().map(|l| p.expected_score(*l)).collect();
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }
}
