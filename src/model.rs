//! # Evidence Model
//!
//! Leaf data types shared by every stage of the scoring pipeline:
//! claimed skills, evidence items, and the closed vocabularies they use.
//!
//! - All types are plain data (no logic beyond parsing and canonical keys).
//! - Vocabulary parsing is lenient: case, separators, and the common
//!   synonyms found in resumes ("proficient", "worked with", "github") are
//!   accepted. Anything else is a [`DataError`] for the intake layer to count.

use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Broad family a claimed skill belongs to. Weight overrides key on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SkillCategory {
    Programming,
    WebDev,
    ML,
    Tooling,
    Other,
}

/// Self-reported proficiency, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClaimLevel {
    Basic,
    Intermediate,
    Advanced,
    Expert,
}

impl ClaimLevel {
    pub const ALL: [ClaimLevel; 4] = [
        ClaimLevel::Basic,
        ClaimLevel::Intermediate,
        ClaimLevel::Advanced,
        ClaimLevel::Expert,
    ];
}

/// Where a piece of evidence was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EvidenceSource {
    Project,
    Experience,
    Certification,
    ExternalProfile,
}

impl EvidenceSource {
    pub const ALL: [EvidenceSource; 4] = [
        EvidenceSource::Project,
        EvidenceSource::Experience,
        EvidenceSource::Certification,
        EvidenceSource::ExternalProfile,
    ];

    /// Tie-break rank for explanation ordering (higher wins).
    pub const fn priority(self) -> u8 {
        match self {
            EvidenceSource::ExternalProfile => 3,
            EvidenceSource::Certification => 2,
            EvidenceSource::Experience => 1,
            EvidenceSource::Project => 0,
        }
    }

    /// Lowercase label used in human-readable text.
    pub const fn label(self) -> &'static str {
        match self {
            EvidenceSource::Project => "projects",
            EvidenceSource::Experience => "work experience",
            EvidenceSource::Certification => "certifications",
            EvidenceSource::ExternalProfile => "external profile",
        }
    }
}

/// Qualitative tag describing what an evidence item demonstrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StrengthSignal {
    MultipleImplementations,
    TechnicalDocumentation,
    EvaluationMetrics,
    ProfessionalUsage,
    TeamContext,
    ActivityLevel,
    LanguageDiversity,
    KeywordOnly,
}

impl StrengthSignal {
    pub const ALL: [StrengthSignal; 8] = [
        StrengthSignal::MultipleImplementations,
        StrengthSignal::TechnicalDocumentation,
        StrengthSignal::EvaluationMetrics,
        StrengthSignal::ProfessionalUsage,
        StrengthSignal::TeamContext,
        StrengthSignal::ActivityLevel,
        StrengthSignal::LanguageDiversity,
        StrengthSignal::KeywordOnly,
    ];
}

/// Audience of the report. Only students get improvement suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Mode {
    #[default]
    Student,
    #[serde(alias = "Hr", alias = "hr", alias = "recruiter")]
    HR,
}

/// A skill the author states they have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimedSkill {
    pub name: String,
    pub category: SkillCategory,
    pub claim_level: ClaimLevel,
}

impl ClaimedSkill {
    pub fn new(name: impl Into<String>, category: SkillCategory, claim_level: ClaimLevel) -> Self {
        Self {
            name: name.into(),
            category,
            claim_level,
        }
    }

    /// Key used for uniqueness and evidence partitioning.
    pub fn key(&self) -> String {
        canonical_key(&self.name)
    }
}

/// One extracted signal supporting exactly one claimed skill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub skill_ref: String,
    pub source: EvidenceSource,
    pub strength_signals: BTreeSet<StrengthSignal>,
    #[serde(default)]
    pub raw_excerpt: String,
}

impl EvidenceItem {
    pub fn new(
        skill_ref: impl Into<String>,
        source: EvidenceSource,
        signals: impl IntoIterator<Item = StrengthSignal>,
        raw_excerpt: impl Into<String>,
    ) -> Self {
        Self {
            skill_ref: skill_ref.into(),
            source,
            strength_signals: signals.into_iter().collect(),
            raw_excerpt: raw_excerpt.into(),
        }
    }

    /// Dedup identity: (source, sorted signal set, canonical skill).
    pub(crate) fn dedup_key(&self) -> (EvidenceSource, Vec<StrengthSignal>, String) {
        (
            self.source,
            self.strength_signals.iter().copied().collect(),
            canonical_key(&self.skill_ref),
        )
    }
}

/// Canonical form of a skill name: trimmed, lowercase, `-`/`_` treated as
/// spaces, whitespace collapsed. Symbols like `+`, `#` and `.` are kept so
/// "C++", "C#" and "node.js" stay distinct.
pub fn canonical_key(name: &str) -> String {
    let lowered = name.trim().to_lowercase().replace(['-', '_'], " ");
    lowered.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Vocabulary normalization: lowercase and drop spaces, dashes, underscores,
/// ampersands, and slashes ("Data Science & ML" → "datascienceml").
fn vocab(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_' | '&' | '/' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FromStr for SkillCategory {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab(s).as_str() {
            "programming" | "programminglanguages" | "languages" => Ok(Self::Programming),
            "webdev" | "webdevelopment" | "web" | "frontend" | "backend" => Ok(Self::WebDev),
            "ml" | "machinelearning" | "datascienceml" | "datascience" | "ai" | "deeplearning" => {
                Ok(Self::ML)
            }
            "tooling" | "tools" | "toolsframeworks" | "clouddevops" | "devops" | "databases" => {
                Ok(Self::Tooling)
            }
            "other" | "misc" => Ok(Self::Other),
            _ => Err(DataError::UnknownCategory(s.to_string())),
        }
    }
}

impl FromStr for ClaimLevel {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab(s).as_str() {
            "basic" | "beginner" | "learning" | "exposureto" | "awareof" | "novice" => {
                Ok(Self::Basic)
            }
            "intermediate" | "workedwith" | "experiencein" | "familiar" | "workingknowledge" => {
                Ok(Self::Intermediate)
            }
            "advanced" | "proficient" | "experienced" | "specialized" => Ok(Self::Advanced),
            "expert" | "mastery" => Ok(Self::Expert),
            _ => Err(DataError::UnknownClaimLevel(s.to_string())),
        }
    }
}

impl FromStr for EvidenceSource {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match vocab(s).as_str() {
            "project" | "projects" => Ok(Self::Project),
            "experience" | "workexperience" | "employment" | "internship" => Ok(Self::Experience),
            "certification" | "certifications" | "certificate" => Ok(Self::Certification),
            "externalprofile" | "profile" | "github" | "gitlab" => Ok(Self::ExternalProfile),
            _ => Err(DataError::UnknownSource(s.to_string())),
        }
    }
}

impl FromStr for StrengthSignal {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = vocab(s);
        StrengthSignal::ALL
            .into_iter()
            .find(|sig| vocab(&format!("{sig:?}")) == v)
            .ok_or_else(|| DataError::UnknownSignal(s.to_string()))
    }
}

impl fmt::Display for ClaimLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for EvidenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for StrengthSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
