// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod error;
pub mod model;

// Scoring core
pub mod aggregate;
pub mod classify;
pub mod explain;
pub mod orchestrator;
pub mod policy;
pub mod report;
pub mod weights;

// Inputs around the core
pub mod intake;
pub mod profile;

// Service surface & ambient
pub mod api;
pub mod config;
pub mod metrics;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::create_router;
pub use crate::classify::{BandThresholds, StrengthThresholds};
pub use crate::error::{ConfigError, DataError};
pub use crate::model::{ClaimLevel, ClaimedSkill, EvidenceItem, EvidenceSource, Mode, SkillCategory, StrengthSignal};
pub use crate::orchestrator::Orchestrator;
pub use crate::policy::ScoringPolicy;
pub use crate::report::{Band, EvidenceStrength, Report, ReportSummary, SkillScore, SourceStrength};
pub use crate::weights::{WeightTable, WeightsHandle};
