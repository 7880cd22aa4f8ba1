//! # Weighting Model
//!
//! Data-driven mapping `(source, signal, skill category) → base weight`, plus
//! per-source reliability multipliers.
//!
//! - Loads from JSON config (entries + category overrides + multipliers).
//! - Lookup order: category override → `(source, signal)` entry → `0.0`.
//!   Unconfigured pairs contribute nothing; they are logged, never fatal.
//! - Includes a built-in `default_seed()` matching `config/weights.json`.
//! - `WeightsHandle` hands out immutable snapshots and swaps in freshly
//!   validated tables (admin endpoint or mtime-polling watcher thread).
//!
//! JSON shape:
//! {
//!   "max_source_multiplier": 1.5,
//!   "source_multipliers": { "Project": 1.0, ... },
//!   "entries": [ { "source": "Project", "signal": "KeywordOnly", "weight": 10.0 } ],
//!   "category_overrides": [ { "category": "ML", "source": "Project", "signal": "EvaluationMetrics", "weight": 40.0 } ]
//! }

use crate::error::ConfigError;
use crate::model::{EvidenceSource, SkillCategory, StrengthSignal};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

pub const DEFAULT_WEIGHTS_PATH: &str = "config/weights.json";
pub const ENV_WEIGHTS_PATH: &str = "CREDIBILITY_WEIGHTS_PATH";
pub const ENV_HOT_RELOAD: &str = "CREDIBILITY_HOT_RELOAD";

fn default_max_source_multiplier() -> f32 {
    1.5
}

/// Base weight of one signal when found in one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub source: EvidenceSource,
    pub signal: StrengthSignal,
    pub weight: f32,
}

/// Category-specific replacement for a [`WeightEntry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeightEntry {
    pub category: SkillCategory,
    pub source: EvidenceSource,
    pub signal: StrengthSignal,
    pub weight: f32,
}

/// Serialized form of the weighting policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsConfig {
    /// Upper bound any source multiplier may take.
    #[serde(default = "default_max_source_multiplier")]
    pub max_source_multiplier: f32,
    /// Reliability multiplier per source. Every source is mandatory.
    #[serde(default)]
    pub source_multipliers: BTreeMap<EvidenceSource, f32>,
    #[serde(default)]
    pub entries: Vec<WeightEntry>,
    #[serde(default)]
    pub category_overrides: Vec<CategoryWeightEntry>,
}

/// Validated, indexed weight table. Read-only once built.
#[derive(Debug, Clone)]
pub struct WeightTable {
    base: HashMap<(EvidenceSource, StrengthSignal), f32>,
    overrides: HashMap<(SkillCategory, EvidenceSource, StrengthSignal), f32>,
    multipliers: BTreeMap<EvidenceSource, f32>,
    config: WeightsConfig,
}

impl WeightTable {
    /// Validate and index a config.
    pub fn from_config(config: WeightsConfig) -> Result<Self, ConfigError> {
        validate(&config)?;
        Ok(Self::compile(config))
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WeightsConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::parse("weights json", e))?;
        Self::from_config(config)
    }

    /// Load from a JSON file. A missing or invalid file is an error; there is
    /// no fallback to the seed.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: WeightsConfig = serde_json::from_str(&content)
            .map_err(|e| ConfigError::parse(path.display().to_string(), e))?;
        Self::from_config(config)
    }

    fn compile(config: WeightsConfig) -> Self {
        let base = config
            .entries
            .iter()
            .map(|e| ((e.source, e.signal), e.weight))
            .collect();
        let overrides = config
            .category_overrides
            .iter()
            .map(|e| ((e.category, e.source, e.signal), e.weight))
            .collect();
        Self {
            base,
            overrides,
            multipliers: config.source_multipliers.clone(),
            config,
        }
    }

    /// Base weight for a signal from a source, for a skill of `category`.
    pub fn weight(
        &self,
        source: EvidenceSource,
        signal: StrengthSignal,
        category: SkillCategory,
    ) -> f32 {
        match self.lookup(source, signal, category) {
            Some(w) => w,
            None => {
                debug!(?source, ?signal, ?category, "no weight configured; contributes 0");
                0.0
            }
        }
    }

    fn lookup(
        &self,
        source: EvidenceSource,
        signal: StrengthSignal,
        category: SkillCategory,
    ) -> Option<f32> {
        self.overrides
            .get(&(category, source, signal))
            .or_else(|| self.base.get(&(source, signal)))
            .copied()
    }

    /// Reliability multiplier for a source.
    pub fn multiplier(&self, source: EvidenceSource) -> f32 {
        // Validation guarantees presence; 1.0 keeps lookups total for hand-built tables.
        self.multipliers.get(&source).copied().unwrap_or(1.0)
    }

    /// Base weight scaled by the source multiplier.
    pub fn contribution_weight(
        &self,
        source: EvidenceSource,
        signal: StrengthSignal,
        category: SkillCategory,
    ) -> f32 {
        self.weight(source, signal, category) * self.multiplier(source)
    }

    /// Best contribution a signal could make from any source.
    pub fn best_contribution(&self, signal: StrengthSignal, category: SkillCategory) -> f32 {
        EvidenceSource::ALL
            .into_iter()
            .filter_map(|src| {
                self.lookup(src, signal, category)
                    .map(|w| w * self.multiplier(src))
            })
            .fold(0.0, f32::max)
    }

    pub fn config(&self) -> &WeightsConfig {
        &self.config
    }

    /// Built-in table, on a 0–100 point scale.
    pub fn default_seed() -> Self {
        use EvidenceSource::*;
        use StrengthSignal::*;

        let mut source_multipliers = BTreeMap::new();
        for (src, m) in [
            (Project, 1.0),
            (Experience, 1.1),
            (Certification, 1.2),
            (ExternalProfile, 1.2),
        ] {
            source_multipliers.insert(src, m);
        }

        let entries = [
            (Project, MultipleImplementations, 30.0),
            (Project, TechnicalDocumentation, 25.0),
            (Project, EvaluationMetrics, 30.0),
            (Project, ProfessionalUsage, 20.0),
            (Project, TeamContext, 15.0),
            (Project, KeywordOnly, 10.0),
            (Experience, MultipleImplementations, 25.0),
            (Experience, TechnicalDocumentation, 20.0),
            (Experience, EvaluationMetrics, 30.0),
            (Experience, ProfessionalUsage, 35.0),
            (Experience, TeamContext, 25.0),
            (Experience, KeywordOnly, 12.0),
            (Certification, TechnicalDocumentation, 25.0),
            (Certification, EvaluationMetrics, 25.0),
            (Certification, KeywordOnly, 20.0),
            (ExternalProfile, MultipleImplementations, 30.0),
            (ExternalProfile, TechnicalDocumentation, 20.0),
            (ExternalProfile, ActivityLevel, 30.0),
            (ExternalProfile, LanguageDiversity, 20.0),
            (ExternalProfile, KeywordOnly, 10.0),
        ]
        .into_iter()
        .map(|(source, signal, weight)| WeightEntry {
            source,
            signal,
            weight,
        })
        .collect();

        let category_overrides = [
            (SkillCategory::ML, Project, EvaluationMetrics, 40.0),
            (SkillCategory::ML, Experience, EvaluationMetrics, 40.0),
            (SkillCategory::Tooling, Experience, ProfessionalUsage, 40.0),
        ]
        .into_iter()
        .map(|(category, source, signal, weight)| CategoryWeightEntry {
            category,
            source,
            signal,
            weight,
        })
        .collect();

        Self::compile(WeightsConfig {
            max_source_multiplier: default_max_source_multiplier(),
            source_multipliers,
            entries,
            category_overrides,
        })
    }
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::default_seed()
    }
}

fn validate(config: &WeightsConfig) -> Result<(), ConfigError> {
    let cap = config.max_source_multiplier;
    if !cap.is_finite() || cap <= 0.0 {
        return Err(ConfigError::InvalidWeight {
            context: "max_source_multiplier".to_string(),
            value: cap,
        });
    }

    for src in EvidenceSource::ALL {
        let m = *config
            .source_multipliers
            .get(&src)
            .ok_or(ConfigError::MissingSourceMultiplier(src))?;
        if !m.is_finite() || m < 0.0 {
            return Err(ConfigError::InvalidWeight {
                context: format!("multiplier {src}"),
                value: m,
            });
        }
        if m > cap {
            return Err(ConfigError::MultiplierAboveCap {
                evidence_source: src,
                value: m,
                cap,
            });
        }
    }

    if config.entries.is_empty() {
        return Err(ConfigError::NoWeightEntries);
    }

    let all = config
        .entries
        .iter()
        .map(|e| (format!("{}/{}", e.source, e.signal), e.weight))
        .chain(config.category_overrides.iter().map(|e| {
            (
                format!("{:?}/{}/{}", e.category, e.source, e.signal),
                e.weight,
            )
        }));
    for (context, value) in all {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidWeight { context, value });
        }
    }
    Ok(())
}

/* ----------------------------
Thread-safe handle + hot reload
---------------------------- */

/// Shared, swappable weight table. Readers take an `Arc` snapshot, so a
/// scoring run never observes a half-applied reload.
#[derive(Clone, Debug)]
pub struct WeightsHandle {
    inner: Arc<RwLock<State>>,
}

#[derive(Debug)]
struct State {
    table: Arc<WeightTable>,
    last_modified: Option<SystemTime>,
}

impl WeightsHandle {
    pub fn new(table: WeightTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(State {
                table: Arc::new(table),
                last_modified: None,
            })),
        }
    }

    /// Current table.
    pub fn snapshot(&self) -> Arc<WeightTable> {
        match self.inner.read() {
            Ok(guard) => guard.table.clone(),
            Err(poisoned) => poisoned.into_inner().table.clone(),
        }
    }

    /// Swap in an already validated table.
    pub fn replace(&self, table: WeightTable) {
        let mut guard = match self.inner.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.table = Arc::new(table);
    }

    /// Reload from `path`. On failure the active table is kept.
    pub fn reload_from(&self, path: &Path) -> Result<(), ConfigError> {
        let table = WeightTable::load_from_file(path)?;
        let mtime = fs::metadata(path).and_then(|m| m.modified()).ok();
        let mut guard = match self.inner.write() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.table = Arc::new(table);
        guard.last_modified = mtime;
        info!(path = %path.display(), "weight table reloaded");
        Ok(())
    }

    /// Reload only if the file's mtime differs from the last applied one.
    /// Returns true when a new table was swapped in.
    pub fn refresh_if_changed(&self, path: &Path) -> bool {
        let Ok(mtime) = fs::metadata(path).and_then(|m| m.modified()) else {
            // File missing; keep current table.
            return false;
        };

        let changed = match self.inner.read() {
            Ok(guard) => guard.last_modified != Some(mtime),
            Err(poisoned) => poisoned.into_inner().last_modified != Some(mtime),
        };
        if !changed {
            return false;
        }

        match self.reload_from(path) {
            Ok(()) => true,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "rejected weight table reload; keeping previous table");
                // Remember the mtime so a broken file is not re-parsed every poll.
                if let Ok(mut guard) = self.inner.write() {
                    guard.last_modified = Some(mtime);
                }
                false
            }
        }
    }
}

/// Resolve the weights path from `CREDIBILITY_WEIGHTS_PATH` or the default.
pub fn weights_path_from_env() -> PathBuf {
    std::env::var(ENV_WEIGHTS_PATH)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_WEIGHTS_PATH))
}

/// Start a polling watcher on `path` (every 2s) when `enabled`.
/// Uses only std threads. Returns the watcher's handle if one was spawned.
pub fn start_hot_reload_thread(
    handle: WeightsHandle,
    path: PathBuf,
    enabled: bool,
) -> Option<thread::JoinHandle<()>> {
    if !enabled {
        debug!("weight table hot reload disabled");
        return None;
    }

    // Seed the mtime so the first poll does not reload the file we just loaded.
    if let Ok(mtime) = fs::metadata(&path).and_then(|m| m.modified()) {
        if let Ok(mut guard) = handle.inner.write() {
            guard.last_modified.get_or_insert(mtime);
        }
    }

    info!(path = %path.display(), "weight table hot reload enabled");
    Some(thread::spawn(move || {
        let poll = Duration::from_secs(2);
        loop {
            handle.refresh_if_changed(&path);
            thread::sleep(poll);
        }
    }))
}
