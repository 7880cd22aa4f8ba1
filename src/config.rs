//! Runtime configuration resolved from the environment (`.env` is loaded by
//! the binary before this runs).
//!
//! - `CREDIBILITY_WEIGHTS_PATH` (default `config/weights.json`)
//! - `CREDIBILITY_POLICY_PATH` (default `config/scoring.toml`)
//! - `CREDIBILITY_HOT_RELOAD=1` enables the weights watcher

use crate::policy::{policy_path_from_env, ScoringPolicy};
use crate::weights::{weights_path_from_env, WeightTable, ENV_HOT_RELOAD};
use anyhow::Context;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub weights_path: PathBuf,
    pub policy_path: PathBuf,
    pub hot_reload: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            weights_path: weights_path_from_env(),
            policy_path: policy_path_from_env(),
            hot_reload: std::env::var(ENV_HOT_RELOAD)
                .ok()
                .is_some_and(|v| v.trim() == "1"),
        }
    }

    /// Load and validate the weight table. Any problem is fatal.
    pub fn load_weights(&self) -> anyhow::Result<WeightTable> {
        WeightTable::load_from_file(&self.weights_path).with_context(|| {
            format!(
                "loading weight table from {}",
                self.weights_path.display()
            )
        })
    }

    /// Load and validate the scoring policy. Any problem is fatal.
    pub fn load_policy(&self) -> anyhow::Result<ScoringPolicy> {
        ScoringPolicy::load_from_file(&self.policy_path).with_context(|| {
            format!(
                "loading scoring policy from {}",
                self.policy_path.display()
            )
        })
    }
}
