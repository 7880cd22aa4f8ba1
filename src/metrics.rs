use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const RUNS_TOTAL: &str = "credibility_runs_total";
pub const SKILLS_SCORED_TOTAL: &str = "credibility_skills_scored_total";
pub const EVIDENCE_UNMATCHED_TOTAL: &str = "credibility_evidence_unmatched_total";
pub const EVIDENCE_DEDUP_TOTAL: &str = "credibility_evidence_dedup_total";
pub const DATA_ERRORS_TOTAL: &str = "credibility_data_errors_total";
pub const SCORE_HISTOGRAM: &str = "credibility_score";

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(RUNS_TOTAL, "Completed analysis runs.");
        describe_counter!(SKILLS_SCORED_TOTAL, "Claimed skills scored.");
        describe_counter!(
            EVIDENCE_UNMATCHED_TOTAL,
            "Evidence items dropped because no claimed skill matched."
        );
        describe_counter!(
            EVIDENCE_DEDUP_TOTAL,
            "Evidence items removed as exact duplicates."
        );
        describe_counter!(
            DATA_ERRORS_TOTAL,
            "Malformed input records dropped or ignored at intake."
        );
        describe_histogram!(SCORE_HISTOGRAM, "Per-skill credibility in [0, 1].");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> anyhow::Result<Self> {
        // Default buckets; credibility lives in [0, 1] anyway.
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
