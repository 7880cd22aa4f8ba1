use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::intake::AnalysisRequest;
use crate::model::{EvidenceSource, SkillCategory, StrengthSignal};
use crate::orchestrator::Orchestrator;
use crate::policy::ScoringPolicy;
use crate::report::Report;
use crate::weights::{WeightsConfig, WeightsHandle};

#[derive(Clone)]
pub struct AppState {
    pub weights: WeightsHandle,
    pub policy: Arc<ScoringPolicy>,
    /// File re-read by `/admin/reload-weights`.
    pub weights_path: PathBuf,
}

impl AppState {
    pub fn new(weights: WeightsHandle, policy: ScoringPolicy, weights_path: PathBuf) -> Self {
        Self {
            weights,
            policy: Arc::new(policy),
            weights_path,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/analyze", post(analyze))
        .route("/debug/weights", get(debug_weights))
        .route("/debug/weight", get(debug_weight))
        .route("/admin/reload-weights", post(admin_reload_weights))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn analyze(State(state): State<AppState>, Json(body): Json<AnalysisRequest>) -> Json<Report> {
    // one snapshot per request
    let orch = Orchestrator::from_handle(&state.weights, Arc::clone(&state.policy));
    Json(orch.run_request(body).await)
}

async fn debug_weights(State(state): State<AppState>) -> Json<WeightsConfig> {
    Json(state.weights.snapshot().config().clone())
}

/// `/debug/weight?source=Project&signal=KeywordOnly&category=ML`
async fn debug_weight(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<String, (StatusCode, String)> {
    let bad = |e: crate::error::DataError| (StatusCode::BAD_REQUEST, e.to_string());

    let source: EvidenceSource = q
        .get("source")
        .map(String::as_str)
        .unwrap_or_default()
        .parse()
        .map_err(bad)?;
    let signal: StrengthSignal = q
        .get("signal")
        .map(String::as_str)
        .unwrap_or_default()
        .parse()
        .map_err(bad)?;
    let category: SkillCategory = match q.get("category") {
        Some(c) => c.parse().map_err(bad)?,
        None => SkillCategory::Other,
    };

    let table = state.weights.snapshot();
    Ok(format!(
        "source={source} signal={signal} category={category:?} -> weight={:.2} multiplier={:.2} contribution={:.2}",
        table.weight(source, signal, category),
        table.multiplier(source),
        table.contribution_weight(source, signal, category),
    ))
}

async fn admin_reload_weights(State(state): State<AppState>) -> (StatusCode, String) {
    match state.weights.reload_from(&state.weights_path) {
        Ok(()) => (StatusCode::OK, "reloaded".to_string()),
        Err(err) => {
            tracing::warn!(error = %err, "weight reload rejected; keeping previous table");
            (StatusCode::UNPROCESSABLE_ENTITY, format!("rejected: {err}"))
        }
    }
}
