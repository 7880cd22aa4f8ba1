//! Skill Credibility Service: binary entrypoint.
//! Loads scoring configuration, then boots the Axum HTTP server.
//!
//! Configuration errors are fatal: the service refuses to start rather than
//! score with a broken weight table or policy.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use skill_credibility::api::{create_router, AppState};
use skill_credibility::config::AppConfig;
use skill_credibility::metrics::Metrics;
use skill_credibility::telemetry;
use skill_credibility::weights::{start_hot_reload_thread, WeightsHandle};

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    telemetry::init_tracing();

    let cfg = AppConfig::from_env();
    let weights = cfg.load_weights()?;
    let policy = cfg.load_policy()?;
    tracing::info!(
        weights = %cfg.weights_path.display(),
        policy = %cfg.policy_path.display(),
        hot_reload = cfg.hot_reload,
        "scoring configuration loaded"
    );

    let handle = WeightsHandle::new(weights);
    // Watcher runs detached for the life of the process.
    let _watcher =
        start_hot_reload_thread(handle.clone(), cfg.weights_path.clone(), cfg.hot_reload);

    let metrics = Metrics::init().context("initializing metrics exporter")?;

    let state = AppState::new(handle, policy, cfg.weights_path);
    let router = create_router(state).merge(metrics.router());

    Ok(router.into())
}
