// tests/metrics.rs
// Installs the global Prometheus recorder, so it is kept out of default runs:
//   cargo test --features strict-metrics --test metrics
#![cfg(feature = "strict-metrics")]

use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use skill_credibility::metrics::Metrics;
use skill_credibility::model::{
    ClaimLevel, ClaimedSkill, EvidenceItem, EvidenceSource, Mode, SkillCategory, StrengthSignal,
};
use skill_credibility::{Orchestrator, ScoringPolicy, WeightTable};

#[tokio::test]
async fn metrics_endpoint_contains_expected_series() {
    let metrics = Metrics::init().expect("install recorder once per process");

    let orch = Orchestrator::new(
        Arc::new(WeightTable::default_seed()),
        Arc::new(ScoringPolicy::default()),
    );
    let claims = vec![ClaimedSkill::new(
        "Python",
        SkillCategory::Programming,
        ClaimLevel::Advanced,
    )];
    let item = EvidenceItem::new(
        "Python",
        EvidenceSource::Project,
        [StrengthSignal::MultipleImplementations],
        "",
    );
    let orphan = EvidenceItem::new(
        "Haskell",
        EvidenceSource::Project,
        [StrengthSignal::KeywordOnly],
        "",
    );
    orch.run(claims, vec![item.clone(), item, orphan], Mode::HR)
        .await;

    let resp = metrics
        .router()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // axum::body::to_bytes requires an explicit limit
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap(); // 1 MiB
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "credibility_runs_total",
        "credibility_skills_scored_total",
        "credibility_evidence_unmatched_total",
        "credibility_evidence_dedup_total",
        // the orphan item is a data issue even without request intake
        "credibility_data_errors_total",
        "credibility_score",
    ] {
        assert!(
            text.contains(needle),
            "expected `{needle}` in /metrics output:\n{text}"
        );
    }
}
