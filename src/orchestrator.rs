//! # Orchestrator
//! Drives aggregation → classification → explanation over every claimed skill
//! and assembles the [`Report`].
//!
//! - Evidence is partitioned by canonical `skill_ref`; unmatched items are
//!   dropped and counted.
//! - One tokio task per skill on a `JoinSet`, joined back by index so the
//!   output order always equals the claim order.
//! - All tasks share read-only `Arc` snapshots of the weight table and policy.

use crate::aggregate::aggregate;
use crate::classify::classify;
use crate::explain::explain;
use crate::intake::{self, AnalysisRequest};
use crate::metrics::{
    ensure_metrics_described, DATA_ERRORS_TOTAL, EVIDENCE_DEDUP_TOTAL, EVIDENCE_UNMATCHED_TOTAL,
    RUNS_TOTAL, SCORE_HISTOGRAM, SKILLS_SCORED_TOTAL,
};
use crate::model::{ClaimedSkill, EvidenceItem, Mode};
use crate::policy::ScoringPolicy;
use crate::profile;
use crate::report::{DataIssues, Report, ReportSummary, SkillScore};
use crate::telemetry::anon_hash;
use crate::weights::{WeightTable, WeightsHandle};
use metrics::{counter, histogram};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct Orchestrator {
    weights: Arc<WeightTable>,
    policy: Arc<ScoringPolicy>,
}

impl Orchestrator {
    pub fn new(weights: Arc<WeightTable>, policy: Arc<ScoringPolicy>) -> Self {
        Self { weights, policy }
    }

    /// Pin the handle's current table for the lifetime of this orchestrator,
    /// so a reload mid-run cannot mix two tables in one report.
    pub fn from_handle(handle: &WeightsHandle, policy: Arc<ScoringPolicy>) -> Self {
        Self::new(handle.snapshot(), policy)
    }

    /// Score every claimed skill. Never fails: bad records are dropped and
    /// counted in `Report.data_issues`.
    pub async fn run(
        &self,
        claimed_skills: Vec<ClaimedSkill>,
        evidence_items: Vec<EvidenceItem>,
        mode: Mode,
    ) -> Report {
        ensure_metrics_described();

        let (claims, duplicate_claims) = intake::dedup_claims(claimed_skills);
        let (parts, unmatched) = partition(&claims, evidence_items);
        if unmatched > 0 {
            warn!(count = unmatched, "dropping evidence for unclaimed skills");
            counter!(EVIDENCE_UNMATCHED_TOTAL).increment(unmatched as u64);
        }

        let jobs: Vec<(ClaimedSkill, Arc<Vec<EvidenceItem>>)> = claims
            .into_iter()
            .zip(parts.into_iter().map(Arc::new))
            .collect();

        let mut set = JoinSet::new();
        for (idx, (skill, items)) in jobs.iter().enumerate() {
            let skill = skill.clone();
            let items = Arc::clone(items);
            let weights = Arc::clone(&self.weights);
            let policy = Arc::clone(&self.policy);
            set.spawn(async move { (idx, score_skill(&skill, &items, mode, &weights, &policy)) });
        }

        let mut slots: Vec<Option<SkillScore>> = vec![None; jobs.len()];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, score)) => slots[idx] = Some(score),
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(err) => warn!(error = %err, "skill task cancelled; recomputing inline"),
            }
        }

        let skill_scores: Vec<SkillScore> = slots
            .into_iter()
            .zip(jobs.iter())
            .map(|(slot, (skill, items))| {
                slot.unwrap_or_else(|| {
                    score_skill(skill, items, mode, &self.weights, &self.policy)
                })
            })
            .collect();

        let dedup: usize = skill_scores.iter().map(|s| s.duplicates_removed).sum();
        if dedup > 0 {
            counter!(EVIDENCE_DEDUP_TOTAL).increment(dedup as u64);
        }
        counter!(SKILLS_SCORED_TOTAL).increment(skill_scores.len() as u64);
        counter!(RUNS_TOTAL).increment(1);

        let data_issues = DataIssues {
            unmatched_evidence: unmatched,
            duplicate_claims,
            ..DataIssues::default()
        };
        record_data_issues(&data_issues);

        let report = Report {
            overall_credibility: overall_credibility(&skill_scores),
            mode,
            summary: ReportSummary::from_scores(&skill_scores),
            data_issues,
            skill_scores,
            profile_summary: None,
        };

        info!(
            skills = report.summary.total_skills,
            authentic = report.summary.authentic,
            partially_supported = report.summary.partially_supported,
            likely_inflated = report.summary.likely_inflated,
            average = report.summary.average_score,
            overall = report.overall_credibility,
            "analysis run complete"
        );
        report
    }

    /// Intake (string vocab → typed), optional profile evidence, then [`run`](Self::run).
    pub async fn run_request(&self, request: AnalysisRequest) -> Report {
        let claims = intake::normalize_claims(&request.claimed_skills);
        let mut evidence = intake::normalize_evidence(&request.evidence);

        if let Some(snapshot) = &request.profile {
            evidence
                .items
                .extend(profile::evidence_for(snapshot, &claims.claims));
        }

        // Claims are already deduplicated here, so `run` only adds unmatched evidence.
        let intake_issues = claims.issues.merge(evidence.issues);
        record_data_issues(&intake_issues);

        let mut report = self.run(claims.claims, evidence.items, request.mode).await;
        report.data_issues = report.data_issues.merge(intake_issues);
        report.profile_summary = request.profile.as_ref().map(|p| p.summary());
        report
    }
}

fn record_data_issues(issues: &DataIssues) {
    let total = issues.total();
    if total > 0 {
        counter!(DATA_ERRORS_TOTAL).increment(total as u64);
    }
}

/// Split evidence by claimed skill (canonical key). Returns one bucket per
/// claim, in claim order, plus the number of unmatched items.
pub fn partition(
    claims: &[ClaimedSkill],
    evidence: Vec<EvidenceItem>,
) -> (Vec<Vec<EvidenceItem>>, usize) {
    let index: HashMap<String, usize> = claims
        .iter()
        .enumerate()
        .map(|(i, c)| (c.key(), i))
        .collect();

    let mut buckets = vec![Vec::new(); claims.len()];
    let mut unmatched = 0usize;
    for item in evidence {
        let key = crate::model::canonical_key(&item.skill_ref);
        match index.get(&key) {
            Some(&i) => buckets[i].push(item),
            None => {
                debug!(skill = %item.skill_ref, excerpt = %anon_hash(&item.raw_excerpt), "unmatched evidence");
                unmatched += 1;
            }
        }
    }
    (buckets, unmatched)
}

/// Pure per-skill pipeline: aggregate → classify → explain.
pub fn score_skill(
    skill: &ClaimedSkill,
    evidence: &[EvidenceItem],
    mode: Mode,
    weights: &WeightTable,
    policy: &ScoringPolicy,
) -> SkillScore {
    let agg = aggregate(skill, evidence, weights, policy);
    let credibility = agg.credibility();
    let band = classify(credibility, &policy.bands);
    let evidence_count = agg.contributions.len();

    let ex = explain(
        skill,
        agg.contributions,
        band,
        mode,
        weights,
        &policy.explain,
        &policy.strength,
    );

    histogram!(SCORE_HISTOGRAM).record(f64::from(credibility));
    debug!(
        skill = %skill.name,
        evidence_score = agg.evidence_score,
        expected_score = agg.expected_score,
        credibility,
        band = band.label(),
        "skill scored"
    );

    SkillScore {
        skill_ref: skill.name.clone(),
        category: skill.category,
        claim_level: skill.claim_level,
        evidence_score: agg.evidence_score,
        expected_score: agg.expected_score,
        credibility,
        band,
        overall_strength: ex.overall_strength,
        evidence_breakdown: ex.evidence_breakdown,
        contributing_evidence: ex.contributing_evidence,
        suggestions: ex.suggestions,
        rationale: ex.rationale,
        notes: ex.notes,
        evidence_count,
        duplicates_removed: agg.duplicates_removed,
    }
}

/// Expected-score-weighted mean of per-skill credibility; 0.0 for no skills.
pub fn overall_credibility(scores: &[SkillScore]) -> f32 {
    let (num, den) = scores.iter().fold((0.0f64, 0.0f64), |(n, d), s| {
        let e = f64::from(s.expected_score);
        (n + f64::from(s.credibility) * e, d + e)
    });
    if den <= 0.0 {
        0.0
    } else {
        ((num / den) as f32).clamp(0.0, 1.0)
    }
}
