//! # Explanation Generator
//! Orders contributing evidence and produces rationale, notes and (for
//! students) improvement suggestions tied to missing strength signals.
//!
//! Output vocabulary is limited to evidence-gap language. Every template
//! here is checked against [`FORBIDDEN_TERMS`] in tests.

use crate::classify::StrengthThresholds;
use crate::model::{ClaimedSkill, EvidenceSource, Mode, StrengthSignal};
use crate::policy::ExplainSettings;
use crate::report::{Band, ContributingEvidence, EvidenceStrength, SourceStrength};
use crate::weights::WeightTable;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Words that must never appear in generated text.
pub const FORBIDDEN_TERMS: [&str; 6] = ["liar", "fraud", "fake", "dishonest", "cheat", "lying"];

#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub contributing_evidence: Vec<ContributingEvidence>,
    pub evidence_breakdown: Vec<SourceStrength>,
    pub overall_strength: EvidenceStrength,
    pub suggestions: Vec<String>,
    pub rationale: String,
    pub notes: Vec<String>,
}

/// Descending contribution; ties by source priority
/// (ExternalProfile > Certification > Experience > Project), then input order.
pub fn order_contributions(mut items: Vec<ContributingEvidence>) -> Vec<ContributingEvidence> {
    // sort_by is stable, so equal keys keep input order
    items.sort_by(|a, b| {
        b.contribution
            .total_cmp(&a.contribution)
            .then_with(|| b.item.source.priority().cmp(&a.item.source.priority()))
    });
    items
}

/// Suggestion sentence for a missing signal. KeywordOnly is never suggested.
pub fn suggestion_template(signal: StrengthSignal, skill: &str) -> Option<String> {
    let s = match signal {
        StrengthSignal::MultipleImplementations => format!(
            "Add more projects that apply {skill} in different contexts to show breadth of use."
        ),
        StrengthSignal::TechnicalDocumentation => format!(
            "Document your {skill} work (README, design notes or a write-up of the technical approach)."
        ),
        StrengthSignal::EvaluationMetrics => format!(
            "Include evaluation metrics or measurable results (accuracy, benchmarks, performance numbers) for your {skill} work."
        ),
        StrengthSignal::ProfessionalUsage => format!(
            "Describe professional usage of {skill}, such as an internship or role where you applied it."
        ),
        StrengthSignal::TeamContext => format!(
            "Mention team settings where you used {skill} together with other contributors."
        ),
        StrengthSignal::ActivityLevel => format!(
            "Keep public repositories that use {skill} active on your code-hosting profile."
        ),
        StrengthSignal::LanguageDiversity => format!(
            "Show {skill} alongside a broader range of technologies in public repositories."
        ),
        StrengthSignal::KeywordOnly => return None,
    };
    Some(s)
}

/// Missing high-value signals ranked by the weight they would have added.
pub fn suggestions(
    skill: &ClaimedSkill,
    contributions: &[ContributingEvidence],
    weights: &WeightTable,
    settings: &ExplainSettings,
) -> Vec<String> {
    let present: BTreeSet<StrengthSignal> = contributions
        .iter()
        .flat_map(|c| c.item.strength_signals.iter().copied())
        .collect();

    let mut forgone: Vec<(StrengthSignal, f32)> = StrengthSignal::ALL
        .into_iter()
        .filter(|sig| *sig != StrengthSignal::KeywordOnly && !present.contains(sig))
        .map(|sig| (sig, weights.best_contribution(sig, skill.category)))
        .filter(|(_, w)| *w > 0.0 && *w >= settings.suggestion_min_weight)
        .collect();

    // StrengthSignal::ALL is already in declaration order; stable sort keeps it on ties.
    forgone.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    forgone
        .into_iter()
        .filter_map(|(sig, _)| suggestion_template(sig, &skill.name))
        .take(settings.max_suggestions)
        .collect()
}

/// Summed contribution per source, labelled. One entry for every source,
/// in declaration order, including the ones with no evidence.
pub fn source_breakdown(
    contributions: &[ContributingEvidence],
    thresholds: &StrengthThresholds,
) -> Vec<SourceStrength> {
    EvidenceSource::ALL
        .into_iter()
        .map(|source| {
            let points: f32 = contributions
                .iter()
                .filter(|c| c.item.source == source)
                .map(|c| c.contribution)
                .sum();
            SourceStrength {
                source,
                points,
                strength: thresholds.for_source(points),
            }
        })
        .collect()
}

/// One band-dependent sentence, then the strong and moderate sources,
/// strongest first.
pub fn rationale(skill: &ClaimedSkill, band: Band, breakdown: &[SourceStrength]) -> String {
    let level = skill.claim_level.to_string().to_lowercase();
    let name = &skill.name;
    let mut out = match band {
        Band::Authentic => format!(
            "'{name}' is claimed at {level} level and is well supported by the evidence found."
        ),
        Band::PartiallySupported => format!(
            "'{name}' is claimed at {level} level with moderate evidence; the depth of evidence could be stronger."
        ),
        Band::LikelyInflated => format!(
            "'{name}' is claimed at {level} level but the evidence found is limited; the claim goes beyond what is currently demonstrated."
        ),
    };

    let mut ranked: Vec<&SourceStrength> = breakdown.iter().filter(|b| b.points > 0.0).collect();
    if ranked.is_empty() {
        out.push_str(" No supporting evidence was found in the provided sections.");
        return out;
    }
    ranked.sort_by(|a, b| {
        b.points
            .total_cmp(&a.points)
            .then_with(|| b.source.priority().cmp(&a.source.priority()))
    });

    let labelled = |strength: EvidenceStrength| -> Vec<&'static str> {
        ranked
            .iter()
            .filter(|b| b.strength == strength)
            .map(|b| b.source.label())
            .collect()
    };
    let strong = labelled(EvidenceStrength::Strong);
    let moderate = labelled(EvidenceStrength::Moderate);

    if !strong.is_empty() {
        out.push_str(&format!(" Strong evidence found in: {}.", strong.join(", ")));
    }
    if !moderate.is_empty() {
        out.push_str(&format!(" Moderate evidence found in: {}.", moderate.join(", ")));
    }
    if strong.is_empty() && moderate.is_empty() {
        out.push_str(" Limited concrete evidence across all sources.");
    }
    out
}

fn low_evidence_note(count: usize) -> String {
    match count {
        0 => "No evidence items were found for this skill; the score reflects missing evidence, not a judgement of ability.".to_string(),
        1 => "Only 1 evidence item was found for this skill, so the score rests on limited evidence.".to_string(),
        n => format!("Only {n} evidence items were found for this skill, so the score rests on limited evidence."),
    }
}

/// Full explanation for one scored skill.
pub fn explain(
    skill: &ClaimedSkill,
    contributions: Vec<ContributingEvidence>,
    band: Band,
    mode: Mode,
    weights: &WeightTable,
    settings: &ExplainSettings,
    strength: &StrengthThresholds,
) -> Explanation {
    let ordered = order_contributions(contributions);
    let evidence_breakdown = source_breakdown(&ordered, strength);
    let total: f32 = ordered.iter().map(|c| c.contribution).sum();

    let suggestions = if band != Band::Authentic && mode == Mode::Student {
        suggestions(skill, &ordered, weights, settings)
    } else {
        Vec::new()
    };

    let mut notes = Vec::new();
    if ordered.len() <= settings.low_evidence_count {
        notes.push(low_evidence_note(ordered.len()));
    }

    Explanation {
        rationale: rationale(skill, band, &evidence_breakdown),
        overall_strength: strength.overall(total),
        evidence_breakdown,
        contributing_evidence: ordered,
        suggestions,
        notes,
    }
}

/// True when `text` contains none of [`FORBIDDEN_TERMS`] as a whole word.
pub fn is_non_judgmental(text: &str) -> bool {
    let lower = text.to_lowercase();
    !lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| FORBIDDEN_TERMS.contains(&word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClaimLevel, EvidenceItem, SkillCategory};
    use StrengthSignal::*;

    fn ce(source: EvidenceSource, contribution: f32, excerpt: &str) -> ContributingEvidence {
        ContributingEvidence {
            item: EvidenceItem::new("X", source, [KeywordOnly], excerpt),
            contribution,
        }
    }

    fn deep_learning() -> ClaimedSkill {
        ClaimedSkill::new("Deep Learning", SkillCategory::ML, ClaimLevel::Advanced)
    }

    #[test]
    fn ordering_by_contribution_then_source_priority_then_input() {
        let ordered = order_contributions(vec![
            ce(EvidenceSource::Project, 30.0, "p1"),
            ce(EvidenceSource::ExternalProfile, 30.0, "gh"),
            ce(EvidenceSource::Experience, 38.5, "job"),
            ce(EvidenceSource::Project, 30.0, "p2"),
        ]);
        let excerpts: Vec<&str> = ordered.iter().map(|c| c.item.raw_excerpt.as_str()).collect();
        assert_eq!(excerpts, vec!["job", "gh", "p1", "p2"]);
    }

    #[test]
    fn suggestions_ranked_by_forgone_weight_and_capped() {
        let w = WeightTable::default_seed();
        let settings = ExplainSettings::default();
        let contributions = vec![ContributingEvidence {
            item: EvidenceItem::new(
                "Deep Learning",
                EvidenceSource::Project,
                [MultipleImplementations, TechnicalDocumentation],
                "",
            ),
            contribution: 30.0,
        }];
        let s = suggestions(&deep_learning(), &contributions, &w, &settings);
        assert_eq!(s.len(), 3);
        assert!(s[0].contains("evaluation metrics"));
        assert!(s[1].contains("professional usage"));
        assert!(s[2].contains("active"));
    }

    #[test]
    fn min_weight_filters_low_value_signals() {
        let w = WeightTable::default_seed();
        let settings = ExplainSettings {
            max_suggestions: 10,
            suggestion_min_weight: 30.0,
            low_evidence_count: 1,
        };
        let s = suggestions(&deep_learning(), &[], &w, &settings);
        // TeamContext (27.5) and LanguageDiversity (24) fall below 30
        assert!(s.iter().all(|t| !t.contains("team settings")));
        assert!(s.iter().all(|t| !t.contains("broader range")));
        assert!(!s.is_empty());
    }

    #[test]
    fn no_suggestions_in_hr_mode_or_when_authentic() {
        let w = WeightTable::default_seed();
        let settings = ExplainSettings::default();
        let skill = deep_learning();
        let t = StrengthThresholds::default();
        let hr = explain(&skill, vec![], Band::LikelyInflated, Mode::HR, &w, &settings, &t);
        assert!(hr.suggestions.is_empty());
        let ok = explain(&skill, vec![], Band::Authentic, Mode::Student, &w, &settings, &t);
        assert!(ok.suggestions.is_empty());
        let student = explain(&skill, vec![], Band::LikelyInflated, Mode::Student, &w, &settings, &t);
        assert!(!student.suggestions.is_empty());
    }

    #[test]
    fn low_evidence_adds_note() {
        let w = WeightTable::default_seed();
        let settings = ExplainSettings::default();
        let e = explain(
            &deep_learning(),
            vec![ce(EvidenceSource::Project, 10.0, "")],
            Band::LikelyInflated,
            Mode::HR,
            &w,
            &settings,
            &StrengthThresholds::default(),
        );
        assert_eq!(e.notes.len(), 1);
        assert!(e.notes[0].contains("limited evidence"));
    }

    fn breakdown_of(contributions: &[ContributingEvidence]) -> Vec<SourceStrength> {
        source_breakdown(contributions, &StrengthThresholds::default())
    }

    #[test]
    fn breakdown_sums_points_per_source() {
        let b = breakdown_of(&[
            ce(EvidenceSource::Project, 10.0, "p1"),
            ce(EvidenceSource::Project, 10.0, "p2"),
            ce(EvidenceSource::Experience, 38.5, "job"),
        ]);
        let sources: Vec<EvidenceSource> = b.iter().map(|s| s.source).collect();
        assert_eq!(sources, EvidenceSource::ALL.to_vec());
        assert_eq!(b[0].points, 20.0);
        assert_eq!(b[0].strength, EvidenceStrength::Moderate);
        assert_eq!(b[1].strength, EvidenceStrength::Strong);
        assert_eq!(b[2].strength, EvidenceStrength::NoEvidence);
        assert_eq!(b[3].strength, EvidenceStrength::NoEvidence);
    }

    #[test]
    fn rationale_separates_strong_and_moderate_sources() {
        let b = breakdown_of(&[
            ce(EvidenceSource::Project, 20.0, ""),
            ce(EvidenceSource::Experience, 38.5, ""),
            ce(EvidenceSource::ExternalProfile, 36.0, ""),
            ce(EvidenceSource::Certification, 12.0, ""),
        ]);
        let r = rationale(&deep_learning(), Band::PartiallySupported, &b);
        assert!(r.starts_with("'Deep Learning' is claimed at advanced level"));
        assert!(r.contains(
            " Strong evidence found in: work experience, external profile."
        ));
        assert!(r.ends_with(" Moderate evidence found in: projects."));
        assert!(!r.contains("certifications"), "weak sources are not listed");
    }

    #[test]
    fn rationale_for_weak_only_and_for_nothing() {
        let weak = breakdown_of(&[ce(EvidenceSource::Project, 10.0, "")]);
        let r = rationale(&deep_learning(), Band::LikelyInflated, &weak);
        assert!(r.ends_with(" Limited concrete evidence across all sources."));

        let none = breakdown_of(&[]);
        let r = rationale(&deep_learning(), Band::LikelyInflated, &none);
        assert!(r.ends_with(" No supporting evidence was found in the provided sections."));
    }

    #[test]
    fn overall_strength_uses_summed_points() {
        let e = explain(
            &deep_learning(),
            vec![
                ce(EvidenceSource::Experience, 38.5, ""),
                ce(EvidenceSource::ExternalProfile, 36.0, ""),
            ],
            Band::Authentic,
            Mode::HR,
            &WeightTable::default_seed(),
            &ExplainSettings::default(),
            &StrengthThresholds::default(),
        );
        assert_eq!(e.overall_strength, EvidenceStrength::Strong);
        assert_eq!(e.evidence_breakdown.len(), EvidenceSource::ALL.len());
    }

    #[test]
    fn generated_text_is_non_judgmental() {
        let skill = deep_learning();
        let mut texts: Vec<String> = StrengthSignal::ALL
            .into_iter()
            .filter_map(|s| suggestion_template(s, &skill.name))
            .collect();
        let weak = breakdown_of(&[ce(EvidenceSource::Project, 10.0, "")]);
        let mixed = breakdown_of(&[
            ce(EvidenceSource::Project, 20.0, ""),
            ce(EvidenceSource::Experience, 38.5, ""),
        ]);
        for band in [Band::Authentic, Band::PartiallySupported, Band::LikelyInflated] {
            texts.push(rationale(&skill, band, &[]));
            texts.push(rationale(&skill, band, &weak));
            texts.push(rationale(&skill, band, &mixed));
        }
        for n in 0..3 {
            texts.push(low_evidence_note(n));
        }
        for t in &texts {
            assert!(is_non_judgmental(t), "judgmental wording in: {t}");
        }
        assert!(!is_non_judgmental("This looks like a FAKE claim"));
    }
}
