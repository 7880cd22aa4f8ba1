//! External-profile evidence.
//!
//! Turns an already fetched code-hosting profile snapshot into
//! `ExternalProfile` evidence items, one per claimed skill that shows up among
//! repository languages or topics. Fetching is not done here; callers hand in
//! the snapshot (or nothing, in which case no profile evidence exists).

use crate::model::{canonical_key, ClaimedSkill, EvidenceItem, EvidenceSource, StrengthSignal};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const TOP_LANGUAGES: usize = 5;
const DIVERSE_LANGUAGE_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, alias = "stargazers_count")]
    pub stars: u32,
    #[serde(default, alias = "forks_count")]
    pub forks: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub profile_url: Option<String>,
    #[serde(default)]
    pub repositories: Vec<RepoSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActivityLevel {
    None,
    Low,
    Moderate,
    High,
}

impl ActivityLevel {
    pub fn from_counts(repo_count: usize, total_stars: u64) -> Self {
        if repo_count >= 10 && total_stars >= 50 {
            ActivityLevel::High
        } else if repo_count >= 5 && total_stars >= 10 {
            ActivityLevel::Moderate
        } else if repo_count >= 1 {
            ActivityLevel::Low
        } else {
            ActivityLevel::None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileStats {
    pub repo_count: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub activity: ActivityLevel,
    pub distinct_languages: usize,
    /// Most used languages, by repo count desc then name.
    pub top_languages: Vec<(String, usize)>,
}

/// Profile facts reported next to the scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    #[serde(default)]
    pub username: Option<String>,
    pub activity: ActivityLevel,
    pub repo_count: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    #[serde(default)]
    pub top_languages: Vec<String>,
}

/// Username from a profile URL such as `https://github.com/octo-cat/`.
pub fn username_from_url(url: &str) -> Option<String> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"github\.com/([A-Za-z0-9_-]+)").expect("username pattern is valid")
    });
    re.captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

impl ProfileSnapshot {
    /// Explicit username, else one parsed from `profile_url`.
    pub fn resolved_username(&self) -> Option<String> {
        self.username
            .clone()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| self.profile_url.as_deref().and_then(username_from_url))
    }

    pub fn stats(&self) -> ProfileStats {
        let mut languages: BTreeMap<&str, usize> = BTreeMap::new();
        for lang in self.repositories.iter().filter_map(|r| r.language.as_deref()) {
            *languages.entry(lang).or_default() += 1;
        }
        let distinct_languages = languages.len();

        let mut top: Vec<(String, usize)> = languages
            .into_iter()
            .map(|(l, n)| (l.to_string(), n))
            .collect();
        // BTreeMap order gives the name tie-break for free
        top.sort_by(|a, b| b.1.cmp(&a.1));
        top.truncate(TOP_LANGUAGES);

        let total_stars: u64 = self.repositories.iter().map(|r| u64::from(r.stars)).sum();
        let total_forks: u64 = self.repositories.iter().map(|r| u64::from(r.forks)).sum();

        ProfileStats {
            repo_count: self.repositories.len(),
            total_stars,
            total_forks,
            activity: ActivityLevel::from_counts(self.repositories.len(), total_stars),
            distinct_languages,
            top_languages: top,
        }
    }

    pub fn summary(&self) -> ProfileSummary {
        let stats = self.stats();
        ProfileSummary {
            username: self.resolved_username(),
            activity: stats.activity,
            repo_count: stats.repo_count,
            total_stars: stats.total_stars,
            total_forks: stats.total_forks,
            top_languages: stats.top_languages.into_iter().map(|(l, _)| l).collect(),
        }
    }

    /// Repositories whose language or topics name the skill.
    fn repos_mentioning(&self, skill_key: &str) -> usize {
        self.repositories
            .iter()
            .filter(|r| {
                r.language
                    .as_deref()
                    .is_some_and(|l| canonical_key(l) == skill_key)
                    || r.topics.iter().any(|t| canonical_key(t) == skill_key)
            })
            .count()
    }
}

/// One `ExternalProfile` evidence item per claimed skill found in the profile.
pub fn evidence_for(snapshot: &ProfileSnapshot, claims: &[ClaimedSkill]) -> Vec<EvidenceItem> {
    let stats = snapshot.stats();
    let mut out = Vec::new();

    for claim in claims {
        let repos = snapshot.repos_mentioning(&claim.key());
        if repos == 0 {
            continue;
        }

        let mut signals = BTreeSet::new();
        if stats.activity >= ActivityLevel::Moderate {
            signals.insert(StrengthSignal::ActivityLevel);
        }
        if repos >= 2 {
            signals.insert(StrengthSignal::MultipleImplementations);
        }
        if stats.distinct_languages >= DIVERSE_LANGUAGE_COUNT {
            signals.insert(StrengthSignal::LanguageDiversity);
        }
        if signals.is_empty() {
            signals.insert(StrengthSignal::KeywordOnly);
        }

        let noun = if repos == 1 { "repository" } else { "repositories" };
        out.push(EvidenceItem {
            skill_ref: claim.name.clone(),
            source: EvidenceSource::ExternalProfile,
            strength_signals: signals,
            raw_excerpt: format!("Used in {repos} public {noun}"),
        });
    }

    tracing::debug!(
        repos = stats.repo_count,
        activity = ?stats.activity,
        items = out.len(),
        "derived external profile evidence"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClaimLevel, SkillCategory};

    fn repo(name: &str, lang: Option<&str>, topics: &[&str], stars: u32) -> RepoSummary {
        RepoSummary {
            name: name.into(),
            language: lang.map(str::to_string),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            stars,
            forks: 0,
        }
    }

    fn busy_profile() -> ProfileSnapshot {
        let mut repos = vec![
            repo("a", Some("Python"), &["deep-learning"], 20),
            repo("b", Some("Python"), &[], 20),
            repo("c", Some("Rust"), &[], 5),
            repo("d", Some("TypeScript"), &["react"], 5),
        ];
        for i in 0..6 {
            repos.push(repo(&format!("misc{i}"), None, &[], 1));
        }
        ProfileSnapshot {
            username: None,
            profile_url: Some("https://github.com/jane-doe".into()),
            repositories: repos,
        }
    }

    #[test]
    fn activity_thresholds() {
        assert_eq!(ActivityLevel::from_counts(10, 50), ActivityLevel::High);
        assert_eq!(ActivityLevel::from_counts(10, 49), ActivityLevel::Moderate);
        assert_eq!(ActivityLevel::from_counts(5, 10), ActivityLevel::Moderate);
        assert_eq!(ActivityLevel::from_counts(4, 100), ActivityLevel::Low);
        assert_eq!(ActivityLevel::from_counts(0, 0), ActivityLevel::None);
    }

    #[test]
    fn username_parsing() {
        assert_eq!(
            username_from_url("https://github.com/jane_doe-42?tab=repositories").as_deref(),
            Some("jane_doe-42")
        );
        assert_eq!(username_from_url("https://example.com/jane"), None);
        assert_eq!(busy_profile().resolved_username().as_deref(), Some("jane-doe"));
    }

    #[test]
    fn stats_summarize_repositories() {
        let s = busy_profile().stats();
        assert_eq!(s.repo_count, 10);
        assert_eq!(s.total_stars, 56);
        assert_eq!(s.activity, ActivityLevel::High);
        assert_eq!(s.distinct_languages, 3);
        assert_eq!(s.top_languages[0], ("Python".to_string(), 2));
    }

    #[test]
    fn summary_names_user_and_languages() {
        let mut snap = busy_profile();
        snap.repositories[0].forks = 3;
        let s = snap.summary();
        assert_eq!(s.username.as_deref(), Some("jane-doe"));
        assert_eq!(s.activity, ActivityLevel::High);
        assert_eq!(s.repo_count, 10);
        assert_eq!(s.total_forks, 3);
        assert_eq!(s.top_languages, vec!["Python", "Rust", "TypeScript"]);

        snap.username = Some("jd".into());
        assert_eq!(snap.summary().username.as_deref(), Some("jd"));
    }

    #[test]
    fn evidence_signals_follow_profile_shape() {
        let claims = vec![
            ClaimedSkill::new("Python", SkillCategory::Programming, ClaimLevel::Advanced),
            ClaimedSkill::new("Deep Learning", SkillCategory::ML, ClaimLevel::Advanced),
            ClaimedSkill::new("Go", SkillCategory::Programming, ClaimLevel::Basic),
        ];
        let items = evidence_for(&busy_profile(), &claims);
        assert_eq!(items.len(), 2, "Go is absent from the profile");

        let py = &items[0];
        assert_eq!(py.source, EvidenceSource::ExternalProfile);
        assert!(py.strength_signals.contains(&StrengthSignal::ActivityLevel));
        assert!(py
            .strength_signals
            .contains(&StrengthSignal::MultipleImplementations));
        assert!(py.strength_signals.contains(&StrengthSignal::LanguageDiversity));

        let dl = &items[1];
        assert_eq!(dl.skill_ref, "Deep Learning");
        assert!(!dl
            .strength_signals
            .contains(&StrengthSignal::MultipleImplementations));
    }

    #[test]
    fn quiet_profile_yields_keyword_only() {
        let snap = ProfileSnapshot {
            repositories: vec![repo("x", Some("Python"), &[], 0)],
            ..ProfileSnapshot::default()
        };
        let claims = vec![ClaimedSkill::new(
            "python",
            SkillCategory::Programming,
            ClaimLevel::Basic,
        )];
        let items = evidence_for(&snap, &claims);
        assert_eq!(
            items[0].strength_signals.iter().copied().collect::<Vec<_>>(),
            vec![StrengthSignal::KeywordOnly]
        );
    }
}
