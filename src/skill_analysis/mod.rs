// src/skill_analysis/mod.rs
use crate::error::Unavailable;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

pub mod gap_calculator;
pub mod job_recommendations;
pub mod learning;
pub mod market;
pub mod normalizer;

pub use gap_calculator::SkillGapAnalyzer;
pub use job_recommendations::{JobRecommender, ScoredJob};
pub use learning::learning_resources_for_skill;
pub use market::MarketAnalyzer;
pub use normalizer::{normalize_skill, SkillNormalizer};

/// Treats an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A list of skill names. Entries that are not strings are dropped.
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Vec<serde_json::Value> = null_as_default(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

/// Structured requirements, also accepting bare strings. Entries that fit
/// neither shape are dropped.
fn lenient_requirements<'de, D>(deserializer: D) -> Result<Vec<SkillRequirement>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Vec<serde_json::Value> = null_as_default(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::String(name) => Some(SkillRequirement { name, level: None }),
            other => serde_json::from_value::<SkillRequirement>(other).ok(),
        })
        .filter(|requirement| !requirement.name.trim().is_empty())
        .collect())
}

// ===== Search index records =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillRequirement {
    #[serde(default, alias = "skill_name", deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// A job posting as stored in the search index. Fields the analyzer does
/// not interpret are kept in `extra` and passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(rename = "objectID", default)]
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_uid: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_requirements")]
    pub required_skills: Vec<SkillRequirement>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl JobRecord {
    /// Normalized skills of this posting, merged from the plain list and the
    /// structured requirements, deduplicated in first-seen order.
    pub fn normalized_skills(&self) -> Vec<String> {
        let mut seen = Vec::new();
        let names = self
            .skills
            .iter()
            .map(String::as_str)
            .chain(self.required_skills.iter().map(|r| r.name.as_str()));

        for name in names {
            let skill = normalize_skill(name);
            if !skill.is_empty() && !seen.contains(&skill) {
                seen.push(skill);
            }
        }
        seen
    }
}

// ===== CMS records =====

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LearningResource {
    #[serde(default)]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills_covered: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub placeholder: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Company {
    pub fn placeholder(uid: &str) -> Self {
        Self {
            uid: uid.to_string(),
            title: "Unknown Company".to_string(),
            placeholder: true,
            extra: serde_json::Map::new(),
        }
    }
}

// ===== Derived analysis values =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillDemand {
    pub skill: String,
    pub job_count: u64,
    pub percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn from_percentage(percentage: u32, thresholds: &PriorityThresholds) -> Self {
        if percentage >= thresholds.high {
            Priority::High
        } else if percentage >= thresholds.medium {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    /// Sort key: lower means more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGap {
    pub skill: String,
    pub job_count: u64,
    pub percentage: u32,
    pub priority: Priority,
    pub potential_job_increase: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningRecommendation {
    pub skill: String,
    pub priority: Priority,
    pub jobs_unlocked: u64,
    pub learning_resources: Vec<LearningResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    pub total_jobs: u64,
    pub skill_demand: BTreeMap<String, u64>,
    pub top_skills: Vec<SkillDemand>,
}

/// Sub-queries whose failure was collapsed to a zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    JobCorpus,
    MatchCount,
    LearningResources,
    ProjectionCount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGapAnalysis {
    pub user_skills: Vec<String>,
    pub total_jobs: u64,
    pub matching_jobs: u64,
    pub match_percentage: u32,
    pub top_demanded_skills: Vec<SkillDemand>,
    pub skill_gaps: Vec<SkillGap>,
    pub recommendations: Vec<LearningRecommendation>,
    pub potential_match_after_learning: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable_sources: Vec<DataSource>,
}

// ===== Tunables =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityThresholds {
    pub high: u32,
    pub medium: u32,
}

impl Default for PriorityThresholds {
    fn default() -> Self {
        Self {
            high: 30,
            medium: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Records fetched in the single corpus page.
    pub corpus_limit: usize,
    /// Demanded skills considered when diffing against the user.
    pub scanned_skills: usize,
    /// Cap on `topDemandedSkills` and `skillGaps`.
    pub reported_skills: usize,
    pub recommended_gaps: usize,
    pub resources_per_skill: usize,
    pub projection_gaps: usize,
    pub thresholds: PriorityThresholds,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            corpus_limit: 1000,
            scanned_skills: 50,
            reported_skills: 10,
            recommended_gaps: 5,
            resources_per_skill: 3,
            projection_gaps: 3,
            thresholds: PriorityThresholds::default(),
        }
    }
}

// ===== Backend seams =====

/// Hosted job-posting search index.
#[rocket::async_trait]
pub trait JobIndex: Send + Sync {
    fn is_configured(&self) -> bool {
        true
    }

    /// Up to `limit` postings with their skill fields.
    async fn fetch_skill_corpus(&self, limit: usize) -> Result<Vec<JobRecord>, Unavailable>;

    /// Number of postings matching any of `terms`.
    async fn count_matching(&self, terms: &[String]) -> Result<u64, Unavailable>;

    /// Postings matching any of `terms`, in index relevance order.
    async fn search_optional(
        &self,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<JobRecord>, Unavailable>;
}

#[rocket::async_trait]
pub trait LearningCatalog: Send + Sync {
    fn is_configured(&self) -> bool {
        true
    }

    async fn learning_resources(&self) -> Result<Vec<LearningResource>, Unavailable>;
}

#[rocket::async_trait]
pub trait CompanyDirectory: Send + Sync {
    async fn company(&self, uid: &str) -> Result<Company, Unavailable>;
}
