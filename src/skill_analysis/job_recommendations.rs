// src/skill_analysis/job_recommendations.rs
use super::gap_calculator::normalized_user_skills;
use super::{Company, CompanyDirectory, JobIndex, JobRecord};
use crate::error::Unavailable;
use crate::utils::skills_overlap;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{info, warn};

pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 6;

/// Keys `ScoredJob` writes itself; copies passed through from the index are dropped.
const SCORED_KEYS: &[&str] = &["company", "matchScore", "matchingSkillsCount"];

/// A search hit re-scored by the fraction of the user's skills it covers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredJob {
    #[serde(flatten)]
    pub job: JobRecord,
    pub match_score: f64,
    pub matching_skills_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
}

pub struct JobRecommender {
    index: Arc<dyn JobIndex>,
    companies: Arc<dyn CompanyDirectory>,
}

impl JobRecommender {
    pub fn new(index: Arc<dyn JobIndex>, companies: Arc<dyn CompanyDirectory>) -> Self {
        Self { index, companies }
    }

    pub fn is_search_configured(&self) -> bool {
        self.index.is_configured()
    }

    /// Postings matching any of the user's skills, best coverage first.
    pub async fn search(
        &self,
        user_skills: &[String],
        limit: usize,
    ) -> Result<Vec<ScoredJob>, Unavailable> {
        let terms = normalized_user_skills(user_skills);
        if terms.is_empty() {
            return Ok(Vec::new());
        }
        let hits = self.index.search_optional(&terms, limit).await?;
        Ok(score_jobs(hits, &terms))
    }

    /// Like [`search`](Self::search) but degrades to an empty list and
    /// attaches company details.
    pub async fn recommend_jobs(&self, user_skills: &[String], limit: usize) -> Vec<ScoredJob> {
        let jobs = match self.search(user_skills, limit).await {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!("Job recommendations unavailable: {}", e);
                return Vec::new();
            }
        };
        info!(
            "Found {} job recommendations for {} skills",
            jobs.len(),
            user_skills.len()
        );
        self.enrich_with_companies(jobs).await
    }

    /// Look companies up in parallel. A failed lookup leaves a placeholder
    /// instead of failing the batch.
    pub async fn enrich_with_companies(&self, mut jobs: Vec<ScoredJob>) -> Vec<ScoredJob> {
        let mut lookups = JoinSet::new();

        for (position, scored) in jobs.iter_mut().enumerate() {
            if let Some(uid) = scored.job.company_uid.clone() {
                scored.company = Some(Company::placeholder(&uid));
                let directory = Arc::clone(&self.companies);
                lookups.spawn(async move {
                    let result = directory.company(&uid).await;
                    (position, uid, result)
                });
            }
        }

        while let Some(joined) = lookups.join_next().await {
            match joined {
                Ok((position, _, Ok(company))) => jobs[position].company = Some(company),
                Ok((_, uid, Err(e))) => warn!("Company lookup for {} failed: {}", uid, e),
                Err(e) => warn!("Company lookup task aborted: {}", e),
            }
        }
        jobs
    }
}

/// Score each job by the share of `normalized_skills` it loosely covers and
/// sort best first. Equal scores keep index order.
pub fn score_jobs(jobs: Vec<JobRecord>, normalized_skills: &[String]) -> Vec<ScoredJob> {
    let mut scored: Vec<ScoredJob> = jobs
        .into_iter()
        .map(|mut job| {
            for key in SCORED_KEYS {
                job.extra.remove(*key);
            }
            let job_skills = job.normalized_skills();
            let matching_skills_count = normalized_skills
                .iter()
                .filter(|user_skill| {
                    job_skills
                        .iter()
                        .any(|job_skill| skills_overlap(user_skill, job_skill))
                })
                .count();
            let match_score = if normalized_skills.is_empty() {
                0.0
            } else {
                matching_skills_count as f64 / normalized_skills.len() as f64
            };
            ScoredJob {
                job,
                match_score,
                matching_skills_count,
                company: None,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    scored
}
