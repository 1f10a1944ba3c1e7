// src/core/memory_index.rs
//! File-backed stand-ins for the hosted services, used by the CLI to run
//! analyses against local JSON exports.

use crate::error::Unavailable;
use crate::skill_analysis::normalizer::normalize_skill;
use crate::skill_analysis::{
    Company, CompanyDirectory, JobIndex, JobRecord, LearningCatalog, LearningResource,
};
use crate::utils::skills_overlap;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Exports come either as a bare array or wrapped like an API reply.
#[derive(Deserialize)]
#[serde(untagged)]
enum Export<T> {
    List(Vec<T>),
    Hits { hits: Vec<T> },
    Entries { entries: Vec<T> },
}

impl<T> Export<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Export::List(items) | Export::Hits { hits: items } | Export::Entries { entries: items } => {
                items
            }
        }
    }
}

fn load_export<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let export: Export<T> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON export: {}", path.display()))?;
    Ok(export.into_vec())
}

#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    jobs: Vec<JobRecord>,
}

impl MemoryIndex {
    pub fn new(jobs: Vec<JobRecord>) -> Self {
        Self { jobs }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let jobs = load_export(path)?;
        info!("Loaded {} postings from {}", jobs.len(), path.display());
        Ok(Self::new(jobs))
    }

    /// Any term loosely matches a posting skill or appears in its title.
    fn matches(job: &JobRecord, terms: &[String]) -> bool {
        let skills = job.normalized_skills();
        let title = job.title.as_deref().map(normalize_skill).unwrap_or_default();
        terms.iter().map(|t| normalize_skill(t)).any(|term| {
            skills.iter().any(|skill| skills_overlap(&term, skill))
                || (!term.is_empty() && title.contains(&term))
        })
    }

    fn matching<'a>(&'a self, terms: &'a [String]) -> impl Iterator<Item = &'a JobRecord> + 'a {
        self.jobs
            .iter()
            .filter(move |job| terms.is_empty() || Self::matches(job, terms))
    }
}

#[rocket::async_trait]
impl JobIndex for MemoryIndex {
    async fn fetch_skill_corpus(&self, limit: usize) -> Result<Vec<JobRecord>, Unavailable> {
        Ok(self.jobs.iter().take(limit).cloned().collect())
    }

    async fn count_matching(&self, terms: &[String]) -> Result<u64, Unavailable> {
        Ok(self.matching(terms).count() as u64)
    }

    async fn search_optional(
        &self,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<JobRecord>, Unavailable> {
        Ok(self.matching(terms).take(limit).cloned().collect())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    resources: Vec<LearningResource>,
    companies: Vec<Company>,
}

impl MemoryCatalog {
    pub fn new(resources: Vec<LearningResource>) -> Self {
        Self {
            resources,
            companies: Vec::new(),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let resources = load_export(path)?;
        info!(
            "Loaded {} learning resources from {}",
            resources.len(),
            path.display()
        );
        Ok(Self::new(resources))
    }

    pub fn with_companies(mut self, companies: Vec<Company>) -> Self {
        self.companies = companies;
        self
    }
}

#[rocket::async_trait]
impl LearningCatalog for MemoryCatalog {
    async fn learning_resources(&self) -> Result<Vec<LearningResource>, Unavailable> {
        Ok(self.resources.clone())
    }
}

#[rocket::async_trait]
impl CompanyDirectory for MemoryCatalog {
    async fn company(&self, uid: &str) -> Result<Company, Unavailable> {
        self.companies
            .iter()
            .find(|c| c.uid == uid)
            .cloned()
            .ok_or_else(|| Unavailable::Status {
                service: "memory",
                status: 404,
                body: format!("company {} not found", uid),
            })
    }
}
