// src/skill_analysis/market.rs
use super::{AnalysisSettings, JobIndex, JobRecord, MarketAnalysis, SkillDemand};
use crate::error::Unavailable;
use crate::utils::percentage;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tallies how many postings ask for each skill across the indexed corpus.
pub struct MarketAnalyzer {
    index: Arc<dyn JobIndex>,
    settings: AnalysisSettings,
}

impl MarketAnalyzer {
    pub fn new(index: Arc<dyn JobIndex>, settings: AnalysisSettings) -> Self {
        Self { index, settings }
    }

    /// Corpus scan that keeps the backend failure.
    pub async fn scan(&self) -> Result<MarketAnalysis, Unavailable> {
        let jobs = self
            .index
            .fetch_skill_corpus(self.settings.corpus_limit)
            .await?;
        debug!("Fetched {} postings for market scan", jobs.len());

        let analysis = tally_skill_demand(&jobs, self.settings.scanned_skills);
        info!(
            "Market scan: {} postings, {} distinct skills",
            analysis.total_jobs,
            analysis.skill_demand.len()
        );
        Ok(analysis)
    }

    /// Corpus scan that never fails. An all-zero result means market data
    /// was unavailable, not that nothing is in demand.
    pub async fn analyze_job_market(&self) -> MarketAnalysis {
        match self.scan().await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Job market data unavailable: {}", e);
                MarketAnalysis::default()
            }
        }
    }
}

/// Count each normalized skill at most once per posting and rank the
/// `top_n` most frequent. Equal counts keep first-seen order.
pub fn tally_skill_demand(jobs: &[JobRecord], top_n: usize) -> MarketAnalysis {
    let total_jobs = jobs.len() as u64;
    let mut order: Vec<(String, u64)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for job in jobs {
        for skill in job.normalized_skills() {
            match positions.get(&skill) {
                Some(&pos) => order[pos].1 += 1,
                None => {
                    positions.insert(skill.clone(), order.len());
                    order.push((skill, 1));
                }
            }
        }
    }

    let skill_demand: BTreeMap<String, u64> = order.iter().cloned().collect();

    order.sort_by(|a, b| b.1.cmp(&a.1));
    let top_skills = order
        .into_iter()
        .take(top_n)
        .map(|(skill, job_count)| SkillDemand {
            percentage: percentage(job_count, total_jobs),
            skill,
            job_count,
        })
        .collect();

    MarketAnalysis {
        total_jobs,
        skill_demand,
        top_skills,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory_index::MemoryIndex;
    use crate::core::search_client::SearchBackend;

    fn job(id: &str, skills: &[&str]) -> JobRecord {
        JobRecord {
            object_id: id.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_tally_counts_once_per_job() {
        let jobs = vec![
            job("1", &["React", "react", "Docker"]),
            job("2", &["react"]),
            job("3", &["Go"]),
            job("4", &[]),
        ];
        let analysis = tally_skill_demand(&jobs, 50);

        assert_eq!(analysis.total_jobs, 4);
        assert_eq!(analysis.skill_demand["react"], 2);
        assert_eq!(analysis.skill_demand["docker"], 1);
        assert_eq!(analysis.top_skills[0].skill, "react");
        assert_eq!(analysis.top_skills[0].percentage, 50);
        // ties keep first-seen order
        assert_eq!(analysis.top_skills[1].skill, "docker");
        assert_eq!(analysis.top_skills[2].skill, "go");
    }

    #[test]
    fn test_tally_limits_top_skills() {
        let jobs = vec![job("1", &["a", "b", "c", "d"])];
        let analysis = tally_skill_demand(&jobs, 2);
        assert_eq!(analysis.top_skills.len(), 2);
        assert_eq!(analysis.skill_demand.len(), 4);
    }

    #[test]
    fn test_tally_empty_corpus() {
        let analysis = tally_skill_demand(&[], 50);
        assert_eq!(analysis, MarketAnalysis::default());
    }

    #[tokio::test]
    async fn test_unconfigured_backend_yields_zero_value() {
        let analyzer = MarketAnalyzer::new(
            Arc::new(SearchBackend::Unconfigured),
            AnalysisSettings::default(),
        );
        assert!(analyzer.scan().await.unwrap_err().is_not_configured());
        assert_eq!(analyzer.analyze_job_market().await, MarketAnalysis::default());
    }

    #[tokio::test]
    async fn test_scan_respects_corpus_limit() {
        let jobs = (0..20).map(|i| job(&i.to_string(), &["rust"])).collect();
        let settings = AnalysisSettings {
            corpus_limit: 5,
            ..Default::default()
        };
        let analyzer = MarketAnalyzer::new(Arc::new(MemoryIndex::new(jobs)), settings);

        let analysis = analyzer.analyze_job_market().await;
        assert_eq!(analysis.total_jobs, 5);
        assert_eq!(analysis.top_skills[0].percentage, 100);
    }
}
