// src/skill_analysis/gap_calculator.rs
use super::learning::learning_resources_for_skill;
use super::market::MarketAnalyzer;
use super::normalizer::{normalize_skill, SkillNormalizer};
use super::{
    AnalysisSettings, DataSource, JobIndex, LearningCatalog, LearningRecommendation, Priority,
    PriorityThresholds, SkillDemand, SkillGap, SkillGapAnalysis,
};
use crate::error::Unavailable;
use crate::utils::{bounded_percentage, skills_overlap};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Compares a user's skills against market demand and suggests what to
/// learn next.
pub struct SkillGapAnalyzer {
    index: Arc<dyn JobIndex>,
    catalog: Arc<dyn LearningCatalog>,
    normalizer: Arc<SkillNormalizer>,
    market: MarketAnalyzer,
    settings: AnalysisSettings,
}

impl SkillGapAnalyzer {
    pub fn new(
        index: Arc<dyn JobIndex>,
        catalog: Arc<dyn LearningCatalog>,
        normalizer: Arc<SkillNormalizer>,
        settings: AnalysisSettings,
    ) -> Self {
        let market = MarketAnalyzer::new(Arc::clone(&index), settings.clone());
        Self {
            index,
            catalog,
            normalizer,
            market,
            settings,
        }
    }

    pub fn market(&self) -> &MarketAnalyzer {
        &self.market
    }

    pub fn is_search_configured(&self) -> bool {
        self.index.is_configured()
    }

    /// Always returns a complete analysis. Failed sub-queries count as zero
    /// and are listed in `unavailable_sources`.
    pub async fn analyze_skill_gaps(&self, user_skills: &[String]) -> SkillGapAnalysis {
        let request_id = Uuid::new_v4();
        let span = info_span!("skill_gap", %request_id, skills = user_skills.len());
        self.run(user_skills).instrument(span).await
    }

    async fn run(&self, user_skills: &[String]) -> SkillGapAnalysis {
        let user_skills: Vec<String> = user_skills
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let normalized = normalized_user_skills(&user_skills);

        let (market, matching, resources) = tokio::join!(
            self.market.scan(),
            self.count_matching(&normalized),
            self.catalog.learning_resources(),
        );

        let mut unavailable = Vec::new();
        let market = settle(market, DataSource::JobCorpus, &mut unavailable);
        let matching_jobs = settle(matching, DataSource::MatchCount, &mut unavailable);
        let resources = settle(resources, DataSource::LearningResources, &mut unavailable);

        let gaps = compute_skill_gaps(&market.top_skills, &normalized, &self.settings.thresholds);

        let recommendations = gaps
            .iter()
            .take(self.settings.recommended_gaps)
            .map(|gap| LearningRecommendation {
                skill: gap.skill.clone(),
                priority: gap.priority,
                jobs_unlocked: gap.potential_job_increase,
                learning_resources: learning_resources_for_skill(
                    &gap.skill,
                    &resources,
                    &self.normalizer,
                    self.settings.resources_per_skill,
                ),
            })
            .collect();

        let mut projected_terms = normalized.clone();
        projected_terms.extend(
            gaps.iter()
                .take(self.settings.projection_gaps)
                .map(|gap| gap.skill.clone()),
        );
        let projected = settle(
            self.count_matching(&projected_terms).await,
            DataSource::ProjectionCount,
            &mut unavailable,
        );

        let total_jobs = market.total_jobs;
        let analysis = SkillGapAnalysis {
            user_skills,
            total_jobs,
            matching_jobs,
            match_percentage: bounded_percentage(matching_jobs, total_jobs),
            top_demanded_skills: market
                .top_skills
                .into_iter()
                .take(self.settings.reported_skills)
                .collect(),
            skill_gaps: gaps
                .into_iter()
                .take(self.settings.reported_skills)
                .collect(),
            recommendations,
            potential_match_after_learning: bounded_percentage(projected, total_jobs),
            unavailable_sources: unavailable,
        };

        info!(
            "Skill gap analysis: {}% match ({} of {}), {} gaps, projected {}%",
            analysis.match_percentage,
            analysis.matching_jobs,
            analysis.total_jobs,
            analysis.skill_gaps.len(),
            analysis.potential_match_after_learning
        );
        analysis
    }

    /// Count of postings mentioning any of `terms`. No terms means no match.
    async fn count_matching(&self, terms: &[String]) -> Result<u64, Unavailable> {
        if terms.is_empty() {
            return Ok(0);
        }
        self.index.count_matching(terms).await
    }
}

fn settle<T: Default>(
    result: Result<T, Unavailable>,
    source: DataSource,
    unavailable: &mut Vec<DataSource>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("{:?} unavailable, counting as empty: {}", source, e);
            unavailable.push(source);
            T::default()
        }
    }
}

/// Normalized, deduplicated, non-empty user skills in input order.
pub fn normalized_user_skills(user_skills: &[String]) -> Vec<String> {
    let mut skills: Vec<String> = Vec::new();
    for skill in user_skills.iter().map(|s| normalize_skill(s)) {
        if !skill.is_empty() && !skills.contains(&skill) {
            skills.push(skill);
        }
    }
    skills
}

/// Whether any of the user's normalized skills loosely matches `skill`.
pub fn user_has_skill(normalized_user_skills: &[String], skill: &str) -> bool {
    normalized_user_skills
        .iter()
        .any(|user_skill| skills_overlap(user_skill, skill))
}

/// Demanded skills the user lacks, most urgent first: priority tier, then
/// job count descending.
pub fn compute_skill_gaps(
    demand: &[SkillDemand],
    normalized_user_skills: &[String],
    thresholds: &PriorityThresholds,
) -> Vec<SkillGap> {
    let mut gaps: Vec<SkillGap> = demand
        .iter()
        .filter(|d| !user_has_skill(normalized_user_skills, &d.skill))
        .map(|d| SkillGap {
            skill: d.skill.clone(),
            job_count: d.job_count,
            percentage: d.percentage,
            priority: Priority::from_percentage(d.percentage, thresholds),
            potential_job_increase: d.job_count,
        })
        .collect();

    gaps.sort_by(|a, b| {
        a.priority
            .rank()
            .cmp(&b.priority.rank())
            .then_with(|| b.job_count.cmp(&a.job_count))
    });
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cms_client::ContentBackend;
    use crate::core::memory_index::{MemoryCatalog, MemoryIndex};
    use crate::core::search_client::SearchBackend;
    use crate::skill_analysis::{JobRecord, LearningResource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves the corpus but fails the n-th `count_matching` call.
    struct FlakyCountIndex {
        inner: MemoryIndex,
        calls: AtomicUsize,
        fail_on: usize,
    }

    #[rocket::async_trait]
    impl JobIndex for FlakyCountIndex {
        async fn fetch_skill_corpus(&self, limit: usize) -> Result<Vec<JobRecord>, Unavailable> {
            self.inner.fetch_skill_corpus(limit).await
        }

        async fn count_matching(&self, terms: &[String]) -> Result<u64, Unavailable> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_on {
                return Err(Unavailable::Transport {
                    service: "algolia",
                    message: "connection reset".to_string(),
                });
            }
            self.inner.count_matching(terms).await
        }

        async fn search_optional(
            &self,
            terms: &[String],
            limit: usize,
        ) -> Result<Vec<JobRecord>, Unavailable> {
            self.inner.search_optional(terms, limit).await
        }
    }

    /// 100 postings: react 40, kubernetes 35, docker 20, go 10.
    fn corpus() -> Vec<JobRecord> {
        (0..100)
            .map(|i| {
                let mut skills = Vec::new();
                if i < 40 {
                    skills.push("React".to_string());
                }
                if (30..65).contains(&i) {
                    skills.push("Kubernetes".to_string());
                }
                if (60..80).contains(&i) {
                    skills.push("Docker".to_string());
                }
                if i >= 90 {
                    skills.push("Go".to_string());
                }
                JobRecord {
                    object_id: format!("job-{}", i),
                    skills,
                    ..Default::default()
                }
            })
            .collect()
    }

    fn resources() -> Vec<LearningResource> {
        ["kubernetes", "kubernetes", "kubernetes", "kubernetes", "docker"]
            .iter()
            .enumerate()
            .map(|(i, tech)| LearningResource {
                uid: format!("res-{}", i),
                technology: Some(tech.to_string()),
                ..Default::default()
            })
            .collect()
    }

    fn analyzer() -> SkillGapAnalyzer {
        SkillGapAnalyzer::new(
            Arc::new(MemoryIndex::new(corpus())),
            Arc::new(MemoryCatalog::new(resources())),
            Arc::new(SkillNormalizer::default()),
            AnalysisSettings::default(),
        )
    }

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_react_user_against_corpus() {
        let analysis = analyzer().analyze_skill_gaps(&skills(&["React"])).await;

        assert_eq!(analysis.user_skills, vec!["React"]);
        assert_eq!(analysis.total_jobs, 100);
        assert_eq!(analysis.matching_jobs, 40);
        assert_eq!(analysis.match_percentage, 40);
        assert!(analysis.unavailable_sources.is_empty());

        let gap_skills: Vec<_> = analysis.skill_gaps.iter().map(|g| g.skill.as_str()).collect();
        assert_eq!(gap_skills, vec!["kubernetes", "docker", "go"]);
        assert_eq!(analysis.skill_gaps[0].priority, Priority::High);
        assert_eq!(analysis.skill_gaps[1].priority, Priority::Medium);
        assert_eq!(analysis.skill_gaps[1].percentage, 20);
        assert_eq!(analysis.skill_gaps[2].priority, Priority::Low);

        // react|kubernetes|docker|go covers every posting but 80..90
        assert_eq!(analysis.potential_match_after_learning, 90);
    }

    #[tokio::test]
    async fn test_recommendations_join_resources() {
        let analysis = analyzer().analyze_skill_gaps(&skills(&["react"])).await;

        assert_eq!(analysis.recommendations.len(), 3);
        let k8s = &analysis.recommendations[0];
        assert_eq!(k8s.skill, "kubernetes");
        assert_eq!(k8s.jobs_unlocked, 35);
        assert_eq!(k8s.learning_resources.len(), 3);
        assert_eq!(analysis.recommendations[1].learning_resources.len(), 1);
        assert!(analysis.recommendations[2].learning_resources.is_empty());
    }

    #[tokio::test]
    async fn test_empty_skill_list_reports_full_gap_list() {
        let analysis = analyzer().analyze_skill_gaps(&[]).await;

        assert_eq!(analysis.matching_jobs, 0);
        assert_eq!(analysis.match_percentage, 0);
        assert_eq!(analysis.skill_gaps.len(), 4);
        assert_eq!(analysis.skill_gaps[0].skill, "react");
        assert!(analysis.unavailable_sources.is_empty());
    }

    #[tokio::test]
    async fn test_loose_matching_excludes_substring_skills() {
        // "kube" is a substring of "kubernetes", so the gap disappears
        let analysis = analyzer().analyze_skill_gaps(&skills(&["kube", "golang"])).await;
        let gap_skills: Vec<_> = analysis.skill_gaps.iter().map(|g| g.skill.as_str()).collect();
        assert!(!gap_skills.contains(&"kubernetes"));
        // "golang" contains "go"
        assert!(!gap_skills.contains(&"go"));
    }

    #[tokio::test]
    async fn test_gaps_never_contain_user_skills() {
        let analyzer = analyzer();
        let cases = [
            vec!["react"],
            vec!["Docker", "go"],
            vec!["k", "rust"],
            vec!["  REACT.JS "],
            vec![],
        ];
        for case in cases {
            let user = skills(&case);
            let normalized = normalized_user_skills(&user);
            let analysis = analyzer.analyze_skill_gaps(&user).await;

            for gap in &analysis.skill_gaps {
                assert!(!user_has_skill(&normalized, &gap.skill), "{:?}", case);
            }
            assert!(analysis.match_percentage <= 100);
            assert!(analysis.top_demanded_skills.len() <= 10);
            assert!(analysis.skill_gaps.len() <= 10);
            assert!(analysis.recommendations.len() <= 5);
        }
    }

    #[tokio::test]
    async fn test_analysis_is_idempotent() {
        let analyzer = analyzer();
        let user = skills(&["docker", "python"]);
        let first = analyzer.analyze_skill_gaps(&user).await;
        let second = analyzer.analyze_skill_gaps(&user).await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_unconfigured_backends_degrade_to_zero() {
        let analyzer = SkillGapAnalyzer::new(
            Arc::new(SearchBackend::Unconfigured),
            Arc::new(ContentBackend::Unconfigured),
            Arc::new(SkillNormalizer::default()),
            AnalysisSettings::default(),
        );
        assert!(!analyzer.is_search_configured());

        let analysis = analyzer.analyze_skill_gaps(&skills(&["rust"])).await;
        assert_eq!(analysis.user_skills, vec!["rust"]);
        assert_eq!(analysis.total_jobs, 0);
        assert_eq!(analysis.matching_jobs, 0);
        assert_eq!(analysis.match_percentage, 0);
        assert_eq!(analysis.potential_match_after_learning, 0);
        assert!(analysis.top_demanded_skills.is_empty());
        assert!(analysis.skill_gaps.is_empty());
        assert!(analysis.recommendations.is_empty());
        assert_eq!(
            analysis.unavailable_sources,
            vec![
                DataSource::JobCorpus,
                DataSource::MatchCount,
                DataSource::LearningResources,
                DataSource::ProjectionCount,
            ]
        );
    }

    #[tokio::test]
    async fn test_content_outage_only_empties_resources() {
        let analyzer = SkillGapAnalyzer::new(
            Arc::new(MemoryIndex::new(corpus())),
            Arc::new(ContentBackend::Unconfigured),
            Arc::new(SkillNormalizer::default()),
            AnalysisSettings::default(),
        );
        let analysis = analyzer.analyze_skill_gaps(&skills(&["React"])).await;

        assert_eq!(analysis.total_jobs, 100);
        assert_eq!(analysis.matching_jobs, 40);
        assert_eq!(analysis.skill_gaps.len(), 3);
        assert_eq!(analysis.recommendations.len(), 3);
        assert!(analysis
            .recommendations
            .iter()
            .all(|r| r.learning_resources.is_empty()));
        assert_eq!(analysis.potential_match_after_learning, 90);
        assert_eq!(analysis.unavailable_sources, vec![DataSource::LearningResources]);
    }

    #[tokio::test]
    async fn test_failed_projection_keeps_current_match() {
        // the match count is the first count query, the projection the second
        let analyzer = SkillGapAnalyzer::new(
            Arc::new(FlakyCountIndex {
                inner: MemoryIndex::new(corpus()),
                calls: AtomicUsize::new(0),
                fail_on: 1,
            }),
            Arc::new(MemoryCatalog::new(resources())),
            Arc::new(SkillNormalizer::default()),
            AnalysisSettings::default(),
        );
        let analysis = analyzer.analyze_skill_gaps(&skills(&["React"])).await;

        assert_eq!(analysis.total_jobs, 100);
        assert_eq!(analysis.matching_jobs, 40);
        assert_eq!(analysis.match_percentage, 40);
        assert_eq!(analysis.skill_gaps.len(), 3);
        assert_eq!(analysis.recommendations[0].learning_resources.len(), 3);
        assert_eq!(analysis.potential_match_after_learning, 0);
        assert_eq!(analysis.unavailable_sources, vec![DataSource::ProjectionCount]);
    }

    #[tokio::test]
    async fn test_failed_match_count_keeps_market() {
        let analyzer = SkillGapAnalyzer::new(
            Arc::new(FlakyCountIndex {
                inner: MemoryIndex::new(corpus()),
                calls: AtomicUsize::new(0),
                fail_on: 0,
            }),
            Arc::new(MemoryCatalog::new(resources())),
            Arc::new(SkillNormalizer::default()),
            AnalysisSettings::default(),
        );
        let analysis = analyzer.analyze_skill_gaps(&skills(&["React"])).await;

        assert_eq!(analysis.total_jobs, 100);
        assert_eq!(analysis.matching_jobs, 0);
        assert_eq!(analysis.skill_gaps.len(), 3);
        assert_eq!(analysis.potential_match_after_learning, 90);
        assert_eq!(analysis.unavailable_sources, vec![DataSource::MatchCount]);
    }

    #[test]
    fn test_gap_ordering_by_tier_then_count() {
        let counts = [
            ("a", 10),
            ("b", 16),
            ("c", 31),
            ("d", 12),
            ("e", 29),
            ("f", 45),
        ];
        let demand: Vec<SkillDemand> = counts
            .iter()
            .map(|&(skill, count)| SkillDemand {
                skill: skill.to_string(),
                job_count: count,
                percentage: count as u32,
            })
            .collect();
        let gaps = compute_skill_gaps(&demand, &[], &PriorityThresholds::default());
        let order: Vec<_> = gaps.iter().map(|g| g.skill.as_str()).collect();
        assert_eq!(order, vec!["f", "c", "e", "b", "d", "a"]);
    }

    #[test]
    fn test_java_matches_javascript() {
        // Loose matching is kept as is; a Java developer is treated as
        // already knowing JavaScript.
        let user = normalized_user_skills(&skills(&["Java"]));
        assert!(user_has_skill(&user, "javascript"));
    }
}
