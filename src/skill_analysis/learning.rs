// src/skill_analysis/learning.rs
use super::normalizer::{normalize_skill, SkillNormalizer};
use super::LearningResource;
use crate::utils::skills_overlap;

/// Pick up to `limit` learning resources for a skill, in fetch order.
///
/// When the skill maps to a technology category only resources of that
/// category qualify. Unmapped skills fall back to loose matching against
/// each resource's `skills_covered` tags.
pub fn learning_resources_for_skill(
    skill: &str,
    resources: &[LearningResource],
    normalizer: &SkillNormalizer,
    limit: usize,
) -> Vec<LearningResource> {
    let skill = normalize_skill(skill);

    let technology = normalizer.technology_for(&skill);

    resources
        .iter()
        .filter(|resource| match technology {
            Some(technology) => resource
                .technology
                .as_deref()
                .map(normalize_skill)
                .is_some_and(|t| t == technology),
            None => resource
                .skills_covered
                .iter()
                .any(|tag| skills_overlap(&skill, &normalize_skill(tag))),
        })
        .take(limit)
        .cloned()
        .collect()
}
