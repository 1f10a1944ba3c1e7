//! Skill-gap analysis over a hosted job search index.
//!
//! The analyzers read postings from a search index and learning content
//! from a CMS, both behind traits in [`skill_analysis`], and never fail:
//! backend problems degrade to zero values that callers can detect.

pub mod cli;
pub mod core;
pub mod error;
pub mod skill_analysis;
pub mod utils;
pub mod web;

pub use error::Unavailable;
pub use skill_analysis::{
    JobRecommender, MarketAnalyzer, SkillGapAnalysis, SkillGapAnalyzer, SkillNormalizer,
};
pub use web::{mount_api, start_web_server, ServerState};
