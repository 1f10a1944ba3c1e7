// src/web/types.rs

use crate::core::{ConfigManager, ContentBackend, MemoryCatalog, MemoryIndex, SearchBackend};
use crate::skill_analysis::{
    AnalysisSettings, CompanyDirectory, JobIndex, JobRecommender, LearningCatalog, ScoredJob,
    SkillGapAnalyzer, SkillNormalizer,
};
use anyhow::Result;
use rocket::http::Status;
use rocket::request::{self, FromRequest};
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};
use rocket::Request;
use std::path::Path;
use std::sync::Arc;

/// Everything the routes need, shared for the life of the server.
pub struct ServerState {
    pub analyzer: SkillGapAnalyzer,
    pub recommender: JobRecommender,
    pub content_configured: bool,
}

impl ServerState {
    pub fn new<C>(
        index: Arc<dyn JobIndex>,
        content: Arc<C>,
        normalizer: SkillNormalizer,
        settings: AnalysisSettings,
    ) -> Self
    where
        C: LearningCatalog + CompanyDirectory + 'static,
    {
        let content_configured = content.is_configured();
        let catalog: Arc<dyn LearningCatalog> = content.clone();
        let companies: Arc<dyn CompanyDirectory> = content;

        Self {
            analyzer: SkillGapAnalyzer::new(
                Arc::clone(&index),
                catalog,
                Arc::new(normalizer),
                settings,
            ),
            recommender: JobRecommender::new(index, companies),
            content_configured,
        }
    }

    /// Hosted services from configuration, or local JSON exports when paths
    /// are given.
    pub fn from_sources(
        config: &ConfigManager,
        jobs_file: Option<&Path>,
        resources_file: Option<&Path>,
    ) -> Result<Self> {
        let timeout = config.request_timeout_seconds;
        let index: Arc<dyn JobIndex> = match jobs_file {
            Some(path) => Arc::new(MemoryIndex::from_json_file(path)?),
            None => Arc::new(SearchBackend::from_config(&config.search, timeout)?),
        };
        let normalizer = config.normalizer()?;
        let settings = config.analysis.clone();

        Ok(match resources_file {
            Some(path) => Self::new(
                index,
                Arc::new(MemoryCatalog::from_json_file(path)?),
                normalizer,
                settings,
            ),
            None => Self::new(
                index,
                Arc::new(ContentBackend::from_config(&config.content, timeout)?),
                normalizer,
                settings,
            ),
        })
    }
}

// ===== Requests =====

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

pub trait WithConversationId {
    fn conversation_id(&self) -> Option<String>;
}

impl<T> WithConversationId for StandardRequest<T> {
    fn conversation_id(&self) -> Option<String> {
        self.conversation_id.clone()
    }
}

fn clean_skills(skills: &Option<Vec<String>>) -> Vec<String> {
    skills
        .iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct SkillGapRequest {
    #[serde(default)]
    pub user_skills: Option<Vec<String>>,
}

impl SkillGapRequest {
    pub fn skills(&self) -> Vec<String> {
        clean_skills(&self.user_skills)
    }
}

#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct JobRecommendationsRequest {
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl JobRecommendationsRequest {
    pub const MAX_LIMIT: usize = 50;

    pub fn skills(&self) -> Vec<String> {
        clean_skills(&self.skills)
    }

    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(crate::skill_analysis::job_recommendations::DEFAULT_RECOMMENDATION_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

/// Visitor location as reported by the edge network headers.
#[derive(Debug, Default, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct Geolocation {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Geolocation {
    type Error = std::convert::Infallible;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let header = |name: &str| {
            request
                .headers()
                .get_one(name)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        request::Outcome::Success(Geolocation {
            country: header("x-vercel-ip-country"),
            region: header("x-vercel-ip-country-region"),
            city: header("x-vercel-ip-city"),
        })
    }
}

// ===== Responses =====

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "camelCase")]
pub struct JobRecommendationsResponse {
    pub recommendations: Vec<ScoredJob>,
    pub searched_skills: Vec<String>,
    pub geolocation: Geolocation,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct HealthStatus {
    pub search_configured: bool,
    pub content_configured: bool,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Data,
    Error,
}

/// Error envelope paired with its HTTP status.
pub type ApiError = (Status, Json<StandardErrorResponse>);

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            conversation_id,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            conversation_id,
        }
    }

    pub fn with_status(self, status: Status) -> ApiError {
        (status, Json(self))
    }
}

pub fn search_unavailable(conversation_id: Option<String>) -> ApiError {
    StandardErrorResponse::new(
        "Search service is not configured".to_string(),
        "SEARCH_UNAVAILABLE".to_string(),
        vec![
            "Set ALGOLIA_APP_ID and ALGOLIA_SEARCH_API_KEY".to_string(),
            "Contact system administrator".to_string(),
        ],
        conversation_id,
    )
    .with_status(Status::ServiceUnavailable)
}
