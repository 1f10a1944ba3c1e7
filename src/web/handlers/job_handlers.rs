// src/web/handlers/job_handlers.rs
use crate::web::types::{
    search_unavailable, ApiError, Geolocation, JobRecommendationsRequest,
    JobRecommendationsResponse, ServerState, StandardErrorResponse, StandardRequest,
    WithConversationId,
};

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

pub async fn job_recommendations_handler(
    request: Json<StandardRequest<JobRecommendationsRequest>>,
    geolocation: Geolocation,
    state: &State<ServerState>,
) -> Result<Json<JobRecommendationsResponse>, ApiError> {
    let conversation_id = request.conversation_id();
    let skills = request.data.skills();

    if skills.is_empty() {
        warn!("Job recommendation request without skills");
        return Err(StandardErrorResponse::new(
            "skills must be a non-empty array".to_string(),
            "MISSING_SKILLS".to_string(),
            vec!["Send a body like {\"skills\": [\"rust\"], \"limit\": 6}".to_string()],
            conversation_id,
        )
        .with_status(Status::BadRequest));
    }

    if !state.recommender.is_search_configured() {
        return Err(search_unavailable(conversation_id));
    }

    let limit = request.data.limit();
    info!(
        "Recommending up to {} jobs for {} skills (country: {})",
        limit,
        skills.len(),
        geolocation.country.as_deref().unwrap_or("unknown")
    );

    let recommendations = state.recommender.recommend_jobs(&skills, limit).await;

    Ok(Json(JobRecommendationsResponse {
        recommendations,
        searched_skills: skills,
        geolocation,
    }))
}
