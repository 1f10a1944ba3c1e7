// src/web/handlers/skill_gap_handlers.rs
use crate::skill_analysis::{MarketAnalysis, SkillGapAnalysis};
use crate::web::types::{
    search_unavailable, ApiError, DataResponse, ServerState, SkillGapRequest,
    StandardErrorResponse, StandardRequest, WithConversationId,
};

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

pub async fn analyze_skill_gap_handler(
    request: Json<StandardRequest<SkillGapRequest>>,
    state: &State<ServerState>,
) -> Result<Json<SkillGapAnalysis>, ApiError> {
    let conversation_id = request.conversation_id();
    let skills = request.data.skills();

    if skills.is_empty() {
        warn!("Skill gap request without skills");
        return Err(StandardErrorResponse::new(
            "userSkills must be a non-empty array of skills".to_string(),
            "MISSING_SKILLS".to_string(),
            vec![
                "Send a body like {\"userSkills\": [\"react\", \"docker\"]}".to_string(),
                "Add at least one skill to your profile".to_string(),
            ],
            conversation_id,
        )
        .with_status(Status::BadRequest));
    }

    if !state.analyzer.is_search_configured() {
        warn!("Skill gap request rejected: search backend not configured");
        return Err(search_unavailable(conversation_id));
    }

    info!(
        "Analyzing skill gaps for {} skills [{}]",
        skills.len(),
        conversation_id.unwrap_or_default()
    );

    Ok(Json(state.analyzer.analyze_skill_gaps(&skills).await))
}

pub async fn job_market_handler(
    state: &State<ServerState>,
) -> Result<Json<DataResponse<MarketAnalysis>>, ApiError> {
    if !state.analyzer.is_search_configured() {
        return Err(search_unavailable(None));
    }

    let market = state.analyzer.market().analyze_job_market().await;
    let message = if market.total_jobs == 0 {
        "Job market data unavailable".to_string()
    } else {
        format!("Skill demand across {} postings", market.total_jobs)
    };

    Ok(Json(DataResponse::success(message, market, None)))
}
