// src/web/handlers/system_handlers.rs
use crate::web::types::{DataResponse, HealthStatus, ServerState};

use rocket::serde::json::Json;
use rocket::State;
use tracing::debug;

pub async fn health_handler(state: &State<ServerState>) -> Json<DataResponse<HealthStatus>> {
    let status = HealthStatus {
        search_configured: state.analyzer.is_search_configured(),
        content_configured: state.content_configured,
        checked_at: chrono::Utc::now(),
    };
    debug!(
        "Health check: search={} content={}",
        status.search_configured, status.content_configured
    );
    Json(DataResponse::success("OK".to_string(), status, None))
}
