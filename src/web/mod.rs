// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use types::*;

use crate::core::ConfigManager;
use crate::skill_analysis::{MarketAnalysis, SkillGapAnalysis};
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Build, Request, Response, Rocket, State};
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
    }
}

#[post("/skill-gap", data = "<request>")]
pub async fn skill_gap(
    request: Json<StandardRequest<SkillGapRequest>>,
    state: &State<ServerState>,
) -> Result<Json<SkillGapAnalysis>, ApiError> {
    handlers::analyze_skill_gap_handler(request, state).await
}

#[get("/skill-gap/market")]
pub async fn job_market(
    state: &State<ServerState>,
) -> Result<Json<DataResponse<MarketAnalysis>>, ApiError> {
    handlers::job_market_handler(state).await
}

#[post("/jobs/recommendations", data = "<request>")]
pub async fn job_recommendations(
    request: Json<StandardRequest<JobRecommendationsRequest>>,
    geolocation: Geolocation,
    state: &State<ServerState>,
) -> Result<Json<JobRecommendationsResponse>, ApiError> {
    handlers::job_recommendations_handler(request, geolocation, state).await
}

#[get("/health")]
pub async fn health(state: &State<ServerState>) -> Json<DataResponse<HealthStatus>> {
    handlers::health_handler(state).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Endpoint not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the request path and method".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body has the wrong shape".to_string(),
        "UNPROCESSABLE_ENTITY".to_string(),
        vec!["Skill lists must be arrays of strings".to_string()],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
        None,
    ))
}

/// Attach state, fairings, routes and catchers under `/api`.
pub fn mount_api(rocket: Rocket<Build>, state: ServerState) -> Rocket<Build> {
    rocket
        .attach(Cors)
        .manage(state)
        .register(
            "/api",
            catchers![bad_request, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                skill_gap,
                job_market,
                job_recommendations,
                health,
                options
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: &ConfigManager, state: ServerState) -> Result<()> {
    let figment = rocket::Config::figment()
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port));

    info!(
        "Starting jobscout API on http://{}:{}",
        config.server.address, config.server.port
    );
    info!(
        "Search configured: {}, content configured: {}",
        state.analyzer.is_search_configured(),
        state.content_configured
    );

    let _rocket = mount_api(rocket::custom(figment), state)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Rocket failed: {}", e))?;

    Ok(())
}
