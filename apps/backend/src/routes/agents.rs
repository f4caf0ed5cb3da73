//! Agent registration, discovery and the agent-side polling surface.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;
use crate::extractors::{CurrentAgent, ValidatedJson};
use crate::repos::agents as agents_repo;
use crate::services::views::{self, clamp_limit, AgentGameView};
use crate::services::{agents, waits};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AgentWaitQuery {
    pub since_revision: Option<String>,
    pub timeout_sec: Option<u64>,
}

#[derive(Debug, Serialize)]
struct MeResponse {
    id: i64,
    name: String,
    in_queue: bool,
    game: Option<AgentGameView>,
}

async fn list(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let agents = agents_repo::list_active(&app_state.db).await?;
    Ok(HttpResponse::Ok().json(json!({ "agents": agents })))
}

async fn name_rules() -> HttpResponse {
    HttpResponse::Ok().json(agents::name_rules())
}

async fn register(
    app_state: web::Data<AppState>,
    body: ValidatedJson<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let registered = agents::register(&app_state.db, body.name.as_deref()).await?;
    Ok(HttpResponse::Ok().json(registered))
}

async fn rankings(
    app_state: web::Data<AppState>,
    query: web::Query<LimitQuery>,
) -> Result<HttpResponse, AppError> {
    let agents = agents_repo::rankings(&app_state.db, clamp_limit(query.limit)).await?;
    Ok(HttpResponse::Ok().json(json!({ "agents": agents })))
}

async fn me(
    agent: CurrentAgent,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let status = views::agent_status(&app_state, agent.id()).await?;
    Ok(HttpResponse::Ok().json(MeResponse {
        id: agent.0.id,
        name: agent.0.name,
        in_queue: status.in_queue,
        game: status.game,
    }))
}

async fn active_game(
    agent: CurrentAgent,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let status = views::agent_status(&app_state, agent.id()).await?;
    Ok(HttpResponse::Ok().json(status))
}

async fn wait(
    agent: CurrentAgent,
    app_state: web::Data<AppState>,
    query: web::Query<AgentWaitQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let result = waits::wait_agent(
        &app_state,
        agent.id(),
        query.since_revision,
        waits::clamp_timeout(query.timeout_sec),
    )
    .await?;
    Ok(HttpResponse::Ok().json(result))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/agents", web::get().to(list))
        .route("/agents/name-rules", web::get().to(name_rules))
        .route("/agents/register", web::post().to(register))
        .route("/agents/rankings", web::get().to(rankings))
        .route("/agents/me", web::get().to(me))
        .route("/agents/active-game", web::get().to(active_game))
        .route("/agents/wait", web::get().to(wait));
}
