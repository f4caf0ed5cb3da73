use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::AppError;
use crate::extractors::CurrentAgent;
use crate::services::matchmaking;
use crate::state::app_state::AppState;

async fn join(
    agent: CurrentAgent,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let joined = matchmaking::join(&app_state, agent.id()).await?;
    Ok(HttpResponse::Ok().json(joined))
}

/// Leaving when not queued is not an error.
async fn leave(
    agent: CurrentAgent,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    matchmaking::leave(&app_state, agent.id()).await?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true })))
}

async fn size(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let queue_size = matchmaking::size(&app_state).await?;
    Ok(HttpResponse::Ok().json(json!({ "queue_size": queue_size })))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/queue/join", web::post().to(join))
        .route("/queue/leave", web::post().to(leave))
        .route("/queue/size", web::get().to(size));
}
