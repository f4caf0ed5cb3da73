//! Game reads, long-poll and the four turn actions.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::state::GameStatus;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::extractors::{CurrentAgent, GameId, ValidatedJson};
use crate::services::game_flow::{self, MoveRequest};
use crate::services::views::{self, clamp_limit};
use crate::services::waits::{self, GameSince};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GameWaitQuery {
    pub since_move: Option<i32>,
    pub since_updated_at: Option<String>,
    pub since_revision: Option<String>,
    pub timeout_sec: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct MoveBody {
    pub x: i64,
    pub y: i64,
    pub turn_number: i32,
    pub idempotency_key: String,
}

#[derive(Debug, Deserialize)]
pub struct SwapBody {
    pub swap: bool,
}

#[derive(Debug, Deserialize)]
pub struct PointBody {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Deserialize)]
pub struct OfferBody {
    pub candidates: Vec<PointBody>,
}

/// Unknown status filters are ignored rather than rejected.
fn parse_status(raw: Option<&str>) -> Option<GameStatus> {
    match raw {
        Some("active") => Some(GameStatus::Active),
        Some("finished") => Some(GameStatus::Finished),
        _ => None,
    }
}

fn parse_since_updated_at(raw: Option<&str>) -> Result<Option<OffsetDateTime>, AppError> {
    raw.map(|s| {
        OffsetDateTime::parse(s, &Rfc3339).map_err(|_| {
            AppError::bad_request(
                ErrorCode::BadRequest,
                "since_updated_at must be an RFC 3339 timestamp",
            )
        })
    })
    .transpose()
}

async fn list(
    app_state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, AppError> {
    let games = views::list_games(
        &app_state,
        parse_status(query.status.as_deref()),
        clamp_limit(query.limit),
    )
    .await?;
    Ok(HttpResponse::Ok().json(json!({ "games": games })))
}

async fn get_game(
    game_id: GameId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(views::game_view(&app_state, game_id.0).await?))
}

async fn wait(
    game_id: GameId,
    app_state: web::Data<AppState>,
    query: web::Query<GameWaitQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let since = GameSince {
        move_number: query.since_move,
        updated_at: parse_since_updated_at(query.since_updated_at.as_deref())?,
        revision: query.since_revision,
    };
    let result = waits::wait_game(
        &app_state,
        game_id.0,
        since,
        waits::clamp_timeout(query.timeout_sec),
    )
    .await?;
    Ok(HttpResponse::Ok().json(result))
}

async fn submit_move(
    game_id: GameId,
    agent: CurrentAgent,
    app_state: web::Data<AppState>,
    body: ValidatedJson<MoveBody>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let request = MoveRequest {
        x: body.x,
        y: body.y,
        turn_number: body.turn_number,
        idempotency_key: body.idempotency_key,
    };
    let response = game_flow::submit_move(&app_state, game_id.0, agent.id(), request).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn swap(
    game_id: GameId,
    agent: CurrentAgent,
    app_state: web::Data<AppState>,
    body: ValidatedJson<SwapBody>,
) -> Result<HttpResponse, AppError> {
    let response = game_flow::decide_swap(&app_state, game_id.0, agent.id(), body.swap).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn offer10(
    game_id: GameId,
    agent: CurrentAgent,
    app_state: web::Data<AppState>,
    body: ValidatedJson<OfferBody>,
) -> Result<HttpResponse, AppError> {
    let candidates = body
        .into_inner()
        .candidates
        .into_iter()
        .map(|p| (p.x, p.y))
        .collect();
    let response =
        game_flow::submit_offer10(&app_state, game_id.0, agent.id(), candidates).await?;
    Ok(HttpResponse::Ok().json(response))
}

async fn select_offer10(
    game_id: GameId,
    agent: CurrentAgent,
    app_state: web::Data<AppState>,
    body: ValidatedJson<PointBody>,
) -> Result<HttpResponse, AppError> {
    let response =
        game_flow::select_offer10(&app_state, game_id.0, agent.id(), body.x, body.y).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/games", web::get().to(list))
        .route("/games/{game_id}", web::get().to(get_game))
        .route("/games/{game_id}/wait", web::get().to(wait))
        .route("/games/{game_id}/move", web::post().to(submit_move))
        .route("/games/{game_id}/swap", web::post().to(swap))
        .route("/games/{game_id}/offer10", web::post().to(offer10))
        .route("/games/{game_id}/offer10/select", web::post().to(select_offer10));
}
