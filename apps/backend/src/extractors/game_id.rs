use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::error::AppError;
use crate::errors::ErrorCode;

/// Positive game id from the `{game_id}` path segment. Existence is checked
/// by the service that loads the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameId(pub i64);

pub fn parse_game_id(raw: Option<&str>) -> Result<i64, AppError> {
    let raw = raw.ok_or_else(|| {
        AppError::bad_request(ErrorCode::InvalidGameId, "Missing game_id parameter")
    })?;
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::bad_request(
            ErrorCode::InvalidGameId,
            format!("Invalid game id: {raw}"),
        )),
    }
}

impl FromRequest for GameId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse_game_id(req.match_info().get("game_id")).map(GameId))
    }
}
