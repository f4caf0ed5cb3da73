//! DTOs for games_sea adapter.

use time::OffsetDateTime;

use crate::entities::games::{GamePhase, GameStatus, StoneColor};

/// DTO for creating a freshly paired game.
#[derive(Debug, Clone)]
pub struct GameCreate {
    pub black_agent_id: i64,
    pub white_agent_id: i64,
    pub turn_deadline_at: OffsetDateTime,
    pub opening_state: String,
}

/// Full replacement of the mutable game columns, applied only if the stored
/// version still equals `expected_version`.
#[derive(Debug, Clone)]
pub struct GameUpdate {
    pub id: i64,
    pub expected_version: i32,
    pub status: GameStatus,
    pub phase: GamePhase,
    pub move_number: i32,
    pub turn_color: StoneColor,
    pub turn_deadline_at: Option<OffsetDateTime>,
    pub black_agent_id: i64,
    pub white_agent_id: i64,
    pub winner_color: Option<StoneColor>,
    pub result_reason: Option<String>,
    pub opening_state: String,
}
