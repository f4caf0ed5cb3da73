//! Game repository: rows to [`GameState`] and back.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;
use tracing::error;

use crate::adapters::games_sea as games_adapter;
use crate::domain::board::Color;
use crate::domain::opening::OPENING_PLIES;
use crate::domain::state::{GameState, GameStatus, OpeningState, Phase, ResultReason, Seats};
use crate::entities::games::{self, GamePhase, StoneColor};
use crate::errors::domain::{DomainError, InfraErrorKind};

/// A stored game: the domain state plus storage bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub id: i64,
    pub version: i32,
    pub turn_deadline_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub state: GameState,
}

pub fn color_to_db(color: Color) -> StoneColor {
    match color {
        Color::Black => StoneColor::Black,
        Color::White => StoneColor::White,
    }
}

pub fn color_from_db(color: StoneColor) -> Color {
    match color {
        StoneColor::Black => Color::Black,
        StoneColor::White => Color::White,
    }
}

fn phase_to_db(phase: Phase) -> GamePhase {
    match phase {
        Phase::Opening1 => GamePhase::Opening1,
        Phase::Opening2 => GamePhase::Opening2,
        Phase::Opening3 => GamePhase::Opening3,
        Phase::Opening4 => GamePhase::Opening4,
        Phase::Opening5 => GamePhase::Opening5,
        Phase::Midgame => GamePhase::Midgame,
    }
}

fn phase_from_db(phase: GamePhase) -> Phase {
    match phase {
        GamePhase::Opening1 => Phase::Opening1,
        GamePhase::Opening2 => Phase::Opening2,
        GamePhase::Opening3 => Phase::Opening3,
        GamePhase::Opening4 => Phase::Opening4,
        GamePhase::Opening5 => Phase::Opening5,
        GamePhase::Midgame => Phase::Midgame,
    }
}

fn status_to_db(status: GameStatus) -> games::GameStatus {
    match status {
        GameStatus::Active => games::GameStatus::Active,
        GameStatus::Finished => games::GameStatus::Finished,
    }
}

fn status_from_db(status: games::GameStatus) -> GameStatus {
    match status {
        games::GameStatus::Active => GameStatus::Active,
        games::GameStatus::Finished => GameStatus::Finished,
    }
}

fn corrupt(game_id: i64, what: &str) -> DomainError {
    error!(game_id, what, "Stored game failed to decode");
    DomainError::infra(
        InfraErrorKind::DataCorruption,
        format!("Game {game_id} has corrupt {what}"),
    )
}

impl TryFrom<games::Model> for Game {
    type Error = DomainError;

    fn try_from(model: games::Model) -> Result<Self, Self::Error> {
        let seats = Seats {
            black: model.black_agent_id,
            white: model.white_agent_id,
        };
        let opening = if model.opening_state.trim().is_empty() {
            OpeningState::default()
        } else {
            serde_json::from_str::<OpeningState>(&model.opening_state)
                .map_err(|_| corrupt(model.id, "opening state"))?
        }
        .fill_defaults(seats);
        let result_reason = match model.result_reason.as_deref() {
            None => None,
            Some(raw) => Some(ResultReason::parse(raw).ok_or_else(|| corrupt(model.id, "result reason"))?),
        };

        Ok(Self {
            id: model.id,
            version: model.version,
            turn_deadline_at: model.turn_deadline_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
            state: GameState {
                status: status_from_db(model.status),
                phase: phase_from_db(model.phase),
                move_number: model.move_number,
                turn_color: color_from_db(model.turn_color),
                seats,
                winner: model.winner_color.map(color_from_db),
                result_reason,
                opening,
            },
        })
    }
}

impl Game {
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn deadline_passed(&self, now: OffsetDateTime) -> bool {
        self.is_active() && self.turn_deadline_at.is_some_and(|deadline| deadline < now)
    }
}

fn encode_opening(state: &GameState) -> Result<String, DomainError> {
    serde_json::to_string(&state.opening).map_err(|e| {
        DomainError::infra(
            InfraErrorKind::Other("Serialize".into()),
            format!("opening state failed to encode: {e}"),
        )
    })
}

fn decode_all(models: Vec<games::Model>) -> Result<Vec<Game>, DomainError> {
    models.into_iter().map(Game::try_from).collect()
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Option<Game>, DomainError> {
    games_adapter::find_by_id(conn, game_id)
        .await?
        .map(Game::try_from)
        .transpose()
}

pub async fn require_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Game, DomainError> {
    Game::try_from(games_adapter::require_game(conn, game_id).await?)
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seats: Seats,
    turn_deadline_at: OffsetDateTime,
) -> Result<Game, DomainError> {
    let state = GameState::new_match(seats);
    let dto = games_adapter::GameCreate {
        black_agent_id: seats.black,
        white_agent_id: seats.white,
        turn_deadline_at,
        opening_state: encode_opening(&state)?,
    };
    Game::try_from(games_adapter::create_game(conn, dto).await?)
}

/// Persists `next` over `current` if nobody else wrote the game since
/// `current` was read. Finished games always get a null deadline.
pub async fn update_state<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    current: &Game,
    next: &GameState,
    turn_deadline_at: Option<OffsetDateTime>,
) -> Result<Game, DomainError> {
    let deadline = if next.is_active() {
        turn_deadline_at
    } else {
        None
    };
    let dto = games_adapter::GameUpdate {
        id: current.id,
        expected_version: current.version,
        status: status_to_db(next.status),
        phase: phase_to_db(next.phase),
        move_number: next.move_number,
        turn_color: color_to_db(next.turn_color),
        turn_deadline_at: deadline,
        black_agent_id: next.seats.black,
        white_agent_id: next.seats.white,
        winner_color: next.winner.map(color_to_db),
        result_reason: next.result_reason.map(|r| r.as_str().to_string()),
        opening_state: encode_opening(next)?,
    };
    Game::try_from(games_adapter::update_game(conn, dto).await?)
}

pub async fn find_active_for_agent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
) -> Result<Option<Game>, DomainError> {
    games_adapter::find_active_for_agent(conn, agent_id)
        .await?
        .map(Game::try_from)
        .transpose()
}

pub async fn find_latest_for_agent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
) -> Result<Option<Game>, DomainError> {
    games_adapter::find_latest_for_agent(conn, agent_id)
        .await?
        .map(Game::try_from)
        .transpose()
}

pub async fn list_recent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    status: Option<GameStatus>,
    limit: u64,
) -> Result<Vec<Game>, DomainError> {
    decode_all(games_adapter::list_recent(conn, status.map(status_to_db), limit).await?)
}

pub async fn find_expired<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    now: OffsetDateTime,
    limit: u64,
) -> Result<Vec<Game>, DomainError> {
    decode_all(games_adapter::find_expired(conn, now, limit).await?)
}

/// Games parked on the ply-5 swap since at least `cutoff`.
pub async fn find_stale_final_swaps<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cutoff: OffsetDateTime,
    limit: u64,
) -> Result<Vec<Game>, DomainError> {
    decode_all(
        games_adapter::find_stale_in_phase(
            conn,
            GamePhase::Opening5,
            OPENING_PLIES,
            cutoff,
            limit,
        )
        .await?,
    )
}

pub async fn count<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    status: Option<GameStatus>,
) -> Result<u64, DomainError> {
    Ok(games_adapter::count(conn, status.map(status_to_db)).await?)
}
