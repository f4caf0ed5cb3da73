//! Read-side projections: full game view, list summaries and the
//! per-agent view used by polling agents.

use std::collections::HashMap;

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::board::{Board, Color, Point};
use crate::domain::game_transition::{offer10_window_open, required_action, RequiredAction};
use crate::domain::opening::{legal_opening_points, OPENING_PLIES};
use crate::domain::revision::{game_revision, Fingerprint};
use crate::domain::rules::is_forbidden_for_black;
use crate::domain::state::{GameState, GameStatus, OpeningState, Phase, ResultReason};
use crate::error::AppError;
use crate::repos::games::{self, Game};
use crate::repos::moves::{self, StoneMove};
use crate::repos::offer10::{self, Offer10};
use crate::repos::{agents, queue};
use crate::services::timeouts;
use crate::state::app_state::AppState;

pub const LIST_LIMIT_DEFAULT: u64 = 10;
pub const LIST_LIMIT_MAX: u64 = 50;

pub fn clamp_limit(raw: Option<u64>) -> u64 {
    raw.unwrap_or(LIST_LIMIT_DEFAULT).clamp(1, LIST_LIMIT_MAX)
}

/// Milliseconds until `deadline`, never negative.
pub fn time_left_ms(deadline: Option<OffsetDateTime>, now: OffsetDateTime) -> Option<i64> {
    deadline.map(|d| (d - now).whole_milliseconds().max(0) as i64)
}

/// Opening sub-state as clients see it; `awaiting_offer10` reflects whether
/// the offer window is open right now.
pub fn opening_view(state: &GameState) -> OpeningState {
    let mut opening = state.opening.clone();
    opening.awaiting_offer10 = offer10_window_open(state);
    opening
}

/// Cells the acting side may place on next. `None` while a decision is
/// pending or once the game is over.
pub fn legal_moves(state: &GameState, board: &Board) -> Option<Vec<Point>> {
    if !state.is_active() || state.opening.decision_pending() {
        return None;
    }
    let ply = state.next_ply();
    if ply <= OPENING_PLIES {
        return Some(legal_opening_points(board, ply));
    }
    let black_to_move = state.turn_color == Color::Black;
    Some(
        board
            .empty_points()
            .filter(|p| !black_to_move || !is_forbidden_for_black(board, *p))
            .collect(),
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct GameView {
    pub id: i64,
    pub status: GameStatus,
    pub winner_color: Option<Color>,
    pub result_reason: Option<ResultReason>,
    pub black_agent_id: i64,
    pub white_agent_id: i64,
    pub black_agent_name: Option<String>,
    pub white_agent_name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub board: Vec<Vec<Option<Color>>>,
    pub phase: Phase,
    pub turn_color: Color,
    pub move_number: i32,
    pub opening_state: OpeningState,
    pub moves: Vec<StoneMove>,
    pub legal_moves: Option<Vec<Point>>,
    pub last_move: Option<StoneMove>,
    pub offer10_candidates: Option<Vec<Point>>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub turn_deadline_at: Option<OffsetDateTime>,
    pub turn_time_left_ms: Option<i64>,
    pub required_action: Option<RequiredAction>,
    pub acting_agent_id: Option<i64>,
    pub revision: String,
}

pub fn build_game_view(
    game: &Game,
    moves: Vec<StoneMove>,
    names: &HashMap<i64, String>,
    offer: Option<&Offer10>,
    now: OffsetDateTime,
) -> GameView {
    let state = &game.state;
    let board = moves::board_from(&moves);
    let action = required_action(state);
    // Candidates stay visible only while the selection is outstanding.
    let offer10_candidates = offer
        .filter(|_| state.opening.awaiting_offer10_selection)
        .map(|o| o.candidates.clone());

    GameView {
        id: game.id,
        status: state.status,
        winner_color: state.winner,
        result_reason: state.result_reason,
        black_agent_id: state.seats.black,
        white_agent_id: state.seats.white,
        black_agent_name: names.get(&state.seats.black).cloned(),
        white_agent_name: names.get(&state.seats.white).cloned(),
        updated_at: game.updated_at,
        board: board.rows(),
        phase: state.phase,
        turn_color: state.turn_color,
        move_number: state.move_number,
        opening_state: opening_view(state),
        legal_moves: legal_moves(state, &board),
        last_move: moves.last().copied(),
        moves,
        offer10_candidates,
        turn_deadline_at: game.turn_deadline_at,
        turn_time_left_ms: time_left_ms(game.turn_deadline_at, now),
        required_action: action.map(|ctx| ctx.action),
        acting_agent_id: action.map(|ctx| ctx.actor),
        revision: game_revision(state, game.turn_deadline_at, game.updated_at),
    }
}

pub async fn game_view(state: &AppState, game_id: i64) -> Result<GameView, AppError> {
    let game = timeouts::load_resolved(state, game_id).await?;
    let stones = moves::list_for_game(&state.db, game_id).await?;
    let names =
        agents::names_by_id(&state.db, vec![game.state.seats.black, game.state.seats.white])
            .await?;
    let offer = match game.state.opening.offer10_id {
        Some(_) => offer10::find_by_game(&state.db, game_id).await?,
        None => None,
    };
    Ok(build_game_view(
        &game,
        stones,
        &names,
        offer.as_ref(),
        OffsetDateTime::now_utc(),
    ))
}

/// Row of the recent-games list.
#[derive(Debug, Clone, Serialize)]
pub struct GameSummary {
    pub id: i64,
    pub status: GameStatus,
    pub phase: Phase,
    pub move_number: i32,
    pub black_agent_id: i64,
    pub white_agent_id: i64,
    pub black_agent_name: Option<String>,
    pub white_agent_name: Option<String>,
    pub winner_color: Option<Color>,
    pub result_reason: Option<ResultReason>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl GameSummary {
    fn new(game: &Game, names: &HashMap<i64, String>) -> Self {
        let s = &game.state;
        Self {
            id: game.id,
            status: s.status,
            phase: s.phase,
            move_number: s.move_number,
            black_agent_id: s.seats.black,
            white_agent_id: s.seats.white,
            black_agent_name: names.get(&s.seats.black).cloned(),
            white_agent_name: names.get(&s.seats.white).cloned(),
            winner_color: s.winner,
            result_reason: s.result_reason,
            created_at: game.created_at,
            updated_at: game.updated_at,
        }
    }
}

pub async fn list_games(
    state: &AppState,
    status: Option<GameStatus>,
    limit: u64,
) -> Result<Vec<GameSummary>, AppError> {
    let mut resolved = Vec::new();
    for game in games::list_recent(&state.db, status, limit).await? {
        let game = if game.is_active() {
            timeouts::resolve_due(state, game).await?
        } else {
            game
        };
        resolved.push(game);
    }

    let ids = resolved
        .iter()
        .flat_map(|g| [g.state.seats.black, g.state.seats.white])
        .collect::<Vec<_>>();
    let names = agents::names_by_id(&state.db, ids).await?;
    Ok(resolved
        .iter()
        .map(|game| GameSummary::new(game, &names))
        .collect())
}

/// What the polling agent is expected to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentAction {
    None,
    Move,
    Swap,
    #[serde(rename = "offer10_select")]
    Offer10Select,
}

impl AgentAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            AgentAction::None => "none",
            AgentAction::Move => "move",
            AgentAction::Swap => "swap",
            AgentAction::Offer10Select => "offer10_select",
        }
    }
}

impl From<RequiredAction> for AgentAction {
    fn from(action: RequiredAction) -> Self {
        match action {
            RequiredAction::Move => AgentAction::Move,
            RequiredAction::Swap => AgentAction::Swap,
            RequiredAction::Offer10Select => AgentAction::Offer10Select,
        }
    }
}

/// A game from one seated agent's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentGameView {
    pub id: i64,
    pub status: GameStatus,
    pub phase: Phase,
    pub move_number: i32,
    pub turn_color: Color,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub color: Option<Color>,
    pub is_my_turn: bool,
    pub required_action: AgentAction,
    pub next_turn_number: Option<i32>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub turn_deadline_at: Option<OffsetDateTime>,
    pub time_left_ms: Option<i64>,
}

pub fn agent_game_view(game: &Game, agent_id: i64, now: OffsetDateTime) -> AgentGameView {
    let state = &game.state;
    let mine = required_action(state).filter(|ctx| ctx.actor == agent_id);
    AgentGameView {
        id: game.id,
        status: state.status,
        phase: state.phase,
        move_number: state.move_number,
        turn_color: state.turn_color,
        updated_at: game.updated_at,
        color: state.seats.color_of(agent_id),
        is_my_turn: mine.is_some(),
        required_action: mine.map_or(AgentAction::None, |ctx| ctx.action.into()),
        next_turn_number: state.is_active().then(|| state.next_ply()),
        turn_deadline_at: game.turn_deadline_at,
        time_left_ms: time_left_ms(game.turn_deadline_at, now),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentStatus {
    pub in_queue: bool,
    pub game: Option<AgentGameView>,
}

impl AgentStatus {
    /// Digest over everything in the status except the ticking countdown.
    pub fn revision(&self) -> String {
        let fp = Fingerprint::new().field(self.in_queue);
        match &self.game {
            None => fp.field("-").finish(),
            Some(g) => fp
                .field(g.id)
                .field(format!("{:?}", g.status))
                .field(g.phase.as_str())
                .field(g.move_number)
                .field(g.turn_color)
                .timestamp(Some(g.updated_at))
                .opt_field(g.color)
                .field(g.is_my_turn)
                .field(g.required_action.as_str())
                .opt_field(g.next_turn_number)
                .timestamp(g.turn_deadline_at)
                .finish(),
        }
    }
}

/// Queue membership plus the agent's active game. The game is resolved
/// first, so a just-forfeited game is reported as finished once.
pub async fn agent_status(state: &AppState, agent_id: i64) -> Result<AgentStatus, AppError> {
    let in_queue = queue::is_queued(&state.db, agent_id).await?;
    let game = match games::find_active_for_agent(&state.db, agent_id).await? {
        Some(game) => Some(timeouts::resolve_due(state, game).await?),
        None => None,
    };
    let now = OffsetDateTime::now_utc();
    Ok(AgentStatus {
        in_queue,
        game: game.map(|g| agent_game_view(&g, agent_id, now)),
    })
}

/// Compact snapshot returned by the game long-poll.
#[derive(Debug, Clone, Serialize)]
pub struct GameSnapshot {
    pub id: i64,
    pub status: GameStatus,
    pub phase: Phase,
    pub move_number: i32,
    pub turn_color: Color,
    #[serde(with = "time::serde::rfc3339::option")]
    pub turn_deadline_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub opening_state: OpeningState,
}

impl From<&Game> for GameSnapshot {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id,
            status: game.state.status,
            phase: game.state.phase,
            move_number: game.state.move_number,
            turn_color: game.state.turn_color,
            turn_deadline_at: game.turn_deadline_at,
            updated_at: game.updated_at,
            opening_state: opening_view(&game.state),
        }
    }
}
