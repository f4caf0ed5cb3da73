use renju_backend::config::arena::ArenaConfig;
use renju_backend::domain::game_transition::DeadlineKind;
use renju_backend::domain::state::Seats;
use renju_backend::error::AppError;
use renju_backend::repos::games::{self, Game};
use renju_backend::services::agents::{self, RegisteredAgent};
use renju_backend::services::game_flow::{self, MoveRequest, MoveResponse, SwapResponse};
use renju_backend::state::app_state::AppState;
use time::OffsetDateTime;

/// Stones placed by [`play_opening`], ply 1 to 5.
pub const OPENING_SCRIPT: [(i64, i64); 5] = [(7, 7), (7, 8), (8, 8), (6, 6), (9, 9)];

/// A freshly created game with known seats.
pub struct Match {
    pub game_id: i64,
    pub black: RegisteredAgent,
    pub white: RegisteredAgent,
}

pub async fn register(state: &AppState, name: &str) -> RegisteredAgent {
    agents::register(&state.db, Some(name))
        .await
        .expect("registration should succeed")
}

/// Creates a game directly, skipping the queue's coin flip.
pub async fn start_match(state: &AppState, tag: &str) -> Match {
    let black = register(state, &format!("{tag}-b")).await;
    let white = register(state, &format!("{tag}-w")).await;
    let deadline = OffsetDateTime::now_utc() + ArenaConfig::default().timeout_for(DeadlineKind::Move);
    let game = games::create_game(
        &state.db,
        Seats {
            black: black.id,
            white: white.id,
        },
        deadline,
    )
    .await
    .expect("game should be created");
    Match {
        game_id: game.id,
        black,
        white,
    }
}

pub async fn try_play(
    state: &AppState,
    game_id: i64,
    agent_id: i64,
    (x, y): (i64, i64),
    turn_number: i32,
) -> Result<MoveResponse, AppError> {
    game_flow::submit_move(
        state,
        game_id,
        agent_id,
        MoveRequest {
            x,
            y,
            turn_number,
            idempotency_key: format!("g{game_id}-a{agent_id}-t{turn_number}"),
        },
    )
    .await
}

pub async fn play(
    state: &AppState,
    game_id: i64,
    agent_id: i64,
    at: (i64, i64),
    turn_number: i32,
) -> MoveResponse {
    try_play(state, game_id, agent_id, at, turn_number)
        .await
        .unwrap_or_else(|e| panic!("move {turn_number} at {at:?} rejected: {e}"))
}

pub async fn keep_seats(state: &AppState, game_id: i64, agent_id: i64) -> SwapResponse {
    game_flow::decide_swap(state, game_id, agent_id, false)
        .await
        .expect("swap decision should succeed")
}

/// Plays opening plies `1..=plies` with every swap declined.
pub async fn play_opening(state: &AppState, m: &Match, plies: i32) {
    for ply in 1..=plies {
        let (mover, decider) = if ply % 2 == 1 {
            (m.black.id, m.white.id)
        } else {
            (m.white.id, m.black.id)
        };
        play(state, m.game_id, mover, OPENING_SCRIPT[(ply - 1) as usize], ply).await;
        keep_seats(state, m.game_id, decider).await;
    }
}

pub async fn load(state: &AppState, game_id: i64) -> Game {
    games::require_game(&state.db, game_id)
        .await
        .expect("game should exist")
}

/// Rewrites the stored deadline, e.g. into the past to force a timeout.
pub async fn set_deadline(state: &AppState, game_id: i64, deadline: OffsetDateTime) -> Game {
    let game = load(state, game_id).await;
    let next = game.state.clone();
    games::update_state(&state.db, &game, &next, Some(deadline))
        .await
        .expect("deadline update should succeed")
}
