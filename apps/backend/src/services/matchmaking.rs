//! Matchmaking queue: strict FIFO pairing with a coin flip for colors.

use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::db::txn::with_txn;
use crate::domain::game_transition::DeadlineKind;
use crate::domain::state::Seats;
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError};
use crate::errors::ErrorCode;
use crate::realtime::Topic;
use crate::repos::games::{self, Game};
use crate::repos::queue;
use crate::services::timeouts::{self, publish_change};
use crate::state::app_state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinResponse {
    pub ok: bool,
    pub queue_size: u64,
    pub game_id: Option<i64>,
}

/// Seats for a freshly paired game; `first_is_black` is the coin flip.
pub fn seat_pair(first: i64, second: i64, first_is_black: bool) -> Seats {
    if first_is_black {
        Seats {
            black: first,
            white: second,
        }
    } else {
        Seats {
            black: second,
            white: first,
        }
    }
}

pub async fn join(state: &AppState, agent_id: i64) -> Result<JoinResponse, AppError> {
    if let Some(game) = games::find_active_for_agent(&state.db, agent_id).await? {
        // A game whose deadline already passed does not block rejoining.
        let game = timeouts::resolve_due(state, game).await?;
        if game.is_active() {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyInGame,
                format!("Agent is already playing game {}", game.id),
            )
            .into());
        }
    }

    queue::upsert(&state.db, agent_id).await?;
    info!(agent_id, "Agent joined queue");
    state.bus.publish(Topic::Agent(agent_id));

    let game_id = try_pair(state)
        .await?
        .filter(|game| game.state.seats.color_of(agent_id).is_some())
        .map(|game| game.id);
    let queue_size = queue::size(&state.db).await?;

    Ok(JoinResponse {
        ok: true,
        queue_size,
        game_id,
    })
}

/// Removes the agent's entry; true if one existed.
pub async fn leave(state: &AppState, agent_id: i64) -> Result<bool, AppError> {
    let removed = queue::remove(&state.db, agent_id).await?;
    if removed {
        info!(agent_id, "Agent left queue");
        state.bus.publish(Topic::Agent(agent_id));
    }
    Ok(removed)
}

pub async fn size(state: &AppState) -> Result<u64, AppError> {
    Ok(queue::size(&state.db).await?)
}

/// Pairs the two oldest entries into a new game, if there are two.
///
/// Both entries are deleted in the same transaction that creates the game;
/// if a concurrent pairing already took one of them the transaction rolls
/// back and nothing is created. Entries whose agent is already seated in an
/// active game (a join that raced a pairing) are dropped, not paired.
pub async fn try_pair(state: &AppState) -> Result<Option<Game>, AppError> {
    let first_is_black = rand::random::<bool>();
    let move_window = state.config.timeout_for(DeadlineKind::Move);

    let outcome = with_txn(&state.db, move |txn| {
        Box::pin(async move {
            let mut dropped = Vec::new();
            loop {
                let entries = queue::oldest(txn, 2).await?;
                let [first, second] = entries.as_slice() else {
                    return Ok((None, dropped));
                };
                let (first, second) = (first.agent_id, second.agent_id);

                let mut seated = false;
                for agent_id in [first, second] {
                    if games::find_active_for_agent(txn, agent_id).await?.is_some() {
                        queue::remove(txn, agent_id).await?;
                        dropped.push(agent_id);
                        seated = true;
                    }
                }
                if seated {
                    continue;
                }

                let removed = queue::remove_pair(txn, first, second).await?;
                if removed != 2 {
                    return Err(DomainError::conflict(
                        ConflictKind::OptimisticLock,
                        "Queue entries were claimed concurrently",
                    )
                    .into());
                }

                let seats = seat_pair(first, second, first_is_black);
                let deadline = OffsetDateTime::now_utc() + move_window;
                let game = games::create_game(txn, seats, deadline).await?;
                return Ok((Some(game), dropped));
            }
        })
    })
    .await;

    let (game, dropped) = match outcome {
        Ok(paired) => paired,
        Err(e) if e.code() == ErrorCode::OptimisticLock => {
            debug!("Pairing lost a race; another request paired these agents");
            (None, Vec::new())
        }
        Err(e) => return Err(e),
    };

    for agent_id in dropped {
        debug!(agent_id, "Dropped queue entry of an agent already in a game");
        state.bus.publish(Topic::Agent(agent_id));
    }
    if let Some(game) = &game {
        info!(
            game_id = game.id,
            black = game.state.seats.black,
            white = game.state.seats.white,
            "Game created from queue"
        );
        publish_change(state, game);
    }
    Ok(game)
}
