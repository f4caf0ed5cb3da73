//! Long-poll waits on a game or on an agent's status.
//!
//! A waiter subscribes before its first read, so a change landing between
//! the read and the wait still wakes it. The client timeout is served as a
//! series of segments no longer than the configured cap; every segment
//! ends in a fresh read whether or not a publish arrived.

use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::time::Instant;
use tracing::trace;

use crate::domain::revision::game_revision;
use crate::error::AppError;
use crate::realtime::{Subscription, Topic};
use crate::repos::games::Game;
use crate::services::timeouts;
use crate::services::views::{self, AgentGameView, GameSnapshot};
use crate::state::app_state::AppState;

pub const WAIT_TIMEOUT_MIN_SEC: u64 = 5;
pub const WAIT_TIMEOUT_MAX_SEC: u64 = 55;
pub const WAIT_TIMEOUT_DEFAULT_SEC: u64 = 20;

pub fn clamp_timeout(raw: Option<u64>) -> Duration {
    let secs = raw
        .unwrap_or(WAIT_TIMEOUT_DEFAULT_SEC)
        .clamp(WAIT_TIMEOUT_MIN_SEC, WAIT_TIMEOUT_MAX_SEC);
    Duration::from_secs(secs)
}

#[derive(Debug, Clone, Default)]
pub struct GameSince {
    pub move_number: Option<i32>,
    pub updated_at: Option<OffsetDateTime>,
    pub revision: Option<String>,
}

impl GameSince {
    fn is_empty(&self) -> bool {
        self.move_number.is_none() && self.updated_at.is_none() && self.revision.is_none()
    }

    /// Whether `game` differs from what the caller last saw. A caller that
    /// sent no marker at all gets the current state at once, and finished
    /// games never block.
    pub fn changed(&self, game: &Game, revision: &str) -> bool {
        if self.is_empty() || !game.is_active() {
            return true;
        }
        self.move_number.is_some_and(|m| m != game.state.move_number)
            || self.updated_at.is_some_and(|u| u != game.updated_at)
            || self.revision.as_deref().is_some_and(|r| r != revision)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameWait {
    pub changed: bool,
    pub revision: String,
    pub game: GameSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentWait {
    pub changed: bool,
    pub in_queue: bool,
    pub game: Option<AgentGameView>,
    pub revision: String,
}

/// Time left in the overall wait, capped at one segment; `None` once spent.
fn next_segment(deadline: Instant, cap: Duration) -> Option<Duration> {
    let left = deadline.saturating_duration_since(Instant::now());
    (!left.is_zero()).then(|| left.min(cap))
}

async fn park(sub: &Subscription, deadline: Instant, cap: Duration) -> bool {
    match next_segment(deadline, cap) {
        Some(segment) => {
            let woken = sub.wait(segment).await;
            trace!(woken, "wait segment ended");
            true
        }
        None => false,
    }
}

pub async fn wait_game(
    state: &AppState,
    game_id: i64,
    since: GameSince,
    timeout: Duration,
) -> Result<GameWait, AppError> {
    let sub = state.bus.subscribe(&[Topic::Game(game_id)]);
    let deadline = Instant::now() + timeout;
    let cap = state.config.wait_segment();

    loop {
        let game = timeouts::load_resolved(state, game_id).await?;
        let revision = game_revision(&game.state, game.turn_deadline_at, game.updated_at);
        let changed = since.changed(&game, &revision);
        if changed || !park(&sub, deadline, cap).await {
            return Ok(GameWait {
                changed,
                revision,
                game: GameSnapshot::from(&game),
            });
        }
    }
}

pub async fn wait_agent(
    state: &AppState,
    agent_id: i64,
    since_revision: Option<String>,
    timeout: Duration,
) -> Result<AgentWait, AppError> {
    let sub = state.bus.subscribe(&[Topic::Agent(agent_id)]);
    let deadline = Instant::now() + timeout;
    let cap = state.config.wait_segment();

    loop {
        let status = views::agent_status(state, agent_id).await?;
        let revision = status.revision();
        let changed = since_revision.as_deref() != Some(revision.as_str());
        if changed || !park(&sub, deadline, cap).await {
            return Ok(AgentWait {
                changed,
                in_queue: status.in_queue,
                game: status.game,
                revision,
            });
        }
    }
}
