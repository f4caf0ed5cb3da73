//! Deadline enforcement: opportunistic on every read/mutation, plus a
//! periodic sweep for games nobody is polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::arena::ArenaConfig;
use crate::domain::game_transition::{
    after_swap_decision, auto_no_swap_eligible, deadline_kind, finished, timeout_outcome,
};
use crate::domain::state::{GameState, SwapDecider};
use crate::error::AppError;
use crate::repos::games::{self, Game};
use crate::services::ratings;
use crate::state::app_state::AppState;

/// Rows examined per sweep query.
pub const SWEEP_BATCH_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Automation {
    Nothing,
    Forfeit,
    AutoNoSwap,
}

/// Deadline for the pending action of `state`, `None` once finished.
pub fn next_deadline(
    config: &ArenaConfig,
    state: &GameState,
    now: OffsetDateTime,
) -> Option<OffsetDateTime> {
    deadline_kind(state).map(|kind| now + config.timeout_for(kind))
}

pub fn publish_change(state: &AppState, game: &Game) {
    let seats = game.state.seats;
    state.bus.publish_game(game.id, [seats.black, seats.white]);
}

/// Applies whichever automation is due: the deadline forfeit first, then
/// the ply-5 automatic "no swap". Losing a race to another writer is not an
/// error; the latest stored state is returned instead.
pub async fn resolve_due(state: &AppState, game: Game) -> Result<Game, AppError> {
    Ok(resolve_due_with_report(state, game).await?.0)
}

pub async fn resolve_due_with_report(
    state: &AppState,
    game: Game,
) -> Result<(Game, Automation), AppError> {
    let now = OffsetDateTime::now_utc();
    if game.deadline_passed(now) {
        return forfeit(state, game).await;
    }
    if let Some(grace) = state.config.auto_no_swap_after() {
        if auto_no_swap_eligible(&game.state) && game.updated_at + grace <= now {
            return auto_no_swap(state, game, now).await;
        }
    }
    Ok((game, Automation::Nothing))
}

/// Loads a game and applies any due automation.
pub async fn load_resolved(state: &AppState, game_id: i64) -> Result<Game, AppError> {
    let game = games::require_game(&state.db, game_id).await?;
    resolve_due(state, game).await
}

async fn forfeit(state: &AppState, game: Game) -> Result<(Game, Automation), AppError> {
    let Some((winner, reason)) = timeout_outcome(&game.state) else {
        return Ok((game, Automation::Nothing));
    };
    let next = finished(&game.state, Some(winner), reason);

    match games::update_state(&state.db, &game, &next, None).await {
        Ok(updated) => {
            info!(
                game_id = updated.id,
                winner = %winner,
                reason = reason.as_str(),
                move_number = updated.state.move_number,
                "Game forfeited on timeout"
            );
            publish_change(state, &updated);
            ratings::settle(&state.db, &updated).await;
            Ok((updated, Automation::Forfeit))
        }
        Err(e) if e.is_optimistic_lock() => {
            debug!(game_id = game.id, "Timeout already resolved by another writer");
            Ok((games::require_game(&state.db, game.id).await?, Automation::Nothing))
        }
        Err(e) => Err(e.into()),
    }
}

async fn auto_no_swap(
    state: &AppState,
    game: Game,
    now: OffsetDateTime,
) -> Result<(Game, Automation), AppError> {
    let next = after_swap_decision(&game.state, SwapDecider::AutoNoSwap, false, now);
    let deadline = next_deadline(&state.config, &next, now);

    match games::update_state(&state.db, &game, &next, deadline).await {
        Ok(updated) => {
            info!(game_id = updated.id, "Ply-5 swap auto-resolved as no swap");
            publish_change(state, &updated);
            Ok((updated, Automation::AutoNoSwap))
        }
        Err(e) if e.is_optimistic_lock() => {
            debug!(game_id = game.id, "Auto no-swap lost the race; re-reading");
            Ok((games::require_game(&state.db, game.id).await?, Automation::Nothing))
        }
        Err(e) => Err(e.into()),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub forfeited: usize,
    pub auto_no_swap: usize,
    pub failed: usize,
}

impl SweepReport {
    fn tally(&mut self, outcome: Result<Automation, AppError>, game_id: i64) {
        self.scanned += 1;
        match outcome {
            Ok(Automation::Forfeit) => self.forfeited += 1,
            Ok(Automation::AutoNoSwap) => self.auto_no_swap += 1,
            Ok(Automation::Nothing) => {}
            Err(e) => {
                self.failed += 1;
                warn!(game_id, error = %e, "Sweep failed to resolve game");
            }
        }
    }
}

/// One pass over expired deadlines and stale ply-5 swap decisions.
pub async fn sweep(state: &AppState) -> Result<SweepReport, AppError> {
    let now = OffsetDateTime::now_utc();
    let mut report = SweepReport::default();

    for game in games::find_expired(&state.db, now, SWEEP_BATCH_LIMIT).await? {
        let id = game.id;
        let outcome = resolve_due_with_report(state, game).await.map(|(_, a)| a);
        report.tally(outcome, id);
    }

    if let Some(grace) = state.config.auto_no_swap_after() {
        let cutoff = now - grace;
        for game in games::find_stale_final_swaps(&state.db, cutoff, SWEEP_BATCH_LIMIT).await? {
            if !auto_no_swap_eligible(&game.state) {
                continue;
            }
            let id = game.id;
            let outcome = resolve_due_with_report(state, game).await.map(|(_, a)| a);
            report.tally(outcome, id);
        }
    }

    Ok(report)
}

/// Background driver for [`sweep`]. Ticks that fire while a previous sweep
/// is still running are skipped rather than queued.
#[derive(Clone)]
pub struct TimeoutSupervisor {
    state: AppState,
    in_flight: Arc<AtomicBool>,
}

struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TimeoutSupervisor {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Runs one sweep unless another is in flight; `None` when skipped.
    pub async fn tick(&self) -> Option<SweepReport> {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!("Timeout sweep still running; skipping tick");
            return None;
        }
        let _guard = InFlightGuard(Arc::clone(&self.in_flight));

        match sweep(&self.state).await {
            Ok(report) => {
                if report.forfeited + report.auto_no_swap + report.failed > 0 {
                    info!(
                        scanned = report.scanned,
                        forfeited = report.forfeited,
                        auto_no_swap = report.auto_no_swap,
                        failed = report.failed,
                        "Timeout sweep finished"
                    );
                }
                Some(report)
            }
            Err(e) => {
                error!(error = %e, "Timeout sweep failed");
                Some(SweepReport::default())
            }
        }
    }

    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.state.config.sweep_interval());
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(
                interval_ms = self.state.config.sweep_interval_ms,
                "Timeout supervisor started"
            );
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => {
                        let supervisor = self.clone();
                        tokio::spawn(async move {
                            supervisor.tick().await;
                        });
                    }
                }
            }
            info!("Timeout supervisor stopped");
        })
    }
}
