//! Opening protocol and turn state machine.
//!
//! Everything here is pure: given a [`GameState`], derive who must act and
//! how the state looks after an action. Persistence, deadlines in wall
//! clock time and concurrency control live in the service layer.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::board::{Color, MAX_PLIES};
use crate::domain::opening::{opening_turn_color, OFFER10_AFTER_PLY, OPENING_PLIES};
use crate::domain::state::{GameState, GameStatus, Phase, ResultReason, SwapDecider, SwapRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredAction {
    Move,
    Swap,
    #[serde(rename = "offer10_select")]
    Offer10Select,
}

/// Which timeout window applies to the pending action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineKind {
    Move,
    Decision,
}

impl RequiredAction {
    pub const fn deadline_kind(self) -> DeadlineKind {
        match self {
            RequiredAction::Move => DeadlineKind::Move,
            RequiredAction::Swap | RequiredAction::Offer10Select => DeadlineKind::Decision,
        }
    }

    pub const fn timeout_reason(self) -> ResultReason {
        match self {
            RequiredAction::Move => ResultReason::TimeoutMove,
            RequiredAction::Swap => ResultReason::TimeoutSwap,
            RequiredAction::Offer10Select => ResultReason::TimeoutOffer10Select,
        }
    }
}

/// The pending action of an active game and the agent who owes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionContext {
    pub action: RequiredAction,
    pub actor: i64,
    /// Actor's current color.
    pub color: Color,
}

/// Color expected to place ply `ply`: fixed by parity in the opening,
/// `turn_color` afterwards.
pub fn expected_color_for_ply(state: &GameState, ply: i32) -> Color {
    if ply <= OPENING_PLIES {
        opening_turn_color(ply)
    } else {
        state.turn_color
    }
}

/// Derives the pending action. Colors are always resolved through the
/// current seats, so a completed swap is reflected immediately.
pub fn required_action(state: &GameState) -> Option<ActionContext> {
    if !state.is_active() {
        return None;
    }
    let opening = &state.opening;
    let seats = state.seats;

    if opening.awaiting_offer10_selection {
        let actor = opening.tentative_white_id.unwrap_or(seats.white);
        let color = seats.color_of(actor).unwrap_or(Color::White);
        return Some(ActionContext {
            action: RequiredAction::Offer10Select,
            actor,
            color,
        });
    }

    if let Some(after) = pending_swap_ply(state) {
        let color = opening_turn_color(after).opposite();
        return Some(ActionContext {
            action: RequiredAction::Swap,
            actor: seats.holder(color),
            color,
        });
    }

    let color = expected_color_for_ply(state, state.next_ply());
    Some(ActionContext {
        action: RequiredAction::Move,
        actor: seats.holder(color),
        color,
    })
}

/// Ply whose swap decision is outstanding, if any.
pub fn pending_swap_ply(state: &GameState) -> Option<i32> {
    let opening = &state.opening;
    if !opening.awaiting_swap {
        return None;
    }
    opening
        .swap_after_move
        .filter(|ply| (1..=OPENING_PLIES).contains(ply))
}

/// Offer-of-ten window: right after the ply-4 swap decision, nothing pending.
pub fn offer10_window_open(state: &GameState) -> bool {
    state.is_active()
        && state.move_number == OFFER10_AFTER_PLY
        && !state.opening.decision_pending()
}

/// Ply-5 swap decision waiting and eligible for the automatic "no swap".
pub fn auto_no_swap_eligible(state: &GameState) -> bool {
    state.is_active()
        && state.move_number == OPENING_PLIES
        && !state.opening.awaiting_offer10_selection
        && pending_swap_ply(state) == Some(OPENING_PLIES)
}

/// Outcome of a deadline expiring: the acting side forfeits.
pub fn timeout_outcome(state: &GameState) -> Option<(Color, ResultReason)> {
    required_action(state).map(|ctx| (ctx.color.opposite(), ctx.action.timeout_reason()))
}

/// Deadline window for the state's pending action; `None` once finished.
pub fn deadline_kind(state: &GameState) -> Option<DeadlineKind> {
    required_action(state).map(|ctx| ctx.action.deadline_kind())
}

/// State after a non-terminal placement of ply `ply` by `color`.
pub fn after_placement(state: &GameState, ply: i32, color: Color) -> GameState {
    let mut next = state.clone();
    next.move_number = ply;

    if ply <= OPENING_PLIES {
        next.opening.awaiting_swap = true;
        next.opening.swap_after_move = Some(ply);
        next.opening.awaiting_offer10 = false;
        next.phase = if ply < OPENING_PLIES {
            Phase::for_ply(ply + 1)
        } else {
            Phase::Opening5
        };
        next.turn_color = if ply < OPENING_PLIES {
            opening_turn_color(ply + 1)
        } else {
            color.opposite()
        };
    } else {
        next.phase = Phase::Midgame;
        next.turn_color = color.opposite();
    }

    if ply >= MAX_PLIES {
        return finished(&next, None, ResultReason::DrawBoardFull);
    }
    next
}

/// State after the pending swap decision after ply `after` resolves.
pub fn after_swap_decision(
    state: &GameState,
    decider: SwapDecider,
    swapped: bool,
    at: OffsetDateTime,
) -> GameState {
    let mut next = state.clone();
    let after = pending_swap_ply(state).unwrap_or(state.move_number);

    if swapped {
        next.seats = state.seats.swapped();
    }

    let upcoming = after + 1;
    next.phase = Phase::for_ply(upcoming);
    next.turn_color = if upcoming <= OPENING_PLIES {
        opening_turn_color(upcoming)
    } else {
        Color::White
    };
    next.opening.awaiting_swap = false;
    next.opening.swap_after_move = None;
    next.opening.awaiting_offer10 = after == OFFER10_AFTER_PLY;
    next.opening.swap_history.push(SwapRecord {
        move_number: after,
        decider,
        swapped,
        at,
    });
    next
}

/// State after tentative black submits an offer of ten.
pub fn after_offer_submitted(state: &GameState, offer_id: i64) -> GameState {
    let mut next = state.clone();
    next.opening.awaiting_offer10 = false;
    next.opening.awaiting_offer10_selection = true;
    next.opening.offer10_id = Some(offer_id);
    next
}

/// State after tentative white picks a candidate, which becomes ply 5.
/// The ply-5 swap decision is skipped.
pub fn after_offer_selection(state: &GameState) -> GameState {
    let mut next = state.clone();
    next.move_number = OPENING_PLIES;
    next.phase = Phase::Midgame;
    next.turn_color = Color::White;
    next.opening.awaiting_offer10 = false;
    next.opening.awaiting_offer10_selection = false;
    next.opening.awaiting_swap = false;
    next.opening.swap_after_move = None;
    next
}

pub fn finished(state: &GameState, winner: Option<Color>, reason: ResultReason) -> GameState {
    let mut next = state.clone();
    next.status = GameStatus::Finished;
    next.winner = winner;
    next.result_reason = Some(reason);
    next.opening.awaiting_swap = false;
    next.opening.awaiting_offer10 = false;
    next.opening.awaiting_offer10_selection = false;
    next
}
