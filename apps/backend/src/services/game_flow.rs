//! Turn controller: placements, swap decisions and the offer of ten.
//!
//! Every mutation reads the game inside a transaction, validates against
//! the freshly read state, writes the stone row (if any) and then swaps the
//! game row in with a version compare-and-swap. A lost race surfaces as
//! `OPTIMISTIC_LOCK`; nothing is ever overwritten blindly.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::db::txn::with_txn;
use crate::domain::board::{Board, Color, Point};
use crate::domain::game_transition::{
    after_offer_selection, after_offer_submitted, after_placement, after_swap_decision,
    expected_color_for_ply, finished, offer10_window_open, pending_swap_ply, required_action,
};
use crate::domain::opening::{
    opening_turn_color, validate_offer10, within_opening_box, Offer10Rejection, OPENING_PLIES,
};
use crate::domain::rules::evaluate_move;
use crate::domain::state::{GameState, ResultReason, SwapDecider};
use crate::error::AppError;
use crate::errors::domain::{
    ConflictKind, DomainError, ForbiddenKind, NotFoundKind, ValidationKind,
};
use crate::repos::games::{self, Game};
use crate::repos::idempotency::MovePayload;
use crate::repos::{moves, offer10};
use crate::services::idempotency::{self, Claim};
use crate::services::ratings;
use crate::services::timeouts::{self, next_deadline, publish_change};
use crate::state::app_state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub ok: bool,
    pub move_number: i32,
    pub forbidden: bool,
    pub winner: Option<Color>,
    pub reason: Option<ResultReason>,
    pub duplicate: bool,
}

#[derive(Debug, Clone)]
pub struct MoveRequest {
    pub x: i64,
    pub y: i64,
    pub turn_number: i32,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapResponse {
    pub ok: bool,
    pub swapped: bool,
    pub move_number: i32,
    pub black_agent_id: i64,
    pub white_agent_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferResponse {
    pub ok: bool,
    pub offer10_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectResponse {
    pub ok: bool,
    pub move_number: i32,
    pub x: u8,
    pub y: u8,
}

pub fn parse_point(x: i64, y: i64) -> Result<Point, DomainError> {
    Point::try_new(x, y).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::InvalidCoordinates,
            format!("({x},{y}) is outside the 15x15 board"),
        )
    })
}

fn ensure_active(state: &GameState) -> Result<(), DomainError> {
    if state.is_active() {
        Ok(())
    } else {
        Err(DomainError::conflict(
            ConflictKind::GameNotActive,
            "Game is not active",
        ))
    }
}

fn ensure_participant(state: &GameState, agent_id: i64) -> Result<Color, DomainError> {
    state.seats.color_of(agent_id).ok_or_else(|| {
        DomainError::forbidden(
            ForbiddenKind::NotAParticipant,
            "Agent is not seated in this game",
        )
    })
}

fn ensure_no_pending_decision(state: &GameState) -> Result<(), DomainError> {
    if state.opening.awaiting_swap {
        return Err(DomainError::conflict(
            ConflictKind::SwapDecisionPending,
            "Swap decision required",
        ));
    }
    if state.opening.awaiting_offer10_selection {
        return Err(DomainError::conflict(
            ConflictKind::Offer10SelectionPending,
            "Offer10 selection required",
        ));
    }
    Ok(())
}

fn ensure_empty(board: &Board, at: Point) -> Result<(), DomainError> {
    if board.is_empty_at(at) {
        Ok(())
    } else {
        Err(DomainError::conflict(
            ConflictKind::CellOccupied,
            format!("Cell {at} is already occupied"),
        ))
    }
}

/// Validates a placement against the current state; returns the color the
/// stone is placed as.
pub fn check_move(
    state: &GameState,
    board: &Board,
    agent_id: i64,
    at: Point,
    turn_number: i32,
) -> Result<Color, DomainError> {
    ensure_active(state)?;
    ensure_no_pending_decision(state)?;
    ensure_participant(state, agent_id)?;

    let ply = state.next_ply();
    if turn_number != ply {
        return Err(DomainError::conflict(
            ConflictKind::TurnNumberMismatch,
            format!("turn_number must be {ply}, got {turn_number}"),
        ));
    }

    let color = expected_color_for_ply(state, ply);
    if state.seats.holder(color) != agent_id {
        return Err(DomainError::forbidden(
            ForbiddenKind::NotYourTurn,
            format!("It is {color}'s turn"),
        ));
    }

    if ply <= OPENING_PLIES && !within_opening_box(ply, at) {
        return Err(DomainError::conflict(
            ConflictKind::OpeningPosition,
            format!("Move {ply} must lie within the opening box around the center"),
        ));
    }
    ensure_empty(board, at)?;
    Ok(color)
}

/// Resulting state and forbidden flag for a validated placement.
pub fn plan_placement(
    state: &GameState,
    board: &Board,
    at: Point,
    color: Color,
) -> (GameState, bool) {
    let ply = state.next_ply();
    if ply <= OPENING_PLIES {
        return (after_placement(state, ply, color), false);
    }

    let eval = evaluate_move(board, at, color);
    let mut placed = state.clone();
    placed.move_number = ply;
    match eval.reason {
        Some(reason) if eval.forbidden => (finished(&placed, Some(Color::White), reason), true),
        Some(reason) if eval.win => (finished(&placed, eval.win_color, reason), false),
        _ => (after_placement(state, ply, color), false),
    }
}

/// Idempotent placement entry point.
pub async fn submit_move(
    state: &AppState,
    game_id: i64,
    agent_id: i64,
    req: MoveRequest,
) -> Result<MoveResponse, AppError> {
    let key = idempotency::normalize_key(&req.idempotency_key)?;
    let at = parse_point(req.x, req.y)?;
    let payload = MovePayload {
        turn_number: req.turn_number,
        x: req.x,
        y: req.y,
    };
    // Keys are only recorded against games that exist.
    games::require_game(&state.db, game_id).await?;

    let ticket =
        match idempotency::claim(&state.db, &state.idempotency, game_id, agent_id, &key, payload)
            .await?
        {
            Claim::Fresh(ticket) => ticket,
            Claim::Replay(outcome) => {
                debug!(game_id, agent_id, "Replaying idempotent move");
                return outcome.replay();
            }
        };

    let result = apply_move(state, game_id, agent_id, at, req.turn_number).await;
    idempotency::complete(&state.db, &state.idempotency, ticket, &result).await;
    result
}

async fn apply_move(
    state: &AppState,
    game_id: i64,
    agent_id: i64,
    at: Point,
    turn_number: i32,
) -> Result<MoveResponse, AppError> {
    // Expired games forfeit before they can accept another stone.
    timeouts::load_resolved(state, game_id).await?;

    let config = state.config.clone();
    let (updated, forbidden, color) = with_txn(&state.db, move |txn| {
        Box::pin(async move {
            let game = games::require_game(txn, game_id).await?;
            let stones = moves::list_for_game(txn, game_id).await?;
            let board = moves::board_from(&stones);

            let color = check_move(&game.state, &board, agent_id, at, turn_number)?;
            let (next, forbidden) = plan_placement(&game.state, &board, at, color);

            moves::create_move(txn, game_id, turn_number, at, color, forbidden).await?;
            let now = OffsetDateTime::now_utc();
            let updated =
                games::update_state(txn, &game, &next, next_deadline(&config, &next, now)).await?;
            Ok((updated, forbidden, color))
        })
    })
    .await?;

    let result = &updated.state;
    if forbidden {
        info!(
            game_id,
            agent_id,
            move_number = turn_number,
            x = at.x,
            y = at.y,
            reason = result.result_reason.map(|r| r.as_str()),
            "Forbidden move; white wins"
        );
    } else if let Some(winner) = result.winner {
        info!(
            game_id,
            agent_id,
            move_number = turn_number,
            winner = %winner,
            reason = result.result_reason.map(|r| r.as_str()),
            "Game won"
        );
    } else {
        info!(
            game_id,
            agent_id,
            move_number = turn_number,
            color = %color,
            x = at.x,
            y = at.y,
            "Move accepted"
        );
    }

    publish_change(state, &updated);
    if !updated.is_active() {
        ratings::settle(&state.db, &updated).await;
    }

    Ok(MoveResponse {
        ok: true,
        move_number: turn_number,
        forbidden,
        winner: result.winner,
        reason: result.result_reason,
        duplicate: false,
    })
}

pub fn check_swap(state: &GameState, agent_id: i64) -> Result<i32, DomainError> {
    ensure_active(state)?;
    if state.opening.awaiting_offer10_selection {
        return Err(DomainError::conflict(
            ConflictKind::Offer10SelectionPending,
            "Offer10 selection required",
        ));
    }
    let Some(after) = pending_swap_ply(state) else {
        return Err(DomainError::conflict(
            ConflictKind::NoSwapPending,
            "No swap decision pending",
        ));
    };
    ensure_participant(state, agent_id)?;
    match required_action(state) {
        Some(ctx) if ctx.actor == agent_id => Ok(after),
        _ => Err(DomainError::forbidden(
            ForbiddenKind::NotSwapDecider,
            format!("The swap after move {after} is not yours to decide"),
        )),
    }
}

pub async fn decide_swap(
    state: &AppState,
    game_id: i64,
    agent_id: i64,
    swap: bool,
) -> Result<SwapResponse, AppError> {
    timeouts::load_resolved(state, game_id).await?;

    let config = state.config.clone();
    let (updated, after) = with_txn(&state.db, move |txn| {
        Box::pin(async move {
            let game = games::require_game(txn, game_id).await?;
            let after = check_swap(&game.state, agent_id)?;
            let now = OffsetDateTime::now_utc();
            let next = after_swap_decision(&game.state, SwapDecider::Agent { agent_id }, swap, now);
            let updated =
                games::update_state(txn, &game, &next, next_deadline(&config, &next, now)).await?;
            Ok((updated, after))
        })
    })
    .await?;

    info!(
        game_id,
        agent_id,
        after_move = after,
        swapped = swap,
        black = updated.state.seats.black,
        white = updated.state.seats.white,
        "Swap decided"
    );
    publish_change(state, &updated);

    Ok(SwapResponse {
        ok: true,
        swapped: swap,
        move_number: updated.state.move_number,
        black_agent_id: updated.state.seats.black,
        white_agent_id: updated.state.seats.white,
    })
}

fn offer_rejection(rejection: Offer10Rejection) -> DomainError {
    match rejection {
        Offer10Rejection::SameSymmetryClass(..) => {
            DomainError::conflict(ConflictKind::DuplicateSymmetryClass, rejection.to_string())
        }
        Offer10Rejection::WrongCount(_) | Offer10Rejection::DuplicatePoint(_) => {
            DomainError::validation(ValidationKind::InvalidOffer10, rejection.to_string())
        }
    }
}

/// Validates an offer submission; returns the parsed candidates.
pub fn check_offer(
    state: &GameState,
    agent_id: i64,
    raw: &[(i64, i64)],
) -> Result<Vec<Point>, DomainError> {
    ensure_active(state)?;
    ensure_participant(state, agent_id)?;
    ensure_no_pending_decision(state)?;
    if !offer10_window_open(state) {
        return Err(DomainError::conflict(
            ConflictKind::Offer10NotAllowed,
            "Offer10 is only allowed right after the move-4 swap decision",
        ));
    }
    if state.opening.tentative_black_id != Some(agent_id) {
        return Err(DomainError::forbidden(
            ForbiddenKind::NotOfferProposer,
            "Only tentative black can offer ten",
        ));
    }

    let candidates = raw
        .iter()
        .map(|&(x, y)| parse_point(x, y))
        .collect::<Result<Vec<_>, _>>()?;
    validate_offer10(&candidates).map_err(offer_rejection)?;
    Ok(candidates)
}

pub async fn submit_offer10(
    state: &AppState,
    game_id: i64,
    agent_id: i64,
    raw: Vec<(i64, i64)>,
) -> Result<OfferResponse, AppError> {
    timeouts::load_resolved(state, game_id).await?;

    let config = state.config.clone();
    let (updated, offer_id) = with_txn(&state.db, move |txn| {
        Box::pin(async move {
            let game = games::require_game(txn, game_id).await?;
            let candidates = check_offer(&game.state, agent_id, &raw)?;
            let offer = offer10::create_offer(txn, game_id, agent_id, &candidates).await?;
            let next = after_offer_submitted(&game.state, offer.id);
            let now = OffsetDateTime::now_utc();
            let updated =
                games::update_state(txn, &game, &next, next_deadline(&config, &next, now)).await?;
            Ok((updated, offer.id))
        })
    })
    .await?;

    info!(game_id, agent_id, offer10_id = offer_id, "Offer of ten submitted");
    publish_change(state, &updated);

    Ok(OfferResponse {
        ok: true,
        offer10_id: offer_id,
    })
}

/// Color of the stone placed by an offer selection: whatever the offering
/// agent (tentative black) currently plays, swaps included.
pub fn offer_stone_color(state: &GameState) -> Color {
    state
        .opening
        .tentative_black_id
        .and_then(|id| state.seats.color_of(id))
        .unwrap_or_else(|| opening_turn_color(OPENING_PLIES))
}

fn check_selection_actor(state: &GameState, agent_id: i64) -> Result<i64, DomainError> {
    ensure_active(state)?;
    let offer_id = match (state.opening.awaiting_offer10_selection, state.opening.offer10_id) {
        (true, Some(id)) => id,
        _ => {
            return Err(DomainError::conflict(
                ConflictKind::NoOffer10Pending,
                "No offer10 selection pending",
            ))
        }
    };
    ensure_participant(state, agent_id)?;
    if state.opening.tentative_white_id != Some(agent_id) {
        return Err(DomainError::forbidden(
            ForbiddenKind::NotOfferSelector,
            "Only tentative white can select from the offer",
        ));
    }
    Ok(offer_id)
}

pub async fn select_offer10(
    state: &AppState,
    game_id: i64,
    agent_id: i64,
    x: i64,
    y: i64,
) -> Result<SelectResponse, AppError> {
    let at = parse_point(x, y)?;
    timeouts::load_resolved(state, game_id).await?;

    let config = state.config.clone();
    let updated: Game = with_txn(&state.db, move |txn| {
        Box::pin(async move {
            let game = games::require_game(txn, game_id).await?;
            let offer_id = check_selection_actor(&game.state, agent_id)?;
            let Some(offer) = offer10::find_by_id(txn, offer_id).await? else {
                return Err(DomainError::not_found(
                    NotFoundKind::Offer10,
                    format!("Offer {offer_id} not found"),
                )
                .into());
            };
            if !offer.contains(at) {
                return Err(DomainError::validation(
                    ValidationKind::NotAnOfferCandidate,
                    format!("{at} is not one of the offered candidates"),
                )
                .into());
            }
            let stones = moves::list_for_game(txn, game_id).await?;
            ensure_empty(&moves::board_from(&stones), at)?;

            let color = offer_stone_color(&game.state);
            moves::create_move(txn, game_id, OPENING_PLIES, at, color, false).await?;
            offer10::record_selection(txn, offer_id, at).await?;

            let next = after_offer_selection(&game.state);
            let now = OffsetDateTime::now_utc();
            let updated =
                games::update_state(txn, &game, &next, next_deadline(&config, &next, now)).await?;
            Ok(updated)
        })
    })
    .await?;

    info!(game_id, agent_id, x = at.x, y = at.y, "Offer candidate selected as move 5");
    publish_change(state, &updated);

    Ok(SelectResponse {
        ok: true,
        move_number: updated.state.move_number,
        x: at.x,
        y: at.y,
    })
}
