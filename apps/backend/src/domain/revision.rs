//! Revision fingerprints for long-poll callers.
//!
//! A fingerprint is an xxh3 digest over the fields a waiter cares about,
//! joined in a fixed order. Two states with the same fingerprint are
//! indistinguishable to a client deciding whether anything happened.

use time::OffsetDateTime;
use xxhash_rust::xxh3::xxh3_64;

use crate::domain::state::GameState;

#[derive(Debug, Default)]
pub struct Fingerprint {
    parts: Vec<String>,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, value: impl ToString) -> Self {
        self.parts.push(value.to_string());
        self
    }

    pub fn opt_field<T: ToString>(self, value: Option<T>) -> Self {
        let rendered = value.map(|v| v.to_string()).unwrap_or_default();
        self.field(rendered)
    }

    pub fn timestamp(self, value: Option<OffsetDateTime>) -> Self {
        self.opt_field(value.map(|t| t.unix_timestamp_nanos()))
    }

    pub fn finish(self) -> String {
        format!("{:016x}", xxh3_64(self.parts.join("|").as_bytes()))
    }
}

pub fn game_revision(
    state: &GameState,
    turn_deadline_at: Option<OffsetDateTime>,
    updated_at: OffsetDateTime,
) -> String {
    let opening = &state.opening;
    Fingerprint::new()
        .field(format!("{:?}", state.status))
        .field(state.phase.as_str())
        .field(state.move_number)
        .field(state.turn_color)
        .timestamp(turn_deadline_at)
        .timestamp(Some(updated_at))
        .field(state.seats.black)
        .field(state.seats.white)
        .field(opening.awaiting_swap)
        .opt_field(opening.swap_after_move)
        .field(opening.awaiting_offer10_selection)
        .opt_field(opening.offer10_id)
        .field(opening.swap_history.len())
        .finish()
}
