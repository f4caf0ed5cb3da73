//! Game state types shared by the rule engine, the opening protocol and
//! the turn controller.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::board::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Active,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "opening_1")]
    Opening1,
    #[serde(rename = "opening_2")]
    Opening2,
    #[serde(rename = "opening_3")]
    Opening3,
    #[serde(rename = "opening_4")]
    Opening4,
    #[serde(rename = "opening_5")]
    Opening5,
    #[serde(rename = "midgame")]
    Midgame,
}

impl Phase {
    /// Phase in which ply `ply` is played.
    pub fn for_ply(ply: i32) -> Self {
        match ply {
            i32::MIN..=1 => Phase::Opening1,
            2 => Phase::Opening2,
            3 => Phase::Opening3,
            4 => Phase::Opening4,
            5 => Phase::Opening5,
            _ => Phase::Midgame,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Opening1 => "opening_1",
            Phase::Opening2 => "opening_2",
            Phase::Opening3 => "opening_3",
            Phase::Opening4 => "opening_4",
            Phase::Opening5 => "opening_5",
            Phase::Midgame => "midgame",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultReason {
    FiveExact,
    FiveOrMore,
    Overline,
    DoubleFour,
    DoubleThree,
    TimeoutMove,
    TimeoutSwap,
    #[serde(rename = "timeout_offer10_select")]
    TimeoutOffer10Select,
    DrawBoardFull,
}

impl ResultReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            ResultReason::FiveExact => "five_exact",
            ResultReason::FiveOrMore => "five_or_more",
            ResultReason::Overline => "overline",
            ResultReason::DoubleFour => "double_four",
            ResultReason::DoubleThree => "double_three",
            ResultReason::TimeoutMove => "timeout_move",
            ResultReason::TimeoutSwap => "timeout_swap",
            ResultReason::TimeoutOffer10Select => "timeout_offer10_select",
            ResultReason::DrawBoardFull => "draw_board_full",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        [
            ResultReason::FiveExact,
            ResultReason::FiveOrMore,
            ResultReason::Overline,
            ResultReason::DoubleFour,
            ResultReason::DoubleThree,
            ResultReason::TimeoutMove,
            ResultReason::TimeoutSwap,
            ResultReason::TimeoutOffer10Select,
            ResultReason::DrawBoardFull,
        ]
        .into_iter()
        .find(|r| r.as_str() == raw)
    }
}

/// Who resolved a swap decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SwapDecider {
    Agent { agent_id: i64 },
    /// Ply-5 decision left unanswered past the grace window.
    AutoNoSwap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRecord {
    pub move_number: i32,
    pub decider: SwapDecider,
    pub swapped: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

/// Opening sub-state stored alongside a game.
///
/// Every field has a serde default so partially populated records decode;
/// [`OpeningState::fill_defaults`] then restores the seat identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningState {
    pub tentative_black_id: Option<i64>,
    pub tentative_white_id: Option<i64>,
    pub awaiting_swap: bool,
    pub swap_after_move: Option<i32>,
    pub swap_history: Vec<SwapRecord>,
    pub awaiting_offer10: bool,
    pub awaiting_offer10_selection: bool,
    pub offer10_id: Option<i64>,
}

impl OpeningState {
    pub fn for_new_game(black_id: i64, white_id: i64) -> Self {
        Self {
            tentative_black_id: Some(black_id),
            tentative_white_id: Some(white_id),
            ..Self::default()
        }
    }

    /// Seat identities missing from older records fall back to the current seats.
    pub fn fill_defaults(mut self, seats: Seats) -> Self {
        if self.tentative_black_id.is_none() {
            self.tentative_black_id = Some(seats.black);
        }
        if self.tentative_white_id.is_none() {
            self.tentative_white_id = Some(seats.white);
        }
        if self.awaiting_swap && self.swap_after_move.is_none() {
            self.awaiting_swap = false;
        }
        self
    }

    pub fn decision_pending(&self) -> bool {
        self.awaiting_swap || self.awaiting_offer10_selection
    }
}

/// Current black/white identities. Only a completed swap exchanges them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seats {
    pub black: i64,
    pub white: i64,
}

impl Seats {
    pub const fn holder(self, color: Color) -> i64 {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    pub fn color_of(self, agent_id: i64) -> Option<Color> {
        if agent_id == self.black {
            Some(Color::Black)
        } else if agent_id == self.white {
            Some(Color::White)
        } else {
            None
        }
    }

    pub const fn swapped(self) -> Self {
        Self {
            black: self.white,
            white: self.black,
        }
    }
}

/// Everything about a game the turn logic reasons over; storage
/// bookkeeping (id, version, timestamps) lives in the repo model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub status: GameStatus,
    pub phase: Phase,
    pub move_number: i32,
    pub turn_color: Color,
    pub seats: Seats,
    pub winner: Option<Color>,
    pub result_reason: Option<ResultReason>,
    pub opening: OpeningState,
}

impl GameState {
    pub fn new_match(seats: Seats) -> Self {
        Self {
            status: GameStatus::Active,
            phase: Phase::Opening1,
            move_number: 0,
            turn_color: Color::Black,
            seats,
            winner: None,
            result_reason: None,
            opening: OpeningState::for_new_game(seats.black, seats.white),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == GameStatus::Active
    }

    pub fn next_ply(&self) -> i32 {
        self.move_number + 1
    }
}
