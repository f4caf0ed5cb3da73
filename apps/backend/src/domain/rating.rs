//! Elo rating update applied once per finished game.

use crate::domain::board::Color;

pub const INITIAL_RATING: i32 = 1500;
pub const K_FACTOR: f64 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingChange {
    pub black: i32,
    pub white: i32,
}

/// New ratings for both sides. `winner == None` scores a draw.
pub fn elo_update(black: i32, white: i32, winner: Option<Color>) -> RatingChange {
    let expected_black = 1.0 / (1.0 + 10f64.powf(f64::from(white - black) / 400.0));
    let score_black = match winner {
        Some(Color::Black) => 1.0,
        Some(Color::White) => 0.0,
        None => 0.5,
    };
    let score_white = 1.0 - score_black;

    RatingChange {
        black: (f64::from(black) + K_FACTOR * (score_black - expected_black)).round() as i32,
        white: (f64::from(white) + K_FACTOR * (score_white - (1.0 - expected_black))).round() as i32,
    }
}
