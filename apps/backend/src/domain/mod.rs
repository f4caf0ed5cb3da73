//! Domain layer: pure game logic types and helpers.

pub mod board;
pub mod game_transition;
pub mod opening;
pub mod rating;
pub mod revision;
pub mod rules;
pub mod state;

#[cfg(test)]
mod test_gens;
#[cfg(test)]
mod tests_props_rules;

// Re-exports for ergonomics
pub use board::{Board, Color, Point, BOARD_SIZE, CENTER};
pub use game_transition::{ActionContext, DeadlineKind, RequiredAction};
pub use rules::{evaluate_move, Evaluation};
pub use state::{GameState, GameStatus, OpeningState, Phase, ResultReason, Seats, SwapDecider};
