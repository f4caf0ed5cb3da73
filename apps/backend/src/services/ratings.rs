//! Elo bookkeeping for finished games.

use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::db::txn::with_txn;
use crate::domain::board::Color;
use crate::domain::rating::elo_update;
use crate::error::AppError;
use crate::errors::domain::NotFoundKind;
use crate::errors::DomainError;
use crate::repos::agents::{self, AgentResult};
use crate::repos::games::Game;

/// Applies the Elo update and result counters for both seats of a
/// finished game. Must be called once, by whoever finished the game.
pub async fn apply_game_result(db: &DatabaseConnection, game: &Game) -> Result<(), AppError> {
    if game.is_active() {
        return Ok(());
    }
    let seats = game.state.seats;
    let winner = game.state.winner;
    let game_id = game.id;

    with_txn(db, move |txn| {
        Box::pin(async move {
            let players = agents::find_many(txn, vec![seats.black, seats.white]).await?;
            let rating_of = |id: i64| {
                players
                    .iter()
                    .find(|a| a.id == id)
                    .map(|a| a.rating)
                    .ok_or_else(|| {
                        DomainError::not_found(NotFoundKind::Agent, format!("Agent {id} not found"))
                    })
            };
            let black_before = rating_of(seats.black)?;
            let white_before = rating_of(seats.white)?;
            let change = elo_update(black_before, white_before, winner);

            agents::record_result(
                txn,
                AgentResult {
                    agent_id: seats.black,
                    new_rating: change.black,
                    won: winner == Some(Color::Black),
                    lost: winner == Some(Color::White),
                },
            )
            .await?;
            agents::record_result(
                txn,
                AgentResult {
                    agent_id: seats.white,
                    new_rating: change.white,
                    won: winner == Some(Color::White),
                    lost: winner == Some(Color::Black),
                },
            )
            .await?;

            info!(
                game_id,
                black_before,
                black_after = change.black,
                white_before,
                white_after = change.white,
                "Ratings updated"
            );
            Ok(())
        })
    })
    .await
}

/// Rating failures never undo a finished game; they are logged and dropped.
pub async fn settle(db: &DatabaseConnection, game: &Game) {
    if let Err(e) = apply_game_result(db, game).await {
        warn!(game_id = game.id, error = %e, "Rating update failed");
    }
}
