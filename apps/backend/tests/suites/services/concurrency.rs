use renju_backend::domain::board::Color;
use renju_backend::domain::game_transition::after_placement;
use renju_backend::domain::state::GameStatus;
use renju_backend::error::AppError;
use renju_backend::errors::ErrorCode;
use renju_backend::repos::{agents, games};
use renju_backend::services::timeouts::{self, Automation};
use time::{Duration, OffsetDateTime};

use crate::support::factory::{load, play, set_deadline, start_match};
use crate::support::test_state::test_state;

#[tokio::test]
async fn stale_compare_and_swap_is_rejected_without_writing() {
    let state = test_state().await;
    let m = start_match(&state, "cas").await;
    let stale = load(&state, m.game_id).await;

    // Another writer advances the game.
    play(&state, m.game_id, m.black.id, (7, 7), 1).await;
    let current = load(&state, m.game_id).await;

    let next = after_placement(&stale.state, 1, Color::Black);
    let err = games::update_state(&state.db, &stale, &next, stale.turn_deadline_at)
        .await
        .unwrap_err();
    assert!(err.is_optimistic_lock());

    let app: AppError = err.into();
    assert_eq!(app.code(), ErrorCode::OptimisticLock);
    assert_eq!(app.status().as_u16(), 409);

    assert_eq!(load(&state, m.game_id).await, current);
}

#[tokio::test]
async fn losing_a_timeout_race_rereads_the_winner() {
    let state = test_state().await;
    let m = start_match(&state, "race").await;
    let expired =
        set_deadline(&state, m.game_id, OffsetDateTime::now_utc() - Duration::seconds(30)).await;

    let (first, automation) = timeouts::resolve_due_with_report(&state, expired.clone())
        .await
        .unwrap();
    assert_eq!(automation, Automation::Forfeit);
    assert_eq!(first.state.status, GameStatus::Finished);

    // A second caller still holding the pre-forfeit row.
    let (second, automation) = timeouts::resolve_due_with_report(&state, expired)
        .await
        .unwrap();
    assert_eq!(automation, Automation::Nothing);
    assert_eq!(second, first);

    // Ratings were settled once.
    let black = agents::find_by_id(&state.db, m.black.id).await.unwrap().unwrap();
    assert_eq!(black.games_played, 1);
}
