use std::time::Duration;

use renju_backend::services::waits::{self, GameSince};
use tokio::time::Instant;

use crate::support::factory::{play, start_match};
use crate::support::test_state::test_state;

const SHORT: Duration = Duration::from_millis(150);

#[tokio::test]
async fn no_marker_returns_the_current_state_at_once() {
    let state = test_state().await;
    let m = start_match(&state, "nomark").await;

    let started = Instant::now();
    let wait = waits::wait_game(&state, m.game_id, GameSince::default(), Duration::from_secs(5))
        .await
        .unwrap();
    assert!(wait.changed);
    assert_eq!(wait.game.id, m.game_id);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn unchanged_game_times_out_with_changed_false() {
    let state = test_state().await;
    let m = start_match(&state, "idle").await;

    let since = GameSince {
        move_number: Some(0),
        ..GameSince::default()
    };
    let wait = waits::wait_game(&state, m.game_id, since, SHORT).await.unwrap();
    assert!(!wait.changed);
    assert_eq!(wait.game.move_number, 0);
}

#[tokio::test]
async fn a_move_wakes_a_parked_game_waiter() {
    let state = test_state().await;
    let m = start_match(&state, "wake").await;

    let waiter_state = state.clone();
    let game_id = m.game_id;
    let started = Instant::now();
    let waiter = tokio::spawn(async move {
        let since = GameSince {
            move_number: Some(0),
            ..GameSince::default()
        };
        waits::wait_game(&waiter_state, game_id, since, Duration::from_secs(5)).await
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    play(&state, m.game_id, m.black.id, (7, 7), 1).await;

    let wait = waiter.await.unwrap().unwrap();
    assert!(wait.changed);
    assert_eq!(wait.game.move_number, 1);
    assert!(started.elapsed() < Duration::from_secs(4));
}

#[tokio::test]
async fn revision_marker_round_trips() {
    let state = test_state().await;
    let m = start_match(&state, "rev").await;

    let first = waits::wait_game(&state, m.game_id, GameSince::default(), SHORT)
        .await
        .unwrap();
    let since = GameSince {
        revision: Some(first.revision.clone()),
        ..GameSince::default()
    };
    let second = waits::wait_game(&state, m.game_id, since, SHORT).await.unwrap();
    assert!(!second.changed);
    assert_eq!(second.revision, first.revision);
}

#[tokio::test]
async fn agent_wait_compares_revisions() {
    let state = test_state().await;
    let m = start_match(&state, "await").await;

    let first = waits::wait_agent(&state, m.white.id, None, SHORT).await.unwrap();
    assert!(first.changed);
    assert!(first.game.is_some());

    let idle = waits::wait_agent(&state, m.white.id, Some(first.revision.clone()), SHORT)
        .await
        .unwrap();
    assert!(!idle.changed);

    play(&state, m.game_id, m.black.id, (7, 7), 1).await;
    let moved = waits::wait_agent(&state, m.white.id, Some(first.revision), SHORT)
        .await
        .unwrap();
    assert!(moved.changed);
    assert!(moved.game.unwrap().is_my_turn);
}

#[test]
fn client_timeouts_are_clamped() {
    assert_eq!(waits::clamp_timeout(None), Duration::from_secs(20));
    assert_eq!(waits::clamp_timeout(Some(1)), Duration::from_secs(5));
    assert_eq!(waits::clamp_timeout(Some(600)), Duration::from_secs(55));
}
