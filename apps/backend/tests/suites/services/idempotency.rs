use renju_backend::errors::ErrorCode;
use renju_backend::repos::idempotency::MovePayload;
use renju_backend::services::game_flow::{self, MoveRequest};
use renju_backend::services::idempotency::{self, Claim};
use sea_orm::ConnectionTrait;

use crate::support::factory::{load, start_match};
use crate::support::test_state::test_state;

fn request(x: i64, y: i64, turn_number: i32, key: &str) -> MoveRequest {
    MoveRequest {
        x,
        y,
        turn_number,
        idempotency_key: key.to_string(),
    }
}

#[tokio::test]
async fn retried_move_replays_the_recorded_response() {
    let state = test_state().await;
    let m = start_match(&state, "replay").await;

    let first = game_flow::submit_move(&state, m.game_id, m.black.id, request(7, 7, 1, "k-1"))
        .await
        .unwrap();
    let again = game_flow::submit_move(&state, m.game_id, m.black.id, request(7, 7, 1, "k-1"))
        .await
        .unwrap();

    assert!(!first.duplicate);
    assert!(again.duplicate);
    assert_eq!(again.move_number, first.move_number);

    // Exactly one stone landed.
    let game = load(&state, m.game_id).await;
    assert_eq!(game.state.move_number, 1);
}

#[tokio::test]
async fn same_key_with_a_different_payload_is_a_mismatch() {
    let state = test_state().await;
    let m = start_match(&state, "mismatch").await;

    game_flow::submit_move(&state, m.game_id, m.black.id, request(7, 7, 1, "k-1"))
        .await
        .unwrap();
    let err = game_flow::submit_move(&state, m.game_id, m.black.id, request(8, 8, 1, "k-1"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::IdempotencyMismatch);
    assert_eq!(err.status().as_u16(), 409);
}

#[tokio::test]
async fn rejected_moves_replay_the_same_rejection() {
    let state = test_state().await;
    let m = start_match(&state, "rejected").await;

    let first = game_flow::submit_move(&state, m.game_id, m.black.id, request(0, 0, 1, "bad"))
        .await
        .unwrap_err();
    let again = game_flow::submit_move(&state, m.game_id, m.black.id, request(0, 0, 1, "bad"))
        .await
        .unwrap_err();
    assert_eq!(first.code(), ErrorCode::OpeningPosition);
    assert_eq!(again.code(), first.code());
    assert_eq!(again.status(), first.status());
    assert_eq!(again.detail(), first.detail());
}

#[tokio::test]
async fn keys_are_scoped_per_agent() {
    let state = test_state().await;
    let m = start_match(&state, "scoped").await;

    game_flow::submit_move(&state, m.game_id, m.black.id, request(7, 7, 1, "shared"))
        .await
        .unwrap();
    game_flow::decide_swap(&state, m.game_id, m.white.id, false)
        .await
        .unwrap();
    let white = game_flow::submit_move(&state, m.game_id, m.white.id, request(7, 8, 2, "shared"))
        .await
        .unwrap();
    assert!(!white.duplicate);
    assert_eq!(white.move_number, 2);
}

#[tokio::test]
async fn blank_keys_are_rejected_before_anything_is_recorded() {
    let state = test_state().await;
    let m = start_match(&state, "blank").await;

    let err = game_flow::submit_move(&state, m.game_id, m.black.id, request(7, 7, 1, "   "))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidIdempotencyKey);
    assert!(state.idempotency.is_empty());
}

#[tokio::test]
async fn unknown_games_leave_nothing_behind() {
    let state = test_state().await;
    let m = start_match(&state, "ghost").await;

    for game_id in 900_000..900_005 {
        let err = game_flow::submit_move(&state, game_id, m.black.id, request(7, 7, 1, "k-1"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::GameNotFound);
    }
    assert!(state.idempotency.is_empty());

    // A direct claim hits the foreign key and reports the game, not an outage.
    let payload = MovePayload {
        turn_number: 1,
        x: 7,
        y: 7,
    };
    let err = idempotency::claim(&state.db, &state.idempotency, 900_000, m.black.id, "k-1", payload)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::GameNotFound);
    assert!(state.idempotency.is_empty());
}

#[tokio::test]
async fn unavailable_log_degrades_to_the_in_process_map() {
    let state = test_state().await;
    let m = start_match(&state, "degrade").await;
    state
        .db
        .execute_unprepared("DROP TABLE move_idempotency")
        .await
        .unwrap();

    let payload = MovePayload {
        turn_number: 1,
        x: 7,
        y: 7,
    };
    let ticket = match idempotency::claim(&state.db, &state.idempotency, m.game_id, m.black.id, "k-1", payload)
        .await
        .unwrap()
    {
        Claim::Fresh(ticket) => ticket,
        Claim::Replay(_) => panic!("first claim must be fresh"),
    };
    assert_eq!(state.idempotency.len(), 1);

    // A concurrent duplicate sees the key held in-process.
    let err = idempotency::claim(&state.db, &state.idempotency, m.game_id, m.black.id, "k-1", payload)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::IdempotencyInProgress);

    let result = game_flow::submit_move(&state, m.game_id, m.black.id, request(7, 7, 1, "other"))
        .await;
    let first = result.as_ref().map(|r| r.move_number).unwrap();
    idempotency::complete(&state.db, &state.idempotency, ticket, &result).await;

    let replay = game_flow::submit_move(&state, m.game_id, m.black.id, request(7, 7, 1, "k-1"))
        .await
        .unwrap();
    assert!(replay.duplicate);
    assert_eq!(replay.move_number, first);

    let err = game_flow::submit_move(&state, m.game_id, m.black.id, request(8, 8, 1, "k-1"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::IdempotencyMismatch);

    // Exactly one stone landed across all of the above.
    assert_eq!(load(&state, m.game_id).await.state.move_number, 1);
}
