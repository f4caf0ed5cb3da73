use renju_backend::errors::ErrorCode;
use renju_backend::repos::{games, queue};
use renju_backend::services::{matchmaking, views};
use time::{Duration, OffsetDateTime};

use crate::support::factory::{register, set_deadline, start_match};
use crate::support::test_state::test_state;

#[tokio::test]
async fn two_joins_pair_into_a_game() {
    let state = test_state().await;
    let first = register(&state, "alpha").await;
    let second = register(&state, "beta").await;

    let joined = matchmaking::join(&state, first.id).await.unwrap();
    assert_eq!(joined.queue_size, 1);
    assert_eq!(joined.game_id, None);

    // Rejoining keeps a single entry.
    let again = matchmaking::join(&state, first.id).await.unwrap();
    assert_eq!(again.queue_size, 1);

    let paired = matchmaking::join(&state, second.id).await.unwrap();
    let game_id = paired.game_id.expect("second join should pair");
    assert_eq!(paired.queue_size, 0);

    let game = games::require_game(&state.db, game_id).await.unwrap();
    let mut seated = [game.state.seats.black, game.state.seats.white];
    seated.sort_unstable();
    assert_eq!(seated, [first.id, second.id]);
    assert!(game.turn_deadline_at.is_some());

    let status = views::agent_status(&state, first.id).await.unwrap();
    assert!(!status.in_queue);
    assert_eq!(status.game.map(|g| g.id), Some(game_id));
}

#[tokio::test]
async fn seated_agents_cannot_queue() {
    let state = test_state().await;
    let first = register(&state, "gamma").await;
    let second = register(&state, "delta").await;
    matchmaking::join(&state, first.id).await.unwrap();
    let game_id = matchmaking::join(&state, second.id)
        .await
        .unwrap()
        .game_id
        .unwrap();

    let err = matchmaking::join(&state, first.id).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::AlreadyInGame);
    assert!(err.detail().contains(&game_id.to_string()));

    // Once the game times out the agent may queue again.
    set_deadline(&state, game_id, OffsetDateTime::now_utc() - Duration::minutes(1)).await;
    let rejoined = matchmaking::join(&state, first.id).await.unwrap();
    assert_eq!(rejoined.queue_size, 1);
}

#[tokio::test]
async fn leave_reports_whether_an_entry_existed() {
    let state = test_state().await;
    let agent = register(&state, "epsilon").await;

    assert!(!matchmaking::leave(&state, agent.id).await.unwrap());
    matchmaking::join(&state, agent.id).await.unwrap();
    assert!(matchmaking::leave(&state, agent.id).await.unwrap());
    assert_eq!(matchmaking::size(&state).await.unwrap(), 0);
}

#[tokio::test]
async fn pairing_with_one_entry_is_a_no_op() {
    let state = test_state().await;
    assert!(matchmaking::try_pair(&state).await.unwrap().is_none());
    let agent = register(&state, "zeta").await;
    matchmaking::join(&state, agent.id).await.unwrap();
    assert!(matchmaking::try_pair(&state).await.unwrap().is_none());
    assert_eq!(matchmaking::size(&state).await.unwrap(), 1);
}

#[tokio::test]
async fn stale_entry_of_a_seated_agent_is_dropped_not_paired() {
    let state = test_state().await;
    let m = start_match(&state, "seated").await;
    // A join that passed its check just before this agent was paired
    // leaves an entry behind.
    queue::upsert(&state.db, m.black.id).await.unwrap();

    let newcomer = register(&state, "newcomer").await;
    let joined = matchmaking::join(&state, newcomer.id).await.unwrap();
    assert_eq!(joined.game_id, None);
    assert_eq!(joined.queue_size, 1);
    assert!(!queue::is_queued(&state.db, m.black.id).await.unwrap());

    let active = games::find_active_for_agent(&state.db, m.black.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, m.game_id);
}
