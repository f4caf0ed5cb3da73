use renju_backend::domain::board::{Color, Point};
use renju_backend::domain::game_transition::RequiredAction;
use renju_backend::domain::state::GameStatus;
use renju_backend::errors::ErrorCode;
use renju_backend::services::views::{self, AgentAction};
use time::{Duration, OffsetDateTime};

use crate::support::factory::{keep_seats, play, set_deadline, start_match};
use crate::support::test_state::test_state;

#[tokio::test]
async fn fresh_game_view_offers_only_the_center() {
    let state = test_state().await;
    let m = start_match(&state, "center").await;

    let view = views::game_view(&state, m.game_id).await.unwrap();
    assert_eq!(view.status, GameStatus::Active);
    assert_eq!(view.legal_moves, Some(vec![Point::center()]));
    assert_eq!(view.required_action, Some(RequiredAction::Move));
    assert_eq!(view.acting_agent_id, Some(m.black.id));
    assert_eq!(view.black_agent_name.as_deref(), Some("center-b"));
    assert_eq!(view.white_agent_name.as_deref(), Some("center-w"));
    assert_eq!(view.board.len(), 15);
    assert!(view.board.iter().flatten().all(Option::is_none));
    assert!(view.turn_time_left_ms.is_some_and(|ms| ms > 0));
    assert!(view.last_move.is_none());
}

#[tokio::test]
async fn pending_swap_hides_legal_moves_and_names_the_decider() {
    let state = test_state().await;
    let m = start_match(&state, "pending").await;
    play(&state, m.game_id, m.black.id, (7, 7), 1).await;

    let view = views::game_view(&state, m.game_id).await.unwrap();
    assert!(view.legal_moves.is_none());
    assert_eq!(view.required_action, Some(RequiredAction::Swap));
    assert_eq!(view.acting_agent_id, Some(m.white.id));
    assert_eq!(view.board[7][7], Some(Color::Black));

    keep_seats(&state, m.game_id, m.white.id).await;
    let view = views::game_view(&state, m.game_id).await.unwrap();
    let legal = view.legal_moves.unwrap();
    assert_eq!(legal.len(), 8);
    assert!(!legal.contains(&Point::center()));
}

#[tokio::test]
async fn agent_status_tracks_whose_turn_it_is() {
    let state = test_state().await;
    let m = start_match(&state, "turns").await;

    let black = views::agent_status(&state, m.black.id).await.unwrap();
    let white = views::agent_status(&state, m.white.id).await.unwrap();
    let black_game = black.game.clone().unwrap();
    let white_game = white.game.clone().unwrap();
    assert!(black_game.is_my_turn);
    assert_eq!(black_game.required_action, AgentAction::Move);
    assert_eq!(black_game.next_turn_number, Some(1));
    assert_eq!(black_game.color, Some(Color::Black));
    assert!(!white_game.is_my_turn);
    assert_eq!(white_game.required_action, AgentAction::None);

    let before = white.revision();
    play(&state, m.game_id, m.black.id, (7, 7), 1).await;
    let white = views::agent_status(&state, m.white.id).await.unwrap();
    assert_ne!(white.revision(), before);
    assert_eq!(white.game.unwrap().required_action, AgentAction::Swap);
}

#[tokio::test]
async fn list_filters_by_status_and_resolves_timeouts() {
    let state = test_state().await;
    let live = start_match(&state, "live").await;
    let stale = start_match(&state, "stale").await;
    set_deadline(&state, stale.game_id, OffsetDateTime::now_utc() - Duration::minutes(1)).await;

    let all = views::list_games(&state, None, 10).await.unwrap();
    assert_eq!(all.len(), 2);
    let stale_summary = all.iter().find(|g| g.id == stale.game_id).unwrap();
    assert_eq!(stale_summary.status, GameStatus::Finished);

    let active = views::list_games(&state, Some(GameStatus::Active), 10)
        .await
        .unwrap();
    assert_eq!(active.iter().map(|g| g.id).collect::<Vec<_>>(), vec![live.game_id]);

    assert_eq!(views::list_games(&state, None, 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_game_is_not_found() {
    let state = test_state().await;
    let err = views::game_view(&state, 404).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::GameNotFound);
    assert_eq!(err.status().as_u16(), 404);
}
