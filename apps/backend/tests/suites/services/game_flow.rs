use renju_backend::domain::board::Color;
use renju_backend::domain::state::{GameStatus, Phase, ResultReason};
use renju_backend::errors::ErrorCode;
use renju_backend::repos::agents;
use renju_backend::services::game_flow;

use crate::support::factory::{keep_seats, load, play, play_opening, start_match, try_play};
use crate::support::test_state::test_state;

/// White stones for midgame plies, far from anything black builds.
const WHITE_FILLER: [(i64, i64); 6] = [(14, 0), (14, 2), (14, 4), (14, 6), (14, 8), (14, 10)];

#[tokio::test]
async fn opening_alternates_placements_and_swap_decisions() {
    let state = test_state().await;
    let m = start_match(&state, "open").await;

    let first = play(&state, m.game_id, m.black.id, (7, 7), 1).await;
    assert!(first.ok);
    assert_eq!(first.move_number, 1);
    assert!(!first.duplicate);

    // Placement is blocked until white answers the swap offer.
    let err = try_play(&state, m.game_id, m.white.id, (7, 8), 2).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::SwapDecisionPending);

    let decided = keep_seats(&state, m.game_id, m.white.id).await;
    assert!(!decided.swapped);
    assert_eq!(decided.black_agent_id, m.black.id);

    play(&state, m.game_id, m.white.id, (7, 8), 2).await;
    let game = load(&state, m.game_id).await;
    assert_eq!(game.state.move_number, 2);
    assert_eq!(game.state.opening.swap_after_move, Some(2));
    assert_eq!(game.state.opening.swap_history.len(), 1);
}

#[tokio::test]
async fn accepted_swap_exchanges_who_plays_which_color() {
    let state = test_state().await;
    let m = start_match(&state, "swap").await;

    play(&state, m.game_id, m.black.id, (7, 7), 1).await;
    let swapped = game_flow::decide_swap(&state, m.game_id, m.white.id, true)
        .await
        .unwrap();
    assert!(swapped.swapped);
    assert_eq!(swapped.black_agent_id, m.white.id);
    assert_eq!(swapped.white_agent_id, m.black.id);

    // Ply 2 is white's, now held by the original black agent.
    let err = try_play(&state, m.game_id, m.white.id, (7, 8), 2).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotYourTurn);
    play(&state, m.game_id, m.black.id, (7, 8), 2).await;

    let game = load(&state, m.game_id).await;
    assert_eq!(game.state.opening.tentative_black_id, Some(m.black.id));
    assert_eq!(game.state.seats.black, m.white.id);
}

#[tokio::test]
async fn swap_decision_is_reserved_for_the_non_mover() {
    let state = test_state().await;
    let m = start_match(&state, "decider").await;

    let err = game_flow::decide_swap(&state, m.game_id, m.black.id, false)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoSwapPending);

    play(&state, m.game_id, m.black.id, (7, 7), 1).await;
    let err = game_flow::decide_swap(&state, m.game_id, m.black.id, true)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotSwapDecider);
}

#[tokio::test]
async fn placement_rejections_follow_the_validation_order() {
    let state = test_state().await;
    let m = start_match(&state, "reject").await;
    let stranger = crate::support::factory::register(&state, "stranger").await;

    let err = try_play(&state, m.game_id, stranger.id, (7, 7), 1).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotAParticipant);

    let err = try_play(&state, m.game_id, m.black.id, (7, 7), 3).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::TurnNumberMismatch);

    let err = try_play(&state, m.game_id, m.white.id, (7, 7), 1).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotYourTurn);

    let err = try_play(&state, m.game_id, m.black.id, (0, 0), 1).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::OpeningPosition);

    let err = try_play(&state, m.game_id, m.black.id, (15, 7), 1).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidCoordinates);
    assert_eq!(err.status().as_u16(), 400);

    play(&state, m.game_id, m.black.id, (7, 7), 1).await;
    keep_seats(&state, m.game_id, m.white.id).await;
    let err = try_play(&state, m.game_id, m.white.id, (7, 7), 2).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::CellOccupied);
}

#[tokio::test]
async fn midgame_starts_with_white_after_the_ply_five_decision() {
    let state = test_state().await;
    let m = start_match(&state, "mid").await;
    play_opening(&state, &m, 5).await;

    let game = load(&state, m.game_id).await;
    assert_eq!(game.state.phase, Phase::Midgame);
    assert_eq!(game.state.turn_color, Color::White);
    assert_eq!(game.state.move_number, 5);
    assert!(!game.state.opening.decision_pending());

    // No swap follows midgame plies.
    play(&state, m.game_id, m.white.id, (0, 0), 6).await;
    play(&state, m.game_id, m.black.id, (0, 12), 7).await;
}

#[tokio::test]
async fn black_five_wins_and_settles_ratings() {
    let state = test_state().await;
    let m = start_match(&state, "five").await;
    play_opening(&state, &m, 5).await;

    let mut ply = 6;
    for (i, x) in (0..4).enumerate() {
        play(&state, m.game_id, m.white.id, WHITE_FILLER[i], ply).await;
        play(&state, m.game_id, m.black.id, (x, 12), ply + 1).await;
        ply += 2;
    }
    play(&state, m.game_id, m.white.id, WHITE_FILLER[4], ply).await;
    let won = play(&state, m.game_id, m.black.id, (4, 12), ply + 1).await;

    assert!(!won.forbidden);
    assert_eq!(won.winner, Some(Color::Black));
    assert_eq!(won.reason, Some(ResultReason::FiveExact));

    let game = load(&state, m.game_id).await;
    assert_eq!(game.state.status, GameStatus::Finished);
    assert_eq!(game.turn_deadline_at, None);

    let black = agents::find_by_id(&state.db, m.black.id).await.unwrap().unwrap();
    let white = agents::find_by_id(&state.db, m.white.id).await.unwrap().unwrap();
    assert_eq!((black.rating, black.wins, black.games_played), (1516, 1, 1));
    assert_eq!((white.rating, white.losses, white.games_played), (1484, 1, 1));

    let err = try_play(&state, m.game_id, m.white.id, (14, 14), ply + 2)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::GameNotActive);
}

#[tokio::test]
async fn black_overline_is_forbidden_and_loses() {
    let state = test_state().await;
    let m = start_match(&state, "overline").await;
    play_opening(&state, &m, 5).await;

    let black_line = [(0, 12), (1, 12), (2, 12), (4, 12), (5, 12)];
    let mut ply = 6;
    for (i, at) in black_line.into_iter().enumerate() {
        play(&state, m.game_id, m.white.id, WHITE_FILLER[i], ply).await;
        play(&state, m.game_id, m.black.id, at, ply + 1).await;
        ply += 2;
    }
    play(&state, m.game_id, m.white.id, WHITE_FILLER[5], ply).await;
    let lost = play(&state, m.game_id, m.black.id, (3, 12), ply + 1).await;

    assert!(lost.forbidden);
    assert_eq!(lost.winner, Some(Color::White));
    assert_eq!(lost.reason, Some(ResultReason::Overline));

    let view = renju_backend::services::views::game_view(&state, m.game_id)
        .await
        .unwrap();
    let last = view.last_move.expect("forbidden stone is recorded");
    assert!(last.is_forbidden);
    assert_eq!((last.x, last.y), (3, 12));
    assert!(view.legal_moves.is_none());
}
