use renju_backend::domain::board::Color;
use renju_backend::domain::state::{GameStatus, Phase, ResultReason, SwapDecider};
use renju_backend::repos::{agents, games};
use renju_backend::services::game_flow;
use renju_backend::services::timeouts::{self, Automation, TimeoutSupervisor};
use time::{Duration, OffsetDateTime};

use crate::support::factory::{load, play, play_opening, set_deadline, start_match};
use crate::support::test_state::{eager_auto_no_swap, test_state, test_state_with};

fn a_minute_ago() -> OffsetDateTime {
    OffsetDateTime::now_utc() - Duration::minutes(1)
}

#[tokio::test]
async fn expired_move_deadline_forfeits_on_the_next_read() {
    let state = test_state().await;
    let m = start_match(&state, "tmove").await;
    set_deadline(&state, m.game_id, a_minute_ago()).await;

    let game = timeouts::load_resolved(&state, m.game_id).await.unwrap();
    assert_eq!(game.state.status, GameStatus::Finished);
    assert_eq!(game.state.winner, Some(Color::White));
    assert_eq!(game.state.result_reason, Some(ResultReason::TimeoutMove));
    assert_eq!(game.turn_deadline_at, None);

    let white = agents::find_by_id(&state.db, m.white.id).await.unwrap().unwrap();
    assert_eq!(white.wins, 1);
}

#[tokio::test]
async fn expired_swap_decision_forfeits_the_decider() {
    let state = test_state().await;
    let m = start_match(&state, "tswap").await;
    play(&state, m.game_id, m.black.id, (7, 7), 1).await;
    set_deadline(&state, m.game_id, a_minute_ago()).await;

    let game = timeouts::load_resolved(&state, m.game_id).await.unwrap();
    assert_eq!(game.state.winner, Some(Color::Black));
    assert_eq!(game.state.result_reason, Some(ResultReason::TimeoutSwap));
}

#[tokio::test]
async fn live_deadlines_are_left_alone() {
    let state = test_state().await;
    let m = start_match(&state, "tlive").await;

    let before = load(&state, m.game_id).await;
    let (after, automation) = timeouts::resolve_due_with_report(&state, before.clone())
        .await
        .unwrap();
    assert_eq!(automation, Automation::Nothing);
    assert_eq!(after, before);
}

#[tokio::test]
async fn sweep_resolves_only_expired_games() {
    let state = test_state().await;
    let expired_a = start_match(&state, "swa").await;
    let expired_b = start_match(&state, "swb").await;
    let live = start_match(&state, "swc").await;
    set_deadline(&state, expired_a.game_id, a_minute_ago()).await;
    set_deadline(&state, expired_b.game_id, a_minute_ago()).await;

    let report = timeouts::sweep(&state).await.unwrap();
    assert_eq!(report.forfeited, 2);
    assert_eq!(report.failed, 0);

    assert!(!load(&state, expired_a.game_id).await.is_active());
    assert!(!load(&state, expired_b.game_id).await.is_active());
    assert!(load(&state, live.game_id).await.is_active());

    // A second pass finds nothing left to do.
    let again = timeouts::sweep(&state).await.unwrap();
    assert_eq!(again.forfeited, 0);
}

#[tokio::test]
async fn supervisor_tick_runs_a_sweep() {
    let state = test_state().await;
    let m = start_match(&state, "tick").await;
    set_deadline(&state, m.game_id, a_minute_ago()).await;

    let supervisor = TimeoutSupervisor::new(state.clone());
    let report = supervisor.tick().await.expect("idle supervisor should sweep");
    assert_eq!(report.forfeited, 1);
    assert!(!supervisor.is_running());
}

#[tokio::test]
async fn unanswered_ply_five_swap_resolves_as_no_swap() {
    let state = test_state_with(eager_auto_no_swap()).await;
    let m = start_match(&state, "auto").await;
    play_opening(&state, &m, 4).await;
    play(&state, m.game_id, m.black.id, (9, 9), 5).await;

    let game = timeouts::load_resolved(&state, m.game_id).await.unwrap();
    assert!(game.is_active());
    assert_eq!(game.state.phase, Phase::Midgame);
    assert!(!game.state.opening.awaiting_swap);
    let last = game.state.opening.swap_history.last().unwrap();
    assert_eq!(last.move_number, 5);
    assert_eq!(last.decider, SwapDecider::AutoNoSwap);
    assert!(!last.swapped);
    assert_eq!(game.state.seats.black, m.black.id);
}

#[tokio::test]
async fn earlier_swaps_are_never_automated() {
    let state = test_state_with(eager_auto_no_swap()).await;
    let m = start_match(&state, "noauto").await;
    play(&state, m.game_id, m.black.id, (7, 7), 1).await;

    let game = timeouts::load_resolved(&state, m.game_id).await.unwrap();
    assert!(game.state.opening.awaiting_swap);
    assert_eq!(game.state.opening.swap_after_move, Some(1));
}

#[tokio::test]
async fn only_games_parked_on_the_final_swap_are_swept_as_stale() {
    let state = test_state().await;
    let parked = start_match(&state, "parked").await;
    play_opening(&state, &parked, 4).await;
    play(&state, parked.game_id, parked.black.id, (9, 9), 5).await;

    let selected = start_match(&state, "select").await;
    play_opening(&state, &selected, 4).await;
    let candidates = vec![
        (0, 0),
        (1, 0),
        (2, 0),
        (3, 0),
        (4, 0),
        (5, 0),
        (6, 0),
        (7, 0),
        (1, 1),
        (2, 1),
    ];
    game_flow::submit_offer10(&state, selected.game_id, selected.black.id, candidates)
        .await
        .unwrap();
    game_flow::select_offer10(&state, selected.game_id, selected.white.id, 3, 0)
        .await
        .unwrap();
    let game = load(&state, selected.game_id).await;
    assert_eq!(game.state.move_number, 5);
    assert_eq!(game.state.phase, Phase::Midgame);

    let cutoff = OffsetDateTime::now_utc() + Duration::hours(1);
    let stale = games::find_stale_final_swaps(&state.db, cutoff, 10).await.unwrap();
    let ids: Vec<i64> = stale.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![parked.game_id]);
}
