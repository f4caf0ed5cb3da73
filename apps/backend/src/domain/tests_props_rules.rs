/// Property-based tests for the rule engine
use proptest::prelude::*;

use crate::domain::board::{Board, Color};
use crate::domain::rules::evaluate_move;
use crate::domain::state::ResultReason;
use crate::domain::test_gens;

proptest! {
    #![proptest_config(test_gens::proptest_config())]

    /// Property: white is never restricted.
    #[test]
    fn prop_white_never_forbidden((board, at) in test_gens::board_and_empty_point(80)) {
        let eval = evaluate_move(&board, at, Color::White);
        prop_assert!(!eval.forbidden);
        if eval.win {
            prop_assert_eq!(eval.win_color, Some(Color::White));
            prop_assert_eq!(eval.reason, Some(ResultReason::FiveOrMore));
        }
    }

    /// Property: any black line of six or more through the placement is an
    /// overline, whatever else is on the board.
    #[test]
    fn prop_black_six_is_overline(
        (start, dir) in test_gens::black_run(6),
        pick in 0i32..6,
        (noise, _) in test_gens::board_and_empty_point(40),
    ) {
        let mut board = noise;
        let run: Vec<_> = (0..6).filter_map(|i| start.step(dir, i)).collect();
        for p in &run {
            board.place(*p, Color::Black);
        }
        let at = run[pick as usize];
        let eval = evaluate_move(&board, at, Color::Black);
        prop_assert!(eval.forbidden);
        prop_assert!(!eval.win);
        prop_assert_eq!(eval.reason, Some(ResultReason::Overline));
    }

    /// Property: evaluation is deterministic and does not depend on whether
    /// the candidate stone is already on the board.
    #[test]
    fn prop_evaluation_is_deterministic(
        (board, at) in test_gens::board_and_empty_point(60),
        color in test_gens::color(),
    ) {
        let first = evaluate_move(&board, at, color);
        let second = evaluate_move(&board, at, color);
        prop_assert_eq!(first, second);

        let mut placed = board.clone();
        placed.place(at, color);
        prop_assert_eq!(first, evaluate_move(&placed, at, color));
    }

    /// Property: a forbidden result never reports a win and vice versa.
    #[test]
    fn prop_forbidden_and_win_are_exclusive((board, at) in test_gens::board_and_empty_point(100)) {
        let eval = evaluate_move(&board, at, Color::Black);
        prop_assert!(!(eval.forbidden && eval.win));
        prop_assert_eq!(eval.reason.is_some(), eval.forbidden || eval.win);
    }
}

#[test]
fn empty_board_center_is_quiet_for_both_colors() {
    let board = Board::new();
    for color in [Color::Black, Color::White] {
        let eval = evaluate_move(&board, crate::domain::board::Point::center(), color);
        assert!(!eval.forbidden && !eval.win);
    }
}
