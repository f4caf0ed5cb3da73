// Proptest generators for board positions.
// Boards are built from distinct points so every generated position is
// reachable stone-for-stone (colors are not required to alternate).

use std::collections::HashSet;

use proptest::prelude::*;

use crate::domain::board::{Board, Color, Point, BOARD_SIZE};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(64)
        .max(1);
    ProptestConfig {
        cases,
        ..ProptestConfig::default()
    }
}

pub fn point() -> impl Strategy<Value = Point> {
    (0..BOARD_SIZE as u8, 0..BOARD_SIZE as u8).prop_map(|(x, y)| Point::new(x, y))
}

pub fn color() -> impl Strategy<Value = Color> {
    prop_oneof![Just(Color::Black), Just(Color::White)]
}

/// A board with up to `max_stones` stones plus an empty target cell.
pub fn board_and_empty_point(max_stones: usize) -> impl Strategy<Value = (Board, Point)> {
    (
        proptest::collection::vec((point(), color()), 0..=max_stones),
        point(),
    )
        .prop_map(|(stones, target)| {
            let mut seen = HashSet::new();
            let board = Board::from_stones(
                stones
                    .into_iter()
                    .filter(|(p, _)| *p != target && seen.insert(*p)),
            );
            (board, target)
        })
}

/// Start point and direction of a black run of `len` stones fully on the board.
pub fn black_run(len: i32) -> impl Strategy<Value = (Point, (i8, i8))> {
    let dirs = prop_oneof![Just((1i8, 0i8)), Just((0, 1)), Just((1, 1)), Just((1, -1))];
    (point(), dirs).prop_filter_map("run must fit on the board", move |(start, dir)| {
        start.step(dir, len - 1).map(|_| (start, dir))
    })
}
