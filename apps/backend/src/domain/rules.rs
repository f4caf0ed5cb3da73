//! Rule engine: forbidden-move and win detection for one placement.
//!
//! Black (the first-moving color) is restricted: overlines, double fours
//! and double threes are forbidden, and only an exact five wins. White is
//! never restricted and wins with any run of five or more.
//!
//! All checks are evaluated on a copy of the board with the candidate
//! stone placed, so callers may pass the board either before or after
//! placing it.

use crate::domain::board::{Board, Color, Direction, Point, DIRECTIONS};
use crate::domain::state::ResultReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub forbidden: bool,
    pub win: bool,
    pub win_color: Option<Color>,
    pub reason: Option<ResultReason>,
}

impl Evaluation {
    const fn quiet() -> Self {
        Self {
            forbidden: false,
            win: false,
            win_color: None,
            reason: None,
        }
    }

    const fn forbidden(reason: ResultReason) -> Self {
        Self {
            forbidden: true,
            win: false,
            win_color: None,
            reason: Some(reason),
        }
    }

    const fn win(color: Color, reason: ResultReason) -> Self {
        Self {
            forbidden: false,
            win: true,
            win_color: Some(color),
            reason: Some(reason),
        }
    }
}

pub fn evaluate_move(board: &Board, at: Point, color: Color) -> Evaluation {
    let mut work = board.clone();
    work.place(at, color);

    match color {
        Color::White => {
            if DIRECTIONS
                .iter()
                .any(|&dir| run_length(&work, at, dir, color) >= 5)
            {
                Evaluation::win(Color::White, ResultReason::FiveOrMore)
            } else {
                Evaluation::quiet()
            }
        }
        Color::Black => evaluate_black(&work, at),
    }
}

/// Whether black may place at `at` without losing on the spot.
pub fn is_forbidden_for_black(board: &Board, at: Point) -> bool {
    evaluate_move(board, at, Color::Black).forbidden
}

fn evaluate_black(board: &Board, at: Point) -> Evaluation {
    let runs = DIRECTIONS.map(|dir| run_length(board, at, dir, Color::Black));

    if runs.iter().any(|&len| len >= 6) {
        return Evaluation::forbidden(ResultReason::Overline);
    }

    let four_directions = DIRECTIONS
        .iter()
        .filter(|&&dir| completion_points(board, at, dir, Color::Black, None, &[0]) > 0)
        .count();
    if four_directions >= 2 {
        return Evaluation::forbidden(ResultReason::DoubleFour);
    }

    if creates_double_three(board, at) {
        return Evaluation::forbidden(ResultReason::DoubleThree);
    }

    if runs.contains(&5) {
        return Evaluation::win(Color::Black, ResultReason::FiveExact);
    }

    Evaluation::quiet()
}

/// Contiguous run of `color` through `at` along one axis, `at` included.
fn run_length(board: &Board, at: Point, dir: Direction, color: Color) -> i32 {
    1 + extent(board, at, dir, 1, color, &[]) + extent(board, at, dir, -1, color, &[])
}

/// Stones of `color` directly after `from` walking `sign` along `dir`.
/// `virtual_stones` count as `color` even though the board has them empty.
fn extent(
    board: &Board,
    from: Point,
    dir: Direction,
    sign: i32,
    color: Color,
    virtual_stones: &[Point],
) -> i32 {
    let mut count = 0;
    while let Some(next) = from.step(dir, sign * (count + 1)) {
        let is_own = board.get(next) == Some(color) || virtual_stones.contains(&next);
        if !is_own {
            break;
        }
        count += 1;
    }
    count
}

/// Empty points on the axis through `at` whose placement (together with
/// `extra`, if any) completes an exact five covering every offset in
/// `anchors`. Offsets are measured in steps from `at` along `dir`.
fn completion_points(
    board: &Board,
    at: Point,
    dir: Direction,
    color: Color,
    extra: Option<Point>,
    anchors: &[i32],
) -> usize {
    let mut count = 0;
    for offset in -4..=4 {
        let Some(candidate) = at.step(dir, offset) else {
            continue;
        };
        if !board.is_empty_at(candidate) || Some(candidate) == extra {
            continue;
        }

        let virtual_stones: Vec<Point> = std::iter::once(candidate).chain(extra).collect();
        let back = extent(board, candidate, dir, -1, color, &virtual_stones);
        let forward = extent(board, candidate, dir, 1, color, &virtual_stones);
        if back + forward + 1 != 5 {
            continue;
        }

        let span = (offset - back)..=(offset + forward);
        if anchors.iter().all(|anchor| span.contains(anchor)) {
            count += 1;
        }
    }
    count
}

/// Counts empty points that, co-placed with `at`, would give black an open
/// four (two exact-five completions on one axis) running through both
/// stones. Two such points make the placement a double three.
fn creates_double_three(board: &Board, at: Point) -> bool {
    let mut qualifying = 0;
    for dir in DIRECTIONS {
        for offset in (-4..=4).filter(|o| *o != 0) {
            let Some(partner) = at.step(dir, offset) else {
                continue;
            };
            if !board.is_empty_at(partner) {
                continue;
            }
            let completions =
                completion_points(board, at, dir, Color::Black, Some(partner), &[0, offset]);
            if completions >= 2 {
                qualifying += 1;
                if qualifying >= 2 {
                    return true;
                }
            }
        }
    }
    false
}
