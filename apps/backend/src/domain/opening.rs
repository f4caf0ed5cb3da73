//! Scripted opening: positional boxes for plies 1-5 and the offer-of-ten
//! symmetry rules.

use std::collections::{HashMap, HashSet};

use crate::domain::board::{Board, Color, Point, BOARD_SIZE};

/// Plies governed by positional legality instead of the rule engine.
pub const OPENING_PLIES: i32 = 5;
/// Size of an offer of ten.
pub const OFFER10_SIZE: usize = 10;
/// Ply the offer-of-ten window opens after.
pub const OFFER10_AFTER_PLY: i32 = 4;

/// Color that places ply `ply` during the opening: black on odd plies.
pub fn opening_turn_color(ply: i32) -> Color {
    if ply % 2 == 1 {
        Color::Black
    } else {
        Color::White
    }
}

/// Chebyshev radius around the center allowed for an opening ply
/// (ply 1 is the center itself, ply 5 a 9x9 box).
pub fn opening_radius(ply: i32) -> Option<u8> {
    match ply {
        1..=OPENING_PLIES => Some((ply - 1) as u8),
        _ => None,
    }
}

/// Side length of the box an opening ply must land in.
pub fn opening_box_side(ply: i32) -> Option<u8> {
    opening_radius(ply).map(|r| 2 * r + 1)
}

pub fn within_opening_box(ply: i32, at: Point) -> bool {
    opening_radius(ply).is_some_and(|radius| at.distance_from_center() <= radius)
}

/// Empty cells a player may choose for an opening ply.
pub fn legal_opening_points(board: &Board, ply: i32) -> Vec<Point> {
    board
        .empty_points()
        .filter(|p| within_opening_box(ply, *p))
        .collect()
}

/// Canonical representative of a point's class under the board's eight
/// rotations and reflections: the smallest image by (x, y).
pub fn symmetry_class(at: Point) -> Point {
    let n = (BOARD_SIZE - 1) as u8;
    let (x, y) = (at.x, at.y);
    [
        (x, y),
        (y, n - x),
        (n - x, n - y),
        (n - y, x),
        (n - x, y),
        (n - y, n - x),
        (x, n - y),
        (y, x),
    ]
    .into_iter()
    .min()
    .map(|(cx, cy)| Point::new(cx, cy))
    .unwrap_or(at)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer10Rejection {
    WrongCount(usize),
    DuplicatePoint(Point),
    /// Two candidates are images of each other under a board symmetry.
    SameSymmetryClass(Point, Point),
}

impl std::fmt::Display for Offer10Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Offer10Rejection::WrongCount(n) => {
                write!(f, "offer must contain exactly {OFFER10_SIZE} candidates, got {n}")
            }
            Offer10Rejection::DuplicatePoint(p) => write!(f, "candidate {p} is listed twice"),
            Offer10Rejection::SameSymmetryClass(a, b) => {
                write!(f, "candidates {a} and {b} are symmetric to each other")
            }
        }
    }
}

pub fn validate_offer10(candidates: &[Point]) -> Result<(), Offer10Rejection> {
    if candidates.len() != OFFER10_SIZE {
        return Err(Offer10Rejection::WrongCount(candidates.len()));
    }

    let mut seen = HashSet::with_capacity(OFFER10_SIZE);
    for p in candidates {
        if !seen.insert(*p) {
            return Err(Offer10Rejection::DuplicatePoint(*p));
        }
    }

    let mut classes: HashMap<Point, Point> = HashMap::with_capacity(OFFER10_SIZE);
    for p in candidates {
        if let Some(first) = classes.insert(symmetry_class(*p), *p) {
            return Err(Offer10Rejection::SameSymmetryClass(first, *p));
        }
    }
    Ok(())
}
