//! Board geometry: points, stone colors and the 15x15 grid.

use core::fmt;

use serde::{Deserialize, Serialize};

pub const BOARD_SIZE: usize = 15;
pub const CENTER: u8 = 7;
/// Number of intersections; a game reaching this many plies is a draw.
pub const MAX_PLIES: i32 = (BOARD_SIZE * BOARD_SIZE) as i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub const fn opposite(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::White => "white",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step vector along one of the four axes a line can run on.
pub type Direction = (i8, i8);

/// Horizontal, vertical, diagonal, anti-diagonal.
pub const DIRECTIONS: [Direction; 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Point {
    pub x: u8,
    pub y: u8,
}

impl Point {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    pub const fn center() -> Self {
        Self::new(CENTER, CENTER)
    }

    /// Builds a point from untrusted coordinates, rejecting anything off the board.
    pub fn try_new(x: i64, y: i64) -> Option<Self> {
        let limit = BOARD_SIZE as i64;
        if (0..limit).contains(&x) && (0..limit).contains(&y) {
            Some(Self::new(x as u8, y as u8))
        } else {
            None
        }
    }

    /// Chebyshev distance from the center intersection.
    pub fn distance_from_center(self) -> u8 {
        self.x.abs_diff(CENTER).max(self.y.abs_diff(CENTER))
    }

    /// Moves `steps` times along `dir`; `None` once the walk leaves the board.
    pub fn step(self, dir: Direction, steps: i32) -> Option<Self> {
        let x = i64::from(self.x) + i64::from(dir.0) * i64::from(steps);
        let y = i64::from(self.y) + i64::from(dir.1) * i64::from(steps);
        Self::try_new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Stones on the grid, addressed as `cells[y][x]`.
#[derive(Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Color>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    pub fn from_stones<I>(stones: I) -> Self
    where
        I: IntoIterator<Item = (Point, Color)>,
    {
        let mut board = Self::new();
        for (point, color) in stones {
            board.place(point, color);
        }
        board
    }

    pub fn get(&self, at: Point) -> Option<Color> {
        self.cells[usize::from(at.y)][usize::from(at.x)]
    }

    pub fn is_empty_at(&self, at: Point) -> bool {
        self.get(at).is_none()
    }

    pub fn place(&mut self, at: Point, color: Color) {
        self.cells[usize::from(at.y)][usize::from(at.x)] = Some(color);
    }

    pub fn stone_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    /// Empty intersections in row-major order.
    pub fn empty_points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..BOARD_SIZE as u8)
            .flat_map(|y| (0..BOARD_SIZE as u8).map(move |x| Point::new(x, y)))
            .filter(|p| self.is_empty_at(*p))
    }

    pub fn rows(&self) -> Vec<Vec<Option<Color>>> {
        self.cells.iter().map(|row| row.to_vec()).collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row
                .iter()
                .map(|c| match c {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
