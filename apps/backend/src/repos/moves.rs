//! Placed stones.

use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::moves_sea::{self as moves_adapter, MoveCreate};
use crate::domain::board::{Board, Color, Point};
use crate::entities::moves;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::repos::games::{color_from_db, color_to_db};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoneMove {
    pub move_number: i32,
    pub x: u8,
    pub y: u8,
    pub color: Color,
    pub is_forbidden: bool,
}

impl StoneMove {
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl TryFrom<moves::Model> for StoneMove {
    type Error = DomainError;

    fn try_from(model: moves::Model) -> Result<Self, Self::Error> {
        let point = Point::try_new(i64::from(model.x), i64::from(model.y)).ok_or_else(|| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("move {} is off the board", model.id),
            )
        })?;
        Ok(Self {
            move_number: model.move_number,
            x: point.x,
            y: point.y,
            color: color_from_db(model.color),
            is_forbidden: model.is_forbidden,
        })
    }
}

pub async fn create_move<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    move_number: i32,
    at: Point,
    color: Color,
    is_forbidden: bool,
) -> Result<StoneMove, DomainError> {
    let dto = MoveCreate {
        game_id,
        move_number,
        x: i16::from(at.x),
        y: i16::from(at.y),
        color: color_to_db(color),
        is_forbidden,
    };
    StoneMove::try_from(moves_adapter::create_move(conn, dto).await?)
}

pub async fn list_for_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<StoneMove>, DomainError> {
    moves_adapter::list_for_game(conn, game_id)
        .await?
        .into_iter()
        .map(StoneMove::try_from)
        .collect()
}

/// Board with every recorded stone, forbidden ones included: a forbidden
/// placement still occupies its cell on the final board.
pub fn board_from(moves: &[StoneMove]) -> Board {
    Board::from_stones(moves.iter().map(|m| (m.point(), m.color)))
}
