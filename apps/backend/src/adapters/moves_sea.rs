//! SeaORM adapter for placed stones.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    Set,
};
use time::OffsetDateTime;

use crate::entities::games::StoneColor;
use crate::entities::moves;

#[derive(Debug, Clone)]
pub struct MoveCreate {
    pub game_id: i64,
    pub move_number: i32,
    pub x: i16,
    pub y: i16,
    pub color: StoneColor,
    pub is_forbidden: bool,
}

pub async fn create_move<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: MoveCreate,
) -> Result<moves::Model, sea_orm::DbErr> {
    moves::ActiveModel {
        id: NotSet,
        game_id: Set(dto.game_id),
        move_number: Set(dto.move_number),
        x: Set(dto.x),
        y: Set(dto.y),
        color: Set(dto.color),
        is_forbidden: Set(dto.is_forbidden),
        created_at: Set(OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await
}

/// All stones of a game in ply order.
pub async fn list_for_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Vec<moves::Model>, sea_orm::DbErr> {
    moves::Entity::find()
        .filter(moves::Column::GameId.eq(game_id))
        .order_by_asc(moves::Column::MoveNumber)
        .all(conn)
        .await
}
