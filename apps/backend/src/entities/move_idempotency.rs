use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One row per (game, agent, client key). `finalized_at` is null while the
/// first request for the key is still being processed.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "move_idempotency")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub game_id: i64,
    pub agent_id: i64,
    pub idempotency_key: String,
    pub turn_number: i32,
    #[sea_orm(column_type = "SmallInteger")]
    pub x: i16,
    #[sea_orm(column_type = "SmallInteger")]
    pub y: i16,
    pub status_code: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub response: Option<String>,
    pub created_at: OffsetDateTime,
    pub finalized_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
