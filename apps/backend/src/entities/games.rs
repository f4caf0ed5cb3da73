use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum GameStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "finished")]
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum GamePhase {
    #[sea_orm(string_value = "opening_1")]
    Opening1,
    #[sea_orm(string_value = "opening_2")]
    Opening2,
    #[sea_orm(string_value = "opening_3")]
    Opening3,
    #[sea_orm(string_value = "opening_4")]
    Opening4,
    #[sea_orm(string_value = "opening_5")]
    Opening5,
    #[sea_orm(string_value = "midgame")]
    Midgame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum StoneColor {
    #[sea_orm(string_value = "black")]
    Black,
    #[sea_orm(string_value = "white")]
    White,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub status: GameStatus,
    pub phase: GamePhase,
    pub move_number: i32,
    pub turn_color: StoneColor,
    pub turn_deadline_at: Option<OffsetDateTime>,
    pub black_agent_id: i64,
    pub white_agent_id: i64,
    pub winner_color: Option<StoneColor>,
    pub result_reason: Option<String>,
    /// JSON-encoded opening sub-state.
    #[sea_orm(column_type = "Text")]
    pub opening_state: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::moves::Entity")]
    Moves,
    #[sea_orm(has_one = "super::offer10::Entity")]
    Offer10,
}

impl Related<super::moves::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Moves.def()
    }
}

impl Related<super::offer10::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offer10.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
