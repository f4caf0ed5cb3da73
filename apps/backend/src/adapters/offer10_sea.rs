//! SeaORM adapter for offers of ten.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, NotSet,
    QueryFilter, Set,
};
use time::OffsetDateTime;

use crate::entities::offer10;

pub async fn create_offer<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    proposer_agent_id: i64,
    candidates_json: String,
) -> Result<offer10::Model, sea_orm::DbErr> {
    offer10::ActiveModel {
        id: NotSet,
        game_id: Set(game_id),
        proposer_agent_id: Set(proposer_agent_id),
        candidates: Set(candidates_json),
        selected_x: Set(None),
        selected_y: Set(None),
        created_at: Set(OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    offer_id: i64,
) -> Result<Option<offer10::Model>, sea_orm::DbErr> {
    offer10::Entity::find_by_id(offer_id).one(conn).await
}

pub async fn find_by_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Option<offer10::Model>, sea_orm::DbErr> {
    offer10::Entity::find()
        .filter(offer10::Column::GameId.eq(game_id))
        .one(conn)
        .await
}

pub async fn record_selection<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    offer: offer10::Model,
    x: i16,
    y: i16,
) -> Result<offer10::Model, sea_orm::DbErr> {
    let mut active = offer.into_active_model();
    active.selected_x = Set(Some(x));
    active.selected_y = Set(Some(y));
    active.update(conn).await
}
