//! SeaORM adapter for the durable move idempotency log.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, NotSet,
    QueryFilter, Set,
};
use time::OffsetDateTime;

use crate::entities::move_idempotency;

#[derive(Debug, Clone)]
pub struct PendingRecord {
    pub game_id: i64,
    pub agent_id: i64,
    pub idempotency_key: String,
    pub turn_number: i32,
    pub x: i16,
    pub y: i16,
}

/// Inserts the unfinalized row. A unique violation means another request
/// already owns the key.
pub async fn insert_pending<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PendingRecord,
) -> Result<move_idempotency::Model, sea_orm::DbErr> {
    move_idempotency::ActiveModel {
        id: NotSet,
        game_id: Set(dto.game_id),
        agent_id: Set(dto.agent_id),
        idempotency_key: Set(dto.idempotency_key),
        turn_number: Set(dto.turn_number),
        x: Set(dto.x),
        y: Set(dto.y),
        status_code: Set(None),
        response: Set(None),
        created_at: Set(OffsetDateTime::now_utc()),
        finalized_at: Set(None),
    }
    .insert(conn)
    .await
}

pub async fn find<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    agent_id: i64,
    idempotency_key: &str,
) -> Result<Option<move_idempotency::Model>, sea_orm::DbErr> {
    move_idempotency::Entity::find()
        .filter(move_idempotency::Column::GameId.eq(game_id))
        .filter(move_idempotency::Column::AgentId.eq(agent_id))
        .filter(move_idempotency::Column::IdempotencyKey.eq(idempotency_key))
        .one(conn)
        .await
}

pub async fn finalize<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    record: move_idempotency::Model,
    status_code: i32,
    response_json: String,
) -> Result<move_idempotency::Model, sea_orm::DbErr> {
    let mut active = record.into_active_model();
    active.status_code = Set(Some(status_code));
    active.response = Set(Some(response_json));
    active.finalized_at = Set(Some(OffsetDateTime::now_utc()));
    active.update(conn).await
}

pub async fn delete_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    record_id: i64,
) -> Result<(), sea_orm::DbErr> {
    move_idempotency::Entity::delete_by_id(record_id)
        .exec(conn)
        .await?;
    Ok(())
}
