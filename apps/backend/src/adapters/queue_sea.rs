//! SeaORM adapter for the matchmaking queue.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use time::OffsetDateTime;

use crate::entities::matchmaking_queue;

pub async fn find_by_agent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
) -> Result<Option<matchmaking_queue::Model>, sea_orm::DbErr> {
    matchmaking_queue::Entity::find()
        .filter(matchmaking_queue::Column::AgentId.eq(agent_id))
        .one(conn)
        .await
}

pub async fn insert_entry<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
) -> Result<matchmaking_queue::Model, sea_orm::DbErr> {
    matchmaking_queue::ActiveModel {
        id: NotSet,
        agent_id: Set(agent_id),
        joined_at: Set(OffsetDateTime::now_utc()),
    }
    .insert(conn)
    .await
}

/// Deletes the agent's entry; returns whether one existed.
pub async fn delete_by_agent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
) -> Result<bool, sea_orm::DbErr> {
    let result = matchmaking_queue::Entity::delete_many()
        .filter(matchmaking_queue::Column::AgentId.eq(agent_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Deletes both agents' entries; returns the number removed.
pub async fn delete_pair<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    first: i64,
    second: i64,
) -> Result<u64, sea_orm::DbErr> {
    let result = matchmaking_queue::Entity::delete_many()
        .filter(matchmaking_queue::Column::AgentId.is_in([first, second]))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Oldest entries first (FIFO), ties broken by insertion id.
pub async fn oldest<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    limit: u64,
) -> Result<Vec<matchmaking_queue::Model>, sea_orm::DbErr> {
    matchmaking_queue::Entity::find()
        .order_by_asc(matchmaking_queue::Column::JoinedAt)
        .order_by_asc(matchmaking_queue::Column::Id)
        .limit(limit)
        .all(conn)
        .await
}

pub async fn count<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<u64, sea_orm::DbErr> {
    matchmaking_queue::Entity::find().count(conn).await
}
