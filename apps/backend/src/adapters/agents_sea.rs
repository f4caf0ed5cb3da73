//! SeaORM adapter for agents - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use time::OffsetDateTime;

use crate::domain::rating::INITIAL_RATING;
use crate::entities::agents;

#[derive(Debug, Clone)]
pub struct AgentCreate {
    pub name: String,
    pub api_key_prefix: String,
    pub api_key_hash: String,
}

/// Result of one finished game for a single agent.
#[derive(Debug, Clone, Copy)]
pub struct AgentResult {
    pub agent_id: i64,
    pub new_rating: i32,
    pub won: bool,
    pub lost: bool,
}

pub async fn create_agent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: AgentCreate,
) -> Result<agents::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    agents::ActiveModel {
        id: NotSet,
        name: Set(dto.name),
        api_key_prefix: Set(dto.api_key_prefix),
        api_key_hash: Set(dto.api_key_hash),
        is_active: Set(true),
        rating: Set(INITIAL_RATING),
        games_played: Set(0),
        wins: Set(0),
        losses: Set(0),
        draws: Set(0),
        last_seen_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
) -> Result<Option<agents::Model>, sea_orm::DbErr> {
    agents::Entity::find_by_id(agent_id).one(conn).await
}

pub async fn find_by_key_hash<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    api_key_hash: &str,
) -> Result<Option<agents::Model>, sea_orm::DbErr> {
    agents::Entity::find()
        .filter(agents::Column::ApiKeyHash.eq(api_key_hash))
        .one(conn)
        .await
}

pub async fn find_by_name<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    name: &str,
) -> Result<Option<agents::Model>, sea_orm::DbErr> {
    agents::Entity::find()
        .filter(agents::Column::Name.eq(name))
        .one(conn)
        .await
}

pub async fn find_many<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: Vec<i64>,
) -> Result<Vec<agents::Model>, sea_orm::DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    agents::Entity::find()
        .filter(agents::Column::Id.is_in(ids))
        .all(conn)
        .await
}

pub async fn list_active<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<agents::Model>, sea_orm::DbErr> {
    agents::Entity::find()
        .filter(agents::Column::IsActive.eq(true))
        .order_by_asc(agents::Column::Id)
        .all(conn)
        .await
}

/// Active agents by rating, best first; ties go to the older agent.
pub async fn rankings<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    limit: u64,
) -> Result<Vec<agents::Model>, sea_orm::DbErr> {
    agents::Entity::find()
        .filter(agents::Column::IsActive.eq(true))
        .order_by_desc(agents::Column::Rating)
        .order_by_asc(agents::Column::Id)
        .limit(limit)
        .all(conn)
        .await
}

pub async fn touch_last_seen<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
    at: OffsetDateTime,
) -> Result<(), sea_orm::DbErr> {
    agents::Entity::update_many()
        .col_expr(agents::Column::LastSeenAt, Expr::value(Some(at)))
        .filter(agents::Column::Id.eq(agent_id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Writes the new rating and bumps the result counters atomically in SQL.
pub async fn record_result<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    result: AgentResult,
) -> Result<(), sea_orm::DbErr> {
    let draw = !result.won && !result.lost;
    agents::Entity::update_many()
        .col_expr(agents::Column::Rating, Expr::value(result.new_rating))
        .col_expr(
            agents::Column::GamesPlayed,
            Expr::col(agents::Column::GamesPlayed).add(1),
        )
        .col_expr(
            agents::Column::Wins,
            Expr::col(agents::Column::Wins).add(i32::from(result.won)),
        )
        .col_expr(
            agents::Column::Losses,
            Expr::col(agents::Column::Losses).add(i32::from(result.lost)),
        )
        .col_expr(
            agents::Column::Draws,
            Expr::col(agents::Column::Draws).add(i32::from(draw)),
        )
        .col_expr(
            agents::Column::UpdatedAt,
            Expr::value(OffsetDateTime::now_utc()),
        )
        .filter(agents::Column::Id.eq(result.agent_id))
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn count_active<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<u64, sea_orm::DbErr> {
    agents::Entity::find()
        .filter(agents::Column::IsActive.eq(true))
        .count(conn)
        .await
}
