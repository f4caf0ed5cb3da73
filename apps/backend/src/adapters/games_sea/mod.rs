//! SeaORM adapter for games - generic over ConnectionTrait.

use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use time::OffsetDateTime;

use crate::entities::games::{self, GamePhase, GameStatus, StoneColor};
use crate::infra::db_errors::{GAME_NOT_FOUND_PREFIX, OPTIMISTIC_LOCK_PREFIX};

pub mod dto;

pub use dto::{GameCreate, GameUpdate};

// Adapter functions return DbErr; repos map to DomainError.

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<Option<games::Model>, sea_orm::DbErr> {
    games::Entity::find_by_id(game_id).one(conn).await
}

/// Find game by ID or fail with a structured `GAME_NOT_FOUND` error.
pub async fn require_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
) -> Result<games::Model, sea_orm::DbErr> {
    find_by_id(conn, game_id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::Custom(format!("{GAME_NOT_FOUND_PREFIX}{game_id}")))
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameCreate,
) -> Result<games::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    games::ActiveModel {
        id: NotSet,
        status: Set(GameStatus::Active),
        phase: Set(GamePhase::Opening1),
        move_number: Set(0),
        turn_color: Set(StoneColor::Black),
        turn_deadline_at: Set(Some(dto.turn_deadline_at)),
        black_agent_id: Set(dto.black_agent_id),
        white_agent_id: Set(dto.white_agent_id),
        winner_color: Set(None),
        result_reason: Set(None),
        opening_state: Set(dto.opening_state),
        created_at: Set(now),
        updated_at: Set(now),
        version: Set(1),
    }
    .insert(conn)
    .await
}

/// Compare-and-swap update keyed on `(id, version)`.
///
/// Zero affected rows is disambiguated by a re-read: a missing row is
/// `GAME_NOT_FOUND`, a present one is `OPTIMISTIC_LOCK` with both versions.
pub async fn update_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: GameUpdate,
) -> Result<games::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    let id = dto.id;
    let expected = dto.expected_version;

    let changes = games::ActiveModel {
        status: Set(dto.status),
        phase: Set(dto.phase),
        move_number: Set(dto.move_number),
        turn_color: Set(dto.turn_color),
        turn_deadline_at: Set(dto.turn_deadline_at),
        black_agent_id: Set(dto.black_agent_id),
        white_agent_id: Set(dto.white_agent_id),
        winner_color: Set(dto.winner_color),
        result_reason: Set(dto.result_reason),
        opening_state: Set(dto.opening_state),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = games::Entity::update_many()
        .set(changes)
        .col_expr(
            games::Column::Version,
            Expr::col(games::Column::Version).add(1),
        )
        .filter(games::Column::Id.eq(id))
        .filter(games::Column::Version.eq(expected))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return match find_by_id(conn, id).await? {
            Some(current) => Err(sea_orm::DbErr::Custom(format!(
                "{OPTIMISTIC_LOCK_PREFIX}{{\"expected\":{expected},\"actual\":{}}}",
                current.version
            ))),
            None => Err(sea_orm::DbErr::Custom(format!("{GAME_NOT_FOUND_PREFIX}{id}"))),
        };
    }

    require_game(conn, id).await
}

fn involves(agent_id: i64) -> Condition {
    Condition::any()
        .add(games::Column::BlackAgentId.eq(agent_id))
        .add(games::Column::WhiteAgentId.eq(agent_id))
}

/// Most recent active game the agent is seated in.
pub async fn find_active_for_agent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
) -> Result<Option<games::Model>, sea_orm::DbErr> {
    games::Entity::find()
        .filter(games::Column::Status.eq(GameStatus::Active))
        .filter(involves(agent_id))
        .order_by_desc(games::Column::Id)
        .one(conn)
        .await
}

/// Most recent game of any status the agent is seated in.
pub async fn find_latest_for_agent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
) -> Result<Option<games::Model>, sea_orm::DbErr> {
    games::Entity::find()
        .filter(involves(agent_id))
        .order_by_desc(games::Column::Id)
        .one(conn)
        .await
}

pub async fn list_recent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    status: Option<GameStatus>,
    limit: u64,
) -> Result<Vec<games::Model>, sea_orm::DbErr> {
    let mut query = games::Entity::find();
    if let Some(status) = status {
        query = query.filter(games::Column::Status.eq(status));
    }
    query
        .order_by_desc(games::Column::UpdatedAt)
        .order_by_desc(games::Column::Id)
        .limit(limit)
        .all(conn)
        .await
}

/// Active games whose deadline is strictly before `now`, oldest deadline first.
pub async fn find_expired<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    now: OffsetDateTime,
    limit: u64,
) -> Result<Vec<games::Model>, sea_orm::DbErr> {
    games::Entity::find()
        .filter(games::Column::Status.eq(GameStatus::Active))
        .filter(games::Column::TurnDeadlineAt.lt(now))
        .order_by_asc(games::Column::TurnDeadlineAt)
        .limit(limit)
        .all(conn)
        .await
}

/// Active games still in `phase` at `move_number` without an update since
/// `cutoff`. Callers still check the opening flags, which live in the JSON
/// column.
pub async fn find_stale_in_phase<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    phase: GamePhase,
    move_number: i32,
    cutoff: OffsetDateTime,
    limit: u64,
) -> Result<Vec<games::Model>, sea_orm::DbErr> {
    games::Entity::find()
        .filter(games::Column::Status.eq(GameStatus::Active))
        .filter(games::Column::Phase.eq(phase))
        .filter(games::Column::MoveNumber.eq(move_number))
        .filter(games::Column::UpdatedAt.lte(cutoff))
        .order_by_asc(games::Column::UpdatedAt)
        .limit(limit)
        .all(conn)
        .await
}

pub async fn count<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    status: Option<GameStatus>,
) -> Result<u64, sea_orm::DbErr> {
    let mut query = games::Entity::find();
    if let Some(status) = status {
        query = query.filter(games::Column::Status.eq(status));
    }
    query.count(conn).await
}
