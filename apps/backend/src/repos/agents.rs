//! Agent repository functions.

use std::collections::HashMap;

use sea_orm::ConnectionTrait;
use serde::Serialize;
use time::OffsetDateTime;

use crate::adapters::agents_sea as agents_adapter;
use crate::entities::agents;
use crate::errors::domain::DomainError;

pub use agents_adapter::{AgentCreate, AgentResult};

/// Public agent record. The credential hash never leaves the repo layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    pub id: i64,
    pub name: String,
    pub api_key_prefix: String,
    pub is_active: bool,
    pub rating: i32,
    pub games_played: i32,
    pub wins: i32,
    pub losses: i32,
    pub draws: i32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_seen_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<agents::Model> for Agent {
    fn from(model: agents::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            api_key_prefix: model.api_key_prefix,
            is_active: model.is_active,
            rating: model.rating,
            games_played: model.games_played,
            wins: model.wins,
            losses: model.losses,
            draws: model.draws,
            last_seen_at: model.last_seen_at,
            created_at: model.created_at,
        }
    }
}

pub async fn create_agent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: AgentCreate,
) -> Result<Agent, DomainError> {
    Ok(Agent::from(agents_adapter::create_agent(conn, dto).await?))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
) -> Result<Option<Agent>, DomainError> {
    Ok(agents_adapter::find_by_id(conn, agent_id).await?.map(Agent::from))
}

pub async fn find_by_key_hash<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    api_key_hash: &str,
) -> Result<Option<Agent>, DomainError> {
    Ok(agents_adapter::find_by_key_hash(conn, api_key_hash)
        .await?
        .map(Agent::from))
}

pub async fn find_by_name<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    name: &str,
) -> Result<Option<Agent>, DomainError> {
    Ok(agents_adapter::find_by_name(conn, name).await?.map(Agent::from))
}

/// Names keyed by id; unknown ids are simply absent.
pub async fn names_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: Vec<i64>,
) -> Result<HashMap<i64, String>, DomainError> {
    let rows = agents_adapter::find_many(conn, ids).await?;
    Ok(rows.into_iter().map(|a| (a.id, a.name)).collect())
}

pub async fn find_many<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: Vec<i64>,
) -> Result<Vec<Agent>, DomainError> {
    let rows = agents_adapter::find_many(conn, ids).await?;
    Ok(rows.into_iter().map(Agent::from).collect())
}

pub async fn list_active<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<Agent>, DomainError> {
    let rows = agents_adapter::list_active(conn).await?;
    Ok(rows.into_iter().map(Agent::from).collect())
}

pub async fn rankings<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    limit: u64,
) -> Result<Vec<Agent>, DomainError> {
    let rows = agents_adapter::rankings(conn, limit).await?;
    Ok(rows.into_iter().map(Agent::from).collect())
}

pub async fn touch_last_seen<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
    at: OffsetDateTime,
) -> Result<(), DomainError> {
    Ok(agents_adapter::touch_last_seen(conn, agent_id, at).await?)
}

pub async fn record_result<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    result: AgentResult,
) -> Result<(), DomainError> {
    Ok(agents_adapter::record_result(conn, result).await?)
}

pub async fn count_active<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<u64, DomainError> {
    Ok(agents_adapter::count_active(conn).await?)
}
