//! Matchmaking queue repository.

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::queue_sea as queue_adapter;
use crate::errors::domain::DomainError;
use crate::infra::db_errors::is_unique_violation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEntry {
    pub agent_id: i64,
    pub joined_at: OffsetDateTime,
}

pub async fn is_queued<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
) -> Result<bool, DomainError> {
    Ok(queue_adapter::find_by_agent(conn, agent_id).await?.is_some())
}

/// Upserts the agent's entry. An existing entry keeps its original
/// `joined_at`, so rejoining never loses queue position.
pub async fn upsert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
) -> Result<(), DomainError> {
    if queue_adapter::find_by_agent(conn, agent_id).await?.is_some() {
        return Ok(());
    }
    match queue_adapter::insert_entry(conn, agent_id).await {
        Ok(_) => Ok(()),
        // Lost a race against a concurrent join for the same agent.
        Err(e) if is_unique_violation(&e) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

pub async fn remove<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    agent_id: i64,
) -> Result<bool, DomainError> {
    Ok(queue_adapter::delete_by_agent(conn, agent_id).await?)
}

pub async fn remove_pair<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    first: i64,
    second: i64,
) -> Result<u64, DomainError> {
    Ok(queue_adapter::delete_pair(conn, first, second).await?)
}

pub async fn oldest<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    limit: u64,
) -> Result<Vec<QueueEntry>, DomainError> {
    let rows = queue_adapter::oldest(conn, limit).await?;
    Ok(rows
        .into_iter()
        .map(|r| QueueEntry {
            agent_id: r.agent_id,
            joined_at: r.joined_at,
        })
        .collect())
}

pub async fn size<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<u64, DomainError> {
    Ok(queue_adapter::count(conn).await?)
}
