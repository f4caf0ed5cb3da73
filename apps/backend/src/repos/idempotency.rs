//! Durable move idempotency log.

use sea_orm::ConnectionTrait;

use crate::adapters::idempotency_sea::{self as idem_adapter, PendingRecord};
use crate::entities::move_idempotency;
use crate::errors::domain::DomainError;

/// Request fingerprint stored with a key; a replay must match it exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovePayload {
    pub turn_number: i32,
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyRecord {
    pub id: i64,
    pub payload: MovePayload,
    pub status_code: Option<i32>,
    pub response: Option<String>,
}

impl IdempotencyRecord {
    pub fn is_finalized(&self) -> bool {
        self.status_code.is_some() && self.response.is_some()
    }
}

impl From<move_idempotency::Model> for IdempotencyRecord {
    fn from(model: move_idempotency::Model) -> Self {
        Self {
            id: model.id,
            payload: MovePayload {
                turn_number: model.turn_number,
                x: i64::from(model.x),
                y: i64::from(model.y),
            },
            status_code: model.status_code,
            response: model.response,
        }
    }
}

/// Raw insert so callers can tell a unique violation apart from an outage.
pub async fn insert_pending<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    agent_id: i64,
    key: &str,
    payload: MovePayload,
) -> Result<IdempotencyRecord, sea_orm::DbErr> {
    let dto = PendingRecord {
        game_id,
        agent_id,
        idempotency_key: key.to_string(),
        turn_number: payload.turn_number,
        // Coordinates were validated on the board before reaching the log.
        x: i16::try_from(payload.x).unwrap_or(i16::MAX),
        y: i16::try_from(payload.y).unwrap_or(i16::MAX),
    };
    Ok(idem_adapter::insert_pending(conn, dto).await?.into())
}

pub async fn find<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    agent_id: i64,
    key: &str,
) -> Result<Option<IdempotencyRecord>, DomainError> {
    Ok(idem_adapter::find(conn, game_id, agent_id, key)
        .await?
        .map(IdempotencyRecord::from))
}

pub async fn finalize<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    agent_id: i64,
    key: &str,
    status_code: i32,
    response_json: String,
) -> Result<(), DomainError> {
    if let Some(row) = idem_adapter::find(conn, game_id, agent_id, key).await? {
        idem_adapter::finalize(conn, row, status_code, response_json).await?;
    }
    Ok(())
}

pub async fn delete<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    record_id: i64,
) -> Result<(), DomainError> {
    Ok(idem_adapter::delete_by_id(conn, record_id).await?)
}
