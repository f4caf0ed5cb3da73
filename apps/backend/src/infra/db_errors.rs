//! SeaORM -> DomainError translation helpers.
//!
//! Adapters return raw `sea_orm::DbErr`; repos convert it here, and higher
//! layers map `DomainError` to `AppError` via `From`.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// Prefix of the structured error adapters raise when a versioned update
/// matched no row although the row exists.
pub const OPTIMISTIC_LOCK_PREFIX: &str = "OPTIMISTIC_LOCK:";

/// Prefix of the structured error adapters raise for a missing game.
pub const GAME_NOT_FOUND_PREFIX: &str = "GAME_NOT_FOUND:";

const SQLITE_UNIQUE: &str = "UNIQUE constraint failed: ";

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// True for unique-constraint violations on either backend.
pub fn is_unique_violation(e: &sea_orm::DbErr) -> bool {
    let msg = e.to_string();
    mentions_sqlstate(&msg, "23505")
        || msg.contains("duplicate key value violates unique constraint")
        || msg.contains("UNIQUE constraint failed")
}

/// True for foreign-key violations on either backend.
pub fn is_foreign_key_violation(e: &sea_orm::DbErr) -> bool {
    let msg = e.to_string();
    mentions_sqlstate(&msg, "23503") || msg.contains("FOREIGN KEY constraint failed")
}

/// Column list from SQLite's "UNIQUE constraint failed: t.a, t.b" message.
fn extract_sqlite_columns(error_msg: &str) -> Option<Vec<&str>> {
    let start = error_msg.find(SQLITE_UNIQUE)? + SQLITE_UNIQUE.len();
    let rest = error_msg[start..].lines().next().unwrap_or_default();
    let columns = rest
        .split(',')
        .map(|c| c.trim().trim_end_matches(|ch: char| ch == '"' || ch == ')'))
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>();
    (!columns.is_empty()).then_some(columns)
}

fn map_sqlite_columns_to_conflict(columns: &[&str]) -> Option<(ConflictKind, &'static str)> {
    let has = |c: &str| columns.contains(&c);
    if has("agents.name") {
        return Some((ConflictKind::AgentNameTaken, "Agent name already registered"));
    }
    if has("moves.x") && has("moves.y") {
        return Some((ConflictKind::CellOccupied, "Cell already occupied"));
    }
    if has("moves.move_number") || has("offer10.game_id") {
        return Some((
            ConflictKind::OptimisticLock,
            "Game advanced concurrently; please refresh and retry",
        ));
    }
    if has("move_idempotency.idempotency_key") {
        return Some((
            ConflictKind::Other("IdempotencyKey".into()),
            "Idempotency key already recorded",
        ));
    }
    None
}

fn map_postgres_constraint_to_conflict(error_msg: &str) -> Option<(ConflictKind, &'static str)> {
    if error_msg.contains("ux_agents_name") {
        return Some((ConflictKind::AgentNameTaken, "Agent name already registered"));
    }
    if error_msg.contains("ux_moves_game_cell") {
        return Some((ConflictKind::CellOccupied, "Cell already occupied"));
    }
    if error_msg.contains("ux_moves_game_move_number") || error_msg.contains("ux_offer10_game_id")
    {
        return Some((
            ConflictKind::OptimisticLock,
            "Game advanced concurrently; please refresh and retry",
        ));
    }
    if error_msg.contains("ux_move_idempotency_key") {
        return Some((
            ConflictKind::Other("IdempotencyKey".into()),
            "Idempotency key already recorded",
        ));
    }
    None
}

/// Translate a `DbErr` into a `DomainError` with sanitized detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        sea_orm::DbErr::RecordNotFound(what) => {
            return DomainError::not_found(
                NotFoundKind::Other(what.clone()),
                "Record not found",
            );
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with(GAME_NOT_FOUND_PREFIX) => {
            let raw = msg.trim_start_matches(GAME_NOT_FOUND_PREFIX);
            return match raw.parse::<i64>() {
                Ok(game_id) => {
                    DomainError::not_found(NotFoundKind::Game, format!("Game {game_id} not found"))
                }
                Err(_) => DomainError::not_found(NotFoundKind::Game, "Game not found"),
            };
        }
        sea_orm::DbErr::Custom(msg) if msg.starts_with(OPTIMISTIC_LOCK_PREFIX) => {
            #[derive(serde::Deserialize)]
            struct LockInfo {
                expected: i32,
                actual: i32,
            }

            let raw = msg.trim_start_matches(OPTIMISTIC_LOCK_PREFIX);
            if let Ok(info) = serde_json::from_str::<LockInfo>(raw) {
                warn!(
                    trace_id = %trace_id,
                    expected = info.expected,
                    actual = info.actual,
                    "Optimistic lock conflict detected"
                );
                return DomainError::conflict(
                    ConflictKind::OptimisticLock,
                    format!(
                        "Game was modified concurrently (expected version {}, actual version {}); please refresh and retry",
                        info.expected, info.actual
                    ),
                );
            }
            warn!(trace_id = %trace_id, "Optimistic lock conflict detected (version info unavailable)");
            return DomainError::conflict(
                ConflictKind::OptimisticLock,
                "Game was modified concurrently; please refresh and retry",
            );
        }
        sea_orm::DbErr::Json(msg) => {
            error!(trace_id = %trace_id, raw_error = %Redacted(msg), "Stored JSON failed to decode");
            return DomainError::infra(InfraErrorKind::DataCorruption, "Stored data is corrupt");
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if is_unique_violation(&e) {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Unique constraint violation");

        if let Some(columns) = extract_sqlite_columns(&error_msg) {
            if let Some((kind, detail)) = map_sqlite_columns_to_conflict(&columns) {
                return DomainError::conflict(kind, detail);
            }
        }
        if let Some((kind, detail)) = map_postgres_constraint_to_conflict(&error_msg) {
            return DomainError::conflict(kind, detail);
        }
        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if is_foreign_key_violation(&e) {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Foreign key constraint violation");
        return DomainError::validation_other("Foreign key constraint violation");
    }

    if error_msg.contains("timeout") || error_msg.contains("database is locked") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Database timeout or lock contention");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(trace_id = %trace_id, raw_error = %Redacted(&error_msg), "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}
