//! Move idempotency: durable log first, process-local map when the log is
//! unreachable.
//!
//! The first request for `(game, agent, key)` claims a ticket; later requests
//! with the same key either replay the recorded outcome (identical payload),
//! fail with `IDEMPOTENCY_MISMATCH` (different payload), or fail with
//! `IDEMPOTENCY_IN_PROGRESS` while the first one is still running.

use std::time::Duration;

use moka::sync::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::infra::db_errors::{is_foreign_key_violation, is_unique_violation};
use crate::logging::pii::Redacted;
use crate::repos::idempotency::{self as idem_repo, IdempotencyRecord, MovePayload};
use crate::services::game_flow::MoveResponse;

pub const MAX_KEY_LEN: usize = 128;

/// Outcome stored against a key once the first request completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredOutcome {
    Accepted(MoveResponse),
    Rejected {
        status: u16,
        code: String,
        detail: String,
    },
}

impl StoredOutcome {
    /// `None` for server errors, which are not recorded so the client may retry.
    fn capture(result: &Result<MoveResponse, AppError>) -> Option<Self> {
        match result {
            Ok(resp) => Some(Self::Accepted(resp.clone())),
            Err(err) if err.status().is_server_error() => None,
            Err(err) => Some(Self::Rejected {
                status: err.status().as_u16(),
                code: err.code().as_str().to_string(),
                detail: err.detail(),
            }),
        }
    }

    fn status_code(&self) -> i32 {
        match self {
            Self::Accepted(_) => 200,
            Self::Rejected { status, .. } => i32::from(*status),
        }
    }

    pub fn replay(self) -> Result<MoveResponse, AppError> {
        match self {
            Self::Accepted(mut resp) => {
                resp.duplicate = true;
                Ok(resp)
            }
            Self::Rejected {
                status,
                code,
                detail,
            } => Err(AppError::from_recorded(status, &code, detail)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FallbackKey {
    game_id: i64,
    agent_id: i64,
    key: String,
}

#[derive(Debug, Clone)]
struct FallbackEntry {
    payload: MovePayload,
    outcome: Option<StoredOutcome>,
}

/// Entries kept in-process at most; the oldest are evicted first.
const FALLBACK_CAPACITY: u64 = 10_000;

/// How long an in-process entry can still be replayed.
const FALLBACK_TTL: Duration = Duration::from_secs(60 * 60);

/// Per-process stand-in for the durable log. Not shared across instances;
/// bounded by capacity and a time-to-live.
pub struct IdempotencyFallback {
    entries: Cache<FallbackKey, FallbackEntry>,
}

impl Default for IdempotencyFallback {
    fn default() -> Self {
        Self::with_limits(FALLBACK_CAPACITY, FALLBACK_TTL)
    }
}

impl IdempotencyFallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        usize::try_from(self.entries.entry_count()).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &FallbackKey, payload: MovePayload) -> Option<Result<StoredOutcome, AppError>> {
        let entry = self.entries.get(key)?;
        Some(resolve_existing(entry.payload, entry.outcome, payload))
    }

    /// Claims `key` locally; `Some` if someone already holds it.
    fn try_claim(&self, key: FallbackKey, payload: MovePayload) -> Option<Result<StoredOutcome, AppError>> {
        let entry = self.entries.entry(key).or_insert_with(|| FallbackEntry {
            payload,
            outcome: None,
        });
        if entry.is_fresh() {
            return None;
        }
        let held = entry.into_value();
        Some(resolve_existing(held.payload, held.outcome, payload))
    }

    fn record(&self, key: FallbackKey, payload: MovePayload, outcome: StoredOutcome) {
        self.entries.insert(
            key,
            FallbackEntry {
                payload,
                outcome: Some(outcome),
            },
        );
    }

    fn release(&self, key: &FallbackKey) {
        self.entries.invalidate(key);
    }
}

fn mismatch() -> AppError {
    AppError::conflict(
        ErrorCode::IdempotencyMismatch,
        "Idempotency key reused with a different payload",
    )
}

fn in_progress() -> AppError {
    AppError::conflict(
        ErrorCode::IdempotencyInProgress,
        "Request in progress, retry with the same idempotency_key",
    )
}

fn resolve_existing(
    held: MovePayload,
    outcome: Option<StoredOutcome>,
    requested: MovePayload,
) -> Result<StoredOutcome, AppError> {
    if held != requested {
        return Err(mismatch());
    }
    outcome.ok_or_else(in_progress)
}

fn decode_record(record: &IdempotencyRecord) -> Option<StoredOutcome> {
    let raw = record.response.as_deref()?;
    match serde_json::from_str(raw) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            warn!(record_id = record.id, error = %e, "Stored idempotent response failed to decode");
            None
        }
    }
}

/// Validates and normalizes a client key.
pub fn normalize_key(raw: &str) -> Result<String, AppError> {
    let key = raw.trim();
    if key.is_empty() {
        return Err(AppError::invalid(
            ErrorCode::InvalidIdempotencyKey,
            "idempotency_key must not be empty",
        ));
    }
    if key.chars().count() > MAX_KEY_LEN {
        return Err(AppError::invalid(
            ErrorCode::InvalidIdempotencyKey,
            format!("idempotency_key must be at most {MAX_KEY_LEN} characters"),
        ));
    }
    Ok(key.to_string())
}

/// Handle for the request that owns a key.
#[derive(Debug)]
pub struct Ticket {
    key: FallbackKey,
    payload: MovePayload,
    durable_id: Option<i64>,
}

#[derive(Debug)]
pub enum Claim {
    Fresh(Ticket),
    Replay(StoredOutcome),
}

pub async fn claim(
    db: &DatabaseConnection,
    fallback: &IdempotencyFallback,
    game_id: i64,
    agent_id: i64,
    key: &str,
    payload: MovePayload,
) -> Result<Claim, AppError> {
    let fkey = FallbackKey {
        game_id,
        agent_id,
        key: key.to_string(),
    };

    if let Some(existing) = fallback.lookup(&fkey, payload) {
        return existing.map(Claim::Replay);
    }

    match idem_repo::insert_pending(db, game_id, agent_id, key, payload).await {
        Ok(record) => Ok(Claim::Fresh(Ticket {
            key: fkey,
            payload,
            durable_id: Some(record.id),
        })),
        Err(e) if is_unique_violation(&e) => {
            let Some(record) = idem_repo::find(db, game_id, agent_id, key).await? else {
                // The holder released the key between our insert and read.
                return Err(in_progress());
            };
            let outcome = if record.is_finalized() {
                decode_record(&record)
            } else {
                None
            };
            debug!(game_id, agent_id, finalized = outcome.is_some(), "Idempotency key already claimed");
            resolve_existing(record.payload, outcome, payload).map(Claim::Replay)
        }
        // The log is reachable; the game row is what is missing.
        Err(e) if is_foreign_key_violation(&e) => Err(AppError::not_found(
            ErrorCode::GameNotFound,
            format!("Game {game_id} not found"),
        )),
        Err(e) => {
            warn!(
                game_id,
                agent_id,
                error = %Redacted(&e.to_string()),
                "Idempotency log unavailable; using in-process fallback"
            );
            match fallback.try_claim(fkey.clone(), payload) {
                Some(existing) => existing.map(Claim::Replay),
                None => Ok(Claim::Fresh(Ticket {
                    key: fkey,
                    payload,
                    durable_id: None,
                })),
            }
        }
    }
}

/// Records the outcome of a claimed request. Server errors release the key.
pub async fn complete(
    db: &DatabaseConnection,
    fallback: &IdempotencyFallback,
    ticket: Ticket,
    result: &Result<MoveResponse, AppError>,
) {
    let Some(outcome) = StoredOutcome::capture(result) else {
        if let Some(id) = ticket.durable_id {
            if let Err(e) = idem_repo::delete(db, id).await {
                warn!(record_id = id, error = %e, "Failed to release idempotency key");
            }
        }
        fallback.release(&ticket.key);
        return;
    };

    if ticket.durable_id.is_some() {
        let persisted = match serde_json::to_string(&outcome) {
            Ok(json) => idem_repo::finalize(
                db,
                ticket.key.game_id,
                ticket.key.agent_id,
                &ticket.key.key,
                outcome.status_code(),
                json,
            )
            .await
            .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match persisted {
            Ok(()) => return,
            Err(e) => warn!(
                game_id = ticket.key.game_id,
                error = %Redacted(&e),
                "Failed to persist idempotent response; keeping it in-process"
            ),
        }
    }

    fallback.record(ticket.key, ticket.payload, outcome);
}
