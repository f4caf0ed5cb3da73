//! Agent registration and bearer-key authentication.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::config::arena::ArenaConfig;
use crate::error::AppError;
use crate::errors::domain::ConflictKind;
use crate::errors::{DomainError, ErrorCode};
use crate::repos::agents::{self, Agent, AgentCreate};

pub const AGENT_NAME_DEFAULT: &str = "돌쇠";
pub const AGENT_NAME_MAX_LENGTH: usize = 10;
pub const AGENT_NAME_RECOMMENDED: [&str; 10] = [
    "돌쇠", "마당쇠", "억쇠", "강쇠", "무쇠", "뚝이", "삼월이", "사월이", "곱단이", "꽃분이",
];

const API_KEY_PREFIX: &str = "ra_";
const API_KEY_PREFIX_LEN: usize = 8;

/// Registration response; the only time the plaintext key is revealed.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredAgent {
    pub id: i64,
    pub name: String,
    pub api_key_prefix: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NameRules {
    pub default_name: &'static str,
    pub max_length: usize,
    pub recommended: Vec<&'static str>,
}

pub fn name_rules() -> NameRules {
    NameRules {
        default_name: AGENT_NAME_DEFAULT,
        max_length: AGENT_NAME_MAX_LENGTH,
        recommended: AGENT_NAME_RECOMMENDED.to_vec(),
    }
}

/// Trims, substitutes the default for blanks, clips to the max length in
/// characters (not bytes).
pub fn normalize_name(raw: Option<&str>) -> String {
    let trimmed = raw.unwrap_or_default().trim();
    let base = if trimmed.is_empty() {
        AGENT_NAME_DEFAULT
    } else {
        trimmed
    };
    let clipped: String = base.chars().take(AGENT_NAME_MAX_LENGTH).collect();
    if clipped.trim().is_empty() {
        AGENT_NAME_DEFAULT.to_string()
    } else {
        clipped
    }
}

pub fn generate_api_key() -> String {
    let bytes: [u8; 32] = rand::random();
    format!("{API_KEY_PREFIX}{}", URL_SAFE_NO_PAD.encode(bytes))
}

pub fn hash_api_key(api_key: &str) -> String {
    blake3::hash(api_key.as_bytes()).to_hex().to_string()
}

fn name_taken() -> AppError {
    AppError::conflict(ErrorCode::AgentNameTaken, "Agent name already exists")
}

pub async fn register(
    db: &DatabaseConnection,
    requested_name: Option<&str>,
) -> Result<RegisteredAgent, AppError> {
    let name = normalize_name(requested_name);

    if agents::find_by_name(db, &name)
        .await?
        .is_some_and(|existing| existing.is_active)
    {
        return Err(name_taken());
    }

    let api_key = generate_api_key();
    let api_key_prefix: String = api_key.chars().take(API_KEY_PREFIX_LEN).collect();
    let dto = AgentCreate {
        name,
        api_key_prefix: api_key_prefix.clone(),
        api_key_hash: hash_api_key(&api_key),
    };

    let agent = match agents::create_agent(db, dto).await {
        Ok(agent) => agent,
        Err(DomainError::Conflict(ConflictKind::AgentNameTaken, _)) => return Err(name_taken()),
        Err(e) => return Err(e.into()),
    };

    info!(agent_id = agent.id, name = %agent.name, key_prefix = %api_key_prefix, "Agent registered");

    Ok(RegisteredAgent {
        id: agent.id,
        name: agent.name,
        api_key_prefix,
        api_key,
    })
}

/// Resolves a bearer key to its active agent and refreshes `last_seen_at`
/// when the stored value is older than the configured throttle.
pub async fn authenticate(
    db: &DatabaseConnection,
    config: &ArenaConfig,
    api_key: &str,
) -> Result<Agent, AppError> {
    let hash = hash_api_key(api_key);
    let Some(agent) = agents::find_by_key_hash(db, &hash).await? else {
        debug!("Unknown API key presented");
        return Err(AppError::unauthorized_invalid_api_key());
    };
    if !agent.is_active {
        return Err(AppError::forbidden(
            ErrorCode::AgentInactive,
            "Agent is inactive",
        ));
    }

    let now = OffsetDateTime::now_utc();
    let stale = agent
        .last_seen_at
        .is_none_or(|seen| now - seen >= config.last_seen_update());
    if config.last_seen_update_sec > 0 && stale {
        // Presence is advisory; a failed write must not fail the request.
        if let Err(e) = agents::touch_last_seen(db, agent.id, now).await {
            warn!(agent_id = agent.id, error = %e, "Failed to refresh last_seen_at");
        }
    }

    Ok(agent)
}
