use std::sync::Arc;

use crate::config::arena::ArenaConfig;
use crate::config::db::DbKind;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::realtime::NotificationBus;
use crate::services::idempotency::IdempotencyFallback;
use crate::state::app_state::AppState;

/// Builder for creating AppState instances (used in both tests and main)
pub struct StateBuilder {
    config: ArenaConfig,
    db_kind: Option<DbKind>,
}

impl StateBuilder {
    pub fn new() -> Self {
        Self {
            config: ArenaConfig::default(),
            db_kind: None,
        }
    }

    pub fn with_db(mut self, kind: DbKind) -> Self {
        self.db_kind = Some(kind);
        self
    }

    pub fn with_config(mut self, config: ArenaConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let kind = self
            .db_kind
            .ok_or_else(|| AppError::config("database kind not configured"))?;
        // single entrypoint: connect + migrate
        let db = bootstrap_db(kind).await?;
        Ok(AppState {
            db,
            config: Arc::new(self.config),
            bus: Arc::new(NotificationBus::new()),
            idempotency: Arc::new(IdempotencyFallback::new()),
        })
    }
}

impl Default for StateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn build_state() -> StateBuilder {
    StateBuilder::new()
}
