use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::arena::ArenaConfig;
use crate::realtime::NotificationBus;
use crate::services::idempotency::IdempotencyFallback;

/// Shared resources handed to every handler and to the timeout supervisor.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<ArenaConfig>,
    /// Per-process change notifications for long-poll waiters.
    pub bus: Arc<NotificationBus>,
    /// Used when the durable idempotency table cannot be reached.
    pub idempotency: Arc<IdempotencyFallback>,
}

impl AppState {
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
