use renju_backend::config::arena::ArenaConfig;
use renju_backend::config::db::DbKind;
use renju_backend::infra::state::build_state;
use renju_backend::state::app_state::AppState;

/// Fresh in-memory database with migrations applied.
pub async fn test_state() -> AppState {
    test_state_with(ArenaConfig::default()).await
}

pub async fn test_state_with(config: ArenaConfig) -> AppState {
    build_state()
        .with_db(DbKind::SqliteMemory)
        .with_config(config)
        .build()
        .await
        .expect("in-memory state should build")
}

/// Config with the ply-5 automatic "no swap" firing on the next read.
pub fn eager_auto_no_swap() -> ArenaConfig {
    ArenaConfig {
        auto_no_swap_after_sec: Some(0),
        ..ArenaConfig::default()
    }
}
