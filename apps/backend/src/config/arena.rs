//! Arena timing knobs, read once at startup.

use std::env;

use crate::domain::game_transition::DeadlineKind;

pub const DEFAULT_MOVE_TIMEOUT_SEC: i64 = 300;
pub const DEFAULT_DECISION_TIMEOUT_SEC: i64 = 600;
pub const DEFAULT_AUTO_NO_SWAP_AFTER_SEC: i64 = 240;
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_LAST_SEEN_UPDATE_SEC: i64 = 600;
pub const DEFAULT_WAIT_SEGMENT_MS: u64 = 10_000;

const MIN_TURN_TIMEOUT_SEC: i64 = 10;
const MIN_SWEEP_INTERVAL_MS: u64 = 1_000;
const MIN_WAIT_SEGMENT_MS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    pub move_timeout_sec: i64,
    pub decision_timeout_sec: i64,
    /// `None` disables the ply-5 automatic "no swap".
    pub auto_no_swap_after_sec: Option<i64>,
    pub sweep_interval_ms: u64,
    pub last_seen_update_sec: i64,
    pub wait_segment_ms: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            move_timeout_sec: DEFAULT_MOVE_TIMEOUT_SEC,
            decision_timeout_sec: DEFAULT_DECISION_TIMEOUT_SEC,
            auto_no_swap_after_sec: Some(DEFAULT_AUTO_NO_SWAP_AFTER_SEC),
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            last_seen_update_sec: DEFAULT_LAST_SEEN_UPDATE_SEC,
            wait_segment_ms: DEFAULT_WAIT_SEGMENT_MS,
        }
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl ArenaConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Malformed numbers fall back to defaults; everything is clamped.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let move_timeout_sec =
            parse_or(lookup("TURN_MOVE_TIMEOUT_SEC"), DEFAULT_MOVE_TIMEOUT_SEC)
                .max(MIN_TURN_TIMEOUT_SEC);
        let decision_timeout_sec = parse_or(
            lookup("TURN_DECISION_TIMEOUT_SEC"),
            DEFAULT_DECISION_TIMEOUT_SEC,
        )
        .max(MIN_TURN_TIMEOUT_SEC);
        let auto_no_swap = parse_or(
            lookup("AUTO_NO_SWAP_AFTER_SEC"),
            DEFAULT_AUTO_NO_SWAP_AFTER_SEC,
        );
        let sweep_interval_ms =
            parse_or(lookup("TIMEOUT_SWEEP_INTERVAL_MS"), DEFAULT_SWEEP_INTERVAL_MS)
                .max(MIN_SWEEP_INTERVAL_MS);
        let last_seen_update_sec =
            parse_or(lookup("LAST_SEEN_UPDATE_SEC"), DEFAULT_LAST_SEEN_UPDATE_SEC).max(0);
        let wait_segment_ms = parse_or(lookup("WAIT_SEGMENT_MS"), DEFAULT_WAIT_SEGMENT_MS)
            .max(MIN_WAIT_SEGMENT_MS);

        Self {
            move_timeout_sec,
            decision_timeout_sec,
            auto_no_swap_after_sec: (auto_no_swap > 0).then_some(auto_no_swap),
            sweep_interval_ms,
            last_seen_update_sec,
            wait_segment_ms,
        }
    }

    pub fn timeout_for(&self, kind: DeadlineKind) -> time::Duration {
        match kind {
            DeadlineKind::Move => time::Duration::seconds(self.move_timeout_sec),
            DeadlineKind::Decision => time::Duration::seconds(self.decision_timeout_sec),
        }
    }

    pub fn auto_no_swap_after(&self) -> Option<time::Duration> {
        self.auto_no_swap_after_sec.map(time::Duration::seconds)
    }

    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.sweep_interval_ms)
    }

    pub fn wait_segment(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.wait_segment_ms)
    }

    pub fn last_seen_update(&self) -> time::Duration {
        time::Duration::seconds(self.last_seen_update_sec)
    }
}

/// Bind address for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or(env::var("API_PORT").ok(), 4000),
        }
    }
}
