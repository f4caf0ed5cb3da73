//! Services: orchestration between the pure domain layer and persistence.

pub mod agents;
pub mod game_flow;
pub mod idempotency;
pub mod matchmaking;
pub mod ratings;
pub mod stats;
pub mod timeouts;
pub mod views;
pub mod waits;
