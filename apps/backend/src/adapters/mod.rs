//! Persistence adapters. Every function is generic over `ConnectionTrait`
//! so it runs on a pooled connection or inside a transaction alike.

pub mod agents_sea;
pub mod games_sea;
pub mod idempotency_sea;
pub mod moves_sea;
pub mod offer10_sea;
pub mod queue_sea;
