//! Domain-typed persistence functions over the adapters.

pub mod agents;
pub mod games;
pub mod idempotency;
pub mod moves;
pub mod offer10;
pub mod queue;
