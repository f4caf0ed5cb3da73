pub mod agents;
pub mod games;
pub mod matchmaking_queue;
pub mod move_idempotency;
pub mod moves;
pub mod offer10;

pub use agents::Entity as Agents;
pub use agents::Model as Agent;
pub use games::Entity as Games;
pub use games::Model as Game;
pub use matchmaking_queue::Entity as MatchmakingQueue;
pub use matchmaking_queue::Model as QueueEntry;
pub use move_idempotency::Entity as MoveIdempotency;
pub use move_idempotency::Model as MoveIdempotencyRecord;
pub use moves::Entity as Moves;
pub use moves::Model as Move;
pub use offer10::Entity as Offers10;
pub use offer10::Model as Offer10;
