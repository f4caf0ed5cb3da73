pub mod current_agent;
pub mod game_id;
pub mod validated_json;

pub use current_agent::CurrentAgent;
pub use game_id::GameId;
pub use validated_json::ValidatedJson;
