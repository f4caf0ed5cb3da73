use actix_web::web;

use crate::error::AppError;
use crate::errors::ErrorCode;

pub mod agents;
pub mod games;
pub mod health;
pub mod queue;
pub mod stats;

/// Registers every route. `main.rs` wraps the same configuration in the
/// logging, tracing and CORS middleware; tests use it bare.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Malformed query strings render as Problem Details like every other 400.
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::bad_request(ErrorCode::BadRequest, format!("Invalid query: {err}")).into()
    }));

    cfg.configure(health::configure_routes)
        .configure(agents::configure_routes)
        .configure(queue::configure_routes)
        .configure(games::configure_routes)
        .configure(stats::configure_routes);
}
