use actix_web::{web, HttpResponse};
use migration::count_applied_migrations;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
    app_version: &'static str,
    db: &'static str,
    migrations: Option<usize>,
    time: String,
}

/// Liveness plus a database ping. Always 200: a failing database is
/// reported in the body, not by failing the check.
async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let db = match app_state.db.ping().await {
        Ok(()) => "ok",
        Err(_) => "error",
    };
    let migrations = count_applied_migrations(&app_state.db).await.ok();
    let time = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    Ok(HttpResponse::Ok().json(HealthResponse {
        ok: true,
        app_version: env!("CARGO_PKG_VERSION"),
        db,
        migrations,
        time,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health));
}
