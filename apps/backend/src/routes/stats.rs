use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::AppError;
use crate::services::stats::{self, DashboardLimits};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub live_limit: Option<u64>,
    pub history_limit: Option<u64>,
    pub ranking_limit: Option<u64>,
}

async fn overview(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(stats::overview(&app_state).await?))
}

async fn dashboard(
    app_state: web::Data<AppState>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, AppError> {
    let limits = DashboardLimits {
        live: query.live_limit,
        history: query.history_limit,
        ranking: query.ranking_limit,
    };
    Ok(HttpResponse::Ok().json(stats::dashboard(&app_state, limits).await?))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/overview", web::get().to(dashboard))
        .route("/stats/overview", web::get().to(overview));
}
