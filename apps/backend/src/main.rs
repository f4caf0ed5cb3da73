use actix_web::{web, App, HttpServer};
use renju_backend::config::arena::{ArenaConfig, ServerConfig};
use renju_backend::config::db::db_kind_from_env;
use renju_backend::infra::state::build_state;
use renju_backend::middleware::cors::cors_middleware;
use renju_backend::middleware::request_trace::RequestTrace;
use renju_backend::middleware::structured_logger::StructuredLogger;
use renju_backend::middleware::trace_span::TraceSpan;
use renju_backend::routes;
use renju_backend::services::timeouts::TimeoutSupervisor;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (docker env_file locally, the platform's secret store in production).
    let server = ServerConfig::from_env();
    let config = ArenaConfig::from_env();

    let db_kind = match db_kind_from_env() {
        Ok(kind) => kind,
        Err(e) => {
            error!(error = %e, "invalid database configuration");
            std::process::exit(1);
        }
    };

    let app_state = match build_state()
        .with_db(db_kind)
        .with_config(config)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    info!(
        host = %server.host,
        port = server.port,
        engine = db_kind.engine(),
        "renju arena listening"
    );

    let shutdown = CancellationToken::new();
    let supervisor = TimeoutSupervisor::new(app_state.clone()).spawn(shutdown.clone());

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);

    let result = HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((server.host.as_str(), server.port))?
    .run()
    .await;

    shutdown.cancel();
    if let Err(e) = supervisor.await {
        error!(error = %e, "timeout supervisor exited abnormally");
    }

    result
}
