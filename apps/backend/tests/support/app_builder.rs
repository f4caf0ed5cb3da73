use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use renju_backend::middleware::request_trace::RequestTrace;
use renju_backend::middleware::structured_logger::StructuredLogger;
use renju_backend::middleware::trace_span::TraceSpan;
use renju_backend::routes;
use renju_backend::state::app_state::AppState;

/// Production routes behind the same middleware stack `main.rs` installs,
/// minus CORS.
pub async fn build_app(
    state: AppState,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
    let data = web::Data::new(state);
    test::init_service(
        App::new()
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data)
            .configure(routes::configure),
    )
    .await
}

pub fn bearer(api_key: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {api_key}"))
}
