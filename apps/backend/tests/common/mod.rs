#![allow(dead_code)]

// tests/common/mod.rs
use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use serde_json::Value;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Reads a 2xx response body as JSON, failing loudly on anything else.
pub async fn ok_json<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    let status = resp.status();
    let body = actix_web::test::read_body(resp).await;
    assert!(
        status.is_success(),
        "expected success, got {status}: {}",
        String::from_utf8_lossy(&body)
    );
    serde_json::from_slice(&body).expect("response body should be JSON")
}
