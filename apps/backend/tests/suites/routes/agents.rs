use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details_from_service_response;
use serde_json::json;

use crate::common::ok_json;
use crate::support::app_builder::{bearer, build_app};
use crate::support::test_state::test_state;

#[actix_web::test]
async fn register_returns_the_key_once() {
    let app = build_app(test_state().await).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/agents/register")
            .set_json(json!({ "name": "  omok-bot  " }))
            .to_request(),
    )
    .await;
    let body = ok_json(resp).await;
    assert_eq!(body["name"], "omok-bot");
    let key = body["api_key"].as_str().unwrap();
    assert!(key.starts_with("ra_"));
    assert!(key.starts_with(body["api_key_prefix"].as_str().unwrap()));

    // Public listings never carry the key or its hash.
    let resp = test::call_service(&app, test::TestRequest::get().uri("/agents").to_request()).await;
    let listed = ok_json(resp).await;
    let first = &listed["agents"][0];
    assert_eq!(first["name"], "omok-bot");
    assert!(first.get("api_key").is_none());
    assert!(first.get("api_key_hash").is_none());
}

#[actix_web::test]
async fn bare_register_uses_the_default_name_and_collisions_conflict() {
    let app = build_app(test_state().await).await;

    let register = || test::TestRequest::post().uri("/agents/register").to_request();
    let body = ok_json(test::call_service(&app, register()).await).await;
    assert_eq!(body["name"], "돌쇠");

    let resp = test::call_service(&app, register()).await;
    assert_problem_details_from_service_response(
        resp,
        "AGENT_NAME_TAKEN",
        StatusCode::CONFLICT,
        None,
    )
    .await;
}

#[actix_web::test]
async fn name_rules_are_public() {
    let app = build_app(test_state().await).await;
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/agents/name-rules").to_request(),
    )
    .await;
    let body = ok_json(resp).await;
    assert_eq!(body["max_length"], 10);
    assert_eq!(body["recommended"].as_array().map(Vec::len), Some(10));
}

#[actix_web::test]
async fn me_requires_a_valid_bearer_key() {
    let state = test_state().await;
    let agent = crate::support::factory::register(&state, "whoami").await;
    let app = build_app(state).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/agents/me").to_request()).await;
    assert_problem_details_from_service_response(
        resp,
        "UNAUTHORIZED_MISSING_BEARER",
        StatusCode::UNAUTHORIZED,
        None,
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/agents/me")
            .insert_header(bearer("ra_not-a-real-key"))
            .to_request(),
    )
    .await;
    assert_problem_details_from_service_response(
        resp,
        "UNAUTHORIZED_INVALID_API_KEY",
        StatusCode::UNAUTHORIZED,
        None,
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/agents/me")
            .insert_header(bearer(&agent.api_key))
            .to_request(),
    )
    .await;
    let body = ok_json(resp).await;
    assert_eq!(body["id"], agent.id);
    assert_eq!(body["name"], "whoami");
    assert_eq!(body["in_queue"], false);
    assert!(body["game"].is_null());
}

#[actix_web::test]
async fn rankings_respect_the_limit() {
    let state = test_state().await;
    for name in ["r1", "r2", "r3"] {
        crate::support::factory::register(&state, name).await;
    }
    let app = build_app(state).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/agents/rankings?limit=2").to_request(),
    )
    .await;
    let body = ok_json(resp).await;
    assert_eq!(body["agents"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn agent_wait_returns_a_revision() {
    let state = test_state().await;
    let agent = crate::support::factory::register(&state, "waiter").await;
    let app = build_app(state).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/agents/wait")
            .insert_header(bearer(&agent.api_key))
            .to_request(),
    )
    .await;
    let body = ok_json(resp).await;
    assert_eq!(body["changed"], true);
    assert!(body["revision"].as_str().is_some_and(|r| !r.is_empty()));
}
