use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details_from_service_response;

use crate::support::app_builder::{bearer, build_app};
use crate::support::factory::start_match;
use crate::support::test_state::test_state;

#[actix_web::test]
async fn malformed_game_ids_are_bad_requests() {
    let app = build_app(test_state().await).await;
    let resp = test::call_service(&app, test::TestRequest::get().uri("/games/abc").to_request()).await;
    assert_problem_details_from_service_response(
        resp,
        "INVALID_GAME_ID",
        StatusCode::BAD_REQUEST,
        Some("abc"),
    )
    .await;
}

#[actix_web::test]
async fn unknown_games_are_not_found() {
    let app = build_app(test_state().await).await;
    let resp = test::call_service(&app, test::TestRequest::get().uri("/games/9999").to_request()).await;
    assert_problem_details_from_service_response(
        resp,
        "GAME_NOT_FOUND",
        StatusCode::NOT_FOUND,
        None,
    )
    .await;
}

#[actix_web::test]
async fn malformed_json_is_a_problem_details_400() {
    let state = test_state().await;
    let m = start_match(&state, "json").await;
    let app = build_app(state).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/games/{}/move", m.game_id))
            .insert_header(bearer(&m.black.api_key))
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"x\": 7, \"y\":")
            .to_request(),
    )
    .await;
    let problem = assert_problem_details_from_service_response(
        resp,
        "BAD_REQUEST",
        StatusCode::BAD_REQUEST,
        Some("Invalid JSON"),
    )
    .await;
    // Body content is never echoed.
    assert!(!problem.detail.contains("\"x\""));
}

#[actix_web::test]
async fn rule_violations_map_to_their_codes() {
    let state = test_state().await;
    let m = start_match(&state, "rules").await;
    let app = build_app(state).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/games/{}/move", m.game_id))
            .insert_header(bearer(&m.white.api_key))
            .set_json(serde_json::json!({
                "x": 7, "y": 7, "turn_number": 1, "idempotency_key": "w1"
            }))
            .to_request(),
    )
    .await;
    assert_problem_details_from_service_response(
        resp,
        "NOT_YOUR_TURN",
        StatusCode::FORBIDDEN,
        None,
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/games/{}/move", m.game_id))
            .insert_header(bearer(&m.black.api_key))
            .set_json(serde_json::json!({
                "x": 3, "y": 3, "turn_number": 1, "idempotency_key": "b1"
            }))
            .to_request(),
    )
    .await;
    assert_problem_details_from_service_response(
        resp,
        "OPENING_POSITION",
        StatusCode::CONFLICT,
        None,
    )
    .await;
}

#[actix_web::test]
async fn bad_since_updated_at_is_rejected() {
    let state = test_state().await;
    let m = start_match(&state, "since").await;
    let app = build_app(state).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/games/{}/wait?since_updated_at=yesterday", m.game_id))
            .to_request(),
    )
    .await;
    assert_problem_details_from_service_response(
        resp,
        "BAD_REQUEST",
        StatusCode::BAD_REQUEST,
        Some("RFC 3339"),
    )
    .await;
}

#[actix_web::test]
async fn non_numeric_query_values_are_problem_details() {
    let app = build_app(test_state().await).await;
    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/games?limit=lots").to_request(),
    )
    .await;
    assert_problem_details_from_service_response(
        resp,
        "BAD_REQUEST",
        StatusCode::BAD_REQUEST,
        Some("Invalid query"),
    )
    .await;
}

#[actix_web::test]
async fn request_ids_are_echoed_and_reused() {
    let app = build_app(test_state().await).await;
    let incoming = "6f1c1a52-3a35-4d2a-9e0e-0b8f4f3d2a11";

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/games/abc")
            .insert_header(("x-request-id", incoming))
            .to_request(),
    )
    .await;
    assert_eq!(
        resp.headers().get("x-request-id").and_then(|v| v.to_str().ok()),
        Some(incoming)
    );
    let problem = assert_problem_details_from_service_response(
        resp,
        "INVALID_GAME_ID",
        StatusCode::BAD_REQUEST,
        None,
    )
    .await;
    assert_eq!(problem.trace_id, incoming);
}
