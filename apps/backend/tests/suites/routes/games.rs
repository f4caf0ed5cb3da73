use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details_from_service_response;
use serde_json::json;

use crate::common::ok_json;
use crate::support::app_builder::{bearer, build_app};
use crate::support::factory::{play_opening, start_match};
use crate::support::test_state::test_state;

#[actix_web::test]
async fn move_swap_and_view_round_trip() {
    let state = test_state().await;
    let m = start_match(&state, "http").await;
    let app = build_app(state).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/games/{}/move", m.game_id))
            .insert_header(bearer(&m.black.api_key))
            .set_json(json!({ "x": 7, "y": 7, "turn_number": 1, "idempotency_key": "m1" }))
            .to_request(),
    )
    .await;
    let body = ok_json(resp).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["move_number"], 1);
    assert_eq!(body["duplicate"], false);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/games/{}/swap", m.game_id))
            .insert_header(bearer(&m.white.api_key))
            .set_json(json!({ "swap": false }))
            .to_request(),
    )
    .await;
    let body = ok_json(resp).await;
    assert_eq!(body["swapped"], false);
    assert_eq!(body["black_agent_id"], m.black.id);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/games/{}", m.game_id))
            .to_request(),
    )
    .await;
    let view = ok_json(resp).await;
    assert_eq!(view["status"], "active");
    assert_eq!(view["phase"], "opening_2");
    assert_eq!(view["turn_color"], "white");
    assert_eq!(view["required_action"], "move");
    assert_eq!(view["acting_agent_id"], m.white.id);
    assert_eq!(view["board"][7][7], "black");
    assert_eq!(view["moves"].as_array().map(Vec::len), Some(1));
    assert_eq!(view["legal_moves"].as_array().map(Vec::len), Some(8));
    assert_eq!(view["black_agent_name"], "http-b");
}

#[actix_web::test]
async fn offer10_endpoints_drive_move_five() {
    let state = test_state().await;
    let m = start_match(&state, "offer").await;
    play_opening(&state, &m, 4).await;
    let app = build_app(state).await;

    let candidates: Vec<_> = [(0, 0), (1, 0), (2, 0), (3, 0), (4, 0), (5, 0), (6, 0), (7, 0), (1, 1), (2, 1)]
        .iter()
        .map(|&(x, y)| json!({ "x": x, "y": y }))
        .collect();
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/games/{}/offer10", m.game_id))
            .insert_header(bearer(&m.black.api_key))
            .set_json(json!({ "candidates": candidates }))
            .to_request(),
    )
    .await;
    let body = ok_json(resp).await;
    assert!(body["offer10_id"].as_i64().is_some());

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/games/{}/offer10/select", m.game_id))
            .insert_header(bearer(&m.white.api_key))
            .set_json(json!({ "x": 9, "y": 9 }))
            .to_request(),
    )
    .await;
    assert_problem_details_from_service_response(
        resp,
        "NOT_AN_OFFER_CANDIDATE",
        StatusCode::BAD_REQUEST,
        None,
    )
    .await;

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/games/{}/offer10/select", m.game_id))
            .insert_header(bearer(&m.white.api_key))
            .set_json(json!({ "x": 2, "y": 1 }))
            .to_request(),
    )
    .await;
    let body = ok_json(resp).await;
    assert_eq!(body["move_number"], 5);
    assert_eq!((body["x"].as_u64(), body["y"].as_u64()), (Some(2), Some(1)));
}

#[actix_web::test]
async fn game_wait_with_a_stale_marker_returns_immediately() {
    let state = test_state().await;
    let m = start_match(&state, "gwait").await;
    let app = build_app(state).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/games/{}/wait?since_move=3&timeout_sec=5", m.game_id))
            .to_request(),
    )
    .await;
    let body = ok_json(resp).await;
    assert_eq!(body["changed"], true);
    assert_eq!(body["game"]["move_number"], 0);
    assert!(body["revision"].as_str().is_some());
}

#[actix_web::test]
async fn list_games_honors_known_status_filters() {
    let state = test_state().await;
    let m = start_match(&state, "list").await;
    let app = build_app(state).await;

    for (query, expected) in [("status=active", 1), ("status=finished", 0), ("status=bogus", 1)] {
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/games?{query}&limit=5"))
                .to_request(),
        )
        .await;
        let body = ok_json(resp).await;
        let games = body["games"].as_array().unwrap();
        assert_eq!(games.len(), expected, "query {query}");
        if expected == 1 {
            assert_eq!(games[0]["id"], m.game_id);
        }
    }
}
