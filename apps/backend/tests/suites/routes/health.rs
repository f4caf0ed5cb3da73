use actix_web::test;

use crate::common::ok_json;
use crate::support::app_builder::build_app;
use crate::support::test_state::test_state;

#[actix_web::test]
async fn health_reports_database_and_migrations() {
    let app = build_app(test_state().await).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    let body = ok_json(resp).await;

    assert_eq!(body["ok"], true);
    assert_eq!(body["db"], "ok");
    assert_eq!(body["migrations"], 1);
    assert!(body["app_version"].as_str().is_some());
    assert!(body["time"].as_str().is_some_and(|t| t.ends_with('Z')));
}

#[actix_web::test]
async fn stats_overview_counts_agents_and_games() {
    let state = test_state().await;
    crate::support::factory::start_match(&state, "stats").await;
    let app = build_app(state).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/stats/overview").to_request(),
    )
    .await;
    let body = ok_json(resp).await;
    assert_eq!(body["agents"], 2);
    assert_eq!(body["games"], 1);
    assert_eq!(body["live_games"], 1);
}

#[actix_web::test]
async fn dashboard_splits_live_and_finished_games() {
    use crate::support::factory::{set_deadline, start_match};
    use time::{Duration, OffsetDateTime};

    let state = test_state().await;
    let stale = start_match(&state, "dash1").await;
    let live = start_match(&state, "dash2").await;
    set_deadline(&state, stale.game_id, OffsetDateTime::now_utc() - Duration::seconds(5)).await;
    let app = build_app(state).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/overview?live_limit=5&history_limit=0&ranking_limit=2")
            .to_request(),
    )
    .await;
    let body = ok_json(resp).await;

    assert_eq!(body["stats"]["games"], 2);
    assert_eq!(body["stats"]["live_games"], 1);
    assert_eq!(body["stats"]["agents"], 4);
    assert_eq!(body["rankings"].as_array().map(Vec::len), Some(2));

    let live_games = body["live_games"].as_array().unwrap();
    assert_eq!(live_games.len(), 1);
    assert_eq!(live_games[0]["id"], live.game_id);
    assert_eq!(live_games[0]["black_agent_name"], "dash2-b");

    let recent = body["recent_games"].as_array().unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["id"], stale.game_id);
    assert_eq!(recent[0]["status"], "finished");
}
