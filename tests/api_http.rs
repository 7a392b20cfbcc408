// tests/api_http.rs
//
// HTTP-level tests for the gauge Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /meter   (204 before the first cycle, reading afterwards)
// - POST /refresh (runs a cycle; 409 while one is in flight)

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use serde_json::Value as Json;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt as _; // for `oneshot`

use war_o_meter::api::{self, AppState};
use war_o_meter::ingest::FixtureFetcher;
use war_o_meter::{Aggregator, FeedSource, FetchStrategy, KeywordScanner, KeywordSets};

const BODY_LIMIT: usize = 1024 * 1024;
const WORLD_XML: &str = include_str!("fixtures/world_rss.xml");

fn test_state(fetcher: FixtureFetcher) -> AppState {
    let agg = Aggregator::new(
        vec![FeedSource::new("https://world.test")],
        KeywordScanner::new(Arc::new(KeywordSets::default())),
        Arc::new(fetcher),
        FetchStrategy::Sequential,
    );
    AppState::new(agg)
}

async fn json_body(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET")
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("build POST")
}

#[tokio::test]
async fn health_returns_ok() {
    let app = api::router(test_state(FixtureFetcher::new()));
    let resp = app.oneshot(get("/health")).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    assert_eq!(String::from_utf8_lossy(&bytes).trim(), "OK");
}

#[tokio::test]
async fn meter_is_empty_until_first_cycle() {
    let app = api::router(test_state(FixtureFetcher::new()));
    let resp = app.oneshot(get("/meter")).await.expect("oneshot /meter");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn refresh_then_meter_serves_gauge_reading() {
    let state = test_state(FixtureFetcher::new().with_body("https://world.test", WORLD_XML));
    let app = api::router(state);

    let resp = app
        .clone()
        .oneshot(post("/refresh"))
        .await
        .expect("oneshot /refresh");
    assert_eq!(resp.status(), StatusCode::OK);
    let fresh = json_body(resp).await;

    let resp = app.oneshot(get("/meter")).await.expect("oneshot /meter");
    assert_eq!(resp.status(), StatusCode::OK);
    let v = json_body(resp).await;

    // Contract checks for gauge consumers
    assert_eq!(v, fresh);
    assert_eq!(v["percent"], 83);
    assert_eq!(v["label"], "83%");
    assert_eq!(v["flash_ms"], 100);
    assert_eq!(v["total_entries"], 3);
    let angle = v["angle_deg"].as_f64().expect("angle");
    assert!((angle - ((250.0 / 3.0) / 100.0 * 220.0 - 110.0)).abs() < 1e-9);
    let evidence: Vec<&str> = v["evidence"]
        .as_array()
        .expect("evidence array")
        .iter()
        .filter_map(|x| x.as_str())
        .collect();
    assert_eq!(
        evidence,
        vec![
            "war (http://world.test/1)",
            "guerra (http://world.test/1)",
            "tensions (http://world.test/2)",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn refresh_conflicts_with_running_cycle() {
    let fetcher = FixtureFetcher::new().with_delayed_body(
        "https://world.test",
        WORLD_XML,
        Duration::from_secs(3),
    );
    let state = test_state(fetcher);
    let runner = state.runner.clone();
    let app = api::router(state);

    let (running, resp) = tokio::join!(runner.try_run(), app.oneshot(post("/refresh")));
    assert!(running.is_some());
    assert_eq!(resp.expect("oneshot /refresh").status(), StatusCode::CONFLICT);
}
