//! Integration tests for the REST API feature.

#![cfg(feature = "api")]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use offpeak_planner::api::{AppState, router};
use offpeak_planner::config::PlannerConfig;
use offpeak_planner::schedule::clock::FixedClock;

/// API state over the split preset in Paris, frozen at `now`.
fn build_api_state(now: &str) -> Arc<AppState> {
    let config = PlannerConfig::split();
    Arc::new(AppState::from_config(config, Arc::new(FixedClock(common::at(now)))).unwrap())
}

async fn get(state: Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(state);
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn windows_endpoint_lists_three_upcoming_windows() {
    let (status, json) = get(build_api_state("2023-07-14T14:00:00+01:00"), "/windows").await;
    assert_eq!(status, StatusCode::OK);
    let windows = json.as_array().unwrap();
    assert_eq!(windows.len(), 3);
    assert_eq!(windows[0]["start"], "2023-07-14T13:02:00Z");
    assert_eq!(windows[0]["end"], "2023-07-14T15:02:00Z");
}

#[tokio::test]
async fn status_endpoint_reports_peak_before_afternoon_window() {
    let (status, json) = get(build_api_state("2023-07-14T14:00:00+01:00"), "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "peak");
    assert_eq!(json["until_secs"], 120);
}

#[tokio::test]
async fn plan_endpoint_covers_every_delay() {
    let (status, json) = get(
        build_api_state("2023-07-14T14:00:00+01:00"),
        "/plan?appliance=washing%20machine&program=quick",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["program"], "Quick");
    assert_eq!(json["candidates"].as_array().unwrap().len(), 13);
    assert_eq!(json["optimum"]["ratio"], 1.0);
}

#[tokio::test]
async fn unknown_appliance_returns_404() {
    let (status, json) = get(
        build_api_state("2023-07-14T14:00:00+01:00"),
        "/plan?appliance=oven&program=bake",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["error"].as_str().unwrap().contains("oven"));
}
