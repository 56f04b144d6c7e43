//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use super::AppState;
use super::types::{
    CandidateRecord, ErrorResponse, OptimumRecord, PlanQuery, PlanResponse, StatusResponse,
    WindowRecord,
};
use crate::appliance;
use crate::error::PlannerError;
use crate::schedule::{OperationPlanner, expand, select_optimum, status_at, upcoming};

/// `GET /status` → 200 + `StatusResponse` JSON
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let now = state.clock.now();
    let status = status_at(&state.periods, now, &state.calendar);
    Json(StatusResponse::new(now, &status))
}

/// `GET /windows` → 200 + `Vec<WindowRecord>` JSON, sorted by start
pub async fn get_windows(State(state): State<Arc<AppState>>) -> Json<Vec<WindowRecord>> {
    let now = state.clock.now();
    let mut windows = upcoming(&expand(&state.periods, now, &state.calendar), now);
    windows.sort_by_key(|w| w.start());
    Json(windows.iter().map(WindowRecord::from).collect())
}

/// Candidate runs and optimum for one appliance program.
///
/// `GET /plan?appliance=A&program=P` → 200 + `PlanResponse` JSON
/// Unknown appliance or program → 404 + `ErrorResponse`
pub async fn get_plan(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlanQuery>,
) -> Result<Json<PlanResponse>, (StatusCode, Json<ErrorResponse>)> {
    let now = state.clock.now();

    let found = appliance::find(&state.config.appliances, &query.appliance).and_then(|a| {
        a.program(&query.program)
            .map(|p| (a, p))
            .ok_or_else(|| PlannerError::UnknownProgram {
                appliance: a.name.clone(),
                program: query.program.clone(),
            })
    });
    let (appliance, program) = match found {
        Ok(pair) => pair,
        Err(e) => return Err(error_response(StatusCode::NOT_FOUND, &e)),
    };

    let planner = OperationPlanner::new(&state.periods, &state.calendar, program.duration())
        .map_err(|e| error_response(StatusCode::UNPROCESSABLE_ENTITY, &e))?;
    let operations = planner
        .plan(&appliance.delays, now)
        .map_err(|e| error_response(StatusCode::UNPROCESSABLE_ENTITY, &e))?;
    let optimum = select_optimum(&operations, now, &planner)
        .map_err(|e| error_response(StatusCode::UNPROCESSABLE_ENTITY, &e))?;

    Ok(Json(PlanResponse {
        appliance: appliance.name.clone(),
        program: program.name.clone(),
        now,
        candidates: operations.iter().map(CandidateRecord::from).collect(),
        optimum: optimum.as_ref().map(OptimumRecord::from),
    }))
}

fn error_response(status: StatusCode, err: &PlannerError) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{DateTime, Utc};
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::config::PlannerConfig;
    use crate::schedule::clock::FixedClock;

    fn make_test_state(now: &str) -> Arc<AppState> {
        let mut config = PlannerConfig::baseline();
        config.calendar.timezone = "UTC".to_string();
        let now = DateTime::parse_from_rfc3339(now).unwrap().with_timezone(&Utc);
        Arc::new(AppState::from_config(config, Arc::new(FixedClock(now))).unwrap())
    }

    async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
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
    async fn status_returns_200() {
        let (status, json) = get_json(make_test_state("2024-05-10T22:00:00Z"), "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "peak");
        assert_eq!(json["until_secs"], 3600);
    }

    #[tokio::test]
    async fn windows_are_sorted_and_upcoming() {
        let (status, json) = get_json(make_test_state("2024-05-10T13:00:00Z"), "/windows").await;
        assert_eq!(status, StatusCode::OK);
        let windows = json.as_array().unwrap();
        // 12-14 today, 23-07 tonight, 12-14 tomorrow, 23-07 tomorrow night
        assert_eq!(windows.len(), 4);
        assert_eq!(windows[0]["start"], "2024-05-10T12:00:00Z");
        assert_eq!(windows[1]["start"], "2024-05-10T23:00:00Z");
    }

    #[tokio::test]
    async fn plan_returns_candidates_and_optimum() {
        let (status, json) = get_json(
            make_test_state("2024-05-10T19:30:00Z"),
            "/plan?appliance=dishwasher&program=eco",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["appliance"], "Dishwasher");
        assert_eq!(json["candidates"].as_array().unwrap().len(), 10);
        assert_eq!(json["optimum"]["delay_minutes"], 240);
        assert_eq!(json["optimum"]["ratio"], 1.0);
    }

    #[tokio::test]
    async fn unknown_program_returns_404() {
        let (status, json) = get_json(
            make_test_state("2024-05-10T19:30:00Z"),
            "/plan?appliance=dishwasher&program=turbo",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json.get("error").is_some());
    }

    #[tokio::test]
    async fn unplannable_delay_returns_422() {
        let mut config = PlannerConfig::baseline();
        config.calendar.timezone = "UTC".to_string();
        config.appliances[0].delays = vec![crate::schedule::Delay::from_hours(u32::MAX)];
        let now = DateTime::parse_from_rfc3339("2024-05-10T19:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let state = Arc::new(AppState::from_config(config, Arc::new(FixedClock(now))).unwrap());

        let (status, json) = get_json(state, "/plan?appliance=dishwasher&program=eco").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("time range"));
    }
}
