//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/countdown", get(countdown_handler))
        .route("/player", get(player_handler))
        .route("/player/toggle", post(toggle_handler))
        .route("/player/seek", post(seek_handler))
        .route("/player/rate", post(rate_handler))
        .route("/player/skip", post(skip_handler))
        .route("/reveal", get(reveal_handler))
        .route("/reveal/observe", post(observe_handler))
        .route("/reveal/intersections", post(intersections_handler))
        .route("/scroll", post(scroll_handler))
        .route("/anchor", post(anchor_handler))
        .route("/status", get(status_handler))
        .route("/events", get(events_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use chrono::DateTime;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{config::DisplaySettings, host::ManualClock};

    fn state() -> Arc<AppState> {
        let start = DateTime::parse_from_rfc3339("2026-03-01T23:59:59.999+09:00").unwrap();
        Arc::new(AppState::new(
            DisplaySettings::default(),
            Arc::new(ManualClock::new(start)),
            None,
            "127.0.0.1".to_string(),
            20554,
        ))
    }

    async fn call(
        state: &Arc<AppState>,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = create_router(Arc::clone(state))
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_countdown_readout_is_padded() {
        let state = state();
        state.countdown_tick().unwrap();

        let (status, body) = call(&state, "GET", "/countdown", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["readout"],
            json!({"days": "15", "hours": "00", "minutes": "00", "seconds": "00"})
        );
    }

    #[tokio::test]
    async fn test_player_width_and_seek() {
        let state = state();
        let (_, body) = call(&state, "GET", "/player", None).await;
        assert_eq!(body["width"], "35%");
        assert_eq!(body["status"], "paused");

        let seek = json!({"position": 0.625});
        let (status, body) = call(&state, "POST", "/player/seek", Some(seek)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["progress"], 62.5);
        assert_eq!(body["data"]["width"], "62.5%");
    }

    #[tokio::test]
    async fn test_toggle_and_rate() {
        let state = state();
        let (status, body) = call(&state, "POST", "/player/toggle", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "playing");

        let (status, _) = call(&state, "POST", "/player/rate", Some(json!({"rate": 3.0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, body) = call(&state, "POST", "/player/rate", Some(json!({"rate": 1.5}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["rate"], 1.5);

        let skip = json!({"seconds": 30.0});
        let (status, _) = call(&state, "POST", "/player/skip", Some(skip)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        state.teardown();
    }

    #[tokio::test]
    async fn test_reveal_flow() {
        let state = state();
        let (status, _) = call(
            &state,
            "POST",
            "/reveal/observe",
            Some(json!({"elements": ["problem-card", "pricing-card"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let report = json!({
            "viewport_height": 800.0,
            "entries": [
                {"id": "problem-card", "top": 200.0, "height": 300.0},
                {"id": "pricing-card", "top": 1600.0, "height": 300.0}
            ]
        });
        let (_, body) = call(&state, "POST", "/reveal/intersections", Some(report.clone())).await;
        assert_eq!(body["data"]["revealed_now"], json!(["problem-card"]));

        let (_, body) = call(&state, "POST", "/reveal/intersections", Some(report)).await;
        assert_eq!(body["data"]["revealed_now"], json!([]));

        let (_, body) = call(&state, "GET", "/reveal", None).await;
        assert_eq!(body["elements"], json!({"pricing-card": false, "problem-card": true}));
    }

    #[tokio::test]
    async fn test_scroll_and_anchor() {
        let state = state();
        let (_, body) = call(&state, "POST", "/scroll", Some(json!({"scroll_top": 250.0}))).await;
        assert_eq!(body["hidden"], true);
        let (_, body) = call(&state, "POST", "/scroll", Some(json!({"scroll_top": 120.0}))).await;
        assert_eq!(body["hidden"], false);

        let (_, body) = call(&state, "POST", "/anchor", Some(json!({"element_top": 900.0}))).await;
        assert_eq!(body["scroll_top"], 830.0);
    }

    #[tokio::test]
    async fn test_writes_after_teardown_conflict() {
        let state = state();
        state.teardown();

        let (status, body) = call(&state, "POST", "/player/toggle", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status"], "error");

        let (status, body) = call(&state, "GET", "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["torn_down"], true);
        assert_eq!(body["active_timers"], 0);
    }

    #[tokio::test]
    async fn test_event_stream_ends_with_torn_down_snapshot() {
        let state = state();
        let request = Request::builder().uri("/events").body(Body::empty()).unwrap();
        let response = create_router(Arc::clone(&state)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let reader = tokio::spawn(async move {
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            String::from_utf8(bytes.to_vec()).unwrap()
        });
        // let the reader take the initial snapshot before anything changes
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        state.on_scroll(250.0).unwrap();
        state.teardown();

        let body = tokio::time::timeout(std::time::Duration::from_secs(5), reader)
            .await
            .expect("event stream should end after teardown")
            .unwrap();
        let snapshots: Vec<Value> = body
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|data| serde_json::from_str(data.trim()).unwrap())
            .collect();

        assert!(snapshots.len() >= 2);
        assert_eq!(snapshots[0]["torn_down"], false);
        assert_eq!(snapshots[0]["header"]["hidden"], false);
        let last = snapshots.last().unwrap();
        assert_eq!(last["torn_down"], true);
        assert_eq!(last["header"]["hidden"], true);
        let names = body
            .lines()
            .filter_map(|line| line.strip_prefix("event:"))
            .filter(|name| name.trim() == "snapshot")
            .count();
        assert_eq!(names, snapshots.len());
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&state(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
