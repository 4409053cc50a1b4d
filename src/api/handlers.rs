//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{error, info, warn};

use crate::{
    error::DisplayError,
    render::PlayerReadout,
    state::{anchor_scroll_target, AppState, DisplaySnapshot, HeaderState},
};
use super::responses::*;

type HandlerError = (StatusCode, Json<ErrorResponse>);
type HandlerResult<T> = Result<Json<T>, HandlerError>;

/// Map a display error onto an HTTP status and log it
fn reject(context: &str, e: DisplayError) -> HandlerError {
    let status = match &e {
        DisplayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DisplayError::TornDown | DisplayError::UnsupportedMode(_) | DisplayError::Media(_) => {
            StatusCode::CONFLICT
        }
        DisplayError::StatePoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("{}: {}", context, e);
    } else {
        warn!("{}: {}", context, e);
    }
    (status, Json(ErrorResponse::new(e.to_string())))
}

fn snapshot(state: &AppState) -> Result<DisplaySnapshot, HandlerError> {
    state.snapshot().map_err(|e| reject("Failed to read display state", e))
}

/// Handle GET /countdown - Current countdown readout
pub async fn countdown_handler(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<CountdownResponse> {
    let snapshot = snapshot(&state)?;
    Ok(Json(CountdownResponse::from(&snapshot)))
}

/// Handle GET /player - Current player readout
pub async fn player_handler(State(state): State<Arc<AppState>>) -> HandlerResult<PlayerReadout> {
    let snapshot = snapshot(&state)?;
    Ok(Json(PlayerReadout::from(&snapshot)))
}

/// Handle POST /player/toggle - Play or pause
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
) -> HandlerResult<ApiResponse<PlayerReadout>> {
    let status = state
        .toggle_playback()
        .await
        .map_err(|e| reject("Failed to toggle playback", e))?;
    info!("Toggle endpoint called - player now {:?}", status);

    let snapshot = snapshot(&state)?;
    let message = format!("Player {:?}", status).to_lowercase();
    Ok(Json(ApiResponse::ok(message, PlayerReadout::from(&snapshot))))
}

/// Handle POST /player/seek - Jump to a fraction of the track
pub async fn seek_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SeekRequest>,
) -> HandlerResult<ApiResponse<PlayerReadout>> {
    state.seek(request.position).map_err(|e| reject("Failed to seek", e))?;
    let snapshot = snapshot(&state)?;
    Ok(Json(ApiResponse::ok("Position updated", PlayerReadout::from(&snapshot))))
}

/// Handle POST /player/rate - Change playback rate
pub async fn rate_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RateRequest>,
) -> HandlerResult<ApiResponse<PlayerReadout>> {
    state.set_playback_rate(request.rate).map_err(|e| reject("Failed to set playback rate", e))?;
    let snapshot = snapshot(&state)?;
    let message = format!("Playback rate {}x", request.rate);
    Ok(Json(ApiResponse::ok(message, PlayerReadout::from(&snapshot))))
}

/// Handle POST /player/skip - Move the media position by a number of seconds
pub async fn skip_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SkipRequest>,
) -> HandlerResult<ApiResponse<PlayerReadout>> {
    state.skip(request.seconds).map_err(|e| reject("Failed to skip", e))?;
    let snapshot = snapshot(&state)?;
    Ok(Json(ApiResponse::ok("Position updated", PlayerReadout::from(&snapshot))))
}

/// Handle POST /reveal/observe - Register elements for reveal
pub async fn observe_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ObserveRequest>,
) -> HandlerResult<ApiResponse<RevealResponse>> {
    let added = state
        .observe_for_reveal(request.elements)
        .map_err(|e| reject("Failed to observe elements", e))?;
    let snapshot = snapshot(&state)?;
    Ok(Json(ApiResponse::ok(
        format!("Observing {} new elements", added),
        RevealResponse { revealed_now: Vec::new(), elements: snapshot.revealed },
    )))
}

/// Handle POST /reveal/intersections - Report element positions
pub async fn intersections_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IntersectionRequest>,
) -> HandlerResult<ApiResponse<RevealResponse>> {
    let revealed_now = state
        .handle_intersections(request.viewport_height, &request.entries)
        .map_err(|e| reject("Failed to process intersections", e))?;
    let snapshot = snapshot(&state)?;
    Ok(Json(ApiResponse::ok(
        format!("Revealed {} elements", revealed_now.len()),
        RevealResponse { revealed_now, elements: snapshot.revealed },
    )))
}

/// Handle GET /reveal - Reveal flags of every registered element
pub async fn reveal_handler(State(state): State<Arc<AppState>>) -> HandlerResult<RevealResponse> {
    let snapshot = snapshot(&state)?;
    Ok(Json(RevealResponse { revealed_now: Vec::new(), elements: snapshot.revealed }))
}

/// Handle POST /scroll - Report the page scroll offset
pub async fn scroll_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScrollRequest>,
) -> HandlerResult<HeaderState> {
    let header = state
        .on_scroll(request.scroll_top)
        .map_err(|e| reject("Failed to track scroll", e))?;
    Ok(Json(header))
}

/// Handle POST /anchor - Scroll offset for an in-page anchor target
pub async fn anchor_handler(Json(request): Json<AnchorRequest>) -> HandlerResult<AnchorResponse> {
    if !request.element_top.is_finite() {
        return Err(reject(
            "Invalid anchor request",
            DisplayError::invalid_input("element_top must be a finite number"),
        ));
    }
    Ok(Json(AnchorResponse { scroll_top: anchor_scroll_target(request.element_top) }))
}

/// Handle GET /status - Full display status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> HandlerResult<StatusResponse> {
    let snapshot = snapshot(&state)?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        countdown: CountdownResponse::from(&snapshot),
        player: PlayerReadout::from(&snapshot),
        revealed: snapshot.revealed.clone(),
        header: snapshot.header,
        active_timers: state.active_timers(),
        torn_down: snapshot.torn_down,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - Server-sent stream of display snapshots
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.subscribe();

    // (receiver, first, finished)
    let events = stream::unfold(
        (receiver, true, false),
        |(mut receiver, first, finished)| async move {
            if finished || (!first && receiver.changed().await.is_err()) {
                return None;
            }
            let snapshot = receiver.borrow_and_update().clone();
            let event = Event::default()
                .event("snapshot")
                .json_data(&snapshot)
                .unwrap_or_else(|e| {
                    Event::default().comment(format!("snapshot encoding failed: {}", e))
                });
            Some((Ok(event), (receiver, false, snapshot.torn_down)))
        },
    );

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
