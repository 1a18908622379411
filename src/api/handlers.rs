//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{info, warn};

use crate::state::{AppState, Field};
use super::responses::{ApiResponse, HealthResponse, StatusResponse, TimerView};

fn parse_field(name: &str) -> Result<Field, StatusCode> {
    name.parse().map_err(|e| {
        warn!("{}", e);
        StatusCode::NOT_FOUND
    })
}

/// Handle POST /fields/:field/inc - Increment an edit field
pub async fn increment_handler(
    State(state): State<Arc<AppState>>,
    Path(field): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let field = parse_field(&field)?;
    state.controller.increment(field);
    state.record_action(&format!("inc-{}", field));

    let timer = state.controller.snapshot();
    Ok(Json(ApiResponse::new(
        format!("{} set to {}", field, timer.field(field)),
        timer,
    )))
}

/// Handle POST /fields/:field/dec - Decrement an edit field
pub async fn decrement_handler(
    State(state): State<Arc<AppState>>,
    Path(field): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let field = parse_field(&field)?;
    state.controller.decrement(field);
    state.record_action(&format!("dec-{}", field));

    let timer = state.controller.snapshot();
    Ok(Json(ApiResponse::new(
        format!("{} set to {}", field, timer.field(field)),
        timer,
    )))
}

/// Handle POST /start - Start (or restart) the countdown
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    state.controller.start_countdown();
    state.record_action("start");
    info!("Start endpoint called");

    let timer = state.controller.snapshot();
    let message = if timer.is_running {
        format!("Countdown started from {}", timer.clock())
    } else {
        "Countdown of zero seconds completed".to_string()
    };
    Json(ApiResponse::new(message, timer))
}

/// Handle POST /reset - Stop the countdown and clear the fields
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    state.controller.reset();
    state.record_action("reset");
    info!("Reset endpoint called");

    Json(ApiResponse::new(
        "Timer reset".to_string(),
        state.controller.snapshot(),
    ))
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.controller.snapshot().into(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /events - Stream every timer change as a server-sent event
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut updates = state.controller.subscribe();
    // Deliver the current state first
    updates.mark_changed();

    let events = stream::unfold(updates, |mut updates| async move {
        updates.changed().await.ok()?;
        let view = TimerView::from(updates.borrow_and_update().clone());
        let event = Event::default()
            .event("timer")
            .json_data(&view)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()));
        Some((Ok(event), updates))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
