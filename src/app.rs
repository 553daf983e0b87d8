use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::room;
use crate::shared::AppState;
use crate::signaling;
use crate::websockets;

/// Builds the meeting hub router with all routes and middleware
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        // Membership
        .route("/rooms", get(room::list_rooms))
        .route("/rooms/join", post(signaling::join_room))
        .route("/rooms/leave", post(signaling::leave_room))
        .route("/rooms/:room_id", get(room::get_room))
        // Event stream
        .route(
            "/rooms/:room_id/events",
            get(websockets::room_events_handler),
        )
        // Relays
        .route("/signal", post(signaling::signal))
        .route("/chat", post(signaling::send_chat))
        .route("/stt-text", post(signaling::send_stt_text))
        .route("/control", post(signaling::send_control))
        .layer(TimeoutLayer::new(app_state.config.request_timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
