use axum::{extract::rejection::JsonRejection, extract::State, Json};
use tracing::{info, instrument};

use super::types::{
    ControlRequest, JoinRoomResponse, MembershipRequest, OkResponse, SignalRequest,
    TextMessageRequest,
};
use crate::shared::{AppError, AppState};

/// HTTP handler for joining a meeting room
///
/// POST /rooms/join
/// Returns the participants already present
#[instrument(name = "join_room", skip(state, payload))]
pub async fn join_room(
    State(state): State<AppState>,
    payload: Result<Json<MembershipRequest>, JsonRejection>,
) -> Result<Json<JoinRoomResponse>, AppError> {
    let Json(request) = payload?;

    let peers = state
        .signaling_service
        .join_room(&request.room_id, &request.user_id)
        .await?;

    info!(
        room_id = %request.room_id,
        user_id = %request.user_id,
        peer_count = peers.len(),
        "Join request served"
    );

    Ok(Json(JoinRoomResponse { peers }))
}

/// HTTP handler for leaving a meeting room
///
/// POST /rooms/leave
#[instrument(name = "leave_room", skip(state, payload))]
pub async fn leave_room(
    State(state): State<AppState>,
    payload: Result<Json<MembershipRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let Json(request) = payload?;

    state
        .signaling_service
        .leave(&request.room_id, &request.user_id)
        .await?;

    Ok(Json(OkResponse::ok()))
}

/// HTTP handler relaying an offer, answer or ICE candidate
///
/// POST /signal
#[instrument(name = "signal", skip(state, payload))]
pub async fn signal(
    State(state): State<AppState>,
    payload: Result<Json<SignalRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let Json(request) = payload?;

    state
        .signaling_service
        .signal(&request.room_id, request.event)
        .await?;

    Ok(Json(OkResponse::ok()))
}

/// POST /chat
#[instrument(name = "send_chat", skip(state, payload))]
pub async fn send_chat(
    State(state): State<AppState>,
    payload: Result<Json<TextMessageRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let Json(request) = payload?;

    state
        .signaling_service
        .send_chat(&request.room_id, &request.from, &request.text)
        .await?;

    Ok(Json(OkResponse::ok()))
}

/// POST /stt-text
#[instrument(name = "send_stt_text", skip(state, payload))]
pub async fn send_stt_text(
    State(state): State<AppState>,
    payload: Result<Json<TextMessageRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let Json(request) = payload?;

    state
        .signaling_service
        .send_stt_text(&request.room_id, &request.from, &request.text)
        .await?;

    Ok(Json(OkResponse::ok()))
}

/// POST /control
#[instrument(name = "send_control", skip(state, payload))]
pub async fn send_control(
    State(state): State<AppState>,
    payload: Result<Json<ControlRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let Json(request) = payload?;

    state
        .signaling_service
        .send_control(
            &request.room_id,
            &request.from,
            request.action,
            request.target.as_deref(),
        )
        .await?;

    Ok(Json(OkResponse::ok()))
}
