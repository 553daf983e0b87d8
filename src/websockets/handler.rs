use axum::{
    extract::{rejection::QueryRejection, Path, Query, State, WebSocketUpgrade},
    response::Response,
};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::connection_registry::StreamTicket;
use super::socket::{Connection, SocketWrapper};
use crate::event::RoomSubscription;
use crate::shared::{AppError, AppState};
use crate::signaling::{validate_id, validate_room_id};

/// Query string of the event stream endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEventsQuery {
    pub user_id: String,
}

/// WebSocket endpoint streaming a participant's room events
/// GET /rooms/:room_id/events?userId=...
///
/// The subscription is opened before the upgrade completes, so events
/// published while the handshake is in flight are queued, not lost.
pub async fn room_events_handler(
    ws: WebSocketUpgrade,
    Path(room_id): Path<String>,
    query: Result<Query<RoomEventsQuery>, QueryRejection>,
    State(app_state): State<AppState>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    validate_room_id(&room_id)?;
    validate_id("userId", &query.user_id)?;

    info!(
        room_id = %room_id,
        user_id = %query.user_id,
        "Event stream requested"
    );

    let subscription = RoomSubscription::open(&app_state.event_bus, &room_id, &query.user_id)
        .map_err(|e| {
            warn!(room_id = %room_id, error = %e, "Could not open room subscription");
            AppError::from(e)
        })?;
    // Dropped with the callback if the upgrade never completes
    let ticket = app_state.connections.register(&room_id, &query.user_id);

    Ok(ws.on_upgrade(move |socket| {
        serve_connection(Box::new(socket), subscription, ticket, app_state)
    }))
}

/// Drives one event stream connection to completion, then cleans up
///
/// When `leave_on_disconnect` is enabled the participant is removed from
/// the room once their last open stream closes, which publishes `peer-left`.
pub async fn serve_connection(
    socket: Box<dyn SocketWrapper>,
    subscription: RoomSubscription,
    ticket: StreamTicket,
    app_state: AppState,
) {
    let connection_id = Uuid::new_v4();
    let room_id = subscription.room_id().to_string();
    let user_id = subscription.user_id().to_string();

    info!(
        connection_id = %connection_id,
        room_id = %room_id,
        user_id = %user_id,
        "Event stream connection established"
    );

    match Connection::new(socket, subscription).run().await {
        Ok(()) => {
            info!(
                connection_id = %connection_id,
                room_id = %room_id,
                user_id = %user_id,
                "Event stream closed cleanly"
            );
        }
        Err(e) => {
            warn!(
                connection_id = %connection_id,
                room_id = %room_id,
                user_id = %user_id,
                error = %e,
                "Event stream connection error"
            );
        }
    }

    ticket.release();
    if !app_state.config.leave_on_disconnect {
        return;
    }

    let connections = &app_state.connections;
    let left = app_state
        .signaling_service
        .leave_unless(&room_id, &user_id, || {
            connections.open_streams(&room_id, &user_id) > 0
        })
        .await;

    match left {
        Ok(true) => info!(
            connection_id = %connection_id,
            room_id = %room_id,
            user_id = %user_id,
            "Participant removed after disconnect"
        ),
        Ok(false) => debug!(
            connection_id = %connection_id,
            room_id = %room_id,
            user_id = %user_id,
            open_streams = connections.open_streams(&room_id, &user_id),
            "Participant kept in room after disconnect"
        ),
        Err(e) => warn!(
            connection_id = %connection_id,
            room_id = %room_id,
            user_id = %user_id,
            error = %e,
            "Failed to remove participant after disconnect"
        ),
    }
}
