use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::ServerConfig;
use crate::event::{BusError, EventBus};
use crate::room::repository::{InMemoryRoomRepository, RoomRepository};
use crate::signaling::SignalingService;
use crate::websockets::ConnectionRegistry;

/// Shared application state containing all dependencies
///
/// Built once at startup and torn down with [`AppState::shutdown`]. Tests
/// build as many independent instances as they like.
#[derive(Clone)]
pub struct AppState {
    pub room_repository: Arc<dyn RoomRepository + Send + Sync>,
    pub event_bus: EventBus,
    pub signaling_service: Arc<SignalingService>,
    pub connections: ConnectionRegistry,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Wires an in-memory registry and a fresh bus according to `config`
    pub fn new(config: ServerConfig) -> Self {
        let room_repository: Arc<dyn RoomRepository + Send + Sync> =
            Arc::new(InMemoryRoomRepository::new());
        let event_bus = EventBus::with_max_listeners(config.max_listeners);
        Self::from_parts(room_repository, event_bus, config)
    }

    pub fn from_parts(
        room_repository: Arc<dyn RoomRepository + Send + Sync>,
        event_bus: EventBus,
        config: ServerConfig,
    ) -> Self {
        let signaling_service = Arc::new(SignalingService::new(
            Arc::clone(&room_repository),
            event_bus.clone(),
            config.max_text_len,
        ));

        Self {
            room_repository,
            event_bus,
            signaling_service,
            connections: ConnectionRegistry::new(),
            config: Arc::new(config),
        }
    }

    /// Closes the event bus, ending every open room subscription
    pub fn shutdown(&self) {
        let closed = self.event_bus.close();
        info!(subscriptions = closed, "Meeting hub shut down");
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error")]
    Internal,
}

impl From<BusError> for AppError {
    fn from(error: BusError) -> Self {
        AppError::Unavailable(error.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => AppError::Validation(e.body_text()),
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
