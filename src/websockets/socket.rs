use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use thiserror::Error;
use tracing::{debug, warn};

use super::messages::{encode_event, ClientFrame, ServerFrame};
use crate::event::RoomSubscription;

/// Simple WebSocket abstraction - all we care about is send/receive
#[async_trait]
pub trait SocketWrapper: Send {
    /// Send a text message to the client
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Receive the next text message from the client (None if connection closed)
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), SocketError>;
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Encoding failed: {0}")]
    EncodeFailed(String),
}

/// Direct implementation on axum's WebSocket
#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                // axum answers pings itself; binary frames carry nothing for us
                Some(Ok(Message::Binary(_) | Message::Ping(_) | Message::Pong(_))) => continue,
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// One participant's open event stream
///
/// Pushes every event of its room subscription to the client until either
/// side goes away. Closing, for whatever reason, drops the subscription.
pub struct Connection {
    socket: Box<dyn SocketWrapper>,
    subscription: RoomSubscription,
}

impl Connection {
    pub fn new(socket: Box<dyn SocketWrapper>, subscription: RoomSubscription) -> Self {
        Self {
            socket,
            subscription,
        }
    }

    /// Run the connection - handles both sending and receiving until disconnect
    pub async fn run(mut self) -> Result<(), SocketError> {
        let result = self.pump().await;

        self.subscription.close();
        let _ = self.socket.close().await;
        result
    }

    async fn pump(&mut self) -> Result<(), SocketError> {
        loop {
            tokio::select! {
                // Room events (bus -> client)
                event = self.subscription.next_event() => {
                    match event {
                        Some(event) => {
                            let text = encode_event(&event)
                                .map_err(|e| SocketError::EncodeFailed(e.to_string()))?;
                            self.socket.send_message(text).await?;
                        }
                        None => {
                            debug!(
                                room_id = %self.subscription.room_id(),
                                user_id = %self.subscription.user_id(),
                                "Subscription ended, closing connection"
                            );
                            return Ok(());
                        }
                    }
                }

                // Client frames (client -> server)
                msg = self.socket.receive_message() => {
                    match msg {
                        Ok(Some(text)) => self.handle_client_frame(&text).await?,
                        Ok(None) => return Ok(()), // Client disconnected
                        Err(e) => return Err(e),
                    }
                }
            }
        }
    }

    async fn handle_client_frame(&mut self, text: &str) -> Result<(), SocketError> {
        match serde_json::from_str::<ClientFrame>(text) {
            Ok(ClientFrame::Ping) => {
                let pong = serde_json::to_string(&ServerFrame::Pong)
                    .map_err(|e| SocketError::EncodeFailed(e.to_string()))?;
                self.socket.send_message(pong).await
            }
            Err(e) => {
                warn!(
                    room_id = %self.subscription.room_id(),
                    user_id = %self.subscription.user_id(),
                    error = %e,
                    "Ignoring unexpected client frame"
                );
                Ok(())
            }
        }
    }
}
