#![allow(dead_code)] // Test utilities may not all be used in every test

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use tokio::task::JoinHandle;

use meeting_hub::{build_router, AppState, RoomSubscription, ServerConfig};

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub state: AppState,
    pub room_id: String,
    pub participants: Vec<String>,
    /// One open event stream per participant, keyed by user id
    pub subscriptions: HashMap<String, Mutex<RoomSubscription>>,
}

pub struct TestSetupBuilder {
    participants: Vec<String>,
    listeners: Vec<String>,
    room_id: String,
    config: ServerConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            participants: vec![],
            listeners: vec![],
            room_id: "room-123".to_string(),
            config: ServerConfig::default(),
        }
    }

    /// Participants that open an event stream and join, in order
    pub fn with_participants(mut self, participants: Vec<&str>) -> Self {
        self.participants = participants.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_participants(self) -> Self {
        self.with_participants(vec!["alice", "bob"])
    }

    pub fn with_three_participants(self) -> Self {
        self.with_participants(vec!["alice", "bob", "carol"])
    }

    /// Users that listen to the room without joining it
    pub fn with_listeners(mut self, listeners: Vec<&str>) -> Self {
        self.listeners = listeners.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_room(mut self, room_id: &str) -> Self {
        self.room_id = room_id.to_string();
        self
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Opens every stream, joins every participant, then discards the
    /// `peer-joined` events produced while setting up
    pub async fn build(self) -> TestSetup {
        let state = AppState::new(self.config);

        let mut subscriptions = HashMap::new();
        for user in self.participants.iter().chain(self.listeners.iter()) {
            let subscription = RoomSubscription::open(&state.event_bus, &self.room_id, user)
                .expect("bus accepts test subscriptions");
            subscriptions.insert(user.clone(), Mutex::new(subscription));
        }

        for user in &self.participants {
            state
                .signaling_service
                .join_room(&self.room_id, user)
                .await
                .expect("test participants join");
        }

        let setup = TestSetup {
            state,
            room_id: self.room_id,
            participants: self.participants,
            subscriptions,
        };
        setup.clear_events();
        setup
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Real server for transport tests
// ============================================================================

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub _server_handle: JoinHandle<()>,
}

impl TestServer {
    pub fn events_url(&self, room_id: &str, user_id: &str) -> String {
        format!("ws://{}/rooms/{}/events?userId={}", self.addr, room_id, user_id)
    }
}

/// Serves the full router on an ephemeral port
pub async fn spawn_server(config: ServerConfig) -> TestServer {
    let state = AppState::new(config);
    let app = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        addr,
        state,
        _server_handle: server_handle,
    }
}
