use serde_json::json;

use meeting_hub::{ControlAction, SignalEvent};

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    pub async fn join(&self, user: &str) -> Vec<String> {
        self.state
            .signaling_service
            .join_room(&self.room_id, user)
            .await
            .unwrap()
    }

    pub async fn leave(&self, user: &str) -> bool {
        self.state
            .signaling_service
            .leave(&self.room_id, user)
            .await
            .unwrap()
    }

    pub async fn send_offer(&self, from: &str, to: &str, sdp: &str) {
        self.signal(SignalEvent::Offer {
            from: from.to_string(),
            to: to.to_string(),
            sdp: json!({"type": "offer", "sdp": sdp}),
        })
        .await;
    }

    pub async fn send_answer(&self, from: &str, to: &str, sdp: &str) {
        self.signal(SignalEvent::Answer {
            from: from.to_string(),
            to: to.to_string(),
            sdp: json!({"type": "answer", "sdp": sdp}),
        })
        .await;
    }

    pub async fn send_ice(&self, from: &str, to: &str, candidate: &str) {
        self.signal(SignalEvent::Ice {
            from: from.to_string(),
            to: to.to_string(),
            candidate: json!({"candidate": candidate, "sdpMid": "0", "sdpMLineIndex": 0}),
        })
        .await;
    }

    async fn signal(&self, event: SignalEvent) {
        self.state
            .signaling_service
            .signal(&self.room_id, event)
            .await
            .unwrap();
    }

    /// Returns the server-assigned timestamp
    pub async fn send_chat(&self, from: &str, text: &str) -> i64 {
        let event = self
            .state
            .signaling_service
            .send_chat(&self.room_id, from, text)
            .await
            .unwrap();
        match event {
            meeting_hub::RoomEvent::Chat { ts, .. } => ts,
            other => panic!("expected chat event, got {:?}", other),
        }
    }

    pub async fn send_stt_text(&self, from: &str, text: &str) {
        self.state
            .signaling_service
            .send_stt_text(&self.room_id, from, text)
            .await
            .unwrap();
    }

    pub async fn send_mute(&self, from: &str, target: Option<&str>) {
        self.state
            .signaling_service
            .send_control(&self.room_id, from, ControlAction::Mute, target)
            .await
            .unwrap();
    }

    /// Drops everything queued on every stream
    pub fn clear_events(&self) {
        for subscription in self.subscriptions.values() {
            let mut subscription = subscription.lock().unwrap();
            while subscription.try_next_event().is_some() {}
        }
    }
}
