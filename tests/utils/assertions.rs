//! Test assertion helpers - fluent API for verifying delivered events
#![allow(dead_code)] // Test utilities may not all be used in every test

use meeting_hub::RoomEvent;

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct EventAssertion<'a> {
    setup: &'a TestSetup,
    users: Vec<&'a str>,
}

impl<'a> EventAssertion<'a> {
    /// Create an assertion for every open stream in the setup
    pub fn for_everyone(setup: &'a TestSetup) -> Self {
        let users = setup.subscriptions.keys().map(|s| s.as_str()).collect();
        Self { setup, users }
    }

    /// Create an assertion for specific users
    pub fn for_users(setup: &'a TestSetup, users: Vec<&'a str>) -> Self {
        Self { setup, users }
    }

    /// Assert that each user received exactly this event next (consumes it)
    pub fn received(self, expected: RoomEvent) -> Self {
        for user in &self.users {
            let event = self.next_for(user);
            assert_eq!(
                event.as_ref(),
                Some(&expected),
                "{} received the wrong event",
                user
            );
        }
        self
    }

    /// Assert that each user's next event has this type and return them all
    pub fn received_type(self, expected_type: &str) -> Vec<RoomEvent> {
        self.users
            .iter()
            .map(|user| {
                let event = self
                    .next_for(user)
                    .unwrap_or_else(|| panic!("{} should have received {}", user, expected_type));
                assert_eq!(
                    event.event_type(),
                    expected_type,
                    "{} received wrong event type",
                    user
                );
                event
            })
            .collect()
    }

    /// Assert that each user received some event and return them all
    pub fn received_any(self) -> Vec<RoomEvent> {
        self.users
            .iter()
            .map(|user| {
                self.next_for(user)
                    .unwrap_or_else(|| panic!("{} should have received an event", user))
            })
            .collect()
    }

    /// Assert that nothing is queued for any of the users
    pub fn received_nothing(self) {
        for user in &self.users {
            let event = self.next_for(user);
            assert!(event.is_none(), "{} should not have received {:?}", user, event);
        }
    }

    fn next_for(&self, user: &str) -> Option<RoomEvent> {
        self.setup
            .subscriptions
            .get(user)
            .unwrap_or_else(|| panic!("{} has no open stream in this setup", user))
            .lock()
            .unwrap()
            .try_next_event()
    }
}
