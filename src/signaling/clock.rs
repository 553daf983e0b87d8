use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of message timestamps (epoch milliseconds)
///
/// Never goes backwards, even when the wall clock is stepped back.
#[derive(Debug, Default)]
pub struct MessageClock {
    last: AtomicI64,
}

impl MessageClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_millis(&self) -> i64 {
        self.stamp(Utc::now().timestamp_millis())
    }

    fn stamp(&self, wall_millis: i64) -> i64 {
        let previous = self.last.fetch_max(wall_millis, Ordering::SeqCst);
        previous.max(wall_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_follows_wall_clock_forward() {
        let clock = MessageClock::new();
        assert_eq!(clock.stamp(1_000), 1_000);
        assert_eq!(clock.stamp(1_500), 1_500);
    }

    #[test]
    fn test_stamp_holds_when_wall_clock_steps_back() {
        let clock = MessageClock::new();
        clock.stamp(2_000);
        assert_eq!(clock.stamp(1_000), 2_000);
        assert_eq!(clock.stamp(2_001), 2_001);
    }

    #[test]
    fn test_now_is_non_decreasing() {
        let clock = MessageClock::new();
        let mut last = clock.now_millis();
        for _ in 0..100 {
            let next = clock.now_millis();
            assert!(next >= last);
            last = next;
        }
    }
}
