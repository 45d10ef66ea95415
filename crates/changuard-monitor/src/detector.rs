//! Burst-banning detection over the event store.

use changuard_types::{ChatId, UserId};

use crate::clock::Clock;
use crate::event::SuspiciousActivity;
use crate::store::EventStore;

/// Bans within the window above which an actor is suspicious.
pub const DEFAULT_SUSPICIOUS_THRESHOLD: usize = 5;

/// Length of the detection window in hours.
pub const DEFAULT_SUSPICIOUS_WINDOW_HOURS: u32 = 1;

/// Flags actors whose recent ban count exceeds a threshold.
///
/// The window always ends at the clock's current time and is recomputed on
/// every call; there are no precomputed buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbuseDetector {
    threshold: usize,
    window_hours: u32,
}

impl AbuseDetector {
    /// Creates a detector flagging more than `threshold` bans in `window_hours`.
    pub fn new(threshold: usize, window_hours: u32) -> Self {
        Self {
            threshold,
            window_hours,
        }
    }

    /// Bans per window an actor may perform before being flagged.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Length of the detection window in hours.
    pub fn window_hours(&self) -> u32 {
        self.window_hours
    }

    /// Returns `true` if `actor_id` banned more than `threshold` users in
    /// `chat_id` during the window.
    pub fn is_suspicious(
        &self,
        store: &EventStore,
        clock: &dyn Clock,
        actor_id: UserId,
        chat_id: ChatId,
    ) -> bool {
        self.assess(store, clock, actor_id, chat_id).is_some()
    }

    /// Like [`is_suspicious`](Self::is_suspicious), but returns the alert
    /// details when the threshold is exceeded.
    pub fn assess(
        &self,
        store: &EventStore,
        clock: &dyn Clock,
        actor_id: UserId,
        chat_id: ChatId,
    ) -> Option<SuspiciousActivity> {
        let ban_count = store.admin_ban_count(clock, actor_id, chat_id, self.window_hours);
        (ban_count > self.threshold).then(|| SuspiciousActivity {
            actor_id,
            chat_id,
            ban_count,
            window_hours: self.window_hours,
            detected_at: clock.now(),
        })
    }
}

impl Default for AbuseDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SUSPICIOUS_THRESHOLD, DEFAULT_SUSPICIOUS_WINDOW_HOURS)
    }
}
