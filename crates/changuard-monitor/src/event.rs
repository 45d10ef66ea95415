//! Event records and the signals derived from them.

use changuard_types::{ChatId, MembershipStatus, StatusTransition, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind tag carried by every stored event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A membership status change in a chat.
    #[default]
    MemberChange,
}

impl EventKind {
    /// Returns the canonical string label for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MemberChange => "member_change",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single membership change held by the [`EventStore`](crate::EventStore).
///
/// Events are only ever constructed by the store and handed out as copies,
/// so a stored record cannot be altered after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoredEvent {
    /// Insertion sequence number, strictly increasing within one store.
    pub seq: u64,
    /// When the change was recorded.
    pub timestamp: DateTime<Utc>,
    /// The chat the change happened in.
    pub chat_id: ChatId,
    /// The participant whose status changed.
    pub user_id: UserId,
    /// Old and new status.
    pub transition: StatusTransition,
    /// The user who caused the change, when the platform attributes one.
    pub actor_id: Option<UserId>,
    /// Event kind tag.
    pub kind: EventKind,
}

impl MonitoredEvent {
    /// True when the subject ended up `kicked`, whatever the prior status.
    pub fn is_kick(&self) -> bool {
        self.transition.new == MembershipStatus::Kicked
    }
}

/// Display classification of a status change.
///
/// Derived on demand from a transition; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// The subject became an administrator or creator.
    Promotion,
    /// The subject lost administrator or creator rights.
    Demotion,
    /// The subject was banned.
    Ban,
}

/// Burst-banning alert for one actor in one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousActivity {
    /// The moderator whose ban rate crossed the threshold.
    pub actor_id: UserId,
    /// The chat the bans happened in.
    pub chat_id: ChatId,
    /// Bans counted inside the window.
    pub ban_count: usize,
    /// Window length in hours.
    pub window_hours: u32,
    /// When the window was evaluated.
    pub detected_at: DateTime<Utc>,
}

/// Informational signal handed to a [`SignalSink`](crate::SignalSink).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum MonitorSignal {
    /// A recorded change classified as a promotion.
    Promotion(MonitoredEvent),
    /// A recorded change classified as a demotion.
    Demotion(MonitoredEvent),
    /// A recorded change classified as a ban.
    Ban(MonitoredEvent),
    /// An actor exceeded the ban-rate threshold.
    SuspiciousActivity(SuspiciousActivity),
}

impl MonitorSignal {
    /// Wraps a recorded event in the signal variant for `kind`.
    pub fn from_kind(kind: SignalKind, event: MonitoredEvent) -> Self {
        match kind {
            SignalKind::Promotion => Self::Promotion(event),
            SignalKind::Demotion => Self::Demotion(event),
            SignalKind::Ban => Self::Ban(event),
        }
    }

    /// Returns the status-change classification, if this is one.
    pub fn kind(&self) -> Option<SignalKind> {
        match self {
            Self::Promotion(_) => Some(SignalKind::Promotion),
            Self::Demotion(_) => Some(SignalKind::Demotion),
            Self::Ban(_) => Some(SignalKind::Ban),
            Self::SuspiciousActivity(_) => None,
        }
    }

    /// Returns the underlying event for status-change signals.
    pub fn event(&self) -> Option<&MonitoredEvent> {
        match self {
            Self::Promotion(e) | Self::Demotion(e) | Self::Ban(e) => Some(e),
            Self::SuspiciousActivity(_) => None,
        }
    }
}
