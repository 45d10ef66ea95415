//! Shared types for the Changuard moderation monitor.
//!
//! This crate provides the identifiers and membership-status vocabulary
//! used by every other Changuard crate. Platform adapters normalise their
//! raw payloads into these types before handing them to the monitor.

use serde::{Deserialize, Serialize};

mod status;
pub use status::{MembershipStatus, StatusTransition};

/// Opaque identifier of a chat or channel on the messaging platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

/// Opaque identifier of a platform user.
///
/// Used both for the subject of a status change and for the actor who
/// caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
