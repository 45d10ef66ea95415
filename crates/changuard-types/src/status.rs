//! Membership status vocabulary and status transitions.

use serde::{Deserialize, Serialize};

/// A participant's membership status in a chat.
///
/// Labels match the lowercase strings used by the messaging platform.
/// Anything the platform reports outside this set, or a status the
/// platform could not supply at all, becomes [`MembershipStatus::Unknown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    /// Ordinary member.
    Member,
    /// Left the chat voluntarily.
    Left,
    /// Removed and banned from the chat.
    Kicked,
    /// Member with restricted permissions.
    Restricted,
    /// Chat administrator.
    Administrator,
    /// Chat owner.
    Creator,
    /// Status absent or not recognised.
    #[default]
    #[serde(other)]
    Unknown,
}

impl MembershipStatus {
    /// Every status, in declaration order.
    pub const ALL: [MembershipStatus; 7] = [
        Self::Member,
        Self::Left,
        Self::Kicked,
        Self::Restricted,
        Self::Administrator,
        Self::Creator,
        Self::Unknown,
    ];

    /// Returns the platform label for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Left => "left",
            Self::Kicked => "kicked",
            Self::Restricted => "restricted",
            Self::Administrator => "administrator",
            Self::Creator => "creator",
            Self::Unknown => "unknown",
        }
    }

    /// Maps a platform label to a status, falling back to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "member" => Self::Member,
            "left" => Self::Left,
            "kicked" => Self::Kicked,
            "restricted" => Self::Restricted,
            "administrator" => Self::Administrator,
            "creator" => Self::Creator,
            _ => Self::Unknown,
        }
    }

    /// True for `administrator` and `creator`.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Administrator | Self::Creator)
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MembershipStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

/// An ordered (old, new) membership status pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusTransition {
    /// Status before the change.
    pub old: MembershipStatus,
    /// Status after the change.
    pub new: MembershipStatus,
}

impl StatusTransition {
    /// Creates the transition `old -> new`.
    pub fn new(old: MembershipStatus, new: MembershipStatus) -> Self {
        Self { old, new }
    }
}

impl std::fmt::Display for StatusTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.old, self.new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_round_trip() {
        for status in MembershipStatus::ALL {
            assert_eq!(MembershipStatus::from_label(status.as_str()), status);
            let parsed: MembershipStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn unrecognised_labels_fall_back_to_unknown() {
        assert_eq!(MembershipStatus::from_label("banned"), MembershipStatus::Unknown);
        assert_eq!(MembershipStatus::from_label(""), MembershipStatus::Unknown);
        assert_eq!(MembershipStatus::from_label("Member"), MembershipStatus::Unknown);
    }

    #[test]
    fn serde_uses_lowercase_labels_with_fallback() {
        let json = serde_json::to_string(&MembershipStatus::Administrator).unwrap();
        assert_eq!(json, "\"administrator\"");

        let restored: MembershipStatus = serde_json::from_str("\"owner\"").unwrap();
        assert_eq!(restored, MembershipStatus::Unknown);
    }

    #[test]
    fn admin_statuses() {
        let admins: Vec<_> = MembershipStatus::ALL
            .into_iter()
            .filter(|s| s.is_admin())
            .collect();
        assert_eq!(
            admins,
            vec![MembershipStatus::Administrator, MembershipStatus::Creator]
        );
    }

    #[test]
    fn transition_display() {
        let t = StatusTransition::new(MembershipStatus::Member, MembershipStatus::Kicked);
        assert_eq!(t.to_string(), "member -> kicked");
    }
}
