//! Platform webhook adapter.
//!
//! Accepts raw platform updates on `POST /webhook`, normalises the
//! `chat_member` part into a status change, and feeds it to the monitor.
//! Updates of any other type are acknowledged and ignored.

use crate::AppState;
use axum::{extract::Extension, Json};
use changuard_monitor::{MonitorSignal, SignalKind};
use changuard_types::{ChatId, MembershipStatus, UserId};
use serde::{de::IgnoredAny, Deserialize, Deserializer, Serialize};
use std::sync::Arc;

/// A platform update as delivered to the webhook.
///
/// Every field is optional and tolerant of unexpected shapes: a value of the
/// wrong type reads as absent, so a partial update still reaches the monitor
/// and is dropped or recorded there.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    /// Platform-assigned update identifier.
    #[serde(default, deserialize_with = "lenient")]
    pub update_id: Option<i64>,
    /// Present when a chat member's status changed.
    #[serde(default, deserialize_with = "lenient")]
    pub chat_member: Option<ChatMemberUpdated>,
}

/// A membership change notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatMemberUpdated {
    /// Chat the change happened in.
    #[serde(default, deserialize_with = "lenient")]
    pub chat: Option<Chat>,
    /// User who performed the change.
    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<User>,
    /// Membership before the change.
    #[serde(default, deserialize_with = "lenient")]
    pub old_chat_member: Option<ChatMember>,
    /// Membership after the change.
    #[serde(default, deserialize_with = "lenient")]
    pub new_chat_member: Option<ChatMember>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Chat {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub username: Option<String>,
}

impl User {
    /// First and last name joined, falling back to the username or id.
    pub fn full_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self
                .username
                .clone()
                .or_else(|| self.id.map(|id| id.to_string()))
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatMember {
    #[serde(default, deserialize_with = "lenient")]
    pub user: Option<User>,
    /// Unrecognised, null or missing statuses become `unknown`.
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: MembershipStatus,
}

/// Either the expected value or anything else, which is discarded.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Other(IgnoredAny),
}

/// Reads a value of type `T`, treating null or a mismatched shape as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Valid(value) => Some(value),
        Lenient::Other(_) => None,
    })
}

fn lenient_status<'de, D>(deserializer: D) -> Result<MembershipStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let label: Option<String> = lenient(deserializer)?;
    Ok(label.map_or(MembershipStatus::Unknown, |l| MembershipStatus::from_label(&l)))
}

/// A status change extracted from a platform update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub chat_id: Option<ChatId>,
    pub user_id: Option<UserId>,
    pub old_status: MembershipStatus,
    pub new_status: MembershipStatus,
    pub actor_id: Option<UserId>,
}

impl ChatMemberUpdated {
    /// The participant whose membership changed.
    ///
    /// Taken from the new membership, or the old one if the new carries no
    /// identifiable user.
    pub fn subject(&self) -> Option<&User> {
        fn identified(member: &Option<ChatMember>) -> Option<&User> {
            member
                .as_ref()
                .and_then(|m| m.user.as_ref())
                .filter(|u| u.id.is_some())
        }
        identified(&self.new_chat_member).or_else(|| identified(&self.old_chat_member))
    }

    /// Normalises this update into a status change.
    pub fn status_change(&self) -> StatusChange {
        StatusChange {
            chat_id: self.chat.as_ref().and_then(|c| c.id).map(ChatId),
            user_id: self.subject().and_then(|u| u.id).map(UserId),
            old_status: self
                .old_chat_member
                .as_ref()
                .map_or(MembershipStatus::Unknown, |m| m.status),
            new_status: self
                .new_chat_member
                .as_ref()
                .map_or(MembershipStatus::Unknown, |m| m.status),
            actor_id: self.from.as_ref().and_then(|u| u.id).map(UserId),
        }
    }
}

/// Response body for `POST /webhook`.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookResponse {
    pub status: String,
    /// Classification of the processed change, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<SignalKind>,
    /// Whether the acting moderator was flagged for burst banning.
    #[serde(default)]
    pub suspicious: bool,
}

/// Feeds one update through the monitor.
///
/// Returns the display classification and whether a burst-ban alert was
/// raised for the actor.
pub fn process_update(state: &AppState, update: &Update) -> (Option<SignalKind>, bool) {
    let Some(member_update) = update.chat_member.as_ref() else {
        tracing::debug!(update_id = ?update.update_id, "ignoring non-member update");
        return (None, false);
    };

    let change = member_update.status_change();
    let span = tracing::info_span!(
        "chat_member_update",
        update_id = ?update.update_id,
        chat = member_update.chat.as_ref().and_then(|c| c.title.as_deref()).unwrap_or(""),
        user = %member_update.subject().map(User::full_name).unwrap_or_default(),
    );
    let _guard = span.enter();

    let signal = state.monitor.on_status_change(
        change.chat_id,
        change.user_id,
        change.old_status,
        change.new_status,
        change.actor_id,
    );

    let mut suspicious = false;
    if let Some(MonitorSignal::Ban(event)) = &signal {
        if let Some(actor_id) = event.actor_id {
            suspicious = state.monitor.check_actor(actor_id, event.chat_id).is_some();
        }
    }

    (signal.as_ref().and_then(MonitorSignal::kind), suspicious)
}

/// Handler for `POST /webhook`.
///
/// Always acknowledges a parseable update, even one the monitor drops, so
/// the platform does not redeliver it.
pub async fn webhook_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(update): Json<Update>,
) -> Json<WebhookResponse> {
    let (signal, suspicious) = process_update(&state, &update);

    Json(WebhookResponse {
        status: "ok".to_string(),
        signal,
        suspicious,
    })
}
