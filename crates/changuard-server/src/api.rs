//! Administrative reporting API handlers.
//!
//! Provides:
//! - `GET /api/chats/{chatId}/bans` — most recent bans in a chat
//! - `GET /api/chats/{chatId}/actors/{actorId}/bans` — a moderator's ban count
//! - `GET /api/events` — most recent stored status changes

use crate::AppState;
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use changuard_monitor::{EventFilter, MonitoredEvent};
use changuard_types::{ChatId, UserId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Upper bound on `limit` for ban reports.
const MAX_BANS_LIMIT: usize = 100;

/// Default and upper bound on `limit` for the event listing.
const DEFAULT_EVENTS_LIMIT: usize = 50;
const MAX_EVENTS_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid input: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

/// Rejects a page size outside `1..=max`.
fn check_limit(limit: usize, max: usize) -> Result<usize, ApiError> {
    if limit == 0 || limit > max {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {max}, got {limit}"
        )));
    }
    Ok(limit)
}

/// Query parameters for `GET /api/chats/{chatId}/bans`.
#[derive(Debug, Deserialize)]
pub struct RecentBansQuery {
    /// Maximum number of bans to return (default: 10, max: 100).
    pub limit: Option<usize>,
}

/// Response body for `GET /api/chats/{chatId}/bans`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecentBansResponse {
    /// The matching bans, newest first.
    pub bans: Vec<MonitoredEvent>,
    /// The number of bans returned.
    pub count: usize,
}

/// Handler for `GET /api/chats/{chatId}/bans`.
pub async fn recent_bans_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(chat_id): Path<i64>,
    Query(params): Query<RecentBansQuery>,
) -> Result<Json<RecentBansResponse>, ApiError> {
    let limit = check_limit(
        params.limit.unwrap_or(state.reports.recent_bans_limit),
        MAX_BANS_LIMIT,
    )?;

    let bans = state.monitor.recent_bans(ChatId(chat_id), limit);
    let count = bans.len();
    Ok(Json(RecentBansResponse { bans, count }))
}

/// Query parameters for `GET /api/chats/{chatId}/actors/{actorId}/bans`.
#[derive(Debug, Deserialize)]
pub struct BanCountQuery {
    /// Window length in hours (default: 24).
    pub hours: Option<u32>,
}

/// Response body for `GET /api/chats/{chatId}/actors/{actorId}/bans`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BanCountResponse {
    pub chat_id: ChatId,
    pub actor_id: UserId,
    /// Kicks performed by the actor inside the window.
    pub count: usize,
    /// The window that was counted.
    pub hours: u32,
    /// Whether the actor is currently flagged for burst banning.
    pub suspicious: bool,
}

/// Handler for `GET /api/chats/{chatId}/actors/{actorId}/bans`.
pub async fn ban_count_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((chat_id, actor_id)): Path<(i64, i64)>,
    Query(params): Query<BanCountQuery>,
) -> Json<BanCountResponse> {
    let chat_id = ChatId(chat_id);
    let actor_id = UserId(actor_id);
    let hours = params.hours.unwrap_or(state.reports.ban_count_hours);

    Json(BanCountResponse {
        chat_id,
        actor_id,
        count: state.monitor.admin_ban_count(actor_id, chat_id, hours),
        hours,
        suspicious: state.monitor.is_suspicious(actor_id, chat_id),
    })
}

/// Query parameters for `GET /api/events`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsQuery {
    /// Filter by chat.
    pub chat_id: Option<i64>,
    /// Filter by acting moderator.
    pub actor_id: Option<i64>,
    /// Filter by subject.
    pub user_id: Option<i64>,
    /// Maximum number of events to return (default: 50, max: 1000).
    pub limit: Option<usize>,
}

/// Response body for `GET /api/events`.
#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    /// The matching events, newest first.
    pub events: Vec<MonitoredEvent>,
    /// The number of events returned.
    pub count: usize,
}

/// Handler for `GET /api/events`.
pub async fn events_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ApiError> {
    let limit = check_limit(params.limit.unwrap_or(DEFAULT_EVENTS_LIMIT), MAX_EVENTS_LIMIT)?;
    let filter = EventFilter {
        chat_id: params.chat_id.map(ChatId),
        actor_id: params.actor_id.map(UserId),
        user_id: params.user_id.map(UserId),
        limit: Some(limit),
    };

    let events = state.monitor.query_events(&filter);
    let count = events.len();
    Ok(Json(EventsResponse { events, count }))
}
