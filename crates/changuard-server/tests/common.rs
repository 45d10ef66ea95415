//! Shared helpers for server integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use changuard_monitor::{EventMonitor, ManualClock, MonitorSettings};
use changuard_server::{app, config::MonitorConfig, sink::BroadcastSink, AppState};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower::ServiceExt; // for oneshot

pub const CHAT: i64 = -1_001_234;
pub const MOD: i64 = 77;

/// Builds state around a monitor pinned to a manual clock.
pub fn make_state() -> (AppState, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap(),
    ));
    let (signal_tx, _) = broadcast::channel(64);
    let monitor = EventMonitor::new(MonitorSettings::default())
        .with_clock(clock.clone())
        .with_sink(Arc::new(BroadcastSink::new(signal_tx.clone())));
    let state = AppState::with_monitor(monitor, signal_tx, (&MonitorConfig::default()).into());
    (state, clock)
}

pub fn router(state: &AppState) -> Router {
    app(state.clone())
}

/// Builds a `chat_member` update body.
pub fn member_update(chat: Option<i64>, user: i64, old: &str, new: &str, from: Option<i64>) -> Value {
    let mut member = serde_json::json!({
        "old_chat_member": { "user": { "id": user, "first_name": "Subject" }, "status": old },
        "new_chat_member": { "user": { "id": user, "first_name": "Subject" }, "status": new },
    });
    if let Some(chat) = chat {
        member["chat"] = serde_json::json!({ "id": chat, "title": "Guarded Chat" });
    }
    if let Some(from) = from {
        member["from"] = serde_json::json!({ "id": from, "first_name": "Moderator" });
    }
    serde_json::json!({ "update_id": user, "chat_member": member })
}

pub async fn post_json(router: Router, uri: &str, body: &Value) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    router.oneshot(request).await.unwrap()
}

pub async fn get(router: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    router.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
