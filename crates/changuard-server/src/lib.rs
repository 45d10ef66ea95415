//! Changuard server library logic.

pub mod api;
pub mod api_sse;
pub mod config;
pub mod sink;
pub mod webhook;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Extension, Json, Router,
};
use changuard_monitor::{EventMonitor, MonitorSignal};
use config::MonitorConfig;
use serde_json::{json, Value};
use sink::BroadcastSink;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

/// Maximum request body size (256 KiB). Platform updates are small.
const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;

/// Capacity of the signal broadcast channel.
const SIGNAL_CHANNEL_CAPACITY: usize = 256;

/// Defaults applied to reporting queries that omit them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDefaults {
    /// `limit` for ban reports.
    pub recent_bans_limit: usize,
    /// `hours` for per-moderator ban counts.
    pub ban_count_hours: u32,
}

impl From<&MonitorConfig> for ReportDefaults {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            recent_bans_limit: config.recent_bans_limit,
            ban_count_hours: config.ban_count_hours,
        }
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The moderation event monitor.
    pub monitor: Arc<EventMonitor>,
    /// Broadcast channel for monitor signals (SSE stream).
    pub signal_tx: broadcast::Sender<MonitorSignal>,
    /// Reporting defaults.
    pub reports: ReportDefaults,
}

impl AppState {
    /// Builds the state from configuration.
    ///
    /// The monitor delivers its signals to the returned state's broadcast
    /// channel.
    pub fn new(config: &MonitorConfig) -> Self {
        let (signal_tx, _) = broadcast::channel(SIGNAL_CHANNEL_CAPACITY);
        let monitor = EventMonitor::new(config.settings())
            .with_sink(Arc::new(BroadcastSink::new(signal_tx.clone())));

        Self::with_monitor(monitor, signal_tx, config.into())
    }

    /// Builds the state around an already-configured monitor.
    pub fn with_monitor(
        monitor: EventMonitor,
        signal_tx: broadcast::Sender<MonitorSignal>,
        reports: ReportDefaults,
    ) -> Self {
        Self {
            monitor: Arc::new(monitor),
            signal_tx,
            reports,
        }
    }
}

/// Health check handler.
///
/// Also reports how many events the monitor currently holds.
async fn health(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "events": state.monitor.store().len(),
        "capacity": state.monitor.store().capacity(),
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(webhook::webhook_handler))
        .route("/api/chats/{chatId}/bans", get(api::recent_bans_handler))
        .route(
            "/api/chats/{chatId}/actors/{actorId}/bans",
            get(api::ban_count_handler),
        )
        .route("/api/events", get(api::events_handler))
        .route("/events/stream", get(api_sse::get_signal_stream_handler))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(Arc::new(state)))
}
