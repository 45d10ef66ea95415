//! SSE stream of monitor signals.

use crate::AppState;
use axum::{
    extract::{Extension, Query},
    response::{
        sse::{Event, KeepAlive},
        Sse,
    },
};
use changuard_monitor::MonitorSignal;
use futures_util::Stream;
use serde::Deserialize;
use std::{convert::Infallible, sync::Arc};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Query parameters for `GET /events/stream`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamQuery {
    /// Only forward signals concerning this chat.
    pub chat_id: Option<i64>,
}

fn signal_chat(signal: &MonitorSignal) -> i64 {
    match signal {
        MonitorSignal::Promotion(e) | MonitorSignal::Demotion(e) | MonitorSignal::Ban(e) => {
            e.chat_id.0
        }
        MonitorSignal::SuspiciousActivity(alert) => alert.chat_id.0,
    }
}

/// Handler for `GET /events/stream`.
///
/// Streams promotions, demotions, bans and suspicious-activity alerts as
/// they are raised, optionally filtered to one chat.
pub async fn get_signal_stream_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<StreamQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.signal_tx.subscribe();
    let stream = BroadcastStream::new(rx);

    let mapped_stream = stream.filter_map(move |result| match result {
        Ok(signal) => {
            if params.chat_id.is_some_and(|chat| chat != signal_chat(&signal)) {
                return None;
            }

            match serde_json::to_string(&signal) {
                Ok(data) => Some(Ok(Event::default().data(data))),
                Err(e) => {
                    tracing::error!("failed to serialize monitor signal: {}", e);
                    None
                }
            }
        }
        Err(broadcast_error) => {
            tracing::warn!(
                error = %broadcast_error,
                "signal SSE stream lagged; signals were dropped for this subscriber"
            );
            None
        }
    });

    Sse::new(mapped_stream).keep_alive(KeepAlive::default())
}
