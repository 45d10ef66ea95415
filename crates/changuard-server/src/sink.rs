//! Signal sink that fans monitor signals out to SSE subscribers.

use changuard_monitor::{MonitorSignal, SignalSink, TracingSink};
use tokio::sync::broadcast;

/// Logs every signal and forwards it to a broadcast channel.
///
/// Sending never blocks; with no subscribers the signal is only logged.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<MonitorSignal>,
}

impl BroadcastSink {
    /// Creates a sink publishing on `tx`.
    pub fn new(tx: broadcast::Sender<MonitorSignal>) -> Self {
        Self { tx }
    }
}

impl SignalSink for BroadcastSink {
    fn deliver(&self, signal: &MonitorSignal) {
        TracingSink.deliver(signal);

        if let Err(e) = self.tx.send(signal.clone()) {
            tracing::debug!("signal broadcast has no receivers: {}", e);
        }
    }
}
