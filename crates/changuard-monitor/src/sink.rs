//! Delivery of monitor signals to the outside world.

use crate::event::MonitorSignal;

/// Receives informational signals raised by the monitor.
///
/// Implementations must not call back into the monitor. A panicking sink
/// is contained by the ingestion boundary.
pub trait SignalSink: Send + Sync {
    /// Handles one signal.
    fn deliver(&self, signal: &MonitorSignal);
}

/// Sink that writes every signal to the `tracing` log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl SignalSink for TracingSink {
    fn deliver(&self, signal: &MonitorSignal) {
        match signal {
            MonitorSignal::Promotion(e) => tracing::info!(
                chat_id = %e.chat_id,
                user_id = %e.user_id,
                "member promoted to admin"
            ),
            MonitorSignal::Demotion(e) => tracing::info!(
                chat_id = %e.chat_id,
                user_id = %e.user_id,
                new_status = %e.transition.new,
                "member removed from admin"
            ),
            MonitorSignal::Ban(e) => tracing::warn!(
                chat_id = %e.chat_id,
                user_id = %e.user_id,
                actor_id = ?e.actor_id.map(|a| a.0),
                "member banned"
            ),
            MonitorSignal::SuspiciousActivity(alert) => tracing::warn!(
                chat_id = %alert.chat_id,
                actor_id = %alert.actor_id,
                ban_count = alert.ban_count,
                window_hours = alert.window_hours,
                "suspicious ban activity detected"
            ),
        }
    }
}
