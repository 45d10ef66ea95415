//! Error types for the event monitor.

/// Errors raised while processing an inbound status change.
///
/// These never leave [`EventMonitor::on_status_change`]; they exist so the
/// ingestion steps can use `?` and the boundary can log them exactly once.
///
/// [`EventMonitor::on_status_change`]: crate::EventMonitor::on_status_change
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// A required identifier was missing from the status change.
    #[error("malformed status change: missing {0}")]
    MalformedEvent(&'static str),

    /// Classification, storage, or signal delivery failed unexpectedly.
    #[error("internal monitor fault: {0}")]
    InternalFault(String),
}
