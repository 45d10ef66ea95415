//! The event monitor: ingestion entry point plus the query surface.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use changuard_types::{ChatId, MembershipStatus, UserId};

use crate::classify::classify;
use crate::clock::{Clock, SystemClock};
use crate::detector::{
    AbuseDetector, DEFAULT_SUSPICIOUS_THRESHOLD, DEFAULT_SUSPICIOUS_WINDOW_HOURS,
};
use crate::error::MonitorError;
use crate::event::{MonitorSignal, MonitoredEvent, SuspiciousActivity};
use crate::sink::{SignalSink, TracingSink};
use crate::store::{EventFilter, EventStore, DEFAULT_CAPACITY};

/// Default `limit` for [`EventMonitor::recent_bans`] callers.
pub const DEFAULT_RECENT_BANS_LIMIT: usize = 10;

/// Default `hours` for [`EventMonitor::admin_ban_count`] callers.
pub const DEFAULT_BAN_COUNT_HOURS: u32 = 24;

/// Tunables for an [`EventMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Maximum number of stored events.
    pub capacity: usize,
    /// Bans per window above which an actor is suspicious.
    pub suspicious_threshold: usize,
    /// Detection window in hours.
    pub suspicious_window_hours: u32,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            suspicious_threshold: DEFAULT_SUSPICIOUS_THRESHOLD,
            suspicious_window_hours: DEFAULT_SUSPICIOUS_WINDOW_HOURS,
        }
    }
}

/// Classifies, stores and reports membership status changes.
///
/// One monitor owns one [`EventStore`]; construct it once per hosting
/// service and share it behind an `Arc`.
pub struct EventMonitor {
    store: EventStore,
    detector: AbuseDetector,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn SignalSink>,
}

impl EventMonitor {
    /// Creates a monitor using the system clock and a [`TracingSink`].
    pub fn new(settings: MonitorSettings) -> Self {
        Self {
            store: EventStore::new(settings.capacity),
            detector: AbuseDetector::new(
                settings.suspicious_threshold,
                settings.suspicious_window_hours,
            ),
            clock: Arc::new(SystemClock),
            sink: Arc::new(TracingSink),
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the signal sink.
    pub fn with_sink(mut self, sink: Arc<dyn SignalSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The underlying event log.
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// The burst-ban detector and its thresholds.
    pub fn detector(&self) -> &AbuseDetector {
        &self.detector
    }

    /// Handles one status change observed on the platform.
    ///
    /// Missing identifiers and internal faults are logged and swallowed;
    /// this method never panics and never reports an error. The returned
    /// signal is informational and has already been delivered to the sink.
    pub fn on_status_change(
        &self,
        chat_id: Option<ChatId>,
        user_id: Option<UserId>,
        old_status: MembershipStatus,
        new_status: MembershipStatus,
        actor_id: Option<UserId>,
    ) -> Option<MonitorSignal> {
        match self.try_on_status_change(chat_id, user_id, old_status, new_status, actor_id) {
            Ok(signal) => signal,
            Err(MonitorError::MalformedEvent(missing)) => {
                tracing::debug!(missing, "dropping status change with missing identifier");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "error handling chat member update");
                None
            }
        }
    }

    /// Fallible form of [`on_status_change`](Self::on_status_change).
    ///
    /// # Errors
    ///
    /// Returns `MonitorError::MalformedEvent` if the chat or subject is
    /// missing (nothing is recorded), or `MonitorError::InternalFault` if
    /// recording, classification or signal delivery panicked.
    ///
    /// A caught panic still reaches the process panic hook, which prints it
    /// to stderr before unwinding; the monitor itself reports it through
    /// `tracing` exactly once, in [`on_status_change`](Self::on_status_change).
    /// Hosts that want a single report install their own hook.
    pub fn try_on_status_change(
        &self,
        chat_id: Option<ChatId>,
        user_id: Option<UserId>,
        old_status: MembershipStatus,
        new_status: MembershipStatus,
        actor_id: Option<UserId>,
    ) -> Result<Option<MonitorSignal>, MonitorError> {
        let chat_id = chat_id.ok_or(MonitorError::MalformedEvent("chat_id"))?;
        let user_id = user_id.ok_or(MonitorError::MalformedEvent("user_id"))?;

        panic::catch_unwind(AssertUnwindSafe(|| {
            let event = self.record(chat_id, user_id, old_status, new_status, actor_id);

            let signal =
                classify(&event.transition).map(|kind| MonitorSignal::from_kind(kind, event));
            if let Some(ref signal) = signal {
                self.sink.deliver(signal);
            }
            signal
        }))
        .map_err(|payload| MonitorError::InternalFault(panic_message(payload.as_ref())))
    }

    /// Appends a status change to the store.
    pub fn record(
        &self,
        chat_id: ChatId,
        user_id: UserId,
        old_status: MembershipStatus,
        new_status: MembershipStatus,
        actor_id: Option<UserId>,
    ) -> MonitoredEvent {
        let event = self.store.record(
            self.clock.as_ref(),
            chat_id,
            user_id,
            old_status,
            new_status,
            actor_id,
        );
        tracing::info!(
            seq = event.seq,
            chat_id = %chat_id,
            user_id = %user_id,
            old_status = %old_status,
            new_status = %new_status,
            actor_id = ?actor_id.map(|a| a.0),
            "member status change logged"
        );
        event
    }

    /// See [`EventStore::recent_bans`].
    pub fn recent_bans(&self, chat_id: ChatId, limit: usize) -> Vec<MonitoredEvent> {
        self.store.recent_bans(chat_id, limit)
    }

    /// See [`EventStore::admin_ban_count`].
    pub fn admin_ban_count(&self, actor_id: UserId, chat_id: ChatId, hours: u32) -> usize {
        self.store.admin_ban_count(self.clock.as_ref(), actor_id, chat_id, hours)
    }

    /// Returns `true` if `actor_id` is burst-banning in `chat_id`.
    pub fn is_suspicious(&self, actor_id: UserId, chat_id: ChatId) -> bool {
        self.detector.is_suspicious(&self.store, self.clock.as_ref(), actor_id, chat_id)
    }

    /// Checks `actor_id` and, if suspicious, delivers and returns the alert.
    pub fn check_actor(&self, actor_id: UserId, chat_id: ChatId) -> Option<SuspiciousActivity> {
        let alert = self.detector.assess(&self.store, self.clock.as_ref(), actor_id, chat_id)?;
        self.sink.deliver(&MonitorSignal::SuspiciousActivity(alert.clone()));
        Some(alert)
    }

    /// See [`EventStore::query_events`].
    pub fn query_events(&self, filter: &EventFilter) -> Vec<MonitoredEvent> {
        self.store.query_events(filter)
    }
}

impl Default for EventMonitor {
    fn default() -> Self {
        Self::new(MonitorSettings::default())
    }
}

impl std::fmt::Debug for EventMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventMonitor")
            .field("store", &self.store)
            .field("detector", &self.detector)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
