//! Moderation-event monitor for Changuard.
//!
//! Ingests membership status changes from a chat platform, keeps a bounded
//! rolling history of them, and flags moderators who ban in bursts. The
//! pipeline has three parts:
//!
//! | Part | Entry points |
//! |------|--------------|
//! | Classifier | [`classify_ban`], [`is_promotion`], [`is_demotion`] |
//! | Event store | [`EventStore::record`], [`EventStore::recent_bans`], [`EventStore::admin_ban_count`] |
//! | Abuse detector | [`AbuseDetector::is_suspicious`] |
//!
//! [`EventMonitor`] composes them and is the single ingestion boundary:
//! [`EventMonitor::on_status_change`] never panics and never returns an
//! error to the platform adapter.
//!
//! # Usage
//!
//! ```rust,ignore
//! use changuard_monitor::{EventMonitor, MonitorSettings};
//! use changuard_types::{ChatId, MembershipStatus, UserId};
//!
//! let monitor = EventMonitor::new(MonitorSettings::default());
//! monitor.on_status_change(
//!     Some(ChatId(-100)),
//!     Some(UserId(7)),
//!     MembershipStatus::Member,
//!     MembershipStatus::Kicked,
//!     Some(UserId(1)),
//! );
//! assert_eq!(monitor.admin_ban_count(UserId(1), ChatId(-100), 24), 1);
//! ```

mod classify;
mod clock;
mod detector;
mod error;
mod event;
mod monitor;
mod sink;
mod store;

pub use classify::{classify, classify_ban, is_demotion, is_promotion, is_reported_ban};
pub use clock::{Clock, ManualClock, SystemClock};
pub use detector::{AbuseDetector, DEFAULT_SUSPICIOUS_THRESHOLD, DEFAULT_SUSPICIOUS_WINDOW_HOURS};
pub use error::MonitorError;
pub use event::{EventKind, MonitorSignal, MonitoredEvent, SignalKind, SuspiciousActivity};
pub use monitor::{
    EventMonitor, MonitorSettings, DEFAULT_BAN_COUNT_HOURS, DEFAULT_RECENT_BANS_LIMIT,
};
pub use sink::{SignalSink, TracingSink};
pub use store::{EventFilter, EventStore, DEFAULT_CAPACITY};
