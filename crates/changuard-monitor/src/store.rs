//! Bounded in-memory event log.
//!
//! All writes go through [`EventStore::record`], which stamps the event
//! with the supplied clock, assigns the next sequence number, appends it
//! and evicts the oldest entries once the store is over capacity. Writes
//! hold the write lock for the whole append-and-evict step, so readers
//! never observe a half-evicted log.
//!
//! Reads never mutate the log and always return copies.

use std::collections::VecDeque;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use changuard_types::{ChatId, MembershipStatus, StatusTransition, UserId};
use chrono::TimeDelta;

use crate::classify::is_reported_ban;
use crate::clock::Clock;
use crate::event::{EventKind, MonitoredEvent};

/// Default number of events kept by a store.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default page size for [`EventStore::query_events`].
const DEFAULT_QUERY_LIMIT: usize = 50;

/// Filter criteria for [`EventStore::query_events`].
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Only events from this chat.
    pub chat_id: Option<ChatId>,
    /// Only events caused by this actor.
    pub actor_id: Option<UserId>,
    /// Only events whose subject is this user.
    pub user_id: Option<UserId>,
    /// Maximum number of events to return (default: 50).
    pub limit: Option<usize>,
}

impl EventFilter {
    fn matches(&self, event: &MonitoredEvent) -> bool {
        self.chat_id.map_or(true, |chat| event.chat_id == chat)
            && self.actor_id.map_or(true, |actor| event.actor_id == Some(actor))
            && self.user_id.map_or(true, |user| event.user_id == user)
    }
}

#[derive(Debug, Default)]
struct Log {
    events: VecDeque<MonitoredEvent>,
    next_seq: u64,
}

/// Fixed-capacity, insertion-ordered log of [`MonitoredEvent`]s.
#[derive(Debug)]
pub struct EventStore {
    capacity: usize,
    log: RwLock<Log>,
}

impl EventStore {
    /// Creates an empty store holding at most `capacity` events.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            log: RwLock::new(Log {
                events: VecDeque::with_capacity(capacity),
                next_seq: 1,
            }),
        }
    }

    /// Maximum number of events kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of events currently held.
    pub fn len(&self) -> usize {
        self.read().events.len()
    }

    /// True when no events are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a status change and evicts the oldest events past capacity.
    ///
    /// Never fails: unknown statuses and missing actors are stored as-is.
    pub fn record(
        &self,
        clock: &dyn Clock,
        chat_id: ChatId,
        user_id: UserId,
        old_status: MembershipStatus,
        new_status: MembershipStatus,
        actor_id: Option<UserId>,
    ) -> MonitoredEvent {
        let mut log = self.write();

        let event = MonitoredEvent {
            seq: log.next_seq,
            timestamp: clock.now(),
            chat_id,
            user_id,
            transition: StatusTransition::new(old_status, new_status),
            actor_id,
            kind: EventKind::MemberChange,
        };
        log.next_seq += 1;
        log.events.push_back(event.clone());

        let overflow = log.events.len().saturating_sub(self.capacity);
        if overflow > 0 {
            log.events.drain(..overflow);
            tracing::trace!(evicted = overflow, "evicted oldest monitored events");
        }

        event
    }

    /// Returns the most recent reported bans in `chat_id`, newest first.
    ///
    /// A reported ban is a kick out of `member` or `restricted`; kicks of
    /// users who had already left are not listed here. Ties on timestamp
    /// are broken by insertion order, later first.
    pub fn recent_bans(&self, chat_id: ChatId, limit: usize) -> Vec<MonitoredEvent> {
        if limit == 0 {
            return Vec::new();
        }

        let mut bans: Vec<MonitoredEvent> = {
            let log = self.read();
            log.events
                .iter()
                .filter(|e| e.chat_id == chat_id && is_reported_ban(&e.transition))
                .cloned()
                .collect()
        };

        bans.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        bans.truncate(limit);
        bans
    }

    /// Counts kicks by `actor_id` in `chat_id` strictly after `now - hours`.
    ///
    /// Any prior status counts. When the window reaches past the earliest
    /// representable time, every matching kick is counted.
    pub fn admin_ban_count(
        &self,
        clock: &dyn Clock,
        actor_id: UserId,
        chat_id: ChatId,
        hours: u32,
    ) -> usize {
        let cutoff = TimeDelta::try_hours(i64::from(hours))
            .and_then(|window| clock.now().checked_sub_signed(window));

        let log = self.read();
        log.events
            .iter()
            .filter(|e| e.actor_id == Some(actor_id) && e.chat_id == chat_id && e.is_kick())
            .filter(|e| cutoff.map_or(true, |cutoff| e.timestamp > cutoff))
            .count()
    }

    /// Returns stored events matching `filter`, newest first.
    pub fn query_events(&self, filter: &EventFilter) -> Vec<MonitoredEvent> {
        let limit = filter.limit.unwrap_or(DEFAULT_QUERY_LIMIT);

        let log = self.read();
        log.events
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .take(limit)
            .cloned()
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, Log> {
        self.log.read().unwrap_or_else(|poisoned| {
            tracing::error!("event store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Log> {
        self.log.write().unwrap_or_else(|poisoned| {
            tracing::error!("event store lock poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
