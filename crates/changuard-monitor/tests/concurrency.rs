//! Concurrency tests for the event store.
//!
//! Writers and readers run on separate threads against one shared monitor:
//! - No update is lost below capacity
//! - Capacity holds under contention
//! - Readers never see more than `capacity` events or out-of-order sequences

use std::sync::Arc;
use std::thread;

use changuard_monitor::{EventFilter, EventMonitor, MonitorSettings};
use changuard_types::{ChatId, MembershipStatus, UserId};

fn shared(capacity: usize) -> Arc<EventMonitor> {
    Arc::new(EventMonitor::new(MonitorSettings {
        capacity,
        ..Default::default()
    }))
}

#[test]
fn concurrent_writers_lose_nothing_below_capacity() {
    let monitor = shared(10_000);

    let handles: Vec<_> = (0..8)
        .map(|writer| {
            let monitor = monitor.clone();
            thread::spawn(move || {
                for i in 0..250 {
                    monitor.on_status_change(
                        Some(ChatId(writer)),
                        Some(UserId(i)),
                        MembershipStatus::Member,
                        MembershipStatus::Kicked,
                        Some(UserId(writer)),
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("writer should not panic");
    }

    assert_eq!(monitor.store().len(), 2000);
    for writer in 0..8 {
        assert_eq!(
            monitor.admin_ban_count(UserId(writer), ChatId(writer), 24),
            250
        );
    }
}

#[test]
fn readers_see_consistent_snapshots_during_eviction() {
    let capacity = 100;
    let monitor = shared(capacity);

    let writer = {
        let monitor = monitor.clone();
        thread::spawn(move || {
            for i in 0..5_000 {
                monitor.on_status_change(
                    Some(ChatId(1)),
                    Some(UserId(i)),
                    MembershipStatus::Restricted,
                    MembershipStatus::Kicked,
                    Some(UserId(42)),
                );
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let monitor = monitor.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let events = monitor.query_events(&EventFilter {
                        limit: Some(usize::MAX),
                        ..Default::default()
                    });
                    assert!(events.len() <= capacity);
                    assert!(
                        events.windows(2).all(|w| w[0].seq == w[1].seq + 1),
                        "snapshot should be a contiguous run of sequence numbers"
                    );
                    assert!(monitor.recent_bans(ChatId(1), 10).len() <= 10);
                    assert!(monitor.admin_ban_count(UserId(42), ChatId(1), 1) <= capacity);
                }
            })
        })
        .collect();

    writer.join().expect("writer should not panic");
    for reader in readers {
        reader.join().expect("reader should not panic");
    }

    assert_eq!(monitor.store().len(), capacity);
}
