// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use super::{Bus, Publication, Subscriber};
use crate::gateway::frames::DeviceStateEvent;

/// Records every notification it receives.
struct Probe {
    seen: Mutex<Vec<(String, Publication)>>,
}

impl Probe {
    fn new() -> Arc<Self> {
        Arc::new(Self { seen: Mutex::new(Vec::new()) })
    }

    fn count(&self) -> usize {
        self.seen.lock().map(|s| s.len()).unwrap_or(0)
    }
}

impl Subscriber for Probe {
    fn notify(&self, topic: &str, payload: &Publication) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((topic.to_owned(), payload.clone()));
        }
    }
}

/// Unsubscribes itself from the bus on the first notification.
struct SelfEvicting {
    bus: Arc<Bus>,
    me: Mutex<Option<Arc<dyn Subscriber>>>,
    notified: Mutex<usize>,
}

impl Subscriber for SelfEvicting {
    fn notify(&self, _topic: &str, _payload: &Publication) {
        if let Ok(mut n) = self.notified.lock() {
            *n += 1;
        }
        if let Ok(mut me) = self.me.lock() {
            if let Some(me) = me.take() {
                self.bus.unsubscribe(&me);
            }
        }
    }
}

fn state_event() -> Publication {
    Publication::State(DeviceStateEvent { id: Uuid::new_v4(), status: 1, online: true })
}

#[test]
fn publish_reaches_every_subscriber() {
    let bus = Bus::new();
    let a = Probe::new();
    let b = Probe::new();
    bus.subscribe(Arc::clone(&a) as Arc<dyn Subscriber>);
    bus.subscribe(Arc::clone(&b) as Arc<dyn Subscriber>);

    bus.publish("ABC123", &state_event());

    assert_eq!(a.count(), 1);
    assert_eq!(b.count(), 1);
}

#[test]
fn duplicate_subscription_duplicates_delivery() {
    let bus = Bus::new();
    let probe = Probe::new();
    bus.subscribe(Arc::clone(&probe) as Arc<dyn Subscriber>);
    bus.subscribe(Arc::clone(&probe) as Arc<dyn Subscriber>);

    bus.publish("ABC123", &state_event());

    assert_eq!(probe.count(), 2);
}

#[test]
fn unsubscribe_removes_first_occurrence_and_tolerates_absent() {
    let bus = Bus::new();
    let probe = Probe::new();
    let subscriber: Arc<dyn Subscriber> = Arc::clone(&probe) as Arc<dyn Subscriber>;
    bus.subscribe(Arc::clone(&subscriber));
    bus.subscribe(Arc::clone(&subscriber));

    bus.unsubscribe(&subscriber);
    bus.publish("ABC123", &state_event());
    assert_eq!(probe.count(), 1);

    bus.unsubscribe(&subscriber);
    bus.unsubscribe(&subscriber); // already gone, must not panic
    bus.publish("ABC123", &state_event());
    assert_eq!(probe.count(), 1);
}

#[test]
fn subscriber_may_unsubscribe_itself_during_publish() {
    let bus = Arc::new(Bus::new());
    let evicting = Arc::new(SelfEvicting {
        bus: Arc::clone(&bus),
        me: Mutex::new(None),
        notified: Mutex::new(0),
    });
    let as_subscriber: Arc<dyn Subscriber> = Arc::clone(&evicting) as Arc<dyn Subscriber>;
    if let Ok(mut me) = evicting.me.lock() {
        *me = Some(Arc::clone(&as_subscriber));
    }
    let witness = Probe::new();

    bus.subscribe(as_subscriber);
    bus.subscribe(Arc::clone(&witness) as Arc<dyn Subscriber>);

    bus.publish("ABC123", &state_event());
    bus.publish("ABC123", &state_event());

    // The evicting subscriber saw only the publish during which it left; the
    // other subscriber saw both.
    assert_eq!(evicting.notified.lock().map(|n| *n).unwrap_or(0), 1);
    assert_eq!(witness.count(), 2);
}

#[test]
fn topic_is_passed_through_verbatim() {
    let bus = Bus::new();
    let probe = Probe::new();
    bus.subscribe(Arc::clone(&probe) as Arc<dyn Subscriber>);

    bus.publish("user-17", &state_event());

    let seen = probe.seen.lock().map(|s| s.clone()).unwrap_or_default();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "user-17");
}
