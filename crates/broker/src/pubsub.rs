// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process pub/sub bus.
//!
//! The bus keeps no routing tables; the topic is handed to every subscriber
//! and each one decides whether the payload concerns it. The subscriber set
//! is small (bounded by online user sessions), so a snapshot per publish is
//! cheap and lets a subscriber unsubscribe itself from inside `notify`.

use std::sync::{Arc, Mutex};

use crate::gateway::frames::DeviceStateEvent;
use crate::store::Device;

/// A payload delivered through the bus.
#[derive(Debug, Clone, PartialEq)]
pub enum Publication {
    /// A device's reported state changed, published on the device-code topic.
    State(DeviceStateEvent),
    /// A device was created, published on the owner's user-id topic so
    /// long-lived user sessions learn about new ownership.
    DeviceAdded(Device),
}

/// Receives publications. Routing happens inside the subscriber.
pub trait Subscriber: Send + Sync {
    fn notify(&self, topic: &str, payload: &Publication);
}

/// Process-wide subscriber set.
///
/// Duplicate subscriptions are allowed and produce duplicate notifications;
/// `unsubscribe` removes the first occurrence and tolerates absent entries.
#[derive(Default)]
pub struct Bus {
    subscribers: Mutex<Vec<Arc<dyn Subscriber>>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) {
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(subscriber);
        }
    }

    pub fn unsubscribe(&self, subscriber: &Arc<dyn Subscriber>) {
        if let Ok(mut subs) = self.subscribers.lock() {
            if let Some(pos) = subs.iter().position(|s| Arc::ptr_eq(s, subscriber)) {
                subs.remove(pos);
            }
        }
    }

    /// Deliver `payload` to every current subscriber.
    ///
    /// The set is snapshotted under the lock and delivery happens outside it,
    /// so `notify` may call back into `subscribe`/`unsubscribe`.
    pub fn publish(&self, topic: &str, payload: &Publication) {
        let snapshot: Vec<Arc<dyn Subscriber>> = match self.subscribers.lock() {
            Ok(subs) => subs.clone(),
            Err(_) => return,
        };
        for subscriber in snapshot {
            subscriber.notify(topic, payload);
        }
    }
}

#[cfg(test)]
#[path = "pubsub_tests.rs"]
mod tests;
