// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One long-lived session per connected user gateway client.
//!
//! A user session is purely a sink: it subscribes on the bus, forwards state
//! events for devices the user owns, and reads the socket only to observe
//! the peer's close. Outbound frames go through an unbounded queue drained
//! by a writer task, so a dead peer never stalls a publisher.

use std::sync::{Arc, Mutex};

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::pubsub::{Bus, Publication, Subscriber};
use crate::store::{Device, User};

/// Live session for one user socket.
pub struct UserSession {
    user_id: String,
    /// Devices the user owned at handshake time, grown by self-topic
    /// announcements. Mutated only from `notify`.
    owned: Mutex<Vec<Device>>,
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl Subscriber for UserSession {
    fn notify(&self, topic: &str, payload: &Publication) {
        // The user's own id is the self-topic: it announces devices created
        // after this session was opened.
        if topic == self.user_id {
            if let Publication::DeviceAdded(device) = payload {
                if let Ok(mut owned) = self.owned.lock() {
                    owned.push(device.clone());
                }
            }
            return;
        }

        let owns = self
            .owned
            .lock()
            .map(|owned| owned.iter().any(|d| d.code == topic))
            .unwrap_or(false);
        if !owns {
            return;
        }

        if let Publication::State(event) = payload {
            if let Ok(text) = serde_json::to_string(event) {
                // A closed queue means the writer is gone; the reader will
                // tear the session down on its next iteration.
                let _ = self.outbound.send(text);
            }
        }
    }
}

/// Run a user session until the peer goes away.
pub async fn serve(bus: Arc<Bus>, user: User, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();

    let session = Arc::new(UserSession {
        user_id: user.id,
        owned: Mutex::new(user.devices),
        outbound,
        cancel: CancellationToken::new(),
    });
    let subscriber: Arc<dyn Subscriber> = Arc::clone(&session) as Arc<dyn Subscriber>;
    bus.subscribe(Arc::clone(&subscriber));
    tracing::info!(user = %session.user_id, "user session opened");

    let writer_cancel = session.cancel.clone();
    let writer = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = writer_cancel.cancelled() => break,
                queued = outbound_rx.recv() => match queued {
                    Some(text) => {
                        if sink.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
        let _ = sink.close().await;
    });

    // Inbound frames carry nothing; reading only observes the close.
    loop {
        match stream.next().await {
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
            Some(Ok(_)) => {}
        }
    }

    // Unsubscribe before the socket goes away so no publisher queues into a
    // torn-down session.
    bus.unsubscribe(&subscriber);
    session.cancel.cancel();
    let _ = writer.await;
    tracing::info!(user = %session.user_id, "user session closed");
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;
