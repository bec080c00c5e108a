// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One long-lived session per connected device.
//!
//! The session owns the write half of the socket behind a mutex, so command
//! frames, error frames, and heartbeat pings never interleave. Two
//! activities cooperate per session: the reader (status frames, pongs, the
//! pong deadline) and the pinger. Either one tears the session down on a
//! terminal socket error; teardown is idempotent.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::HubError;
use crate::gateway::frames::{self, CommandFrame, DeviceStateEvent, ErrorFrame};
use crate::gateway::registry::ConnectionRegistry;
use crate::pubsub::{Bus, Publication};
use crate::store::Device;

pub const INVALID_MESSAGE_TITLE: &str = "The message is invalid";
pub const INVALID_MESSAGE_DESCRIPTION: &str =
    "The message is not valid json or is not following the schema";

pub const SESSION_REPLACED_TITLE: &str = "Another session has been opened";
pub const SESSION_REPLACED_DESCRIPTION: &str =
    "A newer connection authenticated for the same device, and this session has been closed";

/// Live session for one device socket.
pub struct DeviceSession {
    /// Identity of this session instance. A displaced session and its
    /// successor share a device code but never an instance id; conditional
    /// unregistration compares this.
    instance: Uuid,
    device: Device,
    /// Last status reported by the device; 0 until the first status frame.
    status: AtomicU32,
    /// Write half of the socket. All writes serialize through this lock;
    /// `None` once the session is torn down.
    sink: tokio::sync::Mutex<Option<SplitSink<WebSocket, Message>>>,
    cancel: CancellationToken,
    registry: Arc<ConnectionRegistry>,
    bus: Arc<Bus>,
}

impl DeviceSession {
    pub fn new(
        device: Device,
        sink: Option<SplitSink<WebSocket, Message>>,
        registry: Arc<ConnectionRegistry>,
        bus: Arc<Bus>,
    ) -> Arc<Self> {
        Arc::new(Self {
            instance: Uuid::new_v4(),
            device,
            status: AtomicU32::new(0),
            sink: tokio::sync::Mutex::new(sink),
            cancel: CancellationToken::new(),
            registry,
            bus,
        })
    }

    pub fn instance(&self) -> Uuid {
        self.instance
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Last reported status. Stale reads are fine; this is a projection of
    /// the most recent successful read.
    pub fn status(&self) -> u32 {
        self.status.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// The state event describing this session right now. Offline events
    /// always report status 0.
    pub fn state_event(&self, online: bool) -> DeviceStateEvent {
        DeviceStateEvent {
            id: self.device.id,
            status: if online { self.status() } else { 0 },
            online,
        }
    }

    /// Write a command frame to the device. The broker does not wait for an
    /// acknowledgement; a successful write is a successful send.
    pub async fn send_command(&self, opcode: u8) -> Result<(), HubError> {
        let text = serde_json::to_string(&CommandFrame { op: opcode })?;
        if self.write(Message::Text(text.into())).await.is_err() {
            self.teardown().await;
            return Err(HubError::device_unreachable("the communication with the device failed"));
        }
        Ok(())
    }

    /// Best-effort error frame to the device. Returns the correlation id so
    /// the caller can log it.
    pub async fn send_error(&self, title: &str, description: &str, message: &str) -> Uuid {
        let id = Uuid::new_v4();
        if let Ok(text) = serde_json::to_string(&ErrorFrame::new(id, title, description, message)) {
            let _ = self.write(Message::Text(text.into())).await;
        }
        id
    }

    async fn write(&self, message: Message) -> Result<(), axum::Error> {
        let mut sink = self.sink.lock().await;
        match sink.as_mut() {
            Some(sink) => sink.send(message).await,
            None => Err(axum::Error::new(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "device session is closed",
            ))),
        }
    }

    /// Close the socket and drop the registration. Safe to call from any
    /// activity, any number of times; only the call that actually removes
    /// the registration publishes the offline event.
    pub async fn teardown(&self) {
        self.cancel.cancel();
        {
            let mut sink = self.sink.lock().await;
            if let Some(mut sink) = sink.take() {
                let _ = sink.close().await;
            }
        }
        if self.registry.unregister(&self.device.code, self).await {
            self.bus.publish(&self.device.code, &Publication::State(self.state_event(false)));
            tracing::info!(device = %self.device.code, "device session closed");
        }
    }

    async fn handle_frame(&self, text: &str) {
        match frames::decode_status(text) {
            Ok(frame) => {
                self.status.store(frame.status, Ordering::Relaxed);
                self.bus.publish(&self.device.code, &Publication::State(self.state_event(true)));
            }
            Err(err) => {
                let id = self
                    .send_error(INVALID_MESSAGE_TITLE, INVALID_MESSAGE_DESCRIPTION, &err.to_string())
                    .await;
                tracing::warn!(
                    device = %self.device.code,
                    error_id = %id,
                    err = %err,
                    "invalid frame from device"
                );
            }
        }
    }
}

/// Drive a registered session: spawn the pinger and run the reader until the
/// session ends.
pub async fn serve(
    session: Arc<DeviceSession>,
    stream: SplitStream<WebSocket>,
    ping_period: Duration,
    pong_wait: Duration,
) {
    spawn_pinger(Arc::clone(&session), ping_period);
    read_loop(session, stream, pong_wait).await;
}

fn spawn_pinger(session: Arc<DeviceSession>, period: Duration) {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = session.cancel.cancelled() => break,
                _ = timer.tick() => {}
            }

            if session.write(Message::Ping(Default::default())).await.is_err() {
                session.teardown().await;
                break;
            }
        }
    });
}

async fn read_loop(session: Arc<DeviceSession>, mut stream: SplitStream<WebSocket>, pong_wait: Duration) {
    // The deadline starts at session open and is pushed forward by pongs.
    let mut deadline = Instant::now() + pong_wait;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let read = tokio::select! {
            _ = session.cancel.cancelled() => break,
            read = tokio::time::timeout(remaining, stream.next()) => read,
        };

        match read {
            // No pong within the deadline: the peer is gone.
            Err(_) => {
                tracing::info!(device = %session.device().code, "pong deadline exceeded");
                session.teardown().await;
                break;
            }
            Ok(None) | Ok(Some(Err(_))) | Ok(Some(Ok(Message::Close(_)))) => {
                session.teardown().await;
                break;
            }
            Ok(Some(Ok(Message::Pong(_)))) => {
                deadline = Instant::now() + pong_wait;
            }
            Ok(Some(Ok(Message::Text(text)))) => {
                session.handle_frame(text.as_str()).await;
            }
            Ok(Some(Ok(_))) => {}
        }
    }
}
