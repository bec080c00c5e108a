// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Powerhub: remote power-control broker for PCs.
//!
//! Devices (microcontrollers wired to a PC's power and reset headers) hold a
//! long-lived WebSocket session with the broker. Authenticated users issue
//! commands over HTTP; the broker forwards them to the matching device session
//! and fans device state changes back out to the owners' user sessions.

pub mod config;
pub mod error;
pub mod gateway;
pub mod pubsub;
pub mod state;
pub mod store;
pub mod transport;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::HubConfig;
use crate::state::HubState;
use crate::store::{DeviceStore, MemoryStore, UserStore};
use crate::transport::build_router;

/// Run the broker until shutdown.
///
/// The in-memory store backs the process; user and device records are
/// provisioned through the request surface and live only as long as the
/// broker does.
pub async fn run(config: HubConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let store = Arc::new(MemoryStore::new());
    let devices: Arc<dyn DeviceStore> = store.clone();
    let users: Arc<dyn UserStore> = store;

    let state = Arc::new(HubState::new(config, devices, users, shutdown.clone()));

    tracing::info!("powerhub listening on {addr}");
    let router = build_router(Arc::clone(&state));
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    Ok(())
}
