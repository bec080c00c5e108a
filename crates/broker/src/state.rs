// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use ring::hmac;
use tokio_util::sync::CancellationToken;

use crate::config::HubConfig;
use crate::gateway::registry::ConnectionRegistry;
use crate::pubsub::Bus;
use crate::store::{DeviceStore, UserStore};
use crate::transport::auth;

/// Shared broker state.
pub struct HubState {
    pub config: HubConfig,
    pub registry: Arc<ConnectionRegistry>,
    pub bus: Arc<Bus>,
    pub devices: Arc<dyn DeviceStore>,
    pub users: Arc<dyn UserStore>,
    /// Verification key for signed bearer tokens, derived from the config.
    pub token_key: hmac::Key,
    pub shutdown: CancellationToken,
}

impl HubState {
    pub fn new(
        config: HubConfig,
        devices: Arc<dyn DeviceStore>,
        users: Arc<dyn UserStore>,
        shutdown: CancellationToken,
    ) -> Self {
        let token_key = auth::signing_key(&config.token_key);
        Self {
            config,
            registry: Arc::new(ConnectionRegistry::new()),
            bus: Arc::new(Bus::new()),
            devices,
            users,
            token_key,
            shutdown,
        }
    }
}
