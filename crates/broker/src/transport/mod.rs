// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP + WebSocket transport for the broker.

pub mod auth;
pub mod gateway;
pub mod http;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::HubState;

/// Build the axum `Router` with all broker routes.
pub fn build_router(state: Arc<HubState>) -> Router {
    Router::new()
        // Health (no auth)
        .route("/health", get(http::health))
        // Devices
        .route("/devices", post(http::create_device).get(http::list_devices))
        .route("/devices/power-switch", post(http::press_power_switch))
        .route("/devices/reset-switch", post(http::press_reset_switch))
        // Gateways (authenticate via their own query parameters)
        .route("/devices/gateway", get(gateway::device_gateway))
        .route("/users/gateway", get(gateway::user_gateway))
        // Middleware
        .layer(middleware::from_fn_with_state(Arc::clone(&state), auth::auth_layer))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
