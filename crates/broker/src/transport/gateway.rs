// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket upgrade handlers for device and user sessions.

use std::sync::Arc;

use axum::extract::ws::WebSocket;
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;
use serde::Deserialize;

use crate::error::HubError;
use crate::gateway::device::{
    self, DeviceSession, SESSION_REPLACED_DESCRIPTION, SESSION_REPLACED_TITLE,
};
use crate::gateway::user;
use crate::pubsub::Publication;
use crate::state::HubState;
use crate::store::Device;
use crate::transport::auth;

/// Query parameters for the device gateway upgrade.
#[derive(Debug, Deserialize)]
pub struct DeviceGatewayQuery {
    pub device_id: String,
    pub secret: String,
}

/// `GET /devices/gateway` — WebSocket upgrade for a device.
pub async fn device_gateway(
    State(state): State<Arc<HubState>>,
    Query(query): Query<DeviceGatewayQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let device = match state.devices.get_by_code_and_secret(&query.device_id, &query.secret) {
        Some(device) => device,
        None => return HubError::not_found("the device does not exist").into_response(),
    };

    ws.on_upgrade(move |socket| handle_device(state, device, socket)).into_response()
}

async fn handle_device(state: Arc<HubState>, device: Device, socket: WebSocket) {
    let (sink, stream) = socket.split();
    let code = device.code.clone();
    let session = DeviceSession::new(
        device,
        Some(sink),
        Arc::clone(&state.registry),
        Arc::clone(&state.bus),
    );

    // Install first, then evict: the new session wins unconditionally, and
    // the displaced session's own unregister becomes a stale no-op.
    let displaced = state.registry.register(&code, Arc::clone(&session)).await;
    state.bus.publish(&code, &Publication::State(session.state_event(true)));
    tracing::info!(device = %code, "device session opened");

    if let Some(old) = displaced {
        old.send_error(SESSION_REPLACED_TITLE, SESSION_REPLACED_DESCRIPTION, "").await;
        old.teardown().await;
        tracing::info!(device = %code, "displaced previous device session");
    }

    device::serve(session, stream, state.config.ping_period(), state.config.pong_wait()).await;
}

/// Query parameters for the user gateway upgrade.
#[derive(Debug, Deserialize)]
pub struct UserGatewayQuery {
    pub token: String,
}

/// `GET /users/gateway` — WebSocket upgrade for a user client.
pub async fn user_gateway(
    State(state): State<Arc<HubState>>,
    Query(query): Query<UserGatewayQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let user_id = match auth::verify_token(&state.token_key, &query.token) {
        Ok(user_id) => user_id,
        Err(err) => return err.into_response(),
    };
    let user = match state.users.get_by_id(&user_id) {
        Some(user) => user,
        None => return HubError::not_found("the user does not exist").into_response(),
    };

    let bus = Arc::clone(&state.bus);
    ws.on_upgrade(move |socket| user::serve(bus, user, socket)).into_response()
}
