// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the request surface.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HubError;
use crate::gateway::dispatch;
use crate::pubsub::Publication;
use crate::state::HubState;
use crate::store::{self, Device};
use crate::transport::auth::AuthUser;

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub device_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub device_code: String,
    #[serde(default)]
    pub hard: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateDeviceRequest {
    pub name: String,
}

/// A device as presented to its owner. The secret appears here and nowhere
/// else; the device needs it to authenticate its gateway session.
#[derive(Debug, Serialize)]
pub struct DeviceInfo {
    pub name: String,
    pub code: String,
    pub secret: String,
    pub status: u32,
    pub online: bool,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /health`
pub async fn health(State(state): State<Arc<HubState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running".to_owned(),
        device_count: state.registry.count().await,
    })
}

/// `POST /devices` — register a device under the calling user.
///
/// The fresh code and secret are generated here and returned exactly once;
/// the owner provisions them into the device firmware.
pub async fn create_device(
    State(state): State<Arc<HubState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<DeviceInfo>), HubError> {
    if req.name.trim().is_empty() {
        return Err(HubError::bad_request("the device name must not be empty"));
    }
    let user = state
        .users
        .get_by_id(&user_id)
        .ok_or_else(|| HubError::not_found("the user does not exist"))?;

    let device = Device {
        id: Uuid::new_v4(),
        name: req.name,
        code: store::generate_code(),
        secret: store::generate_secret(),
        owner: user.id.clone(),
    };
    state.devices.create(device.clone());

    // Announce on the owner's self-topic so their live gateway sessions
    // start forwarding events for the new code immediately.
    state.bus.publish(&user.id, &Publication::DeviceAdded(device.clone()));
    tracing::info!(device = %device.code, user = %user.id, "device created");

    let info = DeviceInfo {
        name: device.name,
        code: device.code,
        secret: device.secret,
        status: 0,
        online: false,
    };
    Ok((StatusCode::CREATED, Json(info)))
}

/// `GET /devices` — the calling user's devices with live state.
pub async fn list_devices(
    State(state): State<Arc<HubState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<Json<Vec<DeviceInfo>>, HubError> {
    let user = state
        .users
        .get_by_id(&user_id)
        .ok_or_else(|| HubError::not_found("the user does not exist"))?;

    let mut list = Vec::with_capacity(user.devices.len());
    for device in user.devices {
        let session = state.registry.lookup(&device.code).await;
        list.push(DeviceInfo {
            name: device.name,
            code: device.code,
            secret: device.secret,
            status: session.as_ref().map(|s| s.status()).unwrap_or(0),
            online: session.is_some(),
        });
    }
    Ok(Json(list))
}

/// `POST /devices/power-switch` — press (or hard-press) the power switch.
pub async fn press_power_switch(
    State(state): State<Arc<HubState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<CommandRequest>,
) -> Result<StatusCode, HubError> {
    dispatch::press_power_switch(&state, &user_id, &req.device_code, req.hard).await?;
    Ok(StatusCode::OK)
}

/// `POST /devices/reset-switch` — press the reset switch.
pub async fn press_reset_switch(
    State(state): State<Arc<HubState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(req): Json<CommandRequest>,
) -> Result<StatusCode, HubError> {
    dispatch::press_reset_switch(&state, &user_id, &req.device_code).await?;
    Ok(StatusCode::OK)
}
