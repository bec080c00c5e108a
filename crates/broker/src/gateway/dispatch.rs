// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command dispatcher: the request surface's entry point into live device
//! sessions.

use crate::error::HubError;
use crate::gateway::frames::{
    HARD_POWER_OFF_OPCODE, PRESS_POWER_SWITCH_OPCODE, PRESS_RESET_SWITCH_OPCODE,
};
use crate::state::HubState;

/// Press the power switch of `device_code` on behalf of `user_id`.
/// `hard` selects the forced power-off opcode.
pub async fn press_power_switch(
    state: &HubState,
    user_id: &str,
    device_code: &str,
    hard: bool,
) -> Result<(), HubError> {
    let opcode = if hard { HARD_POWER_OFF_OPCODE } else { PRESS_POWER_SWITCH_OPCODE };
    dispatch(state, user_id, device_code, opcode).await
}

/// Press the reset switch of `device_code` on behalf of `user_id`.
pub async fn press_reset_switch(
    state: &HubState,
    user_id: &str,
    device_code: &str,
) -> Result<(), HubError> {
    dispatch(state, user_id, device_code, PRESS_RESET_SWITCH_OPCODE).await
}

/// Ownership is checked before the registry is consulted, so a forbidden
/// request never touches the device socket.
async fn dispatch(
    state: &HubState,
    user_id: &str,
    device_code: &str,
    opcode: u8,
) -> Result<(), HubError> {
    let user = state
        .users
        .get_by_id(user_id)
        .ok_or_else(|| HubError::not_found("the user does not exist"))?;

    if !user.has_device(device_code) {
        return Err(HubError::no_access("The user does not own this device"));
    }

    let session = state
        .registry
        .lookup(device_code)
        .await
        .ok_or_else(|| HubError::device_unreachable("the device is not online"))?;

    session.send_command(opcode).await
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
