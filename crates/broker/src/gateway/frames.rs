// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire frames exchanged over the gateway sockets.
//!
//! All frames are JSON text messages. The shapes and field names are shared
//! with device firmware and user clients and must not change.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Momentary press of the power switch.
pub const PRESS_POWER_SWITCH_OPCODE: u8 = 1;
/// Momentary press of the reset switch.
pub const PRESS_RESET_SWITCH_OPCODE: u8 = 2;
/// Long press of the power switch, forcing the machine off.
pub const HARD_POWER_OFF_OPCODE: u8 = 3;

/// Device → broker: the machine-reported power state. The broker forwards
/// the value verbatim and never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DeviceStatusFrame {
    pub status: u32,
}

/// Broker → device: a command for the firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFrame {
    pub op: u8,
}

/// Broker → user: a device's state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStateEvent {
    pub id: Uuid,
    pub status: u32,
    pub online: bool,
}

/// Broker → peer: an error report, correlated with the server log by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorFrame {
    pub error: ErrorFrameDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorFrameDetails {
    pub id: String,
    pub title: String,
    pub description: String,
    pub message: String,
}

impl ErrorFrame {
    pub fn new(id: Uuid, title: &str, description: &str, message: &str) -> Self {
        Self {
            error: ErrorFrameDetails {
                id: id.to_string(),
                title: title.to_owned(),
                description: description.to_owned(),
                message: message.to_owned(),
            },
        }
    }
}

/// Decode a status frame from a device text message.
pub fn decode_status(text: &str) -> Result<DeviceStatusFrame, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
#[path = "frames_tests.rs"]
mod tests;
