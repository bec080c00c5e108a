// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device and user records, and the repository seam.
//!
//! Persistence is an external concern; the broker only needs to resolve a
//! device identity pair at handshake time and reload a user's owned devices
//! per request. [`MemoryStore`] is the process-local implementation backing
//! the binary and the tests.

use std::collections::HashMap;
use std::sync::RwLock;

use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of a device's public code, also used as the pub/sub topic key.
pub const DEVICE_CODE_LEN: usize = 6;

/// Length of the secret a device presents at handshake.
pub const DEVICE_SECRET_LEN: usize = 16;

/// A registered device. The code is globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub secret: String,
    /// Id of the owning user.
    pub owner: String,
}

/// A registered user together with the devices they own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub devices: Vec<Device>,
}

impl User {
    /// Whether this user owns the device with the given code.
    pub fn has_device(&self, code: &str) -> bool {
        self.devices.iter().any(|d| d.code == code)
    }
}

/// Resolves device records for the gateway handshake.
pub trait DeviceStore: Send + Sync {
    /// Look up a device by its identity pair. Both parts must match.
    fn get_by_code_and_secret(&self, code: &str, secret: &str) -> Option<Device>;

    /// Persist a new device and attach it to its owner.
    fn create(&self, device: Device);
}

/// Resolves user records for the dispatcher and the user gateway.
pub trait UserStore: Send + Sync {
    fn get_by_id(&self, id: &str) -> Option<User>;
}

/// Generate a fresh device code.
pub fn generate_code() -> String {
    random_alphanumeric(DEVICE_CODE_LEN)
}

/// Generate a fresh device secret.
pub fn generate_secret() -> String {
    random_alphanumeric(DEVICE_SECRET_LEN)
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

/// In-memory store keyed by device code and user id.
#[derive(Default)]
pub struct MemoryStore {
    devices: RwLock<HashMap<String, Device>>,
    users: RwLock<HashMap<String, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user record. Replaces any existing record with the same id.
    pub fn add_user(&self, user: User) {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.id.clone(), user);
        }
    }
}

impl DeviceStore for MemoryStore {
    fn get_by_code_and_secret(&self, code: &str, secret: &str) -> Option<Device> {
        let devices = self.devices.read().ok()?;
        devices.get(code).filter(|d| d.secret == secret).cloned()
    }

    fn create(&self, device: Device) {
        if let Ok(mut devices) = self.devices.write() {
            devices.insert(device.code.clone(), device.clone());
        }
        if let Ok(mut users) = self.users.write() {
            if let Some(owner) = users.get_mut(&device.owner) {
                owner.devices.push(device);
            }
        }
    }
}

impl UserStore for MemoryStore {
    fn get_by_id(&self, id: &str) -> Option<User> {
        self.users.read().ok()?.get(id).cloned()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
