// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-wide mapping from device code to the active device session.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::gateway::device::DeviceSession;

/// At most one session per device code. The registry only tracks sessions;
/// it never closes sockets — displacement teardown is the caller's job.
#[derive(Default)]
pub struct ConnectionRegistry {
    sessions: RwLock<HashMap<String, Arc<DeviceSession>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `session` for `code`, returning the session it displaced.
    pub async fn register(
        &self,
        code: &str,
        session: Arc<DeviceSession>,
    ) -> Option<Arc<DeviceSession>> {
        self.sessions.write().await.insert(code.to_owned(), session)
    }

    /// Remove the entry for `code` iff it is this exact session instance.
    ///
    /// A displaced session's late teardown must not deregister its successor,
    /// so removal compares instance identity, not just the code. Returns
    /// whether an entry was actually removed.
    pub async fn unregister(&self, code: &str, session: &DeviceSession) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(code) {
            Some(current) if current.instance() == session.instance() => {
                sessions.remove(code);
                true
            }
            _ => false,
        }
    }

    pub async fn lookup(&self, code: &str) -> Option<Arc<DeviceSession>> {
        self.sessions.read().await.get(code).map(Arc::clone)
    }

    /// Number of currently connected devices.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
