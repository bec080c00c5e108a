// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the powerhub broker.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "powerhub", about = "Remote power-control broker")]
pub struct HubConfig {
    /// Host to bind on.
    #[arg(long, default_value = "0.0.0.0", env = "POWERHUB_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080, env = "PORT")]
    pub port: u16,

    /// HMAC key used to verify signed bearer tokens. Issued tokens must be
    /// signed with the same key.
    #[arg(long, env = "POWERHUB_TOKEN_KEY")]
    pub token_key: String,

    /// Interval between heartbeat pings to device sessions, in seconds.
    #[arg(long, default_value_t = 120, env = "POWERHUB_PING_PERIOD_SECS")]
    pub ping_period_secs: u64,

    /// How long a device session may go without a pong before it is torn
    /// down, in seconds.
    #[arg(long, default_value_t = 180, env = "POWERHUB_PONG_WAIT_SECS")]
    pub pong_wait_secs: u64,
}

impl HubConfig {
    pub fn ping_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ping_period_secs)
    }

    pub fn pong_wait(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.pong_wait_secs)
    }
}
