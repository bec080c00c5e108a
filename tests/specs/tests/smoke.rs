// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `powerhub` binary.
//!
//! The process starts with an empty in-memory store, so these tests cover
//! boot, routing, and the authentication wiring; the full gateway flows live
//! in the broker crate's integration suites.

use std::time::Duration;

use powerhub::transport::auth::{sign_token, signing_key};
use powerhub_specs::{HubProcess, TOKEN_KEY};

const TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::test]
async fn http_health() -> anyhow::Result<()> {
    let hub = HubProcess::start()?;
    hub.wait_healthy(TIMEOUT).await?;

    let resp: serde_json::Value =
        reqwest::get(format!("{}/health", hub.base_url())).await?.json().await?;

    assert_eq!(resp["status"], "running");
    assert_eq!(resp["device_count"], 0);
    Ok(())
}

#[tokio::test]
async fn request_surface_requires_a_bearer_token() -> anyhow::Result<()> {
    let hub = HubProcess::start()?;
    hub.wait_healthy(TIMEOUT).await?;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{}/devices", hub.base_url()))
        .json(&serde_json::json!({"name": "tower"}))
        .send()
        .await?;

    assert_eq!(resp.status().as_u16(), 401);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["error"]["expected"], true);
    assert!(body["error"]["id"].as_str().map(|s| !s.is_empty()).unwrap_or(false));
    Ok(())
}

#[tokio::test]
async fn device_gateway_rejects_unknown_identity_pairs() -> anyhow::Result<()> {
    let hub = HubProcess::start()?;
    hub.wait_healthy(TIMEOUT).await?;

    let url = hub.ws_url("/devices/gateway?device_id=ABC123&secret=0123456789abcdef");
    assert!(tokio_tungstenite::connect_async(url).await.is_err());
    Ok(())
}

#[tokio::test]
async fn user_gateway_rejects_unknown_users_but_validates_tokens() -> anyhow::Result<()> {
    let hub = HubProcess::start()?;
    hub.wait_healthy(TIMEOUT).await?;

    // A forged token is turned away at the signature check.
    let url = hub.ws_url("/users/gateway?token=forged.token");
    assert!(tokio_tungstenite::connect_async(url).await.is_err());

    // A validly signed token for a user the (empty) store has never seen is
    // turned away at the lookup.
    let key = signing_key(TOKEN_KEY);
    let token = sign_token(&key, "nobody", Duration::from_secs(60));
    let url = hub.ws_url(&format!("/users/gateway?token={token}"));
    assert!(tokio_tungstenite::connect_async(url).await.is_err());
    Ok(())
}
