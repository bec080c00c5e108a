// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Signed bearer tokens.
//!
//! Token issuance belongs to the account system; the broker only verifies.
//! A token is `base64url(claims-json) "." base64url(hmac-sha256)`, signed
//! with the key both sides share. `hmac::verify` compares in constant time.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::hmac;
use serde::{Deserialize, Serialize};

use crate::error::HubError;
use crate::state::HubState;

/// The authenticated principal, inserted into request extensions by
/// [`auth_layer`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    /// User id the token was issued to.
    sub: String,
    /// Expiry, seconds since the Unix epoch.
    exp: u64,
}

/// Build the HMAC key for `secret`. Used by the broker for verification and
/// by issuers (and tests) for signing.
pub fn signing_key(secret: &str) -> hmac::Key {
    hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes())
}

/// Sign a token for `sub`, valid for `ttl`.
pub fn sign_token(key: &hmac::Key, sub: &str, ttl: Duration) -> String {
    let claims = TokenClaims { sub: sub.to_owned(), exp: now_secs().saturating_add(ttl.as_secs()) };
    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap_or_default());
    let tag = hmac::sign(key, payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(tag.as_ref());
    format!("{payload}.{signature}")
}

/// Verify `token` and return the user id it was issued to.
pub fn verify_token(key: &hmac::Key, token: &str) -> Result<String, HubError> {
    let (payload, signature) =
        token.split_once('.').ok_or_else(|| HubError::unauthorized("malformed token"))?;
    let signature = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| HubError::unauthorized("malformed token signature"))?;
    hmac::verify(key, payload.as_bytes(), &signature)
        .map_err(|_| HubError::unauthorized("invalid token signature"))?;

    let claims = URL_SAFE_NO_PAD
        .decode(payload)
        .ok()
        .and_then(|bytes| serde_json::from_slice::<TokenClaims>(&bytes).ok())
        .ok_or_else(|| HubError::unauthorized("malformed token claims"))?;

    if claims.exp <= now_secs() {
        return Err(HubError::unauthorized("the token has expired"));
    }
    Ok(claims.sub)
}

fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Axum middleware enforcing bearer authentication.
///
/// Exempt: `/health` and the gateway upgrades, which authenticate through
/// their own query parameters.
pub async fn auth_layer(
    State(state): State<Arc<HubState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path();
    if path == "/health" || path.ends_with("/gateway") {
        return next.run(req).await;
    }

    let token = match bearer_token(req.headers()) {
        Some(token) => token,
        None => return HubError::unauthorized("missing bearer token").into_response(),
    };

    match verify_token(&state.token_key, token) {
        Ok(user_id) => {
            req.extensions_mut().insert(AuthUser(user_id));
            next.run(req).await
        }
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
