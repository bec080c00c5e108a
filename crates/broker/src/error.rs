// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request-surface errors.
//!
//! Every error surfaced to a caller carries a fresh correlation id; the same
//! id is logged, so an operator can match a user report to the server log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Errors surfaced by the request surface and the command dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    BadRequest(String),
    Unauthorized(String),
    NoAccess(String),
    NotFound(String),
    DeviceUnreachable(String),
    Internal(String),
}

impl HubError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn no_access(message: impl Into<String>) -> Self {
        Self::NoAccess(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn device_unreachable(message: impl Into<String>) -> Self {
        Self::DeviceUnreachable(message.into())
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::NoAccess(_) => 403,
            Self::NotFound(_) => 404,
            Self::DeviceUnreachable(_) => 503,
            Self::Internal(_) => 500,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "The request is invalid",
            Self::Unauthorized(_) => "Authentication is required",
            Self::NoAccess(_) => "No access",
            Self::NotFound(_) => "The object was not found",
            Self::DeviceUnreachable(_) => "The device is unreachable",
            Self::Internal(_) => "Internal server error",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "The request body or query did not match the expected schema",
            Self::Unauthorized(_) => "A valid bearer token is required to access this resource",
            Self::NoAccess(_) => "You do not have access to this resource",
            Self::NotFound(_) => "The requested object does not exist",
            Self::DeviceUnreachable(_) => "The device is not connected or the communication failed",
            Self::Internal(_) => "Something unexpected happened while handling the request",
        }
    }

    /// Whether this is a foreseen failure mode (as opposed to a bug).
    pub fn expected(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::Unauthorized(m)
            | Self::NoAccess(m)
            | Self::NotFound(m)
            | Self::DeviceUnreachable(m)
            | Self::Internal(m) => m,
        }
    }
}

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.message())
    }
}

impl From<anyhow::Error> for HubError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<serde_json::Error> for HubError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let id = Uuid::new_v4();
        if self.expected() {
            tracing::warn!(
                error_id = %id,
                status = self.http_status(),
                message = %self.message(),
                "request failed"
            );
        } else {
            tracing::error!(
                error_id = %id,
                status = self.http_status(),
                message = %self.message(),
                backtrace = %std::backtrace::Backtrace::capture(),
                "unexpected error"
            );
        }

        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: ErrorDetails {
                id: id.to_string(),
                status: self.http_status(),
                title: self.title().to_owned(),
                description: self.description().to_owned(),
                message: self.message().to_owned(),
                expected: self.expected(),
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Top-level error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error body shared by all request-surface failures. The `id` equals the
/// correlation id in the server log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub id: String,
    pub status: u16,
    pub title: String,
    pub description: String,
    pub message: String,
    pub expected: bool,
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
