//! Bridge error types with HTTP status code mapping.
//!
//! [`BridgeError`] covers everything that can go wrong outside an
//! established command flow: configuration, key material, credentials and
//! malformed request bodies. Every error response, whether it comes from
//! here or from a resolved [`crate::domain::Outcome`], shares the
//! [`ErrorResponse`] shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "ok": false,
///   "error": "websocket error",
///   "details": "connection refused"
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false` for error responses.
    pub ok: bool,
    /// Human-readable error message.
    pub error: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    /// Builds an error body with optional details.
    #[must_use]
    pub fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            details,
        }
    }

    /// Serializes the body with the given status code.
    #[must_use]
    pub fn into_response_with(self, status: StatusCode) -> Response {
        let mut response = axum::Json(self).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Server-side error enum with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The caller did not present a `Bearer` credential.
    #[error("missing bearer token")]
    Unauthorized,

    /// The deployment lacks something every command needs.
    #[error("{0} not configured")]
    Misconfigured(&'static str),

    /// The configured private key could not be parsed.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The inbound request body was rejected.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The public key document is not configured.
    #[error("public key not configured")]
    PublicKeyNotConfigured,

    /// Serialization of an outbound payload failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BridgeError {
    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Misconfigured(_)
            | Self::InvalidPrivateKey(_)
            | Self::Config(_)
            | Self::PublicKeyNotConfigured
            | Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ErrorResponse::new(self.to_string(), None).into_response_with(status)
    }
}
