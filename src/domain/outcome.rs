//! The single result of one command flow.
//!
//! Exactly one [`Outcome`] is produced per [`super::CommandIntent`]. Each
//! variant maps to one HTTP status code.

use axum::http::StatusCode;
use serde_json::Value;

use crate::error::BridgeError;

/// Message reported when the gateway closes before answering.
pub const CLOSED_BEFORE_RESPONSE: &str = "connection closed before response";

/// Resolved result of a relayed command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The gateway answered the request.
    Success {
        /// Transaction id from the response frame, if it carried one.
        txid: Option<Value>,
        /// The full response frame.
        raw_response: Value,
    },
    /// No answer arrived within the response timeout. The command may or
    /// may not have been applied.
    Timeout,
    /// The WebSocket connection failed.
    TransportError {
        /// Error detail from the WebSocket layer.
        detail: String,
    },
    /// The gateway closed or misbehaved without answering.
    ProtocolError {
        /// What went wrong.
        detail: String,
    },
    /// The caller did not present a bearer credential.
    Unauthorized,
    /// The deployment is missing required configuration.
    Misconfigured {
        /// The missing or invalid setting.
        detail: String,
    },
}

impl Outcome {
    /// Returns the HTTP status code for this outcome.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Success { .. } => StatusCode::OK,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::TransportError { .. } => StatusCode::BAD_GATEWAY,
            Self::ProtocolError { .. } | Self::Misconfigured { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    /// Returns `true` for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Short label used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Timeout => "timeout",
            Self::TransportError { .. } => "transport_error",
            Self::ProtocolError { .. } => "protocol_error",
            Self::Unauthorized => "unauthorized",
            Self::Misconfigured { .. } => "misconfigured",
        }
    }
}

impl From<BridgeError> for Outcome {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Unauthorized => Self::Unauthorized,
            other => Self::Misconfigured {
                detail: other.to_string(),
            },
        }
    }
}
