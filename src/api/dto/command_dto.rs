//! Command response DTOs and the HTTP rendering of an [`Outcome`].

use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::Outcome;
use crate::error::{BridgeError, ErrorResponse};

/// Response body for a command the gateway answered (200).
#[derive(Debug, Serialize, ToSchema)]
pub struct CommandSuccessResponse {
    /// Always `true`.
    pub ok: bool,
    /// Transaction id reported by the gateway.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub txid: Option<Value>,
    /// The gateway's full response frame.
    #[schema(value_type = Object)]
    pub response: Value,
}

/// Renders an outcome as its JSON body.
///
/// Success carries `txid` and `response`; every other outcome uses the
/// shared [`ErrorResponse`] shape.
#[must_use]
pub fn outcome_body(outcome: Outcome) -> Value {
    let rendered = match outcome {
        Outcome::Success { txid, raw_response } => serde_json::to_value(CommandSuccessResponse {
            ok: true,
            txid,
            response: raw_response,
        }),
        Outcome::Timeout => serde_json::to_value(ErrorResponse::new(
            "timeout waiting for vehicle response",
            None,
        )),
        Outcome::TransportError { detail } => {
            serde_json::to_value(ErrorResponse::new("websocket error", Some(detail)))
        }
        Outcome::ProtocolError { detail } => {
            serde_json::to_value(ErrorResponse::new("protocol error", Some(detail)))
        }
        Outcome::Unauthorized => serde_json::to_value(ErrorResponse::new(
            BridgeError::Unauthorized.to_string(),
            None,
        )),
        Outcome::Misconfigured { detail } => {
            serde_json::to_value(ErrorResponse::new(detail, None))
        }
    };
    rendered.unwrap_or_default()
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = axum::Json(outcome_body(self)).into_response();
        *response.status_mut() = status;
        response
    }
}
