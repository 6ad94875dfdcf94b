//! Command relay handler.

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::routing::post;
use serde_json::{Map, Value};

use crate::api::dto::CommandSuccessResponse;
use crate::app_state::AppState;
use crate::domain::{BearerCredential, CommandIntent, Outcome};
use crate::error::{BridgeError, ErrorResponse};

/// `POST /vcp/command/{vehicle_id}/{command}` — Sign and relay a command.
///
/// # Errors
///
/// Returns [`BridgeError::InvalidRequest`] if the body is not a JSON
/// object. Every other failure is reported through the [`Outcome`]; a
/// missing credential is rejected before the body is read.
#[utoipa::path(
    post,
    path = "/vcp/command/{vehicle_id}/{command}",
    tag = "Commands",
    summary = "Relay a signed vehicle command",
    description = "Signs the JSON body with the bridge's private key, opens a gateway session with the caller's bearer token, and waits for the vehicle's response.",
    params(
        ("vehicle_id" = String, Path, description = "Vehicle identifier"),
        ("command" = String, Path, description = "Command name, e.g. door_unlock"),
    ),
    request_body(content = Object, description = "Command parameters (optional, defaults to {})"),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Gateway answered", body = CommandSuccessResponse),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse),
        (status = 401, description = "Missing bearer token", body = ErrorResponse),
        (status = 500, description = "Bridge misconfigured or gateway closed without answering", body = ErrorResponse),
        (status = 502, description = "WebSocket failure", body = ErrorResponse),
        (status = 504, description = "No response before timeout; outcome unknown", body = ErrorResponse),
    )
)]
pub async fn send_command(
    State(state): State<AppState>,
    Path((vehicle_id, command)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Outcome, BridgeError> {
    let caller_credential = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if let Err(err) = BearerCredential::parse(caller_credential) {
        return Ok(Outcome::from(err));
    }
    let params = parse_params(&body)?;

    let intent = CommandIntent::new(vehicle_id, command, params, caller_credential);
    Ok(state.bridge.handle(intent).await)
}

/// Command routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/vcp/command/{vehicle_id}/{command}", post(send_command))
}

/// Parses the request body into a params object. An empty body or `null`
/// means no params.
fn parse_params(body: &[u8]) -> Result<Map<String, Value>, BridgeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(params)) => Ok(params),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(_) => Err(BridgeError::InvalidRequest(
            "body must be a JSON object".to_string(),
        )),
        Err(e) => Err(BridgeError::InvalidRequest(format!("malformed JSON: {e}"))),
    }
}
