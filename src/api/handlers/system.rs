//! System endpoints: liveness banner, health check, public key document.

use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::error::{BridgeError, ErrorResponse};

/// Path the gateway fetches the bridge's public key from.
pub const PUBLIC_KEY_PATH: &str = "/.well-known/appspecific/com.tesla.3p.public-key.pem";

/// Content type of the public key document.
pub const PEM_CONTENT_TYPE: &str = "application/x-pem-file";

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    signing_configured: bool,
}

/// `GET /` — Plain-text liveness banner.
#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    summary = "Liveness banner",
    responses(
        (status = 200, description = "Bridge is up", body = String, content_type = "text/plain"),
    )
)]
pub async fn root_handler() -> &'static str {
    "vcp-bridge is alive and ready for commands"
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp and whether a signing key is loaded.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            signing_configured: state.bridge.has_signer(),
        }),
    )
}

/// `GET /.well-known/appspecific/com.tesla.3p.public-key.pem` — Public key.
///
/// # Errors
///
/// Returns [`BridgeError::PublicKeyNotConfigured`] if no public key is set.
#[utoipa::path(
    get,
    path = "/.well-known/appspecific/com.tesla.3p.public-key.pem",
    tag = "System",
    summary = "Public key document",
    description = "Serves the configured public key verbatim so the gateway can verify command signatures.",
    responses(
        (status = 200, description = "PEM document", body = String, content_type = "application/x-pem-file"),
        (status = 500, description = "Public key not configured", body = ErrorResponse),
    )
)]
pub async fn public_key_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, BridgeError> {
    let pem = state
        .public_key_pem
        .as_deref()
        .ok_or(BridgeError::PublicKeyNotConfigured)?;
    Ok(([(CONTENT_TYPE, PEM_CONTENT_TYPE)], pem.to_string()))
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route(PUBLIC_KEY_PATH, get(public_key_handler))
}
