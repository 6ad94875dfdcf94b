//! Command intent: one inbound request to relay to a vehicle.
//!
//! A [`CommandIntent`] is built by the HTTP layer from the path, the JSON
//! body and the `Authorization` header, and is never mutated afterwards.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::BridgeError;

/// Scheme prefix a caller credential must carry.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Vehicle identifier as supplied in the request path.
///
/// Opaque to the bridge; forwarded to the gateway as `vehicle_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    /// Wraps a raw identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for VehicleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A validated `Authorization` header value of the form `Bearer <token>`.
///
/// Holds the full header value; it is forwarded verbatim to the gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential(String);

impl BearerCredential {
    /// Validates a raw `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Unauthorized`] if the value does not start
    /// with `Bearer ` or carries an empty token.
    pub fn parse(raw: &str) -> Result<Self, BridgeError> {
        let token = raw
            .strip_prefix(BEARER_PREFIX)
            .ok_or(BridgeError::Unauthorized)?;
        if token.trim().is_empty() {
            return Err(BridgeError::Unauthorized);
        }
        Ok(Self(raw.to_string()))
    }

    /// Returns the full header value, including the scheme.
    #[must_use]
    pub fn header_value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerCredential(<redacted>)")
    }
}

/// One command to relay: target vehicle, command name, free-form params and
/// the caller's credential.
#[derive(Clone)]
pub struct CommandIntent {
    /// Target vehicle.
    pub vehicle_id: VehicleId,
    /// Command name, e.g. `door_unlock`.
    pub command: String,
    /// Arbitrary JSON parameters; key order is preserved for signing.
    pub params: Map<String, Value>,
    /// Raw `Authorization` header value, empty when the header was absent.
    pub caller_credential: String,
}

impl CommandIntent {
    /// Creates a new intent.
    #[must_use]
    pub fn new(
        vehicle_id: impl Into<VehicleId>,
        command: impl Into<String>,
        params: Map<String, Value>,
        caller_credential: impl Into<String>,
    ) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            command: command.into(),
            params,
            caller_credential: caller_credential.into(),
        }
    }
}

impl fmt::Debug for CommandIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandIntent")
            .field("vehicle_id", &self.vehicle_id)
            .field("command", &self.command)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
