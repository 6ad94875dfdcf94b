//! Bridge configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::domain::Region;
use crate::error::BridgeError;

/// Default delay between the handshake and the request frame.
pub const DEFAULT_HANDSHAKE_DELAY_MS: u64 = 150;

/// Default time allowed for the gateway to answer a request.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 15_000;

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 8080;

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Top-level bridge configuration.
///
/// Loaded once at startup via [`BridgeConfig::from_env`].
#[derive(Clone)]
pub struct BridgeConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8080`).
    pub listen_addr: SocketAddr,

    /// PEM-encoded P-256 private key used to sign command parameters.
    pub private_key_pem: Option<String>,

    /// PEM document served on the well-known public key path.
    pub public_key_pem: Option<String>,

    /// Region selecting the remote gateway host.
    pub region: Region,

    /// Domain announced in the session handshake.
    pub domain: Option<String>,

    /// Explicit gateway URL; overrides the region-derived endpoint.
    pub gateway_url_override: Option<String>,

    /// Milliseconds to wait for the gateway's answer.
    pub response_timeout_ms: u64,

    /// Milliseconds between the handshake and the request frame.
    pub handshake_delay_ms: u64,

    /// Log output format.
    pub log_format: LogFormat,
}

impl BridgeConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set. Calls
    /// `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] if `HOST`, `PORT` or `TESLA_REGION`
    /// is set but cannot be parsed.
    pub fn from_env() -> Result<Self, BridgeError> {
        dotenvy::dotenv().ok();

        let host: IpAddr = std::env::var("HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string())
            .parse()
            .map_err(|e| BridgeError::Config(format!("HOST: {e}")))?;
        let port: u16 = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| BridgeError::Config(format!("PORT: {e}")))?,
            Err(_) => DEFAULT_PORT,
        };

        let region = match non_empty_env("TESLA_REGION") {
            Some(raw) => raw.parse()?,
            None => Region::default(),
        };

        let log_format = match non_empty_env("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            private_key_pem: non_empty_env("TESLA_PRIVATE_KEY").map(|pem| normalize_pem(&pem)),
            public_key_pem: non_empty_env("TESLA_PUBLIC_KEY")
                .map(|pem| expand_escaped_newlines(&pem)),
            region,
            domain: non_empty_env("TESLA_DOMAIN"),
            gateway_url_override: non_empty_env("VCP_GATEWAY_URL"),
            response_timeout_ms: parse_env("VCP_RESPONSE_TIMEOUT_MS", DEFAULT_RESPONSE_TIMEOUT_MS),
            handshake_delay_ms: parse_env("VCP_HANDSHAKE_DELAY_MS", DEFAULT_HANDSHAKE_DELAY_MS),
            log_format,
        })
    }

    /// Returns the WebSocket endpoint commands are relayed to.
    #[must_use]
    pub fn gateway_url(&self) -> String {
        self.gateway_url_override
            .clone()
            .unwrap_or_else(|| self.region.gateway_url())
    }

    /// Returns the response timeout as a [`Duration`].
    #[must_use]
    pub const fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }

    /// Returns the handshake delay as a [`Duration`].
    #[must_use]
    pub const fn handshake_delay(&self) -> Duration {
        Duration::from_millis(self.handshake_delay_ms)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            private_key_pem: None,
            public_key_pem: None,
            region: Region::default(),
            domain: None,
            gateway_url_override: None,
            response_timeout_ms: DEFAULT_RESPONSE_TIMEOUT_MS,
            handshake_delay_ms: DEFAULT_HANDSHAKE_DELAY_MS,
            log_format: LogFormat::default(),
        }
    }
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("listen_addr", &self.listen_addr)
            .field("private_key_pem", &self.private_key_pem.as_ref().map(|_| "<set>"))
            .field("public_key_pem", &self.public_key_pem.is_some())
            .field("region", &self.region)
            .field("domain", &self.domain)
            .field("gateway_url_override", &self.gateway_url_override)
            .field("response_timeout_ms", &self.response_timeout_ms)
            .field("handshake_delay_ms", &self.handshake_delay_ms)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// Reads an environment variable, treating empty values as unset.
fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Turns literal `\n` escapes into newlines and leaves everything else
/// as configured.
///
/// Hosting dashboards often store multi-line PEM values on one line.
pub fn expand_escaped_newlines(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

/// Prepares a private key PEM for parsing: escapes expanded, surrounding
/// whitespace trimmed, one trailing newline.
pub fn normalize_pem(raw: &str) -> String {
    let mut pem = expand_escaped_newlines(raw.trim());
    pem.push('\n');
    pem
}
