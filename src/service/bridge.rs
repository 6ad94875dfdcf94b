//! Command bridge: turns one [`CommandIntent`] into one [`Outcome`].
//!
//! Validation happens before any signing or network I/O: a missing bearer
//! credential short-circuits to [`Outcome::Unauthorized`], a missing key or
//! domain to [`Outcome::Misconfigured`]. Otherwise the params are signed and
//! a fresh gateway session is run to completion. The bridge adds no timeout
//! of its own; the exchange is bounded by its response timer.

use tokio::time::Instant;
use tracing::Instrument;

use super::signer::Signer;
use crate::config::BridgeConfig;
use crate::domain::{BearerCredential, CommandIntent, Outcome};
use crate::error::BridgeError;
use crate::ws::{Exchange, OutboundFrame, SessionTiming};

/// Deployment settings the bridge needs per command.
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    /// Gateway WebSocket endpoint.
    pub gateway_url: String,
    /// Domain announced in the handshake.
    pub domain: Option<String>,
    /// Handshake delay and response timeout.
    pub timing: SessionTiming,
}

impl BridgeSettings {
    /// Derives settings from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            gateway_url: config.gateway_url(),
            domain: config.domain.clone(),
            timing: SessionTiming {
                handshake_delay: config.handshake_delay(),
                response_timeout: config.response_timeout(),
            },
        }
    }
}

/// Stateless orchestrator shared by all request handlers.
#[derive(Debug)]
pub struct CommandBridge {
    signer: Option<Signer>,
    settings: BridgeSettings,
}

impl CommandBridge {
    /// Creates a bridge. `signer` is `None` when no private key is loaded.
    #[must_use]
    pub const fn new(signer: Option<Signer>, settings: BridgeSettings) -> Self {
        Self { signer, settings }
    }

    /// Builds a bridge from configuration, parsing the private key if set.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidPrivateKey`] if a key is configured
    /// but cannot be parsed.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let signer = config
            .private_key_pem
            .as_deref()
            .map(Signer::from_pem)
            .transpose()?;
        Ok(Self::new(signer, BridgeSettings::from_config(config)))
    }

    /// Returns `true` if a private key is loaded.
    #[must_use]
    pub const fn has_signer(&self) -> bool {
        self.signer.is_some()
    }

    /// Returns the bridge settings.
    #[must_use]
    pub const fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    /// Relays one command and waits for its outcome.
    pub async fn handle(&self, intent: CommandIntent) -> Outcome {
        let flow_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "command",
            %flow_id,
            vehicle_id = %intent.vehicle_id,
            command = %intent.command,
        );

        async move {
            let started = Instant::now();
            let outcome = match self.prepare(intent) {
                Ok(exchange) => exchange.run().await,
                Err(err) => {
                    tracing::warn!(error = %err, "command rejected before session");
                    Outcome::from(err)
                }
            };
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            if outcome.is_success() {
                tracing::info!(outcome = outcome.kind(), elapsed_ms, "command settled");
            } else {
                tracing::warn!(
                    outcome = outcome.kind(),
                    status = outcome.status_code().as_u16(),
                    elapsed_ms,
                    "command failed"
                );
            }
            outcome
        }
        .instrument(span)
        .await
    }

    /// Validates the intent and signs it into a ready-to-run exchange.
    fn prepare(&self, intent: CommandIntent) -> Result<Exchange, BridgeError> {
        let credential = BearerCredential::parse(&intent.caller_credential)?;
        let signer = self
            .signer
            .as_ref()
            .ok_or(BridgeError::Misconfigured("private key"))?;
        let domain = self
            .settings
            .domain
            .clone()
            .ok_or(BridgeError::Misconfigured("signing domain"))?;

        let signed = signer.sign(&intent.params)?;
        Ok(Exchange {
            gateway_url: self.settings.gateway_url.clone(),
            credential,
            domain,
            request: OutboundFrame::request(intent.command, intent.vehicle_id, signed),
            timing: self.settings.timing,
        })
    }
}
