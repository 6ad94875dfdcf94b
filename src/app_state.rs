//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::CommandBridge;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Command orchestrator; holds the read-only signing key.
    pub bridge: Arc<CommandBridge>,
    /// PEM document served on the well-known public key path.
    pub public_key_pem: Option<Arc<str>>,
}

impl AppState {
    /// Creates application state.
    #[must_use]
    pub fn new(bridge: CommandBridge, public_key_pem: Option<String>) -> Self {
        Self {
            bridge: Arc::new(bridge),
            public_key_pem: public_key_pem.map(Arc::from),
        }
    }
}
