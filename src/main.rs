//! vcp-bridge server entry point.
//!
//! Loads configuration, builds the command bridge and serves the HTTP API
//! until Ctrl-C or SIGTERM.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use vcp_bridge::api;
use vcp_bridge::app_state::AppState;
use vcp_bridge::config::{BridgeConfig, LogFormat};
use vcp_bridge::service::CommandBridge;
use vcp_bridge::ws;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BridgeConfig::from_env().context("loading configuration")?;
    init_tracing(config.log_format);

    tracing::info!(
        addr = %config.listen_addr,
        region = %config.region,
        gateway = %config.gateway_url(),
        "starting vcp-bridge"
    );

    ws::install_crypto_provider();

    let bridge = CommandBridge::from_config(&config).context("loading signing key")?;
    if !bridge.has_signer() {
        tracing::warn!("TESLA_PRIVATE_KEY not set; commands will be rejected");
    }
    if config.domain.is_none() {
        tracing::warn!("TESLA_DOMAIN not set; commands will be rejected");
    }
    if config.public_key_pem.is_none() {
        tracing::warn!("TESLA_PUBLIC_KEY not set; public key endpoint will return 500");
    }

    let state = AppState::new(bridge, config.public_key_pem.clone());
    let app = api::build_app(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
