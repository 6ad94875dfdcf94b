//! # vcp-bridge
//!
//! HTTP bridge that signs vehicle commands and relays them to a remote
//! command gateway over a session-based WebSocket protocol.
//!
//! Each `POST /vcp/command/{vehicle_id}/{command}` request is signed with
//! the bridge's P-256 key, sent over a fresh WebSocket session
//! (handshake, short delay, request) authenticated with the caller's
//! bearer token, and answered with the first gateway response, a timeout,
//! or a connection failure. Sessions are never pooled or reused.
//!
//! ## Architecture
//!
//! ```text
//! HTTP clients
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── CommandBridge (service/)
//!     │     └── Signer (service/)
//!     │
//!     ├── Exchange / Session (ws/)
//!     │     └── Correlator (ws/)
//!     │
//!     └── Remote gateway (wss://…/v1)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod ws;
