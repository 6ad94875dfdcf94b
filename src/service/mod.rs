//! Service layer: signing and command orchestration.
//!
//! [`CommandBridge`] validates an intent, signs it with the [`Signer`] and
//! runs one gateway exchange per command.

pub mod bridge;
pub mod signer;

pub use bridge::{BridgeSettings, CommandBridge};
pub use signer::{SignedMessage, Signer};
