//! Outbound gateway protocol: frame types, the per-command session and
//! settle-once response correlation.
//!
//! Each command opens its own [`Session`] to the gateway endpoint, sends a
//! handshake followed by the signed request, and resolves through a
//! [`Correlator`].

pub mod correlator;
pub mod messages;
pub mod session;

pub use correlator::{Correlator, CorrelatorState, Transition, Trigger};
pub use messages::{InboundFrame, OutboundFrame};
pub use session::{Exchange, Session, SessionError, SessionTiming, install_crypto_provider};
