//! Settle-once response correlation.
//!
//! A [`Correlator`] watches every event that can end a command flow
//! (inbound frames, the timeout, connection errors, connection close and
//! failed sends) and resolves exactly one [`Outcome`]. The first terminal
//! event wins; everything after it is a no-op.
//!
//! ```text
//!             frame (response shape) ──► Resolved(Success)
//!            ╱ timeout ────────────────► Resolved(Timeout)
//!   Pending ─── connection error ──────► Resolved(TransportError)
//!            ╲ close / send failure ───► Resolved(ProtocolError)
//!             ╲ frame (noise) ─┐
//!   Pending ◄──────────────────┘
//! ```

use crate::domain::Outcome;
use crate::domain::outcome::CLOSED_BEFORE_RESPONSE;

use super::messages::InboundFrame;

/// An event observed on a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    /// An inbound text or binary payload.
    Frame(Vec<u8>),
    /// The response timer fired.
    TimedOut,
    /// The WebSocket layer reported an error.
    ConnectionError(String),
    /// The connection closed.
    Closed,
    /// Writing an outbound frame failed.
    SendFailed(String),
}

/// Correlator state.
#[derive(Debug, Clone, PartialEq)]
pub enum CorrelatorState {
    /// Waiting for a terminal event.
    Pending,
    /// Settled; terminal.
    Resolved(Outcome),
}

/// Result of feeding one [`Trigger`] to the correlator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// This trigger settled the flow.
    Settled,
    /// Non-terminal frame; still pending.
    Discarded,
    /// Already settled; the trigger was ignored.
    Ignored,
}

/// Settle-once state machine for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlator {
    state: CorrelatorState,
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}

impl Correlator {
    /// Creates a pending correlator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: CorrelatorState::Pending,
        }
    }

    /// Feeds one event into the state machine.
    ///
    /// Only a pending correlator can transition; once resolved every
    /// further trigger returns [`Transition::Ignored`].
    pub fn observe(&mut self, trigger: Trigger) -> Transition {
        if !self.is_pending() {
            tracing::trace!(?trigger, "correlator already settled; ignoring");
            return Transition::Ignored;
        }
        let outcome = match trigger {
            Trigger::Frame(payload) => match InboundFrame::classify(&payload) {
                InboundFrame::Response { txid, raw } => Outcome::Success {
                    txid,
                    raw_response: raw,
                },
                InboundFrame::Other => {
                    tracing::debug!("ignoring non-response frame");
                    return Transition::Discarded;
                }
                InboundFrame::Unparseable => {
                    tracing::trace!(len = payload.len(), "ignoring non-JSON frame");
                    return Transition::Discarded;
                }
            },
            Trigger::TimedOut => Outcome::Timeout,
            Trigger::ConnectionError(detail) => Outcome::TransportError { detail },
            Trigger::Closed => Outcome::ProtocolError {
                detail: CLOSED_BEFORE_RESPONSE.to_string(),
            },
            Trigger::SendFailed(detail) => Outcome::ProtocolError { detail },
        };
        self.state = CorrelatorState::Resolved(outcome);
        Transition::Settled
    }

    /// Returns `true` while no terminal event has been observed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, CorrelatorState::Pending)
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &CorrelatorState {
        &self.state
    }

    /// Returns the resolved outcome, if settled.
    #[must_use]
    pub const fn outcome(&self) -> Option<&Outcome> {
        match &self.state {
            CorrelatorState::Pending => None,
            CorrelatorState::Resolved(outcome) => Some(outcome),
        }
    }

    /// Consumes the correlator, returning the resolved outcome if settled.
    #[must_use]
    pub fn into_outcome(self) -> Option<Outcome> {
        match self.state {
            CorrelatorState::Pending => None,
            CorrelatorState::Resolved(outcome) => Some(outcome),
        }
    }
}
