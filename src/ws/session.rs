//! One WebSocket session to the remote gateway.
//!
//! A [`Session`] owns a single connection for a single command and is
//! never reused. [`Exchange::run`] drives it through
//! open → handshake → delay → request → correlate → close, routing every
//! failure through the [`Correlator`] so exactly one [`Outcome`] comes out.

use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{Instant, sleep, sleep_until, timeout};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use super::correlator::{Correlator, Transition, Trigger};
use super::messages::OutboundFrame;
use crate::config::{DEFAULT_HANDSHAKE_DELAY_MS, DEFAULT_RESPONSE_TIMEOUT_MS};
use crate::domain::{BearerCredential, Outcome};

/// Upper bound on a graceful close once the flow has settled.
const CLOSE_GRACE: Duration = Duration::from_secs(1);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Installs the process-wide rustls crypto provider used for `wss://`.
/// Later calls are no-ops.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Errors raised by session I/O.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The gateway URL or auth header could not form a request.
    #[error("invalid gateway request: {0}")]
    InvalidRequest(String),

    /// The WebSocket connection could not be established.
    #[error("connect failed: {0}")]
    Connect(#[source] tungstenite::Error),

    /// An outbound frame could not be written.
    #[error("send failed: {0}")]
    Send(#[source] tungstenite::Error),

    /// An outbound frame could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Timing parameters for one exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTiming {
    /// Delay between sending the handshake and sending the request.
    pub handshake_delay: Duration,
    /// Time allowed, from session start, for the gateway to answer.
    pub response_timeout: Duration,
}

impl Default for SessionTiming {
    fn default() -> Self {
        Self {
            handshake_delay: Duration::from_millis(DEFAULT_HANDSHAKE_DELAY_MS),
            response_timeout: Duration::from_millis(DEFAULT_RESPONSE_TIMEOUT_MS),
        }
    }
}

/// An open WebSocket connection to the gateway.
pub struct Session {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    /// Connects to `url`, forwarding the caller's credential as the
    /// `Authorization` header.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidRequest`] if the URL or header value
    /// is malformed and [`SessionError::Connect`] if the connection or
    /// upgrade fails, including a failed TLS handshake.
    pub async fn open(url: &str, credential: &BearerCredential) -> Result<Self, SessionError> {
        install_crypto_provider();
        let mut request = url
            .into_client_request()
            .map_err(|e| SessionError::InvalidRequest(e.to_string()))?;
        let auth = HeaderValue::from_str(credential.header_value())
            .map_err(|e| SessionError::InvalidRequest(format!("authorization header: {e}")))?;
        request.headers_mut().insert(AUTHORIZATION, auth);

        let (ws_stream, _response) = connect_async(request)
            .await
            .map_err(SessionError::Connect)?;
        let (sink, stream) = ws_stream.split();
        tracing::debug!(url, "gateway session opened");
        Ok(Self { sink, stream })
    }

    /// Sends the handshake frame announcing `domain`.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the frame cannot be written.
    pub async fn send_handshake(&mut self, domain: &str) -> Result<(), SessionError> {
        self.send(&OutboundFrame::handshake(domain)).await
    }

    /// Sends a request frame.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the frame cannot be written.
    pub async fn send_request(&mut self, frame: &OutboundFrame) -> Result<(), SessionError> {
        self.send(frame).await
    }

    async fn send(&mut self, frame: &OutboundFrame) -> Result<(), SessionError> {
        let text = frame.to_text()?;
        self.sink
            .send(Message::text(text))
            .await
            .map_err(SessionError::Send)?;
        tracing::debug!(frame = frame.label(), "frame sent");
        Ok(())
    }

    /// Waits for the next event the correlator cares about.
    ///
    /// Ping and pong frames are skipped.
    pub async fn next_trigger(&mut self) -> Trigger {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return Trigger::Frame(text.as_str().as_bytes().to_vec());
                }
                Some(Ok(Message::Binary(bytes))) => return Trigger::Frame(bytes.to_vec()),
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(?frame, "gateway sent close frame");
                    return Trigger::Closed;
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Err(err)) => return trigger_for_error(err),
                None => return Trigger::Closed,
            }
        }
    }

    /// Closes the connection, swallowing any error.
    pub async fn close(mut self) {
        match timeout(CLOSE_GRACE, self.sink.close()).await {
            Ok(Ok(())) => tracing::debug!("gateway session closed"),
            Ok(Err(err)) => tracing::debug!(error = %err, "error while closing gateway session"),
            Err(_) => tracing::debug!("gateway session close timed out"),
        }
    }
}

/// Maps a read error to a trigger. A reset without a closing handshake is
/// treated as a close, not a transport failure.
fn trigger_for_error(err: tungstenite::Error) -> Trigger {
    match err {
        tungstenite::Error::ConnectionClosed
        | tungstenite::Error::AlreadyClosed
        | tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
            Trigger::Closed
        }
        other => Trigger::ConnectionError(other.to_string()),
    }
}

/// Everything needed to run one command over one session.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// Gateway WebSocket endpoint.
    pub gateway_url: String,
    /// Caller credential, forwarded on connect.
    pub credential: BearerCredential,
    /// Domain announced in the handshake.
    pub domain: String,
    /// The signed request frame.
    pub request: OutboundFrame,
    /// Delay and timeout settings.
    pub timing: SessionTiming,
}

/// What the drive loop does next.
enum Step {
    Observe(Trigger),
    SendRequest,
}

impl Exchange {
    /// Runs the exchange to its single outcome.
    ///
    /// The response timer is armed before connecting, so a stalled connect
    /// resolves as [`Outcome::Timeout`] too. The session is always closed
    /// before returning.
    pub async fn run(self) -> Outcome {
        let deadline = Instant::now() + self.timing.response_timeout;
        let mut correlator = Correlator::new();

        let opened = tokio::select! {
            opened = Session::open(&self.gateway_url, &self.credential) => opened,
            () = sleep_until(deadline) => {
                tracing::warn!("gateway connect timed out");
                correlator.observe(Trigger::TimedOut);
                return settled(correlator);
            }
        };
        let mut session = match opened {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = %err, "gateway connect failed");
                correlator.observe(Trigger::ConnectionError(err.to_string()));
                return settled(correlator);
            }
        };

        drive(&mut session, &mut correlator, &self, deadline).await;
        session.close().await;
        settled(correlator)
    }
}

/// Sends both frames in order and feeds session events to the correlator
/// until it settles. Both timers are dropped on return.
async fn drive(
    session: &mut Session,
    correlator: &mut Correlator,
    exchange: &Exchange,
    deadline: Instant,
) {
    let response_timer = sleep_until(deadline);
    tokio::pin!(response_timer);

    let sent = tokio::select! {
        sent = session.send_handshake(&exchange.domain) => sent,
        () = &mut response_timer => {
            correlator.observe(Trigger::TimedOut);
            return;
        }
    };
    if let Err(err) = sent {
        correlator.observe(Trigger::SendFailed(err.to_string()));
        return;
    }

    let request_timer = sleep(exchange.timing.handshake_delay);
    tokio::pin!(request_timer);
    let mut request = Some(&exchange.request);

    loop {
        let step = tokio::select! {
            () = &mut response_timer => Step::Observe(Trigger::TimedOut),
            () = &mut request_timer, if request.is_some() => Step::SendRequest,
            trigger = session.next_trigger() => Step::Observe(trigger),
        };
        let trigger = match step {
            Step::Observe(trigger) => trigger,
            Step::SendRequest => {
                let Some(frame) = request.take() else {
                    continue;
                };
                let sent = tokio::select! {
                    sent = session.send_request(frame) => sent,
                    () = &mut response_timer => {
                        correlator.observe(Trigger::TimedOut);
                        return;
                    }
                };
                match sent {
                    Ok(()) => continue,
                    Err(err) => Trigger::SendFailed(err.to_string()),
                }
            }
        };
        if matches!(trigger, Trigger::TimedOut) {
            tracing::warn!("no gateway response before timeout");
        }
        if correlator.observe(trigger) == Transition::Settled {
            return;
        }
    }
}

fn settled(correlator: Correlator) -> Outcome {
    correlator.into_outcome().unwrap_or_else(|| Outcome::ProtocolError {
        detail: "session ended without an outcome".to_string(),
    })
}
