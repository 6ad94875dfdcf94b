//! Shared fixtures: an in-process fake command gateway and bridge builders.

#![allow(dead_code, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::response::Response;
use axum::routing::get;
use p256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use vcp_bridge::service::{BridgeSettings, CommandBridge, Signer};
use vcp_bridge::ws::SessionTiming;

/// Domain every test bridge announces.
pub const DOMAIN: &str = "bridge.example.com";

/// How the fake gateway reacts once it receives the request frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Answer with a `VehicleCommandResponse` carrying txid `abc`.
    Respond,
    /// Send a non-JSON payload and an unrelated JSON frame, then answer.
    NoiseThenRespond,
    /// Never answer.
    Silent,
    /// Send a close frame without answering.
    CloseCleanly,
    /// Drop the connection without a closing handshake.
    DropAbruptly,
    /// Send a close frame as soon as the handshake arrives.
    CloseAfterHandshake,
}

/// A frame the gateway received and when.
#[derive(Debug, Clone)]
pub struct Received {
    /// Receive time.
    pub at: Instant,
    /// Parsed frame.
    pub frame: Value,
}

/// Everything the gateway observed.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    /// Frames in arrival order, across all connections.
    pub frames: Vec<Received>,
    /// `Authorization` header of each upgrade request.
    pub authorization: Vec<Option<String>>,
    /// Sessions that ended with the client closing or disconnecting.
    pub closed: usize,
}

impl Recording {
    /// Number of upgrade requests seen.
    pub fn connections(&self) -> usize {
        self.authorization.len()
    }

    /// Value of the `type` field of each received frame.
    pub fn frame_types(&self) -> Vec<String> {
        self.frames
            .iter()
            .map(|r| {
                r.frame
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            })
            .collect()
    }
}

#[derive(Clone)]
struct GatewayState {
    behaviour: Behaviour,
    recording: Arc<Mutex<Recording>>,
}

/// The response frame a well-behaved gateway sends.
pub fn response_frame() -> Value {
    json!({"type": "VehicleCommandResponse", "txid": "abc", "result": true})
}

/// An in-process WebSocket server speaking the gateway protocol on `/v1`.
#[derive(Debug)]
pub struct FakeGateway {
    /// `ws://` endpoint to point the bridge at.
    pub url: String,
    recording: Arc<Mutex<Recording>>,
    task: JoinHandle<()>,
}

impl FakeGateway {
    /// Binds an ephemeral port and starts serving.
    pub async fn start(behaviour: Behaviour) -> Self {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        let recording = Arc::new(Mutex::new(Recording::default()));
        let state = GatewayState {
            behaviour,
            recording: Arc::clone(&recording),
        };
        let router = Router::new().route("/v1", get(upgrade)).with_state(state);
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Self {
            url: format!("ws://{addr}/v1"),
            recording,
            task,
        }
    }

    /// Snapshot of what the gateway has seen so far.
    pub async fn recording(&self) -> Recording {
        self.recording.lock().await.clone()
    }

    /// Waits until `count` sessions have ended, up to `within`.
    pub async fn wait_for_closed(&self, count: usize, within: Duration) -> bool {
        let deadline = Instant::now() + within;
        while Instant::now() < deadline {
            if self.recording.lock().await.closed >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

impl Drop for FakeGateway {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn upgrade(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.recording.lock().await.authorization.push(authorization);
    ws.on_upgrade(move |socket| serve_session(socket, state))
}

async fn serve_session(mut socket: WebSocket, state: GatewayState) {
    while let Some(Ok(message)) = socket.recv().await {
        let text = match message {
            Message::Text(text) => text.as_str().to_string(),
            Message::Close(_) => break,
            _ => continue,
        };
        let Ok(frame) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        let frame_type = frame
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        state.recording.lock().await.frames.push(Received {
            at: Instant::now(),
            frame,
        });
        if frame_type == "VehicleCommandHandshake"
            && state.behaviour == Behaviour::CloseAfterHandshake
        {
            let _ = socket.send(Message::Close(None)).await;
            continue;
        }
        if frame_type != "VehicleCommandRequest" {
            continue;
        }

        match state.behaviour {
            Behaviour::Respond => {
                let _ = socket
                    .send(Message::Text(response_frame().to_string().into()))
                    .await;
            }
            Behaviour::NoiseThenRespond => {
                let _ = socket.send(Message::Text(Utf8Bytes::from_static("keepalive"))).await;
                let _ = socket
                    .send(Message::Text(json!({"type": "control"}).to_string().into()))
                    .await;
                let _ = socket
                    .send(Message::Text(response_frame().to_string().into()))
                    .await;
            }
            Behaviour::Silent | Behaviour::CloseAfterHandshake => {}
            Behaviour::CloseCleanly => {
                let _ = socket.send(Message::Close(None)).await;
            }
            Behaviour::DropAbruptly => {
                drop(socket);
                state.recording.lock().await.closed += 1;
                return;
            }
        }
    }
    state.recording.lock().await.closed += 1;
}

/// A signer with a fresh random key.
pub fn signer() -> Signer {
    Signer::new(SigningKey::random(&mut OsRng))
}

/// A bridge pointed at `gateway_url` with the given timing.
pub fn bridge_with(signer: Signer, gateway_url: &str, timing: SessionTiming) -> CommandBridge {
    CommandBridge::new(
        Some(signer),
        BridgeSettings {
            gateway_url: gateway_url.to_string(),
            domain: Some(DOMAIN.to_string()),
            timing,
        },
    )
}

/// A bridge with the default handshake delay and a short response timeout.
pub fn bridge(gateway_url: &str) -> CommandBridge {
    bridge_with(
        signer(),
        gateway_url,
        SessionTiming {
            response_timeout: Duration::from_secs(3),
            ..SessionTiming::default()
        },
    )
}
