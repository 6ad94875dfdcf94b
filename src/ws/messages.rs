//! Gateway frame types: the two outbound frames and inbound response
//! recognition.

use serde::Serialize;
use serde_json::Value;

use crate::domain::VehicleId;
use crate::service::SignedMessage;

/// `type` value that marks an inbound frame as the command response.
pub const RESPONSE_TYPE: &str = "VehicleCommandResponse";

/// Frames the bridge sends to the gateway, in order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum OutboundFrame {
    /// First frame of a session: announces the signing domain.
    #[serde(rename = "VehicleCommandHandshake")]
    Handshake {
        /// Domain hosting the public key.
        domain: String,
    },
    /// The signed command.
    #[serde(rename = "VehicleCommandRequest")]
    Request {
        /// Command name.
        command: String,
        /// Target vehicle.
        vehicle_id: VehicleId,
        /// Base64url-encoded params.
        message: String,
        /// Base64url signature over `message`.
        signature: String,
    },
}

impl OutboundFrame {
    /// Builds the handshake frame.
    #[must_use]
    pub fn handshake(domain: impl Into<String>) -> Self {
        Self::Handshake {
            domain: domain.into(),
        }
    }

    /// Builds the request frame from a signed message.
    #[must_use]
    pub fn request(command: impl Into<String>, vehicle_id: VehicleId, signed: SignedMessage) -> Self {
        Self::Request {
            command: command.into(),
            vehicle_id,
            message: signed.encoded_message,
            signature: signed.signature,
        }
    }

    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Handshake { .. } => "handshake",
            Self::Request { .. } => "request",
        }
    }

    /// Serializes the frame to its JSON text form.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if serialization fails.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// How an inbound payload relates to the pending request.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    /// The answer to the request.
    Response {
        /// `txid` field, if present.
        txid: Option<Value>,
        /// The whole frame.
        raw: Value,
    },
    /// Valid JSON that is not the answer.
    Other,
    /// Not JSON; keepalives and other protocol noise.
    Unparseable,
}

impl InboundFrame {
    /// Classifies an inbound payload.
    ///
    /// A frame is the response when its `type` is
    /// [`RESPONSE_TYPE`] or it has a `result` key, whatever its value.
    #[must_use]
    pub fn classify(payload: &[u8]) -> Self {
        let Ok(raw) = serde_json::from_slice::<Value>(payload) else {
            return Self::Unparseable;
        };
        let is_response = raw.get("type").and_then(Value::as_str) == Some(RESPONSE_TYPE)
            || raw.as_object().is_some_and(|obj| obj.contains_key("result"));
        if !is_response {
            return Self::Other;
        }
        let txid = raw.get("txid").cloned();
        Self::Response { txid, raw }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn handshake_frame_shape() {
        let Ok(text) = OutboundFrame::handshake("bridge.example.com").to_text() else {
            panic!("serialization failed");
        };
        assert_eq!(
            text,
            r#"{"type":"VehicleCommandHandshake","domain":"bridge.example.com"}"#
        );
    }

    #[test]
    fn request_frame_shape() {
        let signed = SignedMessage {
            encoded_message: "e30".to_string(),
            signature: "MEUCIQ".to_string(),
        };
        let frame = OutboundFrame::request("door_unlock", VehicleId::new("v1"), signed);
        let Ok(text) = frame.to_text() else {
            panic!("serialization failed");
        };
        let Ok(value) = serde_json::from_str::<Value>(&text) else {
            panic!("not json");
        };
        assert_eq!(
            value,
            json!({
                "type": "VehicleCommandRequest",
                "command": "door_unlock",
                "vehicle_id": "v1",
                "message": "e30",
                "signature": "MEUCIQ",
            })
        );
        assert_eq!(frame.label(), "request");
    }

    #[test]
    fn response_recognized_by_type() {
        let frame = InboundFrame::classify(br#"{"type":"VehicleCommandResponse","txid":"abc"}"#);
        let InboundFrame::Response { txid, raw } = frame else {
            panic!("expected response");
        };
        assert_eq!(txid, Some(json!("abc")));
        assert_eq!(raw["type"], RESPONSE_TYPE);
    }

    #[test]
    fn response_recognized_by_result_key_even_when_null() {
        let frame = InboundFrame::classify(br#"{"result":null}"#);
        assert!(matches!(frame, InboundFrame::Response { txid: None, .. }));
    }

    #[test]
    fn other_json_is_not_a_response() {
        assert_eq!(
            InboundFrame::classify(br#"{"type":"VehicleCommandHandshakeAck"}"#),
            InboundFrame::Other
        );
        assert_eq!(InboundFrame::classify(b"[1,2,3]"), InboundFrame::Other);
        assert_eq!(InboundFrame::classify(b"\"result\""), InboundFrame::Other);
    }

    #[test]
    fn non_json_is_unparseable() {
        assert_eq!(InboundFrame::classify(b"ping"), InboundFrame::Unparseable);
        assert_eq!(
            InboundFrame::classify(&[0xff, 0x00, 0x13]),
            InboundFrame::Unparseable
        );
    }
}
