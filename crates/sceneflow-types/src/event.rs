//! Inbound events and structured payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::conversation::PeerId;

/// One inbound chat event, the unit the dispatcher consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub peer_id: PeerId,
    #[serde(default)]
    pub text: Option<String>,
    /// Raw payload as delivered by the transport: either structured JSON or a
    /// JSON document serialized into a string.
    #[serde(default)]
    pub payload: Option<Value>,
}

impl InboundEvent {
    /// A plain text message.
    pub fn text(peer_id: impl Into<PeerId>, text: impl Into<String>) -> Self {
        Self {
            peer_id: peer_id.into(),
            text: Some(text.into()),
            payload: None,
        }
    }

    /// Attach a raw payload (typically from a button click).
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Explicit intent carried by a button: `{"command": "...", ...args}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    /// Normalized (trimmed, lower-cased) discriminator.
    pub command: String,
    /// Every other field of the payload object.
    pub args: Map<String, Value>,
}

impl Intent {
    pub fn arg(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arg(key).and_then(Value::as_str)
    }
}

/// Decoded payload of an inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// An object with a string `command` discriminator.
    Intent(Intent),
    /// Any other structured value; carried along but never routed.
    Unrecognized(Value),
}

impl Payload {
    /// Classify an already-decoded JSON value.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut map) => match map.remove("command") {
                Some(Value::String(command)) => Payload::Intent(Intent {
                    command: command.trim().to_lowercase(),
                    args: map,
                }),
                Some(other) => {
                    map.insert("command".to_string(), other);
                    Payload::Unrecognized(Value::Object(map))
                }
                None => Payload::Unrecognized(Value::Object(map)),
            },
            other => Payload::Unrecognized(other),
        }
    }

    /// Decode a raw payload, parsing it first when it arrived serialized.
    pub fn parse(raw: &Value) -> Result<Self, serde_json::Error> {
        match raw {
            Value::String(serialized) => {
                serde_json::from_str::<Value>(serialized).map(Self::from_value)
            }
            other => Ok(Self::from_value(other.clone())),
        }
    }

    pub fn intent(&self) -> Option<&Intent> {
        match self {
            Payload::Intent(intent) => Some(intent),
            Payload::Unrecognized(_) => None,
        }
    }
}
