use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Length of a connection cookie in bytes.
pub const COOKIE_LENGTH: usize = 16;

/// Length of a Curve25519 public or secret key in bytes.
pub const KEY_LENGTH: usize = 32;

/// Length of the box nonce in bytes.
pub const NONCE_LENGTH: usize = 24;

/// Length of the Poly1305 tag prepended to every sealed payload.
pub const TAG_LENGTH: usize = 16;

/// Length of `signed_keys`: server session key + client key, sealed.
pub const SIGNED_KEYS_LENGTH: usize = 2 * KEY_LENGTH + TAG_LENGTH;

/// Length of a message id carried by `send-error` (nonce minus cookie).
pub const MESSAGE_ID_LENGTH: usize = NONCE_LENGTH - COOKIE_LENGTH;

/// Message kind: the `type` key of every signaling message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    ServerHello,
    ClientHello,
    ClientAuth,
    ServerAuth,
    NewInitiator,
    NewResponder,
    DropResponder,
    SendError,
    Disconnected,
}

impl MessageType {
    pub const ALL: [MessageType; 9] = [
        MessageType::ServerHello,
        MessageType::ClientHello,
        MessageType::ClientAuth,
        MessageType::ServerAuth,
        MessageType::NewInitiator,
        MessageType::NewResponder,
        MessageType::DropResponder,
        MessageType::SendError,
        MessageType::Disconnected,
    ];

    /// Wire name of this message type.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::ServerHello => "server-hello",
            MessageType::ClientHello => "client-hello",
            MessageType::ClientAuth => "client-auth",
            MessageType::ServerAuth => "server-auth",
            MessageType::NewInitiator => "new-initiator",
            MessageType::NewResponder => "new-responder",
            MessageType::DropResponder => "drop-responder",
            MessageType::SendError => "send-error",
            MessageType::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not a known message type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown message type `{0}`")]
pub struct UnknownMessageType(pub String);

impl FromStr for MessageType {
    type Err = UnknownMessageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownMessageType(s.to_string()))
    }
}

// Hand-written so the wire form is always the bare string, independent of
// how the MessagePack serializer chooses to encode enum variants.
impl Serialize for MessageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
