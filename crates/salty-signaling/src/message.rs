use std::fmt;

use crypto_box::PublicKey;
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::close_code::CloseCode;
use crate::codec::MessageCodec;
use crate::crypto::{self, KeyContext};
use crate::error::{FieldError, SignalingError};
use crate::types::{MessageType, COOKIE_LENGTH, KEY_LENGTH, MESSAGE_ID_LENGTH, SIGNED_KEYS_LENGTH};
use crate::validate;
use crate::value::RawValue;

/// A signaling message.
///
/// Every message kind shares this one flat shape; a field is `Some` only
/// for the kinds that carry it. `None` fields are left out of the
/// MessagePack map entirely, and any key not listed here is rejected on
/// decode. Which fields a given kind *requires* is checked by the typed
/// accessors, not by the codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Message {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_bytes")]
    pub key: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_bytes")]
    pub your_cookie: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subprotocols: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_bytes")]
    pub your_key: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator_connected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responders: Option<Vec<Address>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "serde_bytes")]
    pub signed_keys: Option<Vec<u8>>,
    /// An address for most kinds, an 8-byte message id for `send-error`.
    /// `Some(RawValue::Nil)` counts as absent.
    #[serde(default, skip_serializing_if = "id_is_absent")]
    pub id: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<i64>,
}

fn id_is_absent(id: &Option<RawValue>) -> bool {
    matches!(id, None | Some(RawValue::Nil))
}

/// Names of the optional message fields, as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Key,
    YourCookie,
    Subprotocols,
    PingInterval,
    YourKey,
    InitiatorConnected,
    Responders,
    SignedKeys,
    Id,
    Reason,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Key,
        Field::YourCookie,
        Field::Subprotocols,
        Field::PingInterval,
        Field::YourKey,
        Field::InitiatorConnected,
        Field::Responders,
        Field::SignedKeys,
        Field::Id,
        Field::Reason,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Key => "key",
            Field::YourCookie => "your_cookie",
            Field::Subprotocols => "subprotocols",
            Field::PingInterval => "ping_interval",
            Field::YourKey => "your_key",
            Field::InitiatorConnected => "initiator_connected",
            Field::Responders => "responders",
            Field::SignedKeys => "signed_keys",
            Field::Id => "id",
            Field::Reason => "reason",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Message {
    /// An empty message of the given kind.
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            key: None,
            your_cookie: None,
            subprotocols: None,
            ping_interval: None,
            your_key: None,
            initiator_connected: None,
            responders: None,
            signed_keys: None,
            id: None,
            reason: None,
        }
    }

    pub fn server_hello(key: [u8; KEY_LENGTH]) -> Self {
        Self {
            key: Some(key.to_vec()),
            ..Self::new(MessageType::ServerHello)
        }
    }

    /// Sent by responders only; the initiator's key is in the path.
    pub fn client_hello(key: [u8; KEY_LENGTH]) -> Self {
        Self {
            key: Some(key.to_vec()),
            ..Self::new(MessageType::ClientHello)
        }
    }

    pub fn client_auth(
        your_cookie: [u8; COOKIE_LENGTH],
        subprotocols: Vec<String>,
        ping_interval: u32,
        your_key: Option<[u8; KEY_LENGTH]>,
    ) -> Self {
        Self {
            your_cookie: Some(your_cookie.to_vec()),
            subprotocols: Some(subprotocols),
            ping_interval: Some(ping_interval),
            your_key: your_key.map(|k| k.to_vec()),
            ..Self::new(MessageType::ClientAuth)
        }
    }

    pub fn server_auth_for_initiator(
        your_cookie: [u8; COOKIE_LENGTH],
        signed_keys: Option<[u8; SIGNED_KEYS_LENGTH]>,
        responders: Vec<Address>,
    ) -> Self {
        Self {
            your_cookie: Some(your_cookie.to_vec()),
            signed_keys: signed_keys.map(|k| k.to_vec()),
            responders: Some(responders),
            ..Self::new(MessageType::ServerAuth)
        }
    }

    pub fn server_auth_for_responder(
        your_cookie: [u8; COOKIE_LENGTH],
        signed_keys: Option<[u8; SIGNED_KEYS_LENGTH]>,
        initiator_connected: bool,
    ) -> Self {
        Self {
            your_cookie: Some(your_cookie.to_vec()),
            signed_keys: signed_keys.map(|k| k.to_vec()),
            initiator_connected: Some(initiator_connected),
            ..Self::new(MessageType::ServerAuth)
        }
    }

    pub fn new_initiator() -> Self {
        Self::new(MessageType::NewInitiator)
    }

    pub fn new_responder(id: Address) -> Self {
        Self {
            id: Some(RawValue::from(id.get())),
            ..Self::new(MessageType::NewResponder)
        }
    }

    pub fn drop_responder(id: Address, reason: Option<CloseCode>) -> Self {
        Self {
            id: Some(RawValue::from(id.get())),
            reason: reason.map(|r| i64::from(r.code())),
            ..Self::new(MessageType::DropResponder)
        }
    }

    pub fn send_error(message_id: [u8; MESSAGE_ID_LENGTH]) -> Self {
        Self {
            id: Some(RawValue::from(message_id.to_vec())),
            ..Self::new(MessageType::SendError)
        }
    }

    pub fn disconnected(id: Address) -> Self {
        Self {
            id: Some(RawValue::from(id.get())),
            ..Self::new(MessageType::Disconnected)
        }
    }

    /// Fields that are present on this message, in wire order.
    pub fn present_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.raw(*f).is_some())
            .collect()
    }

    /// Project a field to its loosely-typed wire value.
    pub fn raw(&self, field: Field) -> Option<RawValue> {
        match field {
            Field::Key => self.key.as_deref().map(RawValue::from),
            Field::YourCookie => self.your_cookie.as_deref().map(RawValue::from),
            Field::Subprotocols => self.subprotocols.as_ref().map(|list| {
                RawValue::Array(list.iter().map(|s| RawValue::from(s.as_str())).collect())
            }),
            Field::PingInterval => self.ping_interval.map(RawValue::from),
            Field::YourKey => self.your_key.as_deref().map(RawValue::from),
            Field::InitiatorConnected => self.initiator_connected.map(RawValue::from),
            Field::Responders => self.responders.as_ref().map(|list| {
                RawValue::Array(list.iter().map(|a| RawValue::from(a.get())).collect())
            }),
            Field::SignedKeys => self.signed_keys.as_deref().map(RawValue::from),
            Field::Id => self.id.clone().filter(|v| *v != RawValue::Nil),
            Field::Reason => self.reason.map(RawValue::from),
        }
    }

    fn parse_field<T>(
        &self,
        field: Field,
        parse: impl Fn(Option<&RawValue>) -> Result<T, SignalingError>,
    ) -> Result<T, FieldError> {
        parse(self.raw(field).as_ref())
            .map_err(|e| FieldError::new(self.message_type, field, e))
    }

    pub fn key(&self) -> Result<PublicKey, FieldError> {
        self.parse_field(Field::Key, validate::parse_public_key)
    }

    pub fn your_key(&self) -> Result<PublicKey, FieldError> {
        self.parse_field(Field::YourKey, validate::parse_public_key)
    }

    pub fn your_cookie(&self) -> Result<[u8; COOKIE_LENGTH], FieldError> {
        self.parse_field(Field::YourCookie, validate::parse_your_cookie)
    }

    pub fn subprotocols(&self) -> Result<Vec<String>, FieldError> {
        self.parse_field(Field::Subprotocols, validate::parse_subprotocols)
    }

    pub fn ping_interval(&self) -> Result<u32, FieldError> {
        self.parse_field(Field::PingInterval, validate::parse_ping_interval)
    }

    pub fn signed_keys(&self) -> Result<[u8; SIGNED_KEYS_LENGTH], FieldError> {
        self.parse_field(Field::SignedKeys, validate::parse_signed_keys)
    }

    pub fn initiator_connected(&self) -> Result<bool, FieldError> {
        self.parse_field(Field::InitiatorConnected, validate::parse_initiator_connected)
    }

    pub fn responders(&self) -> Result<Vec<Address>, FieldError> {
        self.parse_field(Field::Responders, validate::parse_responders)
    }

    /// `id` as any address.
    pub fn address_id(&self) -> Result<Address, FieldError> {
        self.parse_field(Field::Id, validate::parse_address_id)
    }

    /// `id` as a responder address.
    pub fn responder_id(&self) -> Result<Address, FieldError> {
        self.parse_field(Field::Id, validate::parse_responder_id)
    }

    /// `id` as the message id of a `send-error`.
    pub fn message_id(&self) -> Result<[u8; MESSAGE_ID_LENGTH], FieldError> {
        self.parse_field(Field::Id, validate::parse_message_id)
    }

    pub fn reason(&self) -> Result<CloseCode, FieldError> {
        self.parse_field(Field::Reason, validate::parse_reason_code)
    }

    /// Serialize with the default codec.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SignalingError> {
        MessageCodec::default().encode(self)
    }

    /// Deserialize with the default codec.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SignalingError> {
        MessageCodec::default().decode(data)
    }

    /// Encode, then seal for the client.
    pub fn seal<C: KeyContext + ?Sized>(
        &self,
        codec: &MessageCodec,
        ctx: &C,
        nonce: &[u8],
    ) -> Result<Vec<u8>, SignalingError> {
        let plaintext = codec.encode(self)?;
        crypto::seal(ctx, nonce, &plaintext)
    }

    /// Open a sealed payload from the client, then decode it.
    pub fn open<C: KeyContext + ?Sized>(
        codec: &MessageCodec,
        ctx: &C,
        nonce: &[u8],
        ciphertext: &[u8],
    ) -> Result<Self, SignalingError> {
        let plaintext = crypto::open(ctx, nonce, ciphertext)?;
        codec.decode(&plaintext)
    }
}
