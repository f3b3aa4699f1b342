use crate::address::Address;
use crate::message::Field;
use crate::types::MessageType;

/// Errors produced by the signaling message layer.
///
/// Every variant is recoverable: callers are expected to terminate the
/// offending connection (optionally with a close code), never the process.
#[derive(Debug, thiserror::Error)]
pub enum SignalingError {
    #[error("not allowed message: {reason}")]
    NotAllowedMessage { reason: String },

    #[error("identities don't match: claimed {claimed}, expected {expected}")]
    IdentityMismatch { claimed: Address, expected: Address },

    #[error("client is not authenticated")]
    NotAuthenticated,

    #[error("message is too short: {actual} bytes (min {min})")]
    MessageTooShort { actual: usize, min: usize },

    #[error("message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("cannot encode payload: {0}")]
    CannotEncodePayload(String),

    #[error("cannot decode payload: {0}")]
    CannotDecodePayload(String),

    #[error("field doesn't exist")]
    FieldNotExist,

    #[error("invalid field value: {reason}")]
    InvalidFieldValue { reason: String },

    #[error("nonce sequence {0} exceeds 48 bits")]
    SequenceOverflow(u64),

    #[error("cannot encrypt payload")]
    CannotEncryptPayload,

    /// Authentication failed. Deliberately carries no cause.
    #[error("cannot decrypt payload")]
    CannotDecryptPayload,
}

impl SignalingError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SignalingError::InvalidFieldValue {
            reason: reason.into(),
        }
    }
}

impl From<rmp_serde::encode::Error> for SignalingError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        SignalingError::CannotEncodePayload(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for SignalingError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        SignalingError::CannotDecodePayload(e.to_string())
    }
}

/// A field-level failure, tagged with the message type and field it came from.
#[derive(Debug, thiserror::Error)]
#[error("{message_type}.{field}: {source}")]
pub struct FieldError {
    pub message_type: MessageType,
    pub field: Field,
    #[source]
    pub source: SignalingError,
}

impl FieldError {
    pub fn new(message_type: MessageType, field: Field, source: SignalingError) -> Self {
        Self {
            message_type,
            field,
            source,
        }
    }

    /// The underlying error kind.
    pub fn kind(&self) -> &SignalingError {
        &self.source
    }

    pub fn into_inner(self) -> SignalingError {
        self.source
    }
}
