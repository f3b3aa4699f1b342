//! Message layer of a SaltyRTC-style signaling relay.
//!
//! Serializes, seals and validates the messages exchanged between the
//! server, the initiator and responders. Connection state, transport
//! framing and handshake sequencing live in the layers above.
//!
//! Wire format: MessagePack map, keyed by field name, unknown keys rejected.
//! Crypto: NaCl box (X25519 + XSalsa20-Poly1305) with a structured nonce.
//!
//! Receive path: [`crypto::open`] → [`MessageCodec::decode`] → [`validate`].
//! Send path is the mirror.

pub mod address;
pub mod close_code;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod message;
pub mod nonce;
pub mod types;
pub mod validate;
pub mod value;

pub use address::{check_identity, check_relay, Address};
pub use close_code::CloseCode;
pub use codec::{CodecConfig, MessageCodec};
pub use crypto::{ClientContext, KeyContext, SessionKeyPair};
pub use error::{FieldError, SignalingError};
pub use message::{Field, Message};
pub use nonce::Nonce;
pub use types::{
    MessageType, COOKIE_LENGTH, KEY_LENGTH, MESSAGE_ID_LENGTH, NONCE_LENGTH, SIGNED_KEYS_LENGTH,
    TAG_LENGTH,
};
pub use value::RawValue;

pub use crypto_box::{PublicKey, SecretKey};
