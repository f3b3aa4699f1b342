/// Field validators.
///
/// Each field has an `is_valid_*` predicate and a `parse_*` parser over the
/// raw wire value. Parsers return `FieldNotExist` for an absent (or nil)
/// value and `InvalidFieldValue` for anything else that fails the predicate.
/// Nothing here mutates its input or has side effects.
use crypto_box::PublicKey;

use crate::address::{self, Address};
use crate::close_code::{self, CloseCode};
use crate::error::SignalingError;
use crate::types::{COOKIE_LENGTH, KEY_LENGTH, MESSAGE_ID_LENGTH, SIGNED_KEYS_LENGTH};
use crate::value::RawValue;

/// Present and not nil.
fn present(raw: Option<&RawValue>) -> Result<&RawValue, SignalingError> {
    match raw {
        Some(v) if !v.is_nil() => Ok(v),
        _ => Err(SignalingError::FieldNotExist),
    }
}

fn fixed_bytes<const N: usize>(raw: &RawValue) -> Option<[u8; N]> {
    raw.as_bytes().and_then(|b| <[u8; N]>::try_from(b).ok())
}

// ── your_cookie ────────────────────────────────────────────────────────

pub fn is_valid_your_cookie(raw: Option<&RawValue>) -> bool {
    parse_your_cookie(raw).is_ok()
}

pub fn parse_your_cookie(raw: Option<&RawValue>) -> Result<[u8; COOKIE_LENGTH], SignalingError> {
    fixed_bytes(present(raw)?).ok_or_else(|| SignalingError::invalid("invalid your_cookie"))
}

// ── subprotocols ───────────────────────────────────────────────────────

pub fn is_valid_subprotocols(raw: Option<&RawValue>) -> bool {
    parse_subprotocols(raw).is_ok()
}

/// Order is preserved: the first mutually supported entry wins negotiation.
pub fn parse_subprotocols(raw: Option<&RawValue>) -> Result<Vec<String>, SignalingError> {
    let items = present(raw)?
        .as_array()
        .ok_or_else(|| SignalingError::invalid("invalid subprotocols"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| SignalingError::invalid("invalid subprotocols"))
        })
        .collect()
}

// ── ping_interval ──────────────────────────────────────────────────────

pub fn is_valid_ping_interval(raw: Option<&RawValue>) -> bool {
    parse_ping_interval(raw).is_ok()
}

/// Ping interval in seconds; `0` disables pings.
pub fn parse_ping_interval(raw: Option<&RawValue>) -> Result<u32, SignalingError> {
    present(raw)?
        .as_integer()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| SignalingError::invalid("invalid ping_interval"))
}

// ── key / your_key ─────────────────────────────────────────────────────

pub fn is_valid_public_key(raw: Option<&RawValue>) -> bool {
    parse_public_key(raw).is_ok()
}

/// Parse a `key` or `your_key` field into a Curve25519 public key.
pub fn parse_public_key(raw: Option<&RawValue>) -> Result<PublicKey, SignalingError> {
    fixed_bytes::<KEY_LENGTH>(present(raw)?)
        .map(PublicKey::from)
        .ok_or_else(|| SignalingError::invalid("invalid public key"))
}

// ── signed_keys ────────────────────────────────────────────────────────

pub fn is_valid_signed_keys(raw: Option<&RawValue>) -> bool {
    parse_signed_keys(raw).is_ok()
}

pub fn parse_signed_keys(
    raw: Option<&RawValue>,
) -> Result<[u8; SIGNED_KEYS_LENGTH], SignalingError> {
    fixed_bytes(present(raw)?).ok_or_else(|| SignalingError::invalid("invalid signed_keys"))
}

// ── initiator_connected ────────────────────────────────────────────────

pub fn is_valid_initiator_connected(raw: Option<&RawValue>) -> bool {
    parse_initiator_connected(raw).is_ok()
}

pub fn parse_initiator_connected(raw: Option<&RawValue>) -> Result<bool, SignalingError> {
    present(raw)?
        .as_bool()
        .ok_or_else(|| SignalingError::invalid("invalid initiator_connected"))
}

// ── addresses ──────────────────────────────────────────────────────────

pub fn is_valid_address_id(raw: Option<&RawValue>) -> bool {
    parse_address_id(raw).is_ok()
}

/// Any address: server, initiator or responder.
pub fn parse_address_id(raw: Option<&RawValue>) -> Result<Address, SignalingError> {
    present(raw)?
        .as_integer()
        .filter(|v| address::is_valid_address(*v))
        .and_then(|v| u8::try_from(v).ok())
        .map(Address::new)
        .ok_or_else(|| SignalingError::invalid("invalid address id"))
}

pub fn is_valid_responder_id(raw: Option<&RawValue>) -> bool {
    parse_responder_id(raw).is_ok()
}

/// A responder address only. Server and initiator addresses are rejected.
pub fn parse_responder_id(raw: Option<&RawValue>) -> Result<Address, SignalingError> {
    present(raw)?
        .as_integer()
        .filter(|v| address::is_valid_responder_address(*v))
        .and_then(|v| u8::try_from(v).ok())
        .map(Address::new)
        .ok_or_else(|| SignalingError::invalid("invalid responder address id"))
}

pub fn is_valid_responders(raw: Option<&RawValue>) -> bool {
    parse_responders(raw).is_ok()
}

/// A list of responder addresses, order preserved.
pub fn parse_responders(raw: Option<&RawValue>) -> Result<Vec<Address>, SignalingError> {
    let items = present(raw)?
        .as_array()
        .ok_or_else(|| SignalingError::invalid("invalid responders"))?;
    items
        .iter()
        .map(|item| {
            parse_responder_id(Some(item))
                .map_err(|_| SignalingError::invalid("invalid responders"))
        })
        .collect()
}

// ── send-error id ──────────────────────────────────────────────────────

pub fn is_valid_message_id(raw: Option<&RawValue>) -> bool {
    parse_message_id(raw).is_ok()
}

/// The id of an undeliverable message: source, destination, overflow, sequence.
pub fn parse_message_id(raw: Option<&RawValue>) -> Result<[u8; MESSAGE_ID_LENGTH], SignalingError> {
    fixed_bytes(present(raw)?).ok_or_else(|| SignalingError::invalid("invalid message id"))
}

// ── reason ─────────────────────────────────────────────────────────────

pub fn is_valid_reason_code(raw: Option<&RawValue>) -> bool {
    parse_reason_code(raw).is_ok()
}

/// The value must be an integer first; a non-integer never matches a code.
pub fn parse_reason_code(raw: Option<&RawValue>) -> Result<CloseCode, SignalingError> {
    present(raw)?
        .as_integer()
        .filter(|v| close_code::is_valid_reason_code(*v))
        .and_then(CloseCode::from_code)
        .ok_or_else(|| SignalingError::invalid("invalid reason code"))
}
