/// MessagePack codec for signaling messages.
///
/// Messages are encoded as a field-name-keyed map; absent fields are not
/// written. Decoding is strict: the top-level value must be a map, every
/// key must be a string naming a known field, `type` must be present and
/// known, values nest at most one array deep, and no bytes may follow the
/// map.
use std::io::Cursor;

use rmp::Marker;
use serde::Deserialize;

use crate::error::SignalingError;
use crate::message::{Field, Message};

/// Container depth allowed below a top-level key: one array of scalars.
const MAX_VALUE_DEPTH: usize = 1;

/// Configuration for a [`MessageCodec`].
///
/// ```rust
/// use salty_signaling::{CodecConfig, MessageCodec};
///
/// let codec = MessageCodec::new(CodecConfig::new().max_message_size(16 * 1024));
/// ```
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Maximum encoded message size in bytes, enforced on both directions.
    pub(crate) max_message_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecConfig {
    pub fn new() -> Self {
        Self {
            max_message_size: 64 * 1024,
        }
    }

    /// Set maximum encoded message size (default: 64 KiB).
    pub fn max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = bytes;
        self
    }
}

/// Stateless encoder/decoder. Build once, share freely.
#[derive(Debug, Clone, Default)]
pub struct MessageCodec {
    config: CodecConfig,
}

impl MessageCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Serialize a message to a MessagePack map.
    pub fn encode(&self, message: &Message) -> Result<Vec<u8>, SignalingError> {
        let bytes = rmp_serde::to_vec_named(message)?;
        self.check_size(bytes.len())?;
        tracing::trace!("encoded {} ({} bytes)", message.message_type, bytes.len());
        Ok(bytes)
    }

    /// Deserialize a MessagePack map into a message.
    pub fn decode(&self, data: &[u8]) -> Result<Message, SignalingError> {
        self.check_size(data.len())?;
        self.decode_strict(data).inspect_err(|e| {
            tracing::debug!("rejected payload ({} bytes): {e}", data.len());
        })
    }

    fn decode_strict(&self, data: &[u8]) -> Result<Message, SignalingError> {
        let Some(&first) = data.first() else {
            return Err(SignalingError::CannotDecodePayload("empty payload".into()));
        };
        if !matches!(
            Marker::from_u8(first),
            Marker::FixMap(_) | Marker::Map16 | Marker::Map32
        ) {
            return Err(SignalingError::CannotDecodePayload(
                "payload is not a map".into(),
            ));
        }
        check_structure(data)?;

        let mut cursor = Cursor::new(data);
        let message = {
            let mut de = rmp_serde::Deserializer::new(&mut cursor);
            Message::deserialize(&mut de)?
        };

        let consumed = cursor.position() as usize;
        if consumed != data.len() {
            return Err(SignalingError::CannotDecodePayload(format!(
                "{} trailing bytes after message",
                data.len() - consumed
            )));
        }
        Ok(message)
    }

    fn check_size(&self, size: usize) -> Result<(), SignalingError> {
        if size > self.config.max_message_size {
            return Err(SignalingError::MessageTooLarge {
                size,
                max: self.config.max_message_size,
            });
        }
        Ok(())
    }
}

fn malformed(reason: impl Into<String>) -> SignalingError {
    SignalingError::CannotDecodePayload(reason.into())
}

fn is_known_key(key: &[u8]) -> bool {
    key == b"type" || Field::ALL.iter().any(|f| f.as_str().as_bytes() == key)
}

/// Walk the top-level map without building any values.
///
/// The derived deserializer also takes integer keys as field indices and
/// bin keys as names, so keys are checked here first. Nesting is bounded
/// here too, before the recursive deserializer sees the input.
fn check_structure(data: &[u8]) -> Result<(), SignalingError> {
    let mut rd = data;
    let len = rmp::decode::read_map_len(&mut rd).map_err(|_| malformed("payload is not a map"))?;
    for _ in 0..len {
        let key_len =
            rmp::decode::read_str_len(&mut rd).map_err(|_| malformed("map key is not a string"))?;
        let key = take(&mut rd, key_len as usize)?;
        if !is_known_key(key) {
            return Err(malformed(format!(
                "unknown field `{}`",
                String::from_utf8_lossy(key)
            )));
        }
        skip_value(&mut rd, 0)?;
    }
    Ok(())
}

fn take<'a>(rd: &mut &'a [u8], n: usize) -> Result<&'a [u8], SignalingError> {
    if rd.len() < n {
        return Err(malformed("truncated payload"));
    }
    let (head, tail) = rd.split_at(n);
    *rd = tail;
    Ok(head)
}

/// Big-endian length prefix of `width` bytes.
fn read_len(rd: &mut &[u8], width: usize) -> Result<usize, SignalingError> {
    Ok(take(rd, width)?
        .iter()
        .fold(0usize, |acc, b| (acc << 8) | usize::from(*b)))
}

fn skip_value(rd: &mut &[u8], depth: usize) -> Result<(), SignalingError> {
    let marker = rmp::decode::read_marker(rd).map_err(|_| malformed("truncated payload"))?;
    let children = match marker {
        Marker::FixPos(_) | Marker::FixNeg(_) | Marker::Null | Marker::True | Marker::False => {
            return Ok(())
        }
        Marker::U8 | Marker::I8 => return take(rd, 1).map(drop),
        Marker::U16 | Marker::I16 => return take(rd, 2).map(drop),
        Marker::U32 | Marker::I32 | Marker::F32 => return take(rd, 4).map(drop),
        Marker::U64 | Marker::I64 | Marker::F64 => return take(rd, 8).map(drop),
        Marker::FixStr(n) => return take(rd, usize::from(n)).map(drop),
        Marker::Str8 | Marker::Bin8 => {
            let n = read_len(rd, 1)?;
            return take(rd, n).map(drop);
        }
        Marker::Str16 | Marker::Bin16 => {
            let n = read_len(rd, 2)?;
            return take(rd, n).map(drop);
        }
        Marker::Str32 | Marker::Bin32 => {
            let n = read_len(rd, 4)?;
            return take(rd, n).map(drop);
        }
        // ext: one type byte, then the data
        Marker::FixExt1 => return take(rd, 2).map(drop),
        Marker::FixExt2 => return take(rd, 3).map(drop),
        Marker::FixExt4 => return take(rd, 5).map(drop),
        Marker::FixExt8 => return take(rd, 9).map(drop),
        Marker::FixExt16 => return take(rd, 17).map(drop),
        Marker::Ext8 => {
            let n = read_len(rd, 1)?;
            return take(rd, n + 1).map(drop);
        }
        Marker::Ext16 => {
            let n = read_len(rd, 2)?;
            return take(rd, n + 1).map(drop);
        }
        Marker::Ext32 => {
            let n = read_len(rd, 4)?;
            return take(rd, n + 1).map(drop);
        }
        Marker::FixArray(n) => usize::from(n),
        Marker::Array16 => read_len(rd, 2)?,
        Marker::Array32 => read_len(rd, 4)?,
        Marker::FixMap(n) => 2 * usize::from(n),
        Marker::Map16 => 2 * read_len(rd, 2)?,
        Marker::Map32 => read_len(rd, 4)?.saturating_mul(2),
        Marker::Reserved => return Err(malformed("reserved marker")),
    };

    if depth >= MAX_VALUE_DEPTH {
        return Err(malformed("value nested too deeply"));
    }
    // Each child consumes at least one byte, so a lying count runs out of input.
    for _ in 0..children {
        skip_value(rd, depth + 1)?;
    }
    Ok(())
}
