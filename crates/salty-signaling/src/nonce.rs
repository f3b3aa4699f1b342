use crate::address::Address;
use crate::error::SignalingError;
use crate::types::{COOKIE_LENGTH, NONCE_LENGTH};

/// Structured 24-byte box nonce.
///
/// Layout: cookie (16) ‖ source (1) ‖ destination (1) ‖ overflow (2, BE)
/// ‖ sequence (4, BE). The cookie is fixed per connection and direction;
/// the combined overflow/sequence counter must never repeat under one cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonce {
    pub cookie: [u8; COOKIE_LENGTH],
    pub source: Address,
    pub destination: Address,
    pub overflow: u16,
    pub sequence: u32,
}

impl Nonce {
    /// Largest counter representable in overflow ‖ sequence.
    pub const MAX_COMBINED_SEQUENCE: u64 = (1 << 48) - 1;

    /// Build a nonce from a 48-bit combined counter.
    ///
    /// Counters past [`Nonce::MAX_COMBINED_SEQUENCE`] are refused rather
    /// than wrapped, since a wrapped counter repeats an earlier nonce.
    pub fn new(
        cookie: [u8; COOKIE_LENGTH],
        source: Address,
        destination: Address,
        combined_sequence: u64,
    ) -> Result<Self, SignalingError> {
        if combined_sequence > Self::MAX_COMBINED_SEQUENCE {
            return Err(SignalingError::SequenceOverflow(combined_sequence));
        }
        Ok(Self {
            cookie,
            source,
            destination,
            overflow: (combined_sequence >> 32) as u16,
            sequence: combined_sequence as u32,
        })
    }

    /// Parse the first 24 bytes of `data`. Anything after is ignored.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SignalingError> {
        let data = data
            .get(..NONCE_LENGTH)
            .ok_or(SignalingError::MessageTooShort {
                actual: data.len(),
                min: NONCE_LENGTH,
            })?;

        let mut cookie = [0u8; COOKIE_LENGTH];
        cookie.copy_from_slice(&data[..COOKIE_LENGTH]);
        Ok(Self {
            cookie,
            source: Address::new(data[16]),
            destination: Address::new(data[17]),
            overflow: u16::from_be_bytes([data[18], data[19]]),
            sequence: u32::from_be_bytes([data[20], data[21], data[22], data[23]]),
        })
    }

    pub fn to_bytes(&self) -> [u8; NONCE_LENGTH] {
        let mut out = [0u8; NONCE_LENGTH];
        out[..COOKIE_LENGTH].copy_from_slice(&self.cookie);
        out[16] = self.source.get();
        out[17] = self.destination.get();
        out[18..20].copy_from_slice(&self.overflow.to_be_bytes());
        out[20..24].copy_from_slice(&self.sequence.to_be_bytes());
        out
    }

    /// 48-bit counter: `overflow << 32 | sequence`.
    pub fn combined_sequence(&self) -> u64 {
        (u64::from(self.overflow) << 32) | u64::from(self.sequence)
    }

    /// The nonce without its cookie, as carried in a `send-error` id.
    pub fn message_id(&self) -> [u8; NONCE_LENGTH - COOKIE_LENGTH] {
        let bytes = self.to_bytes();
        let mut id = [0u8; NONCE_LENGTH - COOKIE_LENGTH];
        id.copy_from_slice(&bytes[COOKIE_LENGTH..]);
        id
    }
}
