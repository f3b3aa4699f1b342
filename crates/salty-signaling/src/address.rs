/// Relay address space.
///
/// One byte identifies every endpoint on a path: `0x00` is the server,
/// `0x01` the initiator, and `0x02..=0xff` the responders.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SignalingError;

/// Address of an endpoint on a signaling path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(u8);

impl Address {
    pub const SERVER: Address = Address(0x00);
    pub const INITIATOR: Address = Address(0x01);
    pub const RESPONDER_MIN: Address = Address(0x02);
    pub const RESPONDER_MAX: Address = Address(0xff);

    pub const fn new(value: u8) -> Self {
        Address(value)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub fn is_server(self) -> bool {
        self == Self::SERVER
    }

    pub fn is_initiator(self) -> bool {
        self == Self::INITIATOR
    }

    pub fn is_responder(self) -> bool {
        self >= Self::RESPONDER_MIN
    }

    /// Every valid responder address, ascending.
    pub fn responders() -> impl Iterator<Item = Address> {
        (Self::RESPONDER_MIN.0..=Self::RESPONDER_MAX.0).map(Address)
    }
}

impl From<Address> for u8 {
    fn from(addr: Address) -> u8 {
        addr.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Whether `value` names any endpoint (server, initiator or responder).
pub fn is_valid_address(value: i128) -> bool {
    (i128::from(Address::SERVER.0)..=i128::from(Address::RESPONDER_MAX.0)).contains(&value)
}

/// Whether `value` names a responder. Server and initiator are rejected.
pub fn is_valid_responder_address(value: i128) -> bool {
    (i128::from(Address::RESPONDER_MIN.0)..=i128::from(Address::RESPONDER_MAX.0)).contains(&value)
}

/// Check that a client-to-client message may be relayed.
///
/// Only initiator → responder and responder → initiator are relayed;
/// anything addressed to or from the server is handled by the server itself.
pub fn check_relay(source: Address, destination: Address) -> Result<(), SignalingError> {
    let allowed = (source.is_initiator() && destination.is_responder())
        || (source.is_responder() && destination.is_initiator());
    if allowed {
        Ok(())
    } else {
        Err(SignalingError::NotAllowedMessage {
            reason: format!("cannot relay from {source} to {destination}"),
        })
    }
}

/// Check that the source a peer claims matches the address it was assigned.
pub fn check_identity(claimed: Address, assigned: Address) -> Result<(), SignalingError> {
    if claimed == assigned {
        Ok(())
    } else {
        Err(SignalingError::IdentityMismatch {
            claimed,
            expected: assigned,
        })
    }
}
