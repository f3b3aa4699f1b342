use std::fmt;

/// Close codes used on the signaling channel and as `drop-responder` reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseCode {
    GoingAway = 1001,
    SubprotocolError = 1002,
    PathFull = 3000,
    ProtocolError = 3001,
    InternalError = 3002,
    Handover = 3003,
    DroppedByInitiator = 3004,
    InitiatorCouldNotDecrypt = 3005,
    NoSharedTask = 3006,
    InvalidKey = 3007,
    Timeout = 3008,
}

impl CloseCode {
    pub const ALL: [CloseCode; 11] = [
        CloseCode::GoingAway,
        CloseCode::SubprotocolError,
        CloseCode::PathFull,
        CloseCode::ProtocolError,
        CloseCode::InternalError,
        CloseCode::Handover,
        CloseCode::DroppedByInitiator,
        CloseCode::InitiatorCouldNotDecrypt,
        CloseCode::NoSharedTask,
        CloseCode::InvalidKey,
        CloseCode::Timeout,
    ];

    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: i128) -> Option<CloseCode> {
        CloseCode::ALL.into_iter().find(|c| i128::from(c.code()) == code)
    }

    /// Whether a peer may send this code as a reason.
    pub fn is_valid_reason(self) -> bool {
        is_valid_reason_code(i128::from(self.code()))
    }

    pub fn description(self) -> &'static str {
        match self {
            CloseCode::GoingAway => "going away",
            CloseCode::SubprotocolError => "subprotocol error",
            CloseCode::PathFull => "path full",
            CloseCode::ProtocolError => "protocol error",
            CloseCode::InternalError => "internal error",
            CloseCode::Handover => "handover of the signaling channel",
            CloseCode::DroppedByInitiator => "dropped by initiator",
            CloseCode::InitiatorCouldNotDecrypt => "initiator could not decrypt",
            CloseCode::NoSharedTask => "no shared task found",
            CloseCode::InvalidKey => "invalid key",
            CloseCode::Timeout => "timeout",
        }
    }
}

impl fmt::Display for CloseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}

/// Standalone reason codes outside the protocol-error range.
const STANDALONE_REASONS: [CloseCode; 2] = [CloseCode::GoingAway, CloseCode::SubprotocolError];

/// Whether `code` is acceptable as a peer-supplied close reason:
/// a standalone code, or within `PathFull..=InvalidKey`.
pub fn is_valid_reason_code(code: i128) -> bool {
    let in_range = (i128::from(CloseCode::PathFull.code())
        ..=i128::from(CloseCode::InvalidKey.code()))
        .contains(&code);
    in_range || STANDALONE_REASONS
        .iter()
        .any(|c| i128::from(c.code()) == code)
}
