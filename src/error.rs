//! Error taxonomy for the Q.931 engine.
//!
//! Mirrors the `q931_error_t` enumeration of the original C stack
//! (`Q931E_UNKNOWN_MESSAGE`, `Q931E_ILLEGAL_IE`, ...) but as a real Rust
//! enum with context carried in each variant instead of a bare error code
//! reported through an out-of-band callback argument.

use std::fmt;

use crate::ie::IeType;
use crate::message::MsgType;
use crate::types::Crv;

/// Every way a codec, handler or trunk operation can fail.
///
/// Variants are grouped the way spec.md §7 groups them: structural (bad
/// wire bytes), state (legal bytes, illegal context), and integration
/// (host-side misconfiguration).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Q931Error {
    // -- structural --
    /// Message type octet is not registered for this dialect.
    UnknownMessage(u8),
    /// An IE appeared that is not on the whitelist for this message type.
    IllegalIe { ie: IeType, msg: MsgType },
    /// IE identifier has no codec registered for this dialect.
    UnknownIe(u16),
    /// Bearer Capability failed a field constraint (e.g. bad rate/octet 4.1 combination).
    BearerCap(String),
    /// High-Layer Compatibility failed a field constraint.
    HlComp(String),
    /// Low-Layer Compatibility failed a field constraint.
    LlComp(String),
    /// Segmented message support was not compiled/configured in.
    Segment,
    /// Generic decode failure naming the offending IE, its offset and the reason.
    IeDecode {
        ie: IeType,
        offset: usize,
        reason: String,
    },

    // -- state --
    /// Message is well-formed but illegal in the call's current state.
    UnexpectedMessage { state: u16, msg: MsgType },
    /// Header failed to parse (too short, bad length field, ...).
    IllegalMessage(String),
    /// CRV does not name an in-use call.
    InvalidCrv(Crv),
    /// Call table has no free slot.
    TooManyCalls,
    /// Call State IE content disagrees with the call's tracked state.
    CallState(String),
    /// Requested B-channel (exclusive Channel-ID, or "any" with none free)
    /// cannot be granted.
    ChannelUnacceptable,

    // -- integration --
    /// A required transmit/log/time callback was never registered.
    MissingCallback(&'static str),
    /// An invariant the engine relies on was violated; always a bug.
    Internal(String),
}

impl fmt::Display for Q931Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Q931Error::UnknownMessage(code) => {
                write!(f, "unknown message type 0x{code:02x}")
            }
            Q931Error::IllegalIe { ie, msg } => {
                write!(f, "IE {ie:?} is not permitted in message {msg:?}")
            }
            Q931Error::UnknownIe(id) => write!(f, "no codec registered for IE id 0x{id:02x}"),
            Q931Error::BearerCap(reason) => write!(f, "invalid Bearer Capability: {reason}"),
            Q931Error::HlComp(reason) => write!(f, "invalid High-Layer Compatibility: {reason}"),
            Q931Error::LlComp(reason) => write!(f, "invalid Low-Layer Compatibility: {reason}"),
            Q931Error::Segment => write!(f, "segmented messages are not supported"),
            Q931Error::IeDecode { ie, offset, reason } => {
                write!(f, "{ie:?} at offset {offset}: {reason}")
            }
            Q931Error::UnexpectedMessage { state, msg } => write!(
                f,
                "message {msg:?} not compatible with call state {state}"
            ),
            Q931Error::IllegalMessage(reason) => write!(f, "malformed message header: {reason}"),
            Q931Error::InvalidCrv(crv) => write!(f, "no call with CRV {crv}"),
            Q931Error::TooManyCalls => write!(f, "call table is full"),
            Q931Error::CallState(reason) => write!(f, "inconsistent call state: {reason}"),
            Q931Error::ChannelUnacceptable => write!(f, "requested B-channel is unacceptable"),
            Q931Error::MissingCallback(which) => write!(f, "no {which} callback registered"),
            Q931Error::Internal(reason) => write!(f, "internal invariant violation: {reason}"),
        }
    }
}

impl std::error::Error for Q931Error {}

impl Q931Error {
    /// The Q.931 cause value (Q.931 §4.5.17) that best represents this
    /// error when the engine must synthesize a DISCONNECT or RELEASE.
    ///
    /// Matches the propagation policy in spec.md §7: "too-many-calls ->
    /// cause 42 ... invalid-crv -> cause 81".
    pub fn as_cause_value(&self) -> u8 {
        match self {
            Q931Error::TooManyCalls => 42, // switching equipment congestion
            Q931Error::InvalidCrv(_) => 81, // invalid call reference value
            Q931Error::ChannelUnacceptable => 6, // channel unacceptable
            Q931Error::UnexpectedMessage { .. } => 101, // message not compatible with call state
            Q931Error::UnknownMessage(_) => 97, // message type not implemented
            Q931Error::IllegalIe { .. } | Q931Error::UnknownIe(_) => 99, // IE not implemented
            _ => 41, // temporary failure
        }
    }
}

pub type Result<T> = std::result::Result<T, Q931Error>;
