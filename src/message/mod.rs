//! Q.931/Q.932 message codec.
//!
//! A Q.931 message is a fixed 3-4 byte header (protocol discriminator, CRV
//! length/flag/value, message type) followed by a sequence of information
//! elements in the fixed order Annex A prescribes. Unlike PFCP there are no
//! nested/grouped IEs, so one [`Generic`] body, not thirty near-identical
//! per-message-type wrapper structs, carries every message type — the same
//! role the teacher crate's own `Generic` plays for PFCP message types it
//! has not grown a dedicated struct for.

use std::io;

use crate::error::Q931Error;
use crate::ie::{Ie, IeType};
use crate::types::Crv;

pub mod header;
pub mod generic;

pub use generic::Generic;
pub use header::Header;

/// Every message type this engine parses, spanning Q.931 call control and
/// the Q.932 supplementary-service/maintenance extensions. 5ESS overloads
/// `0x07`/`0x0f` for SERVICE/SERVICE_ACKNOWLEDGE instead of
/// CONNECT/CONNECT_ACKNOWLEDGE; see `dialect` for how that ambiguity is
/// resolved per-trunk rather than globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsgType {
    Alerting,
    CallProceeding,
    Connect,
    ConnectAcknowledge,
    Progress,
    Setup,
    SetupAcknowledge,
    Resume,
    ResumeAcknowledge,
    ResumeReject,
    Suspend,
    SuspendAcknowledge,
    SuspendReject,
    UserInformation,
    Disconnect,
    Release,
    ReleaseComplete,
    Restart,
    RestartAcknowledge,
    CongestionControl,
    Information,
    Notify,
    Segment,
    Status,
    StatusEnquiry,
    Service,
    ServiceAcknowledge,
    Facility,
    Hold,
    HoldAcknowledge,
    HoldReject,
    Retrieve,
    RetrieveAcknowledge,
    RetrieveReject,
    Other(u8),
}

impl MsgType {
    /// The generic Q.931 wire value (before any dialect-specific remap).
    pub fn code(&self) -> u8 {
        match self {
            MsgType::Alerting => 0x01,
            MsgType::CallProceeding => 0x02,
            MsgType::Progress => 0x03,
            MsgType::Setup => 0x05,
            MsgType::Connect => 0x07,
            MsgType::SetupAcknowledge => 0x0d,
            MsgType::ConnectAcknowledge => 0x0f,
            MsgType::UserInformation => 0x20,
            MsgType::SuspendReject => 0x21,
            MsgType::ResumeReject => 0x22,
            MsgType::Suspend => 0x25,
            MsgType::Resume => 0x26,
            MsgType::SuspendAcknowledge => 0x2d,
            MsgType::ResumeAcknowledge => 0x2e,
            MsgType::Segment => 0x60,
            MsgType::Disconnect => 0x45,
            MsgType::Restart => 0x46,
            MsgType::RestartAcknowledge => 0x4e,
            MsgType::Release => 0x4d,
            MsgType::ReleaseComplete => 0x5a,
            MsgType::Notify => 0x6e,
            MsgType::StatusEnquiry => 0x75,
            MsgType::CongestionControl => 0x79,
            MsgType::Information => 0x7b,
            MsgType::Status => 0x7d,
            MsgType::Facility => 0x62,
            MsgType::Hold => 0x24,
            MsgType::HoldAcknowledge => 0x28,
            MsgType::HoldReject => 0x29,
            MsgType::Retrieve => 0x31,
            MsgType::RetrieveAcknowledge => 0x32,
            MsgType::RetrieveReject => 0x33,
            // Generic code; dialect tables pick the real one for these two.
            MsgType::Service => 0x0f,
            MsgType::ServiceAcknowledge => 0x07,
            MsgType::Other(v) => *v,
        }
    }

    pub fn from_code(v: u8) -> Self {
        Self::from_code_with_pd(v, crate::message::header::PROTOCOL_DISCRIMINATOR)
    }

    /// Resolves a wire message-type octet against the protocol
    /// discriminator it arrived under, so 5ESS's overloaded `0x07`/`0x0f`
    /// decode as SERVICE/SERVICE_ACKNOWLEDGE under the maintenance PD
    /// instead of CONNECT/CONNECT_ACKNOWLEDGE (spec.md §4.2).
    pub fn from_code_with_pd(v: u8, pd: u8) -> Self {
        if pd == crate::message::header::MAINTENANCE_DISCRIMINATOR {
            match v {
                0x07 => return MsgType::ServiceAcknowledge,
                0x0f => return MsgType::Service,
                _ => {}
            }
        }
        match v {
            0x01 => MsgType::Alerting,
            0x02 => MsgType::CallProceeding,
            0x03 => MsgType::Progress,
            0x05 => MsgType::Setup,
            0x07 => MsgType::Connect,
            0x0d => MsgType::SetupAcknowledge,
            0x0f => MsgType::ConnectAcknowledge,
            0x20 => MsgType::UserInformation,
            0x21 => MsgType::SuspendReject,
            0x22 => MsgType::ResumeReject,
            0x24 => MsgType::Hold,
            0x25 => MsgType::Suspend,
            0x26 => MsgType::Resume,
            0x28 => MsgType::HoldAcknowledge,
            0x29 => MsgType::HoldReject,
            0x2d => MsgType::SuspendAcknowledge,
            0x2e => MsgType::ResumeAcknowledge,
            0x31 => MsgType::Retrieve,
            0x32 => MsgType::RetrieveAcknowledge,
            0x33 => MsgType::RetrieveReject,
            0x45 => MsgType::Disconnect,
            0x46 => MsgType::Restart,
            0x4d => MsgType::Release,
            0x4e => MsgType::RestartAcknowledge,
            0x5a => MsgType::ReleaseComplete,
            0x60 => MsgType::Segment,
            0x62 => MsgType::Facility,
            0x6e => MsgType::Notify,
            0x75 => MsgType::StatusEnquiry,
            0x79 => MsgType::CongestionControl,
            0x7b => MsgType::Information,
            0x7d => MsgType::Status,
            other => MsgType::Other(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MsgType::Alerting => "ALERTING",
            MsgType::CallProceeding => "CALL PROCEEDING",
            MsgType::Connect => "CONNECT",
            MsgType::ConnectAcknowledge => "CONNECT ACKNOWLEDGE",
            MsgType::Progress => "PROGRESS",
            MsgType::Setup => "SETUP",
            MsgType::SetupAcknowledge => "SETUP ACKNOWLEDGE",
            MsgType::Resume => "RESUME",
            MsgType::ResumeAcknowledge => "RESUME ACKNOWLEDGE",
            MsgType::ResumeReject => "RESUME REJECT",
            MsgType::Suspend => "SUSPEND",
            MsgType::SuspendAcknowledge => "SUSPEND ACKNOWLEDGE",
            MsgType::SuspendReject => "SUSPEND REJECT",
            MsgType::UserInformation => "USER INFORMATION",
            MsgType::Disconnect => "DISCONNECT",
            MsgType::Release => "RELEASE",
            MsgType::ReleaseComplete => "RELEASE COMPLETE",
            MsgType::Restart => "RESTART",
            MsgType::RestartAcknowledge => "RESTART ACKNOWLEDGE",
            MsgType::CongestionControl => "CONGESTION CONTROL",
            MsgType::Information => "INFORMATION",
            MsgType::Notify => "NOTIFY",
            MsgType::Segment => "SEGMENT",
            MsgType::Status => "STATUS",
            MsgType::StatusEnquiry => "STATUS ENQUIRY",
            MsgType::Service => "SERVICE",
            MsgType::ServiceAcknowledge => "SERVICE ACKNOWLEDGE",
            MsgType::Facility => "FACILITY",
            MsgType::Hold => "HOLD",
            MsgType::HoldAcknowledge => "HOLD ACKNOWLEDGE",
            MsgType::HoldReject => "HOLD REJECT",
            MsgType::Retrieve => "RETRIEVE",
            MsgType::RetrieveAcknowledge => "RETRIEVE ACKNOWLEDGE",
            MsgType::RetrieveReject => "RETRIEVE REJECT",
            MsgType::Other(_) => "UNKNOWN",
        }
    }
}

/// Behaviour shared by every decoded Q.931 message. The teacher crate's
/// `Message` trait plays the same role for PFCP; here there is a single
/// implementor ([`Generic`]) rather than one per message type, since every
/// Q.931 body is "header plus an ordered bag of IEs" with no grouping.
pub trait Message {
    fn header(&self) -> &Header;
    fn msg_type(&self) -> MsgType {
        self.header().msg_type
    }
    fn msg_name(&self) -> &'static str {
        self.msg_type().name()
    }
    fn crv(&self) -> Crv {
        self.header().crv
    }
    fn ies(&self) -> &[Ie];
    fn find_ie(&self, ie_type: IeType) -> Option<&Ie> {
        self.ies().iter().find(|ie| ie.ie_type == ie_type)
    }
    fn marshal(&self) -> Vec<u8>;
}

/// Parses a complete Q.931 message (header + IE sequence) from `b`.
pub fn parse(b: &[u8]) -> Result<Generic, Q931Error> {
    Generic::unmarshal(b)
}

impl From<io::Error> for Q931Error {
    fn from(e: io::Error) -> Self {
        Q931Error::IllegalMessage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msg_type_code_roundtrips() {
        for mt in [
            MsgType::Setup,
            MsgType::Alerting,
            MsgType::Connect,
            MsgType::Disconnect,
            MsgType::Release,
            MsgType::ReleaseComplete,
            MsgType::Status,
            MsgType::Facility,
        ] {
            assert_eq!(MsgType::from_code(mt.code()), mt);
        }
    }

    #[test]
    fn unknown_code_preserved() {
        assert_eq!(MsgType::from_code(0x13), MsgType::Other(0x13));
    }
}
