//! Information Elements for Q.931/Q.932 messages.
//!
//! Unlike PFCP's uniform 4-byte TLV header, Q.931 IEs come in two shapes
//! (Q.931 §4.5): *single-octet* IEs where the identifier and its one-bit
//! value share octet 1 and there is no length byte (top bit of the
//! identifier octet set), and *variable-length* IEs with an identifier
//! octet, a length octet, then `length` bytes of content. [`Ie`] models
//! both; [`IeType`] carries the 7-bit identifier.

use std::io;

pub mod bearer_capability;
pub mod call_identity;
pub mod call_state;
pub mod called_party_number;
pub mod called_party_subaddress;
pub mod calling_party_number;
pub mod calling_party_subaddress;
pub mod cause;
pub mod change_status;
pub mod channel_identification;
pub mod congestion_level;
pub mod datetime;
pub mod display;
pub mod facility;
pub mod high_layer_compatibility;
pub mod keypad_facility;
pub mod low_layer_compatibility;
pub mod network_specific_facilities;
pub mod notification_indicator;
pub mod progress_indicator;
pub mod repeat_indicator;
pub mod restart_indicator;
pub mod segmented_message;
pub mod signal;
pub mod transit_network_selection;
pub mod user_user;

/// The 7-bit Q.931 IE identifier (octet 1, bits 1-7; bit 8 marks single-octet
/// format and is stripped before this enum sees the value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IeType {
    SegmentedMessage,
    ChangeStatus,
    BearerCapability,
    Cause,
    CallIdentity,
    CallState,
    ChannelIdentification,
    Facility,
    ProgressIndicator,
    NetworkSpecificFacilities,
    NotificationIndicator,
    Display,
    DateTime,
    KeypadFacility,
    Signal,
    ConnectedNumber,
    CallingPartyNumber,
    CallingPartySubaddress,
    CalledPartyNumber,
    CalledPartySubaddress,
    RedirectingNumber,
    TransitNetworkSelection,
    RestartIndicator,
    LowLayerCompatibility,
    HighLayerCompatibility,
    UserUser,
    Other(u8),
}

impl From<u8> for IeType {
    fn from(v: u8) -> Self {
        let id = v & 0x7f;
        match id {
            0x00 => IeType::SegmentedMessage,
            0x01 => IeType::ChangeStatus,
            0x04 => IeType::BearerCapability,
            0x08 => IeType::Cause,
            0x10 => IeType::CallIdentity,
            0x14 => IeType::CallState,
            0x18 => IeType::ChannelIdentification,
            0x1c => IeType::Facility,
            0x1e => IeType::ProgressIndicator,
            0x20 => IeType::NetworkSpecificFacilities,
            0x27 => IeType::NotificationIndicator,
            0x28 => IeType::Display,
            0x29 => IeType::DateTime,
            0x2c => IeType::KeypadFacility,
            0x34 => IeType::Signal,
            0x4c => IeType::ConnectedNumber,
            0x6c => IeType::CallingPartyNumber,
            0x6d => IeType::CallingPartySubaddress,
            0x70 => IeType::CalledPartyNumber,
            0x71 => IeType::CalledPartySubaddress,
            0x74 => IeType::RedirectingNumber,
            0x78 => IeType::TransitNetworkSelection,
            0x79 => IeType::RestartIndicator,
            0x7c => IeType::LowLayerCompatibility,
            0x7d => IeType::HighLayerCompatibility,
            0x7e => IeType::UserUser,
            other => IeType::Other(other),
        }
    }
}

impl IeType {
    /// The raw identifier octet value (7 bits, without the single-octet marker).
    pub fn id(&self) -> u8 {
        match self {
            IeType::SegmentedMessage => 0x00,
            IeType::ChangeStatus => 0x01,
            IeType::BearerCapability => 0x04,
            IeType::Cause => 0x08,
            IeType::CallIdentity => 0x10,
            IeType::CallState => 0x14,
            IeType::ChannelIdentification => 0x18,
            IeType::Facility => 0x1c,
            IeType::ProgressIndicator => 0x1e,
            IeType::NetworkSpecificFacilities => 0x20,
            IeType::NotificationIndicator => 0x27,
            IeType::Display => 0x28,
            IeType::DateTime => 0x29,
            IeType::KeypadFacility => 0x2c,
            IeType::Signal => 0x34,
            IeType::ConnectedNumber => 0x4c,
            IeType::CallingPartyNumber => 0x6c,
            IeType::CallingPartySubaddress => 0x6d,
            IeType::CalledPartyNumber => 0x70,
            IeType::CalledPartySubaddress => 0x71,
            IeType::RedirectingNumber => 0x74,
            IeType::TransitNetworkSelection => 0x78,
            IeType::RestartIndicator => 0x79,
            IeType::LowLayerCompatibility => 0x7c,
            IeType::HighLayerCompatibility => 0x7d,
            IeType::UserUser => 0x7e,
            IeType::Other(v) => *v,
        }
    }
}

/// One identifier octet with no length byte and no content: codeset shift,
/// "more data", "sending complete", congestion level and repeat indicator
/// (Q.931 §4.5.1). The one bit of content, if any, lives in the low nibble
/// of the identifier octet itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleOctetIe {
    pub id: u8,
}

impl SingleOctetIe {
    pub const SHIFT: u8 = 0x90;
    pub const MORE_DATA: u8 = 0xa0;
    pub const SENDING_COMPLETE: u8 = 0xa1;
    pub const CONGESTION_LEVEL: u8 = 0xb0;
    pub const REPEAT_INDICATOR: u8 = 0xd0;

    pub fn marshal(&self) -> [u8; 1] {
        [self.id]
    }
}

/// A variable-length IE's identifier, length and raw content bytes, still
/// opaque to any particular field layout. Per-IE modules parse `content`
/// further into typed structs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ie {
    pub ie_type: IeType,
    pub content: Vec<u8>,
}

impl Ie {
    pub fn new(ie_type: IeType, content: Vec<u8>) -> Self {
        Ie { ie_type, content }
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(2 + self.content.len());
        self.marshal_into(&mut buf);
        buf
    }

    pub fn marshal_into(&self, buf: &mut Vec<u8>) {
        buf.push(self.ie_type.id() & 0x7f);
        buf.push(self.content.len() as u8);
        buf.extend_from_slice(&self.content);
    }

    /// Parses one variable-length IE from the front of `b`, returning the
    /// IE and the number of bytes consumed.
    pub fn unmarshal(b: &[u8]) -> Result<(Self, usize), io::Error> {
        if b.len() < 2 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "IE header truncated",
            ));
        }
        let ie_type = IeType::from(b[0]);
        let len = b[1] as usize;
        if b.len() < 2 + len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("IE {ie_type:?} declares length {len} past end of message"),
            ));
        }
        let content = b[2..2 + len].to_vec();
        Ok((Ie { ie_type, content }, 2 + len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_generic_ie() {
        let ie = Ie::new(IeType::Display, b"hello".to_vec());
        let bytes = ie.marshal();
        assert_eq!(bytes, [0x28, 5, b'h', b'e', b'l', b'l', b'o']);
        let (parsed, consumed) = Ie::unmarshal(&bytes).unwrap();
        assert_eq!(parsed, ie);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn unmarshal_rejects_truncated_content() {
        let bytes = [0x08u8, 5, 1, 2];
        assert!(Ie::unmarshal(&bytes).is_err());
    }

    #[test]
    fn ie_type_other_roundtrips_unknown_id() {
        let t = IeType::from(0x55);
        assert_eq!(t, IeType::Other(0x55));
        assert_eq!(t.id(), 0x55);
    }

    #[test]
    fn ie_type_masks_single_octet_marker_bit() {
        // Some captures carry the ext bit set even on variable IEs; the
        // low 7 bits are what select the type.
        assert_eq!(IeType::from(0x88), IeType::Cause);
    }
}
