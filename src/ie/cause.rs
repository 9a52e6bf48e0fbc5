//! Cause Information Element (Q.850 cause values, Q.931 §4.5.6).

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CauseValue {
    UnallocatedNumber,
    NoRouteToTransitNetwork,
    NoRouteToDestination,
    ChannelUnacceptable,
    CallAwarded,
    NormalClearing,
    UserBusy,
    NoUserResponding,
    NoAnswerFromUser,
    CallRejected,
    NumberChanged,
    DestinationOutOfOrder,
    InvalidNumberFormat,
    FacilityRejected,
    ResponseToStatusEnquiry,
    NormalUnspecified,
    NoCircuitAvailable,
    NetworkOutOfOrder,
    TemporaryFailure,
    SwitchingEquipmentCongestion,
    AccessInformationDiscarded,
    RequestedChannelNotAvailable,
    ResourceUnavailable,
    QualityOfServiceUnavailable,
    RequestedFacilityNotSubscribed,
    BearerCapabilityNotAuthorized,
    BearerCapabilityNotAvailable,
    ServiceNotAvailable,
    BearerCapabilityNotImplemented,
    ChannelTypeNotImplemented,
    RequestedFacilityNotImplemented,
    OnlyRestrictedDigitalAvailable,
    ServiceNotImplemented,
    InvalidCallReference,
    IdentifiedChannelDoesNotExist,
    IncompatibleDestination,
    InvalidTransitNetworkSelection,
    InvalidMessage,
    MandatoryIeMissing,
    MessageTypeNotImplemented,
    MessageNotCompatibleWithCallState,
    IeNotImplemented,
    InvalidIeContents,
    MessageNotCompatibleWithState,
    RecoveryOnTimerExpiry,
    ProtocolError,
    Interworking,
    Unknown(u8),
}

impl From<u8> for CauseValue {
    fn from(v: u8) -> Self {
        let v = v & 0x7f;
        match v {
            1 => CauseValue::UnallocatedNumber,
            2 => CauseValue::NoRouteToTransitNetwork,
            3 => CauseValue::NoRouteToDestination,
            6 => CauseValue::ChannelUnacceptable,
            7 => CauseValue::CallAwarded,
            16 => CauseValue::NormalClearing,
            17 => CauseValue::UserBusy,
            18 => CauseValue::NoUserResponding,
            19 => CauseValue::NoAnswerFromUser,
            21 => CauseValue::CallRejected,
            22 => CauseValue::NumberChanged,
            27 => CauseValue::DestinationOutOfOrder,
            28 => CauseValue::InvalidNumberFormat,
            29 => CauseValue::FacilityRejected,
            30 => CauseValue::ResponseToStatusEnquiry,
            31 => CauseValue::NormalUnspecified,
            34 => CauseValue::NoCircuitAvailable,
            38 => CauseValue::NetworkOutOfOrder,
            41 => CauseValue::TemporaryFailure,
            42 => CauseValue::SwitchingEquipmentCongestion,
            43 => CauseValue::AccessInformationDiscarded,
            44 => CauseValue::RequestedChannelNotAvailable,
            47 => CauseValue::ResourceUnavailable,
            49 => CauseValue::QualityOfServiceUnavailable,
            50 => CauseValue::RequestedFacilityNotSubscribed,
            57 => CauseValue::BearerCapabilityNotAuthorized,
            58 => CauseValue::BearerCapabilityNotAvailable,
            63 => CauseValue::ServiceNotAvailable,
            65 => CauseValue::BearerCapabilityNotImplemented,
            66 => CauseValue::ChannelTypeNotImplemented,
            69 => CauseValue::RequestedFacilityNotImplemented,
            70 => CauseValue::OnlyRestrictedDigitalAvailable,
            79 => CauseValue::ServiceNotImplemented,
            81 => CauseValue::InvalidCallReference,
            82 => CauseValue::IdentifiedChannelDoesNotExist,
            88 => CauseValue::IncompatibleDestination,
            91 => CauseValue::InvalidTransitNetworkSelection,
            95 => CauseValue::InvalidMessage,
            96 => CauseValue::MandatoryIeMissing,
            97 => CauseValue::MessageTypeNotImplemented,
            98 => CauseValue::MessageNotCompatibleWithCallState,
            99 => CauseValue::IeNotImplemented,
            100 => CauseValue::InvalidIeContents,
            101 => CauseValue::MessageNotCompatibleWithState,
            102 => CauseValue::RecoveryOnTimerExpiry,
            111 => CauseValue::ProtocolError,
            127 => CauseValue::Interworking,
            other => CauseValue::Unknown(other),
        }
    }
}

impl From<CauseValue> for u8 {
    fn from(v: CauseValue) -> u8 {
        match v {
            CauseValue::UnallocatedNumber => 1,
            CauseValue::NoRouteToTransitNetwork => 2,
            CauseValue::NoRouteToDestination => 3,
            CauseValue::ChannelUnacceptable => 6,
            CauseValue::CallAwarded => 7,
            CauseValue::NormalClearing => 16,
            CauseValue::UserBusy => 17,
            CauseValue::NoUserResponding => 18,
            CauseValue::NoAnswerFromUser => 19,
            CauseValue::CallRejected => 21,
            CauseValue::NumberChanged => 22,
            CauseValue::DestinationOutOfOrder => 27,
            CauseValue::InvalidNumberFormat => 28,
            CauseValue::FacilityRejected => 29,
            CauseValue::ResponseToStatusEnquiry => 30,
            CauseValue::NormalUnspecified => 31,
            CauseValue::NoCircuitAvailable => 34,
            CauseValue::NetworkOutOfOrder => 38,
            CauseValue::TemporaryFailure => 41,
            CauseValue::SwitchingEquipmentCongestion => 42,
            CauseValue::AccessInformationDiscarded => 43,
            CauseValue::RequestedChannelNotAvailable => 44,
            CauseValue::ResourceUnavailable => 47,
            CauseValue::QualityOfServiceUnavailable => 49,
            CauseValue::RequestedFacilityNotSubscribed => 50,
            CauseValue::BearerCapabilityNotAuthorized => 57,
            CauseValue::BearerCapabilityNotAvailable => 58,
            CauseValue::ServiceNotAvailable => 63,
            CauseValue::BearerCapabilityNotImplemented => 65,
            CauseValue::ChannelTypeNotImplemented => 66,
            CauseValue::RequestedFacilityNotImplemented => 69,
            CauseValue::OnlyRestrictedDigitalAvailable => 70,
            CauseValue::ServiceNotImplemented => 79,
            CauseValue::InvalidCallReference => 81,
            CauseValue::IdentifiedChannelDoesNotExist => 82,
            CauseValue::IncompatibleDestination => 88,
            CauseValue::InvalidTransitNetworkSelection => 91,
            CauseValue::InvalidMessage => 95,
            CauseValue::MandatoryIeMissing => 96,
            CauseValue::MessageTypeNotImplemented => 97,
            CauseValue::MessageNotCompatibleWithCallState => 98,
            CauseValue::IeNotImplemented => 99,
            CauseValue::InvalidIeContents => 100,
            CauseValue::MessageNotCompatibleWithState => 101,
            CauseValue::RecoveryOnTimerExpiry => 102,
            CauseValue::ProtocolError => 111,
            CauseValue::Interworking => 127,
            CauseValue::Unknown(v) => v,
        }
    }
}

/// Coding standard (octet 3 bits 6-5 of the Cause IE).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CodingStandard {
    Itu = 0b00,
    Iso = 0b01,
    National = 0b10,
    NetworkSpecific = 0b11,
}

impl From<u8> for CodingStandard {
    fn from(v: u8) -> Self {
        match (v >> 5) & 0x03 {
            0b00 => CodingStandard::Itu,
            0b01 => CodingStandard::Iso,
            0b10 => CodingStandard::National,
            _ => CodingStandard::NetworkSpecific,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    pub coding_standard: CodingStandard,
    pub location: u8,
    pub recommendation: Option<u8>,
    pub value: CauseValue,
    pub diagnostics: Vec<u8>,
}

impl Cause {
    pub fn new(value: CauseValue, location: u8) -> Self {
        Cause {
            coding_standard: CodingStandard::Itu,
            location: location & 0x0f,
            recommendation: None,
            value,
            diagnostics: Vec::new(),
        }
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(3 + self.diagnostics.len());
        buf.push(0x80 | ((self.coding_standard as u8) << 5) | self.location);
        if let Some(rec) = self.recommendation {
            buf.push(rec & 0x7f);
        }
        buf.push(0x80 | (u8::from(self.value) & 0x7f));
        buf.extend_from_slice(&self.diagnostics);
        buf
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        if data.len() < 2 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Cause IE shorter than 2 octets",
            ));
        }
        let coding_standard = CodingStandard::from(data[0]);
        let location = data[0] & 0x0f;
        let (recommendation, value_octet_idx) = if data[1] & 0x80 == 0 {
            (Some(data[1] & 0x7f), 2)
        } else {
            (None, 1)
        };
        let value_octet = *data.get(value_octet_idx).ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "Cause IE missing value octet")
        })?;
        Ok(Cause {
            coding_standard,
            location,
            recommendation,
            value: CauseValue::from(value_octet),
            diagnostics: data[value_octet_idx + 1..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_no_recommendation() {
        let cause = Cause::new(CauseValue::NormalClearing, 0);
        let bytes = cause.marshal();
        let back = Cause::unmarshal(&bytes).unwrap();
        assert_eq!(back.value, CauseValue::NormalClearing);
        assert_eq!(back.location, 0);
    }

    #[test]
    fn unknown_value_preserves_octet() {
        assert_eq!(CauseValue::from(5), CauseValue::Unknown(5));
        assert_eq!(u8::from(CauseValue::Unknown(5)), 5);
    }

    #[test]
    fn unmarshal_rejects_empty() {
        assert!(Cause::unmarshal(&[]).is_err());
    }
}
