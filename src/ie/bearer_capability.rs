//! Bearer Capability Information Element (Q.931 §4.5.5) — declares the
//! transport characteristics (speech, 64k unrestricted digital, ...) a
//! SETUP requests from the network. The single IE most call-admission
//! logic inspects first.

use std::io;

use super::cause::CodingStandard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InformationTransferCapability {
    Speech,
    UnrestrictedDigital,
    RestrictedDigital,
    Audio3100Hz,
    UnrestrictedWithTones,
    Video,
    Other(u8),
}

impl From<u8> for InformationTransferCapability {
    fn from(v: u8) -> Self {
        match v & 0x1f {
            0b00000 => InformationTransferCapability::Speech,
            0b01000 => InformationTransferCapability::UnrestrictedDigital,
            0b01001 => InformationTransferCapability::RestrictedDigital,
            0b10000 => InformationTransferCapability::Audio3100Hz,
            0b10001 => InformationTransferCapability::UnrestrictedWithTones,
            0b11000 => InformationTransferCapability::Video,
            other => InformationTransferCapability::Other(other),
        }
    }
}

impl From<InformationTransferCapability> for u8 {
    fn from(v: InformationTransferCapability) -> u8 {
        match v {
            InformationTransferCapability::Speech => 0b00000,
            InformationTransferCapability::UnrestrictedDigital => 0b01000,
            InformationTransferCapability::RestrictedDigital => 0b01001,
            InformationTransferCapability::Audio3100Hz => 0b10000,
            InformationTransferCapability::UnrestrictedWithTones => 0b10001,
            InformationTransferCapability::Video => 0b11000,
            InformationTransferCapability::Other(v) => v & 0x1f,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Circuit,
    Packet,
}

impl From<u8> for TransferMode {
    fn from(v: u8) -> Self {
        if (v >> 5) & 0x03 == 0b10 {
            TransferMode::Packet
        } else {
            TransferMode::Circuit
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferRate {
    Packet,
    K64,
    TwoK64,
    K384,
    K1536,
    K1920,
    Multirate,
    Other(u8),
}

impl From<u8> for TransferRate {
    fn from(v: u8) -> Self {
        match v & 0x1f {
            0b00000 => TransferRate::Packet,
            0b10000 => TransferRate::K64,
            0b10001 => TransferRate::TwoK64,
            0b10011 => TransferRate::K384,
            0b10101 => TransferRate::K1536,
            0b10111 => TransferRate::K1920,
            0b11000 => TransferRate::Multirate,
            other => TransferRate::Other(other),
        }
    }
}

impl From<TransferRate> for u8 {
    fn from(v: TransferRate) -> u8 {
        match v {
            TransferRate::Packet => 0b00000,
            TransferRate::K64 => 0b10000,
            TransferRate::TwoK64 => 0b10001,
            TransferRate::K384 => 0b10011,
            TransferRate::K1536 => 0b10101,
            TransferRate::K1920 => 0b10111,
            TransferRate::Multirate => 0b11000,
            TransferRate::Other(v) => v & 0x1f,
        }
    }
}

/// Layer 1 user protocol (octet 5, present only for 64k/speech-class
/// calls). `None` covers transfer capabilities where octet 5 is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer1Protocol {
    G711Mulaw,
    G711Alaw,
    Other(u8),
}

impl From<u8> for Layer1Protocol {
    fn from(v: u8) -> Self {
        match v & 0x1f {
            0b00010 => Layer1Protocol::G711Mulaw,
            0b00011 => Layer1Protocol::G711Alaw,
            other => Layer1Protocol::Other(other),
        }
    }
}

impl From<Layer1Protocol> for u8 {
    fn from(v: Layer1Protocol) -> u8 {
        match v {
            Layer1Protocol::G711Mulaw => 0b00010,
            Layer1Protocol::G711Alaw => 0b00011,
            Layer1Protocol::Other(v) => v & 0x1f,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerCapability {
    pub coding_standard: CodingStandard,
    pub transfer_capability: InformationTransferCapability,
    pub transfer_mode: TransferMode,
    pub transfer_rate: TransferRate,
    pub layer1_protocol: Option<Layer1Protocol>,
}

impl BearerCapability {
    pub fn speech(layer1: Layer1Protocol) -> Self {
        BearerCapability {
            coding_standard: CodingStandard::Itu,
            transfer_capability: InformationTransferCapability::Speech,
            transfer_mode: TransferMode::Circuit,
            transfer_rate: TransferRate::K64,
            layer1_protocol: Some(layer1),
        }
    }

    pub fn unrestricted_digital() -> Self {
        BearerCapability {
            coding_standard: CodingStandard::Itu,
            transfer_capability: InformationTransferCapability::UnrestrictedDigital,
            transfer_mode: TransferMode::Circuit,
            transfer_rate: TransferRate::K64,
            layer1_protocol: None,
        }
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(3);
        buf.push(0x80 | ((self.coding_standard as u8) << 5) | u8::from(self.transfer_capability));
        let transfer_mode_bits = match self.transfer_mode {
            TransferMode::Circuit => 0b00,
            TransferMode::Packet => 0b10,
        };
        buf.push(0x80 | (transfer_mode_bits << 5) | u8::from(self.transfer_rate));
        if let Some(l1) = self.layer1_protocol {
            buf.push(0x80 | 0b001 << 4 | u8::from(l1));
        }
        buf
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        if data.len() < 2 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Bearer Capability IE shorter than 2 octets",
            ));
        }
        Ok(BearerCapability {
            coding_standard: CodingStandard::from(data[0]),
            transfer_capability: InformationTransferCapability::from(data[0]),
            transfer_mode: TransferMode::from(data[1]),
            transfer_rate: TransferRate::from(data[1]),
            layer1_protocol: data.get(2).map(|b| Layer1Protocol::from(*b)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speech_roundtrips() {
        let bc = BearerCapability::speech(Layer1Protocol::G711Alaw);
        let back = BearerCapability::unmarshal(&bc.marshal()).unwrap();
        assert_eq!(back, bc);
    }

    #[test]
    fn unrestricted_digital_has_no_layer1_octet() {
        let bc = BearerCapability::unrestricted_digital();
        let bytes = bc.marshal();
        assert_eq!(bytes.len(), 2);
        let back = BearerCapability::unmarshal(&bytes).unwrap();
        assert!(back.layer1_protocol.is_none());
    }
}
