//! High Layer Compatibility Information Element (Q.931 §4.5.23) — advertises
//! the teleservice a terminal implements (telephony, fax group 2/3, ...).

use std::io;

use super::cause::CodingStandard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighLayerCharacteristics {
    Telephony,
    FaxGroup2Or3,
    FaxGroup4,
    TeletexMixedMode,
    VideotexCcitt,
    Telex,
    MessageHandling,
    OsiApplication,
    Audiovisual,
    Other(u8),
}

impl From<u8> for HighLayerCharacteristics {
    fn from(v: u8) -> Self {
        match v & 0x7f {
            0x01 => HighLayerCharacteristics::Telephony,
            0x04 => HighLayerCharacteristics::FaxGroup2Or3,
            0x21 => HighLayerCharacteristics::FaxGroup4,
            0x24 => HighLayerCharacteristics::TeletexMixedMode,
            0x28 => HighLayerCharacteristics::VideotexCcitt,
            0x31 => HighLayerCharacteristics::Telex,
            0x32 => HighLayerCharacteristics::MessageHandling,
            0x33 => HighLayerCharacteristics::OsiApplication,
            0x38 => HighLayerCharacteristics::Audiovisual,
            other => HighLayerCharacteristics::Other(other),
        }
    }
}

impl From<HighLayerCharacteristics> for u8 {
    fn from(v: HighLayerCharacteristics) -> u8 {
        match v {
            HighLayerCharacteristics::Telephony => 0x01,
            HighLayerCharacteristics::FaxGroup2Or3 => 0x04,
            HighLayerCharacteristics::FaxGroup4 => 0x21,
            HighLayerCharacteristics::TeletexMixedMode => 0x24,
            HighLayerCharacteristics::VideotexCcitt => 0x28,
            HighLayerCharacteristics::Telex => 0x31,
            HighLayerCharacteristics::MessageHandling => 0x32,
            HighLayerCharacteristics::OsiApplication => 0x33,
            HighLayerCharacteristics::Audiovisual => 0x38,
            HighLayerCharacteristics::Other(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighLayerCompatibility {
    pub coding_standard: CodingStandard,
    pub characteristics: HighLayerCharacteristics,
    pub extended_characteristics: Option<u8>,
}

impl HighLayerCompatibility {
    pub fn new(characteristics: HighLayerCharacteristics) -> Self {
        HighLayerCompatibility {
            coding_standard: CodingStandard::Itu,
            characteristics,
            extended_characteristics: None,
        }
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(3);
        buf.push(0x80 | ((self.coding_standard as u8) << 5) | 0b01 << 2);
        buf.push(0x80 | u8::from(self.characteristics));
        if let Some(ext) = self.extended_characteristics {
            buf.push(0x80 | ext);
        }
        buf
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        if data.len() < 2 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "High Layer Compatibility IE shorter than 2 octets",
            ));
        }
        Ok(HighLayerCompatibility {
            coding_standard: CodingStandard::from(data[0]),
            characteristics: HighLayerCharacteristics::from(data[1]),
            extended_characteristics: data.get(2).map(|b| b & 0x7f),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let hlc = HighLayerCompatibility::new(HighLayerCharacteristics::Telephony);
        let back = HighLayerCompatibility::unmarshal(&hlc.marshal()).unwrap();
        assert_eq!(back.characteristics, HighLayerCharacteristics::Telephony);
    }

    #[test]
    fn unknown_characteristics_preserved() {
        let c = HighLayerCharacteristics::from(0x55);
        assert_eq!(c, HighLayerCharacteristics::Other(0x55));
    }
}
