//! Repeat Indicator — single-octet IE (identifier octet `0xd0`, Q.931
//! §4.5.28) prefixing a repeated group of IEs (e.g. multiple Bearer
//! Capability alternatives) to say how the repetition should be resolved.

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatIndication {
    PrioritizedList,
    Other(u8),
}

impl From<u8> for RepeatIndication {
    fn from(v: u8) -> Self {
        match v & 0x0f {
            0b0010 => RepeatIndication::PrioritizedList,
            other => RepeatIndication::Other(other),
        }
    }
}

impl From<RepeatIndication> for u8 {
    fn from(v: RepeatIndication) -> u8 {
        match v {
            RepeatIndication::PrioritizedList => 0b0010,
            RepeatIndication::Other(v) => v & 0x0f,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatIndicator {
    pub indication: RepeatIndication,
}

impl RepeatIndicator {
    pub fn new(indication: RepeatIndication) -> Self {
        RepeatIndicator { indication }
    }

    /// The single identifier octet as it appears on the wire.
    pub fn marshal(&self) -> u8 {
        super::SingleOctetIe::REPEAT_INDICATOR | u8::from(self.indication)
    }

    pub fn unmarshal(octet: u8) -> Result<Self, io::Error> {
        Ok(RepeatIndicator {
            indication: RepeatIndication::from(octet),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let ri = RepeatIndicator::new(RepeatIndication::PrioritizedList);
        let back = RepeatIndicator::unmarshal(ri.marshal()).unwrap();
        assert_eq!(back, ri);
    }
}
