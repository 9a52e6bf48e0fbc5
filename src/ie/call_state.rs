//! Call State Information Element (Q.931 §4.5.4) — reports the sender's
//! U/N-state number, used by STATUS to resync a peer after a timeout.

use std::io;

use super::cause::CodingStandard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallState {
    pub coding_standard: CodingStandard,
    pub value: u8,
}

impl CallState {
    pub fn new(value: u8) -> Self {
        CallState {
            coding_standard: CodingStandard::Itu,
            value: value & 0x3f,
        }
    }

    pub fn marshal(&self) -> [u8; 1] {
        [((self.coding_standard as u8) << 5) | (self.value & 0x3f)]
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        let octet = *data
            .first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "Call State IE empty"))?;
        Ok(CallState {
            coding_standard: CodingStandard::from(octet),
            value: octet & 0x3f,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let cs = CallState::new(9);
        let back = CallState::unmarshal(&cs.marshal()).unwrap();
        assert_eq!(back.value, 9);
    }
}
