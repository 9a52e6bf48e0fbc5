//! Low Layer Compatibility Information Element (Q.931 §4.5.24).
//!
//! Shares the same octet-3/4/5 fields as Bearer Capability (information
//! transfer capability, transfer mode, rate) with additional layer 2/3
//! protocol negotiation octets; modeled independently since the two IEs
//! serve different roles (BC selects the bearer, LLC advertises
//! end-to-end terminal compatibility) and a caller should not be able to
//! swap one for the other at a call site.

use std::io;

use super::bearer_capability::{InformationTransferCapability, TransferMode};
use super::cause::CodingStandard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowLayerCompatibility {
    pub coding_standard: CodingStandard,
    pub transfer_capability: InformationTransferCapability,
    pub transfer_mode: TransferMode,
    /// Remaining raw octets (layer 1/2/3 protocol negotiation); carried
    /// opaquely since interop rarely inspects them past the header.
    pub tail: Vec<u8>,
}

impl LowLayerCompatibility {
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(2 + self.tail.len());
        buf.push(0x80 | ((self.coding_standard as u8) << 5) | u8::from(self.transfer_capability));
        buf.push(0x80 | ((self.transfer_mode as u8) << 5));
        buf.extend_from_slice(&self.tail);
        buf
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        if data.len() < 2 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Low Layer Compatibility IE shorter than 2 octets",
            ));
        }
        Ok(LowLayerCompatibility {
            coding_standard: CodingStandard::from(data[0]),
            transfer_capability: InformationTransferCapability::from(data[0]),
            transfer_mode: TransferMode::from(data[1]),
            tail: data[2..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let llc = LowLayerCompatibility {
            coding_standard: CodingStandard::Itu,
            transfer_capability: InformationTransferCapability::UnrestrictedDigital,
            transfer_mode: TransferMode::Circuit,
            tail: vec![0x81, 0x82],
        };
        let back = LowLayerCompatibility::unmarshal(&llc.marshal()).unwrap();
        assert_eq!(back, llc);
    }
}
