//! Transit Network Selection Information Element (Q.931 §4.5.33).

use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitNetworkSelection {
    pub network_identification_type: u8,
    pub network_identification_plan: u8,
    pub network_id: String,
}

impl TransitNetworkSelection {
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.network_id.len());
        buf.push(
            0x80 | ((self.network_identification_type & 0x07) << 4)
                | (self.network_identification_plan & 0x0f),
        );
        buf.extend_from_slice(self.network_id.as_bytes());
        buf
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        let octet = *data.first().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Transit Network Selection IE empty",
            )
        })?;
        Ok(TransitNetworkSelection {
            network_identification_type: (octet >> 4) & 0x07,
            network_identification_plan: octet & 0x0f,
            network_id: String::from_utf8_lossy(&data[1..]).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let t = TransitNetworkSelection {
            network_identification_type: 2,
            network_identification_plan: 1,
            network_id: "0123".to_string(),
        };
        let back = TransitNetworkSelection::unmarshal(&t.marshal()).unwrap();
        assert_eq!(back, t);
    }
}
