//! Network Specific Facilities Information Element (Q.931 §4.5.21).

use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSpecificFacilities {
    pub network_identification: Vec<u8>,
    pub facility: u8,
}

impl NetworkSpecificFacilities {
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(3 + self.network_identification.len());
        buf.push(self.network_identification.len() as u8);
        buf.push(0x80);
        buf.push(self.facility);
        buf.extend_from_slice(&self.network_identification);
        buf
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        if data.len() < 3 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Network Specific Facilities IE shorter than 3 octets",
            ));
        }
        let id_len = data[0] as usize;
        let facility = data[2];
        let rest = &data[3..];
        let network_identification = rest.get(..id_len).unwrap_or(rest).to_vec();
        Ok(NetworkSpecificFacilities {
            network_identification,
            facility,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let nsf = NetworkSpecificFacilities {
            network_identification: b"CARRIER1".to_vec(),
            facility: 5,
        };
        let back = NetworkSpecificFacilities::unmarshal(&nsf.marshal()).unwrap();
        assert_eq!(back, nsf);
    }
}
