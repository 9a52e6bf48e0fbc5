//! User-User Information Element (Q.931 §4.5.34) — opaque application
//! data passed end-to-end between terminals, untouched by the switch.

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolDiscriminator {
    Ia5,
    X244,
    Iso8208,
    X25,
    NationalUse,
    UserSpecific,
    Other(u8),
}

impl From<u8> for ProtocolDiscriminator {
    fn from(v: u8) -> Self {
        match v {
            0x04 => ProtocolDiscriminator::Ia5,
            0x05 => ProtocolDiscriminator::X244,
            0x06 => ProtocolDiscriminator::Iso8208,
            0x07 => ProtocolDiscriminator::X25,
            0x3f => ProtocolDiscriminator::NationalUse,
            0x10..=0x3e => ProtocolDiscriminator::UserSpecific,
            other => ProtocolDiscriminator::Other(other),
        }
    }
}

impl From<ProtocolDiscriminator> for u8 {
    fn from(v: ProtocolDiscriminator) -> u8 {
        match v {
            ProtocolDiscriminator::Ia5 => 0x04,
            ProtocolDiscriminator::X244 => 0x05,
            ProtocolDiscriminator::Iso8208 => 0x06,
            ProtocolDiscriminator::X25 => 0x07,
            ProtocolDiscriminator::NationalUse => 0x3f,
            ProtocolDiscriminator::UserSpecific => 0x10,
            ProtocolDiscriminator::Other(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUser {
    pub protocol_discriminator: ProtocolDiscriminator,
    pub data: Vec<u8>,
}

impl UserUser {
    pub fn new(protocol_discriminator: ProtocolDiscriminator, data: Vec<u8>) -> Self {
        UserUser {
            protocol_discriminator,
            data,
        }
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.data.len());
        buf.push(u8::from(self.protocol_discriminator));
        buf.extend_from_slice(&self.data);
        buf
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        let octet = *data
            .first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "User-User IE empty"))?;
        Ok(UserUser {
            protocol_discriminator: ProtocolDiscriminator::from(octet),
            data: data[1..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let uu = UserUser::new(ProtocolDiscriminator::Ia5, b"hello peer".to_vec());
        let back = UserUser::unmarshal(&uu.marshal()).unwrap();
        assert_eq!(back, uu);
    }
}
