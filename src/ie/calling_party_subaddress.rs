//! Calling Party Subaddress Information Element (Q.931 §4.5.11).
//!
//! Identical wire layout to [`super::called_party_subaddress`]; kept as a
//! distinct type so a call site can't pass a calling subaddress where a
//! called one belongs.

use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallingPartySubaddress {
    pub type_of_subaddress: u8,
    pub odd_even: bool,
    pub digits: Vec<u8>,
}

impl CallingPartySubaddress {
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + self.digits.len());
        buf.push(0x80 | ((self.type_of_subaddress & 0x07) << 4) | ((self.odd_even as u8) << 3));
        buf.extend_from_slice(&self.digits);
        buf
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        let octet = *data.first().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Calling Party Subaddress IE empty",
            )
        })?;
        Ok(CallingPartySubaddress {
            type_of_subaddress: (octet >> 4) & 0x07,
            odd_even: octet & 0x08 != 0,
            digits: data[1..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let s = CallingPartySubaddress {
            type_of_subaddress: 0,
            odd_even: false,
            digits: vec![9, 8],
        };
        let back = CallingPartySubaddress::unmarshal(&s.marshal()).unwrap();
        assert_eq!(back, s);
    }
}
