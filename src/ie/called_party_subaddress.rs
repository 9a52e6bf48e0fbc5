//! Called Party Subaddress Information Element (Q.931 §4.5.9).

use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalledPartySubaddress {
    pub type_of_subaddress: u8,
    pub odd_even: bool,
    pub digits: Vec<u8>,
}

impl CalledPartySubaddress {
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
                "Called Party Subaddress IE empty",
            )
        })?;
        Ok(CalledPartySubaddress {
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
        let s = CalledPartySubaddress {
            type_of_subaddress: 2,
            odd_even: true,
            digits: vec![1, 2, 3],
        };
        let back = CalledPartySubaddress::unmarshal(&s.marshal()).unwrap();
        assert_eq!(back, s);
    }
}
