//! Congestion Level Information Element (Q.931 §4.5.7).

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CongestionLevel {
    pub level: u8,
}

impl CongestionLevel {
    pub fn new(level: u8) -> Self {
        CongestionLevel { level: level & 0x0f }
    }

    pub fn marshal(&self) -> [u8; 1] {
        [self.level & 0x0f]
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        let octet = *data.first().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "Congestion Level IE empty")
        })?;
        Ok(CongestionLevel::new(octet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let c = CongestionLevel::new(3);
        assert_eq!(CongestionLevel::unmarshal(&c.marshal()).unwrap(), c);
    }
}
