//! Restart Indicator Information Element (Q.931 §4.5.29) — scopes a
//! RESTART to one channel, one interface, or the whole trunk.

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartClass {
    IndicatedChannels,
    SingleInterface,
    AllInterfaces,
    Other(u8),
}

impl From<u8> for RestartClass {
    fn from(v: u8) -> Self {
        match v & 0x07 {
            0b000 => RestartClass::IndicatedChannels,
            0b110 => RestartClass::SingleInterface,
            0b111 => RestartClass::AllInterfaces,
            other => RestartClass::Other(other),
        }
    }
}

impl From<RestartClass> for u8 {
    fn from(v: RestartClass) -> u8 {
        match v {
            RestartClass::IndicatedChannels => 0b000,
            RestartClass::SingleInterface => 0b110,
            RestartClass::AllInterfaces => 0b111,
            RestartClass::Other(v) => v & 0x07,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartIndicator {
    pub class: RestartClass,
}

impl RestartIndicator {
    pub fn new(class: RestartClass) -> Self {
        RestartIndicator { class }
    }

    pub fn marshal(&self) -> [u8; 1] {
        [0x80 | u8::from(self.class)]
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        let octet = *data.first().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "Restart Indicator IE empty")
        })?;
        Ok(RestartIndicator {
            class: RestartClass::from(octet),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_all_interfaces() {
        let ri = RestartIndicator::new(RestartClass::AllInterfaces);
        let back = RestartIndicator::unmarshal(&ri.marshal()).unwrap();
        assert_eq!(back, ri);
    }

    #[test]
    fn roundtrip_single_interface() {
        let ri = RestartIndicator::new(RestartClass::SingleInterface);
        let back = RestartIndicator::unmarshal(&ri.marshal()).unwrap();
        assert_eq!(back, ri);
    }
}
