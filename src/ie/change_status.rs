//! Change Status Information Element (Q.931 §4.5.3) — carried in SERVICE
//! and SERVICE ACKNOWLEDGE to report a channel's new maintenance state.

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewStatus {
    InService = 0b000,
    Maintenance = 0b001,
    OutOfService = 0b010,
    Unknown(u8),
}

impl From<u8> for NewStatus {
    fn from(v: u8) -> Self {
        match v & 0x07 {
            0b000 => NewStatus::InService,
            0b001 => NewStatus::Maintenance,
            0b010 => NewStatus::OutOfService,
            other => NewStatus::Unknown(other),
        }
    }
}

impl From<NewStatus> for u8 {
    fn from(v: NewStatus) -> u8 {
        match v {
            NewStatus::InService => 0b000,
            NewStatus::Maintenance => 0b001,
            NewStatus::OutOfService => 0b010,
            NewStatus::Unknown(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeStatus {
    pub new_status: NewStatus,
}

impl ChangeStatus {
    pub fn new(new_status: NewStatus) -> Self {
        ChangeStatus { new_status }
    }

    pub fn marshal(&self) -> [u8; 1] {
        [u8::from(self.new_status) & 0x07]
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        let octet = *data.first().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "Change Status IE empty")
        })?;
        Ok(ChangeStatus {
            new_status: NewStatus::from(octet),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let cs = ChangeStatus::new(NewStatus::OutOfService);
        let back = ChangeStatus::unmarshal(&cs.marshal()).unwrap();
        assert_eq!(back, cs);
    }
}
