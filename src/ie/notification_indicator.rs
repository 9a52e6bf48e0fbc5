//! Notification Indicator Information Element (Q.931 §4.5.25).

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationDescription {
    UserSuspended,
    UserResumed,
    BearerServiceChanged,
    Other(u8),
}

impl From<u8> for NotificationDescription {
    fn from(v: u8) -> Self {
        match v & 0x7f {
            0x00 => NotificationDescription::UserSuspended,
            0x01 => NotificationDescription::UserResumed,
            0x02 => NotificationDescription::BearerServiceChanged,
            other => NotificationDescription::Other(other),
        }
    }
}

impl From<NotificationDescription> for u8 {
    fn from(v: NotificationDescription) -> u8 {
        match v {
            NotificationDescription::UserSuspended => 0x00,
            NotificationDescription::UserResumed => 0x01,
            NotificationDescription::BearerServiceChanged => 0x02,
            NotificationDescription::Other(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationIndicator {
    pub description: NotificationDescription,
}

impl NotificationIndicator {
    pub fn new(description: NotificationDescription) -> Self {
        NotificationIndicator { description }
    }

    pub fn marshal(&self) -> [u8; 1] {
        [0x80 | u8::from(self.description)]
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        let octet = *data.first().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "Notification Indicator IE empty")
        })?;
        Ok(NotificationIndicator {
            description: NotificationDescription::from(octet),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let ni = NotificationIndicator::new(NotificationDescription::UserResumed);
        let back = NotificationIndicator::unmarshal(&ni.marshal()).unwrap();
        assert_eq!(back, ni);
    }
}
