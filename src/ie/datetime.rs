//! Date/Time Information Element (Q.931 §4.5.14), carried by ALERTING,
//! CONNECT and PROGRESS to timestamp a call milestone.

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub second: Option<u8>,
}

impl DateTime {
    pub fn date_only(year: u8, month: u8, day: u8) -> Self {
        DateTime {
            year,
            month,
            day,
            hour: None,
            minute: None,
            second: None,
        }
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = vec![self.year, self.month, self.day];
        if let Some(h) = self.hour {
            buf.push(h);
        }
        if let Some(m) = self.minute {
            buf.push(m);
        }
        if let Some(s) = self.second {
            buf.push(s);
        }
        buf
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        if data.len() < 3 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Date/Time IE shorter than 3 octets",
            ));
        }
        Ok(DateTime {
            year: data[0],
            month: data[1],
            day: data[2],
            hour: data.get(3).copied(),
            minute: data.get(4).copied(),
            second: data.get(5).copied(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_only_roundtrips() {
        let dt = DateTime::date_only(26, 7, 28);
        let back = DateTime::unmarshal(&dt.marshal()).unwrap();
        assert_eq!(back, dt);
        assert!(back.hour.is_none());
    }

    #[test]
    fn full_precision_roundtrips() {
        let dt = DateTime {
            year: 26,
            month: 7,
            day: 28,
            hour: Some(12),
            minute: Some(30),
            second: Some(0),
        };
        let back = DateTime::unmarshal(&dt.marshal()).unwrap();
        assert_eq!(back, dt);
    }
}
