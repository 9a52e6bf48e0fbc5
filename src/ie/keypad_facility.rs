//! Keypad Facility Information Element (Q.931 §4.5.22) — post-connect
//! DTMF-style digits entered by a user, e.g. for overlap dialing prompts.

use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypadFacility {
    pub digits: String,
}

impl KeypadFacility {
    pub fn new(digits: impl Into<String>) -> Self {
        KeypadFacility {
            digits: digits.into(),
        }
    }

    pub fn marshal(&self) -> Vec<u8> {
        self.digits.as_bytes().to_vec()
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        Ok(KeypadFacility {
            digits: String::from_utf8_lossy(data).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let kp = KeypadFacility::new("1234#");
        let back = KeypadFacility::unmarshal(&kp.marshal()).unwrap();
        assert_eq!(back, kp);
    }
}
