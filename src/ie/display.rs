//! Display Information Element (Q.931 §4.5.15) — free-form text for a
//! handset's alphanumeric display.

use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Display {
    pub text: String,
}

impl Display {
    pub fn new(text: impl Into<String>) -> Self {
        Display { text: text.into() }
    }

    pub fn marshal(&self) -> Vec<u8> {
        self.text.as_bytes().to_vec()
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        Ok(Display {
            text: String::from_utf8_lossy(data).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let d = Display::new("Jane Doe");
        let back = Display::unmarshal(&d.marshal()).unwrap();
        assert_eq!(back, d);
    }
}
