//! Segmented Message Information Element (Q.931 §4.5.30) — prefixes a
//! segment of a message too long for a single frame.
//!
//! Full reassembly is an explicit non-goal; this engine decodes the IE
//! far enough to reject it with [`crate::error::Q931Error::Segment`].

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentedMessage {
    pub first_segment: bool,
    pub segments_remaining: u8,
    pub segmented_message_type: u8,
}

impl SegmentedMessage {
    pub fn marshal(&self) -> [u8; 2] {
        [
            ((self.first_segment as u8) << 7) | (self.segments_remaining & 0x7f),
            self.segmented_message_type,
        ]
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        if data.len() < 2 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Segmented Message IE shorter than 2 octets",
            ));
        }
        Ok(SegmentedMessage {
            first_segment: data[0] & 0x80 != 0,
            segments_remaining: data[0] & 0x7f,
            segmented_message_type: data[1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let s = SegmentedMessage {
            first_segment: true,
            segments_remaining: 3,
            segmented_message_type: 0x05,
        };
        let back = SegmentedMessage::unmarshal(&s.marshal()).unwrap();
        assert_eq!(back, s);
    }
}
