//! Channel Identification Information Element (Q.931 §4.5.13).
//!
//! Selects the B-channel a call uses. Carried in SETUP (the caller's
//! preference) and in CALL PROCEEDING/CONNECT (the confirmed channel).

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceType {
    Basic,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSelection {
    NoChannel,
    B1,
    B2,
    Any,
}

impl From<u8> for ChannelSelection {
    fn from(v: u8) -> Self {
        match v & 0x03 {
            0b00 => ChannelSelection::NoChannel,
            0b01 => ChannelSelection::B1,
            0b10 => ChannelSelection::B2,
            _ => ChannelSelection::Any,
        }
    }
}

impl From<ChannelSelection> for u8 {
    fn from(v: ChannelSelection) -> u8 {
        match v {
            ChannelSelection::NoChannel => 0b00,
            ChannelSelection::B1 => 0b01,
            ChannelSelection::B2 => 0b10,
            ChannelSelection::Any => 0b11,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelIdentification {
    pub interface_type: InterfaceType,
    pub exclusive: bool,
    pub is_d_channel: bool,
    /// BRI: which B-channel is indicated. PRI: ignored, see `channel_number`.
    pub info_channel_selection: ChannelSelection,
    pub interface_id: Option<u8>,
    /// PRI only: explicit channel number from octet 3.2 onward.
    pub channel_number: Option<u8>,
}

impl ChannelIdentification {
    pub fn bri(selection: ChannelSelection, exclusive: bool) -> Self {
        ChannelIdentification {
            interface_type: InterfaceType::Basic,
            exclusive,
            is_d_channel: false,
            info_channel_selection: selection,
            interface_id: None,
            channel_number: None,
        }
    }

    pub fn pri(channel_number: u8, exclusive: bool) -> Self {
        ChannelIdentification {
            interface_type: InterfaceType::Other,
            exclusive,
            is_d_channel: false,
            info_channel_selection: ChannelSelection::Any,
            interface_id: None,
            channel_number: Some(channel_number),
        }
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4);
        let int_type_bit = matches!(self.interface_type, InterfaceType::Other) as u8;
        let octet3 = 0x80
            | (int_type_bit << 5)
            | ((self.exclusive as u8) << 3)
            | ((self.is_d_channel as u8) << 2)
            | u8::from(self.info_channel_selection);
        buf.push(octet3);
        if let Some(iid) = self.interface_id {
            buf.push(iid);
        }
        if let Some(chan) = self.channel_number {
            buf.push(0x80 | 0b0000_0011 << 4 | (chan & 0x1f));
            buf.push(0x80 | chan);
        }
        buf
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        let octet3 = *data.first().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Channel Identification IE empty",
            )
        })?;
        let interface_type = if octet3 & 0x20 != 0 {
            InterfaceType::Other
        } else {
            InterfaceType::Basic
        };
        let exclusive = octet3 & 0x08 != 0;
        let is_d_channel = octet3 & 0x04 != 0;
        let info_channel_selection = ChannelSelection::from(octet3);
        let mut rest = &data[1..];
        let interface_id = if octet3 & 0x40 != 0 {
            let (b, tail) = rest
                .split_first()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "missing InterfaceID"))?;
            rest = tail;
            Some(*b)
        } else {
            None
        };
        let channel_number = if interface_type == InterfaceType::Other && !rest.is_empty() {
            rest.last().map(|b| b & 0x7f)
        } else {
            None
        };
        Ok(ChannelIdentification {
            interface_type,
            exclusive,
            is_d_channel,
            info_channel_selection,
            interface_id,
            channel_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pri_channel_roundtrips() {
        let ci = ChannelIdentification::pri(7, true);
        let bytes = ci.marshal();
        let back = ChannelIdentification::unmarshal(&bytes).unwrap();
        assert_eq!(back.channel_number, Some(7));
        assert!(back.exclusive);
        assert_eq!(back.interface_type, InterfaceType::Other);
    }

    #[test]
    fn bri_any_channel_roundtrips() {
        let ci = ChannelIdentification::bri(ChannelSelection::Any, false);
        let bytes = ci.marshal();
        let back = ChannelIdentification::unmarshal(&bytes).unwrap();
        assert_eq!(back.interface_type, InterfaceType::Basic);
        assert_eq!(back.info_channel_selection, ChannelSelection::Any);
    }

    #[test]
    fn unmarshal_rejects_empty() {
        assert!(ChannelIdentification::unmarshal(&[]).is_err());
    }
}
