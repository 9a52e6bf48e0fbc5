//! Generic Q.931 message body: header plus an ordered sequence of IEs.
//!
//! Mirrors the original `Q931mes_Generic` struct's role (a grab-bag wide
//! enough for every message type) but stores IEs in a `Vec` rather than as
//! ~40 named fields — extraction goes through [`Generic::find_ie`] keyed by
//! [`IeType`] instead of a fixed struct field per possible IE.

use crate::error::Q931Error;
use crate::ie::{Ie, IeType, SingleOctetIe};
use crate::message::{Header, Message, MsgType};
use crate::types::Crv;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generic {
    pub header: Header,
    /// Single-octet IEs (codeset shift, more-data, sending-complete,
    /// congestion level, repeat indicator) that preceded the first
    /// variable-length IE, in wire order.
    pub single_octet_ies: Vec<SingleOctetIe>,
    pub ies: Vec<Ie>,
}

impl Generic {
    pub fn new(crv: Crv, msg_type: MsgType) -> Self {
        Generic {
            header: Header::new(crv, msg_type),
            single_octet_ies: Vec::new(),
            ies: Vec::new(),
        }
    }

    /// A message under the maintenance protocol discriminator (5ESS
    /// SERVICE/SERVICE ACKNOWLEDGE, spec.md §4.2).
    pub fn maintenance(crv: Crv, msg_type: MsgType) -> Self {
        Generic {
            header: Header::maintenance(crv, msg_type),
            single_octet_ies: Vec::new(),
            ies: Vec::new(),
        }
    }

    pub fn with_ie(mut self, ie: Ie) -> Self {
        self.ies.push(ie);
        self
    }

    pub fn unmarshal(b: &[u8]) -> Result<Self, Q931Error> {
        let (header, mut offset) = Header::unmarshal(b)?;
        let mut single_octet_ies = Vec::new();
        let mut ies = Vec::new();
        while offset < b.len() {
            let octet = b[offset];
            if octet & 0x80 != 0 {
                single_octet_ies.push(SingleOctetIe { id: octet });
                offset += 1;
            } else {
                let (ie, consumed) = Ie::unmarshal(&b[offset..]).map_err(|e| {
                    Q931Error::IeDecode {
                        ie: IeType::from(octet),
                        offset,
                        reason: e.to_string(),
                    }
                })?;
                ies.push(ie);
                offset += consumed;
            }
        }
        Ok(Generic {
            header,
            single_octet_ies,
            ies,
        })
    }

    pub fn marshaled_size(&self) -> usize {
        self.marshal().len()
    }
}

impl Message for Generic {
    fn header(&self) -> &Header {
        &self.header
    }

    fn ies(&self) -> &[Ie] {
        &self.ies
    }

    fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.header.marshal_into(&mut buf);
        for soie in &self.single_octet_ies {
            buf.extend_from_slice(&soie.marshal());
        }
        for ie in &self.ies {
            ie.marshal_into(&mut buf);
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ie::cause::{Cause, CauseValue};

    #[test]
    fn roundtrip_with_one_ie() {
        let cause = Cause::new(CauseValue::NormalClearing, 0);
        let msg = Generic::new(Crv::new(1, false), MsgType::Disconnect)
            .with_ie(Ie::new(IeType::Cause, cause.marshal()));
        let bytes = msg.marshal();
        let back = Generic::unmarshal(&bytes).unwrap();
        assert_eq!(back, msg);
        assert_eq!(back.msg_type(), MsgType::Disconnect);
        assert!(back.find_ie(IeType::Cause).is_some());
    }

    #[test]
    fn roundtrip_with_single_octet_ie() {
        let mut msg = Generic::new(Crv::new(2, true), MsgType::Setup);
        msg.single_octet_ies.push(SingleOctetIe {
            id: SingleOctetIe::SENDING_COMPLETE,
        });
        let bytes = msg.marshal();
        let back = Generic::unmarshal(&bytes).unwrap();
        assert_eq!(back.single_octet_ies.len(), 1);
        assert_eq!(back.single_octet_ies[0].id, SingleOctetIe::SENDING_COMPLETE);
    }

    #[test]
    fn maintenance_pd_resolves_service_instead_of_connect() {
        let msg = Generic::maintenance(Crv::new(3, false), MsgType::Service);
        let bytes = msg.marshal();
        assert_eq!(bytes[0], crate::message::header::MAINTENANCE_DISCRIMINATOR);
        let back = Generic::unmarshal(&bytes).unwrap();
        assert_eq!(back.msg_type(), MsgType::Service);
    }

    #[test]
    fn unmarshal_reports_offset_of_bad_ie() {
        // Header (PD, 1-byte CRV, SETUP) then a Cause IE (0x08) declaring
        // length 5 with only 2 bytes of content actually present.
        let bytes = [0x08, 0x01, 0x00, 0x05, 0x08, 0x05, 0xaa, 0xbb];
        let err = Generic::unmarshal(&bytes).unwrap_err();
        match err {
            Q931Error::IeDecode { offset, .. } => assert_eq!(offset, 4),
            other => panic!("expected IeDecode, got {other:?}"),
        }
    }
}
