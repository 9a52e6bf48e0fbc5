//! Facility Information Element (Q.932 §4.3) — carries a supplementary
//! service invocation (HOLD, RETRIEVE, ...).
//!
//! The full Facility IE wraps a ROSE APDU (invoke/return-result/return-error
//! /reject components, each with a tagged operation value and BER-encoded
//! argument). Decoding the whole ROSE grammar is out of scope here; this
//! models just enough of the component header to dispatch HOLD/RETRIEVE by
//! operation value and keeps the rest of the APDU as opaque bytes the
//! engine passes through unexamined.

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    Invoke,
    ReturnResult,
    ReturnError,
    Reject,
    Unknown(u8),
}

impl From<u8> for ComponentType {
    fn from(v: u8) -> Self {
        match v {
            0xa1 => ComponentType::Invoke,
            0xa2 => ComponentType::ReturnResult,
            0xa3 => ComponentType::ReturnError,
            0xa4 => ComponentType::Reject,
            other => ComponentType::Unknown(other),
        }
    }
}

impl From<ComponentType> for u8 {
    fn from(v: ComponentType) -> u8 {
        match v {
            ComponentType::Invoke => 0xa1,
            ComponentType::ReturnResult => 0xa2,
            ComponentType::ReturnError => 0xa3,
            ComponentType::Reject => 0xa4,
            ComponentType::Unknown(v) => v,
        }
    }
}

/// Common supplementary-service operation values this engine recognizes by
/// number (ETS 300 196 / Q.932 local operation codes). Anything else is
/// passed through via `Operation::Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Hold,
    Retrieve,
    HoldAck,
    RetrieveAck,
    HoldReject,
    RetrieveReject,
    Other(u8),
}

impl From<u8> for Operation {
    fn from(v: u8) -> Self {
        match v {
            0x1e => Operation::Hold,
            0x1d => Operation::Retrieve,
            0x20 => Operation::HoldAck,
            0x1f => Operation::RetrieveAck,
            0x21 => Operation::HoldReject,
            0x22 => Operation::RetrieveReject,
            other => Operation::Other(other),
        }
    }
}

impl From<Operation> for u8 {
    fn from(v: Operation) -> u8 {
        match v {
            Operation::Hold => 0x1e,
            Operation::Retrieve => 0x1d,
            Operation::HoldAck => 0x20,
            Operation::RetrieveAck => 0x1f,
            Operation::HoldReject => 0x21,
            Operation::RetrieveReject => 0x22,
            Operation::Other(v) => v,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facility {
    pub component: ComponentType,
    pub invoke_id: u8,
    pub operation: Operation,
    /// Whatever followed the operation value; opaque BER argument bytes.
    pub argument: Vec<u8>,
}

impl Facility {
    pub fn invoke(invoke_id: u8, operation: Operation) -> Self {
        Facility {
            component: ComponentType::Invoke,
            invoke_id,
            operation,
            argument: Vec::new(),
        }
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.argument.len());
        buf.push(u8::from(self.component));
        buf.push(self.invoke_id);
        buf.push(u8::from(self.operation));
        buf.extend_from_slice(&self.argument);
        buf
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        if data.len() < 3 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Facility IE shorter than 3 octets",
            ));
        }
        Ok(Facility {
            component: ComponentType::from(data[0]),
            invoke_id: data[1],
            operation: Operation::from(data[2]),
            argument: data[3..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hold_invoke_roundtrips() {
        let f = Facility::invoke(1, Operation::Hold);
        let back = Facility::unmarshal(&f.marshal()).unwrap();
        assert_eq!(back, f);
        assert_eq!(back.operation, Operation::Hold);
    }

    #[test]
    fn unrecognized_operation_passes_through() {
        let f = Facility::invoke(2, Operation::Other(0x7f));
        let back = Facility::unmarshal(&f.marshal()).unwrap();
        assert_eq!(back.operation, Operation::Other(0x7f));
    }
}
