//! Call Identity Information Element (Q.931 §4.5.5) — used by SUSPEND/RESUME
//! to correlate a parked call with the CRV that resumes it.

use std::io;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallIdentity {
    pub identity: Vec<u8>,
}

impl CallIdentity {
    pub fn new(identity: Vec<u8>) -> Self {
        CallIdentity { identity }
    }

    pub fn marshal(&self) -> Vec<u8> {
        self.identity.clone()
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        Ok(CallIdentity {
            identity: data.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let ci = CallIdentity::new(vec![1, 2, 3]);
        let back = CallIdentity::unmarshal(&ci.marshal()).unwrap();
        assert_eq!(back, ci);
    }

    #[test]
    fn empty_identity_is_valid() {
        assert!(CallIdentity::unmarshal(&[]).unwrap().identity.is_empty());
    }
}
