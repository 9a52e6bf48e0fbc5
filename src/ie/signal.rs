//! Signal Information Element (Q.931 §4.5.31) — tells a TE which tone or
//! alerting pattern to play locally (dial tone, ringback, call waiting...).

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalValue {
    DialToneOn,
    RingBackToneOn,
    InterceptToneOn,
    NetworkCongestionToneOn,
    BusyToneOn,
    ConfirmToneOn,
    AnswerToneOn,
    CallWaitingTone,
    OffHookWarningToneOn,
    PreEmptionToneOn,
    TonesOff,
    AlertingOnPattern(u8),
    AlertingOff,
    Other(u8),
}

impl From<u8> for SignalValue {
    fn from(v: u8) -> Self {
        match v {
            0x00 => SignalValue::DialToneOn,
            0x01 => SignalValue::RingBackToneOn,
            0x02 => SignalValue::InterceptToneOn,
            0x03 => SignalValue::NetworkCongestionToneOn,
            0x04 => SignalValue::BusyToneOn,
            0x05 => SignalValue::ConfirmToneOn,
            0x06 => SignalValue::AnswerToneOn,
            0x07 => SignalValue::CallWaitingTone,
            0x08 => SignalValue::OffHookWarningToneOn,
            0x09 => SignalValue::PreEmptionToneOn,
            0x3f => SignalValue::TonesOff,
            0x40..=0x47 => SignalValue::AlertingOnPattern(v - 0x40),
            0x4f => SignalValue::AlertingOff,
            other => SignalValue::Other(other),
        }
    }
}

impl From<SignalValue> for u8 {
    fn from(v: SignalValue) -> u8 {
        match v {
            SignalValue::DialToneOn => 0x00,
            SignalValue::RingBackToneOn => 0x01,
            SignalValue::InterceptToneOn => 0x02,
            SignalValue::NetworkCongestionToneOn => 0x03,
            SignalValue::BusyToneOn => 0x04,
            SignalValue::ConfirmToneOn => 0x05,
            SignalValue::AnswerToneOn => 0x06,
            SignalValue::CallWaitingTone => 0x07,
            SignalValue::OffHookWarningToneOn => 0x08,
            SignalValue::PreEmptionToneOn => 0x09,
            SignalValue::TonesOff => 0x3f,
            SignalValue::AlertingOnPattern(p) => 0x40 + (p & 0x07),
            SignalValue::AlertingOff => 0x4f,
            SignalValue::Other(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub value: SignalValue,
}

impl Signal {
    pub fn new(value: SignalValue) -> Self {
        Signal { value }
    }

    pub fn marshal(&self) -> [u8; 1] {
        [u8::from(self.value)]
    }

    pub fn unmarshal(data: &[u8]) -> Result<Self, io::Error> {
        let octet = *data
            .first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "Signal IE empty"))?;
        Ok(Signal {
            value: SignalValue::from(octet),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_ringback() {
        let s = Signal::new(SignalValue::RingBackToneOn);
        let back = Signal::unmarshal(&s.marshal()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn roundtrip_alerting_pattern() {
        let s = Signal::new(SignalValue::AlertingOnPattern(3));
        let back = Signal::unmarshal(&s.marshal()).unwrap();
        assert_eq!(back.value, SignalValue::AlertingOnPattern(3));
    }
}
