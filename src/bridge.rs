//! Signalling-to-telephony event bridge (spec.md §4.8).
//!
//! The state engine's per-message handlers don't hand the host raw Q.931
//! messages on the L3-to-L4 path; they translate call-control detail into
//! a small, stable vocabulary a telephony application can switch on
//! without knowing Q.931 at all. This plays the same role the original's
//! `Q931Tx34` callback plays carrying a parsed `Q931mes_Generic` -- except
//! the payload here is a closed `Event` enum instead of a raw message the
//! host has to re-interpret.

use crate::types::{BChannel, CallIndex};

/// One bridge-level event raised to Layer 4. `call` identifies which call
/// table slot it concerns; `RestartChannel` is the exception, since a
/// global RESTART affects every call on the trunk rather than one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Inbound call offered: NT has picked (or TE has requested) a
    /// B-channel and the caller's number, if present, is attached.
    Start {
        call: CallIndex,
        b_channel: BChannel,
        calling_number: Option<String>,
        called_number: Option<String>,
    },
    /// CALL_PROCEEDING: the network has begun call setup.
    Progress { call: CallIndex },
    /// ALERTING/PROGRESS with an in-band media indication: far end is
    /// ringing or early media is cut through.
    ProgressMedia { call: CallIndex },
    /// CONNECT: the call is answered and media is flowing.
    Up { call: CallIndex },
    /// DISCONNECT: the far end wants to tear down, carrying its cause.
    Terminating { call: CallIndex, cause: u8 },
    /// RELEASE/RELEASE_COMPLETE: the call and its B-channel are gone.
    Stop { call: CallIndex },
    /// RESTART: the named channel (or every channel, per spec.md §8
    /// scenario 6) has been forced back to idle.
    RestartChannel { b_channel: BChannel },
    /// SERVICE (maintenance, PD=3) taking a channel out of service.
    Suspended { b_channel: BChannel },
    /// SERVICE bringing a channel back into service.
    Resumed { b_channel: BChannel },
    /// HOLD/HOLD_ACKNOWLEDGE (Q.932): the call is parked, B-channel freed
    /// for other use, still logically connected.
    Held { call: CallIndex },
    /// RETRIEVE/RETRIEVE_ACKNOWLEDGE (Q.932): a held call is reconnected.
    Retrieved { call: CallIndex },
    /// SUSPEND/SUSPEND_ACKNOWLEDGE: the call is parked by call identity,
    /// the B-channel released, pending a RESUME naming the same identity.
    Parked { call: CallIndex },
    /// RESUME/RESUME_ACKNOWLEDGE: a previously-parked call is reconnected.
    Unparked { call: CallIndex },
    /// NOTIFY: an informational indication attached to an active call.
    Notified {
        call: CallIndex,
        description: crate::ie::notification_indicator::NotificationDescription,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CallIndex;

    #[test]
    fn events_are_comparable_for_assertions() {
        let a = Event::Up { call: CallIndex(1) };
        let b = Event::Up { call: CallIndex(1) };
        assert_eq!(a, b);
    }
}
