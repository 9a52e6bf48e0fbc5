//! The U-state/N-state call-control state machine (spec.md §4.5).
//!
//! `Q931StateTE.c`/`Q931StateNT.c` duplicate roughly 25 near-identical
//! handlers across the TE and NT sides. Per design note 9 this crate keeps
//! one handler per message, parameterised by [`Role`], and branches on role
//! only where the protocol itself diverges (channel selection on SETUP,
//! auto-ack policy, which side allocates the CRV) -- everything else is
//! shared logic. Handlers are pure functions of a [`HandlerInput`] to a
//! [`HandlerOutput`]; [`crate::trunk::Trunk`] is what actually mutates the
//! call table, starts timers and invokes the host callbacks with the
//! result.

use crate::dialect::{DialectTable, ProcHandler, Role};
use crate::error::{Q931Error, Result};
use crate::ie::IeType;
use crate::message::{Generic, Message, MsgType};
use crate::timer::ids;

/// Unified call state. TE (`U*`) and NT (`N*`) use disjoint numeric
/// ranges, matching the original comment on `Q931_Call::State`: "Default
/// usage is 1-99 for TE and 101-199 for NT" -- `Idle` (both sides' state
/// 0) is the only value shared across roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallState {
    Idle,
    // TE states (ITU-T Q.931 Annex B.1)
    U1CallInitiated,
    U2OverlapSending,
    U3OutgoingCallProceeding,
    U4CallDelivered,
    U6CallPresent,
    U7CallReceived,
    U8ConnectRequest,
    U9IncomingCallProceeding,
    U10Active,
    U11DisconnectRequest,
    U12DisconnectIndication,
    U15SuspendRequest,
    U17ResumeRequest,
    U19ReleaseRequest,
    U25OverlapReceiving,
    // NT states (ITU-T Q.931 Annex B.2), mirroring the TE side
    N1CallInitiated,
    N2OverlapSending,
    N3OutgoingCallProceeding,
    N4CallDelivered,
    N6CallPresent,
    N7CallReceived,
    N8ConnectRequest,
    N9IncomingCallProceeding,
    N10Active,
    N11DisconnectRequest,
    N12DisconnectIndication,
    N15SuspendRequest,
    N17ResumeRequest,
    N19ReleaseRequest,
    N25OverlapReceiving,
}

impl CallState {
    pub fn code(self) -> u16 {
        match self {
            CallState::Idle => 0,
            CallState::U1CallInitiated => 1,
            CallState::U2OverlapSending => 2,
            CallState::U3OutgoingCallProceeding => 3,
            CallState::U4CallDelivered => 4,
            CallState::U6CallPresent => 6,
            CallState::U7CallReceived => 7,
            CallState::U8ConnectRequest => 8,
            CallState::U9IncomingCallProceeding => 9,
            CallState::U10Active => 10,
            CallState::U11DisconnectRequest => 11,
            CallState::U12DisconnectIndication => 12,
            CallState::U15SuspendRequest => 15,
            CallState::U17ResumeRequest => 17,
            CallState::U19ReleaseRequest => 19,
            CallState::U25OverlapReceiving => 25,
            CallState::N1CallInitiated => 101,
            CallState::N2OverlapSending => 102,
            CallState::N3OutgoingCallProceeding => 103,
            CallState::N4CallDelivered => 104,
            CallState::N6CallPresent => 106,
            CallState::N7CallReceived => 107,
            CallState::N8ConnectRequest => 108,
            CallState::N9IncomingCallProceeding => 109,
            CallState::N10Active => 110,
            CallState::N11DisconnectRequest => 111,
            CallState::N12DisconnectIndication => 112,
            CallState::N15SuspendRequest => 115,
            CallState::N17ResumeRequest => 117,
            CallState::N19ReleaseRequest => 119,
            CallState::N25OverlapReceiving => 125,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Some(match code {
            0 => CallState::Idle,
            1 => CallState::U1CallInitiated,
            2 => CallState::U2OverlapSending,
            3 => CallState::U3OutgoingCallProceeding,
            4 => CallState::U4CallDelivered,
            6 => CallState::U6CallPresent,
            7 => CallState::U7CallReceived,
            8 => CallState::U8ConnectRequest,
            9 => CallState::U9IncomingCallProceeding,
            10 => CallState::U10Active,
            11 => CallState::U11DisconnectRequest,
            12 => CallState::U12DisconnectIndication,
            15 => CallState::U15SuspendRequest,
            17 => CallState::U17ResumeRequest,
            19 => CallState::U19ReleaseRequest,
            25 => CallState::U25OverlapReceiving,
            101 => CallState::N1CallInitiated,
            102 => CallState::N2OverlapSending,
            103 => CallState::N3OutgoingCallProceeding,
            104 => CallState::N4CallDelivered,
            106 => CallState::N6CallPresent,
            107 => CallState::N7CallReceived,
            108 => CallState::N8ConnectRequest,
            109 => CallState::N9IncomingCallProceeding,
            110 => CallState::N10Active,
            111 => CallState::N11DisconnectRequest,
            112 => CallState::N12DisconnectIndication,
            115 => CallState::N15SuspendRequest,
            117 => CallState::N17ResumeRequest,
            119 => CallState::N19ReleaseRequest,
            125 => CallState::N25OverlapReceiving,
            _ => return None,
        })
    }
}

/// Which side of the trunk a message is travelling towards when legality
/// is checked: arriving from L2 (the peer), or being sent out to L2
/// because L4 asked for it. Matches the original's per-state-table-entry
/// `Direction` byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Recv,
    Send,
}

/// One legal `(state, message, direction)` triple. `is_legal` is a linear
/// scan exactly like `Q931IsEventLegal`; the table is small enough
/// (dozens of entries per dialect) that a `HashSet` would only add
/// indirection, not speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct LegalityEntry {
    state: CallState,
    msg: MsgType,
    direction: Direction,
}

#[derive(Debug, Clone, Default)]
pub struct LegalityTable {
    entries: Vec<LegalityEntry>,
}

impl LegalityTable {
    pub fn new() -> Self {
        LegalityTable::default()
    }

    pub fn add(&mut self, state: CallState, msg: MsgType, direction: Direction) -> &mut Self {
        self.entries.push(LegalityEntry {
            state,
            msg,
            direction,
        });
        self
    }

    /// spec.md §4.5 step 2: "Check `is_legal(dialect, current_state,
    /// message, direction)`; if false, invoke the unexpected-message
    /// path." RESTART/RESTART_ACKNOWLEDGE are legal in every state --
    /// they're global procedures addressed by CRV 0, not subject to a
    /// single call's state (spec.md §4.5's "RESTART handling is global").
    /// SERVICE/SERVICE_ACKNOWLEDGE (5ESS maintenance, spec.md §4.2) are the
    /// same kind of global, call-state-independent procedure.
    pub fn is_legal(&self, state: CallState, msg: MsgType, direction: Direction) -> bool {
        if matches!(
            msg,
            MsgType::Restart
                | MsgType::RestartAcknowledge
                | MsgType::Service
                | MsgType::ServiceAcknowledge
        ) {
            return true;
        }
        self.entries
            .iter()
            .any(|e| e.state == state && e.msg == msg && e.direction == direction)
    }
}

/// What the state engine was driving this message on behalf of: L2
/// delivered it to L3 (`FromL2`), or L4 asked L3 to send it (`FromL4`).
/// Mirrors the `iFrom` parameter (2 or 4) every original `Q931Proc*`
/// handler takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    FromL2,
    FromL4,
}

/// Everything a handler needs to decide the next state and side effects,
/// without needing write access to the trunk's call table itself --
/// [`crate::trunk::Trunk`] applies the result.
pub struct HandlerInput<'a> {
    pub role: Role,
    pub state: CallState,
    pub msg: &'a Generic,
    pub origin: Origin,
    /// `true` when the host's auto-ack flag for this message type is set
    /// (spec.md §4.5 "Auto-responses"). Handlers that can emit an
    /// acknowledgement consult this instead of reaching into trunk config.
    pub auto_ack: bool,
}

/// A message queued for transmission, tagged with the CRV it concerns so
/// the trunk can look up the TEI to send it to. CRV is filled in by the
/// trunk from the call table, since a fresh outbound SETUP doesn't know
/// its own CRV until `CallTable::create` has run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage(pub Generic);

/// What a handler decided. The trunk is responsible for turning this into
/// actual table mutations, timer calls, callback invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOutput {
    pub next_state: CallState,
    pub send: Vec<OutgoingMessage>,
    pub events: Vec<crate::bridge::Event>,
    pub start_timer: Option<u16>,
    pub stop_timer: Option<u16>,
}

impl HandlerOutput {
    pub fn unchanged(state: CallState) -> Self {
        HandlerOutput {
            next_state: state,
            send: Vec::new(),
            events: Vec::new(),
            start_timer: None,
            stop_timer: None,
        }
    }

    pub fn to(mut self, state: CallState) -> Self {
        self.next_state = state;
        self
    }

    pub fn sending(mut self, msg: Generic) -> Self {
        self.send.push(OutgoingMessage(msg));
        self
    }

    pub fn raising(mut self, event: crate::bridge::Event) -> Self {
        self.events.push(event);
        self
    }

    pub fn starting(mut self, timer_id: u16) -> Self {
        self.start_timer = Some(timer_id);
        self
    }

    pub fn stopping(mut self, timer_id: u16) -> Self {
        self.stop_timer = Some(timer_id);
        self
    }
}

/// Builds a STATUS message citing `cause` for the unexpected-message path
/// (spec.md §4.5 step 2, §7's cause 101 "message not compatible with call
/// state").
fn status_for_unexpected(input: &HandlerInput, cause: u8) -> Generic {
    use crate::ie::cause::{Cause, CauseValue};
    // A message we received needs our own sending flag (reversed); a
    // message L4 asked us to send already carries it (spec.md §4.3).
    let crv = match input.origin {
        Origin::FromL2 => input.msg.crv().reversed(),
        Origin::FromL4 => input.msg.crv(),
    };
    Generic::new(crv, MsgType::Status).with_ie(crate::ie::Ie::new(
        IeType::Cause,
        Cause::new(CauseValue::from(cause), 0).marshal(),
    ))
}

/// Runs when `LegalityTable::is_legal` rejects a message: the call stays
/// in its current state and a STATUS citing cause 101 goes out. The
/// caller is still responsible for surfacing `Q931Error::UnexpectedMessage`
/// to the host's error callback (spec.md §6).
pub fn unexpected_message(input: &HandlerInput) -> HandlerOutput {
    HandlerOutput::unchanged(input.state).sending(status_for_unexpected(input, 101))
}

// ---------------------------------------------------------------------
// Per-message handlers, shared between TE and NT. Each takes the role it
// is running as and branches only where the protocol itself diverges.
// ---------------------------------------------------------------------

fn handle_setup(input: HandlerInput) -> Result<HandlerOutput> {
    match input.role {
        Role::Te => match input.origin {
            // L4 asked us to place an outgoing call: U0 -> U1, arm T303.
            Origin::FromL4 => Ok(HandlerOutput::unchanged(input.state)
                .to(CallState::U1CallInitiated)
                .sending(input.msg.clone())
                .starting(ids::T303)),
            // The network shouldn't be sending TE a SETUP in practice on
            // most trunk types, but overlay/point-to-multipoint profiles
            // do -- treat it like the NT side's incoming-call path.
            Origin::FromL2 => Ok(accept_incoming_setup(&input, CallState::U6CallPresent)),
        },
        Role::Nt => match input.origin {
            Origin::FromL2 => {
                let target = if input.msg.find_ie(IeType::CalledPartyNumber).is_some() {
                    CallState::N6CallPresent
                } else {
                    CallState::N25OverlapReceiving
                };
                Ok(accept_incoming_setup(&input, target))
            }
            Origin::FromL4 => Ok(HandlerOutput::unchanged(input.state)
                .to(CallState::N1CallInitiated)
                .sending(input.msg.clone())
                .starting(ids::T303)),
        },
    }
}

fn accept_incoming_setup(input: &HandlerInput, target: CallState) -> HandlerOutput {
    let calling_number = input
        .msg
        .find_ie(IeType::CallingPartyNumber)
        .and_then(|ie| crate::ie::calling_party_number::CallingPartyNumber::unmarshal(&ie.content).ok())
        .map(|n| n.digits);
    let called_number = input
        .msg
        .find_ie(IeType::CalledPartyNumber)
        .and_then(|ie| crate::ie::called_party_number::CalledPartyNumber::unmarshal(&ie.content).ok())
        .map(|n| n.digits);

    // spec.md §4.8 "Overlap dial": no Called-Party-Number yet means the
    // caller is dialling digit by digit. SETUP_ACKNOWLEDGE plus a
    // digit-collection timer is mandatory here, not gated by auto-ack --
    // unlike the other auto-* flags this isn't an optional courtesy, it's
    // how the caller is told to keep sending INFORMATION.
    if target == CallState::N25OverlapReceiving {
        use crate::ie::progress_indicator::{ProgressDescription, ProgressIndicator};
        let ack = Generic::new(input.msg.crv().reversed(), MsgType::SetupAcknowledge).with_ie(
            crate::ie::Ie::new(
                IeType::ProgressIndicator,
                ProgressIndicator::new(0, ProgressDescription::InBandInformationAvailable)
                    .marshal()
                    .to_vec(),
            ),
        );
        return HandlerOutput::unchanged(input.state)
            .to(target)
            .sending(ack)
            .starting(ids::DIGIT_TIMEOUT);
    }

    let mut out = HandlerOutput::unchanged(input.state)
        .to(target)
        .raising(crate::bridge::Event::Start {
            call: crate::types::CallIndex(0),
            b_channel: crate::types::BChannel::UNASSIGNED,
            calling_number,
            called_number,
        });
    if input.auto_ack {
        let ack = Generic::new(
            input.msg.crv().reversed(),
            MsgType::SetupAcknowledge,
        );
        out = out.sending(ack);
    }
    out
}

fn handle_call_proceeding(input: HandlerInput) -> Result<HandlerOutput> {
    let next = match input.role {
        Role::Te => CallState::U3OutgoingCallProceeding,
        Role::Nt => CallState::N9IncomingCallProceeding,
    };
    Ok(HandlerOutput::unchanged(input.state)
        .to(next)
        .raising(crate::bridge::Event::Progress {
            call: crate::types::CallIndex(0),
        }))
}

fn handle_alerting(input: HandlerInput) -> Result<HandlerOutput> {
    let next = match input.role {
        Role::Te => CallState::U4CallDelivered,
        Role::Nt => CallState::N7CallReceived,
    };
    Ok(HandlerOutput::unchanged(input.state)
        .to(next)
        .raising(crate::bridge::Event::ProgressMedia {
            call: crate::types::CallIndex(0),
        }))
}

fn handle_progress(input: HandlerInput) -> Result<HandlerOutput> {
    Ok(HandlerOutput::unchanged(input.state).raising(crate::bridge::Event::ProgressMedia {
        call: crate::types::CallIndex(0),
    }))
}

fn handle_connect(input: HandlerInput) -> Result<HandlerOutput> {
    let next = match input.role {
        Role::Te => CallState::U10Active,
        Role::Nt => CallState::N10Active,
    };
    let mut out = HandlerOutput::unchanged(input.state)
        .to(next)
        .raising(crate::bridge::Event::Up {
            call: crate::types::CallIndex(0),
        })
        .stopping(ids::T303);
    if matches!(input.origin, Origin::FromL2) {
        let ack = Generic::new(input.msg.crv().reversed(), MsgType::ConnectAcknowledge);
        out = out.sending(ack);
    }
    Ok(out)
}

fn handle_connect_acknowledge(input: HandlerInput) -> Result<HandlerOutput> {
    let next = match input.role {
        Role::Te => CallState::U10Active,
        Role::Nt => CallState::N10Active,
    };
    Ok(HandlerOutput::unchanged(input.state).to(next))
}

fn handle_disconnect(input: HandlerInput) -> Result<HandlerOutput> {
    let next = match input.role {
        Role::Te => CallState::U12DisconnectIndication,
        Role::Nt => CallState::N12DisconnectIndication,
    };
    let cause = input
        .msg
        .find_ie(IeType::Cause)
        .and_then(|ie| crate::ie::cause::Cause::unmarshal(&ie.content).ok())
        .map(|c| u8::from(c.value))
        .unwrap_or(31); // 31 = normal, unspecified
    let release = Generic::new(input.msg.crv().reversed(), MsgType::Release);
    Ok(HandlerOutput::unchanged(input.state)
        .to(next)
        .raising(crate::bridge::Event::Terminating {
            call: crate::types::CallIndex(0),
            cause,
        })
        .sending(release)
        .starting(ids::T308))
}

fn handle_release(input: HandlerInput) -> Result<HandlerOutput> {
    let next = match input.role {
        Role::Te => CallState::U19ReleaseRequest,
        Role::Nt => CallState::N19ReleaseRequest,
    };
    let complete = Generic::new(input.msg.crv().reversed(), MsgType::ReleaseComplete);
    Ok(HandlerOutput::unchanged(input.state)
        .to(next)
        .sending(complete))
}

fn handle_release_complete(input: HandlerInput) -> Result<HandlerOutput> {
    Ok(HandlerOutput::unchanged(input.state)
        .to(CallState::Idle)
        .raising(crate::bridge::Event::Stop {
            call: crate::types::CallIndex(0),
        })
        .stopping(ids::T308))
}

fn handle_restart(input: HandlerInput) -> Result<HandlerOutput> {
    let ack = Generic::new(input.msg.crv(), MsgType::RestartAcknowledge);
    let mut out = HandlerOutput::unchanged(CallState::Idle).raising(
        crate::bridge::Event::RestartChannel {
            b_channel: crate::types::BChannel::UNASSIGNED,
        },
    );
    if input.auto_ack {
        out = out.sending(ack);
    }
    Ok(out)
}

fn handle_restart_acknowledge(_input: HandlerInput) -> Result<HandlerOutput> {
    Ok(HandlerOutput::unchanged(CallState::Idle))
}

fn handle_status_enquiry(input: HandlerInput) -> Result<HandlerOutput> {
    use crate::ie::call_state::CallState as CallStateIe;
    let status = Generic::new(input.msg.crv().reversed(), MsgType::Status).with_ie(
        crate::ie::Ie::new(
            IeType::CallState,
            CallStateIe::new(input.state.code() as u8).marshal().to_vec(),
        ),
    );
    Ok(HandlerOutput::unchanged(input.state).sending(status))
}

fn handle_information(input: HandlerInput) -> Result<HandlerOutput> {
    // Overlap-dial digit accumulation is the signalling bridge's job
    // (spec.md §4.8); the state engine only needs to stay in the
    // overlap-receiving state until the bridge promotes the call.
    Ok(HandlerOutput::unchanged(input.state))
}

/// 5ESS maintenance-PD SERVICE: takes the named channel out of service and
/// replies SERVICE_ACKNOWLEDGE under the same maintenance PD if requested
/// (spec.md §4.2 "Overload points"). Carries no call-table transition of
/// its own; `Trunk` turns the event into `channel_in_service` bookkeeping.
fn handle_service(input: HandlerInput) -> Result<HandlerOutput> {
    use crate::ie::change_status::{ChangeStatus, NewStatus};
    let b_channel = input
        .msg
        .find_ie(IeType::ChannelIdentification)
        .and_then(|ie| crate::ie::channel_identification::ChannelIdentification::unmarshal(&ie.content).ok())
        .and_then(|ci| ci.channel_number)
        .map(crate::types::BChannel::new)
        .unwrap_or(crate::types::BChannel::UNASSIGNED);
    let out_of_service = input
        .msg
        .find_ie(IeType::ChangeStatus)
        .and_then(|ie| ChangeStatus::unmarshal(&ie.content).ok())
        .map(|cs| matches!(cs.new_status, NewStatus::OutOfService | NewStatus::Maintenance))
        .unwrap_or(true);
    let event = if out_of_service {
        crate::bridge::Event::Suspended { b_channel }
    } else {
        crate::bridge::Event::Resumed { b_channel }
    };
    let mut out = HandlerOutput::unchanged(input.state).raising(event);
    if input.auto_ack {
        let ack = Generic::maintenance(input.msg.crv().reversed(), MsgType::ServiceAcknowledge);
        out = out.sending(ack);
    }
    Ok(out)
}

fn handle_service_acknowledge(input: HandlerInput) -> Result<HandlerOutput> {
    Ok(HandlerOutput::unchanged(input.state))
}

// ---------------------------------------------------------------------
// Q.932 supplementary-service skeletons (spec.md in-scope item (e):
// "full Q.932 supplementary services beyond HOLD/RETRIEVE/FACILITY
// skeletons" are an explicit Non-goal, so these handlers track state and
// raise bridge events but do not decode the full ROSE/APDU grammar inside
// the Facility IE -- see `ie::facility`).
// ---------------------------------------------------------------------

fn handle_hold(input: HandlerInput) -> Result<HandlerOutput> {
    let mut out = HandlerOutput::unchanged(input.state);
    if matches!(input.origin, Origin::FromL2) {
        out = out.raising(crate::bridge::Event::Held {
            call: crate::types::CallIndex(0),
        });
        if input.auto_ack {
            let ack = Generic::new(input.msg.crv().reversed(), MsgType::HoldAcknowledge);
            out = out.sending(ack);
        }
    } else {
        out = out.sending(input.msg.clone());
    }
    Ok(out)
}

fn handle_hold_acknowledge(input: HandlerInput) -> Result<HandlerOutput> {
    Ok(HandlerOutput::unchanged(input.state).raising(crate::bridge::Event::Held {
        call: crate::types::CallIndex(0),
    }))
}

fn handle_hold_reject(input: HandlerInput) -> Result<HandlerOutput> {
    // Hold was refused; the call stays fully up, nothing changes.
    Ok(HandlerOutput::unchanged(input.state))
}

fn handle_retrieve(input: HandlerInput) -> Result<HandlerOutput> {
    let mut out = HandlerOutput::unchanged(input.state);
    if matches!(input.origin, Origin::FromL2) {
        out = out.raising(crate::bridge::Event::Retrieved {
            call: crate::types::CallIndex(0),
        });
        if input.auto_ack {
            let ack = Generic::new(input.msg.crv().reversed(), MsgType::RetrieveAcknowledge);
            out = out.sending(ack);
        }
    } else {
        out = out.sending(input.msg.clone());
    }
    Ok(out)
}

fn handle_retrieve_acknowledge(input: HandlerInput) -> Result<HandlerOutput> {
    Ok(HandlerOutput::unchanged(input.state).raising(crate::bridge::Event::Retrieved {
        call: crate::types::CallIndex(0),
    }))
}

fn handle_retrieve_reject(input: HandlerInput) -> Result<HandlerOutput> {
    Ok(HandlerOutput::unchanged(input.state))
}

/// FACILITY (Q.932 §3.1): decodes the component header enough to dispatch
/// HOLD/RETRIEVE invocations that arrive wrapped in a generic FACILITY
/// rather than the dedicated message types above; anything else passes
/// through with no state change (spec.md §4.1a).
fn handle_facility(input: HandlerInput) -> Result<HandlerOutput> {
    use crate::ie::facility::{Facility, Operation};
    let Some(ie) = input.msg.find_ie(IeType::Facility) else {
        return Ok(HandlerOutput::unchanged(input.state));
    };
    let Ok(facility) = Facility::unmarshal(&ie.content) else {
        return Ok(HandlerOutput::unchanged(input.state));
    };
    let event = match facility.operation {
        Operation::Hold | Operation::HoldAck => Some(crate::bridge::Event::Held {
            call: crate::types::CallIndex(0),
        }),
        Operation::Retrieve | Operation::RetrieveAck => Some(crate::bridge::Event::Retrieved {
            call: crate::types::CallIndex(0),
        }),
        _ => None,
    };
    let mut out = HandlerOutput::unchanged(input.state);
    if let Some(event) = event {
        out = out.raising(event);
    }
    Ok(out)
}

/// SUSPEND (Q.931 §4.5, national variants): parks the call under a Call
/// Identity pending a RESUME, freeing the B-channel. The skeleton models
/// the request/ack/reject cycle without retaining the identity-to-call
/// mapping a full implementation would need to match a later RESUME.
fn handle_suspend(input: HandlerInput) -> Result<HandlerOutput> {
    let next = match input.role {
        Role::Te => CallState::U15SuspendRequest,
        Role::Nt => CallState::N15SuspendRequest,
    };
    let mut out = HandlerOutput::unchanged(input.state).to(next);
    if matches!(input.origin, Origin::FromL2) {
        let ack = Generic::new(input.msg.crv().reversed(), MsgType::SuspendAcknowledge);
        out = out.sending(ack);
    } else {
        out = out.sending(input.msg.clone());
    }
    Ok(out)
}

fn handle_suspend_acknowledge(input: HandlerInput) -> Result<HandlerOutput> {
    Ok(HandlerOutput::unchanged(input.state)
        .to(CallState::Idle)
        .raising(crate::bridge::Event::Parked {
            call: crate::types::CallIndex(0),
        }))
}

fn handle_suspend_reject(input: HandlerInput) -> Result<HandlerOutput> {
    let back = match input.role {
        Role::Te => CallState::U10Active,
        Role::Nt => CallState::N10Active,
    };
    Ok(HandlerOutput::unchanged(input.state).to(back))
}

/// RESUME: reconnects a previously-parked call by Call Identity.
fn handle_resume(input: HandlerInput) -> Result<HandlerOutput> {
    let next = match input.role {
        Role::Te => CallState::U17ResumeRequest,
        Role::Nt => CallState::N17ResumeRequest,
    };
    let mut out = HandlerOutput::unchanged(input.state).to(next);
    if matches!(input.origin, Origin::FromL2) {
        let ack = Generic::new(input.msg.crv().reversed(), MsgType::ResumeAcknowledge);
        out = out.sending(ack);
    } else {
        out = out.sending(input.msg.clone());
    }
    Ok(out)
}

fn handle_resume_acknowledge(input: HandlerInput) -> Result<HandlerOutput> {
    let next = match input.role {
        Role::Te => CallState::U10Active,
        Role::Nt => CallState::N10Active,
    };
    Ok(HandlerOutput::unchanged(input.state)
        .to(next)
        .raising(crate::bridge::Event::Unparked {
            call: crate::types::CallIndex(0),
        }))
}

fn handle_resume_reject(_input: HandlerInput) -> Result<HandlerOutput> {
    Ok(HandlerOutput::unchanged(CallState::Idle))
}

/// NOTIFY (Q.931 §3.1.14): an informational indication attached to an
/// active call; carries no state transition of its own.
fn handle_notify(input: HandlerInput) -> Result<HandlerOutput> {
    use crate::ie::notification_indicator::NotificationIndicator;
    let description = input
        .msg
        .find_ie(IeType::NotificationIndicator)
        .and_then(|ie| NotificationIndicator::unmarshal(&ie.content).ok())
        .map(|n| n.description)
        .unwrap_or(crate::ie::notification_indicator::NotificationDescription::Other(0));
    Ok(HandlerOutput::unchanged(input.state).raising(crate::bridge::Event::Notified {
        call: crate::types::CallIndex(0),
        description,
    }))
}

/// Registers the message handlers and their IE whitelists shared by both
/// `generic_te` and `generic_nt`. `role` tells each shared handler which
/// branch to take; the two constructors below differ only in which `Role`
/// they close over and which states a message lands in.
fn register_shared(table: &mut DialectTable) {
    use IeType::*;
    table.register(
        MsgType::Setup,
        handle_setup,
        vec![
            BearerCapability,
            ChannelIdentification,
            ProgressIndicator,
            NetworkSpecificFacilities,
            Display,
            DateTime,
            KeypadFacility,
            Signal,
            CallingPartyNumber,
            CallingPartySubaddress,
            CalledPartyNumber,
            CalledPartySubaddress,
            TransitNetworkSelection,
            LowLayerCompatibility,
            HighLayerCompatibility,
        ],
    );
    table.register(
        MsgType::CallProceeding,
        handle_call_proceeding,
        vec![ChannelIdentification, Display, ProgressIndicator],
    );
    table.register(MsgType::Alerting, handle_alerting, vec![Display, ProgressIndicator, Signal]);
    table.register(MsgType::Progress, handle_progress, vec![Display, ProgressIndicator]);
    table.register(
        MsgType::Connect,
        handle_connect,
        vec![Display, DateTime, ChannelIdentification],
    );
    table.register(
        MsgType::ConnectAcknowledge,
        handle_connect_acknowledge,
        vec![Display],
    );
    table.register(
        MsgType::Disconnect,
        handle_disconnect,
        vec![Cause, Display],
    );
    table.register(MsgType::Release, handle_release, vec![Cause, Display]);
    table.register(
        MsgType::ReleaseComplete,
        handle_release_complete,
        vec![Cause, Display],
    );
    table.register(MsgType::Restart, handle_restart, vec![ChannelIdentification, RestartIndicator]);
    table.register(MsgType::RestartAcknowledge, handle_restart_acknowledge, vec![ChannelIdentification, RestartIndicator]);
    table.register(MsgType::StatusEnquiry, handle_status_enquiry, vec![]);
    table.register(MsgType::Information, handle_information, vec![CalledPartyNumber, Display]);
    table.register(MsgType::Notify, handle_notify, vec![NotificationIndicator, Display]);
    table.register(MsgType::Facility, handle_facility, vec![Facility]);

    // Q.932 supplementary-service skeletons (spec.md §4.1a).
    table.register(MsgType::Hold, handle_hold, vec![]);
    table.register(MsgType::HoldAcknowledge, handle_hold_acknowledge, vec![]);
    table.register(MsgType::HoldReject, handle_hold_reject, vec![Cause]);
    table.register(MsgType::Retrieve, handle_retrieve, vec![ChannelIdentification]);
    table.register(
        MsgType::RetrieveAcknowledge,
        handle_retrieve_acknowledge,
        vec![ChannelIdentification],
    );
    table.register(MsgType::RetrieveReject, handle_retrieve_reject, vec![Cause]);
    table.register(MsgType::Suspend, handle_suspend, vec![CallIdentity]);
    table.register(MsgType::SuspendAcknowledge, handle_suspend_acknowledge, vec![]);
    table.register(MsgType::SuspendReject, handle_suspend_reject, vec![Cause]);
    table.register(MsgType::Resume, handle_resume, vec![CallIdentity, ChannelIdentification]);
    table.register(
        MsgType::ResumeAcknowledge,
        handle_resume_acknowledge,
        vec![ChannelIdentification],
    );
    table.register(MsgType::ResumeReject, handle_resume_reject, vec![Cause]);

    table.register_timeout(ids::T303, |_| Ok(()), 4_000);
    table.register_timeout(ids::T308, |_| Ok(()), 4_000);
    table.register_timeout(ids::T301, |_| Ok(()), 180_000);
    table.register_timeout(ids::T305, |_| Ok(()), 30_000);
    table.register_timeout(ids::T309, |_| Ok(()), 90_000);
    table.register_timeout(ids::T313, |_| Ok(()), 4_000);
    table.register_timeout(ids::T322, |_| Ok(()), 4_000);
    table.register_timeout(ids::DIGIT_TIMEOUT, |_| Ok(()), 10_000);
}

/// TE-side dispatch table for generic Q.931 (spec.md §4.5's excerpt).
pub fn generic_te() -> DialectTable {
    let mut table = DialectTable::new();
    register_shared(&mut table);
    table
}

/// NT-side dispatch table for generic Q.931, mirroring the TE side with
/// roles reversed (spec.md §4.5 "NT-side transitions").
pub fn generic_nt() -> DialectTable {
    let mut table = DialectTable::new();
    register_shared(&mut table);
    table
}

/// National ISDN (NI-1/NI-2) TE/NT tables. spec.md §4.6 lists National as a
/// built-in dialect whose init registers only what diverges from generic
/// Q.931; until a divergent entry is needed it shares the generic tables
/// verbatim.
pub fn national_te() -> DialectTable {
    generic_te()
}

pub fn national_nt() -> DialectTable {
    generic_nt()
}

/// Nortel DMS-100/250 TE/NT tables, built the same way as [`national_te`]/
/// [`national_nt`] (spec.md §4.6).
pub fn dms_te() -> DialectTable {
    generic_te()
}

pub fn dms_nt() -> DialectTable {
    generic_nt()
}

/// AT&T 5ESS TE/NT tables: generic Q.931 plus the maintenance-PD SERVICE/
/// SERVICE_ACKNOWLEDGE pair the generic dialect never registers (spec.md
/// §4.2 "AT&T 5ESS dialect intercepts message types 0x07 and 0x0F").
fn register_five_ess(table: &mut DialectTable) {
    use IeType::*;
    table.register(
        MsgType::Service,
        handle_service,
        vec![ChannelIdentification, ChangeStatus, Display],
    );
    table.register(MsgType::ServiceAcknowledge, handle_service_acknowledge, vec![ChannelIdentification]);
}

pub fn five_ess_te() -> DialectTable {
    let mut table = generic_te();
    register_five_ess(&mut table);
    table
}

pub fn five_ess_nt() -> DialectTable {
    let mut table = generic_nt();
    register_five_ess(&mut table);
    table
}

/// The legality table for generic Q.931 TE, covering spec.md §4.5's
/// excerpted transitions and the end-to-end scenarios in §8.
pub fn generic_te_legality() -> LegalityTable {
    let mut t = LegalityTable::new();
    t.add(CallState::Idle, MsgType::Setup, Direction::Send)
        .add(CallState::U1CallInitiated, MsgType::SetupAcknowledge, Direction::Recv)
        .add(CallState::U1CallInitiated, MsgType::CallProceeding, Direction::Recv)
        .add(CallState::U1CallInitiated, MsgType::Alerting, Direction::Recv)
        .add(CallState::U1CallInitiated, MsgType::Connect, Direction::Recv)
        .add(CallState::U1CallInitiated, MsgType::Disconnect, Direction::Recv)
        .add(CallState::U1CallInitiated, MsgType::Release, Direction::Recv)
        .add(CallState::U2OverlapSending, MsgType::CallProceeding, Direction::Recv)
        .add(CallState::U2OverlapSending, MsgType::Information, Direction::Send)
        .add(CallState::U3OutgoingCallProceeding, MsgType::Alerting, Direction::Recv)
        .add(CallState::U3OutgoingCallProceeding, MsgType::Connect, Direction::Recv)
        .add(CallState::U3OutgoingCallProceeding, MsgType::Disconnect, Direction::Recv)
        .add(CallState::U3OutgoingCallProceeding, MsgType::Progress, Direction::Recv)
        .add(CallState::U4CallDelivered, MsgType::Connect, Direction::Recv)
        .add(CallState::U4CallDelivered, MsgType::Disconnect, Direction::Recv)
        .add(CallState::U4CallDelivered, MsgType::Progress, Direction::Recv)
        .add(CallState::U10Active, MsgType::Disconnect, Direction::Send)
        .add(CallState::U10Active, MsgType::Disconnect, Direction::Recv)
        .add(CallState::U10Active, MsgType::StatusEnquiry, Direction::Recv)
        .add(CallState::U11DisconnectRequest, MsgType::Release, Direction::Recv)
        .add(CallState::U12DisconnectIndication, MsgType::Release, Direction::Recv)
        .add(CallState::U12DisconnectIndication, MsgType::ReleaseComplete, Direction::Recv)
        .add(CallState::U19ReleaseRequest, MsgType::ReleaseComplete, Direction::Recv)
        .add(CallState::U6CallPresent, MsgType::CallProceeding, Direction::Send)
        .add(CallState::U6CallPresent, MsgType::Disconnect, Direction::Send)
        .add(CallState::U10Active, MsgType::Hold, Direction::Send)
        .add(CallState::U10Active, MsgType::Hold, Direction::Recv)
        .add(CallState::U10Active, MsgType::HoldAcknowledge, Direction::Recv)
        .add(CallState::U10Active, MsgType::HoldReject, Direction::Recv)
        .add(CallState::U10Active, MsgType::Retrieve, Direction::Send)
        .add(CallState::U10Active, MsgType::Retrieve, Direction::Recv)
        .add(CallState::U10Active, MsgType::RetrieveAcknowledge, Direction::Recv)
        .add(CallState::U10Active, MsgType::RetrieveReject, Direction::Recv)
        .add(CallState::U10Active, MsgType::Facility, Direction::Recv)
        .add(CallState::U10Active, MsgType::Notify, Direction::Recv)
        .add(CallState::U10Active, MsgType::Suspend, Direction::Send)
        .add(CallState::U10Active, MsgType::Suspend, Direction::Recv)
        .add(CallState::U15SuspendRequest, MsgType::SuspendAcknowledge, Direction::Recv)
        .add(CallState::U15SuspendRequest, MsgType::SuspendReject, Direction::Recv)
        .add(CallState::Idle, MsgType::Resume, Direction::Send)
        .add(CallState::U17ResumeRequest, MsgType::ResumeAcknowledge, Direction::Recv)
        .add(CallState::U17ResumeRequest, MsgType::ResumeReject, Direction::Recv);
    t
}

/// NT-side legality table mirroring [`generic_te_legality`] with role
/// reversed (spec.md §4.5 "NT-side transitions... mirror the TE side").
pub fn generic_nt_legality() -> LegalityTable {
    let mut t = LegalityTable::new();
    t.add(CallState::Idle, MsgType::Setup, Direction::Recv)
        .add(CallState::N6CallPresent, MsgType::CallProceeding, Direction::Recv)
        .add(CallState::N6CallPresent, MsgType::Alerting, Direction::Recv)
        .add(CallState::N6CallPresent, MsgType::Connect, Direction::Recv)
        .add(CallState::N6CallPresent, MsgType::Disconnect, Direction::Recv)
        .add(CallState::N6CallPresent, MsgType::Release, Direction::Recv)
        .add(CallState::N9IncomingCallProceeding, MsgType::Alerting, Direction::Recv)
        .add(CallState::N9IncomingCallProceeding, MsgType::Connect, Direction::Recv)
        .add(CallState::N9IncomingCallProceeding, MsgType::Disconnect, Direction::Recv)
        .add(CallState::N7CallReceived, MsgType::Connect, Direction::Recv)
        .add(CallState::N7CallReceived, MsgType::Disconnect, Direction::Recv)
        .add(CallState::N10Active, MsgType::Disconnect, Direction::Send)
        .add(CallState::N10Active, MsgType::Disconnect, Direction::Recv)
        .add(CallState::N10Active, MsgType::StatusEnquiry, Direction::Recv)
        .add(CallState::N11DisconnectRequest, MsgType::Release, Direction::Recv)
        .add(CallState::N12DisconnectIndication, MsgType::Release, Direction::Recv)
        .add(CallState::N12DisconnectIndication, MsgType::ReleaseComplete, Direction::Recv)
        .add(CallState::N19ReleaseRequest, MsgType::ReleaseComplete, Direction::Recv)
        .add(CallState::N25OverlapReceiving, MsgType::Information, Direction::Recv)
        .add(CallState::N25OverlapReceiving, MsgType::CallProceeding, Direction::Send)
        .add(CallState::N10Active, MsgType::Hold, Direction::Send)
        .add(CallState::N10Active, MsgType::Hold, Direction::Recv)
        .add(CallState::N10Active, MsgType::HoldAcknowledge, Direction::Recv)
        .add(CallState::N10Active, MsgType::HoldReject, Direction::Recv)
        .add(CallState::N10Active, MsgType::Retrieve, Direction::Send)
        .add(CallState::N10Active, MsgType::Retrieve, Direction::Recv)
        .add(CallState::N10Active, MsgType::RetrieveAcknowledge, Direction::Recv)
        .add(CallState::N10Active, MsgType::RetrieveReject, Direction::Recv)
        .add(CallState::N10Active, MsgType::Facility, Direction::Recv)
        .add(CallState::N10Active, MsgType::Notify, Direction::Recv)
        .add(CallState::N10Active, MsgType::Suspend, Direction::Recv)
        .add(CallState::N15SuspendRequest, MsgType::SuspendAcknowledge, Direction::Send)
        .add(CallState::N15SuspendRequest, MsgType::SuspendReject, Direction::Send)
        .add(CallState::Idle, MsgType::Resume, Direction::Recv)
        .add(CallState::N17ResumeRequest, MsgType::ResumeAcknowledge, Direction::Send)
        .add(CallState::N17ResumeRequest, MsgType::ResumeReject, Direction::Send);
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ie::bearer_capability::{BearerCapability, Layer1Protocol};
    use crate::ie::Ie;
    use crate::types::Crv;

    fn setup_msg(crv: Crv) -> Generic {
        Generic::new(crv, MsgType::Setup).with_ie(Ie::new(
            IeType::BearerCapability,
            BearerCapability::speech(Layer1Protocol::G711Mulaw).marshal(),
        ))
    }

    #[test]
    fn state_code_roundtrips_both_ranges() {
        for s in [
            CallState::Idle,
            CallState::U10Active,
            CallState::U19ReleaseRequest,
            CallState::N6CallPresent,
            CallState::N25OverlapReceiving,
        ] {
            assert_eq!(CallState::from_code(s.code()), Some(s));
        }
    }

    #[test]
    fn legality_table_rejects_unlisted_combination() {
        let t = generic_te_legality();
        assert!(!t.is_legal(CallState::Idle, MsgType::Connect, Direction::Recv));
        assert!(t.is_legal(CallState::Idle, MsgType::Setup, Direction::Send));
    }

    #[test]
    fn restart_is_always_legal() {
        let t = generic_te_legality();
        assert!(t.is_legal(CallState::U10Active, MsgType::Restart, Direction::Recv));
    }

    #[test]
    fn outgoing_setup_te_arms_t303_and_moves_to_u1() {
        let msg = setup_msg(Crv::new(1, false));
        let input = HandlerInput {
            role: Role::Te,
            state: CallState::Idle,
            msg: &msg,
            origin: Origin::FromL4,
            auto_ack: false,
        };
        let out = handle_setup(input).unwrap();
        assert_eq!(out.next_state, CallState::U1CallInitiated);
        assert_eq!(out.start_timer, Some(ids::T303));
        assert_eq!(out.send.len(), 1);
    }

    #[test]
    fn incoming_setup_nt_channel_hunt_without_called_number_goes_overlap() {
        let msg = Generic::new(Crv::new(9, true), MsgType::Setup);
        let input = HandlerInput {
            role: Role::Nt,
            state: CallState::Idle,
            msg: &msg,
            origin: Origin::FromL2,
            auto_ack: false,
        };
        let out = handle_setup(input).unwrap();
        assert_eq!(out.next_state, CallState::N25OverlapReceiving);
        assert_eq!(out.send[0].0.msg_type(), MsgType::SetupAcknowledge);
        assert_eq!(out.start_timer, Some(ids::DIGIT_TIMEOUT));
    }

    #[test]
    fn connect_moves_te_to_active_and_acks() {
        let msg = Generic::new(Crv::new(1, true), MsgType::Connect);
        let input = HandlerInput {
            role: Role::Te,
            state: CallState::U4CallDelivered,
            msg: &msg,
            origin: Origin::FromL2,
            auto_ack: false,
        };
        let out = handle_connect(input).unwrap();
        assert_eq!(out.next_state, CallState::U10Active);
        assert_eq!(out.send.len(), 1);
        assert_eq!(out.stop_timer, Some(ids::T303));
    }

    #[test]
    fn disconnect_emits_release_and_starts_t308() {
        use crate::ie::cause::{Cause, CauseValue};
        let msg = Generic::new(Crv::new(1, true), MsgType::Disconnect).with_ie(Ie::new(
            IeType::Cause,
            Cause::new(CauseValue::NormalClearing, 0).marshal(),
        ));
        let input = HandlerInput {
            role: Role::Te,
            state: CallState::U4CallDelivered,
            msg: &msg,
            origin: Origin::FromL2,
            auto_ack: false,
        };
        let out = handle_disconnect(input).unwrap();
        assert_eq!(out.next_state, CallState::U12DisconnectIndication);
        assert_eq!(out.start_timer, Some(ids::T308));
        assert_eq!(out.send[0].0.msg_type(), MsgType::Release);
        assert!(matches!(
            out.events[0],
            crate::bridge::Event::Terminating { cause: 16, .. }
        ));
    }

    #[test]
    fn incoming_hold_raises_held_and_auto_acks() {
        let msg = Generic::new(Crv::new(1, true), MsgType::Hold);
        let input = HandlerInput {
            role: Role::Nt,
            state: CallState::N10Active,
            msg: &msg,
            origin: Origin::FromL2,
            auto_ack: true,
        };
        let out = handle_hold(input).unwrap();
        assert!(matches!(out.events[0], crate::bridge::Event::Held { .. }));
        assert_eq!(out.send[0].0.msg_type(), MsgType::HoldAcknowledge);
    }

    #[test]
    fn incoming_retrieve_raises_retrieved() {
        let msg = Generic::new(Crv::new(1, true), MsgType::Retrieve);
        let input = HandlerInput {
            role: Role::Te,
            state: CallState::U10Active,
            msg: &msg,
            origin: Origin::FromL2,
            auto_ack: false,
        };
        let out = handle_retrieve(input).unwrap();
        assert!(matches!(out.events[0], crate::bridge::Event::Retrieved { .. }));
        assert!(out.send.is_empty());
    }

    #[test]
    fn suspend_then_acknowledge_parks_and_idles_the_call() {
        let msg = Generic::new(Crv::new(1, false), MsgType::Suspend);
        let input = HandlerInput {
            role: Role::Te,
            state: CallState::U10Active,
            msg: &msg,
            origin: Origin::FromL4,
            auto_ack: false,
        };
        let out = handle_suspend(input).unwrap();
        assert_eq!(out.next_state, CallState::U15SuspendRequest);

        let ack = Generic::new(Crv::new(1, true), MsgType::SuspendAcknowledge);
        let input = HandlerInput {
            role: Role::Te,
            state: CallState::U15SuspendRequest,
            msg: &ack,
            origin: Origin::FromL2,
            auto_ack: false,
        };
        let out = handle_suspend_acknowledge(input).unwrap();
        assert_eq!(out.next_state, CallState::Idle);
        assert!(matches!(out.events[0], crate::bridge::Event::Parked { .. }));
    }

    #[test]
    fn facility_ie_hold_invoke_raises_held() {
        use crate::ie::facility::{Facility, Operation};
        let msg = Generic::new(Crv::new(1, true), MsgType::Facility).with_ie(Ie::new(
            IeType::Facility,
            Facility::invoke(1, Operation::Hold).marshal(),
        ));
        let input = HandlerInput {
            role: Role::Nt,
            state: CallState::N10Active,
            msg: &msg,
            origin: Origin::FromL2,
            auto_ack: false,
        };
        let out = handle_facility(input).unwrap();
        assert!(matches!(out.events[0], crate::bridge::Event::Held { .. }));
    }
}
