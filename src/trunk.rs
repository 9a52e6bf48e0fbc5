//! Trunk runtime (spec.md §4.7, C7): the run-to-completion entry points
//! that glue the codec (C1/C2), call table (C3), timers (C4), state
//! engine (C5) and dialect registry (C6) into something a host can drive.
//!
//! Four entry points, exactly as spec.md §4.7 names them:
//! - [`Trunk::rx23`] — L2 → L3: a frame arrived from the datalink.
//! - [`Trunk::rx43`] — L4 → L3: the host asked the engine to send a message.
//! - `tx34` isn't a method the host calls; it's the `tx_l4` callback this
//!   trunk invokes whenever a handler raises a [`crate::bridge::Event`].
//! - `tx32` likewise isn't public; it's `pack`-then-`tx_l2`, invoked
//!   internally whenever a handler asks to send a message out.
//!
//! Per spec.md §5, every entry point runs to completion: parse, transition,
//! emit, return. There is no internal queue and no thread of its own — the
//! host must serialise calls to a single trunk itself.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::bridge::Event;
use crate::call::CallTable;
use crate::dialect::{DialectId, DialectTable, Registry, Role};
use crate::error::{Q931Error, Result};
use crate::ie::channel_identification::{ChannelIdentification, ChannelSelection};
use crate::ie::{Ie, IeType};
use crate::message::{Generic, Message, MsgType};
use crate::state::{self, CallState, Direction, HandlerInput, HandlerOutput, Origin};
use crate::timer;
use crate::types::{BChannel, CallIndex, Crv, Tei};

/// Which Layer-2 primitive a frame arrived as, or should be sent as
/// (spec.md §6: "Distinguishes broadcast (DL-UNIT-DATA ...) from unicast
/// (DL-DATA ...)").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum L2Primitive {
    /// Point-to-point, addressed to one TEI.
    DlData,
    /// Point-to-multipoint broadcast, typically TEI 127.
    DlUnitData,
}

/// Physical trunk type (spec.md §3 "Trunk").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrunkType {
    E1,
    T1,
    J1,
    BriPointToPoint,
    BriPointToMultipoint,
}

/// Per-channel-slot tag (spec.md §3 "channel inventory ... each tagged B /
/// D / sync / unused").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChannelType {
    B,
    D,
    Sync,
    Unused,
}

/// Host log levels (spec.md §6 "Levels: none, emerg, alert, crit, error,
/// warning, notice, info, debug").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogLevel {
    None,
    Emerg,
    Alert,
    Crit,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

/// Error ids surfaced to the host's error callback (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorId {
    NoError,
    UnknownMessage,
    IllegalIe,
    UnknownIe,
    BearerCap,
    HlComp,
    LlComp,
    Internal,
    MissingCallback,
    UnexpectedMessage,
    IllegalMessage,
    TooManyCalls,
    InvalidCrv,
    IeDecode,
    CallState,
    Segment,
    ChannelUnacceptable,
}

impl From<&Q931Error> for ErrorId {
    fn from(e: &Q931Error) -> Self {
        match e {
            Q931Error::UnknownMessage(_) => ErrorId::UnknownMessage,
            Q931Error::IllegalIe { .. } => ErrorId::IllegalIe,
            Q931Error::UnknownIe(_) => ErrorId::UnknownIe,
            Q931Error::BearerCap(_) => ErrorId::BearerCap,
            Q931Error::HlComp(_) => ErrorId::HlComp,
            Q931Error::LlComp(_) => ErrorId::LlComp,
            Q931Error::Segment => ErrorId::Segment,
            Q931Error::IeDecode { .. } => ErrorId::IeDecode,
            Q931Error::UnexpectedMessage { .. } => ErrorId::UnexpectedMessage,
            Q931Error::IllegalMessage(_) => ErrorId::IllegalMessage,
            Q931Error::InvalidCrv(_) => ErrorId::InvalidCrv,
            Q931Error::TooManyCalls => ErrorId::TooManyCalls,
            Q931Error::CallState(_) => ErrorId::CallState,
            Q931Error::MissingCallback(_) => ErrorId::MissingCallback,
            Q931Error::Internal(_) => ErrorId::Internal,
            Q931Error::ChannelUnacceptable => ErrorId::ChannelUnacceptable,
        }
    }
}

/// Per-trunk configuration surface (spec.md §6 "Configuration surface").
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrunkConfig {
    pub dialect: DialectId,
    pub role: Role,
    pub trunk_type: TrunkType,
    pub channels: Vec<ChannelType>,
    pub max_calls: usize,
    /// DL-DATA header reserve, default 4 (spec.md §6).
    pub l2_header_reserve_data: usize,
    /// DL-UNIT-DATA header reserve, default 3 (spec.md §6).
    pub l2_header_reserve_unit_data: usize,
    /// L4 header reserve, default 0 (spec.md §6).
    pub l4_header_reserve: usize,
    pub auto_connect_ack: bool,
    pub auto_setup_ack: bool,
    pub auto_restart_ack: bool,
    pub auto_service_ack: bool,
    pub log_level: LogLevel,
}

impl TrunkConfig {
    /// A 23B+D PRI trunk, generic Q.931, NT side, every auto-ack off
    /// (spec.md §4.5: "Each flag is off by default for strict compliance").
    pub fn pri_nt(dialect: DialectId) -> Self {
        let mut channels = vec![ChannelType::B; 23];
        channels.push(ChannelType::D);
        TrunkConfig {
            dialect,
            role: Role::Nt,
            trunk_type: TrunkType::E1,
            channels,
            max_calls: 32,
            l2_header_reserve_data: 4,
            l2_header_reserve_unit_data: 3,
            l4_header_reserve: 0,
            auto_connect_ack: false,
            auto_setup_ack: false,
            auto_restart_ack: false,
            auto_service_ack: false,
            log_level: LogLevel::Info,
        }
    }

    /// The same, but TE side.
    pub fn pri_te(dialect: DialectId) -> Self {
        TrunkConfig {
            role: Role::Te,
            ..TrunkConfig::pri_nt(dialect)
        }
    }

    fn is_bri(&self) -> bool {
        matches!(
            self.trunk_type,
            TrunkType::BriPointToPoint | TrunkType::BriPointToMultipoint
        )
    }
}

/// Overlap-dial accumulator for one call in an overlap-receiving state
/// (spec.md §4.8 "Overlap dial").
#[derive(Debug, Clone, Default)]
struct OverlapState {
    digits: String,
}

/// Host-supplied callback signatures. `Trunk` owns boxed closures rather
/// than a C-style `(fn, *priv)` pair — the closure's captured environment
/// plays the role of `priv` (spec.md §6).
pub type TxL2Callback = Box<dyn FnMut(L2Primitive, Tei, &[u8]) -> Result<()> + Send>;
pub type TxL4Callback = Box<dyn FnMut(Event) + Send>;
pub type ErrorCallback = Box<dyn FnMut(ErrorId, u32, u32) + Send>;
pub type LogCallback = Box<dyn FnMut(LogLevel, &str) + Send>;
pub type TimeCallback = Box<dyn FnMut() -> u64 + Send>;

/// A single trunk's runtime state: call table, scratch config, dialect
/// dispatch and the host callbacks that make it do anything observable.
///
/// `Trunk` borrows its [`Registry`] rather than owning it (design note 9:
/// "the trunk own[s] (or borrows) an immutable dialect descriptor
/// constructed once"), so many trunks can share one process-wide registry
/// without any of them being able to mutate its tables.
pub struct Trunk<'a> {
    config: TrunkConfig,
    registry: &'a Registry,
    calls: CallTable,
    channel_in_service: Vec<bool>,
    overlap: HashMap<CallIndex, OverlapState>,
    enabled: bool,
    tx_l2: Option<TxL2Callback>,
    tx_l4: Option<TxL4Callback>,
    on_error: Option<ErrorCallback>,
    on_log: Option<LogCallback>,
    get_time_ms: Option<TimeCallback>,
}

impl<'a> Trunk<'a> {
    pub fn new(config: TrunkConfig, registry: &'a Registry) -> Self {
        let calls = if config.is_bri() {
            CallTable::bri(config.max_calls)
        } else {
            CallTable::pri(config.max_calls)
        };
        let channel_in_service = vec![true; config.channels.len()];
        Trunk {
            config,
            registry,
            calls,
            channel_in_service,
            overlap: HashMap::new(),
            enabled: true,
            tx_l2: None,
            tx_l4: None,
            on_error: None,
            on_log: None,
            get_time_ms: None,
        }
    }

    pub fn set_tx_l2(&mut self, cb: TxL2Callback) {
        self.tx_l2 = Some(cb);
    }

    pub fn set_tx_l4(&mut self, cb: TxL4Callback) {
        self.tx_l4 = Some(cb);
    }

    pub fn set_error_callback(&mut self, cb: ErrorCallback) {
        self.on_error = Some(cb);
    }

    pub fn set_log_callback(&mut self, cb: LogCallback) {
        self.on_log = Some(cb);
    }

    pub fn set_time_callback(&mut self, cb: TimeCallback) {
        self.get_time_ms = Some(cb);
    }

    pub fn config(&self) -> &TrunkConfig {
        &self.config
    }

    pub fn calls(&self) -> &CallTable {
        &self.calls
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn dialect_table(&self) -> Result<&'a DialectTable> {
        self.registry.get(self.config.dialect, self.config.role)
    }

    fn now_ms(&mut self) -> u64 {
        match self.get_time_ms.as_mut() {
            Some(cb) => cb(),
            None => 0,
        }
    }

    fn log(&mut self, level: LogLevel, text: &str) {
        if level <= self.config.log_level {
            trace!(target: "q931::trunk", %text, "log callback");
        }
        if let Some(cb) = self.on_log.as_mut() {
            cb(level, text);
        }
    }

    fn report_error(&mut self, err: &Q931Error, p1: u32, p2: u32) {
        let id = ErrorId::from(err);
        warn!(target: "q931::trunk", error = %err, "engine error");
        if let Some(cb) = self.on_error.as_mut() {
            cb(id, p1, p2);
        }
    }

    /// spec.md §4.7 Tx34: deliver a bridge event to the host.
    fn tx34(&mut self, event: Event) {
        debug!(target: "q931::trunk", ?event, "raising event to L4");
        if let Some(cb) = self.tx_l4.as_mut() {
            cb(event);
        }
    }

    /// spec.md §4.7 Tx32: pack a message via the dialect table, look up
    /// the TEI for its CRV, and hand the bytes to the host's L2 transmit
    /// callback. CRV 0 (global procedures) always broadcasts.
    fn tx32(&mut self, msg: &Generic) -> Result<()> {
        let bytes = msg.marshal();
        let (primitive, tei) = if msg.crv().is_global() {
            (L2Primitive::DlUnitData, Tei::BROADCAST)
        } else {
            match self.calls.find(msg.crv()) {
                Ok(idx) => (
                    L2Primitive::DlData,
                    self.calls.get(idx).map(|c| c.tei).unwrap_or_default(),
                ),
                Err(_) => (L2Primitive::DlData, Tei::default()),
            }
        };
        match self.tx_l2.as_mut() {
            Some(cb) => cb(primitive, tei, &bytes),
            None => Err(Q931Error::MissingCallback("tx_l2")),
        }
    }

    /// spec.md §4.7 Rx23: a frame arrived from Layer 2.
    ///
    /// `tei` is the Layer-2 terminal endpoint identifier the datalink
    /// collaborator captured for this frame (spec.md §3: captured on the
    /// call for point-to-multipoint). `bytes` is the Q.931 payload with
    /// any datalink header already stripped by the caller.
    pub fn rx23(&mut self, primitive: L2Primitive, tei: Tei, bytes: &[u8]) -> Result<()> {
        let _ = primitive;
        let msg = match crate::message::parse(bytes) {
            Ok(m) => m,
            Err(e) => {
                self.report_error(&e, 0, 0);
                return Err(e);
            }
        };
        self.dispatch(msg, Origin::FromL2, tei)
    }

    /// spec.md §4.7 Rx43: the host injects a message it built for us to
    /// process and, typically, forward out Layer 2.
    pub fn rx43(&mut self, bytes: &[u8]) -> Result<()> {
        let msg = crate::message::parse(bytes)?;
        self.dispatch(msg, Origin::FromL4, Tei::default())
    }

    /// Convenience for hosts that already hold a [`Generic`] (e.g. a demo
    /// building a SETUP programmatically) rather than raw wire bytes.
    pub fn rx43_message(&mut self, msg: Generic) -> Result<()> {
        self.dispatch(msg, Origin::FromL4, Tei::default())
    }

    fn dispatch(&mut self, msg: Generic, origin: Origin, tei: Tei) -> Result<()> {
        if !self.enabled {
            return Err(Q931Error::Internal("trunk is disabled".into()));
        }
        let dialect = self.dialect_table()?;

        for ie in msg.ies() {
            if !dialect.is_legal_ie(msg.msg_type(), ie.ie_type) {
                let err = Q931Error::IllegalIe {
                    ie: ie.ie_type,
                    msg: msg.msg_type(),
                };
                self.report_error(&err, 0, 0);
                return Err(err);
            }
        }

        let role = self.config.role;
        let direction = match origin {
            Origin::FromL2 => Direction::Recv,
            Origin::FromL4 => Direction::Send,
        };

        // spec.md §4.5 step 1: locate or create the call.
        let (call_index, is_new_setup) = match self.locate_or_create_call(&msg, origin, tei) {
            Ok(v) => v,
            Err(e) => {
                self.report_error(&e, 0, 0);
                self.emit_error_disconnect(&msg, &e)?;
                return Err(e);
            }
        };

        // spec.md §4.8 channel hunt: an NT accepting an incoming SETUP
        // resolves the Channel-ID IE (exclusive/specific vs "any") up
        // front, so `finish_event` only has to thread the choice through
        // rather than re-deciding it generically for every event kind.
        if is_new_setup && role == Role::Nt && msg.msg_type() == MsgType::Setup {
            match self.select_channel_for_setup(&msg) {
                Ok(ch) => {
                    if let Some(entry) = self.calls.get_mut(call_index) {
                        entry.b_channel = ch;
                    }
                }
                Err(e) => {
                    self.report_error(&e, 0, 0);
                    self.emit_error_disconnect(&msg, &e)?;
                    return Err(e);
                }
            }
        }

        let current_state = CallState::from_code(
            self.calls.get(call_index).map(|c| c.state).unwrap_or(0),
        )
        .unwrap_or(CallState::Idle);

        // spec.md §4.5 step 2: legality check.
        let legality = self.legality_table();
        if !is_new_setup && !legality.is_legal(current_state, msg.msg_type(), direction) {
            let err = Q931Error::UnexpectedMessage {
                state: current_state.code(),
                msg: msg.msg_type(),
            };
            self.report_error(&err, 0, 0);
            let input = HandlerInput {
                role,
                state: current_state,
                msg: &msg,
                origin,
                auto_ack: false,
            };
            let out = state::unexpected_message(&input);
            self.apply(call_index, out)?;
            return Err(err);
        }

        let auto_ack = self.auto_ack_for(msg.msg_type());
        let proc = dialect.proc(msg.msg_type())?;
        let input = HandlerInput {
            role,
            state: current_state,
            msg: &msg,
            origin,
            auto_ack,
        };
        let out = proc(input)?;
        self.apply(call_index, out)?;

        if msg.msg_type() == MsgType::Information {
            self.handle_overlap_information(call_index, &msg)?;
        }

        Ok(())
    }

    fn legality_table(&self) -> state::LegalityTable {
        match self.config.role {
            Role::Te => state::generic_te_legality(),
            Role::Nt => state::generic_nt_legality(),
        }
    }

    fn auto_ack_for(&self, msg: MsgType) -> bool {
        match msg {
            MsgType::Setup => self.config.auto_setup_ack,
            MsgType::Connect => self.config.auto_connect_ack,
            MsgType::Restart => self.config.auto_restart_ack,
            MsgType::Service => self.config.auto_service_ack,
            _ => false,
        }
    }

    /// spec.md §4.5 step 1. RESTART (CRV 0) is a global procedure, not a
    /// per-call lookup. An inbound SETUP on an unknown CRV allocates a new
    /// call; on a *known* CRV it is rejected per scenario 4. Every other
    /// message looks its call up by reversing the flag, because within a
    /// call the originator always sends one flag value and we store our
    /// own slot keyed by the flag *we* send with.
    fn locate_or_create_call(
        &mut self,
        msg: &Generic,
        origin: Origin,
        tei: Tei,
    ) -> Result<(CallIndex, bool)> {
        if msg.crv().is_global() {
            return Ok((CallIndex(usize::MAX), false));
        }
        match (msg.msg_type(), origin) {
            (MsgType::Setup, Origin::FromL4) => {
                let (crv, idx) = self.calls.create()?;
                let _ = crv;
                Ok((idx, true))
            }
            (MsgType::Setup, Origin::FromL2) => {
                let stored_crv = msg.crv().reversed();
                if self.calls.find(stored_crv).is_ok() {
                    // spec.md §4.5 step 1 / §8 scenario 4: SETUP on an
                    // already-known CRV is rejected with cause 81, not the
                    // generic "not compatible with call state" cause.
                    return Err(Q931Error::InvalidCrv(stored_crv));
                }
                let idx = self.calls.allocate(stored_crv)?;
                if let Some(entry) = self.calls.get_mut(idx) {
                    entry.tei = tei;
                }
                Ok((idx, true))
            }
            (_, Origin::FromL2) => {
                let idx = self.calls.find(msg.crv().reversed())?;
                Ok((idx, false))
            }
            (_, Origin::FromL4) => {
                let idx = self.calls.find(msg.crv())?;
                Ok((idx, false))
            }
        }
    }

    /// spec.md §7/§8: a DISCONNECT carrying the error's cause value, sent
    /// when a handled error warrants telling the peer (duplicate SETUP on
    /// a known CRV -> cause 81, an unsatisfiable channel request -> cause
    /// 6, ...). Only fires for errors that have a well-defined peer-visible
    /// response; internal/configuration errors do not generate wire
    /// traffic.
    fn emit_error_disconnect(&mut self, msg: &Generic, err: &Q931Error) -> Result<()> {
        if !matches!(
            err,
            Q931Error::UnexpectedMessage { .. }
                | Q931Error::TooManyCalls
                | Q931Error::InvalidCrv(_)
                | Q931Error::ChannelUnacceptable
        ) {
            return Ok(());
        }
        use crate::ie::cause::{Cause, CauseValue};
        let cause = Cause::new(CauseValue::from(err.as_cause_value()), 0);
        let reply = Generic::new(msg.crv().reversed(), MsgType::Disconnect)
            .with_ie(Ie::new(IeType::Cause, cause.marshal()));
        self.tx32(&reply)
    }

    /// Applies a handler's decision: state transition, timer start/stop,
    /// outgoing messages via Tx32, events via Tx34 (with NT-side B-channel
    /// selection patched in for `Event::Start`, spec.md §4.8).
    fn apply(&mut self, call_index: CallIndex, out: HandlerOutput) -> Result<()> {
        let now = self.now_ms();
        let dialect = self.dialect_table()?;

        if call_index.0 != usize::MAX {
            if let Some(entry) = self.calls.get_mut(call_index) {
                entry.state = out.next_state.code();
            }
            if let Some(timer_id) = out.stop_timer {
                timer::stop(&mut self.calls, call_index, timer_id);
            }
            if let Some(timer_id) = out.start_timer {
                timer::start(&mut self.calls, dialect, call_index, timer_id, now)?;
            }
        }

        for outgoing in &out.send {
            self.tx32(&outgoing.0)?;
        }

        for event in out.events {
            let event = self.finish_event(call_index, event);
            self.tx34(event);
        }

        if out.next_state == CallState::Idle && call_index.0 != usize::MAX {
            if let Some(entry) = self.calls.get(call_index) {
                self.calls.release(entry.crv);
            }
            self.overlap.remove(&call_index);
        }

        Ok(())
    }

    /// Patches `Event::Start`'s placeholder call index/B-channel with the
    /// real values (spec.md §4.8 channel hunt), and leaves every other
    /// event untouched.
    fn finish_event(&mut self, call_index: CallIndex, event: Event) -> Event {
        match event {
            Event::Start {
                b_channel,
                calling_number,
                called_number,
                ..
            } if call_index.0 != usize::MAX => {
                let already = self.calls.get(call_index).map(|c| c.b_channel).filter(|b| b.is_assigned());
                let assigned = already
                    .or(Some(b_channel).filter(|b| b.is_assigned()))
                    .or_else(|| self.pick_b_channel(ChannelSelection::Any));
                if let (Some(ch), Some(entry)) = (assigned, self.calls.get_mut(call_index)) {
                    entry.b_channel = ch;
                }
                Event::Start {
                    call: call_index,
                    b_channel: assigned.unwrap_or(BChannel::UNASSIGNED),
                    calling_number,
                    called_number,
                }
            }
            Event::Progress { .. } => Event::Progress { call: call_index },
            Event::ProgressMedia { .. } => Event::ProgressMedia { call: call_index },
            Event::Up { .. } => Event::Up { call: call_index },
            Event::Terminating { cause, .. } => Event::Terminating {
                call: call_index,
                cause,
            },
            Event::Stop { .. } => Event::Stop { call: call_index },
            Event::Held { .. } => Event::Held { call: call_index },
            Event::Retrieved { .. } => Event::Retrieved { call: call_index },
            Event::Parked { .. } => Event::Parked { call: call_index },
            Event::Unparked { .. } => Event::Unparked { call: call_index },
            Event::Notified { description, .. } => Event::Notified {
                call: call_index,
                description,
            },
            other => other,
        }
    }

    /// spec.md §4.8 channel hunt: honour an exclusive Channel-ID request,
    /// or search the channel inventory for a free B slot when "any" is
    /// requested. Returns `None` if every B-channel is already assigned.
    fn pick_b_channel(&self, selection: ChannelSelection) -> Option<BChannel> {
        let _ = selection;
        let assigned: std::collections::HashSet<u8> = self
            .calls
            .in_use()
            .filter_map(|(_, c)| c.b_channel.number())
            .collect();
        self.config
            .channels
            .iter()
            .enumerate()
            .filter(|(i, t)| **t == ChannelType::B && self.channel_in_service.get(*i).copied().unwrap_or(false))
            .map(|(i, _)| i as u8)
            .find(|n| !assigned.contains(n))
            .map(BChannel::new)
    }

    /// Resolves the Channel Identification IE on an inbound SETUP into a
    /// concrete B-channel choice, per spec.md §4.8: honour an exclusive
    /// request if free, hunt when "any" was requested, and fail with
    /// cause 6 ("channel unacceptable") if the exclusive request can't be
    /// satisfied.
    fn select_channel_for_setup(&self, msg: &Generic) -> Result<BChannel> {
        let Some(ie) = msg.find_ie(IeType::ChannelIdentification) else {
            return self
                .pick_b_channel(ChannelSelection::Any)
                .ok_or(Q931Error::ChannelUnacceptable);
        };
        let ci = ChannelIdentification::unmarshal(&ie.content)
            .map_err(|e| Q931Error::IeDecode {
                ie: IeType::ChannelIdentification,
                offset: 0,
                reason: e.to_string(),
            })?;
        if let Some(number) = ci.channel_number {
            let in_use = self
                .calls
                .in_use()
                .any(|(_, c)| c.b_channel.number() == Some(number));
            if in_use {
                return Err(Q931Error::ChannelUnacceptable);
            }
            return Ok(BChannel::new(number));
        }
        self.pick_b_channel(ci.info_channel_selection)
            .ok_or(Q931Error::ChannelUnacceptable)
    }

    /// spec.md §4.4: the host-driven periodic tick. Walks the call table
    /// for expired timers and invokes the dialect's timeout handler for
    /// each, in table order, before returning.
    pub fn tick(&mut self, now_ms: u64) -> Result<()> {
        let fired = timer::tick(&mut self.calls, now_ms);
        if fired.is_empty() {
            return Ok(());
        }
        let dialect = self.dialect_table()?;
        for expired in fired {
            if expired.timer_id == timer::ids::DIGIT_TIMEOUT {
                self.promote_overlap_call(expired.call)?;
                continue;
            }
            let handler = dialect.timeout_handler(expired.timer_id)?;
            handler(expired.timer_id)?;
            self.on_timer_expiry(expired.call, expired.timer_id, now_ms)?;
        }
        Ok(())
    }

    /// Default T308-expiry behaviour (spec.md §4.5/§8 scenario 3): the
    /// first expiry resends RELEASE and re-arms T308; only the second
    /// expiry (retry budget exhausted) forces the call to idle and frees
    /// its CRV.
    fn on_timer_expiry(&mut self, call: CallIndex, timer_id: u16, now_ms: u64) -> Result<()> {
        if timer_id != timer::ids::T308 {
            return Ok(());
        }
        let Some(entry) = self.calls.get(call) else {
            return Ok(());
        };
        let crv = entry.crv;
        let retries = entry.release_retries;
        let release = Generic::new(crv, MsgType::Release);
        self.tx32(&release)?;
        if retries == 0 {
            if let Some(entry) = self.calls.get_mut(call) {
                entry.release_retries = 1;
            }
            let dialect = self.dialect_table()?;
            timer::start(&mut self.calls, dialect, call, timer::ids::T308, now_ms)?;
        } else {
            self.calls.release(crv);
        }
        Ok(())
    }

    /// spec.md §4.8 "Overlap dial": accumulate Called-Number digits from
    /// successive INFORMATION messages, restarting the digit timer each
    /// time, and promote the call once a terminating condition is met.
    fn handle_overlap_information(&mut self, call: CallIndex, msg: &Generic) -> Result<()> {
        let in_overlap = self
            .calls
            .get(call)
            .map(|c| CallState::from_code(c.state) == Some(CallState::N25OverlapReceiving))
            .unwrap_or(false);
        if !in_overlap {
            return Ok(());
        }
        let digits = msg
            .find_ie(IeType::CalledPartyNumber)
            .and_then(|ie| crate::ie::called_party_number::CalledPartyNumber::unmarshal(&ie.content).ok())
            .map(|n| n.digits)
            .unwrap_or_default();
        let sending_complete = msg
            .single_octet_ies
            .iter()
            .any(|s| s.id == crate::ie::SingleOctetIe::SENDING_COMPLETE);

        let entry = self.overlap.entry(call).or_default();
        entry.digits.push_str(&digits);
        let terminated = sending_complete || entry.digits.ends_with('#');
        let accumulated = entry.digits.trim_end_matches('#').to_string();

        if terminated {
            self.overlap.remove(&call);
            if let Some(c) = self.calls.get_mut(call) {
                c.state = CallState::N6CallPresent.code();
            }
            timer::stop(&mut self.calls, call, timer::ids::DIGIT_TIMEOUT);
            self.tx34(Event::Start {
                call,
                b_channel: self.calls.get(call).map(|c| c.b_channel).unwrap_or_default(),
                calling_number: None,
                called_number: Some(accumulated),
            });
        } else {
            let now = self.now_ms();
            let dialect = self.dialect_table()?;
            timer::start(&mut self.calls, dialect, call, timer::ids::DIGIT_TIMEOUT, now)?;
        }
        Ok(())
    }

    /// Digit-collection timeout expiry (spec.md §4.8): whatever digits
    /// accumulated so far promote the call, exactly like an explicit
    /// terminator arriving.
    fn promote_overlap_call(&mut self, call: CallIndex) -> Result<()> {
        let digits = self
            .overlap
            .remove(&call)
            .map(|s| s.digits.trim_end_matches('#').to_string())
            .unwrap_or_default();
        if let Some(c) = self.calls.get_mut(call) {
            c.state = CallState::N6CallPresent.code();
        }
        self.tx34(Event::Start {
            call,
            b_channel: self.calls.get(call).map(|c| c.b_channel).unwrap_or_default(),
            calling_number: None,
            called_number: Some(digits),
        });
        Ok(())
    }

    /// spec.md §8 scenario 6: RESTART of all interfaces (or a single
    /// channel). Resets every affected in-use call to idle, frees their
    /// B-channels, raises one `RestartChannel` event per affected channel,
    /// and (if `auto_restart_ack` is set) replies with RESTART_ACKNOWLEDGE.
    pub fn handle_restart_all(&mut self) {
        let channels: Vec<BChannel> = self
            .calls
            .in_use()
            .filter_map(|(_, c)| c.b_channel.number())
            .map(BChannel::new)
            .collect();
        self.calls.release_all();
        self.overlap.clear();
        for ch in channels {
            self.tx34(Event::RestartChannel { b_channel: ch });
        }
        if self.config.auto_restart_ack {
            let ack = Generic::new(Crv::GLOBAL, MsgType::RestartAcknowledge);
            let _ = self.tx32(&ack);
        }
    }

    /// spec.md §4.8 "SERVICE (maintenance) -> mark channel suspended /
    /// resumed." `channel` indexes [`TrunkConfig::channels`].
    pub fn set_channel_service_state(&mut self, channel: usize, in_service: bool) {
        if let Some(slot) = self.channel_in_service.get_mut(channel) {
            if *slot != in_service {
                *slot = in_service;
                let event = if in_service {
                    Event::Resumed {
                        b_channel: BChannel::new(channel as u8),
                    }
                } else {
                    Event::Suspended {
                        b_channel: BChannel::new(channel as u8),
                    }
                };
                self.tx34(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Registry;
    use crate::ie::bearer_capability::{BearerCapability, Layer1Protocol};
    use crate::ie::called_party_number::{CalledPartyNumber, NumberingPlan, TypeOfNumber};
    use std::sync::{Arc, Mutex};

    fn called_number(digits: &str) -> CalledPartyNumber {
        CalledPartyNumber::new(TypeOfNumber::National, NumberingPlan::Isdn, digits)
    }

    fn registry() -> Registry {
        Registry::with_builtins()
    }

    struct Harness {
        sent_l2: Arc<Mutex<Vec<Vec<u8>>>>,
        events: Arc<Mutex<Vec<Event>>>,
    }

    fn wire_harness(trunk: &mut Trunk) -> Harness {
        let sent_l2 = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let sent_l2_cb = sent_l2.clone();
        trunk.set_tx_l2(Box::new(move |_prim, _tei, bytes| {
            sent_l2_cb.lock().unwrap().push(bytes.to_vec());
            Ok(())
        }));
        let events_cb = events.clone();
        trunk.set_tx_l4(Box::new(move |e| {
            events_cb.lock().unwrap().push(e);
        }));
        let mut clock = 0u64;
        trunk.set_time_callback(Box::new(move || {
            clock += 1;
            clock
        }));
        Harness { sent_l2, events }
    }

    #[test]
    fn outgoing_setup_te_emits_on_l2_and_arms_t303() {
        let reg = registry();
        let mut trunk = Trunk::new(TrunkConfig::pri_te(DialectId::Generic), &reg);
        let h = wire_harness(&mut trunk);

        let setup = Generic::new(Crv::new(0, false), MsgType::Setup).with_ie(Ie::new(
            IeType::BearerCapability,
            BearerCapability::speech(Layer1Protocol::G711Mulaw).marshal(),
        ));
        trunk.rx43_message(setup).unwrap();

        assert_eq!(h.sent_l2.lock().unwrap().len(), 1);
        assert_eq!(trunk.calls().in_use().count(), 1);
        let (_, entry) = trunk.calls().in_use().next().unwrap();
        assert_eq!(entry.timer_id, timer::ids::T303);
    }

    #[test]
    fn incoming_setup_nt_assigns_channel_and_raises_start() {
        let reg = registry();
        let mut trunk = Trunk::new(TrunkConfig::pri_nt(DialectId::Generic), &reg);
        let h = wire_harness(&mut trunk);

        let called = called_number("5551234");
        let setup = Generic::new(Crv::new(1, false), MsgType::Setup)
            .with_ie(Ie::new(
                IeType::BearerCapability,
                BearerCapability::speech(Layer1Protocol::G711Mulaw).marshal(),
            ))
            .with_ie(Ie::new(IeType::CalledPartyNumber, called.marshal()));
        trunk.rx23(L2Primitive::DlData, Tei::new(0), &setup.marshal()).unwrap();

        let events = h.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        match &events[0] {
            Event::Start { b_channel, .. } => assert!(b_channel.is_assigned()),
            other => panic!("expected Start, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_setup_on_existing_crv_is_rejected() {
        let reg = registry();
        let mut trunk = Trunk::new(TrunkConfig::pri_nt(DialectId::Generic), &reg);
        let _h = wire_harness(&mut trunk);

        let called = called_number("123");
        let setup = Generic::new(Crv::new(1, false), MsgType::Setup)
            .with_ie(Ie::new(IeType::CalledPartyNumber, called.marshal()));
        trunk.rx23(L2Primitive::DlData, Tei::new(0), &setup.marshal()).unwrap();
        let err = trunk
            .rx23(L2Primitive::DlData, Tei::new(0), &setup.marshal())
            .unwrap_err();
        assert!(matches!(err, Q931Error::InvalidCrv(_)));
        assert_eq!(err.as_cause_value(), 81);

        let sent = h.sent_l2.lock().unwrap();
        let reply = crate::message::parse(sent.last().unwrap()).unwrap();
        assert_eq!(reply.msg_type(), MsgType::Disconnect);
        let cause_ie = reply.find_ie(IeType::Cause).unwrap();
        let cause = crate::ie::cause::Cause::unmarshal(&cause_ie.content).unwrap();
        assert_eq!(cause.value as u8, 81);
    }

    #[test]
    fn restart_all_clears_every_call_and_frees_channels() {
        let reg = registry();
        let mut trunk = Trunk::new(TrunkConfig::pri_nt(DialectId::Generic), &reg);
        let h = wire_harness(&mut trunk);
        let called = called_number("1");
        let setup = Generic::new(Crv::new(1, false), MsgType::Setup)
            .with_ie(Ie::new(IeType::CalledPartyNumber, called.marshal()));
        trunk.rx23(L2Primitive::DlData, Tei::new(0), &setup.marshal()).unwrap();

        trunk.handle_restart_all();
        assert_eq!(trunk.calls().in_use().count(), 0);
        let events = h.events.lock().unwrap();
        assert!(events.iter().any(|e| matches!(e, Event::RestartChannel { .. })));
    }

    #[test]
    fn overlap_dial_accumulates_digits_across_information_messages() {
        let reg = registry();
        let mut trunk = Trunk::new(TrunkConfig::pri_nt(DialectId::Generic), &reg);
        let h = wire_harness(&mut trunk);

        let setup = Generic::new(Crv::new(1, false), MsgType::Setup);
        trunk.rx23(L2Primitive::DlData, Tei::new(0), &setup.marshal()).unwrap();

        let call = trunk.calls().in_use().next().unwrap().0;
        let crv_for_call = trunk.calls().get(call).unwrap().crv;

        let info1 = Generic::new(crv_for_call.reversed(), MsgType::Information).with_ie(Ie::new(
            IeType::CalledPartyNumber,
            called_number("1").marshal(),
        ));
        trunk
            .rx23(L2Primitive::DlData, Tei::new(0), &info1.marshal())
            .unwrap();

        let mut info2 = Generic::new(crv_for_call.reversed(), MsgType::Information).with_ie(Ie::new(
            IeType::CalledPartyNumber,
            called_number("23").marshal(),
        ));
        info2.single_octet_ies.push(crate::ie::SingleOctetIe {
            id: crate::ie::SingleOctetIe::SENDING_COMPLETE,
        });
        trunk
            .rx23(L2Primitive::DlData, Tei::new(0), &info2.marshal())
            .unwrap();

        let events = h.events.lock().unwrap();
        let last = events.last().unwrap();
        match last {
            Event::Start { called_number, .. } => {
                assert_eq!(called_number.as_deref(), Some("123"))
            }
            other => panic!("expected Start, got {other:?}"),
        }
    }

    #[test]
    fn five_ess_service_message_resolves_under_maintenance_pd_and_acks() {
        use crate::ie::change_status::{ChangeStatus, NewStatus};

        let reg = registry();
        let mut config = TrunkConfig::pri_nt(DialectId::FiveEss);
        config.auto_service_ack = true;
        let mut trunk = Trunk::new(config, &reg);
        let h = wire_harness(&mut trunk);

        let service = Generic::maintenance(Crv::GLOBAL, MsgType::Service).with_ie(Ie::new(
            IeType::ChangeStatus,
            ChangeStatus::new(NewStatus::OutOfService).marshal().to_vec(),
        ));
        trunk
            .rx23(L2Primitive::DlData, Tei::new(0), &service.marshal())
            .unwrap();

        let events = h.events.lock().unwrap();
        assert!(matches!(events.last(), Some(Event::Suspended { .. })));
        let sent = h.sent_l2.lock().unwrap();
        let ack = Generic::unmarshal(sent.last().unwrap()).unwrap();
        assert_eq!(ack.msg_type(), MsgType::ServiceAcknowledge);
    }

    #[test]
    fn setup_requesting_busy_exclusive_channel_is_rejected_with_cause_6() {
        use crate::ie::channel_identification::ChannelIdentification;

        let reg = registry();
        let mut trunk = Trunk::new(TrunkConfig::pri_nt(DialectId::Generic), &reg);
        let h = wire_harness(&mut trunk);

        let first = Generic::new(Crv::new(1, false), MsgType::Setup)
            .with_ie(Ie::new(
                IeType::CalledPartyNumber,
                called_number("1").marshal(),
            ))
            .with_ie(Ie::new(
                IeType::ChannelIdentification,
                ChannelIdentification::pri(0, true).marshal(),
            ));
        trunk.rx23(L2Primitive::DlData, Tei::new(0), &first.marshal()).unwrap();

        let second = Generic::new(Crv::new(2, false), MsgType::Setup)
            .with_ie(Ie::new(
                IeType::CalledPartyNumber,
                called_number("2").marshal(),
            ))
            .with_ie(Ie::new(
                IeType::ChannelIdentification,
                ChannelIdentification::pri(0, true).marshal(),
            ));
        let err = trunk
            .rx23(L2Primitive::DlData, Tei::new(0), &second.marshal())
            .unwrap_err();
        assert!(matches!(err, Q931Error::ChannelUnacceptable));
        assert_eq!(err.as_cause_value(), 6);

        let sent = h.sent_l2.lock().unwrap();
        let reply = crate::message::parse(sent.last().unwrap()).unwrap();
        assert_eq!(reply.msg_type(), MsgType::Disconnect);
        let cause_ie = reply.find_ie(IeType::Cause).unwrap();
        let cause = crate::ie::cause::Cause::unmarshal(&cause_ie.content).unwrap();
        assert_eq!(cause.value as u8, 6);
    }

    #[test]
    fn t308_expiry_retries_release_once_before_forcing_idle() {
        let reg = registry();
        let mut trunk = Trunk::new(TrunkConfig::pri_te(DialectId::Generic), &reg);
        let _h = wire_harness(&mut trunk);

        let setup = Generic::new(Crv::new(0, false), MsgType::Setup).with_ie(Ie::new(
            IeType::BearerCapability,
            BearerCapability::speech(Layer1Protocol::G711Mulaw).marshal(),
        ));
        trunk.rx43_message(setup).unwrap();
        let call = trunk.calls().in_use().next().unwrap().0;
        let crv = trunk.calls().get(call).unwrap().crv;

        let disconnect = Generic::new(crv.reversed(), MsgType::Disconnect).with_ie(Ie::new(
            IeType::Cause,
            crate::ie::cause::Cause::new(crate::ie::cause::CauseValue::NormalClearing, 0)
                .marshal(),
        ));
        trunk
            .rx23(L2Primitive::DlData, Tei::new(0), &disconnect.marshal())
            .unwrap();
        assert_eq!(trunk.calls().get(call).unwrap().timer_id, timer::ids::T308);

        trunk.tick(100_000).unwrap();
        let entry = trunk
            .calls()
            .get(call)
            .expect("call survives first T308 expiry");
        assert_eq!(entry.release_retries, 1);
        assert_eq!(entry.timer_id, timer::ids::T308);

        trunk.tick(200_000).unwrap();
        assert!(trunk.calls().get(call).is_none(), "call freed after second T308 expiry");
    }
}
