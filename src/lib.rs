//! # q931
//!
//! A Q.931/Q.932 ISDN call-control engine: message and information-element
//! codec, a per-call state machine, a timer subsystem, and a dialect
//! registry covering generic Q.931 plus AT&T 5ESS, Nortel DMS-100/250,
//! National ISDN and EuroISDN variants.
//!
//! ## What is Q.931?
//!
//! Q.931 is ITU-T's Layer 3 call-control protocol for ISDN: the signalling
//! that sets up, maintains and tears down a circuit-switched call over a
//! D-channel, independent of the B-channels the call's media travels on.
//! Q.932 layers supplementary services (hold, retrieve, generic facility
//! invocation) on top of it. Real deployments diverge from the ITU text in
//! small, switch-specific ways — a "dialect" — which this crate models as
//! pluggable per-trunk tables rather than `#ifdef`-style compile switches.
//!
//! ## Quick Start
//!
//! ```
//! use q931::ie::{Ie, IeType};
//! use q931::ie::bearer_capability::BearerCapability;
//! use q931::message::{Generic, Message, MsgType};
//! use q931::types::Crv;
//!
//! let bearer_cap = BearerCapability::unrestricted_digital();
//! let setup = Generic::new(Crv::new(1, false), MsgType::Setup)
//!     .with_ie(Ie::new(IeType::BearerCapability, bearer_cap.marshal()));
//!
//! let bytes = setup.marshal();
//! let parsed = q931::message::parse(&bytes).unwrap();
//! assert_eq!(parsed.msg_type(), MsgType::Setup);
//! ```
//!
//! A [`trunk::Trunk`] drives the state machine end to end: it owns the call
//! table, dispatches inbound/outbound messages through the dialect's
//! pack/unpack and proc tables, and ticks timers on a host-supplied clock.
//!
//! ## Module Organization
//!
//! - [`ie`] — Information Elements (Q.931 §4.5)
//! - [`message`] — message header, codec and the `Message` trait
//! - [`call`] — per-trunk call table and CRV allocation
//! - [`timer`] — T3xx timer subsystem and per-dialect defaults
//! - [`state`] — the U-state/N-state call-control state machine
//! - [`dialect`] — per-dialect, per-role dispatch table registry
//! - [`trunk`] — the run-to-completion trunk runtime (C7)
//! - [`bridge`] — the signalling-to-telephony event bridge (C8)
//! - [`error`] — the crate's error taxonomy
//! - [`types`] — typed identifiers (CRV, TEI, B-channel number)

pub mod bridge;
pub mod call;
pub mod dialect;
pub mod error;
pub mod ie;
pub mod message;
pub mod state;
pub mod timer;
pub mod trunk;
pub mod types;

pub use error::{Q931Error, Result};
