//! Wires a TE trunk and an NT trunk back to back over in-memory queues and
//! drives a complete call from SETUP through to RELEASE_COMPLETE, printing
//! every bridge event as it fires. Plays the same "exercise the stack
//! end to end" role the teacher crate's own `examples/` binaries play for
//! PFCP messages, but for a point-to-point call instead of a session.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use q931::bridge::Event;
use q931::dialect::{DialectId, Registry};
use q931::ie::bearer_capability::{BearerCapability, Layer1Protocol};
use q931::ie::called_party_number::{CalledPartyNumber, NumberingPlan, TypeOfNumber};
use q931::ie::cause::{Cause, CauseValue};
use q931::ie::{Ie, IeType};
use q931::message::{Generic, Message, MsgType};
use q931::trunk::{L2Primitive, Trunk, TrunkConfig};
use q931::types::{Crv, Tei};

type FrameQueue = Rc<RefCell<VecDeque<Vec<u8>>>>;

fn wire(trunk: &mut Trunk, out: FrameQueue, side: &'static str) {
    trunk.set_tx_l2(Box::new(move |_prim, _tei, bytes| {
        out.borrow_mut().push_back(bytes.to_vec());
        Ok(())
    }));
    trunk.set_tx_l4(Box::new(move |event| println!("[{side}] {event:?}")));
}

fn pump(from: &FrameQueue, into: &mut Trunk) {
    while let Some(bytes) = from.borrow_mut().pop_front() {
        if let Err(e) = into.rx23(L2Primitive::DlData, Tei::new(0), &bytes) {
            eprintln!("delivery failed: {e}");
        }
    }
}

fn main() {
    let registry = Registry::with_builtins();

    let mut te = Trunk::new(TrunkConfig::pri_te(DialectId::Generic), &registry);
    let mut nt = Trunk::new(TrunkConfig::pri_nt(DialectId::Generic), &registry);

    let te_to_nt: FrameQueue = Rc::new(RefCell::new(VecDeque::new()));
    let nt_to_te: FrameQueue = Rc::new(RefCell::new(VecDeque::new()));
    wire(&mut te, te_to_nt.clone(), "TE");
    wire(&mut nt, nt_to_te.clone(), "NT");

    let setup = Generic::new(Crv::new(0, false), MsgType::Setup)
        .with_ie(Ie::new(
            IeType::BearerCapability,
            BearerCapability::speech(Layer1Protocol::G711Mulaw).marshal(),
        ))
        .with_ie(Ie::new(
            IeType::CalledPartyNumber,
            CalledPartyNumber::new(TypeOfNumber::National, NumberingPlan::Isdn, "5551234567")
                .marshal(),
        ));
    te.rx43_message(setup).expect("outgoing SETUP");
    pump(&te_to_nt, &mut nt);

    // The TE minted the CRV with flag=false; the NT stores the same value
    // with the flag reversed (spec.md §4.3), so every message the demo
    // injects from the NT side addresses the call through that flag.
    let crv_value = te.calls().in_use().next().expect("TE call present").1.crv.value();
    let te_crv = Crv::new(crv_value, false);
    let nt_crv = Crv::new(crv_value, true);

    nt.rx43_message(Generic::new(nt_crv, MsgType::CallProceeding))
        .expect("CALL_PROCEEDING");
    pump(&nt_to_te, &mut te);

    nt.rx43_message(Generic::new(nt_crv, MsgType::Alerting))
        .expect("ALERTING");
    pump(&nt_to_te, &mut te);

    nt.rx43_message(Generic::new(nt_crv, MsgType::Connect))
        .expect("CONNECT");
    pump(&nt_to_te, &mut te); // TE auto-sends CONNECT_ACKNOWLEDGE back
    pump(&te_to_nt, &mut nt);

    println!("-- call active, tearing down --");

    let disconnect = Generic::new(te_crv, MsgType::Disconnect).with_ie(Ie::new(
        IeType::Cause,
        Cause::new(CauseValue::NormalClearing, 0).marshal(),
    ));
    te.rx43_message(disconnect).expect("DISCONNECT");
    pump(&te_to_nt, &mut nt); // NT auto-sends RELEASE back
    pump(&nt_to_te, &mut te); // TE auto-sends RELEASE_COMPLETE back
    pump(&te_to_nt, &mut nt);

    println!(
        "done: TE calls in use = {}, NT calls in use = {}",
        te.calls().in_use().count(),
        nt.calls().in_use().count()
    );
}
