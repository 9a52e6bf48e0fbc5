//! Codec performance benchmarks, grounded on the teacher crate's
//! `benches/*.rs` layout: one `criterion_group` covering IE marshal/
//! unmarshal, one covering full message codec round trips.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use q931::ie::bearer_capability::{BearerCapability, Layer1Protocol};
use q931::ie::called_party_number::{CalledPartyNumber, NumberingPlan, TypeOfNumber};
use q931::ie::cause::{Cause, CauseValue};
use q931::ie::Ie;
use q931::message::{Generic, Message, MsgType};
use q931::types::Crv;

fn bench_ie_marshal(c: &mut Criterion) {
    let mut group = c.benchmark_group("ie_marshal");

    let bearer_cap = BearerCapability::speech(Layer1Protocol::G711Mulaw);
    group.bench_function("bearer_capability", |b| {
        b.iter(|| black_box(bearer_cap.marshal()))
    });

    let called = CalledPartyNumber::new(TypeOfNumber::National, NumberingPlan::Isdn, "5551234567");
    group.bench_function("called_party_number", |b| b.iter(|| black_box(called.marshal())));

    let cause = Cause::new(CauseValue::NormalClearing, 0);
    group.bench_function("cause", |b| b.iter(|| black_box(cause.marshal())));

    group.finish();
}

fn bench_ie_unmarshal(c: &mut Criterion) {
    let mut group = c.benchmark_group("ie_unmarshal");

    let bearer_cap_bytes = BearerCapability::speech(Layer1Protocol::G711Mulaw).marshal();
    group.bench_function("bearer_capability", |b| {
        b.iter(|| black_box(BearerCapability::unmarshal(&bearer_cap_bytes).unwrap()))
    });

    let called_bytes =
        CalledPartyNumber::new(TypeOfNumber::National, NumberingPlan::Isdn, "5551234567").marshal();
    group.bench_function("called_party_number", |b| {
        b.iter(|| black_box(CalledPartyNumber::unmarshal(&called_bytes).unwrap()))
    });

    group.finish();
}

fn bench_message_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_codec");

    let setup = Generic::new(Crv::new(1, false), MsgType::Setup)
        .with_ie(Ie::new(
            q931::ie::IeType::BearerCapability,
            BearerCapability::speech(Layer1Protocol::G711Mulaw).marshal(),
        ))
        .with_ie(Ie::new(
            q931::ie::IeType::CalledPartyNumber,
            CalledPartyNumber::new(TypeOfNumber::National, NumberingPlan::Isdn, "5551234567")
                .marshal(),
        ));
    let setup_bytes = setup.marshal();

    group.bench_function("setup_marshal", |b| b.iter(|| black_box(setup.marshal())));
    group.bench_function("setup_unmarshal", |b| {
        b.iter(|| black_box(Generic::unmarshal(&setup_bytes).unwrap()))
    });

    let disconnect = Generic::new(Crv::new(1, true), MsgType::Disconnect).with_ie(Ie::new(
        q931::ie::IeType::Cause,
        Cause::new(CauseValue::NormalClearing, 0).marshal(),
    ));
    let disconnect_bytes = disconnect.marshal();
    group.bench_function("disconnect_unmarshal", |b| {
        b.iter(|| black_box(Generic::unmarshal(&disconnect_bytes).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_ie_marshal, bench_ie_unmarshal, bench_message_codec);
criterion_main!(benches);
