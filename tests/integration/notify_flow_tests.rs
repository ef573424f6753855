//! Integration tests: MugService → EventOutbox → BleAdapter (simulated),
//! the same hand-off the firmware runs across two threads.

use smartmug::adapters::ble::{BleAdapter, Characteristic};
use smartmug::adapters::log_sink::LogEventSink;
use smartmug::app::outbox::{EventOutbox, OUTBOX_DEPTH};
use smartmug::app::ports::EventSink;
use smartmug::app::service::MugService;
use smartmug::config::{MugConfig, WireFormat};
use smartmug::detect::LidState;

use super::mock_hw::MockSensors;

fn ble() -> BleAdapter {
    let config = MugConfig::default();
    let mut ble = BleAdapter::new(config.device_name, WireFormat::Tag);
    ble.start().unwrap();
    ble
}

fn drain(outbox: &EventOutbox, ble: &mut BleAdapter) {
    while let Some(event) = outbox.try_receive() {
        ble.publish(&event);
    }
}

#[test]
fn connected_phone_receives_tags_on_both_characteristics() {
    let outbox = EventOutbox::new();
    let mut ble = ble();
    ble.sim_connect();

    let mut hw = MockSensors::new(500.0, LidState::Closed);
    let mut svc = MugService::start(&MugConfig::default(), &mut hw, 0);
    let mut sink = (LogEventSink::new(), outbox.sink());

    hw.lid = LidState::Open;
    svc.tick(&mut hw, &mut sink, 100);
    hw.mass_g = 440.0;
    let mut t = 150;
    while t <= 7_000 {
        svc.tick(&mut hw, &mut sink, t);
        t += 50;
    }
    drain(&outbox, &mut ble);

    let sent = ble.sim_sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, Characteristic::Lid);
    assert_eq!(sent[0].1.as_str(), "LID_OPEN");
    assert_eq!(sent[1].0, Characteristic::Drink);
    assert_eq!(sent[1].1.as_str(), "DRINKING_60_ml@7000");
    assert_eq!(outbox.dropped(), 0);
}

#[test]
fn events_while_disconnected_are_not_sent() {
    let outbox = EventOutbox::new();
    let mut ble = ble();

    let mut hw = MockSensors::new(500.0, LidState::Closed);
    let mut svc = MugService::start(&MugConfig::default(), &mut hw, 0);
    let mut sink = outbox.sink();

    hw.lid = LidState::Open;
    svc.tick(&mut hw, &mut sink, 100);
    drain(&outbox, &mut ble);
    assert!(ble.sim_sent().is_empty());

    ble.sim_connect();
    hw.lid = LidState::Closed;
    svc.tick(&mut hw, &mut sink, 200);
    drain(&outbox, &mut ble);
    assert_eq!(ble.sim_sent().len(), 1);
    assert_eq!(ble.sim_sent()[0].1.as_str(), "LID_CLOSED");
}

#[test]
fn stalled_transport_never_blocks_the_loop() {
    let outbox = EventOutbox::new();
    let mut hw = MockSensors::new(500.0, LidState::Closed);
    let mut svc = MugService::start(&MugConfig::default(), &mut hw, 0);
    let mut sink = outbox.sink();

    // Nobody drains: flip the lid far more often than the queue holds.
    let flips = OUTBOX_DEPTH as u64 * 2;
    for i in 1..=flips {
        hw.lid = if i % 2 == 1 { LidState::Open } else { LidState::Closed };
        svc.tick(&mut hw, &mut sink, i * 50);
    }

    assert_eq!(svc.cycle_count(), flips);
    assert_eq!(outbox.len(), OUTBOX_DEPTH);
    assert_eq!(outbox.dropped() as u64, flips - OUTBOX_DEPTH as u64);
    assert_eq!(svc.status().events_emitted as u64, flips);
}
