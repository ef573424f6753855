//! Fuzz target: `wire::encode`
//!
//! Any finite-or-not magnitude and any timestamp must encode without
//! panicking, and tag payloads must stay ASCII and within one buffer.
//!
//! cargo fuzz run fuzz_wire_tag

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartmug::adapters::wire;
use smartmug::app::events::{MugEvent, NetChangeEvent, NetChangeKind};
use smartmug::config::WireFormat;

fuzz_target!(|data: &[u8]| {
    if data.len() < 13 {
        return;
    }
    let kind = match data[0] % 3 {
        0 => NetChangeKind::Drinking,
        1 => NetChangeKind::Adding,
        _ => NetChangeKind::ThrowingAway,
    };
    let magnitude_g = f32::from_le_bytes([data[1], data[2], data[3], data[4]]);
    let mut ts = [0u8; 8];
    ts.copy_from_slice(&data[5..13]);
    let event = MugEvent::NetChange(NetChangeEvent {
        kind,
        magnitude_g,
        timestamp_ms: u64::from_le_bytes(ts),
    });

    if let Ok(tag) = wire::encode(&event, WireFormat::Tag) {
        assert!(tag.is_ascii());
        assert!(tag.contains("_ml@"));
    }
    let _ = wire::encode(&event, WireFormat::Json);
});
