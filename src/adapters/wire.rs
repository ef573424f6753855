//! Wire encoding for BLE notifications.
//!
//! The phone app on the other side parses short ASCII tags:
//!
//! | Event                    | Payload                  |
//! |--------------------------|--------------------------|
//! | NetChange / Drinking     | `DRINKING_{ml}_ml@{ts}`  |
//! | NetChange / Adding       | `ADDING_{ml}_ml@{ts}`    |
//! | NetChange / ThrowingAway | `THROWING_{ml}_ml@{ts}`  |
//! | Lid / LidClosed          | `LID_CLOSED`             |
//! | Lid / LidOpened          | `LID_OPEN`               |
//!
//! `{ml}` is the magnitude truncated toward zero, `{ts}` milliseconds
//! since boot.  [`WireFormat::Json`] is the structured alternative.

use core::fmt::Write;

use crate::app::events::{LidTransitionKind, MugEvent, NetChangeKind};
use crate::config::WireFormat;
use crate::error::CommsError;

/// Largest payload we ever notify.  A default 23-byte MTU leaves 20 bytes,
/// so long tags (`DRINKING_120_ml@483210`) are truncated just like JSON
/// unless the client negotiates a larger MTU.
pub const MAX_PAYLOAD_LEN: usize = 128;

pub type Payload = heapless::String<MAX_PAYLOAD_LEN>;

pub fn net_change_prefix(kind: NetChangeKind) -> &'static str {
    match kind {
        NetChangeKind::Drinking => "DRINKING",
        NetChangeKind::Adding => "ADDING",
        NetChangeKind::ThrowingAway => "THROWING",
    }
}

pub fn lid_tag(kind: LidTransitionKind) -> &'static str {
    match kind {
        LidTransitionKind::LidClosed => "LID_CLOSED",
        LidTransitionKind::LidOpened => "LID_OPEN",
    }
}

/// Render an event as the short ASCII tag.
pub fn encode_tag(event: &MugEvent) -> Result<Payload, CommsError> {
    let mut out = Payload::new();
    match event {
        MugEvent::NetChange(e) => write!(
            out,
            "{}_{}_ml@{}",
            net_change_prefix(e.kind),
            e.magnitude_g as u32,
            e.timestamp_ms
        )
        .map_err(|_| CommsError::PayloadTooLarge)?,
        MugEvent::Lid(e) => out
            .push_str(lid_tag(e.kind))
            .map_err(|()| CommsError::PayloadTooLarge)?,
    }
    Ok(out)
}

/// Render an event as compact JSON.
pub fn encode_json(event: &MugEvent) -> Result<Payload, CommsError> {
    let json = serde_json::to_string(event).map_err(|_| CommsError::PayloadTooLarge)?;
    let mut out = Payload::new();
    out.push_str(&json).map_err(|()| CommsError::PayloadTooLarge)?;
    Ok(out)
}

pub fn encode(event: &MugEvent, format: WireFormat) -> Result<Payload, CommsError> {
    match format {
        WireFormat::Tag => encode_tag(event),
        WireFormat::Json => encode_json(event),
    }
}
