//! Outbound application events.
//!
//! The detection core emits these through the
//! [`EventSink`](super::ports::EventSink) port as plain structured values.
//! Rendering them into bytes for a consumer happens at the transport
//! boundary (see [`adapters::wire`](crate::adapters::wire)).

use serde::Serialize;

/// Classification of a flushed net weight change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NetChangeKind {
    /// Mass lost with the lid open.
    Drinking,
    /// Mass gained, whatever the lid state.
    Adding,
    /// Mass lost with the lid closed.
    ThrowingAway,
}

/// One classified net change, emitted after the weight has settled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetChangeEvent {
    pub kind: NetChangeKind,
    /// Absolute accumulated change in grams (≈ millilitres).
    pub magnitude_g: f32,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LidTransitionKind {
    LidOpened,
    LidClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LidTransitionEvent {
    pub kind: LidTransitionKind,
    pub timestamp_ms: u64,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MugEvent {
    /// Settled weight change (drinking, adding, throwing away).
    NetChange(NetChangeEvent),
    /// The lid switched state.
    Lid(LidTransitionEvent),
}

impl MugEvent {
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            Self::NetChange(e) => e.timestamp_ms,
            Self::Lid(e) => e.timestamp_ms,
        }
    }
}

impl From<NetChangeEvent> for MugEvent {
    fn from(e: NetChangeEvent) -> Self {
        Self::NetChange(e)
    }
}

impl From<LidTransitionEvent> for MugEvent {
    fn from(e: LidTransitionEvent) -> Self {
        Self::Lid(e)
    }
}
