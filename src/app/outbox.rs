//! Event outbox: single-producer hand-off from the control loop to the
//! transport thread.
//!
//! Uses an `embassy-sync` bounded channel so the polling loop never
//! blocks on a slow or absent BLE peer.  When the queue is full the new
//! event is dropped and counted.
//!
//! ```text
//! ┌──────────────┐  MugEvent  ┌──────────────────┐
//! │ Control Loop │──────────▶│ Notifier thread   │──▶ BLE notify
//! │  (sync)      │ try_send   │ (block_on recv)   │
//! └──────────────┘            └──────────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use super::events::MugEvent;
use super::ports::EventSink;

/// Channel depth for outbound events.  Lid and weight events arrive at
/// human speed; 16 covers a long BLE stall.
pub const OUTBOX_DEPTH: usize = 16;

pub struct EventOutbox {
    channel: Channel<CriticalSectionRawMutex, MugEvent, OUTBOX_DEPTH>,
    dropped: AtomicU32,
}

impl Default for EventOutbox {
    fn default() -> Self {
        Self::new()
    }
}

impl EventOutbox {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Producer handle for the control loop.
    pub fn sink(&self) -> OutboxSink<'_> {
        OutboxSink { outbox: self }
    }

    /// Wait for the next event (transport side).
    pub async fn receive(&self) -> MugEvent {
        self.channel.receive().await
    }

    pub fn try_receive(&self) -> Option<MugEvent> {
        self.channel.try_receive().ok()
    }

    /// Events discarded because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

/// [`EventSink`] that enqueues without blocking.
pub struct OutboxSink<'a> {
    outbox: &'a EventOutbox,
}

impl EventSink for OutboxSink<'_> {
    fn publish(&mut self, event: &MugEvent) {
        if self.outbox.channel.try_send(*event).is_err() {
            let dropped = self.outbox.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            warn!("Outbox full, dropped event @{} ms (total {})", event.timestamp_ms(), dropped);
        }
    }
}
