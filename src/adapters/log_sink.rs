//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing every event to the ESP-IDF logger
//! (USB-CDC on the XIAO), one `>> {tag}` line per event, in the same tag
//! format the BLE consumer sees.  Delivery status is the BLE adapter's
//! business and is logged there at debug level.

use core::fmt::Write;

use log::{info, warn};

use crate::app::events::MugEvent;
use crate::app::ports::EventSink;
use crate::error::CommsError;

use super::wire::{self, Payload};

/// Adapter that logs every [`MugEvent`] to the serial console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

/// The console line for one event.
pub fn log_line(event: &MugEvent) -> Result<Payload, CommsError> {
    let tag = wire::encode_tag(event)?;
    let mut line = Payload::new();
    write!(line, ">> {}", tag).map_err(|_| CommsError::PayloadTooLarge)?;
    Ok(line)
}

impl EventSink for LogEventSink {
    fn publish(&mut self, event: &MugEvent) {
        match log_line(event) {
            Ok(line) => info!("{}", line),
            Err(e) => warn!(">> {:?} (unencodable: {})", event, e),
        }
    }
}
