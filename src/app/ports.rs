//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MugService (domain)
//! ```
//!
//! Driven adapters (scale, reed switch, event sinks) implement these
//! traits.  The [`MugService`](super::service::MugService) consumes them
//! via generics, so the detection core never touches hardware directly.
//!
//! Sensor ports are infallible by contract: if the hardware misbehaves,
//! the adapter decides what value to hand over (typically the last good
//! one) and logs the failure itself.

use crate::detect::LidState;

use super::events::MugEvent;

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Load-cell reading in grams.
pub trait MassSensorPort {
    fn read_mass_g(&mut self) -> f32;
}

/// Current lid position.
pub trait LidSensorPort {
    fn read_lid(&mut self) -> LidState;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / transport)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`MugEvent`]s through this port.
/// Adapters decide where they go (serial log, outbox, BLE notify).
///
/// Delivery is best-effort: the core never inspects a result and never
/// retries.
pub trait EventSink {
    fn publish(&mut self, event: &MugEvent);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn publish(&mut self, event: &MugEvent) {
        (**self).publish(event);
    }
}

/// Fan one event out to two sinks, in order.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn publish(&mut self, event: &MugEvent) {
        self.0.publish(event);
        self.1.publish(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}
