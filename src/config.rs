//! System configuration parameters
//!
//! All tunable parameters for the SmartMug detector and its transport.
//! Defaults reproduce the behaviour of the shipped device; there is no
//! persistent storage, so overrides only come from code or tests.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Longest name that fits the 31-byte scan response (one length byte and
/// one type byte go to the AD header).
pub const MAX_DEVICE_NAME_LEN: usize = 29;

/// How emitted events are rendered for the BLE consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// `DRINKING_42_ml@123456` / `LID_OPEN` (what the phone app parses).
    Tag,
    /// `serde_json` rendering of the structured event.
    Json,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MugConfig {
    // --- Weight detector ---
    /// Minimum spacing between two weight samples (milliseconds)
    pub sampling_period_ms: u32,
    /// Quiet time after the last significant change before flushing (milliseconds)
    pub stability_window_ms: u32,
    /// Sample-to-sample deltas at or below this are treated as jitter (grams)
    pub noise_threshold_g: f32,

    // --- Loop ---
    /// Delay between polling cycles (milliseconds)
    pub poll_interval_ms: u32,

    // --- Transport ---
    pub wire_format: WireFormat,
    /// BLE advertised name
    pub device_name: heapless::String<MAX_DEVICE_NAME_LEN>,
}

impl Default for MugConfig {
    fn default() -> Self {
        let mut device_name = heapless::String::new();
        // "SmartMug" is 8 bytes, well under capacity.
        let _ = device_name.push_str("SmartMug");

        Self {
            sampling_period_ms: 2_000,
            stability_window_ms: 5_000,
            noise_threshold_g: 10.0,
            poll_interval_ms: 50,
            wire_format: WireFormat::Tag,
            device_name,
        }
    }
}

impl MugConfig {
    /// Range-check every field.  Out-of-range values are rejected, never
    /// clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(100..=60_000).contains(&self.sampling_period_ms) {
            return Err(ConfigError::ValidationFailed(
                "sampling_period_ms must be 100..=60000",
            ));
        }
        if self.stability_window_ms < self.sampling_period_ms
            || self.stability_window_ms > 600_000
        {
            return Err(ConfigError::ValidationFailed(
                "stability_window_ms must be >= sampling_period_ms and <= 600000",
            ));
        }
        if !self.noise_threshold_g.is_finite()
            || !(0.0..=1_000.0).contains(&self.noise_threshold_g)
        {
            return Err(ConfigError::ValidationFailed(
                "noise_threshold_g must be finite and 0..=1000",
            ));
        }
        if !(10..=1_000).contains(&self.poll_interval_ms)
            || self.poll_interval_ms >= self.sampling_period_ms
        {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms must be 10..=1000 and below sampling_period_ms",
            ));
        }
        if self.device_name.is_empty()
            || !self.device_name.bytes().all(|b| b.is_ascii_graphic() || b == b' ')
        {
            return Err(ConfigError::ValidationFailed(
                "device_name must be 1-29 printable ASCII bytes",
            ));
        }
        Ok(())
    }
}
