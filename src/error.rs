//! Unified error types for the SmartMug firmware.
//!
//! A single `Error` enum that every hardware-facing subsystem converts
//! into, so boot code and adapters report failures uniformly.  All
//! variants are `Copy`; the detection core itself never fails and does
//! not use these types.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible hardware or boot operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read or returned implausible data.
    Sensor(SensorError),
    /// The BLE stack failed.
    Comms(CommsError),
    /// Peripheral initialisation failed.
    Init(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The scale did not acknowledge its I2C address.
    NotFound,
    /// An I2C transaction with the scale failed.
    I2cReadFailed,
    /// Reading is not a finite number.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "scale not found"),
            Self::I2cReadFailed => write!(f, "I2C read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Controller or Bluedroid bring-up returned a non-OK code.
    BleInitFailed(i32),
    /// Advertising could not be (re)started.
    AdvertisingFailed(i32),
    /// The payload does not fit in a single notification.
    PayloadTooLarge,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BleInitFailed(rc) => write!(f, "BLE init failed (rc={})", rc),
            Self::AdvertisingFailed(rc) => write!(f, "BLE advertising failed (rc={})", rc),
            Self::PayloadTooLarge => write!(f, "notification payload too large"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}
