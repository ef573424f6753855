//! Hardware adapter: bridges the real sensors to domain port traits.
//!
//! Owns the [`UnitScale`] and the [`LidSwitch`], exposing them through
//! [`MassSensorPort`] and [`LidSensorPort`].  On non-espidf targets the
//! reed switch uses its simulation stub; the scale is generic over the
//! I²C bus, so tests pass in a fake one.
//!
//! Scale failures never reach the core: the last good reading is handed
//! over instead, so a flaky bus looks like "no change" rather than a
//! spurious drink.  Until a first good reading exists there is nothing to
//! hold, so the adapter retries and otherwise reports NaN, which the
//! detector treats as "no reading".

use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::{LidSensorPort, MassSensorPort};
use crate::detect::LidState;
use crate::error::SensorError;
use crate::sensors::lid_switch::LidSwitch;
use crate::sensors::scale::UnitScale;

/// Log only every Nth consecutive failure so a dead bus does not flood UART.
const FAILURE_LOG_EVERY: u32 = 20;

/// Attempts made for the first reading before giving up on it.
pub const FIRST_READ_ATTEMPTS: u32 = 5;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<I2C> {
    scale: UnitScale<I2C>,
    lid: LidSwitch,
    last_good_mass_g: Option<f32>,
    consecutive_failures: u32,
}

impl<I2C: I2c> HardwareAdapter<I2C> {
    pub fn new(scale: UnitScale<I2C>, lid: LidSwitch) -> Self {
        Self {
            scale,
            lid,
            last_good_mass_g: None,
            consecutive_failures: 0,
        }
    }

    /// Read the scale until it answers, at most `attempts` times.  Boot
    /// calls this before seeding the detector.
    pub fn prime(&mut self, attempts: u32) -> Result<f32, SensorError> {
        let mut last_err = SensorError::NotFound;
        for _ in 0..attempts.max(1) {
            match self.scale.weight_g() {
                Ok(grams) => {
                    self.on_read_success(grams);
                    return Ok(grams);
                }
                Err(e) => {
                    self.on_read_failure(e);
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    /// Latest good reading, if the scale ever answered.
    pub fn last_good_mass_g(&self) -> Option<f32> {
        self.last_good_mass_g
    }

    /// Reads failed in a row since the last good one.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn on_read_success(&mut self, grams: f32) {
        self.last_good_mass_g = Some(grams);
        self.consecutive_failures = 0;
    }

    fn on_read_failure(&mut self, err: SensorError) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if self.consecutive_failures % FAILURE_LOG_EVERY == 1 {
            match self.last_good_mass_g {
                Some(held) => warn!(
                    "Scale: {} ({} in a row), holding {:.1} g",
                    err, self.consecutive_failures, held
                ),
                None => warn!(
                    "Scale: {} ({} in a row), no reading yet",
                    err, self.consecutive_failures
                ),
            }
        }
    }
}

// ── MassSensorPort implementation ─────────────────────────────

impl<I2C: I2c> MassSensorPort for HardwareAdapter<I2C> {
    fn read_mass_g(&mut self) -> f32 {
        match self.last_good_mass_g {
            None => self.prime(FIRST_READ_ATTEMPTS).unwrap_or(f32::NAN),
            Some(held) => match self.scale.weight_g() {
                Ok(grams) => {
                    self.on_read_success(grams);
                    grams
                }
                Err(e) => {
                    self.on_read_failure(e);
                    held
                }
            },
        }
    }
}

// ── LidSensorPort implementation ──────────────────────────────

impl<I2C> LidSensorPort for HardwareAdapter<I2C> {
    fn read_lid(&mut self) -> LidState {
        self.lid.read()
    }
}
