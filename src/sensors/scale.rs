//! M5Stack Unit Scales (STM32 + HX711 load-cell bridge) over I²C.
//!
//! The unit does its own calibration and filtering and exposes the
//! calibrated weight as a little-endian `f32` register.
//!
//! | Register | Width | Meaning                          |
//! |----------|-------|----------------------------------|
//! | `0x14`   | 4     | calibrated weight, grams (`f32`) |
//! | `0xFE`   | 1     | firmware version                 |
//!
//! Generic over any `embedded_hal::i2c::I2c`, so host tests drive it with
//! a scripted bus and the firmware with `esp_idf_hal::i2c::I2cDriver`.

use embedded_hal::i2c::{Error as _, I2c};
use log::{info, warn};

use crate::error::SensorError;

pub const DEFAULT_ADDR: u8 = 0x26;

const REG_WEIGHT_G: u8 = 0x14;
const REG_FIRMWARE_VERSION: u8 = 0xFE;

pub struct UnitScale<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C: I2c> UnitScale<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDR)
    }

    pub fn with_address(i2c: I2C, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// Probe the unit.  Fails with [`SensorError::NotFound`] if nothing
    /// answers at the configured address.
    pub fn begin(&mut self) -> Result<u8, SensorError> {
        let mut version = [0u8; 1];
        match self
            .i2c
            .write_read(self.addr, &[REG_FIRMWARE_VERSION], &mut version)
        {
            Ok(()) => {
                info!(
                    "UnitScale: found at 0x{:02x}, firmware v{}",
                    self.addr, version[0]
                );
                Ok(version[0])
            }
            Err(e) => {
                warn!("UnitScale: no answer at 0x{:02x} ({:?})", self.addr, e.kind());
                Err(SensorError::NotFound)
            }
        }
    }

    /// Calibrated weight in grams.
    pub fn weight_g(&mut self) -> Result<f32, SensorError> {
        let mut raw = [0u8; 4];
        self.i2c
            .write_read(self.addr, &[REG_WEIGHT_G], &mut raw)
            .map_err(|e| {
                warn!("UnitScale: weight read failed ({:?})", e.kind());
                SensorError::I2cReadFailed
            })?;

        let grams = f32::from_le_bytes(raw);
        if !grams.is_finite() {
            return Err(SensorError::OutOfRange);
        }
        Ok(grams)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}
