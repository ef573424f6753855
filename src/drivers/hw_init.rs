//! Raw GPIO setup for the lid input.
//!
//! The I²C bus is owned by `esp_idf_hal::i2c::I2cDriver` and built in
//! `main()`; the only pin left to configure by hand is the reed switch.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    ESP_OK, gpio_config, gpio_config_t, gpio_get_level, gpio_int_type_t_GPIO_INTR_DISABLE,
    gpio_mode_t_GPIO_MODE_INPUT, gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
    gpio_pullup_t_GPIO_PULLUP_ENABLE,
};
use log::info;

use crate::pins;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    /// `gpio_config` rejected the pin; carries the pin and the esp_err_t.
    GpioConfigFailed { pin: i32, rc: i32 },
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed { pin, rc } => {
                write!(f, "GPIO{} config failed (rc={})", pin, rc)
            }
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(_: HwInitError) -> Self {
        Self::Init("lid GPIO config failed")
    }
}

/// Configure every hand-wired input.  Call once, before the polling loop.
pub fn init_peripherals() -> Result<(), HwInitError> {
    configure_pullup_input(pins::LID_REED_GPIO)?;
    info!("hw_init: lid reed switch on GPIO{} (pull-up)", pins::LID_REED_GPIO);
    Ok(())
}

#[cfg(target_os = "espidf")]
fn configure_pullup_input(pin: i32) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: runs once from main() before any reader exists.
    let rc = unsafe { gpio_config(&cfg) };
    if rc != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed { pin, rc });
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn configure_pullup_input(pin: i32) -> Result<(), HwInitError> {
    if !(0..64).contains(&pin) {
        return Err(HwInitError::GpioConfigFailed { pin, rc: -1 });
    }
    Ok(())
}

/// Level of a configured input, `true` = high.
#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access on a configured input.
    (unsafe { gpio_get_level(pin) }) != 0
}
