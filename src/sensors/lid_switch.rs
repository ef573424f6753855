//! Reed switch in the lid hinge.
//!
//! The switch shorts the input to GND while the lid magnet is near, so
//! with the internal pull-up a LOW level means "closed".
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the real GPIO level via hw_init helpers.
//! On host/test: reads a simulated level (defaults to closed).

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, Ordering};

use crate::detect::LidState;

#[cfg(not(target_os = "espidf"))]
static SIM_LID_CLOSED: AtomicBool = AtomicBool::new(true);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_lid_closed(closed: bool) {
    SIM_LID_CLOSED.store(closed, Ordering::Relaxed);
}

pub struct LidSwitch {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    gpio: i32,
}

impl LidSwitch {
    pub fn new(gpio: i32) -> Self {
        Self { gpio }
    }

    pub fn read(&mut self) -> LidState {
        LidState::from_closed(self.read_closed())
    }

    #[cfg(target_os = "espidf")]
    fn read_closed(&self) -> bool {
        // Active low.
        !crate::drivers::hw_init::gpio_read(self.gpio)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_closed(&self) -> bool {
        SIM_LID_CLOSED.load(Ordering::Relaxed)
    }
}
