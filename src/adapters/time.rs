//! Monotonic uptime clock.
//!
//! The detector never reads a clock itself; the polling loop samples this
//! once per cycle and passes `now_ms` down.  On the device it is the
//! ESP-IDF high-resolution timer, on the host an `Instant` taken at
//! construction.

#[cfg(not(target_os = "espidf"))]
use std::time::Instant;

pub struct UptimeClock {
    #[cfg(not(target_os = "espidf"))]
    origin: Instant,
}

impl Default for UptimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl UptimeClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            origin: Instant::now(),
        }
    }

    /// Milliseconds since boot.
    #[cfg(target_os = "espidf")]
    pub fn now_ms(&self) -> u64 {
        // esp_timer_get_time counts microseconds from boot and never wraps
        // in practice (i64).
        let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        u64::try_from(us).unwrap_or(0) / 1_000
    }

    /// Milliseconds since this clock was created.
    #[cfg(not(target_os = "espidf"))]
    pub fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
