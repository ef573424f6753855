//! Task watchdog for the polling loop.
//!
//! A wedged I²C transaction or a stuck BLE call would freeze detection
//! silently; the TWDT turns that into a reboot.  The loop feeds once per
//! cycle.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    ESP_OK, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure, esp_task_wdt_reset,
};
use log::{info, warn};

/// Floor for the timeout, whatever the poll interval.
pub const MIN_TIMEOUT_MS: u32 = 5_000;

/// Missed cycles tolerated before the reset fires.
const MISSED_CYCLES: u32 = 40;

/// Timeout for a loop polling every `poll_interval_ms`.
pub fn timeout_for(poll_interval_ms: u32) -> u32 {
    poll_interval_ms.saturating_mul(MISSED_CYCLES).max(MIN_TIMEOUT_MS)
}

pub struct LoopWatchdog {
    timeout_ms: u32,
    armed: bool,
}

impl LoopWatchdog {
    /// Subscribe the calling task.  Failure leaves the loop unguarded but
    /// running.
    pub fn arm(timeout_ms: u32) -> Self {
        let armed = Self::subscribe(timeout_ms);
        if armed {
            info!("Watchdog armed ({} ms)", timeout_ms);
        } else {
            warn!("Watchdog not armed, loop stalls will go unnoticed");
        }
        Self { timeout_ms, armed }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        if self.armed {
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn subscribe(timeout_ms: u32) -> bool {
        let cfg = esp_task_wdt_config_t {
            timeout_ms,
            idle_core_mask: 0,
            trigger_panic: true,
        };
        unsafe {
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                warn!("TWDT reconfigure returned {}", ret);
            }
            esp_task_wdt_add(core::ptr::null_mut()) == ESP_OK
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn subscribe(_timeout_ms: u32) -> bool {
        true
    }
}
