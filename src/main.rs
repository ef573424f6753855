//! SmartMug Firmware: main entry point
//!
//! Single polling loop driving the detection core, with BLE notifications
//! handed off to a dedicated thread.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                     │
//! │                                                               │
//! │  HardwareAdapter          LogEventSink       UptimeClock      │
//! │  (Mass + Lid ports)       (EventSink)        (now ms)         │
//! │                                                               │
//! │  ──────────────── Port Trait Boundary ───────────────────     │
//! │                                                               │
//! │  ┌─────────────────────────────────────────────────────┐      │
//! │  │           MugService (pure logic)                   │      │
//! │  │  LidMonitor · WeightEventDetector                   │      │
//! │  └─────────────────────────────────────────────────────┘      │
//! │                          │ OutboxSink (try_send)              │
//! │                          ▼                                    │
//! │            EventOutbox ──▶ notifier thread ──▶ BleAdapter     │
//! └───────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::thread;
use std::time::Duration;

use anyhow::Result;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::prelude::*;
use log::{error, info, warn};

use smartmug::adapters::ble::BleAdapter;
use smartmug::adapters::hardware::{FIRST_READ_ATTEMPTS, HardwareAdapter};
use smartmug::adapters::log_sink::LogEventSink;
use smartmug::adapters::time::UptimeClock;
use smartmug::app::outbox::EventOutbox;
use smartmug::app::ports::EventSink;
use smartmug::app::service::MugService;
use smartmug::config::MugConfig;
use smartmug::drivers::hw_init;
use smartmug::drivers::watchdog::{self, LoopWatchdog};
use smartmug::error::Error;
use smartmug::pins;
use smartmug::sensors::lid_switch::LidSwitch;
use smartmug::sensors::scale::UnitScale;

/// Control loop → notifier thread.
static OUTBOX: EventOutbox = EventOutbox::new();

/// Status line cadence, in polling cycles (≈ 1 min at 50 ms).
const STATUS_EVERY_CYCLES: u64 = 1_200;

const NOTIFIER_STACK_BYTES: usize = 6 * 1024;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("SmartMug v{}", env!("CARGO_PKG_VERSION"));

    let config = MugConfig::default();
    config.validate().map_err(Error::from)?;

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;

    // Typed pins below must match the board map.
    const _: () = assert!(pins::I2C_SDA_GPIO == 6 && pins::I2C_SCL_GPIO == 7);

    let peripherals = Peripherals::take()?;
    let i2c_config = I2cConfig::new().baudrate(pins::I2C_BAUDRATE_KHZ.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6, // SDA (D4)
        peripherals.pins.gpio7, // SCL (D5)
        &i2c_config,
    )?;

    let mut scale = UnitScale::new(i2c);
    match scale.begin().map_err(Error::from) {
        Ok(version) => info!("Unit Scales firmware v{}", version),
        Err(e) => halt(e),
    }

    let mut hw = HardwareAdapter::new(scale, LidSwitch::new(pins::LID_REED_GPIO));
    // The detector must start from a real reading, not a placeholder.
    if let Err(e) = hw.prime(FIRST_READ_ATTEMPTS).map_err(Error::from) {
        halt(e);
    }

    // ── 3. BLE notifier thread ────────────────────────────────
    let mut ble = BleAdapter::new(config.device_name.clone(), config.wire_format);
    if let Err(e) = ble.start().map_err(Error::from) {
        warn!("BLE unavailable ({}), events will only be logged", e);
    }
    thread::Builder::new()
        .name("ble-notify".into())
        .stack_size(NOTIFIER_STACK_BYTES)
        .spawn(move || {
            futures_lite::future::block_on(async {
                loop {
                    let event = OUTBOX.receive().await;
                    ble.publish(&event);
                }
            });
        })?;

    // ── 4. Core ───────────────────────────────────────────────
    let clock = UptimeClock::new();
    let mut service = MugService::start(&config, &mut hw, clock.now_ms());
    let mut sink = (LogEventSink::new(), OUTBOX.sink());
    let watchdog = LoopWatchdog::arm(watchdog::timeout_for(config.poll_interval_ms));
    let poll = Duration::from_millis(u64::from(config.poll_interval_ms));

    info!("System ready. Entering polling loop.");

    // ── 5. Polling loop ───────────────────────────────────────
    loop {
        service.tick(&mut hw, &mut sink, clock.now_ms());
        watchdog.feed();

        if service.cycle_count() % STATUS_EVERY_CYCLES == 0 {
            let s = service.status();
            info!(
                "STATUS | lid={:?} mass={:.1}g pending={:+.1}g events={} dropped={} scale_failures={}",
                s.lid,
                s.last_mass_g,
                s.pending_delta_g,
                s.events_emitted,
                OUTBOX.dropped(),
                hw.consecutive_failures(),
            );
        }

        thread::sleep(poll);
    }
}

/// Nothing to detect without a scale: log and park the main task.
fn halt(err: Error) -> ! {
    error!("Scale unusable ({}). Halting.", err);
    loop {
        thread::sleep(Duration::from_secs(1));
    }
}
