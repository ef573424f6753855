//! Application service: the hexagonal core.
//!
//! [`MugService`] owns the lid monitor and the weight detector and runs
//! one polling cycle per [`tick`](MugService::tick).  All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  LidSensorPort  ──▶ ┌──────────────────────────────┐
//!                     │          MugService           │ ──▶ EventSink
//!  MassSensorPort ──▶ │  LidMonitor · WeightDetector  │
//!                     └──────────────────────────────┘
//! ```

use log::{info, warn};
use serde::Serialize;

use crate::config::MugConfig;
use crate::detect::{LidMonitor, LidState, SampleOutcome, WeightEventDetector};

use super::events::MugEvent;
use super::ports::{EventSink, LidSensorPort, MassSensorPort};

// ───────────────────────────────────────────────────────────────
// Status snapshot
// ───────────────────────────────────────────────────────────────

/// Point-in-time view of the service, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MugStatus {
    pub lid: LidState,
    pub last_mass_g: f32,
    pub pending_delta_g: f32,
    pub cycle_count: u64,
    pub events_emitted: u32,
}

// ───────────────────────────────────────────────────────────────
// MugService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all detection logic.
pub struct MugService {
    lid: LidMonitor,
    weight: WeightEventDetector,
    /// Latest timestamp seen; later calls are clamped to it.
    last_now_ms: u64,
    cycle_count: u64,
    events_emitted: u32,
}

impl MugService {
    /// Build the service from the first real sensor readings.
    pub fn start(
        config: &MugConfig,
        hw: &mut (impl MassSensorPort + LidSensorPort),
        now_ms: u64,
    ) -> Self {
        let lid = hw.read_lid();
        let mass_g = hw.read_mass_g();
        info!(
            "MugService started: lid={:?}, mass={:.1} g, period={} ms, window={} ms, noise={:.1} g",
            lid,
            mass_g,
            config.sampling_period_ms,
            config.stability_window_ms,
            config.noise_threshold_g,
        );

        Self {
            lid: LidMonitor::new(lid),
            weight: WeightEventDetector::new(config, mass_g, now_ms),
            last_now_ms: now_ms,
            cycle_count: 0,
            events_emitted: 0,
        }
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one polling cycle: lid → weight sample → flush.
    ///
    /// The `hw` parameter satisfies **both** sensor ports, which avoids
    /// a double mutable borrow while keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl MassSensorPort + LidSensorPort),
        sink: &mut impl EventSink,
        now_ms: u64,
    ) {
        self.cycle_count += 1;
        let now_ms = self.clamp_time(now_ms);

        // 1. Lid edge, reported immediately
        let lid = hw.read_lid();
        if let Some(event) = self.lid.observe(lid, now_ms) {
            self.emit(sink, &MugEvent::Lid(event));
        }

        // 2. Weight sample, only when the period gate is open
        if self.weight.sample_due(now_ms) {
            let mass_g = hw.read_mass_g();
            if let SampleOutcome::Noise { delta_g } = self.weight.sample(mass_g, now_ms) {
                log::trace!("Weight: {:+.1} g below noise threshold", delta_g);
            }
        }

        // 3. Flush, classified with the lid as seen this cycle
        if let Some(event) = self.weight.tick(lid, now_ms) {
            self.emit(sink, &MugEvent::NetChange(event));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn status(&self) -> MugStatus {
        MugStatus {
            lid: self.lid.state(),
            last_mass_g: self.weight.last_mass_g(),
            pending_delta_g: self.weight.accumulated_delta_g(),
            cycle_count: self.cycle_count,
            events_emitted: self.events_emitted,
        }
    }

    /// Total polling cycles executed since startup.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    // ── Internal ──────────────────────────────────────────────

    fn emit(&mut self, sink: &mut impl EventSink, event: &MugEvent) {
        self.events_emitted = self.events_emitted.wrapping_add(1);
        sink.publish(event);
    }

    fn clamp_time(&mut self, now_ms: u64) -> u64 {
        if now_ms < self.last_now_ms {
            warn!(
                "MugService: clock went backwards ({} < {} ms), clamping",
                now_ms, self.last_now_ms
            );
            return self.last_now_ms;
        }
        self.last_now_ms = now_ms;
        now_ms
    }
}
