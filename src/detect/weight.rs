//! Weight event detection: noise gate, delta accumulation, stability flush.
//!
//! ```text
//!            significant sample              quiet ≥ stability window
//!   ┌──────┐ ──────────────────▶ ┌──────────────┐ ─────────────────────▶ flush
//!   │ Idle │                     │ Accumulating │                         │
//!   └──────┘ ◀────────────────── └──────────────┘ ◀─┐                     │
//!       ▲          (never)              │ significant│sample: extend timer │
//!       │                               └────────────┘                     │
//!       └──────────────────────── one NetChangeEvent ◀─────────────────────┘
//! ```
//!
//! `sample` runs on a fixed period independent of the polling cadence;
//! `tick` runs every polling cycle and classifies using the lid state
//! observed at flush time.

use log::{debug, error, info, warn};

use crate::app::events::{NetChangeEvent, NetChangeKind};
use crate::config::MugConfig;

use super::lid::LidState;

/// What happened to a reading handed to [`WeightEventDetector::sample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// Sampling period has not elapsed; reading ignored.
    Skipped,
    /// Delta at or below the noise threshold; only the baseline moved.
    Noise { delta_g: f32 },
    /// Delta added to the pending net change.
    Accepted { delta_g: f32 },
    /// Reading was NaN or infinite and was dropped.
    Invalid,
    /// First finite reading after an unusable boot read; became the
    /// baseline without counting as a change.
    Seeded,
}

/// Map a settled delta and the current lid state onto an event kind.
///
/// Returns `None` only for a zero or non-finite delta, which a correct
/// caller never flushes.
pub fn classify(delta_g: f32, lid: LidState) -> Option<NetChangeKind> {
    if !delta_g.is_finite() || delta_g == 0.0 {
        return None;
    }
    Some(match (delta_g < 0.0, lid) {
        (true, LidState::Open) => NetChangeKind::Drinking,
        (true, LidState::Closed) => NetChangeKind::ThrowingAway,
        // Pouring in does not require an open lid.
        (false, _) => NetChangeKind::Adding,
    })
}

pub struct WeightEventDetector {
    sampling_period_ms: u64,
    stability_window_ms: u64,
    noise_threshold_g: f32,

    last_mass_g: f32,
    accumulated_delta_g: f32,
    last_significant_change_ms: u64,
    last_sample_ms: u64,
}

impl WeightEventDetector {
    /// Seed the detector from the first real reading at boot.
    ///
    /// A non-finite `initial_mass_g` leaves the detector unseeded: the
    /// first finite sample becomes the baseline instead of a change.
    pub fn new(config: &MugConfig, initial_mass_g: f32, now_ms: u64) -> Self {
        let initial = if initial_mass_g.is_finite() {
            initial_mass_g
        } else {
            warn!("Weight: no usable boot reading, baseline deferred to first sample");
            f32::NAN
        };
        Self {
            sampling_period_ms: u64::from(config.sampling_period_ms),
            stability_window_ms: u64::from(config.stability_window_ms),
            noise_threshold_g: config.noise_threshold_g,
            last_mass_g: initial,
            accumulated_delta_g: 0.0,
            last_significant_change_ms: now_ms,
            last_sample_ms: now_ms,
        }
    }

    // ── Sampling ──────────────────────────────────────────────

    /// Whether a reading passed to [`sample`](Self::sample) at `now_ms`
    /// would be taken.  Lets the caller skip the bus transaction otherwise.
    pub fn sample_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_sample_ms) >= self.sampling_period_ms
    }

    pub fn sample(&mut self, raw_mass_g: f32, now_ms: u64) -> SampleOutcome {
        if !self.sample_due(now_ms) {
            return SampleOutcome::Skipped;
        }
        self.last_sample_ms = now_ms;

        if !raw_mass_g.is_finite() {
            warn!("Weight: dropping non-finite reading at {} ms", now_ms);
            return SampleOutcome::Invalid;
        }
        if !self.last_mass_g.is_finite() {
            self.last_mass_g = raw_mass_g;
            info!("Weight: baseline seeded at {:.1} g", raw_mass_g);
            return SampleOutcome::Seeded;
        }

        let delta_g = raw_mass_g - self.last_mass_g;
        // Baseline follows the signal even when the delta is rejected.
        self.last_mass_g = raw_mass_g;

        if delta_g.abs() > self.noise_threshold_g {
            self.accumulated_delta_g += delta_g;
            self.last_significant_change_ms = now_ms;
            debug!(
                "Weight: {:+.1} g accepted (pending {:+.1} g)",
                delta_g, self.accumulated_delta_g
            );
            SampleOutcome::Accepted { delta_g }
        } else {
            SampleOutcome::Noise { delta_g }
        }
    }

    // ── Flush ─────────────────────────────────────────────────

    /// Emit the pending change once the signal has been quiet for the
    /// stability window.
    pub fn tick(&mut self, lid: LidState, now_ms: u64) -> Option<NetChangeEvent> {
        if self.accumulated_delta_g == 0.0 {
            return None;
        }
        if now_ms.saturating_sub(self.last_significant_change_ms) < self.stability_window_ms {
            return None;
        }

        let delta_g = self.accumulated_delta_g;
        self.accumulated_delta_g = 0.0;
        self.last_significant_change_ms = now_ms;

        let Some(kind) = classify(delta_g, lid) else {
            error!(
                "Weight: unclassifiable pending delta {} at {} ms, discarded",
                delta_g, now_ms
            );
            return None;
        };

        let event = NetChangeEvent {
            kind,
            magnitude_g: delta_g.abs(),
            timestamp_ms: now_ms,
        };
        info!("Weight: {:?} {:.1} g (lid {:?})", kind, event.magnitude_g, lid);
        Some(event)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn accumulated_delta_g(&self) -> f32 {
        self.accumulated_delta_g
    }

    pub fn last_mass_g(&self) -> f32 {
        self.last_mass_g
    }

    /// `true` while a change is accumulating and has not been flushed.
    pub fn is_pending(&self) -> bool {
        self.accumulated_delta_g != 0.0
    }
}
