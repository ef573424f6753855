//! Event detection core: pure state machines, zero I/O.
//!
//! ```text
//!   lid reading  ──▶ LidMonitor ─────────────▶ LidTransitionEvent
//!   mass reading ──▶ WeightEventDetector ────▶ NetChangeEvent
//!                       ▲ lid state at flush time
//! ```
//!
//! Neither component reads a clock: every operation takes the current
//! timestamp as an argument, so tests drive time explicitly.

pub mod lid;
pub mod weight;

pub use lid::{LidMonitor, LidState};
pub use weight::{SampleOutcome, WeightEventDetector};
