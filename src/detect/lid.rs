//! Lid transition detection.

use log::info;
use serde::Serialize;

use crate::app::events::{LidTransitionEvent, LidTransitionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LidState {
    Open,
    Closed,
}

impl LidState {
    pub fn from_closed(closed: bool) -> Self {
        if closed { Self::Closed } else { Self::Open }
    }

    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }
}

/// Remembers the last lid state and reports edges.
///
/// Built from an initial reading so the first observation after boot
/// cannot fire a spurious transition.
#[derive(Debug)]
pub struct LidMonitor {
    last: LidState,
}

impl LidMonitor {
    pub fn new(initial: LidState) -> Self {
        Self { last: initial }
    }

    pub fn state(&self) -> LidState {
        self.last
    }

    /// Feed the current reading; returns an event only on a change.
    pub fn observe(&mut self, current: LidState, now_ms: u64) -> Option<LidTransitionEvent> {
        if current == self.last {
            return None;
        }
        self.last = current;

        let kind = match current {
            LidState::Closed => LidTransitionKind::LidClosed,
            LidState::Open => LidTransitionKind::LidOpened,
        };
        info!("Lid: {:?} at {} ms", kind, now_ms);
        Some(LidTransitionEvent {
            kind,
            timestamp_ms: now_ms,
        })
    }
}
