//! Mock hardware for integration tests.
//!
//! `MockSensors` serves whatever mass and lid state the test sets and
//! counts scale reads; `RecordingSink` keeps every published event so
//! tests can assert on the full history; `ScriptedBus` is an I²C bus
//! that answers Unit Scales weight reads from a script.

use std::collections::VecDeque;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use smartmug::app::events::{LidTransitionKind, MugEvent, NetChangeEvent};
use smartmug::app::ports::{EventSink, LidSensorPort, MassSensorPort};
use smartmug::detect::LidState;

// ── MockSensors ───────────────────────────────────────────────

pub struct MockSensors {
    pub mass_g: f32,
    pub lid: LidState,
    pub mass_reads: u32,
}

#[allow(dead_code)]
impl MockSensors {
    pub fn new(mass_g: f32, lid: LidState) -> Self {
        Self {
            mass_g,
            lid,
            mass_reads: 0,
        }
    }
}

impl MassSensorPort for MockSensors {
    fn read_mass_g(&mut self) -> f32 {
        self.mass_reads += 1;
        self.mass_g
    }
}

impl LidSensorPort for MockSensors {
    fn read_lid(&mut self) -> LidState {
        self.lid
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<MugEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn net_changes(&self) -> Vec<NetChangeEvent> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MugEvent::NetChange(n) => Some(*n),
                MugEvent::Lid(_) => None,
            })
            .collect()
    }

    pub fn lid_transitions(&self) -> Vec<LidTransitionKind> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MugEvent::Lid(l) => Some(l.kind),
                MugEvent::NetChange(_) => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn publish(&mut self, event: &MugEvent) {
        self.events.push(*event);
    }
}

// ── ScriptedBus ───────────────────────────────────────────────

/// Each weight read pops the next entry; `None` is a NACK.  When the
/// script runs dry the bus NACKs.
pub struct ScriptedBus {
    pub script: VecDeque<Option<f32>>,
}

#[allow(dead_code)]
impl ScriptedBus {
    pub fn new(readings: impl IntoIterator<Item = Option<f32>>) -> Self {
        Self {
            script: readings.into_iter().collect(),
        }
    }
}

impl ErrorType for ScriptedBus {
    type Error = ErrorKind;
}

impl I2c for ScriptedBus {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            if let Operation::Read(buf) = op {
                let Some(Some(grams)) = self.script.pop_front() else {
                    return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data));
                };
                buf.copy_from_slice(&grams.to_le_bytes());
            }
        }
        Ok(())
    }
}
