//! Application layer: orchestration around the detection core, zero I/O.
//!
//! The service wires the [`detect`](crate::detect) state machines to the
//! sensor ports once per polling cycle and publishes whatever they emit.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod outbox;
pub mod ports;
pub mod service;
