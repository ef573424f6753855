//! Sensor drivers: the I²C load-cell unit and the lid reed switch.
//!
//! Both are wrapped by [`HardwareAdapter`](crate::adapters::hardware::HardwareAdapter),
//! which turns them into the domain's sensor ports.

pub mod lid_switch;
pub mod scale;
