//! SmartMug firmware library.
//!
//! Exposes the detection core, application service and adapters for
//! integration testing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod detect;
pub mod error;
pub mod pins;

pub mod adapters;
pub mod drivers;
pub mod sensors;
