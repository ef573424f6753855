//! Integration tests: HardwareAdapter over a scripted I²C bus, and the
//! service's reaction to a flaky scale.

use smartmug::adapters::hardware::{FIRST_READ_ATTEMPTS, HardwareAdapter};
use smartmug::app::ports::{LidSensorPort, MassSensorPort};
use smartmug::app::service::MugService;
use smartmug::config::MugConfig;
use smartmug::detect::LidState;
use smartmug::pins;
use smartmug::sensors::lid_switch::{self, LidSwitch};
use smartmug::sensors::scale::UnitScale;

use super::mock_hw::{RecordingSink, ScriptedBus};

fn adapter(script: impl IntoIterator<Item = Option<f32>>) -> HardwareAdapter<ScriptedBus> {
    HardwareAdapter::new(
        UnitScale::new(ScriptedBus::new(script)),
        LidSwitch::new(pins::LID_REED_GPIO),
    )
}

#[test]
fn failed_read_holds_last_good_mass() {
    let mut hw = adapter([Some(310.0), None, None, Some(305.0)]);
    assert_eq!(hw.read_mass_g(), 310.0);
    assert_eq!(hw.read_mass_g(), 310.0);
    assert_eq!(hw.read_mass_g(), 310.0);
    assert_eq!(hw.consecutive_failures(), 2);
    assert_eq!(hw.read_mass_g(), 305.0);
    assert_eq!(hw.consecutive_failures(), 0);
}

#[test]
fn nan_from_scale_is_treated_as_failure() {
    let mut hw = adapter([Some(200.0), Some(f32::NAN)]);
    assert_eq!(hw.read_mass_g(), 200.0);
    assert_eq!(hw.read_mass_g(), 200.0);
    assert_eq!(hw.consecutive_failures(), 1);
}

#[test]
fn bus_outage_does_not_fake_a_drink() {
    // Boot read, then the bus dies for good.
    let mut hw = adapter([Some(450.0)]);
    let mut svc = MugService::start(&MugConfig::default(), &mut hw, 0);
    let mut sink = RecordingSink::default();

    let mut t = 50;
    while t <= 30_000 {
        svc.tick(&mut hw, &mut sink, t);
        t += 50;
    }

    assert!(sink.net_changes().is_empty());
    assert!(hw.consecutive_failures() > 0);
    assert_eq!(svc.status().last_mass_g, 450.0);
}

fn run_steady(hw: &mut HardwareAdapter<ScriptedBus>) -> (MugService, RecordingSink) {
    let mut svc = MugService::start(&MugConfig::default(), hw, 0);
    let mut sink = RecordingSink::default();
    let mut t = 50;
    while t <= 10_000 {
        svc.tick(hw, &mut sink, t);
        t += 50;
    }
    (svc, sink)
}

#[test]
fn boot_read_nack_does_not_seed_zero() {
    let script = std::iter::once(None).chain(std::iter::repeat_n(Some(450.0), 100));
    let mut hw = adapter(script);
    let (svc, sink) = run_steady(&mut hw);

    assert!(sink.net_changes().is_empty(), "{:?}", sink.net_changes());
    assert_eq!(svc.status().last_mass_g, 450.0);
}

#[test]
fn scale_silent_at_boot_then_recovering_reports_nothing() {
    let dead = FIRST_READ_ATTEMPTS as usize;
    let script = std::iter::repeat_n(None, dead).chain(std::iter::repeat_n(Some(450.0), 100));
    let mut hw = adapter(script);
    let (svc, sink) = run_steady(&mut hw);

    assert!(sink.net_changes().is_empty(), "{:?}", sink.net_changes());
    assert_eq!(hw.last_good_mass_g(), Some(450.0));
    assert_eq!(svc.status().last_mass_g, 450.0);
}

#[test]
fn prime_gives_up_after_bounded_attempts() {
    let mut hw = adapter(std::iter::repeat_n(None, 10));
    assert!(hw.prime(3).is_err());
    assert_eq!(hw.consecutive_failures(), 3);
    assert_eq!(hw.last_good_mass_g(), None);
    assert!(hw.read_mass_g().is_nan());
}

#[test]
fn lid_reads_through_reed_switch() {
    let mut hw = adapter([] as [Option<f32>; 0]);
    lid_switch::sim_set_lid_closed(true);
    assert_eq!(hw.read_lid(), LidState::Closed);
    lid_switch::sim_set_lid_closed(false);
    assert_eq!(hw.read_lid(), LidState::Open);
    lid_switch::sim_set_lid_closed(true);
}
