//! End-to-end detection scenarios: MugService driven at the real 50 ms
//! polling cadence against scripted sensors.

use smartmug::app::events::{LidTransitionKind, MugEvent, NetChangeKind};
use smartmug::app::service::MugService;
use smartmug::config::MugConfig;
use smartmug::detect::LidState;

use super::mock_hw::{MockSensors, RecordingSink};

const POLL_MS: u64 = 50;

/// Poll from `from` to `to` (inclusive) letting `script` adjust the
/// sensors before each cycle.
fn run(
    svc: &mut MugService,
    hw: &mut MockSensors,
    sink: &mut RecordingSink,
    from: u64,
    to: u64,
    mut script: impl FnMut(u64, &mut MockSensors),
) {
    let mut t = from;
    while t <= to {
        script(t, hw);
        svc.tick(hw, sink, t);
        t += POLL_MS;
    }
}

fn start(mass: f32, lid: LidState) -> (MugService, MockSensors, RecordingSink) {
    let mut hw = MockSensors::new(mass, lid);
    let svc = MugService::start(&MugConfig::default(), &mut hw, 0);
    (svc, hw, RecordingSink::default())
}

#[test]
fn sip_with_jitter_reports_single_drink() {
    let (mut svc, mut hw, mut sink) = start(500.0, LidState::Open);

    run(&mut svc, &mut hw, &mut sink, POLL_MS, 6_950, |t, hw| {
        hw.mass_g = match t {
            t if t >= 6_000 => 440.0,
            t if t >= 4_000 => 441.0,
            t if t >= 2_000 => 440.0,
            _ => 500.0,
        };
    });
    assert!(sink.events.is_empty(), "nothing may flush before the window");

    svc.tick(&mut hw, &mut sink, 7_000);
    let changes = sink.net_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, NetChangeKind::Drinking);
    assert!((changes[0].magnitude_g - 60.0).abs() < 1e-3);
    assert_eq!(changes[0].timestamp_ms, 7_000);
    assert_eq!(svc.status().pending_delta_g, 0.0);
}

#[test]
fn classification_follows_lid_and_sign() {
    let cases = [
        (-50.0, LidState::Open, NetChangeKind::Drinking, 50.0),
        (30.0, LidState::Open, NetChangeKind::Adding, 30.0),
        (-20.0, LidState::Closed, NetChangeKind::ThrowingAway, 20.0),
        (15.0, LidState::Closed, NetChangeKind::Adding, 15.0),
    ];
    for (delta, lid, kind, magnitude) in cases {
        let (mut svc, mut hw, mut sink) = start(300.0, lid);
        hw.mass_g = 300.0 + delta;
        run(&mut svc, &mut hw, &mut sink, POLL_MS, 7_000, |_, _| {});

        let changes = sink.net_changes();
        assert_eq!(changes.len(), 1, "delta {delta} lid {lid:?}");
        assert_eq!(changes[0].kind, kind);
        assert!((changes[0].magnitude_g - magnitude).abs() < 1e-3);
    }
}

#[test]
fn no_reemit_after_flush_without_new_change() {
    let (mut svc, mut hw, mut sink) = start(300.0, LidState::Open);
    hw.mass_g = 250.0;
    run(&mut svc, &mut hw, &mut sink, POLL_MS, 60_000, |_, _| {});
    assert_eq!(sink.net_changes().len(), 1);
}

#[test]
fn refill_after_drink_reports_both() {
    let (mut svc, mut hw, mut sink) = start(400.0, LidState::Open);
    run(&mut svc, &mut hw, &mut sink, POLL_MS, 30_000, |t, hw| {
        hw.mass_g = match t {
            t if t >= 14_000 => 500.0,
            t if t >= 2_000 => 350.0,
            _ => 400.0,
        };
    });

    let changes = sink.net_changes();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].kind, NetChangeKind::Drinking);
    assert!((changes[0].magnitude_g - 50.0).abs() < 1e-3);
    assert_eq!(changes[1].kind, NetChangeKind::Adding);
    assert!((changes[1].magnitude_g - 150.0).abs() < 1e-3);
}

#[test]
fn lid_closed_before_settling_means_thrown_away() {
    let (mut svc, mut hw, mut sink) = start(400.0, LidState::Open);
    run(&mut svc, &mut hw, &mut sink, POLL_MS, 8_000, |t, hw| {
        if t >= 2_000 {
            hw.mass_g = 200.0;
        }
        if t >= 3_000 {
            hw.lid = LidState::Closed;
        }
    });

    assert_eq!(sink.lid_transitions(), vec![LidTransitionKind::LidClosed]);
    let changes = sink.net_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].kind, NetChangeKind::ThrowingAway);
}

#[test]
fn lid_toggles_emit_one_event_each_in_order() {
    let (mut svc, mut hw, mut sink) = start(300.0, LidState::Closed);
    run(&mut svc, &mut hw, &mut sink, POLL_MS, 1_000, |t, hw| {
        hw.lid = if (200..600).contains(&t) {
            LidState::Open
        } else {
            LidState::Closed
        };
    });

    assert_eq!(
        sink.lid_transitions(),
        vec![LidTransitionKind::LidOpened, LidTransitionKind::LidClosed]
    );
    match sink.events[0] {
        MugEvent::Lid(e) => assert_eq!(e.timestamp_ms, 200),
        MugEvent::NetChange(_) => panic!("expected lid event first"),
    }
}

#[test]
fn slow_drift_below_threshold_is_never_reported() {
    let (mut svc, mut hw, mut sink) = start(300.0, LidState::Open);
    // 5 g per sample, 100 g total over 40 s.
    run(&mut svc, &mut hw, &mut sink, POLL_MS, 40_000, |t, hw| {
        hw.mass_g = 300.0 - 5.0 * (t / 2_000) as f32;
    });
    assert!(sink.net_changes().is_empty());
    assert!((svc.status().last_mass_g - 200.0).abs() < 1e-3);
}

#[test]
fn scale_polled_on_sampling_period_only() {
    let (mut svc, mut hw, mut sink) = start(300.0, LidState::Open);
    let reads_at_start = hw.mass_reads;
    run(&mut svc, &mut hw, &mut sink, POLL_MS, 10_000, |_, _| {});
    // Samples at 2, 4, 6, 8, 10 s.
    assert_eq!(hw.mass_reads - reads_at_start, 5);
}
