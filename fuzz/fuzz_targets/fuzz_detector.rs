//! Fuzz target: `MugService::tick`
//!
//! Decodes the input as a stream of (time step, mass bits, lid) records
//! and drives the full polling cycle with them.  Mass bits cover NaN,
//! infinities and subnormals; time steps may be zero.
//!
//! Asserts that the service never panics, never emits a zero or
//! non-finite magnitude, and that event timestamps never go backwards.
//!
//! cargo fuzz run fuzz_detector

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartmug::app::events::MugEvent;
use smartmug::app::ports::{EventSink, LidSensorPort, MassSensorPort};
use smartmug::app::service::MugService;
use smartmug::config::MugConfig;
use smartmug::detect::LidState;

struct Feed {
    mass: f32,
    lid: LidState,
}

impl MassSensorPort for Feed {
    fn read_mass_g(&mut self) -> f32 {
        self.mass
    }
}

impl LidSensorPort for Feed {
    fn read_lid(&mut self) -> LidState {
        self.lid
    }
}

#[derive(Default)]
struct Check {
    last_ts: u64,
}

impl EventSink for Check {
    fn publish(&mut self, event: &MugEvent) {
        let ts = event.timestamp_ms();
        assert!(ts >= self.last_ts, "event timestamps went backwards");
        self.last_ts = ts;
        if let MugEvent::NetChange(e) = event {
            assert!(e.magnitude_g.is_finite() && e.magnitude_g > 0.0);
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let mut feed = Feed {
        mass: 0.0,
        lid: LidState::Open,
    };
    let mut svc = MugService::start(&MugConfig::default(), &mut feed, 0);
    let mut sink = Check::default();
    let mut now: u64 = 0;

    for rec in data.chunks_exact(7) {
        now = now.saturating_add(u64::from(u16::from_le_bytes([rec[0], rec[1]])));
        feed.mass = f32::from_le_bytes([rec[2], rec[3], rec[4], rec[5]]);
        feed.lid = LidState::from_closed(rec[6] & 1 == 1);
        svc.tick(&mut feed, &mut sink, now);
    }
});
