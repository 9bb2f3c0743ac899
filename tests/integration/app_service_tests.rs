//! Integration tests for the AppService → FSM → pump policy → actuators
//! pipeline.
//!
//! These run on the host (x86_64) and drive the full tick sequence
//! against scripted sensor readings, asserting on the recorded actuator
//! calls and emitted events.

use crate::mock_hw::{ActuatorCall, MockHardware, RecordingSink};

use dehumidifier::app::events::{AppEvent, TransitionCause};
use dehumidifier::app::service::AppService;
use dehumidifier::config::SystemConfig;
use dehumidifier::error::{SafetyFault, SensorError};
use dehumidifier::fsm::OperatingMode;
use dehumidifier::fsm::context::{InsideFanSpeed, OutsideFanSpeed};
use dehumidifier::safety::PumpState;

struct Rig {
    app: AppService,
    hw: MockHardware,
    sink: RecordingSink,
    now_ms: u64,
}

impl Rig {
    fn new(target_c: f32, air_c: f32, cooler_c: f32) -> Self {
        let config = SystemConfig {
            target_temperature_c: target_c,
            ..SystemConfig::default()
        };
        let mut app = AppService::new(config);
        let mut hw = MockHardware::new(air_c, cooler_c);
        let mut sink = RecordingSink::new();
        app.start(&mut hw, 0, &mut sink);
        Self { app, hw, sink, now_ms: 0 }
    }

    /// Advance one second and run a tick.
    fn tick(&mut self) -> OperatingMode {
        self.now_ms += 1_000;
        self.app.tick(&mut self.hw, self.now_ms, &mut self.sink)
    }

    fn tick_at(&mut self, now_ms: u64) -> OperatingMode {
        self.now_ms = now_ms;
        self.app.tick(&mut self.hw, self.now_ms, &mut self.sink)
    }

    /// From power-up, warm the room above target until the unit cools.
    fn drive_to_cooling(&mut self) {
        let target = self.app.config().target_temperature_c;
        let saved = self.hw.air_c;
        self.hw.air_c = target + 1.0;
        assert_eq!(self.tick(), OperatingMode::StandBy);
        assert_eq!(self.tick(), OperatingMode::Cooling);
        self.hw.air_c = saved;
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_drives_everything_off_in_off_mode() {
    let rig = Rig::new(27.0, 20.0, 20.0);
    assert_eq!(rig.app.mode(), OperatingMode::Off);
    assert!(matches!(rig.sink.events.as_slice(), [AppEvent::Started(OperatingMode::Off)]));
    assert_eq!(rig.hw.calls.len(), 4);
    let out = rig.hw.outputs();
    assert_eq!(out.inside_fan, InsideFanSpeed::Off);
    assert_eq!(out.outside_fan, OutsideFanSpeed::Off);
    assert!(!out.compressor_on);
    assert!(!out.pump_on);
}

// ── Worked scenarios ──────────────────────────────────────────

#[test]
fn scenario_cooling_holds_at_set_point() {
    let mut rig = Rig::new(28.0, 28.0, 12.0);
    rig.drive_to_cooling();

    assert_eq!(rig.tick(), OperatingMode::Cooling);
    let out = rig.hw.outputs();
    assert_eq!(out.outside_fan, OutsideFanSpeed::High);
    assert_eq!(out.inside_fan, InsideFanSpeed::High);
    assert!(out.compressor_on);
}

#[test]
fn scenario_cold_coil_starts_defrost() {
    let mut rig = Rig::new(28.0, 28.0, 12.0);
    rig.drive_to_cooling();

    rig.hw.cooler_c = 4.0;
    assert_eq!(rig.tick(), OperatingMode::Unfrosting);
    let out = rig.hw.outputs();
    assert_eq!(out.inside_fan, InsideFanSpeed::High);
    assert_eq!(out.outside_fan, OutsideFanSpeed::Off);
    assert!(!out.compressor_on);
}

#[test]
fn scenario_thawed_coil_resumes_cooling_when_room_warm() {
    // target 28.5, air 28: delta -0.5 sits inside the cooling band.
    let mut rig = Rig::new(28.5, 29.5, 12.0);
    rig.drive_to_cooling();
    rig.hw.cooler_c = 4.0;
    assert_eq!(rig.tick(), OperatingMode::Unfrosting);

    rig.hw.air_c = 28.0;
    rig.hw.cooler_c = 11.0;
    assert_eq!(rig.tick(), OperatingMode::Cooling);
}

#[test]
fn scenario_thawed_coil_goes_to_standby_when_room_cool() {
    // target 30, air 28: delta -2 is below the StandBy threshold.
    let mut rig = Rig::new(30.0, 31.0, 12.0);
    rig.drive_to_cooling();
    rig.hw.cooler_c = 4.0;
    assert_eq!(rig.tick(), OperatingMode::Unfrosting);

    rig.hw.air_c = 28.0;
    rig.hw.cooler_c = 11.0;
    assert_eq!(rig.tick(), OperatingMode::StandBy);
}

#[test]
fn scenario_off_restarts_near_target() {
    let mut rig = Rig::new(28.0, 25.6, 20.0);
    assert_eq!(rig.tick(), OperatingMode::StandBy);
    let out = rig.hw.outputs();
    assert_eq!(out.inside_fan, InsideFanSpeed::Low);
    assert_eq!(out.outside_fan, OutsideFanSpeed::Off);
    assert!(!out.compressor_on);
}

#[test]
fn scenario_pump_runaway_forces_off() {
    let mut rig = Rig::new(27.0, 28.0, 12.0);
    rig.hw.set_water_full(true);

    // t = 1 s: reservoir full, pump starts; unit leaves Off.
    assert_eq!(rig.tick(), OperatingMode::StandBy);
    assert!(rig.app.pump().is_running);
    assert_eq!(rig.app.pump().switched_at_ms, 1_000);
    assert!(rig.hw.pump_on());

    // +10 s: still running, still cooling.
    for _ in 0..10 {
        rig.tick();
    }
    assert!(rig.app.pump().is_running);
    assert_eq!(rig.app.mode(), OperatingMode::Cooling);

    // Just short of the timeout nothing is forced.
    assert_eq!(rig.tick_at(60_999), OperatingMode::Cooling);
    assert_eq!(rig.app.fault_flags(), 0);

    // +61 s with the reservoir still full: Off.
    assert_eq!(rig.tick_at(62_000), OperatingMode::Off);
    assert_eq!(rig.app.fault_flags(), SafetyFault::PumpRunaway.mask());
    assert!(rig.hw.pump_on(), "pump keeps running while forced Off");
    let out = rig.hw.outputs();
    assert!(!out.compressor_on);
    assert_eq!(out.inside_fan, InsideFanSpeed::Off);

    let last = rig.app.last_transition().unwrap();
    assert_eq!(last.to, OperatingMode::Off);
    assert_eq!(last.cause, TransitionCause::PumpRunaway);
}

#[test]
fn runaway_clears_once_reservoir_drains() {
    let mut rig = Rig::new(27.0, 28.0, 12.0);
    rig.hw.set_water_full(true);
    rig.tick();
    assert_eq!(rig.tick_at(70_000), OperatingMode::Off);

    rig.hw.set_water_full(false);
    assert_eq!(rig.tick(), OperatingMode::StandBy);
    assert!(!rig.app.pump().is_running);
    assert_eq!(rig.app.fault_flags(), 0);
    assert!(rig.sink.events.iter().any(|e| matches!(e, AppEvent::FaultCleared)));
}

#[test]
fn pump_honours_minimum_run() {
    let mut rig = Rig::new(27.0, 27.0, 12.0);
    rig.hw.set_water_full(true);
    rig.tick_at(1_000);
    rig.hw.set_water_full(false);

    for t in (2_000..16_000).step_by(1_000) {
        rig.tick_at(t);
        assert!(rig.app.pump().is_running, "pump stopped early at {t}ms");
    }
    rig.tick_at(16_000);
    assert!(!rig.app.pump().is_running);
    assert!(!rig.hw.pump_on());
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::PumpChanged { .. })),
        2
    );
}

// ── Faults ────────────────────────────────────────────────────

#[test]
fn water_sensor_fault_forces_off_from_cooling() {
    let mut rig = Rig::new(27.0, 28.0, 12.0);
    rig.drive_to_cooling();

    rig.hw.set_water_fault();
    assert_eq!(rig.tick(), OperatingMode::Off);
    assert_eq!(rig.app.fault_flags(), SafetyFault::WaterSensorFault.mask());
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ModeChanged {
            from: OperatingMode::Cooling,
            to: OperatingMode::Off,
            cause: TransitionCause::WaterSensorFault,
        }
    )));

    // Held Off while the fault persists.
    assert_eq!(rig.tick(), OperatingMode::Off);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::FaultDetected(_))), 1);

    // Not latched: fault gone, normal rules resume.
    rig.hw.set_water_full(false);
    assert_eq!(rig.tick(), OperatingMode::StandBy);
    assert_eq!(rig.app.fault_flags(), 0);
}

#[test]
fn thermistor_failure_forces_off() {
    let mut rig = Rig::new(27.0, 28.0, 12.0);
    rig.hw.set_water_full(true);
    rig.tick();
    assert!(rig.app.pump().is_running);
    let pump_before = rig.app.pump();

    rig.hw.air_error = Some(SensorError::AdcReadFailed);
    assert_eq!(rig.tick(), OperatingMode::Off);
    assert_eq!(rig.app.fault_flags(), SafetyFault::SensorUnavailable.mask());
    // Still full and inside the minimum run: the pump carries on.
    assert_eq!(rig.app.pump(), pump_before);
    assert!(rig.hw.pump_on());
    assert!(rig.app.sensors().is_none());
    assert_eq!(rig.app.last_transition().unwrap().cause, TransitionCause::SensorUnavailable);

    rig.hw.air_error = None;
    assert_eq!(rig.tick(), OperatingMode::StandBy);
    assert_eq!(rig.app.fault_flags(), 0);
}

#[test]
fn thermistor_failure_still_stops_pump_once_drained() {
    let mut rig = Rig::new(27.0, 27.0, 12.0);
    rig.hw.set_water_full(true);
    rig.tick_at(1_000);
    assert!(rig.app.pump().is_running);

    rig.hw.air_error = Some(SensorError::OutOfRange);
    rig.hw.set_water_full(false);
    for t in (2_000..16_000).step_by(1_000) {
        assert_eq!(rig.tick_at(t), OperatingMode::Off);
        assert!(rig.app.pump().is_running, "pump stopped early at {t}ms");
    }

    assert_eq!(rig.tick_at(16_000), OperatingMode::Off);
    assert!(!rig.app.pump().is_running);
    assert!(!rig.hw.pump_on());
    assert!(rig.sink.events.iter().any(|e| matches!(e, AppEvent::PumpChanged { running: false })));

    // Left alone for ten minutes, the pump stays off.
    rig.tick_at(600_000);
    assert!(!rig.hw.pump_on());
    assert_eq!(rig.app.fault_flags(), SafetyFault::SensorUnavailable.mask());
}

#[test]
fn thermistor_failure_still_starts_pump_when_full() {
    let mut rig = Rig::new(27.0, 27.0, 12.0);
    rig.hw.air_error = Some(SensorError::OutOfRange);
    rig.hw.set_water_full(true);

    assert_eq!(rig.tick_at(1_000), OperatingMode::Off);
    assert_eq!(rig.app.pump(), PumpState::running_since(1_000));
    assert!(rig.hw.pump_on());
    assert!(rig.sink.events.iter().any(|e| matches!(e, AppEvent::PumpChanged { running: true })));

    // Runaway is still detected alongside the sensor fault.
    assert_eq!(rig.tick_at(61_000), OperatingMode::Off);
    assert_eq!(
        rig.app.fault_flags(),
        SafetyFault::SensorUnavailable.mask() | SafetyFault::PumpRunaway.mask()
    );
    assert!(rig.hw.pump_on());
}

#[test]
fn water_read_failure_holds_pump() {
    let mut rig = Rig::new(27.0, 28.0, 12.0);
    rig.hw.set_water_full(true);
    rig.tick_at(1_000);
    let pump_before = rig.app.pump();

    rig.hw.water_error = Some(SensorError::GpioReadFailed);
    rig.hw.set_water_full(false);
    assert_eq!(rig.tick_at(30_000), OperatingMode::Off);
    assert_eq!(rig.app.pump(), pump_before);
    assert!(rig.hw.pump_on());
    assert_eq!(rig.app.fault_flags(), SafetyFault::SensorUnavailable.mask());

    rig.hw.water_error = None;
    rig.tick_at(31_000);
    assert!(!rig.app.pump().is_running);
    assert_eq!(rig.app.fault_flags(), 0);
}

// ── Orchestration details ─────────────────────────────────────

#[test]
fn telemetry_reports_pre_transition_mode() {
    let mut rig = Rig::new(28.0, 25.6, 20.0);
    rig.tick();
    let telem: Vec<_> = rig
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(*t),
            _ => None,
        })
        .collect();
    assert_eq!(telem.len(), 1);
    assert_eq!(telem[0].mode, OperatingMode::Off);
    assert_eq!(rig.app.mode(), OperatingMode::StandBy);
}

#[test]
fn every_tick_rewrites_every_output() {
    let mut rig = Rig::new(28.0, 28.0, 12.0);
    rig.drive_to_cooling();

    let before = rig.hw.calls.len();
    rig.tick();
    let first = rig.hw.outputs();
    rig.tick();
    assert_eq!(rig.hw.calls.len(), before + 8);
    assert_eq!(rig.hw.outputs(), first);
    assert!(rig.hw.calls[before..].contains(&ActuatorCall::Compressor(true)));
}

#[test]
fn unfrosting_cut_short_when_room_cools() {
    let mut rig = Rig::new(28.0, 29.0, 12.0);
    rig.drive_to_cooling();
    rig.hw.cooler_c = 3.0;
    assert_eq!(rig.tick(), OperatingMode::Unfrosting);

    // Coil still cold but the room fell two degrees below target.
    rig.hw.air_c = 26.0;
    rig.hw.cooler_c = 2.0;
    assert_eq!(rig.tick(), OperatingMode::StandBy);
}

#[test]
fn history_records_transitions_in_order() {
    let mut rig = Rig::new(28.0, 28.0, 12.0);
    rig.drive_to_cooling();
    rig.hw.cooler_c = 4.0;
    rig.tick();

    let path: Vec<_> = rig.app.history().map(|r| (r.from, r.to)).collect();
    assert_eq!(
        path,
        vec![
            (OperatingMode::Off, OperatingMode::StandBy),
            (OperatingMode::StandBy, OperatingMode::Cooling),
            (OperatingMode::Cooling, OperatingMode::Unfrosting),
        ]
    );
    assert!(rig.app.history().all(|r| r.cause == TransitionCause::Thermal));
    assert_eq!(rig.app.tick_count(), 3);
}
