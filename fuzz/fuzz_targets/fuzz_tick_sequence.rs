//! Fuzz target: `AppService::tick`
//!
//! Decodes arbitrary bytes into a sequence of sensor readings (including
//! NaN, infinities, read failures and water-contact faults) and clock
//! steps, and runs the orchestrator over them.  Asserts that it never
//! panics, that every tick lands in one of the four modes, and that a
//! water-contact fault or failed read always ends the tick in Off.
//!
//! cargo fuzz run fuzz_tick_sequence

#![no_main]

use dehumidifier::app::events::AppEvent;
use dehumidifier::app::ports::{ActuatorPort, EventSink, SensorPort, WaterLevel};
use dehumidifier::app::service::AppService;
use dehumidifier::config::SystemConfig;
use dehumidifier::error::SensorError;
use dehumidifier::fsm::OperatingMode;
use dehumidifier::fsm::context::{InsideFanSpeed, OutsideFanSpeed};
use libfuzzer_sys::fuzz_target;

/// Bytes per tick: air f32, cooler f32, flags u8, dt u16.
const STEP_LEN: usize = 11;

#[derive(Default)]
struct FuzzHw {
    air: f32,
    cooler: f32,
    water: WaterLevel,
    fail: bool,
    pump_on: bool,
}

impl SensorPort for FuzzHw {
    fn read_air_temperature(&mut self) -> Result<f32, SensorError> {
        if self.fail { Err(SensorError::AdcReadFailed) } else { Ok(self.air) }
    }

    fn read_cooler_temperature(&mut self) -> Result<f32, SensorError> {
        Ok(self.cooler)
    }

    fn read_water_level(&mut self) -> Result<WaterLevel, SensorError> {
        Ok(self.water)
    }
}

impl ActuatorPort for FuzzHw {
    fn set_inside_fan_speed(&mut self, _speed: InsideFanSpeed) {}
    fn set_outside_fan_speed(&mut self, _speed: OutsideFanSpeed) {}
    fn set_compressor(&mut self, _on: bool) {}
    fn set_pump(&mut self, on: bool) {
        self.pump_on = on;
    }
}

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = FuzzHw::default();
    let mut now: u64 = 0;
    app.start(&mut hw, now, &mut NullSink);

    for chunk in data.chunks_exact(STEP_LEN) {
        hw.air = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        hw.cooler = f32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
        let flags = chunk[8];
        let fault = flags & 0b010 != 0;
        hw.water = WaterLevel {
            is_full: flags & 0b001 != 0 && !fault,
            is_fault: fault,
        };
        hw.fail = flags & 0b100 != 0;
        // Bit 3 rewinds the clock to exercise the saturating timers.
        let dt = u64::from(u16::from_le_bytes([chunk[9], chunk[10]]));
        now = if flags & 0b1000 != 0 { now.saturating_sub(dt) } else { now + dt };

        let mode = app.tick(&mut hw, now, &mut NullSink);

        assert!(OperatingMode::ALL.contains(&mode));
        assert_eq!(hw.pump_on, app.pump().is_running);
        if fault || hw.fail {
            assert_eq!(mode, OperatingMode::Off);
        }
    }
});
