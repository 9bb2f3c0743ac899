//! Mock hardware adapter for integration tests.
//!
//! Serves scripted sensor readings and records every actuator call so
//! tests can assert on the full command history without touching real
//! GPIO registers.

use dehumidifier::app::events::AppEvent;
use dehumidifier::app::ports::{ActuatorPort, EventSink, SensorPort, WaterLevel};
use dehumidifier::error::SensorError;
use dehumidifier::fsm::context::{ActuatorCommands, InsideFanSpeed, OutsideFanSpeed};

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActuatorCall {
    InsideFan(InsideFanSpeed),
    OutsideFan(OutsideFanSpeed),
    Compressor(bool),
    Pump(bool),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub air_c: f32,
    pub cooler_c: f32,
    pub water: WaterLevel,
    /// When set, the air read fails with this error.
    pub air_error: Option<SensorError>,
    /// When set, the water-level read fails with this error.
    pub water_error: Option<SensorError>,
    pub calls: Vec<ActuatorCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(air_c: f32, cooler_c: f32) -> Self {
        Self {
            air_c,
            cooler_c,
            water: WaterLevel::default(),
            air_error: None,
            water_error: None,
            calls: Vec::new(),
        }
    }

    pub fn set_water_full(&mut self, full: bool) {
        self.water = WaterLevel {
            is_full: full,
            is_fault: false,
        };
    }

    /// Contacts disagree: fault, never full.
    pub fn set_water_fault(&mut self) {
        self.water = WaterLevel {
            is_full: false,
            is_fault: true,
        };
    }

    /// The output state implied by the most recent call to each setter.
    pub fn outputs(&self) -> ActuatorCommands {
        let mut out = ActuatorCommands::all_off();
        for call in &self.calls {
            match *call {
                ActuatorCall::InsideFan(s) => out.inside_fan = s,
                ActuatorCall::OutsideFan(s) => out.outside_fan = s,
                ActuatorCall::Compressor(on) => out.compressor_on = on,
                ActuatorCall::Pump(on) => out.pump_on = on,
            }
        }
        out
    }

    pub fn pump_on(&self) -> bool {
        self.outputs().pump_on
    }
}

impl ActuatorPort for MockHardware {
    fn set_inside_fan_speed(&mut self, speed: InsideFanSpeed) {
        self.calls.push(ActuatorCall::InsideFan(speed));
    }

    fn set_outside_fan_speed(&mut self, speed: OutsideFanSpeed) {
        self.calls.push(ActuatorCall::OutsideFan(speed));
    }

    fn set_compressor(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Compressor(on));
    }

    fn set_pump(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Pump(on));
    }
}

impl SensorPort for MockHardware {
    fn read_air_temperature(&mut self) -> Result<f32, SensorError> {
        match self.air_error {
            Some(e) => Err(e),
            None => Ok(self.air_c),
        }
    }

    fn read_cooler_temperature(&mut self) -> Result<f32, SensorError> {
        Ok(self.cooler_c)
    }

    fn read_water_level(&mut self) -> Result<WaterLevel, SensorError> {
        match self.water_error {
            Some(e) => Err(e),
            None => Ok(self.water),
        }
    }
}

// ── Recording event sink ──────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
