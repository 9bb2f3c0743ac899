//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and all actuator drivers, exposing them
//! through [`SensorPort`] and [`ActuatorPort`].  This is the only
//! module in the system that touches actual hardware.  On non-espidf
//! targets, the underlying pins use cfg-gated simulation stubs.

use embedded_hal::digital::{InputPin, OutputPin};
use log::error;

use crate::app::ports::{ActuatorPort, SensorPort, WaterLevel};
use crate::drivers::fan::{InsideFan, OutsideFan};
use crate::drivers::hw_init::HwPin;
use crate::drivers::relay::{IdleStepper, Relay};
use crate::error::{ActuatorError, SensorError};
use crate::fsm::context::{InsideFanSpeed, OutsideFanSpeed};
use crate::pins;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P = HwPin> {
    sensor_hub: SensorHub<P>,
    inside_fan: InsideFan<P>,
    outside_fan: OutsideFan<P>,
    compressor: Relay<P>,
    pump: Relay<P>,
    _stepper: IdleStepper<P>,
}

impl<P: InputPin + OutputPin> HardwareAdapter<P> {
    pub fn new(
        sensor_hub: SensorHub<P>,
        inside_fan: InsideFan<P>,
        outside_fan: OutsideFan<P>,
        compressor: Relay<P>,
        pump: Relay<P>,
        stepper: IdleStepper<P>,
    ) -> Self {
        Self {
            sensor_hub,
            inside_fan,
            outside_fan,
            compressor,
            pump,
            _stepper: stepper,
        }
    }
}

impl HardwareAdapter<HwPin> {
    /// Wire every driver to its pin from [`pins`].  Each driver starts off.
    pub fn from_pins(sensor_hub: SensorHub<HwPin>) -> Result<Self, ActuatorError> {
        let inside_fan = InsideFan::new(
            HwPin::new(pins::INSIDE_FAN_LOW_GPIO),
            HwPin::new(pins::INSIDE_FAN_MEDIUM_GPIO),
            HwPin::new(pins::INSIDE_FAN_HIGH_GPIO),
        )?;
        let outside_fan = OutsideFan::new(
            HwPin::new(pins::OUTSIDE_FAN_LOW_GPIO),
            HwPin::new(pins::OUTSIDE_FAN_HIGH_GPIO),
        )?;
        let compressor = Relay::new(HwPin::new(pins::COMPRESSOR_RELAY_GPIO))?;
        let pump = Relay::new(HwPin::new(pins::PUMP_RELAY_GPIO))?;
        let stepper = IdleStepper::new(pins::STEPPER_COIL_GPIOS.map(HwPin::new))?;
        Ok(Self::new(sensor_hub, inside_fan, outside_fan, compressor, pump, stepper))
    }
}

/// Actuator writes are fire-and-forget at the port; a failure is logged and
/// the next tick re-applies every output.
fn report(what: &str, result: Result<(), ActuatorError>) {
    if let Err(e) = result {
        error!("actuator {what}: {e}");
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P: InputPin + OutputPin> SensorPort for HardwareAdapter<P> {
    fn read_air_temperature(&mut self) -> Result<f32, SensorError> {
        self.sensor_hub.read_air()
    }

    fn read_cooler_temperature(&mut self) -> Result<f32, SensorError> {
        self.sensor_hub.read_cooler()
    }

    fn read_water_level(&mut self) -> Result<WaterLevel, SensorError> {
        self.sensor_hub.read_water_level()
    }

    fn raw_samples(&self) -> (u16, u16) {
        self.sensor_hub.raw_samples()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P: InputPin + OutputPin> ActuatorPort for HardwareAdapter<P> {
    fn set_inside_fan_speed(&mut self, speed: InsideFanSpeed) {
        report("inside fan", self.inside_fan.set_speed(speed));
    }

    fn set_outside_fan_speed(&mut self, speed: OutsideFanSpeed) {
        report("outside fan", self.outside_fan.set_speed(speed));
    }

    fn set_compressor(&mut self, on: bool) {
        report("compressor", self.compressor.set(on));
    }

    fn set_pump(&mut self, on: bool) {
        report("pump", self.pump.set(on));
    }
}
