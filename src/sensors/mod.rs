//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every sensor driver and answers the per-sensor reads of
//! [`SensorPort`](crate::app::ports::SensorPort); the orchestrator turns
//! them into one `SensorSnapshot` per tick.

pub mod temperature;
pub mod water_level;

use embedded_hal::digital::InputPin;

use crate::app::ports::WaterLevel;
use crate::config::SystemConfig;
use crate::drivers::hw_init::HwPin;
use crate::error::SensorError;
use crate::pins;
use temperature::TemperatureSensor;
use water_level::WaterLevelSensor;

/// Aggregates all sensor drivers.
pub struct SensorHub<P = HwPin> {
    pub air: TemperatureSensor,
    pub cooler: TemperatureSensor,
    pub water_level: WaterLevelSensor<P>,
    last_air_raw: u16,
    last_cooler_raw: u16,
}

impl<P: InputPin> SensorHub<P> {
    /// Construct a hub from pre-built drivers.
    pub fn new(air: TemperatureSensor, cooler: TemperatureSensor, water_level: WaterLevelSensor<P>) -> Self {
        Self {
            air,
            cooler,
            water_level,
            last_air_raw: 0,
            last_cooler_raw: 0,
        }
    }

    /// Room air temperature (°C).
    pub fn read_air(&mut self) -> Result<f32, SensorError> {
        let r = self.air.read()?;
        self.last_air_raw = r.raw;
        Ok(r.celsius)
    }

    /// Evaporator coil temperature (°C).  Reads the coil channel, not the
    /// air channel.
    pub fn read_cooler(&mut self) -> Result<f32, SensorError> {
        let r = self.cooler.read()?;
        self.last_cooler_raw = r.raw;
        Ok(r.celsius)
    }

    pub fn read_water_level(&mut self) -> Result<WaterLevel, SensorError> {
        self.water_level.read()
    }

    /// Raw samples behind the last successful air and coil reads.
    pub fn raw_samples(&self) -> (u16, u16) {
        (self.last_air_raw, self.last_cooler_raw)
    }
}

impl SensorHub<HwPin> {
    /// Build the board's sensor set from configuration and [`pins`].
    pub fn from_config(config: &SystemConfig) -> Self {
        let air = TemperatureSensor::new(
            "air",
            pins::AIR_TEMP_ADC_CHANNEL,
            config.air_sensor,
            config.plausible_min_c,
            config.plausible_max_c,
        );
        let cooler = TemperatureSensor::new(
            "cooler",
            pins::COOLER_TEMP_ADC_CHANNEL,
            config.cooler_sensor,
            config.plausible_min_c,
            config.plausible_max_c,
        );
        let water = WaterLevelSensor::new(HwPin::new(pins::WATER_NO_GPIO), HwPin::new(pins::WATER_NC_GPIO));
        Self::new(air, cooler, water)
    }
}
