//! Thermistor temperature channels (room air and evaporator coil).
//!
//! Each thermistor sits in a voltage divider read by ADC1.  Over the
//! narrow band the unit works in, the divider output is close enough to
//! linear that a two-point calibration replaces the Beta equation:
//! `raw_low → low_c`, `raw_high → high_c`, straight line in between and
//! beyond.
//!
//! A conversion outside the configured plausible range means the divider
//! is open or shorted and is reported as [`SensorError::OutOfRange`].

use log::debug;

use crate::config::SensorCalibration;
use crate::drivers::hw_init;
use crate::error::SensorError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureReading {
    pub raw: u16,
    pub celsius: f32,
}

pub struct TemperatureSensor {
    label: &'static str,
    adc_channel: u32,
    calibration: SensorCalibration,
    plausible_min_c: f32,
    plausible_max_c: f32,
}

impl TemperatureSensor {
    pub fn new(
        label: &'static str,
        adc_channel: u32,
        calibration: SensorCalibration,
        plausible_min_c: f32,
        plausible_max_c: f32,
    ) -> Self {
        Self {
            label,
            adc_channel,
            calibration,
            plausible_min_c,
            plausible_max_c,
        }
    }

    pub fn read(&self) -> Result<TemperatureReading, SensorError> {
        let raw = hw_init::adc1_read(self.adc_channel)?;
        self.convert(raw)
    }

    /// Calibrate and range-check a raw sample.
    pub fn convert(&self, raw: u16) -> Result<TemperatureReading, SensorError> {
        let celsius = self.calibration.to_celsius(raw);
        debug!("{}: raw={} -> {:.2}\u{00b0}C", self.label, raw, celsius);
        if !(self.plausible_min_c..=self.plausible_max_c).contains(&celsius) {
            return Err(SensorError::OutOfRange);
        }
        Ok(TemperatureReading { raw, celsius })
    }
}
