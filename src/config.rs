//! System configuration parameters
//!
//! All tunable parameters for the dehumidifier controller.  Values are
//! fixed at startup: the [`ConfigPort`](crate::app::ports::ConfigPort)
//! adapter loads them once and nothing adjusts them at runtime.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Mode-transition thresholds (all in degrees Celsius).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlThresholds {
    /// Below `target - off_c` the unit leaves StandBy for Off.
    pub off_c: f32,
    /// Below `target - standby_c` the unit stops cooling.
    pub standby_c: f32,
    /// Extra margin Off must clear before returning to StandBy.
    pub off_restart_margin_c: f32,
    /// Evaporator temperature below which a defrost cycle starts.
    pub unfrost_start_c: f32,
    /// Evaporator temperature above which a defrost cycle ends.
    pub unfrost_stop_c: f32,
}

impl Default for ControlThresholds {
    fn default() -> Self {
        Self {
            off_c: 3.0,
            standby_c: 1.0,
            off_restart_margin_c: 0.5,
            unfrost_start_c: 5.0,
            unfrost_stop_c: 10.0,
        }
    }
}

/// Two-point linear calibration for a thermistor channel.
///
/// The sensors are only used over a narrow band around room temperature,
/// so a straight line through two measured points is accurate enough.
///
/// The shipped points (437 raw at 27 °C, 717 raw at 39 °C) come from a
/// 10-bit ADC.  Against 12-bit ESP32 samples they put the 80 °C plausible
/// ceiling near raw 1673, well below full scale, so they must be
/// re-measured on the target board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorCalibration {
    /// Raw ADC value measured at `low_c`.
    pub raw_low: u16,
    /// Raw ADC value measured at `high_c`.
    pub raw_high: u16,
    pub low_c: f32,
    pub high_c: f32,
}

impl SensorCalibration {
    /// Convert a raw ADC sample to degrees Celsius.
    pub fn to_celsius(&self, raw: u16) -> f32 {
        let span_raw = f32::from(self.raw_high) - f32::from(self.raw_low);
        let span_c = self.high_c - self.low_c;
        (f32::from(raw) - f32::from(self.raw_low)) * span_c / span_raw + self.low_c
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Set-point ---
    /// Desired air temperature (Celsius).
    pub target_temperature_c: f32,
    pub thresholds: ControlThresholds,

    // --- Condensate pump ---
    /// Minimum run time once the pump starts (seconds).
    pub pump_min_run_secs: u32,
    /// Continuous run time after which the unit is shut down (seconds).
    pub pump_runaway_secs: u32,

    // --- Sensors ---
    pub air_sensor: SensorCalibration,
    pub cooler_sensor: SensorCalibration,
    /// Converted readings outside `[min, max]` are treated as read failures.
    pub plausible_min_c: f32,
    pub plausible_max_c: f32,

    // --- Timing ---
    /// Control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            target_temperature_c: 27.0,
            thresholds: ControlThresholds::default(),

            pump_min_run_secs: 15,
            pump_runaway_secs: 60,

            // 15k pull-down dividers, measured at 27 and 39 degrees.
            air_sensor: SensorCalibration {
                raw_low: 437,
                raw_high: 717,
                low_c: 27.0,
                high_c: 39.0,
            },
            cooler_sensor: SensorCalibration {
                raw_low: 444,
                raw_high: 717,
                low_c: 27.0,
                high_c: 39.0,
            },
            plausible_min_c: -30.0,
            plausible_max_c: 80.0,

            control_loop_interval_ms: 1000, // 1 Hz
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, never clamped.
    // Negated comparisons so NaN fails every check.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.thresholds;
        if !self.target_temperature_c.is_finite() {
            return Err(ConfigError::ValidationFailed("target_temperature_c must be finite"));
        }
        if !(t.standby_c > 0.0 && t.off_c > t.standby_c) {
            return Err(ConfigError::ValidationFailed("need 0 < standby_c < off_c"));
        }
        if !(t.off_restart_margin_c >= 0.0 && t.off_restart_margin_c < t.off_c) {
            return Err(ConfigError::ValidationFailed("off_restart_margin_c out of range"));
        }
        if !(t.unfrost_stop_c > t.unfrost_start_c) {
            return Err(ConfigError::ValidationFailed("unfrost_stop_c must exceed unfrost_start_c"));
        }
        if self.pump_min_run_secs == 0 || self.pump_runaway_secs <= self.pump_min_run_secs {
            return Err(ConfigError::ValidationFailed("need 0 < pump_min_run_secs < pump_runaway_secs"));
        }
        for cal in [&self.air_sensor, &self.cooler_sensor] {
            if cal.raw_low == cal.raw_high || (cal.high_c - cal.low_c).abs() < f32::EPSILON {
                return Err(ConfigError::ValidationFailed("degenerate sensor calibration"));
            }
        }
        if !(self.plausible_max_c > self.plausible_min_c) {
            return Err(ConfigError::ValidationFailed("plausible range inverted"));
        }
        if self.control_loop_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("control_loop_interval_ms must be > 0"));
        }
        Ok(())
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    pub fn pump_min_run_ms(&self) -> u64 {
        u64::from(self.pump_min_run_secs) * 1000
    }

    pub fn pump_runaway_ms(&self) -> u64 {
        u64::from(self.pump_runaway_secs) * 1000
    }
}
