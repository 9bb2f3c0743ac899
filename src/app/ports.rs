//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, event sinks, config, clock)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the control core never touches hardware
//! directly.

use crate::config::SystemConfig;
use crate::error::SensorError;
use crate::fsm::context::{InsideFanSpeed, OutsideFanSpeed, SensorSnapshot};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Condensate reservoir reading from the redundant NO/NC contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaterLevel {
    /// Reservoir full.  Always `false` when `is_fault` is set.
    pub is_full: bool,
    /// The two contacts disagree.
    pub is_fault: bool,
}

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Room air temperature in °C.
    fn read_air_temperature(&mut self) -> Result<f32, SensorError>;

    /// Evaporator coil temperature in °C.
    fn read_cooler_temperature(&mut self) -> Result<f32, SensorError>;

    /// Reservoir level from the NO/NC contact pair.
    fn read_water_level(&mut self) -> Result<WaterLevel, SensorError>;

    /// Raw ADC samples behind the last air and cooler readings, for
    /// diagnostics.  Adapters without raw access report zeros.
    fn raw_samples(&self) -> (u16, u16) {
        (0, 0)
    }

    /// Read both thermistors and combine them with a water level already
    /// read this tick.
    ///
    /// Either thermistor failing makes the snapshot unavailable.  The water
    /// level is read separately so the pump policy can still act on it.
    fn read_snapshot(&mut self, water: WaterLevel) -> Result<SensorSnapshot, SensorError> {
        let air = self.read_air_temperature()?;
        let cooler = self.read_cooler_temperature()?;
        let (air_raw, cooler_raw) = self.raw_samples();
        Ok(SensorSnapshot {
            air_temperature_c: air,
            cooler_temperature_c: cooler,
            air_raw,
            cooler_raw,
            is_water_full: water.is_full,
            is_water_sensor_fault: water.is_fault,
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
///
/// Every setter is idempotent; the orchestrator re-applies the full
/// command set each tick.
pub trait ActuatorPort {
    fn set_inside_fan_speed(&mut self, speed: InsideFanSpeed);

    fn set_outside_fan_speed(&mut self, speed: OutsideFanSpeed);

    fn set_compressor(&mut self, on: bool);

    fn set_pump(&mut self, on: bool);

    /// Kill all actuators (compressor, fans, pump): safe shutdown.
    fn all_off(&mut self) {
        self.set_compressor(false);
        self.set_outside_fan_speed(OutsideFanSpeed::Off);
        self.set_inside_fan_speed(InsideFanSpeed::Off);
        self.set_pump(false);
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ← static config)
// ───────────────────────────────────────────────────────────────

/// Loads system configuration once at startup.
///
/// Implementations MUST validate before returning.  Invalid ranges are
/// rejected with [`ConfigError::ValidationFailed`], not silently clamped.
pub trait ConfigPort {
    fn load(&self) -> Result<SystemConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Time port (driven adapter: domain ← monotonic clock)
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock, read once per tick.
pub trait TimePort {
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config document available.
    NotFound,
    /// The document failed to deserialize.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::NotFound => Self::Config("not found"),
            ConfigError::Corrupted => Self::Config("corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}
