//! Controller context threaded through every evaluation step.
//!
//! `ControllerContext` replaces process-wide globals: it holds the current
//! operating mode, the pump state, the latest sensor snapshot, the actuator
//! commands derived from them, configuration, and the active fault mask.
//! The tick orchestrator is the only writer.

use serde::Serialize;

use super::OperatingMode;
use crate::config::SystemConfig;
use crate::error::SafetyFault;
use crate::safety::PumpState;

// ---------------------------------------------------------------------------
// Sensor snapshot (read-only to the core; written by the orchestrator)
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of every sensor in the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SensorSnapshot {
    /// Room air temperature (°C).
    pub air_temperature_c: f32,
    /// Evaporator coil temperature (°C).
    pub cooler_temperature_c: f32,
    /// Raw ADC sample behind `air_temperature_c`.
    pub air_raw: u16,
    /// Raw ADC sample behind `cooler_temperature_c`.
    pub cooler_raw: u16,

    /// Condensate reservoir is full.  Always `false` while the sensor is faulted.
    pub is_water_full: bool,
    /// The redundant NO/NC contacts disagree.
    pub is_water_sensor_fault: bool,
}

// ---------------------------------------------------------------------------
// Actuator commands
// ---------------------------------------------------------------------------

/// Inside (evaporator) fan speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InsideFanSpeed {
    Off,
    Low,
    Medium,
    High,
}

/// Outside (condenser) fan speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OutsideFanSpeed {
    Off,
    Low,
    High,
}

/// Per-mode outputs.  One row per [`OperatingMode`] in the state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeOutputs {
    pub outside_fan: OutsideFanSpeed,
    pub inside_fan: InsideFanSpeed,
    pub compressor_on: bool,
}

impl ModeOutputs {
    pub const OFF: Self = Self {
        outside_fan: OutsideFanSpeed::Off,
        inside_fan: InsideFanSpeed::Off,
        compressor_on: false,
    };
}

/// Everything the orchestrator drives in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorCommands {
    pub outside_fan: OutsideFanSpeed,
    pub inside_fan: InsideFanSpeed,
    pub compressor_on: bool,
    /// Driven from the pump state, never from the mode.
    pub pump_on: bool,
}

impl Default for ActuatorCommands {
    fn default() -> Self {
        Self::all_off()
    }
}

impl ActuatorCommands {
    /// All actuators off: safe default.
    pub const fn all_off() -> Self {
        Self {
            outside_fan: OutsideFanSpeed::Off,
            inside_fan: InsideFanSpeed::Off,
            compressor_on: false,
            pump_on: false,
        }
    }

    /// Combine a mode's outputs with the pump state.
    pub fn from_parts(outputs: ModeOutputs, pump_on: bool) -> Self {
        Self {
            outside_fan: outputs.outside_fan,
            inside_fan: outputs.inside_fan,
            compressor_on: outputs.compressor_on,
            pump_on,
        }
    }
}

// ---------------------------------------------------------------------------
// ControllerContext
// ---------------------------------------------------------------------------

/// The controller state owned by the tick orchestrator.
pub struct ControllerContext {
    /// Current operating mode.  Starts at Off.
    pub mode: OperatingMode,
    /// Condensate pump state.  Owned logically by the pump safety policy.
    pub pump: PumpState,

    /// Latest sensor readings.  `None` until the first successful read.
    pub sensors: Option<SensorSnapshot>,
    /// Commands applied on the most recent tick.
    pub commands: ActuatorCommands,

    pub config: SystemConfig,

    /// Active safety fault bitmask (see `SafetyFault::mask()`).
    pub fault_flags: u8,
    /// Monotonic total tick count.
    pub total_ticks: u64,
}

impl ControllerContext {
    /// Fresh context: mode Off, pump stopped at `now_ms`, everything off.
    pub fn new(config: SystemConfig, now_ms: u64) -> Self {
        Self {
            mode: OperatingMode::Off,
            pump: PumpState::stopped_at(now_ms),
            sensors: None,
            commands: ActuatorCommands::all_off(),
            config,
            fault_flags: 0,
            total_ticks: 0,
        }
    }

    /// Returns `true` if **any** safety fault is active.
    pub fn has_faults(&self) -> bool {
        self.fault_flags != 0
    }

    /// Check whether a specific fault flag is set.
    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.fault_flags & fault.mask() != 0
    }
}
