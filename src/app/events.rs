//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use serde::Serialize;

use crate::fsm::OperatingMode;

/// Why the mode changed on a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransitionCause {
    /// Normal temperature-driven transition from the state machine.
    Thermal,
    /// Pump ran past the runaway timeout.
    PumpRunaway,
    /// NO/NC water contacts disagree.
    WaterSensorFault,
    /// The sensor snapshot could not be acquired.
    SensorUnavailable,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Per-tick diagnostic snapshot, taken before the transition.
    Telemetry(TelemetryData),

    /// The operating mode changed.
    ModeChanged {
        from: OperatingMode,
        to: OperatingMode,
        cause: TransitionCause,
    },

    /// The condensate pump started or stopped.
    PumpChanged { running: bool },

    /// One or more safety faults were raised.
    FaultDetected(u8),

    /// All safety faults have been cleared.
    FaultCleared,

    /// The application service has started (carries initial mode).
    Started(OperatingMode),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryData {
    pub mode: OperatingMode,
    pub air_raw: u16,
    pub cooler_raw: u16,
    pub air_temperature_c: f32,
    pub cooler_temperature_c: f32,
    pub is_water_full: bool,
    pub is_water_sensor_fault: bool,
    pub pump_running: bool,
    pub fault_flags: u8,
}

/// One entry in the service's recent-transition history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransitionRecord {
    pub tick: u64,
    pub at_ms: u64,
    pub from: OperatingMode,
    pub to: OperatingMode,
    pub cause: TransitionCause,
}
