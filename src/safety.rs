//! Condensate pump safety policy.
//!
//! Runs **every tick after the mode state machine** and has the final say
//! on the operating mode for that tick.  It owns the pump state and decides
//! when the pump runs; it can force the unit to `Off` when the reservoir
//! cannot be cleared or the level sensor is untrustworthy.
//!
//! ## Rules (in order)
//!
//! 1. Pump running:
//!    a. reservoir no longer full and the minimum run time has elapsed → stop;
//!    b. otherwise, once the runaway timeout has elapsed → force `Off`.
//! 2. Pump stopped and reservoir full → start.
//! 3. Independently, a water-sensor fault → force `Off`.
//!
//! Both timers measure from the same timestamp: the instant the pump last
//! switched.  Power-up counts as a stop.  Elapsed time uses saturating
//! subtraction, so a clock reading that lags the stored stamp reads as zero.
//!
//! The policy reads only the water level, never the temperatures, so it
//! keeps running on ticks where a thermistor failed.
//!
//! Neither override latches.  Each tick re-derives the fault bits from the
//! current reading; once the condition clears the state machine takes the
//! unit back out of Off through its normal rules.

use crate::app::ports::WaterLevel;
use crate::config::SystemConfig;
use crate::error::SafetyFault;
use crate::fsm::OperatingMode;
use log::{error, info};

/// Pump run state plus the single timestamp both pump timers share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpState {
    pub is_running: bool,
    /// Monotonic milliseconds at the last start or stop.
    pub switched_at_ms: u64,
}

impl PumpState {
    pub const fn stopped_at(now_ms: u64) -> Self {
        Self {
            is_running: false,
            switched_at_ms: now_ms,
        }
    }

    pub const fn running_since(now_ms: u64) -> Self {
        Self {
            is_running: true,
            switched_at_ms: now_ms,
        }
    }

    /// Milliseconds since the last switch.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.switched_at_ms)
    }
}

/// Outcome of one policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpDecision {
    pub pump: PumpState,
    /// `Some(Off)` when the policy overrides the state machine.
    pub mode_override: Option<OperatingMode>,
    /// Safety faults raised this tick (bitmask of `SafetyFault`).
    pub faults: u8,
}

/// Pump timing limits, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpLimits {
    pub min_run_ms: u64,
    pub runaway_ms: u64,
}

impl PumpLimits {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            min_run_ms: config.pump_min_run_ms(),
            runaway_ms: config.pump_runaway_ms(),
        }
    }
}

/// Pure policy evaluation over a supplied pump state and water level.
///
/// The state machine's candidate mode is accepted for symmetry with the
/// stateful wrapper; the decision never depends on it.
pub fn evaluate(
    pump: PumpState,
    water: WaterLevel,
    _mode: OperatingMode,
    now_ms: u64,
    limits: PumpLimits,
) -> PumpDecision {
    let mut next = pump;
    let mut faults = 0u8;

    if pump.is_running {
        let elapsed = pump.elapsed_ms(now_ms);
        if !water.is_full && elapsed >= limits.min_run_ms {
            next = PumpState::stopped_at(now_ms);
        } else if elapsed >= limits.runaway_ms {
            faults |= SafetyFault::PumpRunaway.mask();
        }
    } else if water.is_full {
        next = PumpState::running_since(now_ms);
    }

    if water.is_fault {
        faults |= SafetyFault::WaterSensorFault.mask();
    }

    PumpDecision {
        pump: next,
        mode_override: (faults != 0).then_some(OperatingMode::Off),
        faults,
    }
}

/// Stateful wrapper that logs pump switches and fault edges.
pub struct PumpSafetyPolicy {
    limits: PumpLimits,
    /// Fault bits raised on the previous evaluation.
    faults: u8,
}

impl PumpSafetyPolicy {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            limits: PumpLimits::from_config(config),
            faults: 0,
        }
    }

    /// Evaluate against the current pump state; returns the decision and
    /// logs whatever changed.
    pub fn evaluate(
        &mut self,
        pump: PumpState,
        water: WaterLevel,
        mode: OperatingMode,
        now_ms: u64,
    ) -> PumpDecision {
        let decision = evaluate(pump, water, mode, now_ms, self.limits);

        if decision.pump.is_running != pump.is_running {
            if decision.pump.is_running {
                info!("PUMP: reservoir full, starting");
            } else {
                info!(
                    "PUMP: reservoir clear after {}ms, stopping",
                    pump.elapsed_ms(now_ms)
                );
            }
        }

        for fault in [SafetyFault::WaterSensorFault, SafetyFault::PumpRunaway] {
            let now_set = decision.faults & fault.mask() != 0;
            let was_set = self.faults & fault.mask() != 0;
            if now_set && !was_set {
                error!("SAFETY FAULT SET: {fault} (state machine wanted {mode})");
            } else if !now_set && was_set {
                info!("SAFETY FAULT CLEARED: {fault}");
            }
        }
        self.faults = decision.faults;

        decision
    }

    /// Faults raised on the most recent evaluation.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** fault is active.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    pub fn limits(&self) -> PumpLimits {
        self.limits
    }
}
