//! Function-pointer state table for the operating mode.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  STATE_TABLE                                                   │
//! │  ┌────────────┬─────────────────┬───────────┬────────────────┐ │
//! │  │ Mode       │ outputs         │ on_enter  │ on_update      │ │
//! │  ├────────────┼─────────────────┼───────────┼────────────────┤ │
//! │  │ Off        │ -   / -    / off│ fn(ctx)   │ fn(in)->Option │ │
//! │  │ StandBy    │ -   / Low  / off│ fn(ctx)   │ fn(in)->Option │ │
//! │  │ Cooling    │ High/ High / ON │ fn(ctx)   │ fn(in)->Option │ │
//! │  │ Unfrosting │ -   / High / off│ fn(ctx)   │ fn(in)->Option │ │
//! │  └────────────┴─────────────────┴───────────┴────────────────┘ │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`advance`] is a pure function of the current mode and the tick's
//! [`ModeInputs`]: it calls `on_update` for the current row and keeps the
//! mode when the handler returns `None`.  Outputs are looked up from the
//! final mode after the pump policy has had its say, so a forced Off
//! always drives the Off row.

pub mod context;
pub mod states;

use serde::Serialize;

use crate::config::ControlThresholds;
use context::{ControllerContext, ModeOutputs};

pub use states::STATE_TABLE;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// The unit's thermal-management phase.
/// Must stay in sync with [`states::STATE_TABLE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum OperatingMode {
    Off = 0,
    StandBy = 1,
    Cooling = 2,
    Unfrosting = 3,
}

impl OperatingMode {
    /// Total number of modes: used to size the table array.
    pub const COUNT: usize = 4;

    pub const ALL: [Self; Self::COUNT] = [Self::Off, Self::StandBy, Self::Cooling, Self::Unfrosting];

    /// The table row for this mode.
    pub fn descriptor(self) -> &'static StateDescriptor {
        &STATE_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Fan and compressor outputs for this mode.
    pub fn outputs(self) -> ModeOutputs {
        self.descriptor().outputs
    }
}

impl core::fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Per-tick inputs
// ---------------------------------------------------------------------------

/// Everything a transition handler may look at.
#[derive(Debug, Clone, Copy)]
pub struct ModeInputs {
    pub air_c: f32,
    pub cooler_c: f32,
    pub target_c: f32,
    pub thresholds: ControlThresholds,
}

impl ModeInputs {
    pub fn new(air_c: f32, cooler_c: f32, target_c: f32, thresholds: ControlThresholds) -> Self {
        Self {
            air_c,
            cooler_c,
            target_c,
            thresholds,
        }
    }

    /// Air temperature relative to the set-point.
    pub fn delta_c(&self) -> f32 {
        self.air_c - self.target_c
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Runs once when a mode is entered (logging only; no side effects on state).
pub type StateActionFn = fn(&ControllerContext);

/// Per-tick transition rule.
/// Returns `Some(next)` to change mode, or `None` to stay.
pub type StateUpdateFn = fn(&ModeInputs) -> Option<OperatingMode>;

/// Static descriptor for a single mode.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: OperatingMode,
    pub name: &'static str,
    pub outputs: ModeOutputs,
    pub on_enter: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

/// Evaluate one control step.  Total over every mode and every `f32`
/// input: comparisons against NaN are false, so the mode simply holds.
pub fn advance(mode: OperatingMode, inputs: &ModeInputs) -> OperatingMode {
    (mode.descriptor().on_update)(inputs).unwrap_or(mode)
}
