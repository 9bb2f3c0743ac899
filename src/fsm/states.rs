//! Concrete transition rules and the static state table.
//!
//! Each mode is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!            [Δ > -OFF + margin]          [Δ > 0]
//!   OFF ─────────────────────────▶ STANDBY ───────▶ COOLING
//!    ▲                              │  ▲              │  ▲
//!    └────────[Δ < -OFF]────────────┘  └──[Δ < -SB]───┘  │
//!                                                 [coil < START]
//!                                                     │  │ [coil > STOP]
//!                                                     ▼  │
//!                                                  UNFROSTING
//!
//!  Pump policy ──[runaway | water sensor fault]──▶ OFF (any mode)
//! ```
//!
//! Unfrosting is evaluated in two stages.  Its own exit rule runs first;
//! the Cooling rule is then re-run on the same tick and, when it fires,
//! overrides the stage-one result.  When it does not fire, the stage-one
//! result stands, which may still be Unfrosting.  The double evaluation is
//! the unit's long-standing behaviour: with a cold coil and a room already
//! below the StandBy band, a defrost cycle is cut short straight to StandBy.

use super::context::{ControllerContext, InsideFanSpeed, ModeOutputs, OutsideFanSpeed};
use super::{ModeInputs, OperatingMode, StateDescriptor};
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table
// ═══════════════════════════════════════════════════════════════════════════

/// The static state table, indexed by `OperatingMode as usize`.
pub static STATE_TABLE: [StateDescriptor; OperatingMode::COUNT] = [
    // Index 0: Off
    StateDescriptor {
        id: OperatingMode::Off,
        name: "Off",
        outputs: ModeOutputs::OFF,
        on_enter: Some(off_enter),
        on_update: off_update,
    },
    // Index 1: StandBy
    StateDescriptor {
        id: OperatingMode::StandBy,
        name: "StandBy",
        outputs: ModeOutputs {
            outside_fan: OutsideFanSpeed::Off,
            inside_fan: InsideFanSpeed::Low,
            compressor_on: false,
        },
        on_enter: Some(standby_enter),
        on_update: standby_update,
    },
    // Index 2: Cooling
    StateDescriptor {
        id: OperatingMode::Cooling,
        name: "Cooling",
        outputs: ModeOutputs {
            outside_fan: OutsideFanSpeed::High,
            inside_fan: InsideFanSpeed::High,
            compressor_on: true,
        },
        on_enter: Some(cooling_enter),
        on_update: cooling_update,
    },
    // Index 3: Unfrosting
    StateDescriptor {
        id: OperatingMode::Unfrosting,
        name: "Unfrosting",
        outputs: ModeOutputs {
            outside_fan: OutsideFanSpeed::Off,
            inside_fan: InsideFanSpeed::High,
            compressor_on: false,
        },
        on_enter: Some(unfrosting_enter),
        on_update: unfrosting_update,
    },
];

// ═══════════════════════════════════════════════════════════════════════════
//  OFF
// ═══════════════════════════════════════════════════════════════════════════

fn off_enter(ctx: &ControllerContext) {
    if ctx.has_faults() {
        warn!("OFF: forced, fault_flags=0b{:08b}", ctx.fault_flags);
    } else {
        info!("OFF: room below target, all outputs idle");
    }
}

fn off_update(i: &ModeInputs) -> Option<OperatingMode> {
    let t = &i.thresholds;
    if i.delta_c() > -t.off_c + t.off_restart_margin_c {
        return Some(OperatingMode::StandBy);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  STANDBY: inside fan circulating, compressor idle
// ═══════════════════════════════════════════════════════════════════════════

fn standby_enter(ctx: &ControllerContext) {
    info!(
        "STANDBY: inside fan low, target {:.1}\u{00b0}C",
        ctx.config.target_temperature_c
    );
}

fn standby_update(i: &ModeInputs) -> Option<OperatingMode> {
    let delta = i.delta_c();
    if delta > 0.0 {
        return Some(OperatingMode::Cooling);
    }
    if delta < -i.thresholds.off_c {
        return Some(OperatingMode::Off);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  COOLING: compressor on, both fans high
// ═══════════════════════════════════════════════════════════════════════════

fn cooling_enter(_ctx: &ControllerContext) {
    info!("COOLING: compressor on, fans high");
}

fn cooling_update(i: &ModeInputs) -> Option<OperatingMode> {
    if i.delta_c() < -i.thresholds.standby_c {
        return Some(OperatingMode::StandBy);
    }
    if i.cooler_c < i.thresholds.unfrost_start_c {
        return Some(OperatingMode::Unfrosting);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  UNFROSTING: compressor off, inside fan high to melt evaporator ice
// ═══════════════════════════════════════════════════════════════════════════

fn unfrosting_enter(ctx: &ControllerContext) {
    let coil = ctx.sensors.map_or(f32::NAN, |s| s.cooler_temperature_c);
    info!(
        "UNFROSTING: coil at {:.1}\u{00b0}C, defrosting until above {:.1}\u{00b0}C",
        coil, ctx.config.thresholds.unfrost_stop_c
    );
}

/// Stage one: has the coil thawed?
fn unfrosting_exit(i: &ModeInputs) -> Option<OperatingMode> {
    if i.cooler_c > i.thresholds.unfrost_stop_c {
        if i.delta_c() < -i.thresholds.standby_c {
            return Some(OperatingMode::StandBy);
        }
        return Some(OperatingMode::Cooling);
    }
    None
}

fn unfrosting_update(i: &ModeInputs) -> Option<OperatingMode> {
    let candidate = unfrosting_exit(i);
    // Stage two: the Cooling rule always runs as well.
    cooling_update(i).or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlThresholds;

    fn inputs(air: f32, cooler: f32, target: f32) -> ModeInputs {
        ModeInputs::new(air, cooler, target, ControlThresholds::default())
    }

    #[test]
    fn unfrosting_stage_one_alone() {
        assert_eq!(unfrosting_exit(&inputs(28.0, 11.0, 28.0)), Some(OperatingMode::Cooling));
        assert_eq!(unfrosting_exit(&inputs(26.0, 11.0, 28.0)), Some(OperatingMode::StandBy));
        assert_eq!(unfrosting_exit(&inputs(28.0, 9.0, 28.0)), None);
    }

    #[test]
    fn unfrosting_stage_two_overrides_candidate() {
        // Stage one says nothing (coil cold); stage two sees the room cool.
        let i = inputs(26.0, 3.0, 28.0);
        assert_eq!(unfrosting_exit(&i), None);
        assert_eq!(unfrosting_update(&i), Some(OperatingMode::StandBy));
    }

    #[test]
    fn unfrosting_cold_coil_warm_room_reports_self() {
        // Stage two fires its defrost rule, naming the current mode.
        let i = inputs(29.0, 3.0, 28.0);
        assert_eq!(unfrosting_update(&i), Some(OperatingMode::Unfrosting));
    }

    #[test]
    fn off_update_uses_restart_margin() {
        let mut t = ControlThresholds::default();
        t.off_restart_margin_c = 0.0;
        let i = ModeInputs::new(25.1, 20.0, 28.0, t);
        assert_eq!(off_update(&i), Some(OperatingMode::StandBy));
        t.off_restart_margin_c = 0.5;
        let i = ModeInputs::new(25.1, 20.0, 28.0, t);
        assert_eq!(off_update(&i), None);
    }
}
