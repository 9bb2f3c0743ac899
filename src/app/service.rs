//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the controller context and the pump safety policy
//! and runs one control step per call to [`AppService::tick`].  All I/O
//! flows through port traits injected at call sites, making the whole
//! service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │        AppService        │
//! ActuatorPort ◀──│  Mode FSM · Pump policy  │
//!                 └──────────────────────────┘
//! ```
//!
//! One tick:
//!
//! 1. read the water level, then the thermistors into a snapshot;
//! 2. emit telemetry tagged with the pre-transition mode;
//! 3. run the mode state machine for a candidate mode;
//! 4. run the pump safety policy, which may force Off;
//! 5. drive every actuator from the final mode and the pump state.
//!
//! A failed thermistor read skips 2 and 3: the unit is forced Off and the
//! `SensorUnavailable` fault bit is raised, but the pump policy still runs
//! on the water level.  Only a failed water-level read holds the pump.

use heapless::HistoryBuffer;
use log::{debug, info, warn};

use crate::config::SystemConfig;
use crate::error::{SafetyFault, SensorError};
use crate::fsm::context::{ActuatorCommands, ControllerContext, SensorSnapshot};
use crate::fsm::{self, ModeInputs, OperatingMode};
use crate::safety::{PumpDecision, PumpSafetyPolicy, PumpState};

use super::events::{AppEvent, TelemetryData, TransitionCause, TransitionRecord};
use super::ports::{ActuatorPort, EventSink, SensorPort, WaterLevel};

/// Number of recent mode transitions kept for diagnostics.
pub const TRANSITION_HISTORY_LEN: usize = 16;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    ctx: ControllerContext,
    pump_policy: PumpSafetyPolicy,
    history: HistoryBuffer<TransitionRecord, TRANSITION_HISTORY_LEN>,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch hardware: call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let pump_policy = PumpSafetyPolicy::new(&config);
        Self {
            ctx: ControllerContext::new(config, 0),
            pump_policy,
            history: HistoryBuffer::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output off and enter Off.  Power-up counts as a pump
    /// stop, so both pump timers start from `now_ms`.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, now_ms: u64, sink: &mut impl EventSink) {
        self.ctx.mode = OperatingMode::Off;
        self.ctx.pump = PumpState::stopped_at(now_ms);
        self.ctx.commands = ActuatorCommands::all_off();
        hw.all_off();

        if let Some(enter) = OperatingMode::Off.descriptor().on_enter {
            enter(&self.ctx);
        }
        sink.emit(&AppEvent::Started(self.ctx.mode));
        info!(
            "AppService started in {}, target {:.1}\u{00b0}C",
            self.ctx.mode, self.ctx.config.target_temperature_c
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle and return the final mode.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`] so both are borrowed through one mutable reference.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> OperatingMode {
        self.ctx.total_ticks += 1;
        let prev_mode = self.ctx.mode;
        let prev_faults = self.ctx.fault_flags;

        let unavailable = SafetyFault::SensorUnavailable.mask();
        let (next_mode, faults) = match hw.read_water_level() {
            Ok(water) => match hw.read_snapshot(water) {
                Ok(snapshot) => self.evaluate(&snapshot, water, now_ms, sink),
                Err(e) => {
                    self.mark_unavailable(prev_faults, e);
                    let decision = self.run_pump_policy(water, OperatingMode::Off, now_ms, sink);
                    (OperatingMode::Off, decision.faults | unavailable)
                }
            },
            Err(e) => {
                self.mark_unavailable(prev_faults, e);
                (OperatingMode::Off, unavailable)
            }
        };

        self.ctx.fault_flags = faults;
        if faults != 0 && faults != prev_faults {
            warn!("Safety fault! flags=0b{faults:08b}");
            sink.emit(&AppEvent::FaultDetected(faults));
        } else if faults == 0 && prev_faults != 0 {
            info!("All safety faults cleared");
            sink.emit(&AppEvent::FaultCleared);
        }

        if next_mode != prev_mode {
            self.transition(prev_mode, next_mode, cause_for(&self.ctx), now_ms, sink);
        }

        self.ctx.commands = ActuatorCommands::from_parts(next_mode.outputs(), self.ctx.pump.is_running);
        self.apply_actuators(hw);

        next_mode
    }

    /// Steps 2–4 over a good snapshot.  Returns the final mode and the
    /// fault bits raised this tick.
    fn evaluate(
        &mut self,
        snapshot: &SensorSnapshot,
        water: WaterLevel,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> (OperatingMode, u8) {
        self.ctx.sensors = Some(*snapshot);
        let mode = self.ctx.mode;

        debug!(
            "raw air={} cooler={} water_full={} water_fault={}",
            snapshot.air_raw, snapshot.cooler_raw, snapshot.is_water_full, snapshot.is_water_sensor_fault
        );
        sink.emit(&AppEvent::Telemetry(self.build_telemetry()));

        let inputs = ModeInputs::new(
            snapshot.air_temperature_c,
            snapshot.cooler_temperature_c,
            self.ctx.config.target_temperature_c,
            self.ctx.config.thresholds,
        );
        let candidate = fsm::advance(mode, &inputs);

        let decision = self.run_pump_policy(water, candidate, now_ms, sink);
        if let Some(forced) = decision.mode_override {
            if forced != candidate {
                warn!("Pump policy overrides {candidate} -> {forced}");
            }
        }
        (decision.mode_override.unwrap_or(candidate), decision.faults)
    }

    /// Step 4.  Adopts the policy's pump state and reports a switch.
    fn run_pump_policy(
        &mut self,
        water: WaterLevel,
        candidate: OperatingMode,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> PumpDecision {
        let decision = self.pump_policy.evaluate(self.ctx.pump, water, candidate, now_ms);
        if decision.pump.is_running != self.ctx.pump.is_running {
            sink.emit(&AppEvent::PumpChanged {
                running: decision.pump.is_running,
            });
        }
        self.ctx.pump = decision.pump;
        decision
    }

    fn mark_unavailable(&mut self, prev_faults: u8, e: SensorError) {
        if prev_faults & SafetyFault::SensorUnavailable.mask() == 0 {
            warn!("Sensor snapshot unavailable ({e}), forcing Off");
        }
        self.ctx.sensors = None;
    }

    fn transition(
        &mut self,
        from: OperatingMode,
        to: OperatingMode,
        cause: TransitionCause,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) {
        self.ctx.mode = to;
        if let Some(enter) = to.descriptor().on_enter {
            enter(&self.ctx);
        }
        self.history.write(TransitionRecord {
            tick: self.ctx.total_ticks,
            at_ms: now_ms,
            from,
            to,
            cause,
        });
        info!("MODE: {from} -> {to} ({cause:?})");
        sink.emit(&AppEvent::ModeChanged { from, to, cause });
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> TelemetryData {
        let snap = self.ctx.sensors.unwrap_or_default();
        TelemetryData {
            mode: self.ctx.mode,
            air_raw: snap.air_raw,
            cooler_raw: snap.cooler_raw,
            air_temperature_c: snap.air_temperature_c,
            cooler_temperature_c: snap.cooler_temperature_c,
            is_water_full: snap.is_water_full,
            is_water_sensor_fault: snap.is_water_sensor_fault,
            pump_running: self.ctx.pump.is_running,
            fault_flags: self.ctx.fault_flags,
        }
    }

    /// Current operating mode.
    pub fn mode(&self) -> OperatingMode {
        self.ctx.mode
    }

    pub fn pump(&self) -> PumpState {
        self.ctx.pump
    }

    /// Commands applied on the most recent tick.
    pub fn commands(&self) -> ActuatorCommands {
        self.ctx.commands
    }

    /// Latest good snapshot; `None` before the first read or after a failed one.
    pub fn sensors(&self) -> Option<SensorSnapshot> {
        self.ctx.sensors
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.ctx.total_ticks
    }

    /// Current active fault bitmask (0 = no faults).
    pub fn fault_flags(&self) -> u8 {
        self.ctx.fault_flags
    }

    pub fn config(&self) -> &SystemConfig {
        &self.ctx.config
    }

    /// Recent mode transitions, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.history.oldest_ordered()
    }

    pub fn last_transition(&self) -> Option<&TransitionRecord> {
        self.history.recent()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate the tick's commands into port calls.  Every output is
    /// written every tick.
    fn apply_actuators(&self, hw: &mut impl ActuatorPort) {
        let cmds = &self.ctx.commands;
        hw.set_outside_fan_speed(cmds.outside_fan);
        hw.set_inside_fan_speed(cmds.inside_fan);
        hw.set_compressor(cmds.compressor_on);
        hw.set_pump(cmds.pump_on);
    }
}

/// Attribute a transition to the most serious active fault.
fn cause_for(ctx: &ControllerContext) -> TransitionCause {
    if ctx.has_fault(SafetyFault::SensorUnavailable) {
        TransitionCause::SensorUnavailable
    } else if ctx.has_fault(SafetyFault::WaterSensorFault) {
        TransitionCause::WaterSensorFault
    } else if ctx.has_fault(SafetyFault::PumpRunaway) {
        TransitionCause::PumpRunaway
    } else {
        TransitionCause::Thermal
    }
}
