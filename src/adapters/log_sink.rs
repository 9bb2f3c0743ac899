//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production).  The telemetry line
//! carries the raw ADC samples, the water contact state, both
//! temperatures and the mode, once per tick.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | raw air={} cooler={} | water_fault={} full={} | \
                     air={:.1}\u{00b0}C cooler={:.1}\u{00b0}C | mode={} | pump={} | \
                     faults=0b{:08b}",
                    t.air_raw,
                    t.cooler_raw,
                    t.is_water_sensor_fault,
                    t.is_water_full,
                    t.air_temperature_c,
                    t.cooler_temperature_c,
                    t.mode,
                    if t.pump_running { "ON" } else { "off" },
                    t.fault_flags,
                );
            }
            AppEvent::ModeChanged { from, to, cause } => {
                info!("MODE  | {from} -> {to} ({cause:?})");
            }
            AppEvent::PumpChanged { running } => {
                info!("PUMP  | {}", if *running { "started" } else { "stopped" });
            }
            AppEvent::FaultDetected(flags) => {
                warn!("FAULT | detected, flags=0b{flags:08b}");
            }
            AppEvent::FaultCleared => {
                info!("FAULT | all cleared");
            }
            AppEvent::Started(mode) => {
                info!("START | initial_mode={mode}");
            }
        }
    }
}
