//! Dehumidifier Firmware: Main Entry Point
//!
//! Hexagonal architecture with a fixed-period control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   StaticConfig   Esp32Time     │
//! │  (Sensor+Actuator) (EventSink)    (ConfigPort)   (TimePort)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Mode FSM · Pump safety policy                         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use dehumidifier::adapters::hardware::HardwareAdapter;
use dehumidifier::adapters::log_sink::LogEventSink;
use dehumidifier::adapters::static_config::StaticConfig;
use dehumidifier::adapters::time::Esp32TimeAdapter;
use dehumidifier::app::ports::{ConfigPort, TimePort};
use dehumidifier::app::service::AppService;
use dehumidifier::config::SystemConfig;
use dehumidifier::drivers::hw_init;
use dehumidifier::drivers::watchdog::{DEFAULT_TIMEOUT_MS, Watchdog};
use dehumidifier::error::Error;
use dehumidifier::sensors::SensorHub;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Dehumidifier v{}                 ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals: every output low before anything else ──
    hw_init::init_peripherals().context("peripheral init")?;

    // ── 3. Configuration (compiled in, falls back to defaults) ─
    let config = match StaticConfig::embedded().load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config load failed ({e}), using defaults");
            SystemConfig::default()
        }
    };

    // ── 4. Drivers and adapters ───────────────────────────────
    let hub = SensorHub::from_config(&config);
    let mut hw = HardwareAdapter::from_pins(hub)
        .map_err(Error::from)
        .context("actuator init")?;
    let clock = Esp32TimeAdapter::new();
    let mut log_sink = LogEventSink::new();
    let mut watchdog = Watchdog::new(DEFAULT_TIMEOUT_MS);

    let period_ms = u64::from(config.control_loop_interval_ms);
    let mut app = AppService::new(config);
    app.start(&mut hw, clock.now_ms(), &mut log_sink);

    info!("System ready. Entering control loop ({period_ms}ms period).");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        let tick_start = clock.now_ms();
        app.tick(&mut hw, tick_start, &mut log_sink);

        // Feed watchdog on every iteration.
        watchdog.feed();

        let spent = clock.now_ms().saturating_sub(tick_start);
        if spent >= period_ms {
            warn!("Tick {} overran: {spent}ms", app.tick_count());
        }
        std::thread::sleep(Duration::from_millis(period_ms.saturating_sub(spent)));
    }
}
