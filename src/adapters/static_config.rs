//! Compiled-in configuration adapter.
//!
//! Implements [`ConfigPort`] over a JSON document baked into the firmware
//! image (`config/dehumidifier.json`).  The unit has no runtime config
//! channel, so there is nothing to persist; changing a parameter means
//! editing the document and reflashing.

use log::info;

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

/// The document shipped with the firmware.
pub const EMBEDDED_CONFIG: &str = include_str!("../../config/dehumidifier.json");

pub struct StaticConfig {
    document: &'static str,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self::embedded()
    }
}

impl StaticConfig {
    pub const fn embedded() -> Self {
        Self {
            document: EMBEDDED_CONFIG,
        }
    }

    /// Use an alternative document (tests, bench rigs).
    pub const fn from_document(document: &'static str) -> Self {
        Self { document }
    }
}

impl ConfigPort for StaticConfig {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        if self.document.trim().is_empty() {
            return Err(ConfigError::NotFound);
        }
        let config = SystemConfig::from_json(self.document)?;
        info!(
            "Config: target {:.1}\u{00b0}C, pump min-run {}s / runaway {}s, period {}ms",
            config.target_temperature_c,
            config.pump_min_run_secs,
            config.pump_runaway_secs,
            config.control_loop_interval_ms
        );
        Ok(config)
    }
}
