//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the controller if the control loop stalls.  A reset leaves every
//! relay de-energized, which is the unit's safe state.
//!
//! The control loop calls `feed()` once per tick.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use log::{info, warn};

/// Default stall timeout: ten control periods.
pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;

pub struct Watchdog {
    timeout_ms: u32,
    subscribed: bool,
    #[cfg(not(target_os = "espidf"))]
    feeds: u64,
}

impl Watchdog {
    /// Configure the TWDT and subscribe the current task.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before the control loop.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    warn!("TWDT reconfigure returned {ret} (may already be configured)");
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!("Watchdog: subscribed ({timeout_ms}ms timeout, panic on trigger)");
                } else {
                    warn!("Watchdog: failed to subscribe ({ret})");
                }

                Self { timeout_ms, subscribed }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            if timeout_ms == 0 {
                warn!("Watchdog(sim): zero timeout, not subscribing");
            } else {
                info!("Watchdog(sim): {timeout_ms}ms, no-op");
            }
            Self {
                timeout_ms,
                subscribed: timeout_ms > 0,
                feeds: 0,
            }
        }
    }

    /// Feed the watchdog.  Must be called at least once per timeout.
    #[cfg(target_os = "espidf")]
    pub fn feed(&mut self) {
        if self.subscribed {
            // SAFETY: the current task is subscribed; reset is a register poke.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }

    /// Feed the watchdog.  Must be called at least once per timeout.
    #[cfg(not(target_os = "espidf"))]
    pub fn feed(&mut self) {
        if self.subscribed {
            self.feeds += 1;
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Number of feeds so far (host only).
    #[cfg(not(target_os = "espidf"))]
    pub fn feeds(&self) -> u64 {
        self.feeds
    }
}
