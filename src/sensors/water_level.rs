//! Condensate reservoir float switch with redundant NO/NC contacts.
//!
//! The switch has two contacts wired to separate GPIOs:
//!
//! | Contact | Reservoir full | Reservoir not full |
//! |---------|----------------|--------------------|
//! | NO      | HIGH           | LOW                |
//! | NC      | LOW            | HIGH               |
//!
//! Each contact is normalized to "full?" on its own.  When the two agree
//! the reading is trusted; when they disagree the switch (or its wiring)
//! is broken, the reading is a fault, and `is_full` reports `false`.
//!
//! Both contacts failing the same way is indistinguishable from a genuine
//! reading and is not detected here.

use embedded_hal::digital::InputPin;

use crate::app::ports::WaterLevel;
use crate::error::SensorError;

/// Combine the two contact levels into a reading.
pub fn interpret(no_high: bool, nc_high: bool) -> WaterLevel {
    let no_says_full = no_high;
    let nc_says_full = !nc_high;
    if no_says_full == nc_says_full {
        WaterLevel {
            is_full: no_says_full,
            is_fault: false,
        }
    } else {
        WaterLevel {
            is_full: false,
            is_fault: true,
        }
    }
}

pub struct WaterLevelSensor<P> {
    no_contact: P,
    nc_contact: P,
}

impl<P: InputPin> WaterLevelSensor<P> {
    pub fn new(no_contact: P, nc_contact: P) -> Self {
        Self {
            no_contact,
            nc_contact,
        }
    }

    pub fn read(&mut self) -> Result<WaterLevel, SensorError> {
        let no_high = self
            .no_contact
            .is_high()
            .map_err(|_| SensorError::GpioReadFailed)?;
        let nc_high = self
            .nc_contact
            .is_high()
            .map_err(|_| SensorError::GpioReadFailed)?;
        Ok(interpret(no_high, nc_high))
    }
}
