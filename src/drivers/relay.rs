//! Single-output relay driver (compressor, condensate pump).
//!
//! Active HIGH.  The relay is driven off on construction.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;

pub struct Relay<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> Relay<P> {
    pub fn new(pin: P) -> Result<Self, ActuatorError> {
        let mut relay = Self { pin, on: false };
        relay.set(false)?;
        Ok(relay)
    }

    pub fn set(&mut self, on: bool) -> Result<(), ActuatorError> {
        let written = if on { self.pin.set_high() } else { self.pin.set_low() };
        written.map_err(|_| ActuatorError::GpioWriteFailed)?;
        self.on = on;
        Ok(())
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

/// Louver stepper.  Not driven by the controller: the four coils are
/// pulled LOW at startup and left there so the motor never holds current.
pub struct IdleStepper<P> {
    _coils: [P; 4],
}

impl<P: OutputPin> IdleStepper<P> {
    pub fn new(mut coils: [P; 4]) -> Result<Self, ActuatorError> {
        for coil in &mut coils {
            coil.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
        }
        Ok(Self { _coils: coils })
    }
}
