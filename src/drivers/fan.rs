//! Multi-speed fan drivers.
//!
//! Each fan motor has one relay output per speed tap.  Energizing two taps
//! at once shorts motor windings, so every speed change first drives all
//! taps LOW and only then raises the selected one.

use embedded_hal::digital::OutputPin;

use crate::error::ActuatorError;
use crate::fsm::context::{InsideFanSpeed, OutsideFanSpeed};

/// Drive every tap low, then the selected one (if any) high.
fn select_tap<P: OutputPin>(taps: &mut [P], selected: Option<usize>) -> Result<(), ActuatorError> {
    for tap in taps.iter_mut() {
        tap.set_low().map_err(|_| ActuatorError::GpioWriteFailed)?;
    }
    if let Some(tap) = selected.and_then(|i| taps.get_mut(i)) {
        tap.set_high().map_err(|_| ActuatorError::GpioWriteFailed)?;
    }
    Ok(())
}

/// Evaporator fan: low / medium / high taps.
pub struct InsideFan<P> {
    taps: [P; 3],
    speed: InsideFanSpeed,
}

impl<P: OutputPin> InsideFan<P> {
    /// Takes the taps in `[low, medium, high]` order and starts stopped.
    pub fn new(low: P, medium: P, high: P) -> Result<Self, ActuatorError> {
        let mut fan = Self {
            taps: [low, medium, high],
            speed: InsideFanSpeed::Off,
        };
        select_tap(&mut fan.taps, None)?;
        Ok(fan)
    }

    pub fn set_speed(&mut self, speed: InsideFanSpeed) -> Result<(), ActuatorError> {
        let tap = match speed {
            InsideFanSpeed::Off => None,
            InsideFanSpeed::Low => Some(0),
            InsideFanSpeed::Medium => Some(1),
            InsideFanSpeed::High => Some(2),
        };
        select_tap(&mut self.taps, tap)?;
        self.speed = speed;
        Ok(())
    }

    pub fn speed(&self) -> InsideFanSpeed {
        self.speed
    }
}

/// Condenser fan: low / high taps.
pub struct OutsideFan<P> {
    taps: [P; 2],
    speed: OutsideFanSpeed,
}

impl<P: OutputPin> OutsideFan<P> {
    /// Takes the taps in `[low, high]` order and starts stopped.
    pub fn new(low: P, high: P) -> Result<Self, ActuatorError> {
        let mut fan = Self {
            taps: [low, high],
            speed: OutsideFanSpeed::Off,
        };
        select_tap(&mut fan.taps, None)?;
        Ok(fan)
    }

    pub fn set_speed(&mut self, speed: OutsideFanSpeed) -> Result<(), ActuatorError> {
        let tap = match speed {
            OutsideFanSpeed::Off => None,
            OutsideFanSpeed::Low => Some(0),
            OutsideFanSpeed::High => Some(1),
        };
        select_tap(&mut self.taps, tap)?;
        self.speed = speed;
        Ok(())
    }

    pub fn speed(&self) -> OutsideFanSpeed {
        self.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::rc::Rc;

    /// Mock output pin that records every write into a shared log.
    struct MockPin {
        id: u8,
        high: bool,
        log: Rc<RefCell<Vec<(u8, bool)>>>,
    }

    impl ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            self.log.borrow_mut().push((self.id, false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.log.borrow_mut().push((self.id, true));
            Ok(())
        }
    }

    fn pins(n: u8) -> (Vec<MockPin>, Rc<RefCell<Vec<(u8, bool)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let pins = (0..n)
            .map(|id| MockPin {
                id,
                high: true,
                log: Rc::clone(&log),
            })
            .collect();
        (pins, log)
    }

    fn inside_fan() -> (InsideFan<MockPin>, Rc<RefCell<Vec<(u8, bool)>>>) {
        let (mut p, log) = pins(3);
        let high = p.remove(2);
        let medium = p.remove(1);
        let low = p.remove(0);
        (InsideFan::new(low, medium, high).unwrap(), log)
    }

    #[test]
    fn starts_with_every_tap_low() {
        let (fan, _log) = inside_fan();
        assert_eq!(fan.speed(), InsideFanSpeed::Off);
        assert!(fan.taps.iter().all(|p| !p.high));
    }

    #[test]
    fn at_most_one_tap_high() {
        let (mut fan, _log) = inside_fan();
        for speed in [InsideFanSpeed::Low, InsideFanSpeed::High, InsideFanSpeed::Medium, InsideFanSpeed::Off] {
            fan.set_speed(speed).unwrap();
            let high = fan.taps.iter().filter(|p| p.high).count();
            assert_eq!(high, usize::from(speed != InsideFanSpeed::Off));
            assert_eq!(fan.speed(), speed);
        }
    }

    #[test]
    fn lowers_all_taps_before_raising_one() {
        let (mut fan, log) = inside_fan();
        fan.set_speed(InsideFanSpeed::Low).unwrap();
        log.borrow_mut().clear();
        fan.set_speed(InsideFanSpeed::High).unwrap();
        assert_eq!(*log.borrow(), vec![(0, false), (1, false), (2, false), (2, true)]);
    }

    #[test]
    fn outside_fan_high_uses_second_tap() {
        let (mut p, _log) = pins(2);
        let high = p.remove(1);
        let low = p.remove(0);
        let mut fan = OutsideFan::new(low, high).unwrap();
        fan.set_speed(OutsideFanSpeed::High).unwrap();
        assert!(!fan.taps[0].high);
        assert!(fan.taps[1].high);
        fan.set_speed(OutsideFanSpeed::Off).unwrap();
        assert!(fan.taps.iter().all(|p| !p.high));
    }
}
