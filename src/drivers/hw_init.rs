//! One-shot hardware peripheral initialization and raw pin access.
//!
//! Configures the two thermistor ADC channels and every GPIO using raw
//! ESP-IDF sys calls.  Called once from `main()` before the control loop
//! starts.  Every output is driven LOW during configuration, so the unit
//! powers up with the compressor, fans, pump and stepper coils off.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: real ADC oneshot reads and GPIO register access.
//! On host/test: pin levels and ADC samples live in static atomics that
//! tests and the simulator poke directly.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

use crate::error::SensorError;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc)    => write!(f, "ADC1 init failed (rc={rc})"),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={rc})"),
        }
    }
}

impl core::error::Error for HwInitError {}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::AdcInitFailed(_) => Self::Init("ADC1"),
            HwInitError::GpioConfigFailed(_) => Self::Init("GPIO"),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_gpio_outputs()?;
        init_gpio_inputs()?;
        init_adc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    for &pin in &pins::OUTPUT_GPIOS {
        gpio_write(pin, false);
    }
    log::info!("hw_init(sim): outputs driven low, peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path.  No concurrent access is possible because
/// `init_adc()` completes before the control loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };

    for channel in [pins::COOLER_TEMP_ADC_CHANNEL, pins::AIR_TEMP_ADC_CHANNEL] {
        let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), channel, &chan_cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }
    }

    info!("hw_init: ADC1 configured (CH0=cooler, CH1=air)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Result<u16, SensorError> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract: single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return Err(SensorError::AdcReadFailed);
    }
    Ok(raw.max(0) as u16)
}

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicBool, AtomicU16};

    pub const ADC_CHANNELS: usize = 10;
    pub const GPIO_COUNT: usize = 49;

    pub static ADC: [AtomicU16; ADC_CHANNELS] = [const { AtomicU16::new(0) }; ADC_CHANNELS];
    pub static ADC_FAIL: [AtomicBool; ADC_CHANNELS] = [const { AtomicBool::new(false) }; ADC_CHANNELS];
    pub static GPIO: [AtomicBool; GPIO_COUNT] = [const { AtomicBool::new(false) }; GPIO_COUNT];
}

#[cfg(not(target_os = "espidf"))]
pub fn adc1_read(channel: u32) -> Result<u16, SensorError> {
    use core::sync::atomic::Ordering;
    let ch = channel as usize;
    if ch >= sim::ADC_CHANNELS || sim::ADC_FAIL[ch].load(Ordering::Relaxed) {
        return Err(SensorError::AdcReadFailed);
    }
    Ok(sim::ADC[ch].load(Ordering::Relaxed))
}

/// Inject a raw ADC sample for `channel` (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc(channel: u32, raw: u16) {
    use core::sync::atomic::Ordering;
    if let Some(slot) = sim::ADC.get(channel as usize) {
        slot.store(raw, Ordering::Relaxed);
    }
}

/// Make reads of `channel` fail (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_adc_fail(channel: u32, fail: bool) {
    use core::sync::atomic::Ordering;
    if let Some(slot) = sim::ADC_FAIL.get(channel as usize) {
        slot.store(fail, Ordering::Relaxed);
    }
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    for &pin in &pins::INPUT_GPIOS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
    }

    info!("hw_init: GPIO inputs configured (water NO/NC)");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access on an
    // already-configured input pin; safe to call from main context.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(pin: i32) -> bool {
    use core::sync::atomic::Ordering;
    usize::try_from(pin)
        .ok()
        .and_then(|p| sim::GPIO.get(p))
        .is_some_and(|level| level.load(Ordering::Relaxed))
}

/// Force an input level (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gpio(pin: i32, high: bool) {
    gpio_write(pin, high);
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    for &pin in &pins::OUTPUT_GPIOS {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as i32 { return Err(HwInitError::GpioConfigFailed(ret)); }
        unsafe { gpio_set_level(pin as gpio_num_t, 0) };
    }

    info!("hw_init: GPIO outputs configured, all low");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin;
    // pin was configured during init_gpio_outputs(). Main-loop only.
    unsafe { gpio_set_level(pin as gpio_num_t, u32::from(high)); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: i32, high: bool) {
    use core::sync::atomic::Ordering;
    if let Some(level) = usize::try_from(pin).ok().and_then(|p| sim::GPIO.get(p)) {
        level.store(high, Ordering::Relaxed);
    }
}

// ── embedded-hal pin handle ───────────────────────────────────

/// A configured GPIO, exposed through the `embedded-hal` digital traits so
/// the fan, relay and water-level drivers stay hardware-agnostic.
///
/// Construct only for pins listed in [`pins`]; `init_peripherals()` must
/// have run first on target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwPin {
    gpio: i32,
}

impl HwPin {
    pub const fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl embedded_hal::digital::ErrorType for HwPin {
    type Error = core::convert::Infallible;
}

impl embedded_hal::digital::OutputPin for HwPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.gpio, false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        gpio_write(self.gpio, true);
        Ok(())
    }
}

impl embedded_hal::digital::InputPin for HwPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(gpio_read(self.gpio))
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!gpio_read(self.gpio))
    }
}
