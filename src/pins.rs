//! GPIO / peripheral pin assignments for the dehumidifier control board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Sensors: Analog (ADC1)
// ---------------------------------------------------------------------------

/// Evaporator coil thermistor.  ADC1 channel 0 (GPIO 1 on ESP32-S3).
pub const COOLER_TEMP_ADC_GPIO: i32 = 1;
pub const COOLER_TEMP_ADC_CHANNEL: u32 = 0;

/// Room air thermistor.  ADC1 channel 1 (GPIO 2 on ESP32-S3).
pub const AIR_TEMP_ADC_GPIO: i32 = 2;
pub const AIR_TEMP_ADC_CHANNEL: u32 = 1;

// ---------------------------------------------------------------------------
// Sensors: Digital
// ---------------------------------------------------------------------------

/// Float switch, normally-open contact.  HIGH = reservoir full.
pub const WATER_NO_GPIO: i32 = 13;
/// Float switch, normally-closed contact.  LOW = reservoir full.
pub const WATER_NC_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Relays (active HIGH)
// ---------------------------------------------------------------------------

pub const PUMP_RELAY_GPIO: i32 = 15;
pub const COMPRESSOR_RELAY_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Fans: one relay output per speed tap
// ---------------------------------------------------------------------------

pub const INSIDE_FAN_LOW_GPIO: i32 = 17;
pub const INSIDE_FAN_MEDIUM_GPIO: i32 = 18;
pub const INSIDE_FAN_HIGH_GPIO: i32 = 21;

pub const OUTSIDE_FAN_LOW_GPIO: i32 = 38;
pub const OUTSIDE_FAN_HIGH_GPIO: i32 = 39;

// ---------------------------------------------------------------------------
// Louver stepper (unused; coils held low)
// ---------------------------------------------------------------------------

pub const STEPPER_COIL_GPIOS: [i32; 4] = [40, 41, 42, 47];

// ---------------------------------------------------------------------------
// Groupings used by hw_init
// ---------------------------------------------------------------------------

/// Every pin configured as a push-pull output and driven LOW at boot.
pub const OUTPUT_GPIOS: [i32; 11] = [
    PUMP_RELAY_GPIO,
    COMPRESSOR_RELAY_GPIO,
    INSIDE_FAN_LOW_GPIO,
    INSIDE_FAN_MEDIUM_GPIO,
    INSIDE_FAN_HIGH_GPIO,
    OUTSIDE_FAN_LOW_GPIO,
    OUTSIDE_FAN_HIGH_GPIO,
    STEPPER_COIL_GPIOS[0],
    STEPPER_COIL_GPIOS[1],
    STEPPER_COIL_GPIOS[2],
    STEPPER_COIL_GPIOS[3],
];

/// Every digital input.
pub const INPUT_GPIOS: [i32; 2] = [WATER_NO_GPIO, WATER_NC_GPIO];
