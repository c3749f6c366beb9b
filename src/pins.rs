//! GPIO / peripheral pin assignments for the FieldPod main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Sensors — Analog (ADC1)
// ---------------------------------------------------------------------------

/// PT100 RTD probe, ratiometric front-end output.
/// ADC1 channel 3 (GPIO 4 on ESP32-S3).
pub const RTD_ADC_GPIO: i32 = 4;
/// ADC1 channel for the RTD front-end.
pub const ADC1_CH_RTD: u32 = 3;

/// Cup anemometer, analog voltage output (0.4 – 2.0 V over the rated range).
/// ADC1 channel 4 (GPIO 5 on ESP32-S3).
pub const WIND_ADC_GPIO: i32 = 5;
/// ADC1 channel for the anemometer.
pub const ADC1_CH_WIND: u32 = 4;

/// HIH-4030 relative-humidity sensor, analog voltage output.
/// ADC1 channel 8 (GPIO 9 on ESP32-S3).
pub const HUMIDITY_ADC_GPIO: i32 = 9;
/// ADC1 channel for the humidity sensor.
pub const ADC1_CH_HUMIDITY: u32 = 8;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Heartbeat LED, toggled once per completed acquisition cycle.
pub const STATUS_LED_GPIO: i32 = 48;
