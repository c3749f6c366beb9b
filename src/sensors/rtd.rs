//! PT100 RTD temperature probe behind a ratiometric analog front-end.
//!
//! The front-end drives the probe and a precision reference resistor from
//! the same excitation source, so the ADC reading is a pure resistance
//! ratio.  Resistance is converted to temperature with the Callendar-Van
//! Dusen equation (quadratic form, valid above -200 °C).
//!
//! Rail-pinned conversions latch a device fault (open probe / shorted
//! probe, as a MAX31865-style front-end reports them); the latch is cleared
//! by `reset()`, which the acquisition loop invokes after any failed read.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH3 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::{ReadError, SetupError};
use crate::measurement::Measurement;
use crate::sensors::Sensor;

static SIM_RTD_ADC: AtomicU16 = AtomicU16::new(1024);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_rtd_adc(raw: u16) {
    SIM_RTD_ADC.store(raw, Ordering::Relaxed);
}

const ADC_MAX: f32 = 4095.0;

// Callendar-Van Dusen coefficients for a standard 385 platinum element.
const CVD_A: f32 = 3.9083e-3;
const CVD_B: f32 = -5.775e-7;

/// Open-probe fault code (conversion pinned to the low rail).
const FAULT_OPEN: u8 = 0x10;
/// Shorted-probe fault code (conversion pinned to the high rail).
const FAULT_SHORT: u8 = 0x04;

pub struct RtdSensor {
    r_ref: f32,
    r0: f32,
    fault_latch: Option<u8>,
    _adc_gpio: i32,
}

impl RtdSensor {
    pub fn new(adc_gpio: i32, r_ref_ohms: f32, r0_ohms: f32) -> Self {
        Self {
            r_ref: r_ref_ohms,
            r0: r0_ohms,
            fault_latch: None,
            _adc_gpio: adc_gpio,
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(crate::pins::ADC1_CH_RTD)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_RTD_ADC.load(Ordering::Relaxed)
    }

    fn raw_to_ohms(&self, raw: u16) -> f32 {
        (raw as f32 / ADC_MAX) * self.r_ref
    }

    /// Quadratic Callendar-Van Dusen inversion, valid for t >= -200 °C.
    fn ohms_to_celsius(&self, ohms: f32) -> f32 {
        let ratio = ohms / self.r0;
        let discriminant = CVD_A * CVD_A - 4.0 * CVD_B * (1.0 - ratio);
        (-CVD_A + discriminant.max(0.0).sqrt()) / (2.0 * CVD_B)
    }

    fn convert(&mut self, raw: u16) -> Result<Measurement, ReadError> {
        if raw == 0 {
            self.fault_latch = Some(FAULT_OPEN);
            return Err(ReadError::DeviceFault(FAULT_OPEN));
        }
        if raw as f32 >= ADC_MAX {
            self.fault_latch = Some(FAULT_SHORT);
            return Err(ReadError::DeviceFault(FAULT_SHORT));
        }

        let ohms = self.raw_to_ohms(raw);
        let celsius = self.ohms_to_celsius(ohms);
        if !(-200.0..=850.0).contains(&celsius) {
            return Err(ReadError::OutOfRange);
        }

        Ok(Measurement::from([
            ("celsius", f64::from(celsius)),
            ("resistance_ohms", f64::from(ohms)),
        ]))
    }
}

impl Sensor for RtdSensor {
    fn read(&mut self) -> Result<Measurement, ReadError> {
        // A latched probe fault sticks until reset() clears it, matching the
        // front-end's fault-status register behaviour.
        if let Some(code) = self.fault_latch {
            return Err(ReadError::DeviceFault(code));
        }
        let raw = self.read_adc();
        self.convert(raw)
    }

    fn setup(&mut self) -> Result<(), SetupError> {
        // Self-test conversion: one throwaway read must land on-scale.
        let raw = self.read_adc();
        if raw == 0 || raw as f32 >= ADC_MAX {
            return Err(SetupError::SelfTestFailed);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.fault_latch = None;
    }
}
