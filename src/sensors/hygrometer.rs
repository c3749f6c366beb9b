//! HIH-4030 relative-humidity sensor (analog output).
//!
//! The element needs a short polarisation period after power-up during
//! which conversions are meaningless; reads fail `NotReady` until the
//! warm-up read count has elapsed.  There is no meaningful recovery action
//! for this part, so the driver deliberately leaves `reset` unimplemented.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH8 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::{ReadError, SetupError};
use crate::measurement::Measurement;
use crate::sensors::Sensor;

static SIM_HUMIDITY_ADC: AtomicU16 = AtomicU16::new(2048);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_humidity_adc(raw: u16) {
    SIM_HUMIDITY_ADC.store(raw, Ordering::Relaxed);
}

const ADC_MAX: f32 = 4095.0;
const V_REF: f32 = 3.3;
/// Sensor supply rail (datasheet transfer function is referenced to it).
const V_SUPPLY: f32 = 3.3;

pub struct Hygrometer {
    warmup_reads: u32,
    reads_done: u32,
    _adc_gpio: i32,
}

impl Hygrometer {
    pub fn new(adc_gpio: i32, warmup_reads: u32) -> Self {
        Self {
            warmup_reads,
            reads_done: 0,
            _adc_gpio: adc_gpio,
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(crate::pins::ADC1_CH_HUMIDITY)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_HUMIDITY_ADC.load(Ordering::Relaxed)
    }

    /// HIH-4030 first-order transfer function (uncompensated, 25 °C).
    fn volts_to_rh(&self, volts: f32) -> f32 {
        let rh = (volts / V_SUPPLY - 0.16) / 0.0062;
        rh.clamp(0.0, 100.0)
    }
}

impl Sensor for Hygrometer {
    fn read(&mut self) -> Result<Measurement, ReadError> {
        self.reads_done = self.reads_done.saturating_add(1);
        if self.reads_done <= self.warmup_reads {
            return Err(ReadError::NotReady);
        }

        let raw = self.read_adc();
        let volts = (raw as f32 / ADC_MAX) * V_REF;
        Ok(Measurement::of("rel_humidity", f64::from(self.volts_to_rh(volts))))
    }

    fn setup(&mut self) -> Result<(), SetupError> {
        // A disconnected element reads the low rail.
        if self.read_adc() == 0 {
            return Err(SetupError::SelfTestFailed);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warms_up_before_first_valid_read() {
        let mut s = Hygrometer::new(0, 2);
        assert_eq!(s.read(), Err(ReadError::NotReady));
        assert_eq!(s.read(), Err(ReadError::NotReady));
        assert!(s.read().is_ok());
    }

    #[test]
    fn transfer_function_clamps_to_percent_range() {
        let s = Hygrometer::new(0, 0);
        assert_eq!(s.volts_to_rh(0.0), 0.0);
        assert_eq!(s.volts_to_rh(V_SUPPLY), 100.0);
    }
}
