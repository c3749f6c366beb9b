//! Cup anemometer with an analog voltage output.
//!
//! The transducer outputs 0.4 V at standstill rising linearly to 2.0 V at
//! the rated full-scale wind speed.  Gust structure lives well above the
//! 1 Hz packet cadence, so the driver declares an intrinsic 20 Hz sampling
//! rate and a mean reducer — the expectation is that it runs wrapped in a
//! [`FastSampler`](crate::sampling::FastSampler).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH4 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::ReadError;
use crate::measurement::Measurement;
use crate::reducers::{self, Reducer};
use crate::sensors::Sensor;

static SIM_WIND_ADC: AtomicU16 = AtomicU16::new(800);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_wind_adc(raw: u16) {
    SIM_WIND_ADC.store(raw, Ordering::Relaxed);
}

const ADC_MAX: f32 = 4095.0;
const V_REF: f32 = 3.3;
/// Transducer output at standstill.
const V_ZERO: f32 = 0.4;
/// Transducer output at the rated full-scale speed.
const V_FULL: f32 = 2.0;
/// Above this the transducer is out of its linear region or miswired.
const V_LIMIT: f32 = 2.5;

const DEFAULT_RATE_HZ: f32 = 20.0;

pub struct Anemometer {
    full_scale_m_per_s: f32,
    _adc_gpio: i32,
}

impl Anemometer {
    pub fn new(adc_gpio: i32, full_scale_m_per_s: f32) -> Self {
        Self {
            full_scale_m_per_s,
            _adc_gpio: adc_gpio,
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(crate::pins::ADC1_CH_WIND)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_WIND_ADC.load(Ordering::Relaxed)
    }

    fn volts_to_speed(&self, volts: f32) -> Result<f32, ReadError> {
        if volts > V_LIMIT {
            return Err(ReadError::OutOfRange);
        }
        // Below the standstill offset is just a becalmed cup set.
        let normalised = ((volts - V_ZERO) / (V_FULL - V_ZERO)).max(0.0);
        Ok(normalised * self.full_scale_m_per_s)
    }
}

impl Sensor for Anemometer {
    fn read(&mut self) -> Result<Measurement, ReadError> {
        let raw = self.read_adc();
        let volts = (raw as f32 / ADC_MAX) * V_REF;
        let speed = self.volts_to_speed(volts)?;
        Ok(Measurement::of("wind_m_per_s", f64::from(speed)))
    }

    fn sampling_rate_hz(&self) -> Option<f32> {
        Some(DEFAULT_RATE_HZ)
    }

    fn reducer(&self) -> Option<Reducer> {
        Some(reducers::mean)
    }
}
