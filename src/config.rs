//! System configuration parameters
//!
//! All tunable parameters for the FieldPod acquisition firmware.  Loaded
//! with defaults at boot; a provisioning channel may override them in a
//! later hardware revision.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Timing ---
    /// Acquisition loop period (milliseconds) — one packet per period.
    pub read_interval_ms: u32,
    /// Fast-sampling rate for the anemometer (Hz).  Passed explicitly to
    /// the sampler, overriding the driver-declared rate.
    pub anemometer_sampling_rate_hz: f32,

    // --- RTD probe ---
    /// Reference resistor in the ratiometric front-end (ohms).
    pub rtd_ref_ohms: f32,
    /// Probe resistance at 0 °C (100.0 for PT100).
    pub rtd_r0_ohms: f32,

    // --- Hygrometer ---
    /// Reads to discard while the element polarises after power-on.
    pub hygrometer_warmup_reads: u32,

    // --- Anemometer ---
    /// Wind speed at full-scale sensor output (m/s).
    pub wind_full_scale_m_per_s: f32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Timing
            read_interval_ms: 1000,           // 1 Hz packets
            anemometer_sampling_rate_hz: 20.0, // gusts need > loop cadence

            // RTD
            rtd_ref_ohms: 430.0,
            rtd_r0_ohms: 100.0,

            // Hygrometer
            hygrometer_warmup_reads: 5,

            // Anemometer
            wind_full_scale_m_per_s: 32.4,
        }
    }
}
