//! FieldPod Firmware — Main Entry Point
//!
//! Periodic multi-sensor acquisition with per-sensor failure isolation.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  hw_init (ADC/GPIO)   LogPacketSink   StatusLed + Watchdog     │
//! │                       (PacketSink)    (HeartbeatPort)          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │        AcquisitionLoop (registry-driven cycles)        │    │
//! │  │  plain sensors · FastSampler drains · Packet assembly  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  FastSampler threads (core-pinned, shared RunFlag)             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Module declarations ───────────────────────────────────────
pub mod config;
mod error;
mod pins;

pub mod acquisition;
mod adapters;
mod drivers;
pub mod measurement;
pub mod ports;
pub mod reducers;
pub mod sampling;
mod sensors;

// ── Imports ───────────────────────────────────────────────────
use std::time::Duration;

use anyhow::Result;
use log::{error, info};

use acquisition::{AcquisitionLoop, SensorRegistry};
use adapters::log_sink::LogPacketSink;
use config::SystemConfig;
use drivers::status_led::StatusLed;
use drivers::watchdog::Watchdog;
use ports::HeartbeatPort;
use sampling::{FastSampler, RunFlag, SamplingParams};
use sensors::anemometer::Anemometer;
use sensors::hygrometer::Hygrometer;
use sensors::rtd::RtdSensor;

// ── Heartbeat ─────────────────────────────────────────────────
//
// One toggle per completed cycle drives both liveness indicators:
// the board LED for the human and the TWDT for the silicon.

struct CycleHeartbeat {
    led: StatusLed,
    watchdog: Watchdog,
}

impl HeartbeatPort for CycleHeartbeat {
    fn toggle(&mut self) {
        self.led.toggle();
        self.watchdog.feed();
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("FieldPod v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Peripherals ────────────────────────────────────────
    drivers::hw_init::init_peripherals()?;
    let watchdog = Watchdog::new();

    let config = SystemConfig::default();
    info!(
        "Config: T={}ms, anemometer fast rate {} Hz",
        config.read_interval_ms, config.anemometer_sampling_rate_hz
    );

    // ── 3. Fast-sampling subsystem ────────────────────────────
    let run = RunFlag::new();

    // Rate comes from config (explicit override); the reducer is the
    // driver-declared mean.
    let wind = FastSampler::spawn(
        "wind",
        Box::new(Anemometer::new(
            pins::WIND_ADC_GPIO,
            config.wind_full_scale_m_per_s,
        )),
        SamplingParams {
            rate_hz: Some(config.anemometer_sampling_rate_hz),
            reducer: None,
        },
        &run,
    )
    .inspect_err(|_| run.stop())?;
    info!("Fast sampler `{}` running at {} Hz", wind.name(), wind.rate_hz());

    // ── 4. Sensor registry ────────────────────────────────────
    let mut registry = SensorRegistry::new();
    registry.register(
        "rtd",
        Box::new(RtdSensor::new(
            pins::RTD_ADC_GPIO,
            config.rtd_ref_ohms,
            config.rtd_r0_ohms,
        )),
    );
    registry.register_fast("wind", wind);
    registry.register(
        "humidity",
        Box::new(Hygrometer::new(
            pins::HUMIDITY_ADC_GPIO,
            config.hygrometer_warmup_reads,
        )),
    );

    // ── 5. Acquisition loop ───────────────────────────────────
    let mut acquisition = AcquisitionLoop::new(
        registry,
        Duration::from_millis(u64::from(config.read_interval_ms)),
    );

    if let Err(e) = acquisition.setup_all() {
        // Startup failures are not contained: stop the sampler threads and
        // let the supervisor decide (on ESP-IDF, a panic-free return reboots
        // into the bootloader's hands).
        error!("Sensor setup failed: {}", e);
        run.stop();
        return Err(e.into());
    }

    let mut sink = LogPacketSink::new();
    let mut heartbeat = CycleHeartbeat {
        led: StatusLed::new(),
        watchdog,
    };

    info!("System ready. Entering acquisition loop.");
    acquisition.run(&run, &mut sink, &mut heartbeat);

    // Only reachable once the run flag is stopped.
    run.stop();
    info!("Acquisition stopped.");
    Ok(())
}
