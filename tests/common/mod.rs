//! Mock sensors for integration tests.
//!
//! Counters live behind `Arc` so tests can keep observing a sensor after it
//! has moved into a registry or a fast sampler.

// Each integration binary uses its own subset of these mocks.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use fieldpod::error::{ReadError, SetupError};
use fieldpod::measurement::{Measurement, Packet};
use fieldpod::ports::{HeartbeatPort, PacketSink};
use fieldpod::reducers::Reducer;
use fieldpod::sensors::Sensor;

// ── Probe ─────────────────────────────────────────────────────

/// Shared call counters for one mock sensor.
#[derive(Clone, Default)]
pub struct Probe {
    reads: Arc<AtomicUsize>,
    setups: Arc<AtomicUsize>,
    resets: Arc<AtomicUsize>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn setups(&self) -> usize {
        self.setups.load(Ordering::SeqCst)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
}

// ── MockSensor ────────────────────────────────────────────────

/// Scriptable sensor with full capability coverage (setup + reset +
/// declared fast-sampling parameters).
///
/// Reads pop the shared script front; an exhausted script serves the
/// fallback result.
pub struct MockSensor {
    pub script: Arc<Mutex<VecDeque<Result<Measurement, ReadError>>>>,
    pub fallback: Result<Measurement, ReadError>,
    pub probe: Probe,
    pub declared_rate: Option<f32>,
    pub declared_reducer: Option<Reducer>,
    pub setup_error: Option<SetupError>,
}

impl MockSensor {
    /// Always returns `Ok` of a single fixed metric.
    pub fn ok(metric: &'static str, value: f64) -> Self {
        Self::with_fallback(Ok(Measurement::of(metric, value)))
    }

    /// Always returns the given error.
    pub fn failing(error: ReadError) -> Self {
        Self::with_fallback(Err(error))
    }

    /// Serves the scripted results in order, then the fallback.
    pub fn scripted(
        script: impl IntoIterator<Item = Result<Measurement, ReadError>>,
        fallback: Result<Measurement, ReadError>,
    ) -> Self {
        let mut sensor = Self::with_fallback(fallback);
        sensor.script.lock().unwrap().extend(script);
        sensor
    }

    fn with_fallback(fallback: Result<Measurement, ReadError>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            fallback,
            probe: Probe::new(),
            declared_rate: None,
            declared_reducer: None,
            setup_error: None,
        }
    }

    pub fn with_rate(mut self, rate_hz: f32) -> Self {
        self.declared_rate = Some(rate_hz);
        self
    }

    pub fn with_reducer(mut self, reducer: Reducer) -> Self {
        self.declared_reducer = Some(reducer);
        self
    }

    pub fn with_setup_error(mut self, error: SetupError) -> Self {
        self.setup_error = Some(error);
        self
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }
}

impl Sensor for MockSensor {
    fn read(&mut self) -> Result<Measurement, ReadError> {
        self.probe.reads.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn setup(&mut self) -> Result<(), SetupError> {
        self.probe.setups.fetch_add(1, Ordering::SeqCst);
        match self.setup_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn reset(&mut self) {
        self.probe.resets.fetch_add(1, Ordering::SeqCst);
    }

    fn sampling_rate_hz(&self) -> Option<f32> {
        self.declared_rate
    }

    fn reducer(&self) -> Option<Reducer> {
        self.declared_reducer
    }
}

// ── BareSensor ────────────────────────────────────────────────

/// Minimal contract surface: `read` only, no overridden capabilities.
/// Exercises the default no-op `setup`/`reset` paths.
pub struct BareSensor {
    pub result: Result<Measurement, ReadError>,
}

impl BareSensor {
    pub fn ok(metric: &'static str, value: f64) -> Self {
        Self {
            result: Ok(Measurement::of(metric, value)),
        }
    }

    pub fn failing(error: ReadError) -> Self {
        Self { result: Err(error) }
    }
}

impl Sensor for BareSensor {
    fn read(&mut self) -> Result<Measurement, ReadError> {
        self.result.clone()
    }
}

// ── StopwatchSensor ───────────────────────────────────────────

/// Records the instant of every read and optionally stalls, for pacing
/// tests.
pub struct StopwatchSensor {
    pub times: Arc<Mutex<Vec<Instant>>>,
    pub delay: Duration,
}

impl StopwatchSensor {
    pub fn new(delay: Duration) -> (Self, Arc<Mutex<Vec<Instant>>>) {
        let times = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                times: Arc::clone(&times),
                delay,
            },
            times,
        )
    }
}

impl Sensor for StopwatchSensor {
    fn read(&mut self) -> Result<Measurement, ReadError> {
        self.times.lock().unwrap().push(Instant::now());
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(Measurement::of("tick", 1.0))
    }
}

// ── Loop-side mocks ───────────────────────────────────────────

/// Packet sink that stores every emitted packet.
#[derive(Clone, Default)]
pub struct CollectingSink {
    pub packets: Arc<Mutex<Vec<Packet>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.packets.lock().unwrap().len()
    }
}

impl PacketSink for CollectingSink {
    fn emit(&mut self, packet: &Packet) {
        self.packets.lock().unwrap().push(packet.clone());
    }
}

/// Heartbeat that counts toggles.
#[derive(Clone, Default)]
pub struct CountingHeartbeat {
    pub toggles: Arc<AtomicUsize>,
}

impl CountingHeartbeat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.toggles.load(Ordering::SeqCst)
    }
}

impl HeartbeatPort for CountingHeartbeat {
    fn toggle(&mut self) {
        self.toggles.fetch_add(1, Ordering::SeqCst);
    }
}
