//! Fast-sampling engine.
//!
//! Some sensors need a sampling rate well above the acquisition loop's
//! cadence.  A [`FastSampler`] wraps such a sensor and owns one background
//! thread that reads it on its own schedule, buffering results; the
//! acquisition loop calls [`FastSampler::drain`] once per cycle to take the
//! accumulated window atomically and reduce it to a single measurement.
//!
//! ```text
//! sampler thread (rate_hz)              acquisition loop (1/T)
//!    read → push sample ──▶ SampleBuffer ──▶ drain: take-all + reduce
//!           push fault (dedup)   (mutex)
//! ```
//!
//! One writer (the thread) and one reader (the loop) per buffer; the drain
//! is a `mem::take` under the buffer mutex, so no sample is lost or seen
//! twice across the swap.  All sampler threads share a single [`RunFlag`]
//! created in `main` — fast sampling is an all-or-nothing, process-lifetime
//! feature, not a per-instance cancellable task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::drivers::task_pin::{self, Core};
use crate::error::{FaultStage, SamplingConfigError, SensorFault};
use crate::measurement::Measurement;
use crate::reducers::Reducer;
use crate::sensors::Sensor;

/// FreeRTOS priority for sampler threads (below the main task).
const SAMPLER_PRIORITY: u8 = 4;
/// Stack for sampler threads; drivers only do ADC reads and math.
const SAMPLER_STACK_KB: usize = 8;

/// Distinct faults retained per drain window.  Dedup makes the realistic
/// cardinality tiny; overflow beyond this drops silently.
const MAX_DISTINCT_FAULTS: usize = 16;

// ---------------------------------------------------------------------------
// Run flag
// ---------------------------------------------------------------------------

/// Process-wide run/stop token.
///
/// Created once in `main`, cloned into every sampler thread and into the
/// acquisition loop.  `stop()` is the only cancellation primitive in the
/// system; threads observe it at their next wake, so shutdown latency is up
/// to one sampling period.
#[derive(Clone, Debug)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Signal every holder of this flag to wind down.  The transition is
    /// one-way; there is no restart.
    pub fn stop(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Sample buffer
// ---------------------------------------------------------------------------

#[derive(Default)]
struct SampleBuffer {
    samples: Vec<Measurement>,
    faults: heapless::Vec<SensorFault, MAX_DISTINCT_FAULTS>,
}

impl SampleBuffer {
    /// Insert a fault unless an identical one is already pending.  A sensor
    /// stuck on the same error every tick contributes one entry per drain
    /// window instead of rate_hz × T entries.
    fn push_fault(&mut self, fault: SensorFault) {
        if self.faults.contains(&fault) {
            return;
        }
        let _ = self.faults.push(fault);
    }
}

// ---------------------------------------------------------------------------
// Fast sampler
// ---------------------------------------------------------------------------

/// Explicit fast-sampling parameters.  Anything left `None` falls back to
/// the wrapped sensor's declaration; if neither side provides a value,
/// construction fails with [`SamplingConfigError`].
#[derive(Default, Clone, Copy)]
pub struct SamplingParams {
    pub rate_hz: Option<f32>,
    pub reducer: Option<Reducer>,
}

/// Background high-rate sampler + reducer wrapper around a sensor.
pub struct FastSampler {
    name: &'static str,
    sensor: Arc<Mutex<Box<dyn Sensor>>>,
    buffer: Arc<Mutex<SampleBuffer>>,
    reducer: Reducer,
    rate_hz: f32,
    handle: JoinHandle<()>,
}

impl FastSampler {
    /// Resolve parameters and start the sampling thread.
    ///
    /// `name` is the sensor's registry name; it tags every fault the thread
    /// records.  The thread runs until `run` is stopped.
    pub fn spawn(
        name: &'static str,
        sensor: Box<dyn Sensor>,
        params: SamplingParams,
        run: &RunFlag,
    ) -> Result<Self, SamplingConfigError> {
        let rate_hz = params
            .rate_hz
            .or_else(|| sensor.sampling_rate_hz())
            .ok_or(SamplingConfigError::MissingRate)?;
        if !rate_hz.is_finite() || rate_hz <= 0.0 {
            return Err(SamplingConfigError::InvalidRate);
        }
        let reducer = params
            .reducer
            .or_else(|| sensor.reducer())
            .ok_or(SamplingConfigError::MissingReducer)?;

        // Integer-millisecond tick, rounded up so we never exceed the rate.
        let tick = Duration::from_millis((1000.0 / rate_hz).ceil() as u64);

        let sensor = Arc::new(Mutex::new(sensor));
        let buffer = Arc::new(Mutex::new(SampleBuffer::default()));

        let handle = {
            let sensor = Arc::clone(&sensor);
            let buffer = Arc::clone(&buffer);
            let run = run.clone();
            task_pin::spawn_on_core(
                Core::App,
                SAMPLER_PRIORITY,
                SAMPLER_STACK_KB,
                "fast-sample\0",
                move || sample_loop(name, &sensor, &buffer, &run, tick),
            )
        };

        Ok(Self {
            name,
            sensor,
            buffer,
            reducer,
            rate_hz,
            handle,
        })
    }

    /// Atomically take the pending window and reduce it.
    ///
    /// Returns the reduced measurement plus the deduplicated faults recorded
    /// since the previous drain.  With zero pending samples the reducer sees
    /// an empty slice; the stock reducers return an empty measurement.
    pub fn drain(&self) -> (Measurement, Vec<SensorFault>) {
        let taken = std::mem::take(&mut *self.buffer.lock().unwrap());
        let reduced = (self.reducer)(&taken.samples);
        (reduced, taken.faults.as_slice().to_vec())
    }

    /// Forward a recovery attempt to the wrapped sensor.  Does not affect
    /// the sampling thread.
    pub fn reset(&self) {
        self.sensor.lock().unwrap().reset();
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Resolved sampling rate, for startup logging.
    pub fn rate_hz(&self) -> f32 {
        self.rate_hz
    }

    /// Wait for the sampling thread to exit.  Only meaningful after the
    /// shared run flag has been stopped; used by shutdown paths and tests.
    pub fn join(self) {
        let _ = self.handle.join();
    }
}

fn sample_loop(
    name: &'static str,
    sensor: &Mutex<Box<dyn Sensor>>,
    buffer: &Mutex<SampleBuffer>,
    run: &RunFlag,
    tick: Duration,
) {
    while run.is_running() {
        let result = sensor.lock().unwrap().read();
        match result {
            Ok(sample) => buffer.lock().unwrap().samples.push(sample),
            Err(error) => buffer.lock().unwrap().push_fault(SensorFault {
                sensor: name,
                stage: FaultStage::FastSampling,
                error,
            }),
        }
        std::thread::sleep(tick);
    }
    log::debug!("fast sampler `{}` stopped", name);
}
