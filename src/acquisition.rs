//! Acquisition loop — the firmware's heartbeat.
//!
//! A [`SensorRegistry`] holds named entries, each either a plain sensor
//! (read synchronously once per cycle) or a [`FastSampler`] (drained once
//! per cycle).  [`AcquisitionLoop::run`] drives one cycle per fixed period:
//!
//! 1. read/drain every entry in registration order;
//! 2. merge per-sensor metrics into one flat [`Packet`] plus an error list;
//! 3. hand the packet to the [`PacketSink`];
//! 4. toggle the heartbeat;
//! 5. sleep whatever remains of the period (zero when the body overran —
//!    no catch-up skipping, no drift correction).
//!
//! A failing sensor costs one error entry and a `reset()` attempt; it never
//! aborts the cycle or the loop.  The loop exits only when the shared
//! [`RunFlag`] is stopped.

use std::time::{Duration, Instant};

use log::warn;

use crate::error::{FaultStage, SensorFault, StartupError};
use crate::measurement::Packet;
use crate::ports::{HeartbeatPort, PacketSink};
use crate::sampling::{FastSampler, RunFlag};
use crate::sensors::Sensor;

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// A registered acquisition source.
///
/// The loop branches on the entry kind: plain sensors return
/// `Result<Measurement, ReadError>`, fast-sampled entries return an
/// already-reduced measurement plus the faults their thread collected.
pub enum SensorEntry {
    Plain(Box<dyn Sensor>),
    FastSampled(FastSampler),
}

/// Named, insertion-ordered sensor collection.
///
/// Names are unique (asserted at registration) and fixed for the process
/// lifetime; cycle output is deterministic given the registration order.
#[derive(Default)]
pub struct SensorRegistry {
    entries: Vec<(&'static str, SensorEntry)>,
}

impl SensorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plain sensor, read synchronously each cycle.
    pub fn register(&mut self, name: &'static str, sensor: Box<dyn Sensor>) {
        self.insert(name, SensorEntry::Plain(sensor));
    }

    /// Register an already-running fast sampler, drained each cycle.
    pub fn register_fast(&mut self, name: &'static str, sampler: FastSampler) {
        self.insert(name, SensorEntry::FastSampled(sampler));
    }

    fn insert(&mut self, name: &'static str, entry: SensorEntry) {
        assert!(
            self.entries.iter().all(|(existing, _)| *existing != name),
            "duplicate sensor name `{}`",
            name
        );
        self.entries.push((name, entry));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

pub struct AcquisitionLoop {
    registry: SensorRegistry,
    interval: Duration,
}

impl AcquisitionLoop {
    pub fn new(registry: SensorRegistry, interval: Duration) -> Self {
        Self { registry, interval }
    }

    /// One-time initialisation pass, before the first cycle.
    ///
    /// Plain entries get their `setup()` called exactly once; the first
    /// failure aborts with the offending sensor's name.  Fast-sampled
    /// entries are skipped here — their wrapped sensor was set up by
    /// whoever constructed the sampler, and is already being read.
    pub fn setup_all(&mut self) -> Result<(), StartupError> {
        for &mut (name, ref mut entry) in &mut self.registry.entries {
            if let SensorEntry::Plain(sensor) = entry {
                sensor
                    .setup()
                    .map_err(|error| StartupError { sensor: name, error })?;
            }
        }
        Ok(())
    }

    /// Execute exactly one acquisition cycle and return its packet.
    ///
    /// Never fails: per-sensor errors become packet entries, and a failed
    /// plain read triggers that sensor's `reset()` before moving on.
    pub fn run_cycle(&mut self) -> Packet {
        let mut packet = Packet::new();

        for &mut (name, ref mut entry) in &mut self.registry.entries {
            match entry {
                SensorEntry::Plain(sensor) => match sensor.read() {
                    Ok(measurement) => packet.merge(name, &measurement),
                    Err(error) => {
                        packet.push_fault(SensorFault {
                            sensor: name,
                            stage: FaultStage::Read,
                            error,
                        });
                        sensor.reset();
                    }
                },
                SensorEntry::FastSampled(sampler) => {
                    let (measurement, faults) = sampler.drain();
                    packet.merge(name, &measurement);
                    packet.errors.extend(faults);
                }
            }
        }

        packet
    }

    /// Run cycles at the configured period until `run` is stopped.
    ///
    /// Pacing is best-effort: the next cycle starts `max(0, T - elapsed)`
    /// after this one's body finished.  Cumulative drift is accepted.
    pub fn run(
        &mut self,
        run: &RunFlag,
        sink: &mut impl PacketSink,
        heartbeat: &mut impl HeartbeatPort,
    ) {
        while run.is_running() {
            let started = Instant::now();

            let packet = self.run_cycle();
            if !packet.errors.is_empty() {
                warn!("cycle completed with {} fault(s)", packet.errors.len());
            }
            sink.emit(&packet);
            heartbeat.toggle();

            let elapsed = started.elapsed();
            if let Some(remaining) = self.interval.checked_sub(elapsed) {
                std::thread::sleep(remaining);
            }
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReadError;
    use crate::measurement::Measurement;

    struct Fixed(f64);
    impl Sensor for Fixed {
        fn read(&mut self) -> Result<Measurement, ReadError> {
            Ok(Measurement::of("value", self.0))
        }
    }

    #[test]
    #[should_panic(expected = "duplicate sensor name")]
    fn duplicate_names_are_rejected() {
        let mut registry = SensorRegistry::new();
        registry.register("probe", Box::new(Fixed(1.0)));
        registry.register("probe", Box::new(Fixed(2.0)));
    }

    #[test]
    fn names_preserve_registration_order() {
        let mut registry = SensorRegistry::new();
        registry.register("b", Box::new(Fixed(1.0)));
        registry.register("a", Box::new(Fixed(2.0)));
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, ["b", "a"]);
    }
}
