//! Fast-sampling engine integration tests: reduction windows, fault
//! deduplication, parameter resolution, and the shared stop flag.
//!
//! Timing discipline: tests wait on observable read counters instead of
//! fixed sleeps, so a loaded CI box cannot flake them.

mod common;

use std::time::{Duration, Instant};

use common::MockSensor;
use fieldpod::error::{ReadError, SamplingConfigError};
use fieldpod::measurement::Measurement;
use fieldpod::reducers;
use fieldpod::sampling::{FastSampler, RunFlag, SamplingParams};
use fieldpod::sensors::Sensor;

/// Block until `cond` holds, panicking after a generous timeout.
fn wait_until(what: &str, cond: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn explicit(rate_hz: f32, reducer: reducers::Reducer) -> SamplingParams {
    SamplingParams {
        rate_hz: Some(rate_hz),
        reducer: Some(reducer),
    }
}

// ── Reduction windows ─────────────────────────────────────────

#[test]
fn drain_reduces_exactly_the_buffered_samples() {
    // Three scripted ticks, then a repeating (dedup-able) error.
    let sensor = MockSensor::scripted(
        [
            Ok(Measurement::of("x", 1.0)),
            Ok(Measurement::of("x", 2.0)),
            Ok(Measurement::of("x", 3.0)),
        ],
        Err(ReadError::NotReady),
    );
    let probe = sensor.probe();

    let run = RunFlag::new();
    let sampler =
        FastSampler::spawn("probe", Box::new(sensor), explicit(200.0, reducers::mean), &run)
            .unwrap();

    // Past the script and at least one tick into the repeating error.
    wait_until("4 sampler reads", || probe.reads() >= 4);
    let (reduced, faults) = sampler.drain();
    run.stop();
    sampler.join();

    assert_eq!(reduced.get("x"), Some(2.0), "mean over exactly the 3 samples");
    // The post-script error repeats every tick but dedups to one entry.
    assert_eq!(faults.len(), 1);
    assert_eq!(faults[0].error, ReadError::NotReady);
}

#[test]
fn drain_with_no_pending_samples_is_an_empty_reduction() {
    let sensor = MockSensor::ok("x", 4.2);
    let probe = sensor.probe();

    let run = RunFlag::new();
    let sampler =
        FastSampler::spawn("probe", Box::new(sensor), explicit(500.0, reducers::mean), &run)
            .unwrap();

    wait_until("first sample", || probe.reads() >= 1);
    run.stop();
    // The thread observes the flag at its next wake; wait for the read
    // counter to go quiet so nothing arrives between the two drains below.
    wait_until("sampler thread parked", || {
        let before = probe.reads();
        std::thread::sleep(Duration::from_millis(20));
        probe.reads() == before
    });

    let (first, _) = sampler.drain();
    assert!(!first.is_empty(), "thread produced samples before the stop");

    let (second, faults) = sampler.drain();
    assert!(second.is_empty());
    assert!(faults.is_empty());
    sampler.join();
}

// ── Fault deduplication ───────────────────────────────────────

#[test]
fn identical_faults_dedup_distinct_faults_do_not() {
    // One distinct error first, then an endlessly repeating one.
    let sensor = MockSensor::scripted([Err(ReadError::Bus(-2))], Err(ReadError::Bus(-1)));
    let probe = sensor.probe();

    let run = RunFlag::new();
    let sampler =
        FastSampler::spawn("wind", Box::new(sensor), explicit(500.0, reducers::mean), &run)
            .unwrap();

    // The repeating error must have fired at least twice to prove dedup.
    wait_until("4 sampler reads", || probe.reads() >= 4);
    let (reduced, faults) = sampler.drain();
    run.stop();
    sampler.join();

    assert!(reduced.is_empty(), "no successful reads in the window");
    let errors: Vec<_> = faults.iter().map(|f| f.error).collect();
    assert_eq!(errors, [ReadError::Bus(-2), ReadError::Bus(-1)]);
}

#[test]
fn sampler_keeps_running_through_persistent_failures() {
    let sensor = MockSensor::failing(ReadError::DeviceFault(0x04));
    let probe = sensor.probe();

    let run = RunFlag::new();
    let sampler =
        FastSampler::spawn("rtd", Box::new(sensor), explicit(500.0, reducers::mean), &run)
            .unwrap();

    wait_until("10 failed reads", || probe.reads() >= 10);
    let (_, faults) = sampler.drain();
    run.stop();
    sampler.join();

    assert_eq!(faults.len(), 1, "ten identical failures dedup to one fault");
    assert_eq!(faults[0].sensor, "rtd");
}

// ── Parameter resolution ──────────────────────────────────────

#[test]
fn explicit_rate_overrides_sensor_declared_rate() {
    let sensor = MockSensor::ok("x", 1.0)
        .with_rate(1.0)
        .with_reducer(reducers::mean);

    let run = RunFlag::new();
    let sampler = FastSampler::spawn(
        "probe",
        Box::new(sensor),
        SamplingParams {
            rate_hz: Some(100.0),
            reducer: None,
        },
        &run,
    )
    .unwrap();

    assert!((sampler.rate_hz() - 100.0).abs() < f32::EPSILON);
    run.stop();
    sampler.join();
}

#[test]
fn declared_parameters_fill_in_when_no_explicit_ones_are_given() {
    // Sensor declares both; latest-reduction makes the resolution visible.
    let sensor = MockSensor::scripted(
        [Ok(Measurement::of("x", 1.0)), Ok(Measurement::of("x", 9.0))],
        Err(ReadError::NotReady),
    )
    .with_rate(200.0)
    .with_reducer(reducers::latest);
    let probe = sensor.probe();

    let run = RunFlag::new();
    let sampler =
        FastSampler::spawn("probe", Box::new(sensor), SamplingParams::default(), &run).unwrap();
    assert!((sampler.rate_hz() - 200.0).abs() < f32::EPSILON);

    wait_until("both scripted samples", || probe.reads() >= 2);
    let (reduced, _) = sampler.drain();
    run.stop();
    sampler.join();

    assert_eq!(reduced.get("x"), Some(9.0), "declared latest-reducer applies");
}

#[test]
fn unresolvable_parameters_fail_construction() {
    struct OnlyRead;
    impl Sensor for OnlyRead {
        fn read(&mut self) -> Result<Measurement, ReadError> {
            Ok(Measurement::new())
        }
    }

    let run = RunFlag::new();

    let err = FastSampler::spawn("a", Box::new(OnlyRead), SamplingParams::default(), &run)
        .err()
        .unwrap();
    assert_eq!(err, SamplingConfigError::MissingRate);

    let err = FastSampler::spawn(
        "b",
        Box::new(OnlyRead),
        SamplingParams {
            rate_hz: Some(50.0),
            reducer: None,
        },
        &run,
    )
    .err()
    .unwrap();
    assert_eq!(err, SamplingConfigError::MissingReducer);

    let err = FastSampler::spawn("c", Box::new(OnlyRead), explicit(0.0, reducers::mean), &run)
        .err()
        .unwrap();
    assert_eq!(err, SamplingConfigError::InvalidRate);
}

// ── Reset forwarding ──────────────────────────────────────────

#[test]
fn reset_forwards_to_the_wrapped_sensor() {
    let sensor = MockSensor::ok("x", 1.0);
    let probe = sensor.probe();

    let run = RunFlag::new();
    let sampler =
        FastSampler::spawn("probe", Box::new(sensor), explicit(100.0, reducers::mean), &run)
            .unwrap();

    sampler.reset();
    sampler.reset();
    assert_eq!(probe.resets(), 2);

    run.stop();
    sampler.join();
}

// ── Shared stop flag ──────────────────────────────────────────

#[test]
fn one_flag_stops_every_sampler() {
    let a = MockSensor::ok("x", 1.0);
    let b = MockSensor::ok("y", 2.0);
    let (probe_a, probe_b) = (a.probe(), b.probe());

    let run = RunFlag::new();
    let sampler_a =
        FastSampler::spawn("a", Box::new(a), explicit(500.0, reducers::mean), &run).unwrap();
    let sampler_b =
        FastSampler::spawn("b", Box::new(b), explicit(500.0, reducers::mean), &run).unwrap();

    wait_until("both samplers running", || {
        probe_a.reads() >= 5 && probe_b.reads() >= 5
    });
    run.stop();
    sampler_a.join();
    sampler_b.join();

    // Both threads are gone: the counters stay frozen.
    let (reads_a, reads_b) = (probe_a.reads(), probe_b.reads());
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(probe_a.reads(), reads_a);
    assert_eq!(probe_b.reads(), reads_b);
}
