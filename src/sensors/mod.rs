//! Sensor subsystem — the capability contract and the individual drivers.
//!
//! Every sensor implements [`Sensor`]; the acquisition loop and the
//! fast-sampling engine only ever talk to the trait.  Optional capabilities
//! (`setup`, `reset`) are default methods, so "does this sensor support X"
//! is answered by overriding — no runtime type probing anywhere.

pub mod anemometer;
pub mod hygrometer;
pub mod rtd;

use crate::error::{ReadError, SetupError};
use crate::measurement::Measurement;
use crate::reducers::Reducer;

/// Capability contract every sensor driver must satisfy.
///
/// `read` is required.  `setup` runs at most once, before the acquisition
/// loop's first cycle; its failure is startup-fatal.  `reset` is a
/// fire-and-forget recovery attempt, invoked by the loop right after a
/// failed read.  `sampling_rate_hz`/`reducer` are only consulted when the
/// sensor is wrapped in a [`FastSampler`](crate::sampling::FastSampler)
/// without explicit parameters.
pub trait Sensor: Send {
    /// Perform one acquisition and return its metrics.
    fn read(&mut self) -> Result<Measurement, ReadError>;

    /// Idempotent one-time initialisation.  Default: nothing to do.
    fn setup(&mut self) -> Result<(), SetupError> {
        Ok(())
    }

    /// Best-effort internal-state recovery after a failed read.
    /// Default: nothing to do.
    fn reset(&mut self) {}

    /// Intrinsic sampling rate for fast-sampled operation, if the sensor
    /// needs one faster than the main loop cadence.
    fn sampling_rate_hz(&self) -> Option<f32> {
        None
    }

    /// Reducer collapsing a fast-sampled window, if the sensor declares one.
    fn reducer(&self) -> Option<Reducer> {
        None
    }
}
