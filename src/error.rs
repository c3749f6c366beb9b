//! Unified error types for the FieldPod firmware.
//!
//! A small set of typed enums that every subsystem funnels into, keeping the
//! acquisition loop's error handling uniform.  Read-path variants are `Copy`
//! and `Eq`/`Hash` so faults can be deduplicated by structural equality
//! instead of string comparison.

use core::fmt;

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Read errors
// ---------------------------------------------------------------------------

/// A single sensor read attempt failed.  Recoverable; isolated to one sensor
/// for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadError {
    /// Bus / peripheral transaction failed (rc from the underlying HAL call).
    Bus(i32),
    /// The device reported an internal fault code.
    DeviceFault(u8),
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// Sensor requires warm-up time before readings are valid.
    NotReady,
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(rc) => write!(f, "bus transaction failed (rc={})", rc),
            Self::DeviceFault(code) => write!(f, "device fault 0x{:02x}", code),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::NotReady => write!(f, "sensor warming up"),
        }
    }
}

impl core::error::Error for ReadError {}

// ---------------------------------------------------------------------------
// Setup errors
// ---------------------------------------------------------------------------

/// A sensor could not be initialised.  Surfaced at startup, not retried;
/// propagates to the process entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupError {
    /// Bus / peripheral transaction failed during initialisation.
    Bus(i32),
    /// The power-on self test returned an implausible conversion.
    SelfTestFailed,
    /// The device did not become ready within its datasheet window.
    Timeout,
}

impl fmt::Display for SetupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(rc) => write!(f, "bus transaction failed (rc={})", rc),
            Self::SelfTestFailed => write!(f, "self test failed"),
            Self::Timeout => write!(f, "device not ready in time"),
        }
    }
}

impl core::error::Error for SetupError {}

/// A sensor's `setup` failed, tagged with its registry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupError {
    pub sensor: &'static str,
    pub error: SetupError,
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sensor `{}` setup error: {}", self.sensor, self.error)
    }
}

impl core::error::Error for StartupError {}

// ---------------------------------------------------------------------------
// Fast-sampling configuration errors
// ---------------------------------------------------------------------------

/// Fast-sampling parameters could not be resolved at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingConfigError {
    /// No explicit rate was given and the sensor declares none.
    MissingRate,
    /// No explicit reducer was given and the sensor declares none.
    MissingReducer,
    /// The resolved rate is not a finite positive number.
    InvalidRate,
}

impl fmt::Display for SamplingConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRate => write!(f, "no sampling rate given or declared by the sensor"),
            Self::MissingReducer => write!(f, "no reducer given or declared by the sensor"),
            Self::InvalidRate => write!(f, "sampling rate must be a finite positive number"),
        }
    }
}

impl core::error::Error for SamplingConfigError {}

// ---------------------------------------------------------------------------
// Packet fault entries
// ---------------------------------------------------------------------------

/// Which acquisition path produced a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultStage {
    /// The acquisition loop's synchronous read.
    Read,
    /// A fast-sampling background thread's read.
    FastSampling,
}

/// One fault entry in a cycle [`Packet`](crate::measurement::Packet).
///
/// Carries the registry name of the failing sensor plus the typed cause.
/// Equality is structural, so identical repeating faults collapse to one
/// entry in the fast-sampling buffer regardless of formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorFault {
    pub sensor: &'static str,
    pub stage: FaultStage,
    pub error: ReadError,
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage {
            FaultStage::Read => write!(f, "sensor `{}` read error: {}", self.sensor, self.error),
            FaultStage::FastSampling => {
                write!(f, "sensor `{}` fast-sampling error: {}", self.sensor, self.error)
            }
        }
    }
}

impl Serialize for SensorFault {
    // Packets serialize faults as their display strings.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
