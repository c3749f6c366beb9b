//! Core data model: per-read [`Measurement`]s and per-cycle [`Packet`]s.
//!
//! Metric names are driver-supplied string literals; maps preserve insertion
//! order so packet keys come out deterministic given a fixed registration
//! order.

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::error::SensorFault;

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// Flat metric-name → value map produced by a single sensor read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Measurement {
    entries: Vec<(&'static str, f64)>,
}

impl Measurement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-metric convenience constructor.
    pub fn of(metric: &'static str, value: f64) -> Self {
        let mut m = Self::new();
        m.insert(metric, value);
        m
    }

    /// Insert a metric, replacing any previous value under the same name.
    pub fn insert(&mut self, metric: &'static str, value: f64) {
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| *name == metric) {
            entry.1 = value;
        } else {
            self.entries.push((metric, value));
        }
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| *name == metric)
            .map(|(_, value)| *value)
    }

    /// Metrics in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<const N: usize> From<[(&'static str, f64); N]> for Measurement {
    fn from(entries: [(&'static str, f64); N]) -> Self {
        let mut m = Self::new();
        for (metric, value) in entries {
            m.insert(metric, value);
        }
        m
    }
}

// ---------------------------------------------------------------------------
// Packet
// ---------------------------------------------------------------------------

/// One acquisition cycle's aggregated output.
///
/// Keys are `"{sensor_name}/{metric_name}"`, in registration-then-metric
/// order.  A packet is produced every cycle, even when every sensor failed
/// (empty measurements, populated errors).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Packet {
    pub measurements: Vec<(String, f64)>,
    pub errors: Vec<SensorFault>,
}

impl Packet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge every metric of `measurement` under `"{sensor}/{metric}"` keys.
    pub fn merge(&mut self, sensor: &str, measurement: &Measurement) {
        for (metric, value) in measurement.iter() {
            self.measurements.push((format!("{}/{}", sensor, metric), value));
        }
    }

    pub fn push_fault(&mut self, fault: SensorFault) {
        self.errors.push(fault);
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.measurements
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| *value)
    }
}

impl Serialize for Packet {
    // `{"measurements": {"rtd/celsius": 21.5, ...}, "errors": ["..."]}` —
    // measurements as a JSON object, faults as display strings.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct AsMap<'a>(&'a [(String, f64)]);

        impl Serialize for AsMap<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (key, value) in self.0 {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }

        let mut packet = serializer.serialize_struct("Packet", 2)?;
        packet.serialize_field("measurements", &AsMap(&self.measurements))?;
        packet.serialize_field("errors", &self.errors)?;
        packet.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FaultStage, ReadError};

    #[test]
    fn insert_replaces_existing_metric() {
        let mut m = Measurement::of("celsius", 20.0);
        m.insert("celsius", 21.5);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("celsius"), Some(21.5));
    }

    #[test]
    fn measurement_preserves_insertion_order() {
        let m = Measurement::from([("celsius", 21.5), ("resistance_ohms", 108.3)]);
        let names: Vec<_> = m.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["celsius", "resistance_ohms"]);
    }

    #[test]
    fn merge_prefixes_sensor_name() {
        let mut packet = Packet::new();
        packet.merge("rtd", &Measurement::from([("celsius", 21.5), ("resistance_ohms", 108.3)]));
        packet.merge("hum", &Measurement::of("rel_humidity", 40.2));

        let keys: Vec<_> = packet.measurements.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["rtd/celsius", "rtd/resistance_ohms", "hum/rel_humidity"]);
        assert_eq!(packet.value("hum/rel_humidity"), Some(40.2));
    }

    #[test]
    fn packet_serializes_measurements_as_object() {
        let mut packet = Packet::new();
        packet.merge("rtd", &Measurement::of("celsius", 21.5));
        packet.push_fault(SensorFault {
            sensor: "wind",
            stage: FaultStage::Read,
            error: ReadError::OutOfRange,
        });

        let json = serde_json::to_value(&packet).unwrap();
        assert_eq!(json["measurements"]["rtd/celsius"], 21.5);
        assert_eq!(
            json["errors"][0],
            "sensor `wind` read error: reading out of range"
        );
    }

    #[test]
    fn empty_packet_serializes_cleanly() {
        let json = serde_json::to_string(&Packet::new()).unwrap();
        assert_eq!(json, r#"{"measurements":{},"errors":[]}"#);
    }
}
