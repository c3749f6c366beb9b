//! Stock reducers for fast-sampled sensors.
//!
//! A reducer collapses the samples accumulated between two drains into one
//! [`Measurement`].  The empty-input contract is: zero samples in, empty
//! measurement out, never a panic — a drain that races ahead of the first
//! background tick simply contributes nothing to that cycle's packet.

use crate::measurement::Measurement;

/// Collapses a drained sample window into a single measurement.
pub type Reducer = fn(&[Measurement]) -> Measurement;

/// Per-metric arithmetic mean over the window.
///
/// Metrics are averaged independently: a metric present in only some samples
/// is averaged over the samples that carry it.
pub fn mean(samples: &[Measurement]) -> Measurement {
    let mut sums: Vec<(&'static str, f64, u32)> = Vec::new();
    for sample in samples {
        for (metric, value) in sample.iter() {
            if let Some(entry) = sums.iter_mut().find(|(name, _, _)| *name == metric) {
                entry.1 += value;
                entry.2 += 1;
            } else {
                sums.push((metric, value, 1));
            }
        }
    }

    let mut reduced = Measurement::new();
    for (metric, sum, count) in sums {
        reduced.insert(metric, sum / f64::from(count));
    }
    reduced
}

/// The most recent sample wins; empty window yields an empty measurement.
pub fn latest(samples: &[Measurement]) -> Measurement {
    samples.last().cloned().unwrap_or_default()
}

/// Per-metric maximum over the window (gust-style reduction).
pub fn peak(samples: &[Measurement]) -> Measurement {
    let mut reduced = Measurement::new();
    for sample in samples {
        for (metric, value) in sample.iter() {
            match reduced.get(metric) {
                Some(current) if current >= value => {}
                _ => reduced.insert(metric, value),
            }
        }
    }
    reduced
}
