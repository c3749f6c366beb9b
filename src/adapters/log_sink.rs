//! Log-based packet sink adapter.
//!
//! Implements [`PacketSink`] by writing each cycle's packet to the ESP-IDF
//! logger (UART / USB-CDC in production).  A future radio-uplink adapter
//! would implement the same trait.

use log::{info, warn};

use crate::adapters::time::MonotonicClock;
use crate::measurement::Packet;
use crate::ports::PacketSink;

/// Adapter that logs every cycle [`Packet`] to the serial console.
pub struct LogPacketSink {
    clock: MonotonicClock,
}

impl LogPacketSink {
    pub fn new() -> Self {
        Self {
            clock: MonotonicClock::new(),
        }
    }
}

impl Default for LogPacketSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketSink for LogPacketSink {
    fn emit(&mut self, packet: &Packet) {
        match serde_json::to_string(packet) {
            Ok(json) => info!(
                "PACKET | t={}ms | {} metric(s), {} error(s) | {}",
                self.clock.uptime_ms(),
                packet.measurements.len(),
                packet.errors.len(),
                json,
            ),
            Err(e) => warn!("PACKET | serialization failed: {}", e),
        }

        for fault in &packet.errors {
            warn!("FAULT  | {}", fault);
        }
    }
}
