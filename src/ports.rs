//! Port traits — the boundary between the acquisition core and the outside
//! world.
//!
//! ```text
//!   AcquisitionLoop ──▶ Port trait ──▶ Adapter
//! ```
//!
//! The loop produces packets and a liveness signal; adapters decide where
//! they go (serial log today, radio uplink in a later revision).  The core
//! never touches an output peripheral directly.

use crate::measurement::Packet;

/// Per-cycle packet consumer.  Exactly one call per completed cycle, even
/// when every sensor failed.
pub trait PacketSink {
    fn emit(&mut self, packet: &Packet);
}

/// Observable liveness signal, toggled once per completed cycle.
pub trait HeartbeatPort {
    fn toggle(&mut self);
}
