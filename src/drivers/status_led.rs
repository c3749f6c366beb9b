//! Heartbeat LED driver.
//!
//! A single GPIO LED toggled once per completed acquisition cycle, so a
//! glance at the board answers "is the loop alive".
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the status GPIO via hw_init.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::pins;
use crate::ports::HeartbeatPort;

pub struct StatusLed {
    lit: bool,
}

impl StatusLed {
    pub fn new() -> Self {
        Self { lit: false }
    }

    pub fn set(&mut self, lit: bool) {
        hw_init::gpio_write(pins::STATUS_LED_GPIO, lit);
        self.lit = lit;
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl Default for StatusLed {
    fn default() -> Self {
        Self::new()
    }
}

impl HeartbeatPort for StatusLed {
    fn toggle(&mut self) {
        self.set(!self.lit);
    }
}
