//! Reconnect delay for the page's frame socket.
//!
//! Opening a websocket succeeds before the handshake does, so an attempt only
//! counts as a session once a frame actually moved in either direction. Only
//! such a session resets the delay; refused or dropped handshakes keep
//! doubling it up to the cap.

#[cfg(test)]
#[path = "reconnect_test.rs"]
mod reconnect_test;

use crate::consts::{RECONNECT_BACKOFF_MAX_MS, RECONNECT_BACKOFF_START_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    delay_ms: u32,
}

impl Default for Backoff {
    fn default() -> Self {
        Self { delay_ms: RECONNECT_BACKOFF_START_MS }
    }
}

impl Backoff {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay to sleep after an attempt ends, then advance the schedule.
    ///
    /// `established` is whether the attempt carried any traffic.
    pub fn after_attempt(&mut self, established: bool) -> u32 {
        if established {
            self.delay_ms = RECONNECT_BACKOFF_START_MS;
        }
        let delay = self.delay_ms;
        self.delay_ms = self.delay_ms.saturating_mul(2).min(RECONNECT_BACKOFF_MAX_MS);
        delay
    }
}
