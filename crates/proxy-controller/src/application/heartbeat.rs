//! Heartbeat pings.
//!
//! A ping carries `{"sent_at_ms": N}`, milliseconds since the heartbeat was
//! created on a monotonic clock.  The receiver echoes the envelope verbatim,
//! so the round trip is simply `now - sent_at_ms` on the same clock.

use std::time::{Duration, Instant};

use proxy_core::Envelope;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy)]
pub struct Heartbeat {
    epoch: Instant,
}

impl Heartbeat {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(epoch: Instant) -> Self {
        Self { epoch }
    }

    /// A ping stamped with `now`.
    pub fn ping(&self, now: Instant) -> Envelope {
        Envelope::ping(json!({ "sent_at_ms": self.millis(now) }))
    }

    /// Round trip of an echoed ping.
    ///
    /// `None` when the state has no usable stamp, or the stamp lies in the
    /// future (an echo of a ping from another controller).
    pub fn round_trip(&self, echoed_state: &Value, now: Instant) -> Option<Duration> {
        let sent = echoed_state.get("sent_at_ms")?.as_u64()?;
        self.millis(now).checked_sub(sent).map(Duration::from_millis)
    }

    fn millis(&self, now: Instant) -> u64 {
        u64::try_from(now.saturating_duration_since(self.epoch).as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self::new()
    }
}
