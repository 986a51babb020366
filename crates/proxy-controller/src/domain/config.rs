//! Controller configuration.

use std::time::Duration;

use proxy_core::PairingCode;

/// Settings for one controller process.
///
/// | Field                  | Default                 |
/// |------------------------|-------------------------|
/// | `broker_url`           | `http://localhost:8080` |
/// | `frame_interval`       | 16 ms (about 60 Hz)     |
/// | `ping_interval`        | 5 s                     |
/// | `gamepad_change_gated` | `false`                 |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub broker_url: String,
    /// Code shown by the receiver.
    pub pair_code: PairingCode,
    /// Gamepad sampling period.
    pub frame_interval: Duration,
    /// Heartbeat period.
    pub ping_interval: Duration,
    /// Skip a gamepad publish when nothing changed since the last one.
    pub gamepad_change_gated: bool,
}

impl ControllerConfig {
    pub const DEFAULT_BROKER_URL: &'static str = "http://localhost:8080";
    pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);
    pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(5);

    /// Default settings for `pair_code`.
    pub fn new(pair_code: PairingCode) -> Self {
        Self {
            broker_url: Self::DEFAULT_BROKER_URL.to_string(),
            pair_code,
            frame_interval: Self::DEFAULT_FRAME_INTERVAL,
            ping_interval: Self::DEFAULT_PING_INTERVAL,
            gamepad_change_gated: false,
        }
    }
}
