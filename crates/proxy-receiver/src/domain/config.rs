//! Receiver configuration.
//!
//! Every field has a serde default, so a configuration file only needs the
//! keys it wants to change:
//!
//! ```toml
//! broker_url = "https://broker.example.net"
//! enable_overlay = false
//! reset_on_reconnect = true
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for one receiver process.
///
/// | Field                | Default                 |
/// |----------------------|-------------------------|
/// | `broker_url`         | `http://localhost:8080` |
/// | `pair_code`          | none (ask the broker)   |
/// | `enabled`            | `true`                  |
/// | `debug`              | `false`                 |
/// | `enable_overlay`     | `true`                  |
/// | `pair_timeout_secs`  | `10`                    |
/// | `reset_on_reconnect` | `false`                 |
/// | `report_interval_ms` | `1000`                  |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Broker base URL; `host[:port]` alone means `http://`.
    #[serde(default = "default_broker_url")]
    pub broker_url: String,
    /// Fixed pairing code.  When absent a fresh one is requested.
    #[serde(default)]
    pub pair_code: Option<String>,
    /// When `false` no session is ever started.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Lowers the default log level to `debug`.
    #[serde(default)]
    pub debug: bool,
    /// Whether the pairing overlay is drawn at all.
    #[serde(default = "default_true")]
    pub enable_overlay: bool,
    /// Upper bound on the pairing-code request.
    #[serde(default = "default_pair_timeout_secs")]
    pub pair_timeout_secs: u64,
    /// Forget all remote state whenever the controller disconnects.
    #[serde(default)]
    pub reset_on_reconnect: bool,
    /// How often the current remote state is logged; `0` disables it.
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
}

impl ReceiverConfig {
    pub fn pair_timeout(&self) -> Duration {
        Duration::from_secs(self.pair_timeout_secs)
    }

    /// `None` when periodic reports are disabled.
    pub fn report_interval(&self) -> Option<Duration> {
        (self.report_interval_ms > 0).then(|| Duration::from_millis(self.report_interval_ms))
    }
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            broker_url: default_broker_url(),
            pair_code: None,
            enabled: true,
            debug: false,
            enable_overlay: true,
            pair_timeout_secs: default_pair_timeout_secs(),
            reset_on_reconnect: false,
            report_interval_ms: default_report_interval_ms(),
        }
    }
}

fn default_broker_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_true() -> bool {
    true
}

fn default_pair_timeout_secs() -> u64 {
    10
}

fn default_report_interval_ms() -> u64 {
    1000
}
