//! Broker configuration.
//!
//! [`BrokerConfig`] is built once in `main.rs` from the command line and then
//! shared read-only with the server.

use std::net::SocketAddr;
use std::time::Duration;

/// All runtime settings for the broker.
///
/// # Example
///
/// ```rust
/// use proxy_broker::domain::BrokerConfig;
///
/// let cfg = BrokerConfig::default();
/// assert_eq!(cfg.bind_addr.port(), 8080);
/// ```
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Address the HTTP/WebSocket server listens on.
    pub bind_addr: SocketAddr,

    /// How long a slot with no attached peers survives before it is swept.
    pub code_ttl: Duration,

    /// How often expired slots are swept.
    pub sweep_interval: Duration,
}

impl Default for BrokerConfig {
    /// | Field          | Default        |
    /// |----------------|----------------|
    /// | bind_addr      | `0.0.0.0:8080` |
    /// | code_ttl       | 10 minutes     |
    /// | sweep_interval | 30 seconds     |
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            code_ttl: Duration::from_secs(600),
            sweep_interval: Duration::from_secs(30),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
