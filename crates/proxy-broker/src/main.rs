//! Proxy controls broker: entry point.
//!
//! Issues pairing codes and relays envelopes between one receiver and one
//! controller per code when they cannot reach each other directly.
//!
//! # Usage
//!
//! ```text
//! proxy-broker [OPTIONS]
//!
//! Options:
//!   --bind <ADDR>            Address to listen on [default: 0.0.0.0]
//!   --port <PORT>            Port to listen on [default: 8080]
//!   --code-ttl <SECS>        Lifetime of an unused pairing code [default: 600]
//!   --sweep-interval <SECS>  How often expired codes are removed [default: 30]
//!   --debug                  Log at debug level unless RUST_LOG is set
//! ```
//!
//! Every option can also be set through the environment (`PROXY_BROKER_BIND`,
//! `PROXY_BROKER_PORT`, `PROXY_CODE_TTL`, `PROXY_SWEEP_INTERVAL`,
//! `PROXY_DEBUG`).  CLI args take precedence.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use proxy_broker::domain::BrokerConfig;
use proxy_broker::infrastructure::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Proxy controls pairing broker and WebSocket relay.
#[derive(Debug, Parser)]
#[command(
    name = "proxy-broker",
    about = "Pairing-code issuer and WebSocket relay for proxy controls",
    version
)]
struct Cli {
    /// IP address to bind to.
    #[arg(long, default_value = "0.0.0.0", env = "PROXY_BROKER_BIND")]
    bind: String,

    /// TCP port to listen on.
    #[arg(long, default_value_t = 8080, env = "PROXY_BROKER_PORT")]
    port: u16,

    /// Seconds an unused pairing code survives with no peers attached.
    #[arg(long, default_value_t = 600, env = "PROXY_CODE_TTL")]
    code_ttl: u64,

    /// Seconds between sweeps for expired codes.
    #[arg(long, default_value_t = 30, env = "PROXY_SWEEP_INTERVAL")]
    sweep_interval: u64,

    /// Log at debug level (ignored when RUST_LOG is set).
    #[arg(long, env = "PROXY_DEBUG")]
    debug: bool,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`BrokerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--bind` is not a valid IP address or either
    /// interval is zero.
    fn into_broker_config(self) -> anyhow::Result<BrokerConfig> {
        let bind_addr: SocketAddr = format!("{}:{}", self.bind, self.port)
            .parse()
            .with_context(|| format!("invalid bind address: '{}:{}'", self.bind, self.port))?;

        anyhow::ensure!(self.code_ttl > 0, "--code-ttl must be at least 1 second");
        anyhow::ensure!(
            self.sweep_interval > 0,
            "--sweep-interval must be at least 1 second"
        );

        Ok(BrokerConfig {
            bind_addr,
            code_ttl: Duration::from_secs(self.code_ttl),
            sweep_interval: Duration::from_secs(self.sweep_interval),
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // RUST_LOG wins; otherwise `--debug` selects debug, else info.
    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = cli.into_broker_config()?;
    info!(
        "proxy broker starting: bind={}, code_ttl={:?}",
        config.bind_addr, config.code_ttl
    );

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, running).await?;

    info!("proxy broker stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        // Arrange: parse with no arguments (all defaults apply)
        let cli = Cli::parse_from(["proxy-broker"]);

        // Assert
        assert_eq!(cli.bind, "0.0.0.0");
        assert_eq!(cli.port, 8080);
        assert_eq!(cli.code_ttl, 600);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "proxy-broker",
            "--bind",
            "127.0.0.1",
            "--port",
            "9000",
            "--code-ttl",
            "60",
            "--debug",
        ]);
        assert_eq!(cli.bind, "127.0.0.1");
        assert_eq!(cli.port, 9000);
        assert_eq!(cli.code_ttl, 60);
        assert!(cli.debug);
    }

    #[test]
    fn test_into_broker_config_defaults() {
        let config = Cli::parse_from(["proxy-broker"]).into_broker_config().unwrap();
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.code_ttl, Duration::from_secs(600));
        assert_eq!(config.sweep_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_into_broker_config_invalid_bind_returns_error() {
        // Arrange
        let cli = Cli {
            bind: "not.an.ip".to_string(),
            port: 8080,
            code_ttl: 600,
            sweep_interval: 30,
            debug: false,
        };

        // Act / Assert: must return an error, not panic
        assert!(cli.into_broker_config().is_err());
    }

    #[test]
    fn test_into_broker_config_zero_ttl_returns_error() {
        let cli = Cli::parse_from(["proxy-broker", "--code-ttl", "0"]);
        assert!(cli.into_broker_config().is_err());
    }
}
