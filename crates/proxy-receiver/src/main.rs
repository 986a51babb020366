//! Proxy controls receiver: entry point.
//!
//! Pairs with a remote controller through the broker and keeps the latest
//! keyboard and gamepad state it sends.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ Cli::into_receiver_config()   -- file defaults, then CLI/env overrides
//!  └─ ReceiverSession::start*()     -- fixed code, or GET /pair on the broker
//!  └─ event loop
//!       ├─ transport event          -> ReceiverSession::handle
//!       ├─ report tick              -> log current remote state
//!       └─ shutdown flag cleared    -> ReceiverSession::close
//! ```
//!
//! # Usage
//!
//! ```text
//! proxy-receiver [OPTIONS]
//!
//! Options:
//!   --config <FILE>              TOML file with receiver settings
//!   --broker-url <URL>           Broker base URL
//!   --pair-code <CODE>           Use this code instead of asking the broker
//!   --pair-timeout <SECS>        Upper bound on the pairing-code request
//!   --report-interval-ms <MS>    State report period, 0 to disable
//!   --reset-on-reconnect         Forget remote state when the controller leaves
//!   --no-overlay                 Do not draw the pairing overlay
//!   --disabled                   Exit without starting a session
//!   --debug                      Log at debug level unless RUST_LOG is set
//! ```
//!
//! `PROXY_CONFIG`, `PROXY_BROKER_URL`, `PROXY_PAIR_CODE` and `PROXY_DEBUG`
//! are read from the environment.  CLI args take precedence over the file.

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use proxy_core::{LifecycleManager, Overlay, PairingCode, PeerRole, Transport};
use proxy_receiver::application::ReceiverSession;
use proxy_receiver::domain::ReceiverConfig;
use proxy_receiver::infrastructure::{load_config, ReceiverOverlay};
use proxy_transport::{BrokerEndpoint, HttpPairingResolver, WsTransport};

/// How often the shutdown flag is polled.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Proxy controls receiver.
#[derive(Debug, Parser)]
#[command(
    name = "proxy-receiver",
    about = "Receives remote keyboard and gamepad state for proxy controls",
    version
)]
struct Cli {
    /// TOML file with receiver settings.
    #[arg(long, env = "PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Broker base URL, e.g. `https://broker.example.net`.
    #[arg(long, env = "PROXY_BROKER_URL")]
    broker_url: Option<String>,

    /// Fixed pairing code; when absent one is requested from the broker.
    #[arg(long, env = "PROXY_PAIR_CODE")]
    pair_code: Option<String>,

    /// Seconds to wait for the broker to issue a code.
    #[arg(long)]
    pair_timeout: Option<u64>,

    /// Milliseconds between state reports (0 disables them).
    #[arg(long)]
    report_interval_ms: Option<u64>,

    /// Forget remote state whenever the controller disconnects.
    #[arg(long)]
    reset_on_reconnect: bool,

    /// Do not draw the pairing overlay.
    #[arg(long)]
    no_overlay: bool,

    /// Exit without starting a session.
    #[arg(long)]
    disabled: bool,

    /// Log at debug level (ignored when RUST_LOG is set).
    #[arg(long, env = "PROXY_DEBUG")]
    debug: bool,
}

impl Cli {
    /// Builds the effective configuration: file (or defaults), then CLI.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded, the pairing code
    /// is not valid, or the pairing timeout is zero.
    fn into_receiver_config(self) -> anyhow::Result<ReceiverConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ReceiverConfig::default(),
        };

        if let Some(url) = self.broker_url {
            config.broker_url = url;
        }
        if let Some(code) = self.pair_code {
            config.pair_code = Some(code);
        }
        if let Some(secs) = self.pair_timeout {
            config.pair_timeout_secs = secs;
        }
        if let Some(ms) = self.report_interval_ms {
            config.report_interval_ms = ms;
        }
        config.reset_on_reconnect |= self.reset_on_reconnect;
        config.enable_overlay &= !self.no_overlay;
        config.enabled &= !self.disabled;
        config.debug |= self.debug;

        anyhow::ensure!(
            config.pair_timeout_secs > 0,
            "pair timeout must be at least 1 second"
        );
        if let Some(code) = &config.pair_code {
            PairingCode::new(code).with_context(|| format!("invalid pairing code: '{code}'"))?;
        }

        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_receiver_config()?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if !config.enabled {
        info!("remote controls disabled; nothing to do");
        return Ok(());
    }

    let endpoint = BrokerEndpoint::parse(&config.broker_url)
        .with_context(|| format!("invalid broker URL: '{}'", config.broker_url))?;
    info!("proxy receiver starting: broker={endpoint}");

    // ── Session wiring ────────────────────────────────────────────────────────
    let (transport, mut events) = WsTransport::new(endpoint.clone(), PeerRole::Receiver);
    let overlay = ReceiverOverlay::from_flag(config.enable_overlay);
    let manager =
        LifecycleManager::new(transport, overlay).with_connect_url(endpoint.connect_url());
    let mut session =
        ReceiverSession::new(manager).with_reset_on_reconnect(config.reset_on_reconnect);

    let started = match &config.pair_code {
        Some(code) => session.start(PairingCode::new(code)?),
        None => {
            let resolver = HttpPairingResolver::new(&endpoint);
            session
                .start_with(&resolver, config.pair_timeout())
                .await
                .map(|_| ())
        }
    };
    if let Err(e) = started {
        // The overlay now shows the failure; stay up so it remains visible.
        warn!("session did not start: {e}");
    }

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

    // ── Main event loop ───────────────────────────────────────────────────────
    let mut report = config.report_interval().map(|period| {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker
    });
    let mut shutdown_poll = tokio::time::interval(SHUTDOWN_POLL);

    while running.load(Ordering::Relaxed) {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    session.handle(event);
                }
                None => break,
            },
            _ = next_tick(&mut report) => log_remote_state(&session),
            _ = shutdown_poll.tick() => {}
        }
    }

    session.close();
    info!("proxy receiver stopped");
    Ok(())
}

/// Waits for the next report tick, or forever when reports are disabled.
async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn log_remote_state<T: Transport, O: Overlay>(session: &ReceiverSession<T, O>) {
    if !session.is_connected() {
        return;
    }
    let keys: Vec<&str> = session.store().event_types().collect();
    let keyboard = session.keyboard();
    let pressed: Vec<&str> = keyboard.iter().collect();
    let gamepads = (0..proxy_core::MAX_GAMEPADS)
        .filter(|&i| session.gamepad(i).is_some())
        .count();
    info!(types = ?keys, pressed = ?pressed, gamepads, "remote state");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        // Arrange: parse with no arguments (all defaults apply)
        let cli = Cli::parse_from(["proxy-receiver"]);

        // Assert
        assert!(cli.config.is_none());
        assert!(!cli.no_overlay);
        assert!(!cli.disabled);
    }

    #[test]
    fn test_into_receiver_config_without_file_uses_defaults() {
        let config = Cli::parse_from(["proxy-receiver"])
            .into_receiver_config()
            .unwrap();
        assert_eq!(config, ReceiverConfig::default());
    }

    #[test]
    fn test_cli_flags_override_defaults() {
        let config = Cli::parse_from([
            "proxy-receiver",
            "--broker-url",
            "broker.lan:9000",
            "--pair-code",
            "K7QP2M",
            "--pair-timeout",
            "3",
            "--no-overlay",
            "--reset-on-reconnect",
        ])
        .into_receiver_config()
        .unwrap();

        assert_eq!(config.broker_url, "broker.lan:9000");
        assert_eq!(config.pair_code.as_deref(), Some("K7QP2M"));
        assert_eq!(config.pair_timeout_secs, 3);
        assert!(!config.enable_overlay);
        assert!(config.reset_on_reconnect);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        // Arrange
        let path = std::env::temp_dir().join(format!(
            "proxy-receiver-main-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "broker_url = \"http://from-file:8080\"\nreport_interval_ms = 0\n",
        )
        .unwrap();

        // Act
        let config = Cli::parse_from([
            "proxy-receiver",
            "--config",
            path.to_str().unwrap(),
            "--broker-url",
            "http://from-cli:8080",
        ])
        .into_receiver_config()
        .unwrap();
        let _ = std::fs::remove_file(&path);

        // Assert
        assert_eq!(config.broker_url, "http://from-cli:8080");
        assert_eq!(config.report_interval(), None);
    }

    #[test]
    fn test_zero_pair_timeout_returns_error() {
        let cli = Cli::parse_from(["proxy-receiver", "--pair-timeout", "0"]);
        assert!(cli.into_receiver_config().is_err());
    }

    #[test]
    fn test_invalid_pair_code_returns_error() {
        // Arrange
        let cli = Cli {
            config: None,
            broker_url: None,
            pair_code: Some("not a code!".to_string()),
            pair_timeout: None,
            report_interval_ms: None,
            reset_on_reconnect: false,
            no_overlay: false,
            disabled: false,
            debug: false,
        };

        // Act / Assert: must return an error, not panic
        assert!(cli.into_receiver_config().is_err());
    }

    #[test]
    fn test_missing_config_file_returns_error() {
        let cli = Cli::parse_from([
            "proxy-receiver",
            "--config",
            "/nonexistent/proxy-receiver.toml",
        ]);
        assert!(cli.into_receiver_config().is_err());
    }
}
