//! Proxy controls controller: entry point.
//!
//! Joins the receiver's pairing slot and streams this machine's keyboard and
//! gamepad input to it.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ Cli::into_controller_config()
//!  └─ ControllerSession::start(code)  -- join the broker relay as controller
//!  └─ event loop
//!       ├─ transport event  -> ControllerSession::handle   (arm / disarm)
//!       ├─ captured key     -> ControllerSession::on_key
//!       ├─ frame tick       -> ControllerSession::on_frame
//!       ├─ heartbeat tick   -> ControllerSession::on_heartbeat
//!       └─ Ctrl+C           -> ControllerSession::close
//! ```
//!
//! # Usage
//!
//! ```text
//! proxy-controller [OPTIONS] <PAIR_CODE>
//!
//! Options:
//!   --broker-url <URL>         Broker base URL [default: http://localhost:8080]
//!   --frame-ms <MS>            Gamepad sampling period [default: 16]
//!   --ping-interval <SECS>     Heartbeat period [default: 5]
//!   --gamepad-change-gated     Only send gamepad state when it changes
//!   --no-keyboard              Do not capture the terminal keyboard
//!   --debug                    Log at debug level unless RUST_LOG is set
//! ```

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use proxy_controller::application::{ControllerSession, GamepadSampler};
use proxy_controller::domain::ControllerConfig;
use proxy_controller::infrastructure::gamepad::default_provider;
use proxy_controller::infrastructure::input_capture::terminal::TerminalInputSource;
use proxy_controller::infrastructure::input_capture::{CaptureEvent, InputSource};
use proxy_controller::infrastructure::{LogOverlay, RawModeWriter};
use proxy_core::{LifecycleManager, PairingCode, PeerRole};
use proxy_transport::{BrokerEndpoint, WsTransport};

/// How often the shutdown flag is polled.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Proxy controls controller.
#[derive(Debug, Parser)]
#[command(
    name = "proxy-controller",
    about = "Streams keyboard and gamepad input to a proxy controls receiver",
    version
)]
struct Cli {
    /// Pairing code shown by the receiver.
    #[arg(env = "PROXY_PAIR_CODE")]
    pair_code: String,

    /// Broker base URL.
    #[arg(long, default_value = ControllerConfig::DEFAULT_BROKER_URL, env = "PROXY_BROKER_URL")]
    broker_url: String,

    /// Milliseconds between gamepad samples.
    #[arg(long, default_value_t = ControllerConfig::DEFAULT_FRAME_INTERVAL.as_millis() as u64)]
    frame_ms: u64,

    /// Seconds between heartbeat pings.
    #[arg(long, default_value_t = ControllerConfig::DEFAULT_PING_INTERVAL.as_secs())]
    ping_interval: u64,

    /// Only send gamepad state when it differs from the last send.
    #[arg(long)]
    gamepad_change_gated: bool,

    /// Do not capture the terminal keyboard.
    #[arg(long)]
    no_keyboard: bool,

    /// Log at debug level (ignored when RUST_LOG is set).
    #[arg(long, env = "PROXY_DEBUG")]
    debug: bool,
}

impl Cli {
    /// Converts the parsed CLI arguments into a [`ControllerConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the pairing code is invalid or either interval is
    /// zero.
    fn into_controller_config(self) -> anyhow::Result<ControllerConfig> {
        let pair_code = PairingCode::new(&self.pair_code)
            .with_context(|| format!("invalid pairing code: '{}'", self.pair_code))?;
        anyhow::ensure!(self.frame_ms > 0, "--frame-ms must be at least 1");
        anyhow::ensure!(self.ping_interval > 0, "--ping-interval must be at least 1");

        let mut config = ControllerConfig::new(pair_code);
        config.broker_url = self.broker_url;
        config.frame_interval = Duration::from_millis(self.frame_ms);
        config.ping_interval = Duration::from_secs(self.ping_interval);
        config.gamepad_change_gated = self.gamepad_change_gated;
        Ok(config)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ─────────────────────────────────────────────────────────
    // Logs go to stderr with line endings fixed up while key capture holds
    // the terminal in raw mode.
    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(RawModeWriter::stderr)
        .init();

    let capture_keyboard = !cli.no_keyboard;
    let config = cli.into_controller_config()?;
    let endpoint = BrokerEndpoint::parse(&config.broker_url)
        .with_context(|| format!("invalid broker URL: '{}'", config.broker_url))?;
    info!(
        "proxy controller starting: broker={endpoint}, code={}",
        config.pair_code
    );

    // ── Session wiring ────────────────────────────────────────────────────────
    let (transport, mut events) = WsTransport::new(endpoint, PeerRole::Controller);
    let manager = LifecycleManager::new(transport, LogOverlay);
    let sampler =
        GamepadSampler::new(default_provider()).with_change_gate(config.gamepad_change_gated);
    let mut session = ControllerSession::new(manager, sampler);

    let mut source = TerminalInputSource::new();
    let mut keys = if capture_keyboard {
        match source.start() {
            Ok(rx) => Some(rx),
            Err(e) => {
                warn!("keyboard capture unavailable: {e}");
                None
            }
        }
    } else {
        None
    };

    if let Err(e) = session.start(config.pair_code.clone()) {
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
    let mut frames = tokio::time::interval(config.frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut pings = tokio::time::interval(config.ping_interval);
    pings.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut shutdown_poll = tokio::time::interval(SHUTDOWN_POLL);

    while running.load(Ordering::Relaxed) {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    session.handle(event);
                }
                None => break,
            },
            captured = next_key(&mut keys) => match captured {
                Some(CaptureEvent::Key(input)) => {
                    session.on_key(input);
                }
                Some(CaptureEvent::Interrupt) => {
                    info!("interrupt key pressed, shutting down");
                    break;
                }
                None => keys = None,
            },
            _ = frames.tick() => {
                session.on_frame();
            }
            _ = pings.tick() => {
                session.on_heartbeat(Instant::now());
            }
            _ = shutdown_poll.tick() => {}
        }
    }

    source.stop();
    session.close();
    info!("proxy controller stopped");
    Ok(())
}

/// Next captured key, or never when capture is off.
async fn next_key(keys: &mut Option<UnboundedReceiver<CaptureEvent>>) -> Option<CaptureEvent> {
    match keys {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
