//! HTTP and WebSocket server.
//!
//! Routes:
//!
//! | Route                                   | Response                              |
//! |-----------------------------------------|---------------------------------------|
//! | `GET /pair`                             | `{"pairCode": "<code>"}`              |
//! | `GET /relay/:code?role=receiver`        | WebSocket upgrade                     |
//! | `GET /relay/:code?role=controller`      | WebSocket upgrade                     |
//! | `GET /health`                           | `ok`                                  |
//!
//! On a relay socket the peer sends raw envelopes as text frames and receives
//! [`BrokerFrame`]s.  A join that cannot be honoured (unknown code, role
//! taken) still upgrades, then gets one `rejected` frame and a close.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use anyhow::Context;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use proxy_core::{BrokerFrame, PairResponse, PairingCode, PeerRole};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::application::Rendezvous;
use crate::domain::BrokerConfig;

/// How often the shutdown flag is polled.
const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

// ── State ─────────────────────────────────────────────────────────────────────

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    rendezvous: Arc<Mutex<Rendezvous>>,
    config: Arc<BrokerConfig>,
}

impl AppState {
    pub fn new(config: BrokerConfig) -> Self {
        Self::with_rendezvous(config, Rendezvous::new())
    }

    pub fn with_rendezvous(config: BrokerConfig, rendezvous: Rendezvous) -> Self {
        Self {
            rendezvous: Arc::new(Mutex::new(rendezvous)),
            config: Arc::new(config),
        }
    }

    /// Locks the slot table.  Critical sections never await.
    pub fn rendezvous(&self) -> MutexGuard<'_, Rendezvous> {
        self.rendezvous
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Builds the broker's routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/pair", get(issue_pair_code))
        .route("/relay/:code", get(relay_upgrade))
        .route("/health", get(health))
        .with_state(state)
}

/// Serves the broker until `running` is cleared.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run_server(config: BrokerConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind broker listener on {}", config.bind_addr))?;
    info!("broker listening on {}", config.bind_addr);

    let state = AppState::new(config);
    let sweeper = tokio::spawn(sweep_loop(state.clone(), Arc::clone(&running)));

    let result = axum::serve(listener, router(state))
        .with_graceful_shutdown(wait_for_shutdown(running))
        .await
        .context("broker server failed");

    sweeper.abort();
    result
}

async fn wait_for_shutdown(running: Arc<AtomicBool>) {
    while running.load(Ordering::Relaxed) {
        tokio::time::sleep(SHUTDOWN_POLL).await;
    }
    info!("shutdown flag set; stopping broker");
}

async fn sweep_loop(state: AppState, running: Arc<AtomicBool>) {
    let mut ticker = tokio::time::interval(state.config().sweep_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    while running.load(Ordering::Relaxed) {
        ticker.tick().await;
        let ttl = state.config().code_ttl;
        state.rendezvous().sweep(Instant::now(), ttl);
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

async fn health() -> &'static str {
    "ok"
}

async fn issue_pair_code(
    State(state): State<AppState>,
) -> Result<Json<PairResponse>, StatusCode> {
    let issued = state.rendezvous().issue_code(Instant::now());
    match issued {
        Ok(code) => Ok(Json(PairResponse {
            pair_code: code.to_string(),
        })),
        Err(e) => {
            warn!("could not issue pairing code: {e}");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

#[derive(Debug, Deserialize)]
struct RelayQuery {
    role: PeerRole,
}

async fn relay_upgrade(
    ws: WebSocketUpgrade,
    Path(code): Path<String>,
    Query(query): Query<RelayQuery>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| run_peer(socket, state, code, query.role))
}

// ── Peer session ──────────────────────────────────────────────────────────────

/// Runs one attached peer until its socket closes.
///
/// Frames for the peer arrive on an unbounded channel from the slot table
/// and are written by a dedicated task, so forwarding never awaits while the
/// table is locked.
async fn run_peer(socket: WebSocket, state: AppState, raw_code: String, role: PeerRole) {
    let (mut sink, mut stream) = socket.split();

    let code = match PairingCode::new(&raw_code) {
        Ok(code) => code,
        Err(e) => {
            reject(&mut sink, e.to_string()).await;
            return;
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<BrokerFrame>();
    let joined = state.rendezvous().join(&code, role, tx);
    let peer_id = match joined {
        Ok(id) => id,
        Err(e) => {
            info!(%code, %role, "join refused: {e}");
            reject(&mut sink, e.to_string()).await;
            return;
        }
    };
    info!(%code, %role, "peer joined relay");

    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if send_frame(&mut sink, &frame).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        match message {
            Ok(Message::Text(payload)) => {
                state.rendezvous().forward(&code, role, payload);
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(%code, %role, "relay socket error: {e}");
                break;
            }
        }
    }

    state.rendezvous().leave(&code, role, peer_id, Instant::now());
    writer.abort();
    info!(%code, %role, "peer left relay");
}

async fn send_frame(
    sink: &mut SplitSink<WebSocket, Message>,
    frame: &BrokerFrame,
) -> Result<(), axum::Error> {
    match serde_json::to_string(frame) {
        Ok(text) => sink.send(Message::Text(text)).await,
        Err(e) => {
            warn!("could not encode broker frame: {e}");
            Ok(())
        }
    }
}

async fn reject(sink: &mut SplitSink<WebSocket, Message>, reason: String) {
    let _ = send_frame(sink, &BrokerFrame::Rejected { reason }).await;
    let _ = sink.close().await;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
