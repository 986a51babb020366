//! WebSocket relay transport.
//!
//! [`WsTransport`] implements [`proxy_core::Transport`] on top of the
//! broker's relay endpoint.  `open` spawns one connection task per session;
//! the task turns [`BrokerFrame`]s into [`TransportEvent`]s and writes
//! outgoing envelopes to the socket.
//!
//! # Task layout
//!
//! ```text
//! WsTransport::send ──► outbound mpsc ──► connection task ──► WebSocket
//!                                              │
//! TransportEvents::recv ◄── events mpsc ◄──────┘ (tagged with the epoch)
//! ```
//!
//! # Stale events
//!
//! Every `open` and `close` bumps a shared epoch counter and each event is
//! tagged with the epoch of the task that produced it.
//! [`TransportEvents::recv`] discards events whose epoch is not current, so an
//! aborted connection can never leak a late `Connect` or `Data` into the next
//! session.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use proxy_core::{
    encode_envelope, BrokerFrame, Envelope, PairingCode, PeerRole, Transport, TransportError,
    TransportErrorKind, TransportEvent,
};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};
use url::Url;

use crate::endpoint::BrokerEndpoint;

type TaggedEvent = (u64, TransportEvent);

/// Receiving half of a [`WsTransport`]: yields events of the current session.
pub struct TransportEvents {
    rx: mpsc::UnboundedReceiver<TaggedEvent>,
    epoch: Arc<AtomicU64>,
}

impl TransportEvents {
    /// Waits for the next event from the current session.
    ///
    /// Returns `None` once the owning [`WsTransport`] has been dropped.
    pub async fn recv(&mut self) -> Option<TransportEvent> {
        loop {
            let (epoch, event) = self.rx.recv().await?;
            if epoch == self.epoch.load(Ordering::SeqCst) {
                return Some(event);
            }
            trace!(epoch, "discarding event from a closed connection");
        }
    }
}

/// Transport that reaches the other peer through the broker relay.
pub struct WsTransport {
    endpoint: BrokerEndpoint,
    role: PeerRole,
    epoch: Arc<AtomicU64>,
    events_tx: mpsc::UnboundedSender<TaggedEvent>,
    outbound: Option<mpsc::UnboundedSender<String>>,
    task: Option<JoinHandle<()>>,
}

impl WsTransport {
    /// Creates a closed transport and the stream its events arrive on.
    pub fn new(endpoint: BrokerEndpoint, role: PeerRole) -> (Self, TransportEvents) {
        let (events_tx, rx) = mpsc::unbounded_channel();
        let epoch = Arc::new(AtomicU64::new(0));
        let transport = Self {
            endpoint,
            role,
            epoch: Arc::clone(&epoch),
            events_tx,
            outbound: None,
            task: None,
        };
        (transport, TransportEvents { rx, epoch })
    }

    pub fn role(&self) -> PeerRole {
        self.role
    }

    /// `true` while a connection task exists.
    pub fn is_open(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn stop_task(&mut self) {
        self.outbound = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Transport for WsTransport {
    fn open(&mut self, code: &PairingCode) -> Result<(), TransportError> {
        self.stop_task();

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| TransportError::unsupported("no async runtime to run the connection on"))?;

        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let url = self.endpoint.relay_url(code, self.role);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        info!(%url, role = %self.role, "opening relay connection");
        self.task = Some(runtime.spawn(run_connection(
            url,
            epoch,
            self.events_tx.clone(),
            outbound_rx,
        )));
        self.outbound = Some(outbound_tx);
        Ok(())
    }

    fn send(&mut self, envelope: &Envelope) -> Result<(), TransportError> {
        let text = encode_envelope(envelope)
            .map_err(|e| TransportError::new(TransportErrorKind::Protocol, e.to_string()))?;
        let outbound = self
            .outbound
            .as_ref()
            .ok_or_else(|| TransportError::closed("transport is not open"))?;
        outbound
            .send(text)
            .map_err(|_| TransportError::closed("connection task has stopped"))
    }

    fn close(&mut self) {
        self.stop_task();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        debug!("relay connection closed");
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.stop_task();
    }
}

// ── Connection task ───────────────────────────────────────────────────────────

async fn run_connection(
    url: Url,
    epoch: u64,
    events: mpsc::UnboundedSender<TaggedEvent>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    let emit = |event: TransportEvent| {
        // The receiver only goes away when the transport is dropped.
        let _ = events.send((epoch, event));
    };

    let socket = match connect_async(url.as_str()).await {
        Ok((socket, _response)) => socket,
        Err(e) => {
            warn!(%url, "relay connection failed: {e}");
            emit(TransportEvent::Error(TransportError::io(e.to_string())));
            return;
        }
    };
    debug!(%url, "relay socket connected, waiting for peer");

    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<BrokerFrame>(&text) {
                    Ok(BrokerFrame::PeerJoined) => emit(TransportEvent::Connect),
                    Ok(BrokerFrame::PeerLeft) => emit(TransportEvent::Disconnect),
                    Ok(BrokerFrame::Data { payload }) => emit(TransportEvent::Data(payload)),
                    Ok(BrokerFrame::Rejected { reason }) => {
                        warn!(%reason, "broker rejected the join");
                        emit(TransportEvent::Error(TransportError::rejected(reason)));
                        return;
                    }
                    Err(e) => debug!("ignoring unrecognised broker frame: {e}"),
                },
                Some(Ok(Message::Close(_))) | None => {
                    emit(TransportEvent::Error(TransportError::closed(
                        "broker closed the connection",
                    )));
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    emit(TransportEvent::Error(TransportError::io(e.to_string())));
                    return;
                }
            },
            message = outbound.recv() => match message {
                Some(text) => {
                    if let Err(e) = sink.send(Message::Text(text)).await {
                        emit(TransportEvent::Error(TransportError::io(e.to_string())));
                        return;
                    }
                }
                None => {
                    let _ = sink.close().await;
                    return;
                }
            },
        }
    }
}
