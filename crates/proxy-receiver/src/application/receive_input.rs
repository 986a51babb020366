//! ReceiverSession: the receiver's half of a proxy-controls session.
//!
//! Wraps a [`LifecycleManager`] and owns the [`RemoteState`] it feeds.  The
//! manager decides *whether* data may flow; this use case decides *what* to
//! do with it:
//!
//! | Signal            | Effect                                          |
//! |-------------------|-------------------------------------------------|
//! | `Data(raw)`       | ingest; a ping is echoed back through `send`    |
//! | `Disconnected`    | state kept, or cleared with `reset_on_reconnect`|
//! | `Failed(_)`       | state kept until the next `close`               |
//!
//! Accessors read the store directly and never block.

use std::time::Duration;

use proxy_core::{
    ConnectionState, GamepadSnapshot, IngestOutcome, KeyboardSnapshot, LifecycleManager, Overlay,
    PairingCode, PairingResolver, RemoteState, SessionError, SessionSignal, Transport,
    TransportEvent,
};
use serde_json::Value;
use tracing::{debug, info, trace};

/// Remote input state kept in step with one connection lifecycle.
pub struct ReceiverSession<T, O> {
    manager: LifecycleManager<T, O>,
    store: RemoteState,
    reset_on_reconnect: bool,
}

impl<T: Transport, O: Overlay> ReceiverSession<T, O> {
    pub fn new(manager: LifecycleManager<T, O>) -> Self {
        Self {
            manager,
            store: RemoteState::new(),
            reset_on_reconnect: false,
        }
    }

    /// Clears the store whenever the controller disconnects.
    pub fn with_reset_on_reconnect(mut self, reset: bool) -> Self {
        self.reset_on_reconnect = reset;
        self
    }

    pub fn manager(&self) -> &LifecycleManager<T, O> {
        &self.manager
    }

    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Starts pairing with a known code.
    ///
    /// # Errors
    ///
    /// See [`LifecycleManager::start_session`].
    pub fn start(&mut self, code: PairingCode) -> Result<(), SessionError> {
        self.manager.start_session(code)
    }

    /// Starts pairing with a code obtained from `resolver`.
    ///
    /// # Errors
    ///
    /// See [`LifecycleManager::start_session_with`].
    pub async fn start_with<R>(
        &mut self,
        resolver: &R,
        timeout: Duration,
    ) -> Result<PairingCode, SessionError>
    where
        R: PairingResolver + ?Sized,
    {
        self.manager.start_session_with(resolver, timeout).await
    }

    /// Applies one transport event and returns the resulting signal.
    pub fn handle(&mut self, event: TransportEvent) -> Option<SessionSignal> {
        let signal = self.manager.handle(event);
        match &signal {
            Some(SessionSignal::Data(raw)) => self.ingest(raw),
            Some(SessionSignal::Connected) => info!("controller connected"),
            Some(SessionSignal::Disconnected) => {
                info!("controller disconnected; waiting for it to return");
                if self.reset_on_reconnect {
                    self.store.reset();
                }
            }
            Some(SessionSignal::Failed(_)) | None => {}
        }
        signal
    }

    /// Tears the session down and forgets all remote state.
    pub fn close(&mut self) {
        self.manager.close();
        self.store.reset();
    }

    fn ingest(&mut self, raw: &str) {
        match self.store.ingest(raw) {
            IngestOutcome::Stored(event_type) => trace!(%event_type, "remote state updated"),
            IngestOutcome::Echo(envelope) => {
                if !self.manager.send(&envelope) {
                    debug!("ping echo dropped");
                }
            }
            // Already logged by the store.
            IngestOutcome::Rejected(_) => {}
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    /// Keys currently held on the controller; empty if none were reported.
    pub fn keyboard(&self) -> KeyboardSnapshot {
        self.store.keyboard()
    }

    pub fn gamepad(&self, index: usize) -> Option<GamepadSnapshot> {
        self.store.gamepad(index)
    }

    /// Latest state of any event type, reserved or extension.
    pub fn get(&self, event_type: &str) -> Option<&Value> {
        self.store.get(event_type)
    }

    pub fn store(&self) -> &RemoteState {
        &self.store
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
