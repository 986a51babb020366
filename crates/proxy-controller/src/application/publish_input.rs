//! ControllerSession: the controller's half of a proxy-controls session.
//!
//! Owns the lifecycle manager and the three publishers.  The main loop feeds
//! it four kinds of stimulus and it decides what, if anything, goes out:
//!
//! | Stimulus          | Method          | Sends while connected          |
//! |-------------------|-----------------|--------------------------------|
//! | transport event   | `handle`        | nothing (arms / disarms)       |
//! | key transition    | `on_key`        | `"keyboard"` if the set changed|
//! | frame tick        | `on_frame`      | `"gamepad"` if a pad is present|
//! | heartbeat tick    | `on_heartbeat`  | `"ping"`                       |
//!
//! While not connected the keyboard tracker is disarmed and every envelope is
//! dropped by the lifecycle manager; the frame loop keeps ticking regardless.

use std::time::{Duration, Instant};

use proxy_core::{
    decode_envelope, ConnectionState, LifecycleManager, Overlay, PairingCode, PairingResolver,
    SessionError, SessionSignal, Transport, TransportEvent,
};
use tracing::{debug, info};

use crate::application::gamepad::{GamepadProvider, GamepadSampler};
use crate::application::heartbeat::Heartbeat;
use crate::application::keyboard::{KeyInput, KeyboardTracker};

/// Publishes local input for one connection lifecycle.
pub struct ControllerSession<T, O, P> {
    manager: LifecycleManager<T, O>,
    keyboard: KeyboardTracker,
    gamepads: GamepadSampler<P>,
    heartbeat: Heartbeat,
    last_round_trip: Option<Duration>,
}

impl<T: Transport, O: Overlay, P: GamepadProvider> ControllerSession<T, O, P> {
    pub fn new(manager: LifecycleManager<T, O>, gamepads: GamepadSampler<P>) -> Self {
        Self {
            manager,
            keyboard: KeyboardTracker::new(),
            gamepads,
            heartbeat: Heartbeat::new(),
            last_round_trip: None,
        }
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

    pub fn keyboard(&self) -> &KeyboardTracker {
        &self.keyboard
    }

    pub fn gamepads(&self) -> &GamepadSampler<P> {
        &self.gamepads
    }

    pub fn gamepads_mut(&mut self) -> &mut GamepadSampler<P> {
        &mut self.gamepads
    }

    /// Round trip of the most recent echoed heartbeat.
    pub fn last_round_trip(&self) -> Option<Duration> {
        self.last_round_trip
    }

    // ── Lifecycle ───────────────────────────────────────────────────────────

    /// Joins the slot named by `code`.
    ///
    /// # Errors
    ///
    /// See [`LifecycleManager::start_session`].
    pub fn start(&mut self, code: PairingCode) -> Result<(), SessionError> {
        self.manager.start_session(code)
    }

    /// Joins a slot whose code comes from `resolver`.
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

    /// Applies one transport event; arms or disarms the publishers.
    pub fn handle(&mut self, event: TransportEvent) -> Option<SessionSignal> {
        let signal = self.manager.handle(event);
        match &signal {
            Some(SessionSignal::Connected) => {
                info!("receiver connected; publishing input");
                self.keyboard.arm();
                self.gamepads.reset();
            }
            Some(SessionSignal::Disconnected) => {
                info!("receiver disconnected; input paused");
                self.keyboard.disarm();
            }
            Some(SessionSignal::Failed(_)) => self.keyboard.disarm(),
            Some(SessionSignal::Data(raw)) => self.on_data(raw, Instant::now()),
            None => {}
        }
        signal
    }

    /// Stops all publishing and tears the session down.
    pub fn close(&mut self) {
        self.manager.close();
        self.keyboard.disarm();
        self.gamepads.reset();
    }

    // ── Publishers ──────────────────────────────────────────────────────────

    /// Returns `true` if an envelope was sent.
    pub fn on_key(&mut self, input: KeyInput) -> bool {
        match self.keyboard.apply(input) {
            Some(envelope) => self.manager.send(&envelope),
            None => false,
        }
    }

    /// Runs one gamepad sample.  Returns `true` if an envelope was sent.
    pub fn on_frame(&mut self) -> bool {
        let envelope = self.gamepads.tick();
        if !self.manager.is_connected() {
            return false;
        }
        match envelope {
            Some(envelope) => self.manager.send(&envelope),
            None => false,
        }
    }

    /// Sends a heartbeat stamped with `now`.  Returns `true` if sent.
    pub fn on_heartbeat(&mut self, now: Instant) -> bool {
        if !self.manager.is_connected() {
            return false;
        }
        self.manager.send(&self.heartbeat.ping(now))
    }

    // ── Inbound ─────────────────────────────────────────────────────────────

    fn on_data(&mut self, raw: &str, now: Instant) {
        match decode_envelope(raw) {
            Ok(envelope) if envelope.is_ping() => {
                match self.heartbeat.round_trip(envelope.state(), now) {
                    Some(rtt) => {
                        info!(rtt_ms = rtt.as_millis() as u64, "heartbeat echoed");
                        self.last_round_trip = Some(rtt);
                    }
                    None => debug!("ping without a usable stamp: {}", envelope.state()),
                }
            }
            Ok(envelope) => debug!(event_type = envelope.event_type(), "peer data"),
            Err(e) => debug!("dropping malformed peer data: {e}"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
