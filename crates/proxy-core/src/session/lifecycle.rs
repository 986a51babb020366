//! Connection lifecycle manager.
//!
//! One [`LifecycleManager`] exists per session.  It owns exactly one transport
//! handle and one overlay, and moves through [`ConnectionState`] as transport
//! events arrive:
//!
//! - **Idle** → `start_session(code)` opens the transport and shows the pair
//!   code → **Pairing**.  With no code, a [`PairingResolver`] is consulted
//!   first; if it fails or times out the session goes to **Failed**.
//! - **Pairing** → `Connect` hides the overlay → **Connected**.
//! - **Connected** → `Disconnect` shows the *same* code again → **Pairing**.
//!   The rendezvous slot is reusable, so no new code is requested.
//! - **Pairing / Connected** → `Error` closes the handle → **Failed**.  There
//!   is no automatic retry; the caller must start a new session.
//! - any state → `close()` destroys the handle and the overlay → **Idle**.
//!
//! The manager never looks inside envelopes.  Incoming data is passed back to
//! the caller as [`SessionSignal::Data`], and only while connected.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::pairing::PairingCode;
use crate::protocol::envelope::Envelope;
use crate::session::{
    ConnectionState, Overlay, OverlayMessage, PairingError, PairingResolver, SessionError,
    Transport, TransportError, TransportErrorKind, TransportEvent, UNSUPPORTED_PLATFORM_STATUS,
};

/// Default upper bound on a pairing-code request.
pub const DEFAULT_PAIR_TIMEOUT: Duration = Duration::from_secs(10);

/// What the role-specific session should do after a transport event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// The peer is reachable: start consuming or producing input.
    Connected,
    /// One raw envelope from the peer.
    Data(String),
    /// The peer went away: go inert until the next `Connected`.
    Disconnected,
    /// The session failed and needs a fresh `start_session`.
    Failed(TransportError),
}

/// Drives one session from pairing through connect/disconnect/error.
pub struct LifecycleManager<T, O> {
    transport: T,
    overlay: O,
    state: ConnectionState,
    code: Option<PairingCode>,
    connect_url: Option<String>,
    overlay_visible: bool,
}

impl<T: Transport, O: Overlay> LifecycleManager<T, O> {
    pub fn new(transport: T, overlay: O) -> Self {
        Self {
            transport,
            overlay,
            state: ConnectionState::Idle,
            code: None,
            connect_url: None,
            overlay_visible: false,
        }
    }

    /// Sets the link shown next to the pair code.
    pub fn with_connect_url(mut self, url: impl Into<String>) -> Self {
        self.connect_url = Some(url.into());
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// The code of the current session, if one was started.
    pub fn pairing_code(&self) -> Option<&PairingCode> {
        self.code.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn overlay(&self) -> &O {
        &self.overlay
    }

    // ── Starting ────────────────────────────────────────────────────────────

    /// Starts a session with a known pairing code.
    ///
    /// # Errors
    ///
    /// - [`SessionError::AlreadyActive`] while pairing or connected; nothing
    ///   changes.
    /// - [`SessionError::Transport`] if the transport refuses to open; the
    ///   session is then **Failed**.
    pub fn start_session(&mut self, code: PairingCode) -> Result<(), SessionError> {
        self.ensure_startable()?;
        self.open(code)
    }

    /// Starts a session, asking `resolver` for a code first.
    ///
    /// The request is bounded by `timeout`; a timeout counts as a pairing
    /// failure.  Returns the code the session was opened with.
    ///
    /// # Errors
    ///
    /// As [`start_session`](Self::start_session), plus
    /// [`SessionError::Pairing`] when the resolver fails, after which the
    /// session is **Failed**.
    pub async fn start_session_with<R>(
        &mut self,
        resolver: &R,
        timeout: Duration,
    ) -> Result<PairingCode, SessionError>
    where
        R: PairingResolver + ?Sized,
    {
        self.ensure_startable()?;

        let resolved = match tokio::time::timeout(timeout, resolver.resolve()).await {
            Ok(result) => result,
            Err(_) => Err(PairingError::Timeout(timeout)),
        };

        match resolved {
            Ok(code) => {
                info!(code = %code, "pairing code resolved");
                self.open(code.clone())?;
                Ok(code)
            }
            Err(e) => {
                warn!("could not resolve a pairing code: {e}");
                self.transition(ConnectionState::Failed);
                self.show(OverlayMessage::Status(format!("Remote controls: {e}")));
                Err(SessionError::Pairing(e))
            }
        }
    }

    fn ensure_startable(&self) -> Result<(), SessionError> {
        match self.state {
            ConnectionState::Idle | ConnectionState::Failed => Ok(()),
            active => Err(SessionError::AlreadyActive(active)),
        }
    }

    fn open(&mut self, code: PairingCode) -> Result<(), SessionError> {
        if let Err(e) = self.transport.open(&code) {
            warn!(code = %code, "transport failed to open: {e}");
            self.code = Some(code);
            self.fail(e.clone());
            return Err(SessionError::Transport(e));
        }
        self.code = Some(code);
        self.transition(ConnectionState::Pairing);
        self.show_pair_code();
        Ok(())
    }

    // ── Events ──────────────────────────────────────────────────────────────

    /// Applies one transport event and tells the caller what to do about it.
    pub fn handle(&mut self, event: TransportEvent) -> Option<SessionSignal> {
        use ConnectionState as S;

        match (self.state, event) {
            (S::Idle | S::Failed, event) => {
                debug!(state = %self.state, "ignoring transport event {event:?}");
                None
            }
            (_, TransportEvent::Error(e)) => {
                warn!("session failed: {e}");
                self.fail(e.clone());
                Some(SessionSignal::Failed(e))
            }
            (S::Pairing | S::Disconnected, TransportEvent::Connect) => {
                self.hide();
                self.transition(S::Connected);
                Some(SessionSignal::Connected)
            }
            (S::Connected, TransportEvent::Data(raw)) => Some(SessionSignal::Data(raw)),
            (S::Connected, TransportEvent::Disconnect) => {
                self.transition(S::Disconnected);
                self.show_pair_code();
                self.transition(S::Pairing);
                Some(SessionSignal::Disconnected)
            }
            (state, event) => {
                debug!(state = %state, "no transition for transport event {event:?}");
                None
            }
        }
    }

    // ── Outbound ────────────────────────────────────────────────────────────

    /// Sends `envelope` if connected.
    ///
    /// Returns `false` when the envelope was dropped, either because the
    /// session is not connected or because the transport refused it.  Nothing
    /// is queued.
    pub fn send(&mut self, envelope: &Envelope) -> bool {
        if !self.is_connected() {
            debug!(
                state = %self.state,
                event_type = envelope.event_type(),
                "dropping envelope, not connected"
            );
            return false;
        }
        match self.transport.send(envelope) {
            Ok(()) => true,
            Err(e) => {
                warn!(event_type = envelope.event_type(), "send failed: {e}");
                false
            }
        }
    }

    // ── Teardown ────────────────────────────────────────────────────────────

    /// Destroys the transport handle and the overlay and returns to **Idle**.
    ///
    /// Valid from any state.  After this returns no further events from the
    /// old handle are acted on.
    pub fn close(&mut self) {
        self.transport.close();
        self.hide();
        self.code = None;
        self.transition(ConnectionState::Idle);
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn fail(&mut self, error: TransportError) {
        self.transport.close();
        self.transition(ConnectionState::Failed);
        if error.kind == TransportErrorKind::Unsupported {
            self.show(OverlayMessage::Status(UNSUPPORTED_PLATFORM_STATUS.to_string()));
        } else {
            self.show_pair_code();
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            info!(from = %self.state, to = %next, "session state changed");
            self.state = next;
        }
    }

    fn show_pair_code(&mut self) {
        if let Some(code) = self.code.clone() {
            self.show(OverlayMessage::PairCode {
                code,
                connect_url: self.connect_url.clone(),
            });
        }
    }

    fn show(&mut self, message: OverlayMessage) {
        self.overlay.show(&message);
        self.overlay_visible = true;
    }

    fn hide(&mut self) {
        if self.overlay_visible {
            self.overlay.hide();
            self.overlay_visible = false;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    // ── Test doubles ──────────────────────────────────────────────────────────

    #[derive(Default)]
    struct RecordingTransport {
        opened: Vec<String>,
        sent: Vec<Envelope>,
        closes: usize,
        fail_open: Option<TransportError>,
    }

    impl Transport for RecordingTransport {
        fn open(&mut self, code: &PairingCode) -> Result<(), TransportError> {
            if let Some(e) = self.fail_open.clone() {
                return Err(e);
            }
            self.opened.push(code.to_string());
            Ok(())
        }

        fn send(&mut self, envelope: &Envelope) -> Result<(), TransportError> {
            self.sent.push(envelope.clone());
            Ok(())
        }

        fn close(&mut self) {
            self.closes += 1;
        }
    }

    #[derive(Default)]
    struct RecordingOverlay {
        shown: Vec<OverlayMessage>,
        hides: usize,
    }

    impl Overlay for RecordingOverlay {
        fn show(&mut self, message: &OverlayMessage) {
            self.shown.push(message.clone());
        }

        fn hide(&mut self) {
            self.hides += 1;
        }
    }

    struct FixedResolver(Result<PairingCode, PairingError>);

    #[async_trait]
    impl PairingResolver for FixedResolver {
        async fn resolve(&self) -> Result<PairingCode, PairingError> {
            self.0.clone()
        }
    }

    struct StalledResolver;

    #[async_trait]
    impl PairingResolver for StalledResolver {
        async fn resolve(&self) -> Result<PairingCode, PairingError> {
            std::future::pending().await
        }
    }

    fn code(s: &str) -> PairingCode {
        PairingCode::new(s).unwrap()
    }

    fn manager() -> LifecycleManager<RecordingTransport, RecordingOverlay> {
        LifecycleManager::new(RecordingTransport::default(), RecordingOverlay::default())
    }

    fn pair_code_shown(m: &LifecycleManager<RecordingTransport, RecordingOverlay>) -> Vec<String> {
        m.overlay()
            .shown
            .iter()
            .filter_map(|msg| match msg {
                OverlayMessage::PairCode { code, .. } => Some(code.to_string()),
                OverlayMessage::Status(_) => None,
            })
            .collect()
    }

    // ── Starting ────────────────────────────────────────────────────────────

    #[test]
    fn test_new_manager_is_idle() {
        let m = manager();
        assert_eq!(m.state(), ConnectionState::Idle);
        assert!(!m.is_connected());
        assert!(m.pairing_code().is_none());
    }

    #[test]
    fn test_start_session_opens_transport_and_shows_code() {
        // Arrange
        let mut m = manager();

        // Act
        m.start_session(code("ABC")).unwrap();

        // Assert
        assert_eq!(m.state(), ConnectionState::Pairing);
        assert_eq!(m.transport().opened, vec!["ABC"]);
        assert_eq!(pair_code_shown(&m), vec!["ABC"]);
    }

    #[test]
    fn test_connect_url_is_passed_to_overlay() {
        let mut m = manager().with_connect_url("http://broker:8080/#/connect");
        m.start_session(code("ABC")).unwrap();

        assert_eq!(
            m.overlay().shown[0],
            OverlayMessage::PairCode {
                code: code("ABC"),
                connect_url: Some("http://broker:8080/#/connect".into())
            }
        );
    }

    #[test]
    fn test_start_session_while_active_is_rejected_without_side_effects() {
        let mut m = manager();
        m.start_session(code("ABC")).unwrap();

        let err = m.start_session(code("XYZ")).unwrap_err();

        assert_eq!(err, SessionError::AlreadyActive(ConnectionState::Pairing));
        assert_eq!(m.transport().opened, vec!["ABC"]);
        assert_eq!(m.pairing_code(), Some(&code("ABC")));
    }

    #[test]
    fn test_open_failure_moves_to_failed() {
        let mut m = manager();
        m.transport_mut().fail_open = Some(TransportError::io("refused"));

        let err = m.start_session(code("ABC")).unwrap_err();

        assert!(matches!(err, SessionError::Transport(_)));
        assert_eq!(m.state(), ConnectionState::Failed);
    }

    #[tokio::test]
    async fn test_start_session_with_resolver_uses_resolved_code() {
        let mut m = manager();
        let resolver = FixedResolver(Ok(code("pair-007")));

        let resolved = m
            .start_session_with(&resolver, DEFAULT_PAIR_TIMEOUT)
            .await
            .unwrap();

        assert_eq!(resolved, code("pair-007"));
        assert_eq!(m.state(), ConnectionState::Pairing);
        assert_eq!(m.transport().opened, vec!["pair-007"]);
    }

    #[tokio::test]
    async fn test_resolver_failure_moves_to_failed_without_opening() {
        let mut m = manager();
        let resolver = FixedResolver(Err(PairingError::Status(500)));

        let err = m
            .start_session_with(&resolver, DEFAULT_PAIR_TIMEOUT)
            .await
            .unwrap_err();

        assert_eq!(err, SessionError::Pairing(PairingError::Status(500)));
        assert_eq!(m.state(), ConnectionState::Failed);
        assert!(m.transport().opened.is_empty());
        assert!(matches!(m.overlay().shown[0], OverlayMessage::Status(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolver_timeout_is_a_pairing_failure() {
        let mut m = manager();

        let err = m
            .start_session_with(&StalledResolver, Duration::from_secs(3))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            SessionError::Pairing(PairingError::Timeout(Duration::from_secs(3)))
        );
        assert_eq!(m.state(), ConnectionState::Failed);
    }

    // ── Events ──────────────────────────────────────────────────────────────

    #[test]
    fn test_connect_hides_overlay_and_connects() {
        let mut m = manager();
        m.start_session(code("ABC")).unwrap();

        let signal = m.handle(TransportEvent::Connect);

        assert_eq!(signal, Some(SessionSignal::Connected));
        assert!(m.is_connected());
        assert_eq!(m.overlay().hides, 1);
    }

    #[test]
    fn test_disconnect_reshows_same_code_and_returns_to_pairing() {
        let mut m = manager();
        m.start_session(code("ABC")).unwrap();
        m.handle(TransportEvent::Connect);

        let signal = m.handle(TransportEvent::Disconnect);

        assert_eq!(signal, Some(SessionSignal::Disconnected));
        assert_eq!(m.state(), ConnectionState::Pairing);
        assert_eq!(pair_code_shown(&m), vec!["ABC", "ABC"]);
        // The slot is reused: the transport was opened once.
        assert_eq!(m.transport().opened.len(), 1);
    }

    #[test]
    fn test_data_only_passes_while_connected() {
        let mut m = manager();
        m.start_session(code("ABC")).unwrap();

        assert_eq!(m.handle(TransportEvent::Data("early".into())), None);

        m.handle(TransportEvent::Connect);
        assert_eq!(
            m.handle(TransportEvent::Data("x".into())),
            Some(SessionSignal::Data("x".into()))
        );

        m.handle(TransportEvent::Disconnect);
        assert_eq!(m.handle(TransportEvent::Data("late".into())), None);
    }

    #[test]
    fn test_error_while_connected_fails_and_closes_handle() {
        let mut m = manager();
        m.start_session(code("ABC")).unwrap();
        m.handle(TransportEvent::Connect);

        let err = TransportError::io("reset by peer");
        let signal = m.handle(TransportEvent::Error(err.clone()));

        assert_eq!(signal, Some(SessionSignal::Failed(err)));
        assert_eq!(m.state(), ConnectionState::Failed);
        assert_eq!(m.transport().closes, 1);
        // The pairing display stays up as the failure indication.
        assert_eq!(pair_code_shown(&m), vec!["ABC", "ABC"]);
    }

    #[test]
    fn test_unsupported_error_shows_incompatibility_status() {
        let mut m = manager();
        m.start_session(code("ABC")).unwrap();

        m.handle(TransportEvent::Error(TransportError::unsupported("no peer support")));

        assert_eq!(
            m.overlay().shown.last(),
            Some(&OverlayMessage::Status(UNSUPPORTED_PLATFORM_STATUS.to_string()))
        );
    }

    #[test]
    fn test_events_are_ignored_while_failed() {
        let mut m = manager();
        m.start_session(code("ABC")).unwrap();
        m.handle(TransportEvent::Error(TransportError::io("boom")));

        assert_eq!(m.handle(TransportEvent::Connect), None);
        assert_eq!(m.state(), ConnectionState::Failed);
    }

    #[test]
    fn test_events_are_ignored_while_idle() {
        let mut m = manager();
        assert_eq!(m.handle(TransportEvent::Connect), None);
        assert_eq!(m.handle(TransportEvent::Data("x".into())), None);
        assert_eq!(m.state(), ConnectionState::Idle);
    }

    #[test]
    fn test_failed_session_can_be_restarted() {
        let mut m = manager();
        m.start_session(code("ABC")).unwrap();
        m.handle(TransportEvent::Error(TransportError::io("boom")));

        m.start_session(code("DEF")).unwrap();

        assert_eq!(m.state(), ConnectionState::Pairing);
        assert_eq!(m.transport().opened, vec!["ABC", "DEF"]);
    }

    // ── Outbound ────────────────────────────────────────────────────────────

    #[test]
    fn test_send_drops_while_not_connected() {
        let mut m = manager();
        m.start_session(code("ABC")).unwrap();

        assert!(!m.send(&Envelope::ping(json!(1))));
        assert!(m.transport().sent.is_empty());
    }

    #[test]
    fn test_send_forwards_while_connected() {
        let mut m = manager();
        m.start_session(code("ABC")).unwrap();
        m.handle(TransportEvent::Connect);

        assert!(m.send(&Envelope::ping(json!(1))));
        assert_eq!(m.transport().sent, vec![Envelope::ping(json!(1))]);
    }

    // ── Teardown ────────────────────────────────────────────────────────────

    #[test]
    fn test_close_returns_to_idle_from_connected() {
        let mut m = manager();
        m.start_session(code("ABC")).unwrap();
        m.handle(TransportEvent::Connect);

        m.close();

        assert_eq!(m.state(), ConnectionState::Idle);
        assert!(m.pairing_code().is_none());
        assert_eq!(m.transport().closes, 1);
        assert!(!m.send(&Envelope::ping(json!(1))));
    }

    #[test]
    fn test_close_hides_visible_overlay() {
        let mut m = manager();
        m.start_session(code("ABC")).unwrap();

        m.close();

        assert_eq!(m.overlay().hides, 1);
    }

    #[test]
    fn test_close_while_idle_is_harmless() {
        let mut m = manager();
        m.close();
        assert_eq!(m.state(), ConnectionState::Idle);
        assert_eq!(m.overlay().hides, 0);
    }
}
