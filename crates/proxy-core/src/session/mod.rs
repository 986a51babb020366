//! Session layer: the connection lifecycle state machine and the collaborator
//! traits it drives.
//!
//! # Collaborators (for beginners)
//!
//! The lifecycle manager never touches the network or the screen itself.  It
//! is handed three collaborators:
//!
//! - a [`Transport`] – an opaque, message-oriented channel to the other peer.
//!   It is opened with a pairing code and reports what happens on it as
//!   [`TransportEvent`] values, which the owner of the manager feeds into
//!   [`lifecycle::LifecycleManager::handle`].
//! - an [`Overlay`] – whatever shows the pairing code or a status line to
//!   the user.
//! - a [`PairingResolver`] – asks the broker for a fresh pairing code when
//!   the caller does not have one.
//!
//! Production implementations live in `proxy-transport` and in the role
//! crates; tests use recording doubles.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::pairing::{PairingCode, PairingCodeError};
use crate::protocol::envelope::Envelope;

pub mod lifecycle;

/// Status text shown when the transport reports that this platform cannot
/// open a peer connection at all.
pub const UNSUPPORTED_PLATFORM_STATUS: &str =
    "Remote controls: this platform cannot open a peer connection.";

// ── State ─────────────────────────────────────────────────────────────────────

/// Where a session is in its lifecycle.
///
/// ```text
/// Idle ──start──► Pairing ──connect──► Connected
///  ▲                 ▲                     │
///  │                 └──── Disconnected ◄──┘ disconnect
///  │
///  └──close── (any state)        Pairing/Connected ──error──► Failed
/// ```
///
/// `Disconnected` is passed through while the manager re-arms the pairing
/// display after a disconnect; the steady state afterwards is `Pairing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Pairing,
    Connected,
    Disconnected,
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Pairing => "pairing",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ── Transport ─────────────────────────────────────────────────────────────────

/// Broad classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The platform cannot open a peer connection at all.
    Unsupported,
    /// The broker refused the join (unknown code, role taken).
    Rejected,
    /// Socket or connection failure.
    Io,
    /// The channel was closed by the remote end.
    Closed,
    /// The remote end sent something the transport could not understand.
    Protocol,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportErrorKind::Unsupported => "unsupported",
            TransportErrorKind::Rejected => "rejected",
            TransportErrorKind::Io => "i/o",
            TransportErrorKind::Closed => "closed",
            TransportErrorKind::Protocol => "protocol",
        };
        f.write_str(name)
    }
}

/// A failure reported by a [`Transport`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("transport error ({kind}): {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unsupported, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Rejected, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Io, message)
    }

    pub fn closed(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Closed, message)
    }
}

/// Something that happened on the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The other peer is reachable.
    Connect,
    /// The other peer went away; the slot is still usable.
    Disconnect,
    /// The transport failed.
    Error(TransportError),
    /// One raw envelope from the other peer.
    Data(String),
}

/// An opaque, bidirectional, message-oriented channel to the other peer.
///
/// `open` must not block on the network; connection progress is reported
/// later through [`TransportEvent`]s.  `close` must stop event delivery for
/// the handle before it returns.
pub trait Transport: Send {
    /// Starts connecting to the rendezvous slot named by `code`.
    fn open(&mut self, code: &PairingCode) -> Result<(), TransportError>;

    /// Sends one envelope.  Only called while the session is connected.
    fn send(&mut self, envelope: &Envelope) -> Result<(), TransportError>;

    /// Destroys the handle.  Safe to call when not open.
    fn close(&mut self);
}

// ── Overlay ───────────────────────────────────────────────────────────────────

/// What the pairing display should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayMessage {
    /// The code to enter on the controller, plus where to enter it.
    PairCode {
        code: PairingCode,
        connect_url: Option<String>,
    },
    /// Free-text status.
    Status(String),
}

impl fmt::Display for OverlayMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayMessage::PairCode { code, connect_url } => {
                write!(f, "Pair code: \u{201c}{code}\u{201d}")?;
                if let Some(url) = connect_url {
                    write!(f, "  \u{203a} Connect: {url}")?;
                }
                Ok(())
            }
            OverlayMessage::Status(text) => f.write_str(text),
        }
    }
}

/// The pairing display collaborator.
pub trait Overlay: Send {
    fn show(&mut self, message: &OverlayMessage);
    fn hide(&mut self);
}

// ── Pairing ───────────────────────────────────────────────────────────────────

/// Failure to obtain a pairing code.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PairingError {
    #[error("pairing request failed: {0}")]
    Request(String),

    #[error("pairing endpoint answered with HTTP status {0}")]
    Status(u16),

    #[error("pairing endpoint returned an invalid body: {0}")]
    InvalidBody(String),

    #[error("pairing endpoint returned an unusable code: {0}")]
    InvalidCode(#[from] PairingCodeError),

    #[error("pairing request timed out after {0:?}")]
    Timeout(Duration),
}

/// Obtains a pairing code, usually by asking the broker for a new one.
#[async_trait]
pub trait PairingResolver: Send + Sync {
    async fn resolve(&self) -> Result<PairingCode, PairingError>;
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a session could not be started.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("a session is already active (state: {0})")]
    AlreadyActive(ConnectionState),

    #[error(transparent)]
    Pairing(#[from] PairingError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
