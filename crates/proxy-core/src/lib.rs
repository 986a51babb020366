//! # proxy-core
//!
//! Shared library for proxy controls containing the envelope protocol, the
//! remote state store, and the connection lifecycle state machine.
//!
//! This crate is used by the receiver, the controller and the broker.
//! It opens no sockets and spawns no tasks: every network-facing piece is
//! reached through the collaborator traits in [`session`].
//!
//! # Architecture overview (for beginners)
//!
//! Proxy controls let a secondary device (a phone, or a laptop with a gamepad)
//! drive an application running somewhere else.  The device running the
//! application is the **receiver**; the device producing input is the
//! **controller**.  The two find each other through a short pairing code
//! issued by a broker, then exchange small JSON messages called *envelopes*.
//!
//! - **`protocol`** – What travels on the wire.  Every message is an
//!   [`Envelope`] (`{"type": ..., "state": ...}`); the codec validates the
//!   `type` and passes `state` through untouched.
//!
//! - **`domain`** – Pure state with no I/O.  [`PairingCode`] names a
//!   rendezvous slot and [`RemoteState`] is the receiver's last-write-wins map
//!   of input state per envelope type.
//!
//! - **`session`** – The [`LifecycleManager`]: a small state machine that owns
//!   one transport handle, drives the pairing overlay, and decides when
//!   incoming data is allowed through.

pub mod domain;
pub mod protocol;
pub mod session;

// Re-export the most-used types at the crate root so callers can write
// `proxy_core::Envelope` instead of `proxy_core::protocol::envelope::Envelope`.
pub use domain::pairing::{PairingCode, PairingCodeError};
pub use domain::remote_state::{IngestOutcome, RemoteState};
pub use protocol::codec::{decode_envelope, encode_envelope, EnvelopeError};
pub use protocol::envelope::{event_types, Envelope, RelayEvent};
pub use protocol::relay::{BrokerFrame, PairResponse, PeerRole};
pub use protocol::snapshot::{ButtonSnapshot, GamepadSnapshot, KeyboardSnapshot, MAX_GAMEPADS};
pub use session::lifecycle::{LifecycleManager, SessionSignal, DEFAULT_PAIR_TIMEOUT};
pub use session::{
    ConnectionState, Overlay, OverlayMessage, PairingError, PairingResolver, SessionError,
    Transport, TransportError, TransportErrorKind, TransportEvent, UNSUPPORTED_PLATFORM_STATUS,
};
