//! proxy-receiver library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does proxy-receiver do? (for beginners)
//!
//! The *receiver* runs next to the application being controlled.  It never
//! produces input itself; it holds the latest input state sent by a remote
//! controller so the application can read it whenever it likes.
//!
//! The receiver:
//!
//! 1. Obtains a pairing code, either from configuration or by asking the
//!    broker (`GET /pair`).
//! 2. Shows that code (and the link the controller should open) on an overlay.
//! 3. Waits on the broker relay until a controller joins with the same code.
//! 4. Decodes every incoming envelope into a [`proxy_core::RemoteState`]:
//!    keyboard and gamepad snapshots, plus any extension types.
//! 5. Echoes heartbeat pings straight back so the controller can measure
//!    round-trip time.
//! 6. Shows the pairing code again whenever the controller goes away.

/// Domain layer: receiver configuration.
pub mod domain;

/// Application layer: the receiver session use case.
pub mod application;

/// Infrastructure layer: overlays and the configuration file.
pub mod infrastructure;
