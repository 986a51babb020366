//! proxy-controller library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does proxy-controller do? (for beginners)
//!
//! The *controller* is the device in the user's hands.  It joins the
//! receiver's rendezvous slot with the pairing code the receiver displays,
//! then streams its input:
//!
//! 1. **Keyboard** – every press or release of a key re-sends the *whole*
//!    set of held keys as a `"keyboard"` envelope.  Auto-repeat and duplicate
//!    transitions send nothing.
//! 2. **Gamepads** – once per frame (about 60 times a second) up to four
//!    gamepad slots are sampled and sent as one `"gamepad"` envelope, as long
//!    as at least one pad is present.
//! 3. **Heartbeat** – every few seconds a `"ping"` envelope carrying a
//!    timestamp is sent; the receiver echoes it back and the controller logs
//!    the round-trip time.
//!
//! Nothing is sent, and nothing is queued, while the receiver is not
//! connected.

/// Domain layer: controller configuration.
pub mod domain;

/// Application layer: keyboard tracker, gamepad sampler, heartbeat and the
/// controller session.
pub mod application;

/// Infrastructure layer: terminal key capture, gamepad providers, overlay.
pub mod infrastructure;
