//! Application layer use cases for the controller.
//!
//! - **`keyboard`** – Edge-triggered tracker of held keys.  Produces a
//!   `"keyboard"` envelope only when the held set actually changes.
//!
//! - **`gamepad`** – Per-frame sampler over a `GamepadProvider`.  Produces a
//!   `"gamepad"` envelope whenever at least one pad is present (optionally
//!   only when the snapshot changed).
//!
//! - **`heartbeat`** – Builds timestamped pings and measures the round trip
//!   of their echoes.
//!
//! - **`publish_input`** – The controller session: arms and disarms the
//!   sources as the connection comes and goes, and routes their envelopes
//!   through the lifecycle manager.

pub mod gamepad;
pub mod heartbeat;
pub mod keyboard;
pub mod publish_input;

pub use gamepad::{GamepadProvider, GamepadSampler, GamepadSlots};
pub use heartbeat::Heartbeat;
pub use keyboard::{KeyInput, KeyboardTracker};
pub use publish_input::ControllerSession;
