//! Infrastructure layer for the controller.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `proxy_core`, but MUST NOT be imported by the `application` or `domain`
//! layers.
//!
//! # Sub-modules
//!
//! - **`input_capture`** – `InputSource` implementations: raw-mode terminal
//!   capture via `crossterm`, and a mock that tests inject keys into.
//!
//! - **`gamepad`** – `GamepadProvider` implementations: `gilrs` (behind the
//!   `gilrs` feature), a provider with no pads, and a scripted mock.
//!
//! - **`overlay`** – the controller has no screen of its own, so overlay
//!   messages go to the log.
//!
//! - **`log_writer`** – log output that stays readable while the terminal is
//!   in raw mode.

pub mod gamepad;
pub mod input_capture;
pub mod log_writer;
pub mod overlay;

pub use log_writer::RawModeWriter;
pub use overlay::LogOverlay;
