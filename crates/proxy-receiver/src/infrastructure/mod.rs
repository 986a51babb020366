//! Infrastructure layer for the receiver.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `proxy_core`, but MUST NOT be imported by the `application` or `domain`
//! layers.
//!
//! # Sub-modules
//!
//! - **`overlay`** – `Overlay` implementations: a terminal status line and a
//!   no-op overlay for when the overlay is disabled.
//!
//! - **`config_file`** – loads [`crate::domain::ReceiverConfig`] from TOML.

pub mod config_file;
pub mod overlay;

pub use config_file::{load_config, ConfigError};
pub use overlay::{NullOverlay, ReceiverOverlay, TerminalOverlay};
