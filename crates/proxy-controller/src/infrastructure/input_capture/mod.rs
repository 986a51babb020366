//! Input capture infrastructure for the controller.
//!
//! A capture source runs on its own thread and hands [`CaptureEvent`]s to the
//! async runtime over an unbounded channel.  Auto-repeat is discarded at the
//! source, so everything that arrives is a real press or release.
//!
//! # Testability
//!
//! The [`InputSource`] trait lets tests inject synthetic keys through
//! [`mock::MockInputSource`] without a terminal.

use tokio::sync::mpsc::UnboundedReceiver;

use crate::application::KeyInput;

pub mod mock;
pub mod terminal;

/// What a capture source reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    Key(KeyInput),
    /// The user asked to quit (Ctrl+C while the terminal is in raw mode).
    Interrupt,
}

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
    #[error("capture has already been started")]
    AlreadyStarted,
}

/// Trait abstracting key event production.
pub trait InputSource: Send {
    /// Starts capturing and returns the stream of events.
    fn start(&mut self) -> Result<UnboundedReceiver<CaptureEvent>, CaptureError>;
    /// Stops capturing and restores any terminal state.  Idempotent.
    fn stop(&mut self);
}
