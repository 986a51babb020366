//! Mock input source for testing.
//!
//! Allows tests to inject synthetic [`CaptureEvent`]s without a terminal.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::{CaptureError, CaptureEvent, InputSource};
use crate::application::KeyInput;

/// An [`InputSource`] fed by the test.  Clones share one channel.
#[derive(Clone, Default)]
pub struct MockInputSource {
    sender: Arc<Mutex<Option<UnboundedSender<CaptureEvent>>>>,
}

impl MockInputSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects an event as if it had been captured.
    ///
    /// Returns `false` when the source is not started or the receiver is gone.
    pub fn inject(&self, event: CaptureEvent) -> bool {
        match self.sender.lock() {
            Ok(guard) => guard.as_ref().is_some_and(|tx| tx.send(event).is_ok()),
            Err(_) => false,
        }
    }

    pub fn press(&self, key: &str) -> bool {
        self.inject(CaptureEvent::Key(KeyInput::Pressed(key.to_string())))
    }

    pub fn release(&self, key: &str) -> bool {
        self.inject(CaptureEvent::Key(KeyInput::Released(key.to_string())))
    }
}

impl InputSource for MockInputSource {
    fn start(&mut self) -> Result<UnboundedReceiver<CaptureEvent>, CaptureError> {
        let mut guard = self
            .sender
            .lock()
            .map_err(|_| CaptureError::AlreadyStarted)?;
        if guard.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *guard = Some(tx);
        Ok(rx)
    }

    fn stop(&mut self) {
        if let Ok(mut guard) = self.sender.lock() {
            // Dropping the sender ends the stream.
            *guard = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_events_arrive_in_order() {
        // Arrange
        let mut source = MockInputSource::new();
        let mut rx = source.start().unwrap();

        // Act
        source.press("a");
        source.release("a");

        // Assert
        assert_eq!(
            rx.try_recv().unwrap(),
            CaptureEvent::Key(KeyInput::Pressed("a".into()))
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            CaptureEvent::Key(KeyInput::Released("a".into()))
        );
    }

    #[test]
    fn test_inject_before_start_is_refused() {
        let source = MockInputSource::new();
        assert!(!source.press("a"));
    }

    #[test]
    fn test_second_start_is_refused() {
        let mut source = MockInputSource::new();
        let _rx = source.start().unwrap();
        assert!(matches!(source.start(), Err(CaptureError::AlreadyStarted)));
    }

    #[test]
    fn test_stop_closes_the_stream() {
        let mut source = MockInputSource::new();
        let mut rx = source.start().unwrap();

        source.stop();

        assert!(rx.try_recv().is_err());
        assert!(!source.press("a"));
    }
}
