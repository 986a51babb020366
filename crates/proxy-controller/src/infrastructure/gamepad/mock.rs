//! Mock gamepad provider for testing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use proxy_core::GamepadSnapshot;

use crate::application::{GamepadProvider, GamepadSlots};

/// A [`GamepadProvider`] whose slots the test fills in.  Clones share state,
/// so a test can keep one handle after moving another into a sampler.
#[derive(Clone, Default)]
pub struct MockGamepadProvider {
    slots: Arc<Mutex<GamepadSlots>>,
    polls: Arc<AtomicU64>,
}

impl MockGamepadProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `pad` in `slot`.  Out-of-range slots are ignored.
    pub fn connect(&self, slot: usize, pad: GamepadSnapshot) {
        if let Some(entry) = self.lock().get_mut(slot) {
            *entry = Some(pad);
        }
    }

    pub fn disconnect(&self, slot: usize) {
        if let Some(entry) = self.lock().get_mut(slot) {
            *entry = None;
        }
    }

    /// Number of times the sampler has polled.
    pub fn polls(&self) -> u64 {
        self.polls.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GamepadSlots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl GamepadProvider for MockGamepadProvider {
    fn poll(&mut self) -> GamepadSlots {
        self.polls.fetch_add(1, Ordering::Relaxed);
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(id: &str) -> GamepadSnapshot {
        GamepadSnapshot {
            id: id.into(),
            index: 0,
            connected: true,
            axes: Vec::new(),
            buttons: Vec::new(),
            mapping: String::new(),
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_clones_share_slots_and_poll_count() {
        // Arrange
        let handle = MockGamepadProvider::new();
        let mut provider = handle.clone();

        // Act
        handle.connect(1, pad("p"));
        let slots = provider.poll();

        // Assert
        assert_eq!(slots[1].as_ref().map(|p| p.id.as_str()), Some("p"));
        assert_eq!(handle.polls(), 1);
    }

    #[test]
    fn test_out_of_range_slot_is_ignored() {
        let mut provider = MockGamepadProvider::new();
        provider.connect(9, pad("p"));
        assert!(provider.poll().iter().all(Option::is_none));
    }

    #[test]
    fn test_disconnect_empties_slot() {
        let mut provider = MockGamepadProvider::new();
        provider.connect(0, pad("p"));
        provider.disconnect(0);
        assert!(provider.poll()[0].is_none());
    }
}
