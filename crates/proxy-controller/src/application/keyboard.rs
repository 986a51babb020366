//! Keyboard tracker.
//!
//! Keeps the set of currently held keys, identified by browser
//! `KeyboardEvent.key` values (`"a"`, `"Enter"`, `"ArrowUp"`, `" "`...).
//! Publishing is edge-triggered: a press of a key already held, or a release
//! of a key not held, changes nothing and produces nothing.

use proxy_core::{Envelope, KeyboardSnapshot};

/// A key transition reported by an input source.  Auto-repeat is filtered
/// out before it gets here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyInput {
    Pressed(String),
    Released(String),
}

impl KeyInput {
    pub fn key(&self) -> &str {
        match self {
            KeyInput::Pressed(key) | KeyInput::Released(key) => key,
        }
    }
}

/// Edge-triggered held-key set.
#[derive(Debug, Default)]
pub struct KeyboardTracker {
    pressed: KeyboardSnapshot,
    armed: bool,
}

impl KeyboardTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking from an empty set.
    ///
    /// Keys held before arming are unknown to the receiver, so they are not
    /// carried over.
    pub fn arm(&mut self) {
        self.pressed.clear();
        self.armed = true;
    }

    /// Stops tracking; later events are ignored until the next `arm`.
    pub fn disarm(&mut self) {
        self.pressed.clear();
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn pressed(&self) -> &KeyboardSnapshot {
        &self.pressed
    }

    /// Applies one transition.  Returns the envelope to publish, if the held
    /// set changed.
    pub fn apply(&mut self, input: KeyInput) -> Option<Envelope> {
        if !self.armed {
            return None;
        }
        let changed = match input {
            KeyInput::Pressed(key) => self.pressed.insert(key),
            KeyInput::Released(key) => self.pressed.remove(&key),
        };
        changed.then(|| Envelope::keyboard(&self.pressed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn armed() -> KeyboardTracker {
        let mut tracker = KeyboardTracker::new();
        tracker.arm();
        tracker
    }

    #[test]
    fn test_repeated_press_publishes_once() {
        // Arrange
        let mut tracker = armed();

        // Act
        let first = tracker.apply(KeyInput::Pressed("A".into()));
        let second = tracker.apply(KeyInput::Pressed("A".into()));

        // Assert
        assert_eq!(first, Some(Envelope::keyboard(&["A"].into_iter().collect())));
        assert_eq!(second, None);
    }

    #[test]
    fn test_press_then_release_publishes_twice() {
        let mut tracker = armed();

        let press = tracker.apply(KeyInput::Pressed("A".into())).unwrap();
        let release = tracker.apply(KeyInput::Released("A".into())).unwrap();

        assert_eq!(press.state(), &json!(["A"]));
        assert_eq!(release.state(), &json!([]));
    }

    #[test]
    fn test_release_of_unheld_key_is_noop() {
        let mut tracker = armed();
        assert_eq!(tracker.apply(KeyInput::Released("q".into())), None);
    }

    #[test]
    fn test_envelope_carries_entire_held_set() {
        let mut tracker = armed();
        tracker.apply(KeyInput::Pressed("w".into()));

        let envelope = tracker.apply(KeyInput::Pressed("Shift".into())).unwrap();

        assert_eq!(envelope.event_type(), "keyboard");
        assert_eq!(envelope.state(), &json!(["Shift", "w"]));
    }

    #[test]
    fn test_disarmed_tracker_ignores_input() {
        let mut tracker = KeyboardTracker::new();

        assert_eq!(tracker.apply(KeyInput::Pressed("a".into())), None);
        assert!(tracker.pressed().is_empty());
    }

    #[test]
    fn test_arm_forgets_keys_held_before() {
        let mut tracker = armed();
        tracker.apply(KeyInput::Pressed("a".into()));

        tracker.disarm();
        tracker.arm();

        assert!(tracker.pressed().is_empty());
        assert!(tracker.apply(KeyInput::Pressed("a".into())).is_some());
    }
}
