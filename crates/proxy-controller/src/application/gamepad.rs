//! Gamepad sampler.
//!
//! Called once per frame.  Each tick reads every slot from a
//! [`GamepadProvider`] and, if at least one pad is present, builds a
//! `"gamepad"` envelope from the present pads in slot order.  An empty tick
//! produces nothing but is otherwise harmless, so the frame loop never has a
//! reason to stop.
//!
//! By default every non-empty tick publishes, even when nothing moved.  With
//! the change gate on, a tick whose snapshot equals the last one handed out
//! produces nothing.

use proxy_core::{Envelope, GamepadSnapshot, MAX_GAMEPADS};

/// One sample of every gamepad slot; `None` marks an empty slot.
pub type GamepadSlots = [Option<GamepadSnapshot>; MAX_GAMEPADS];

/// Source of gamepad state.
///
/// Implementations live in the infrastructure layer (a `gilrs` backend, a
/// provider that never reports a pad, and a scripted mock for tests).
pub trait GamepadProvider {
    /// Samples every slot.  Called once per frame.
    fn poll(&mut self) -> GamepadSlots;
}

impl<P: GamepadProvider + ?Sized> GamepadProvider for Box<P> {
    fn poll(&mut self) -> GamepadSlots {
        (**self).poll()
    }
}

/// Turns provider samples into `"gamepad"` envelopes.
pub struct GamepadSampler<P> {
    provider: P,
    change_gated: bool,
    last: Option<Vec<GamepadSnapshot>>,
    ticks: u64,
}

impl<P: GamepadProvider> GamepadSampler<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            change_gated: false,
            last: None,
            ticks: 0,
        }
    }

    /// Only publish when the snapshot differs from the previous publish.
    pub fn with_change_gate(mut self, gated: bool) -> Self {
        self.change_gated = gated;
        self
    }

    /// Number of ticks run so far, including empty ones.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Forgets the last published snapshot so the next tick publishes.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Samples once.
    pub fn tick(&mut self) -> Option<Envelope> {
        self.ticks += 1;

        let pads: Vec<GamepadSnapshot> = self.provider.poll().into_iter().flatten().collect();
        if pads.is_empty() {
            self.last = None;
            return None;
        }
        if self.change_gated && self.last.as_ref() == Some(&pads) {
            return None;
        }

        let envelope = Envelope::gamepad(&pads);
        self.last = Some(pads);
        Some(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxy_core::ButtonSnapshot;

    /// Replays a fixed list of samples, then reports empty slots.
    struct Scripted(Vec<GamepadSlots>);

    impl GamepadProvider for Scripted {
        fn poll(&mut self) -> GamepadSlots {
            if self.0.is_empty() {
                GamepadSlots::default()
            } else {
                self.0.remove(0)
            }
        }
    }

    fn pad(id: &str, index: u32, x: f64) -> GamepadSnapshot {
        GamepadSnapshot {
            id: id.into(),
            index,
            connected: true,
            axes: vec![x, 0.0],
            buttons: vec![ButtonSnapshot::default()],
            mapping: "standard".into(),
            timestamp: 0.0,
        }
    }

    fn slots(pads: &[(usize, GamepadSnapshot)]) -> GamepadSlots {
        let mut slots = GamepadSlots::default();
        for (i, p) in pads {
            slots[*i] = Some(p.clone());
        }
        slots
    }

    #[test]
    fn test_no_pads_never_publishes_but_keeps_ticking() {
        // Arrange
        let mut sampler = GamepadSampler::new(Scripted(Vec::new()));

        // Act
        let published: Vec<_> = (0..120).filter_map(|_| sampler.tick()).collect();

        // Assert
        assert!(published.is_empty());
        assert_eq!(sampler.ticks(), 120);
    }

    #[test]
    fn test_present_pads_are_published_in_slot_order_skipping_gaps() {
        let sample = slots(&[(2, pad("b", 2, 0.0)), (0, pad("a", 0, 0.0))]);
        let mut sampler = GamepadSampler::new(Scripted(vec![sample]));

        let envelope = sampler.tick().unwrap();

        assert_eq!(envelope.event_type(), "gamepad");
        let ids: Vec<_> = envelope
            .state()
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_unchanged_state_republishes_by_default() {
        let sample = slots(&[(0, pad("a", 0, 0.5))]);
        let mut sampler = GamepadSampler::new(Scripted(vec![sample.clone(), sample]));

        assert!(sampler.tick().is_some());
        assert!(sampler.tick().is_some());
    }

    #[test]
    fn test_change_gate_skips_identical_snapshots() {
        let still = slots(&[(0, pad("a", 0, 0.5))]);
        let moved = slots(&[(0, pad("a", 0, 0.7))]);
        let mut sampler = GamepadSampler::new(Scripted(vec![still.clone(), still, moved]))
            .with_change_gate(true);

        assert!(sampler.tick().is_some());
        assert!(sampler.tick().is_none());
        assert!(sampler.tick().is_some());
    }

    #[test]
    fn test_reset_reopens_the_change_gate() {
        let still = slots(&[(0, pad("a", 0, 0.5))]);
        let mut sampler = GamepadSampler::new(Scripted(vec![still.clone(), still]))
            .with_change_gate(true);
        sampler.tick();

        sampler.reset();

        assert!(sampler.tick().is_some());
    }
}
