//! Physical gamepads through `gilrs`.
//!
//! Pads are reported in the W3C "standard" layout: four stick axes with Y
//! pointing down, then seventeen buttons in standard order.  `timestamp` is
//! the time of the pad's last event in milliseconds since the provider
//! started, or `0.0` before its first event.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::SystemTime;

use gilrs::{Axis, Button, Gamepad, GamepadId, Gilrs};
use proxy_core::{ButtonSnapshot, GamepadSnapshot, MAX_GAMEPADS};

use crate::application::{GamepadProvider, GamepadSlots};

/// Standard-mapping button order.
const STANDARD_BUTTONS: [Button; 17] = [
    Button::South,
    Button::East,
    Button::West,
    Button::North,
    Button::LeftTrigger,
    Button::RightTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
    Button::Mode,
];

#[derive(Debug, thiserror::Error)]
#[error("could not initialise gamepad support: {0}")]
pub struct GilrsInitError(String);

pub struct GilrsProvider {
    gilrs: Gilrs,
    updates: LastUpdate<GamepadId>,
}

/// Last event time per pad.
struct LastUpdate<K> {
    started: SystemTime,
    millis: HashMap<K, f64>,
}

impl<K: Eq + Hash> LastUpdate<K> {
    fn new(started: SystemTime) -> Self {
        Self {
            started,
            millis: HashMap::new(),
        }
    }

    fn record(&mut self, id: K, at: SystemTime) {
        let elapsed = at.duration_since(self.started).unwrap_or_default();
        self.millis.insert(id, elapsed.as_secs_f64() * 1000.0);
    }

    fn millis(&self, id: &K) -> f64 {
        self.millis.get(id).copied().unwrap_or(0.0)
    }
}

impl GilrsProvider {
    /// # Errors
    ///
    /// Fails when the platform gamepad API cannot be opened.
    pub fn new() -> Result<Self, GilrsInitError> {
        let gilrs = Gilrs::new().map_err(|e| GilrsInitError(e.to_string()))?;
        Ok(Self {
            gilrs,
            updates: LastUpdate::new(SystemTime::now()),
        })
    }
}

impl GamepadProvider for GilrsProvider {
    fn poll(&mut self) -> GamepadSlots {
        // Drain pending events so cached pad state is current.
        while let Some(event) = self.gilrs.next_event() {
            self.updates.record(event.id, event.time);
        }

        let mut slots = GamepadSlots::default();
        for (slot, (id, pad)) in self.gilrs.gamepads().take(MAX_GAMEPADS).enumerate() {
            slots[slot] = Some(snapshot(slot, &pad, self.updates.millis(&id)));
        }
        slots
    }
}

fn snapshot(slot: usize, pad: &Gamepad<'_>, timestamp: f64) -> GamepadSnapshot {
    let axes = vec![
        f64::from(pad.value(Axis::LeftStickX)),
        -f64::from(pad.value(Axis::LeftStickY)),
        f64::from(pad.value(Axis::RightStickX)),
        -f64::from(pad.value(Axis::RightStickY)),
    ];
    let buttons = STANDARD_BUTTONS
        .iter()
        .map(|&button| ButtonSnapshot {
            pressed: pad.is_pressed(button),
            value: pad
                .button_data(button)
                .map_or(0.0, |data| f64::from(data.value())),
        })
        .collect();

    GamepadSnapshot {
        id: pad.name().to_string(),
        index: slot as u32,
        connected: pad.is_connected(),
        axes,
        buttons,
        mapping: "standard".to_string(),
        timestamp,
    }
}
