//! Input snapshot payloads carried inside reserved envelopes.
//!
//! A snapshot is a *copy* of device state taken at sample time.  Device
//! handles never leave the controller; only these plain serializable values
//! do.
//!
//! The field names match what browser-based controllers already send, so a
//! receiver built on this crate accepts payloads from either kind of peer.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Number of gamepad slots sampled per tick.
pub const MAX_GAMEPADS: usize = 4;

// ── Keyboard ──────────────────────────────────────────────────────────────────

/// The set of currently pressed keys, by browser `KeyboardEvent.key` value.
///
/// On the wire this is a JSON array of strings.  A `BTreeSet` keeps the
/// encoding deterministic, which makes logs and tests easier to read; the
/// receiver treats the set as unordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyboardSnapshot {
    keys: BTreeSet<String>,
}

impl KeyboardSnapshot {
    /// Creates an empty snapshot (no keys pressed).
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as pressed.  Returns `false` if it was already pressed.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    /// Marks `key` as released.  Returns `false` if it was not pressed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.keys.remove(key)
    }

    /// Returns `true` if `key` is currently pressed.
    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Releases every key.
    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Iterates over the pressed keys in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Encodes the snapshot as its wire value: a JSON array of key strings.
    pub fn to_value(&self) -> Value {
        Value::Array(self.keys.iter().cloned().map(Value::String).collect())
    }

    /// Reads a keyboard payload leniently.
    ///
    /// Two shapes are accepted:
    ///
    /// - `["Shift", "a"]` – a list of pressed keys (non-string items skipped)
    /// - `{"Shift": true, "a": true}` – a map whose truthy values mark
    ///   pressed keys
    ///
    /// Anything else yields an empty snapshot.  State payloads are opaque on
    /// the wire, so a malformed keyboard state is never an error here.
    pub fn from_value(value: &Value) -> Self {
        let keys = match value {
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            Value::Object(map) => map
                .iter()
                .filter(|(_, pressed)| is_truthy(pressed))
                .map(|(key, _)| key.clone())
                .collect(),
            _ => BTreeSet::new(),
        };
        Self { keys }
    }
}

impl<S: Into<String>> FromIterator<S> for KeyboardSnapshot {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// ── Gamepad ───────────────────────────────────────────────────────────────────

/// State of a single gamepad button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ButtonSnapshot {
    /// Whether the button is considered pressed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub pressed: bool,
    /// Analog value in `0.0..=1.0`; digital buttons report `0.0` or `1.0`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: f64,
}

/// A by-value copy of one gamepad slot.
///
/// Only `id` is required when reading a snapshot from the wire.  Every other
/// field falls back to its default when missing or `null`, and `null` axis
/// or button entries read as zero.  Browsers serialise `NaN` as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamepadSnapshot {
    /// Device description reported by the platform (e.g. `"Xbox Controller"`).
    pub id: String,
    /// Slot index in `0..MAX_GAMEPADS`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub index: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub connected: bool,
    /// Axis positions in `-1.0..=1.0`, in device order.
    #[serde(default, deserialize_with = "nullable_items")]
    pub axes: Vec<f64>,
    /// Buttons in device order.
    #[serde(default, deserialize_with = "nullable_items")]
    pub buttons: Vec<ButtonSnapshot>,
    /// Layout name; `"standard"` when the device uses the standard mapping.
    #[serde(default, deserialize_with = "null_as_default")]
    pub mapping: String,
    /// Milliseconds timestamp of the last device update.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp: f64,
}

impl GamepadSnapshot {
    /// Encodes the snapshot as a JSON object value.
    pub fn to_value(&self) -> Value {
        let buttons: Vec<Value> = self
            .buttons
            .iter()
            .map(|b| serde_json::json!({ "pressed": b.pressed, "value": b.value }))
            .collect();
        serde_json::json!({
            "id": self.id,
            "index": self.index,
            "connected": self.connected,
            "axes": self.axes,
            "buttons": buttons,
            "mapping": self.mapping,
            "timestamp": self.timestamp,
        })
    }

    /// Reads one gamepad record, returning `None` if it is not shaped like one.
    pub fn from_value(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A list whose `null` entries (or a `null` list) read as defaults.
fn nullable_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    let items = Option::<Vec<Option<T>>>::deserialize(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

/// Encodes a list of gamepad snapshots as the `"gamepad"` envelope state.
pub fn gamepads_to_value(pads: &[GamepadSnapshot]) -> Value {
    Value::Array(pads.iter().map(GamepadSnapshot::to_value).collect())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
