//! The `{type, state}` message unit and its typed view.
//!
//! An [`Envelope`] always carries a non-empty `type`.  The constructor is the
//! only way to build one from arbitrary input, so every envelope that exists
//! in memory is already valid and can be sent without further checks.
//!
//! [`RelayEvent`] is the typed view used for dispatch: the three reserved
//! types get their own variant and everything else is an
//! [`RelayEvent::Extension`] that keeps its name and payload untouched.

use serde::Serialize;
use serde_json::Value;

use crate::protocol::codec::EnvelopeError;
use crate::protocol::snapshot::{gamepads_to_value, GamepadSnapshot, KeyboardSnapshot};

/// Reserved envelope type names.
pub mod event_types {
    /// State is the list (or map) of pressed key identifiers.
    pub const KEYBOARD: &str = "keyboard";
    /// State is the ordered list of gamepad snapshots.
    pub const GAMEPAD: &str = "gamepad";
    /// Heartbeat; the receiver echoes it verbatim and never stores it.
    pub const PING: &str = "ping";
}

// ── Envelope ──────────────────────────────────────────────────────────────────

/// One message on the relay channel.
///
/// Serializes as `{"type": "<event_type>", "state": <state>}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    event_type: String,
    state: Value,
}

impl Envelope {
    /// Builds an envelope for an arbitrary event type.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::MissingType`] if `event_type` is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use proxy_core::Envelope;
    /// use serde_json::json;
    ///
    /// let env = Envelope::new("laser", json!({"on": true})).unwrap();
    /// assert_eq!(env.event_type(), "laser");
    /// assert!(Envelope::new("", json!(null)).is_err());
    /// ```
    pub fn new(event_type: impl Into<String>, state: Value) -> Result<Self, EnvelopeError> {
        let event_type = event_type.into();
        if event_type.is_empty() {
            return Err(EnvelopeError::MissingType);
        }
        Ok(Self { event_type, state })
    }

    /// Builds a `"keyboard"` envelope carrying the full pressed-key set.
    pub fn keyboard(keys: &KeyboardSnapshot) -> Self {
        Self::reserved(event_types::KEYBOARD, keys.to_value())
    }

    /// Builds a `"gamepad"` envelope carrying every present slot.
    pub fn gamepad(pads: &[GamepadSnapshot]) -> Self {
        Self::reserved(event_types::GAMEPAD, gamepads_to_value(pads))
    }

    /// Builds a `"ping"` envelope.
    pub fn ping(state: Value) -> Self {
        Self::reserved(event_types::PING, state)
    }

    fn reserved(event_type: &'static str, state: Value) -> Self {
        Self {
            event_type: event_type.to_string(),
            state,
        }
    }

    /// The envelope's type name.  Never empty.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The opaque payload.
    pub fn state(&self) -> &Value {
        &self.state
    }

    pub fn is_ping(&self) -> bool {
        self.event_type == event_types::PING
    }

    /// Splits the envelope into `(type, state)`.
    pub fn into_parts(self) -> (String, Value) {
        (self.event_type, self.state)
    }

    /// Converts into the typed dispatch view.
    pub fn into_event(self) -> RelayEvent {
        RelayEvent::from(self)
    }
}

// ── RelayEvent ────────────────────────────────────────────────────────────────

/// Typed dispatch over reserved envelope types.
///
/// Payloads stay as raw JSON values in every variant; interpreting them is
/// left to whoever reads the state (see [`KeyboardSnapshot::from_value`] and
/// [`GamepadSnapshot::from_value`]).
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    Keyboard(Value),
    Gamepad(Value),
    Ping(Value),
    /// Any application-defined type, passed through unmodified.
    Extension { name: String, state: Value },
}

impl RelayEvent {
    /// The wire type name of this event.
    pub fn event_type(&self) -> &str {
        match self {
            RelayEvent::Keyboard(_) => event_types::KEYBOARD,
            RelayEvent::Gamepad(_) => event_types::GAMEPAD,
            RelayEvent::Ping(_) => event_types::PING,
            RelayEvent::Extension { name, .. } => name,
        }
    }

    /// The payload of this event.
    pub fn state(&self) -> &Value {
        match self {
            RelayEvent::Keyboard(state)
            | RelayEvent::Gamepad(state)
            | RelayEvent::Ping(state)
            | RelayEvent::Extension { state, .. } => state,
        }
    }

    /// Converts back into an envelope.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::MissingType`] for an extension with an empty
    /// name.  Events produced from an envelope never have one.
    pub fn into_envelope(self) -> Result<Envelope, EnvelopeError> {
        match self {
            RelayEvent::Keyboard(state) => Ok(Envelope::reserved(event_types::KEYBOARD, state)),
            RelayEvent::Gamepad(state) => Ok(Envelope::reserved(event_types::GAMEPAD, state)),
            RelayEvent::Ping(state) => Ok(Envelope::ping(state)),
            RelayEvent::Extension { name, state } => Envelope::new(name, state),
        }
    }
}

impl From<Envelope> for RelayEvent {
    fn from(envelope: Envelope) -> Self {
        let (event_type, state) = envelope.into_parts();
        match event_type.as_str() {
            event_types::KEYBOARD => RelayEvent::Keyboard(state),
            event_types::GAMEPAD => RelayEvent::Gamepad(state),
            event_types::PING => RelayEvent::Ping(state),
            _ => RelayEvent::Extension {
                name: event_type,
                state,
            },
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
