//! Remote state store: the receiver-side reducer.
//!
//! Every envelope that reaches the receiver goes through [`RemoteState::ingest`]:
//!
//! 1. Decode.  Malformed input is rejected and logged at `debug`; the store
//!    is not touched.
//! 2. `"ping"` is a heartbeat.  It is handed back as [`IngestOutcome::Echo`]
//!    so the caller can send it straight back, and is never stored.
//! 3. Anything else overwrites the entry for its type (last write wins).  No
//!    merging of partial payloads, no sequence numbers.
//!
//! The store performs no I/O; the caller owns the transport and decides what
//! to do with each outcome.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::protocol::codec::{decode_envelope, EnvelopeError};
use crate::protocol::envelope::{event_types, Envelope, RelayEvent};
use crate::protocol::snapshot::{GamepadSnapshot, KeyboardSnapshot};

/// What [`RemoteState::ingest`] did with one message.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// The state for this type was replaced.
    Stored(String),
    /// A heartbeat that must be sent back unchanged.
    Echo(Envelope),
    /// The message was malformed and dropped.
    Rejected(EnvelopeError),
}

/// Latest received state per envelope type.
#[derive(Debug, Clone, Default)]
pub struct RemoteState {
    entries: HashMap<String, Value>,
}

impl RemoteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `raw` and applies it.
    pub fn ingest(&mut self, raw: &str) -> IngestOutcome {
        match decode_envelope(raw) {
            Ok(envelope) => self.apply(envelope),
            Err(e) => {
                debug!("dropping malformed envelope: {e}");
                IngestOutcome::Rejected(e)
            }
        }
    }

    /// Applies an already-decoded envelope.
    pub fn apply(&mut self, envelope: Envelope) -> IngestOutcome {
        match envelope.into_event() {
            RelayEvent::Ping(state) => IngestOutcome::Echo(Envelope::ping(state)),
            RelayEvent::Keyboard(state) => self.store(event_types::KEYBOARD.to_string(), state),
            RelayEvent::Gamepad(state) => self.store(event_types::GAMEPAD.to_string(), state),
            RelayEvent::Extension { name, state } => self.store(name, state),
        }
    }

    fn store(&mut self, event_type: String, state: Value) -> IngestOutcome {
        self.entries.insert(event_type.clone(), state);
        IngestOutcome::Stored(event_type)
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    /// The pressed keys from the latest `"keyboard"` state, or an empty set.
    pub fn keyboard(&self) -> KeyboardSnapshot {
        self.entries
            .get(event_types::KEYBOARD)
            .map(KeyboardSnapshot::from_value)
            .unwrap_or_default()
    }

    /// Gamepad `index` from the latest `"gamepad"` state.
    ///
    /// Returns `None` when no gamepad state was received, the index is out of
    /// range, or the element is not a gamepad record.
    pub fn gamepad(&self, index: usize) -> Option<GamepadSnapshot> {
        self.entries
            .get(event_types::GAMEPAD)?
            .as_array()?
            .get(index)
            .and_then(GamepadSnapshot::from_value)
    }

    /// The exact stored state for `event_type`.
    pub fn get(&self, event_type: &str) -> Option<&Value> {
        self.entries.get(event_type)
    }

    /// Types that currently have a stored state, in no particular order.
    pub fn event_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forgets every stored state.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
