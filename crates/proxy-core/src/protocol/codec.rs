//! JSON codec for relay envelopes.
//!
//! Wire format (UTF-8 JSON text, one envelope per transport message):
//! ```text
//! {"type": "<non-empty string>", "state": <any JSON value>}
//! ```
//! `state` is opaque.  No size limit, ordering or schema is imposed on it, so
//! new input device types need no protocol change.  A missing `state` decodes
//! as `null`.  Unknown top-level keys are ignored.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::protocol::envelope::Envelope;

/// Reasons an envelope is rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnvelopeError {
    /// The raw text is not valid JSON.
    #[error("malformed envelope: {0}")]
    InvalidJson(String),

    /// The JSON value is not an object.
    #[error("malformed envelope: expected a JSON object")]
    NotAnObject,

    /// `type` is absent or empty.
    #[error("malformed envelope: missing event type")]
    MissingType,

    /// `type` is present but not a string.
    #[error("malformed envelope: event type must be a string")]
    TypeNotString,

    /// The envelope could not be written as JSON text.
    #[error("envelope serialization failed: {0}")]
    Serialize(String),
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes an [`Envelope`] as JSON text ready for the transport.
///
/// # Errors
///
/// Returns [`EnvelopeError::Serialize`] if JSON serialization fails.
///
/// # Examples
///
/// ```rust
/// use proxy_core::{decode_envelope, encode_envelope, Envelope};
/// use serde_json::json;
///
/// let env = Envelope::new("laser", json!({"on": true})).unwrap();
/// let text = encode_envelope(&env).unwrap();
/// assert_eq!(decode_envelope(&text).unwrap(), env);
/// ```
pub fn encode_envelope(envelope: &Envelope) -> Result<String, EnvelopeError> {
    serde_json::to_string(envelope).map_err(|e| EnvelopeError::Serialize(e.to_string()))
}

/// Decodes one envelope from raw transport text.
///
/// # Errors
///
/// Returns an [`EnvelopeError`] describing why the text is not a valid
/// envelope.  Callers log and drop; a rejected envelope is never fatal.
pub fn decode_envelope(raw: &str) -> Result<Envelope, EnvelopeError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| EnvelopeError::InvalidJson(e.to_string()))?;
    decode_value(value)
}

/// Decodes one envelope from an already-parsed JSON value.
///
/// # Errors
///
/// Same rejections as [`decode_envelope`] minus [`EnvelopeError::InvalidJson`].
pub fn decode_value(value: Value) -> Result<Envelope, EnvelopeError> {
    let Value::Object(mut fields) = value else {
        return Err(EnvelopeError::NotAnObject);
    };

    let event_type = take_event_type(&mut fields)?;
    let state = fields.remove("state").unwrap_or(Value::Null);
    Envelope::new(event_type, state)
}

fn take_event_type(fields: &mut Map<String, Value>) -> Result<String, EnvelopeError> {
    match fields.remove("type") {
        None | Some(Value::Null) => Err(EnvelopeError::MissingType),
        Some(Value::String(s)) if s.is_empty() => Err(EnvelopeError::MissingType),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(EnvelopeError::TypeNotString),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
