//! Integration tests for the envelope codec and the remote state store.
//!
//! These go through the public API only, the way a receiver or a controller
//! built on this crate would use it.

use proxy_core::{
    decode_envelope, encode_envelope, EnvelopeError, Envelope, GamepadSnapshot, IngestOutcome,
    KeyboardSnapshot, RelayEvent, RemoteState,
};
use serde_json::{json, Value};

#[test]
fn test_every_non_ping_envelope_is_readable_by_type_after_ingest() {
    let samples = [
        ("keyboard", json!(["a", "Shift"])),
        ("gamepad", json!([{"id": "pad1"}])),
        ("laser", json!({"x": 1.5, "y": -2})),
        ("text", json!("hello")),
        ("nothing", Value::Null),
    ];

    let mut store = RemoteState::new();
    for (event_type, state) in samples {
        let raw = encode_envelope(&Envelope::new(event_type, state.clone()).unwrap()).unwrap();

        let outcome = store.ingest(&raw);

        assert_eq!(outcome, IngestOutcome::Stored(event_type.to_string()));
        assert_eq!(store.get(event_type), Some(&state), "type {event_type}");
    }
}

#[test]
fn test_ping_produces_exactly_one_echo_and_no_state() {
    let mut store = RemoteState::new();
    store.ingest(r#"{"type":"laser","state":1}"#);

    let outcome = store.ingest(r#"{"type":"ping","state":{"sent_at_ms":99}}"#);

    let IngestOutcome::Echo(echo) = outcome else {
        panic!("expected an echo, got {outcome:?}");
    };
    assert_eq!(
        encode_envelope(&echo).unwrap(),
        r#"{"type":"ping","state":{"sent_at_ms":99}}"#
    );
    assert_eq!(store.len(), 1);
}

#[test]
fn test_malformed_inputs_never_touch_the_store() {
    let mut store = RemoteState::new();
    store.ingest(r#"{"type":"keyboard","state":["a"]}"#);

    for raw in [
        r#"{"state":"x"}"#,
        r#"{"type":"","state":"x"}"#,
        r#"{"type":7,"state":"x"}"#,
        r#"["keyboard"]"#,
        "not json at all",
    ] {
        assert!(
            matches!(store.ingest(raw), IngestOutcome::Rejected(_)),
            "{raw} must be rejected"
        );
    }

    assert_eq!(store.len(), 1);
    assert_eq!(store.keyboard(), ["a"].into_iter().collect::<KeyboardSnapshot>());
}

#[test]
fn test_gamepad_envelope_from_controller_is_readable_by_receiver() {
    // Arrange: what the controller sends
    let pad = GamepadSnapshot {
        id: "pad1".into(),
        index: 0,
        connected: true,
        axes: vec![0.0, 1.0],
        buttons: vec![],
        mapping: "standard".into(),
        timestamp: 10.0,
    };
    let raw = encode_envelope(&Envelope::gamepad(&[pad.clone()])).unwrap();

    // Act
    let mut store = RemoteState::new();
    store.ingest(&raw);

    // Assert
    assert_eq!(store.gamepad(0), Some(pad));
    assert_eq!(store.gamepad(1), None);
}

#[test]
fn test_decoded_envelope_dispatches_to_extension() {
    let env = decode_envelope(r#"{"type":"joystick3d","state":[0,0,1]}"#).unwrap();
    assert_eq!(
        env.into_event(),
        RelayEvent::Extension {
            name: "joystick3d".into(),
            state: json!([0, 0, 1])
        }
    );
}

#[test]
fn test_encode_refuses_to_build_untyped_envelope() {
    assert_eq!(
        Envelope::new(String::new(), json!("x")).unwrap_err(),
        EnvelopeError::MissingType
    );
}
