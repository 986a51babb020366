//! End-to-end tests: the real transport adapters against a real broker.
//!
//! Each test starts the broker router on an ephemeral loopback port, asks it
//! for a pairing code over HTTP, and attaches `WsTransport`s as receiver and
//! controller.

use std::time::Duration;

use proxy_broker::domain::BrokerConfig;
use proxy_broker::infrastructure::{router, AppState};
use proxy_core::{
    Envelope, PairingCode, PairingResolver, PeerRole, Transport, TransportErrorKind,
    TransportEvent,
};
use proxy_transport::{BrokerEndpoint, HttpPairingResolver, TransportEvents, WsTransport};
use serde_json::json;

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

async fn spawn_broker() -> BrokerEndpoint {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(AppState::new(BrokerConfig::default()));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    BrokerEndpoint::parse(&format!("http://{addr}")).unwrap()
}

async fn next(events: &mut TransportEvents) -> TransportEvent {
    tokio::time::timeout(STEP_TIMEOUT, events.recv())
        .await
        .expect("timed out waiting for a transport event")
        .expect("event stream ended")
}

#[tokio::test]
async fn test_receiver_and_controller_pair_and_exchange_envelopes() {
    // Arrange
    let endpoint = spawn_broker().await;
    let code = HttpPairingResolver::new(&endpoint).resolve().await.unwrap();
    let (mut receiver, mut receiver_events) =
        WsTransport::new(endpoint.clone(), PeerRole::Receiver);
    let (mut controller, mut controller_events) =
        WsTransport::new(endpoint, PeerRole::Controller);

    // Act: both sides join the slot
    receiver.open(&code).unwrap();
    // Give the receiver a head start so the join order is deterministic.
    tokio::time::sleep(Duration::from_millis(50)).await;
    controller.open(&code).unwrap();

    // Assert: both see the other arrive
    assert_eq!(next(&mut receiver_events).await, TransportEvent::Connect);
    assert_eq!(next(&mut controller_events).await, TransportEvent::Connect);

    // Controller → receiver
    let keys = Envelope::new("keyboard", json!(["a"])).unwrap();
    controller.send(&keys).unwrap();
    assert_eq!(
        next(&mut receiver_events).await,
        TransportEvent::Data(r#"{"type":"keyboard","state":["a"]}"#.into())
    );

    // Receiver → controller (heartbeat echo direction)
    receiver.send(&Envelope::ping(json!({"sent_at_ms": 1}))).unwrap();
    assert_eq!(
        next(&mut controller_events).await,
        TransportEvent::Data(r#"{"type":"ping","state":{"sent_at_ms":1}}"#.into())
    );
}

#[tokio::test]
async fn test_slot_survives_controller_reconnect() {
    let endpoint = spawn_broker().await;
    let code = HttpPairingResolver::new(&endpoint).resolve().await.unwrap();
    let (mut receiver, mut receiver_events) =
        WsTransport::new(endpoint.clone(), PeerRole::Receiver);
    let (mut controller, mut controller_events) =
        WsTransport::new(endpoint, PeerRole::Controller);

    receiver.open(&code).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    controller.open(&code).unwrap();
    assert_eq!(next(&mut receiver_events).await, TransportEvent::Connect);
    assert_eq!(next(&mut controller_events).await, TransportEvent::Connect);

    // Controller drops off: the receiver is told, the slot stays.
    controller.close();
    assert_eq!(next(&mut receiver_events).await, TransportEvent::Disconnect);

    // Same code, second attempt.
    controller.open(&code).unwrap();
    assert_eq!(next(&mut receiver_events).await, TransportEvent::Connect);
    assert_eq!(next(&mut controller_events).await, TransportEvent::Connect);
}

#[tokio::test]
async fn test_unknown_code_is_rejected() {
    let endpoint = spawn_broker().await;
    let (mut receiver, mut events) = WsTransport::new(endpoint, PeerRole::Receiver);

    receiver.open(&PairingCode::new("ZZZZZZ").unwrap()).unwrap();

    match next(&mut events).await {
        TransportEvent::Error(e) => {
            assert_eq!(e.kind, TransportErrorKind::Rejected);
            assert_eq!(e.message, "unknown pairing code");
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_second_receiver_on_same_code_is_rejected() {
    let endpoint = spawn_broker().await;
    let code = HttpPairingResolver::new(&endpoint).resolve().await.unwrap();
    let (mut first, _first_events) = WsTransport::new(endpoint.clone(), PeerRole::Receiver);
    let (mut second, mut second_events) = WsTransport::new(endpoint, PeerRole::Receiver);

    first.open(&code).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    second.open(&code).unwrap();

    match next(&mut second_events).await {
        TransportEvent::Error(e) => assert_eq!(e.kind, TransportErrorKind::Rejected),
        other => panic!("expected a rejection, got {other:?}"),
    }
}
