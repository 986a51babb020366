//! # proxy-transport
//!
//! Network adapters that plug into the collaborator traits of `proxy-core`:
//!
//! - [`endpoint::BrokerEndpoint`] – parses the broker address once and
//!   derives every URL the peers need from it.
//! - [`ws::WsTransport`] – a [`proxy_core::Transport`] that reaches the other
//!   peer through the broker's WebSocket relay.
//! - [`pairing::HttpPairingResolver`] – a [`proxy_core::PairingResolver`] that
//!   asks the broker for a fresh pairing code.
//!
//! Both the receiver and the controller binaries use this crate; the broker
//! does not.

pub mod endpoint;
pub mod pairing;
pub mod ws;

pub use endpoint::{BrokerEndpoint, EndpointError};
pub use pairing::{HttpPairingResolver, StaticResolver};
pub use ws::{TransportEvents, WsTransport};
