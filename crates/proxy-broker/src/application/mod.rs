//! Application layer for proxy-broker.
//!
//! Knows *what* the broker does with codes and peers, but not how bytes reach
//! a socket.
//!
//! # Responsibilities
//!
//! - Issuing pairing codes and tracking one slot per code
//! - Pairing exactly one receiver with one controller per slot
//! - Forwarding raw envelopes to the counterpart without inspecting them
//! - Expiring idle slots

pub mod rendezvous;

pub use rendezvous::{BrokerError, PeerId, PeerSender, Rendezvous};
