//! proxy-broker library crate.
//!
//! The broker is the rendezvous point for proxy controls: it issues pairing
//! codes and, when the peers cannot reach each other directly, relays their
//! envelopes over WebSocket.
//!
//! # Architecture
//!
//! ```text
//! receiver ──ws──┐                      ┌──ws── controller
//!                ▼                      ▼
//! [proxy-broker]
//!   ├── domain/          BrokerConfig, pairing-code generation
//!   ├── application/     Rendezvous: one slot per code, one peer per role
//!   └── infrastructure/  axum routes: GET /pair, GET /relay/:code, GET /health
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O.
//! - `application` owns the slot table; it talks to peers only through
//!   unbounded channels, so it can be tested without sockets.
//! - `infrastructure` owns the sockets and the HTTP server.

/// Domain layer: configuration and code generation.
pub mod domain;

/// Application layer: the rendezvous slot table.
pub mod application;

/// Infrastructure layer: the HTTP/WebSocket server.
pub mod infrastructure;
