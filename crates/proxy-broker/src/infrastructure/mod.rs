//! Infrastructure layer for proxy-broker.
//!
//! # Responsibilities
//!
//! - Binding the TCP listener and serving HTTP with `axum`
//! - Upgrading `/relay/:code` requests to WebSocket sessions
//! - Running one task per attached peer and the periodic slot sweep
//! - Stopping cleanly when the shutdown flag is cleared

pub mod http;

pub use http::{router, run_server, AppState};
