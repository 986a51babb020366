//! Application layer use cases for the receiver.
//!
//! - **`receive_input`** – Couples the connection lifecycle with the remote
//!   state store: envelopes arriving while connected are ingested, pings are
//!   echoed back through the same session, and state is reset on close.

pub mod receive_input;

pub use receive_input::ReceiverSession;
