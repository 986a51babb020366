//! Domain entities for proxy controls.
//!
//! Pure state with no I/O: nothing in here opens a socket, reads a clock or
//! spawns a task, so every rule can be unit-tested on its own.
//!
//! # What lives here? (for beginners)
//!
//! - [`pairing::PairingCode`] – the short string that names a rendezvous slot
//!   at the broker.  Once a connection attempt begins the code never changes.
//! - [`remote_state::RemoteState`] – the receiver's map from envelope type to
//!   the most recently received state for that type.  It is owned by exactly
//!   one receiver session and passed by reference to whoever reads it; there
//!   is no global instance.

pub mod pairing;
pub mod remote_state;
