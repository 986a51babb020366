//! Domain layer for the receiver.
//!
//! Pure data with no I/O.  The configuration file loader that fills
//! [`ReceiverConfig`] from disk lives in the infrastructure layer.

pub mod config;

pub use config::ReceiverConfig;
