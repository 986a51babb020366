//! Domain layer for proxy-broker.
//!
//! Plain configuration and the pairing-code generator.  Nothing here touches
//! the network or the clock.

pub mod codes;
pub mod config;

pub use codes::{generate_code, CODE_ALPHABET, CODE_LEN};
pub use config::BrokerConfig;
