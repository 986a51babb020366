//! Protocol module containing the envelope type, the JSON codec, the input
//! snapshot payloads and the broker relay frames.

pub mod codec;
pub mod envelope;
pub mod relay;
pub mod snapshot;

pub use codec::{decode_envelope, decode_value, encode_envelope, EnvelopeError};
pub use envelope::*;
pub use relay::{BrokerFrame, PairResponse, PeerRole};
pub use snapshot::{gamepads_to_value, ButtonSnapshot, GamepadSnapshot, KeyboardSnapshot, MAX_GAMEPADS};
