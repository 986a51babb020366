//! Frames exchanged between a peer and the rendezvous broker.
//!
//! The broker runs the WebSocket fallback path: both peers connect to
//! `/relay/{code}`, and the broker forwards envelopes between them.  Peers
//! send raw envelope text; the broker wraps everything it sends back in a
//! [`BrokerFrame`] so lifecycle notifications and data share one socket.
//!
//! # Message flow
//!
//! ```text
//! Controller → Broker:  {"type":"keyboard","state":["a"]}          (raw envelope)
//! Broker → Receiver:    {"kind":"data","payload":"{\"type\":...}"} (BrokerFrame)
//! ```
//!
//! The payload stays a string so the broker never has to parse, re-encode or
//! reorder anything inside the envelope.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which side of the session a peer plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerRole {
    /// Runs the application and owns the remote state store.
    Receiver,
    /// Captures local input and publishes envelopes.
    Controller,
}

impl PeerRole {
    /// The role on the other end of the session.
    pub fn counterpart(self) -> Self {
        match self {
            PeerRole::Receiver => PeerRole::Controller,
            PeerRole::Controller => PeerRole::Receiver,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PeerRole::Receiver => "receiver",
            PeerRole::Controller => "controller",
        }
    }
}

impl fmt::Display for PeerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "receiver" => Ok(PeerRole::Receiver),
            "controller" => Ok(PeerRole::Controller),
            other => Err(format!("unknown peer role: {other:?}")),
        }
    }
}

/// Broker → peer frame.
///
/// # Serde representation
///
/// ```json
/// {"kind":"peer_joined"}
/// {"kind":"peer_left"}
/// {"kind":"rejected","reason":"unknown pairing code"}
/// {"kind":"data","payload":"{\"type\":\"ping\",\"state\":1}"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BrokerFrame {
    /// The counterpart is now attached to the same slot.
    PeerJoined,
    /// The counterpart detached; the slot stays open for it to return.
    PeerLeft,
    /// The join was refused.  The broker closes the socket after this frame.
    Rejected { reason: String },
    /// An envelope from the counterpart, verbatim.
    Data { payload: String },
}

/// Body of a successful `GET /pair` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairResponse {
    #[serde(rename = "pairCode")]
    pub pair_code: String,
}
