//! Rendezvous slot table.
//!
//! Each issued pairing code owns one slot.  A slot holds at most one receiver
//! and one controller; the protocol is strictly one-to-one.
//!
//! # Slot lifecycle (for beginners)
//!
//! ```text
//! issue_code ──► empty ──join──► half ──join──► paired
//!                  ▲               │  ▲            │
//!                  └─────leave─────┘  └───leave────┘
//! ```
//!
//! - When the second peer joins, *both* peers get `peer_joined`.
//! - When a peer leaves, the other one gets `peer_left` and the slot stays
//!   open, so the same code works for a reconnect.
//! - A slot with nobody attached is removed by [`Rendezvous::sweep`] once it
//!   has been idle for the code TTL.
//!
//! Peers are reached through unbounded channels of [`BrokerFrame`]; the
//! socket tasks on the other end of those channels live in the
//! infrastructure layer.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use proxy_core::{BrokerFrame, PairingCode, PairingCodeError, PeerRole};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::codes::generate_code;

/// Identifies one attached socket.
pub type PeerId = Uuid;

/// Channel the rendezvous uses to reach a peer's socket task.
pub type PeerSender = mpsc::UnboundedSender<BrokerFrame>;

/// Attempts at drawing an unused code before giving up.
const MAX_CODE_ATTEMPTS: usize = 32;

/// Reasons a broker operation is refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("unknown pairing code")]
    UnknownCode,

    #[error("the {0} role is already taken for this pairing code")]
    RoleTaken(PeerRole),

    #[error("could not issue an unused pairing code")]
    CodeSpaceExhausted,

    #[error(transparent)]
    InvalidCode(#[from] PairingCodeError),
}

struct Peer {
    id: PeerId,
    tx: PeerSender,
}

struct Slot {
    receiver: Option<Peer>,
    controller: Option<Peer>,
    /// When the slot last became empty.  `None` while a peer is attached.
    idle_since: Option<Instant>,
}

impl Slot {
    fn new(now: Instant) -> Self {
        Self {
            receiver: None,
            controller: None,
            idle_since: Some(now),
        }
    }

    fn peer(&self, role: PeerRole) -> Option<&Peer> {
        match role {
            PeerRole::Receiver => self.receiver.as_ref(),
            PeerRole::Controller => self.controller.as_ref(),
        }
    }

    fn peer_mut(&mut self, role: PeerRole) -> &mut Option<Peer> {
        match role {
            PeerRole::Receiver => &mut self.receiver,
            PeerRole::Controller => &mut self.controller,
        }
    }

    fn is_empty(&self) -> bool {
        self.receiver.is_none() && self.controller.is_none()
    }
}

/// The broker's table of rendezvous slots.
pub struct Rendezvous {
    slots: HashMap<PairingCode, Slot>,
    rng: StdRng,
}

impl Default for Rendezvous {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Rendezvous {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a caller-provided RNG, so tests get predictable codes.
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            slots: HashMap::new(),
            rng,
        }
    }

    /// Number of live slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn contains(&self, code: &PairingCode) -> bool {
        self.slots.contains_key(code)
    }

    /// Issues a fresh code and opens an empty slot for it.
    ///
    /// # Errors
    ///
    /// [`BrokerError::CodeSpaceExhausted`] if no unused code was found.
    pub fn issue_code(&mut self, now: Instant) -> Result<PairingCode, BrokerError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code(&mut self.rng)?;
            if !self.slots.contains_key(&code) {
                self.slots.insert(code.clone(), Slot::new(now));
                info!(%code, "pairing code issued");
                return Ok(code);
            }
        }
        Err(BrokerError::CodeSpaceExhausted)
    }

    /// Attaches a peer to the slot for `code`.
    ///
    /// If the counterpart is already attached, both sides are sent
    /// [`BrokerFrame::PeerJoined`].
    ///
    /// # Errors
    ///
    /// [`BrokerError::UnknownCode`] if no slot exists, or
    /// [`BrokerError::RoleTaken`] if another socket already holds `role`.
    pub fn join(
        &mut self,
        code: &PairingCode,
        role: PeerRole,
        tx: PeerSender,
    ) -> Result<PeerId, BrokerError> {
        let slot = self.slots.get_mut(code).ok_or(BrokerError::UnknownCode)?;
        if slot.peer(role).is_some() {
            return Err(BrokerError::RoleTaken(role));
        }

        let id = Uuid::new_v4();
        if let Some(other) = slot.peer(role.counterpart()) {
            let _ = other.tx.send(BrokerFrame::PeerJoined);
            let _ = tx.send(BrokerFrame::PeerJoined);
        }
        *slot.peer_mut(role) = Some(Peer { id, tx });
        slot.idle_since = None;

        debug!(%code, %role, %id, "peer attached");
        Ok(id)
    }

    /// Detaches peer `id` from `role` in the slot for `code`.
    ///
    /// A stale `id` (the role was re-taken since) is ignored.  The counterpart,
    /// if attached, is sent [`BrokerFrame::PeerLeft`].
    pub fn leave(&mut self, code: &PairingCode, role: PeerRole, id: PeerId, now: Instant) {
        let Some(slot) = self.slots.get_mut(code) else {
            return;
        };
        let holder = slot.peer_mut(role);
        if holder.as_ref().map(|p| p.id) != Some(id) {
            return;
        }
        *holder = None;

        if let Some(other) = slot.peer(role.counterpart()) {
            let _ = other.tx.send(BrokerFrame::PeerLeft);
        }
        if slot.is_empty() {
            slot.idle_since = Some(now);
        }
        debug!(%code, %role, %id, "peer detached");
    }

    /// Forwards one raw envelope from `from` to its counterpart.
    ///
    /// Returns `false` if there is nobody to deliver to; the payload is
    /// dropped, not queued.
    pub fn forward(&self, code: &PairingCode, from: PeerRole, payload: String) -> bool {
        let delivered = self
            .slots
            .get(code)
            .and_then(|slot| slot.peer(from.counterpart()))
            .map(|peer| peer.tx.send(BrokerFrame::Data { payload }).is_ok())
            .unwrap_or(false);
        if !delivered {
            debug!(%code, %from, "no counterpart attached, dropping payload");
        }
        delivered
    }

    /// Removes slots that have had no peers for at least `ttl`.
    ///
    /// Returns the number of slots removed.
    pub fn sweep(&mut self, now: Instant, ttl: Duration) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, slot| match slot.idle_since {
            Some(since) => now.saturating_duration_since(since) < ttl,
            None => true,
        });
        let removed = before - self.slots.len();
        if removed > 0 {
            info!(removed, remaining = self.slots.len(), "expired pairing codes swept");
        }
        removed
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
