//! Overlay that writes to the log.

use proxy_core::{Overlay, OverlayMessage};
use tracing::{debug, info};

/// Reports pairing status through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOverlay;

impl Overlay for LogOverlay {
    fn show(&mut self, message: &OverlayMessage) {
        match message {
            OverlayMessage::PairCode { code, .. } => {
                info!(%code, "waiting for the receiver to join");
            }
            OverlayMessage::Status(text) => info!("{text}"),
        }
    }

    fn hide(&mut self) {
        debug!("overlay hidden");
    }
}
