//! Pairing overlays for the receiver.
//!
//! The overlay shows the pairing code while no controller is attached and
//! disappears once one connects.  On a terminal this is a single status line
//! that is redrawn in place.

use std::io::{self, Stdout, Write};

use proxy_core::{Overlay, OverlayMessage};
use tracing::warn;

/// ANSI: carriage return, then erase the whole line.
const CLEAR_LINE: &str = "\r\x1b[2K";

/// Draws the overlay as one status line on a terminal.
pub struct TerminalOverlay<W> {
    out: W,
}

impl TerminalOverlay<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalOverlay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn redraw(&mut self, text: &str) {
        let result = write!(self.out, "{CLEAR_LINE}{text}").and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!("could not draw overlay: {e}");
        }
    }
}

impl<W: Write + Send> Overlay for TerminalOverlay<W> {
    fn show(&mut self, message: &OverlayMessage) {
        self.redraw(&message.to_string());
    }

    fn hide(&mut self) {
        self.redraw("");
    }
}

/// Overlay used when `enable_overlay = false`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOverlay;

impl Overlay for NullOverlay {
    fn show(&mut self, _message: &OverlayMessage) {}
    fn hide(&mut self) {}
}

/// The overlay chosen at start-up.
pub enum ReceiverOverlay {
    Terminal(TerminalOverlay<Stdout>),
    Disabled(NullOverlay),
}

impl ReceiverOverlay {
    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            Self::Terminal(TerminalOverlay::stdout())
        } else {
            Self::Disabled(NullOverlay)
        }
    }
}

impl Overlay for ReceiverOverlay {
    fn show(&mut self, message: &OverlayMessage) {
        match self {
            Self::Terminal(o) => o.show(message),
            Self::Disabled(o) => o.show(message),
        }
    }

    fn hide(&mut self) {
        match self {
            Self::Terminal(o) => o.hide(),
            Self::Disabled(o) => o.hide(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxy_core::PairingCode;

    fn drawn(overlay: TerminalOverlay<Vec<u8>>) -> String {
        String::from_utf8(overlay.into_inner()).unwrap()
    }

    #[test]
    fn test_show_draws_pair_code_and_link() {
        // Arrange
        let mut overlay = TerminalOverlay::new(Vec::new());
        let message = OverlayMessage::PairCode {
            code: PairingCode::new("K7QP2M").unwrap(),
            connect_url: Some("http://broker:8080/#/connect".into()),
        };

        // Act
        overlay.show(&message);

        // Assert
        assert_eq!(
            drawn(overlay),
            "\r\x1b[2KPair code: \u{201c}K7QP2M\u{201d}  \u{203a} Connect: http://broker:8080/#/connect"
        );
    }

    #[test]
    fn test_hide_clears_the_line() {
        let mut overlay = TerminalOverlay::new(Vec::new());
        overlay.show(&OverlayMessage::Status("waiting".into()));
        overlay.hide();
        assert_eq!(drawn(overlay), "\r\x1b[2Kwaiting\r\x1b[2K");
    }
}
