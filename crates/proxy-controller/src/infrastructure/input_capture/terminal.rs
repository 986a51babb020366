//! Terminal key capture using `crossterm`.
//!
//! Puts the terminal in raw mode and, where the terminal supports the kitty
//! keyboard protocol, asks it to report key releases and repeats as distinct
//! events.  Keys are mapped to browser `KeyboardEvent.key` names.
//!
//! Terminals without release reporting only ever say "pressed".  There each
//! press is forwarded as a tap (press immediately followed by release) so no
//! key is ever left held on the receiver.
//!
//! Raw mode swallows the SIGINT that Ctrl+C would normally raise, so Ctrl+C
//! is reported as [`CaptureEvent::Interrupt`] instead.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    ModifierKeyCode, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use super::{CaptureError, CaptureEvent, InputSource};
use crate::application::KeyInput;

/// How long the capture thread blocks before re-checking the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Captures keys from the controlling terminal.
#[derive(Default)]
pub struct TerminalInputSource {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    raw_mode: bool,
    enhanced: bool,
}

impl TerminalInputSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputSource for TerminalInputSource {
    fn start(&mut self) -> Result<UnboundedReceiver<CaptureEvent>, CaptureError> {
        if self.thread.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }

        terminal::enable_raw_mode()?;
        self.raw_mode = true;

        self.enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if self.enhanced {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )?;
        }
        // Windows consoles report releases natively.
        let reports_release = self.enhanced || cfg!(windows);
        if !reports_release {
            warn!("terminal does not report key releases; key presses are sent as taps");
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.stop.store(false, Ordering::Relaxed);
        let stop = Arc::clone(&self.stop);
        self.thread = Some(std::thread::spawn(move || {
            capture_loop(&tx, &stop, reports_release);
        }));
        Ok(rx)
    }

    fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("key capture thread panicked");
            }
        }
        if self.enhanced {
            let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
            self.enhanced = false;
        }
        if self.raw_mode {
            if let Err(e) = terminal::disable_raw_mode() {
                warn!("could not restore terminal mode: {e}");
            }
            self.raw_mode = false;
        }
    }
}

impl Drop for TerminalInputSource {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture_loop(tx: &UnboundedSender<CaptureEvent>, stop: &AtomicBool, reports_release: bool) {
    while !stop.load(Ordering::Relaxed) {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                warn!("key capture stopped: {e}");
                return;
            }
        }
        let key = match event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(e) => {
                warn!("key capture stopped: {e}");
                return;
            }
        };
        for captured in translate(&key, reports_release) {
            if tx.send(captured).is_err() {
                debug!("key receiver dropped; capture thread exiting");
                return;
            }
        }
    }
}

// ── Key translation ───────────────────────────────────────────────────────────

/// Maps one terminal key event to zero or more capture events.
pub fn translate(key: &KeyEvent, reports_release: bool) -> Vec<CaptureEvent> {
    if key.kind == KeyEventKind::Press
        && key.code == KeyCode::Char('c')
        && key.modifiers.contains(KeyModifiers::CONTROL)
    {
        return vec![CaptureEvent::Interrupt];
    }
    let Some(name) = key_name(key.code) else {
        return Vec::new();
    };
    let pressed = || CaptureEvent::Key(KeyInput::Pressed(name.clone()));
    let released = || CaptureEvent::Key(KeyInput::Released(name.clone()));
    match key.kind {
        KeyEventKind::Press if reports_release => vec![pressed()],
        KeyEventKind::Press => vec![pressed(), released()],
        KeyEventKind::Release => vec![released()],
        KeyEventKind::Repeat => Vec::new(),
    }
}

/// Browser `KeyboardEvent.key` name for a terminal key code.
pub fn key_name(code: KeyCode) -> Option<String> {
    let name = match code {
        KeyCode::Char(c) => return Some(c.to_string()),
        KeyCode::F(n) => return Some(format!("F{n}")),
        KeyCode::Enter => "Enter",
        KeyCode::Esc => "Escape",
        KeyCode::Backspace => "Backspace",
        KeyCode::Tab | KeyCode::BackTab => "Tab",
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Delete => "Delete",
        KeyCode::Insert => "Insert",
        KeyCode::CapsLock => "CapsLock",
        KeyCode::Modifier(modifier) => match modifier {
            ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => "Shift",
            ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => "Control",
            ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => "Alt",
            ModifierKeyCode::LeftSuper
            | ModifierKeyCode::RightSuper
            | ModifierKeyCode::LeftMeta
            | ModifierKeyCode::RightMeta => "Meta",
            _ => return None,
        },
        _ => return None,
    };
    Some(name.to_string())
}
