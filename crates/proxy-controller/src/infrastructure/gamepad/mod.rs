//! Gamepad providers.
//!
//! - [`NoGamepads`] – reports every slot empty; used when no backend is
//!   compiled in.
//! - [`mock::MockGamepadProvider`] – slots set by the test.
//! - `gilrs_backend::GilrsProvider` – physical pads, behind the `gilrs`
//!   feature.

use crate::application::{GamepadProvider, GamepadSlots};

pub mod mock;

#[cfg(feature = "gilrs")]
pub mod gilrs_backend;

/// A provider that never sees a pad.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGamepads;

impl GamepadProvider for NoGamepads {
    fn poll(&mut self) -> GamepadSlots {
        GamepadSlots::default()
    }
}

/// The best provider available in this build.
pub fn default_provider() -> Box<dyn GamepadProvider> {
    #[cfg(feature = "gilrs")]
    {
        match gilrs_backend::GilrsProvider::new() {
            Ok(provider) => return Box::new(provider),
            Err(e) => tracing::warn!("gamepads unavailable: {e}"),
        }
    }
    Box::new(NoGamepads)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_gamepads_reports_empty_slots() {
        let mut provider = NoGamepads;
        assert!(provider.poll().iter().all(Option::is_none));
    }
}
