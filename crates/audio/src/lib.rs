//! Sweetspot Audio
//!
//! Actuation side of the tracker: a narrow `AudioBackend` capability with
//! two concrete implementations, both driving macOS UI automation through
//! `osascript`:
//!
//! - **System audio:** the balance slider in the system volume UI
//! - **eqMac:** the third-party equalizer's balance control
//!
//! A `BalanceRouter` owns both and dispatches on the active `BalanceMode`.
//! Actuation is best-effort: failures are returned to the caller, which
//! logs and lets the next cycle retry naturally.

pub mod eqmac;
pub mod script;
pub mod system;

use sweetspot_common::error::SweetspotResult;
use sweetspot_engine_core::BalanceMode;

pub use eqmac::EqMacBackend;
pub use system::SystemAudioBackend;

/// Trait for balance actuation backends.
pub trait AudioBackend: Send {
    /// Apply a balance command in [-1.0, 1.0] (-1 full left, +1 full right).
    fn set_balance(&mut self, balance: f64) -> SweetspotResult<()>;

    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Check if the backend can actuate on this system.
    fn is_available(&self) -> bool;
}

/// Convert a [-1.0, 1.0] balance command to the 0–100 slider scale the
/// AppleScript interfaces expect (0 full left, 50 centered, 100 full right).
pub fn balance_to_slider(balance: f64) -> i32 {
    ((balance.clamp(-1.0, 1.0) + 1.0) * 50.0).round() as i32
}

/// Routes balance commands to one of the two backends by mode.
pub struct BalanceRouter {
    system: Box<dyn AudioBackend>,
    eqmac: Box<dyn AudioBackend>,
}

impl BalanceRouter {
    /// A router over explicit backends.
    pub fn new(system: Box<dyn AudioBackend>, eqmac: Box<dyn AudioBackend>) -> Self {
        Self { system, eqmac }
    }

    /// A router over the real osascript-driven backends.
    pub fn with_defaults() -> Self {
        Self::new(
            Box::new(SystemAudioBackend::new()),
            Box::new(EqMacBackend::new()),
        )
    }

    /// Forward a balance command to the backend selected by `mode`.
    pub fn set_balance(&mut self, balance: f64, mode: BalanceMode) -> SweetspotResult<()> {
        self.backend_mut(mode).set_balance(balance)
    }

    fn backend_mut(&mut self, mode: BalanceMode) -> &mut dyn AudioBackend {
        match mode {
            BalanceMode::SystemAudio => self.system.as_mut(),
            BalanceMode::EqMac => self.eqmac.as_mut(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct TaggedBackend {
        tag: &'static str,
        log: Arc<Mutex<Vec<(&'static str, f64)>>>,
    }

    impl AudioBackend for TaggedBackend {
        fn set_balance(&mut self, balance: f64) -> SweetspotResult<()> {
            self.log.lock().unwrap().push((self.tag, balance));
            Ok(())
        }

        fn name(&self) -> &str {
            self.tag
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    #[test]
    fn test_balance_to_slider_scale() {
        assert_eq!(balance_to_slider(-1.0), 0);
        assert_eq!(balance_to_slider(0.0), 50);
        assert_eq!(balance_to_slider(1.0), 100);
        assert_eq!(balance_to_slider(0.5), 75);
        // Out-of-range input is clamped, not wrapped.
        assert_eq!(balance_to_slider(3.0), 100);
        assert_eq!(balance_to_slider(-3.0), 0);
    }

    #[test]
    fn test_router_dispatches_on_mode() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut router = BalanceRouter::new(
            Box::new(TaggedBackend {
                tag: "system",
                log: log.clone(),
            }),
            Box::new(TaggedBackend {
                tag: "eqmac",
                log: log.clone(),
            }),
        );

        router.set_balance(0.25, BalanceMode::SystemAudio).unwrap();
        router.set_balance(-0.5, BalanceMode::EqMac).unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.as_slice(), &[("system", 0.25), ("eqmac", -0.5)]);
    }
}
