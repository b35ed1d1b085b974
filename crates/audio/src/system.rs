//! System audio balance via the OS volume UI.

use sweetspot_common::error::SweetspotResult;

use crate::script::{osascript_available, run_osascript};
use crate::{balance_to_slider, AudioBackend};

/// Drives the balance slider of the system volume UI through AppleScript.
pub struct SystemAudioBackend {
    _private: (),
}

impl SystemAudioBackend {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn balance_script(slider_value: i32) -> String {
        format!(
            r#"tell application "System Events"
    tell application process "SystemUIServer"
        set theVolume to first slider of group 1 of menu bar item 1 of menu bar 1
        tell theVolume
            set balance to {slider_value}
        end tell
    end tell
end tell"#
        )
    }
}

impl Default for SystemAudioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for SystemAudioBackend {
    fn set_balance(&mut self, balance: f64) -> SweetspotResult<()> {
        let slider = balance_to_slider(balance);
        tracing::debug!(balance, slider, "Setting system audio balance");
        run_osascript(&Self::balance_script(slider))
    }

    fn name(&self) -> &str {
        "system-audio"
    }

    fn is_available(&self) -> bool {
        osascript_available()
    }
}
