//! eqMac balance via UI automation.
//!
//! eqMac exposes no scripting dictionary, so this backend drives its
//! balance control the same way the system backend drives the volume UI.
//! The script is a no-op when the eqMac process is not running.

use sweetspot_common::error::SweetspotResult;

use crate::script::{osascript_available, run_osascript};
use crate::{balance_to_slider, AudioBackend};

pub struct EqMacBackend {
    _private: (),
}

impl EqMacBackend {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn balance_script(slider_value: i32) -> String {
        format!(
            r#"tell application "System Events"
    if exists process "eqMac" then
        tell process "eqMac"
            set value of slider "Balance" of window 1 to {slider_value}
        end tell
    end if
end tell"#
        )
    }
}

impl Default for EqMacBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for EqMacBackend {
    fn set_balance(&mut self, balance: f64) -> SweetspotResult<()> {
        let slider = balance_to_slider(balance);
        tracing::debug!(balance, slider, "Setting eqMac balance");
        run_osascript(&Self::balance_script(slider))
    }

    fn name(&self) -> &str {
        "eqmac"
    }

    fn is_available(&self) -> bool {
        osascript_available()
    }
}
