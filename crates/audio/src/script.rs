//! osascript execution.
//!
//! Both audio backends actuate through AppleScript UI automation. The
//! scripts are short and run as one-shot `osascript -e` invocations; the
//! calling loop throttles how often they fire.

use std::process::Command;

use sweetspot_common::error::{SweetspotError, SweetspotResult};

/// Run an AppleScript snippet, surfacing a non-zero exit as an audio error.
pub fn run_osascript(script: &str) -> SweetspotResult<()> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .output()
        .map_err(|e| SweetspotError::audio(format!("launching osascript: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SweetspotError::audio(format!(
            "osascript exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Check whether `osascript` exists on this system at all.
pub fn osascript_available() -> bool {
    Command::new("osascript")
        .arg("-e")
        .arg("return")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
