//! Check system capabilities.

use sweetspot_audio::{AudioBackend, EqMacBackend, SystemAudioBackend};
use sweetspot_vision::backends::camera_support_compiled;

pub fn run() -> anyhow::Result<()> {
    println!("Sweetspot System Check");
    println!("{}", "=".repeat(50));

    // Camera backend
    if camera_support_compiled() {
        println!("[OK] Camera support compiled in (OpenCV backend)");
    } else {
        println!("[WARN] Built without camera support; rebuild with --features opencv-backend");
    }

    // Audio actuation
    let backends: [Box<dyn AudioBackend>; 2] = [
        Box::new(SystemAudioBackend::new()),
        Box::new(EqMacBackend::new()),
    ];
    let mut audio_ok = true;
    for backend in &backends {
        if backend.is_available() {
            println!("[OK] {} backend can actuate (osascript present)", backend.name());
        } else {
            audio_ok = false;
            println!(
                "[WARN] {} backend cannot actuate: osascript not found",
                backend.name()
            );
        }
    }

    println!();
    if camera_support_compiled() && audio_ok {
        println!("All required capabilities are available. Sweetspot is ready.");
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
    }

    Ok(())
}
