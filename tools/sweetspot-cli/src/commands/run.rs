//! Start the head-tracking balance loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;

use sweetspot_audio::BalanceRouter;
use sweetspot_common::config::AppConfig;
use sweetspot_tracker::{CommandInterpreter, SharedEngine, TrackerSession};
use sweetspot_vision::backends::open_camera_stack;

pub async fn run(
    camera: Option<u32>,
    sensitivity: Option<f64>,
    interval_ms: Option<u64>,
    eqmac: bool,
    cartoon_filter: bool,
    no_preview: bool,
) -> anyhow::Result<()> {
    let mut config = AppConfig::load();
    if let Some(camera) = camera {
        config.camera.index = camera;
    }
    if let Some(sensitivity) = sensitivity {
        config.tracking.sensitivity = sensitivity;
    }
    if let Some(interval_ms) = interval_ms {
        config.tracking.update_interval_ms = interval_ms;
    }
    if eqmac {
        config.tracking.eqmac = true;
    }
    if cartoon_filter {
        config.tracking.cartoon_filter = true;
    }
    let with_preview = config.camera.preview && !no_preview;

    let engine = SharedEngine::from_defaults(&config.tracking)?;

    // A camera that cannot be opened at startup is the one unrecoverable
    // failure: surface it and exit non-zero.
    let (source, locator, preview) = open_camera_stack(config.camera.index, with_preview)
        .context("could not open the camera")?;

    println!("Head tracking started.");
    println!("COMMANDS (type the letter and press Enter, or press the key in the preview):");
    println!("  c   calibrate the current position as the sweet spot");
    println!(
        "  s   set sensitivity (currently {:.1})",
        config.tracking.sensitivity
    );
    println!("  m   toggle between system audio and eqMac");
    println!("  f   toggle the cartoon filter");
    println!("  q   quit");
    println!();

    let stop_flag = Arc::new(AtomicBool::new(false));
    let (keys_tx, keys_rx) = tokio::sync::mpsc::unbounded_channel();

    let interpreter = CommandInterpreter::new(engine.clone(), stop_flag.clone());
    let interpreter_task = tokio::spawn(interpreter.run(keys_rx));

    let session = TrackerSession::new(
        engine,
        BalanceRouter::with_defaults(),
        source,
        locator,
        preview,
        keys_tx,
        stop_flag.clone(),
    );

    let ctrl_c_stop = stop_flag.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping");
            ctrl_c_stop.store(true, Ordering::SeqCst);
        }
    });

    let frames = tokio::spawn(session.run())
        .await
        .context("tracking task panicked")??;

    stop_flag.store(true, Ordering::SeqCst);
    interpreter_task.await.ok();

    println!("Head tracking stopped after {frames} frames. Audio balance reset.");
    Ok(())
}
