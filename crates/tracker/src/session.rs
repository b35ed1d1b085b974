//! Tracking session lifecycle and the per-frame loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task;

use sweetspot_audio::BalanceRouter;
use sweetspot_common::clock::TrackingClock;
use sweetspot_common::error::{SweetspotError, SweetspotResult};
use sweetspot_engine_core::{primary_face, BalanceMode, FaceRegion};
use sweetspot_vision::filter::cartoonize;
use sweetspot_vision::overlay::OverlayState;
use sweetspot_vision::{FaceLocator, Frame, FrameSource, Preview};

use crate::engine::SharedEngine;

/// A tracking session driving the capture, detect, compute, actuate loop.
pub struct TrackerSession {
    engine: SharedEngine,
    // Moved onto the blocking pool call by call and restored afterwards;
    // camera reads and osascript round-trips must not block a worker thread.
    router: Option<BalanceRouter>,
    source: Option<Box<dyn FrameSource>>,
    locator: Box<dyn FaceLocator>,
    preview: Option<Box<dyn Preview>>,
    keys_tx: mpsc::UnboundedSender<char>,
    stop_flag: Arc<AtomicBool>,
    clock: TrackingClock,
    frames_processed: u64,
    last_balance: Option<f64>,
}

impl TrackerSession {
    /// Assemble a session from its collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        engine: SharedEngine,
        router: BalanceRouter,
        source: Box<dyn FrameSource>,
        locator: Box<dyn FaceLocator>,
        preview: Option<Box<dyn Preview>>,
        keys_tx: mpsc::UnboundedSender<char>,
        stop_flag: Arc<AtomicBool>,
    ) -> Self {
        Self {
            engine,
            router: Some(router),
            source: Some(source),
            locator,
            preview,
            keys_tx,
            stop_flag,
            clock: TrackingClock::start(),
            frames_processed: 0,
            last_balance: None,
        }
    }

    /// Get the stop flag for external coordination (quit command, Ctrl-C).
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    /// Run the loop until the stop flag is set or the source ends.
    ///
    /// Returns the number of frames processed. Whatever way the loop exits
    /// (quit, end of stream, a source error), the balance is reset to
    /// center before the frame source is released.
    pub async fn run(mut self) -> SweetspotResult<u64> {
        tracing::info!(
            source = self.source.as_deref().map(|s| s.name()).unwrap_or("none"),
            locator = %self.locator.name(),
            preview = self.preview.is_some(),
            "Tracking session started"
        );

        let result = self.track_loop().await;

        self.reset_balance().await;
        // `self` drops here, releasing the frame source after the reset.

        match &result {
            Ok(frames) => tracing::info!(frames = *frames, "Tracking session stopped"),
            Err(e) => tracing::warn!(error = %e, "Tracking session failed"),
        }
        result
    }

    async fn track_loop(&mut self) -> SweetspotResult<u64> {
        loop {
            if self.stop_flag.load(Ordering::SeqCst) {
                return Ok(self.frames_processed);
            }

            let mut frame = match self.capture_frame().await? {
                Some(frame) => frame,
                None => {
                    tracing::info!("Frame source ended");
                    return Ok(self.frames_processed);
                }
            };
            self.engine.set_frame_width(frame.width);

            // A failed detection is "no face this frame", not an error.
            let faces = match self.locator.locate(&frame) {
                Ok(faces) => faces,
                Err(e) => {
                    tracing::warn!(error = %e, "Face detection failed this frame");
                    Vec::new()
                }
            };

            let face = primary_face(&faces);
            if let Some(face) = face {
                let balance = self.engine.track(face.center_x(), frame.width);
                self.last_balance = Some(balance);

                // The throttle decision is taken under the engine lock; the
                // backend call happens after it is released.
                if let Some(mode) = self.engine.claim_update(self.clock.elapsed_ns()) {
                    match self.actuate(balance, mode).await {
                        Ok(()) => tracing::info!(
                            face_x = face.center_x(),
                            balance,
                            calibrated = self.engine.snapshot().calibrated,
                            mode = mode.label(),
                            "Balance updated"
                        ),
                        // Best-effort actuation; the next cycle retries.
                        Err(e) => tracing::warn!(error = %e, "Audio backend update failed"),
                    }
                }
            }

            if self.preview.is_some() {
                self.show_preview(&mut frame, face);
            }

            self.frames_processed += 1;
            tokio::time::sleep(tokio::time::Duration::from_millis(1)).await;
        }
    }

    /// Pull the next frame on the blocking pool; a camera read may stall
    /// for up to the backend's read timeout.
    async fn capture_frame(&mut self) -> SweetspotResult<Option<Frame>> {
        let Some(mut source) = self.source.take() else {
            return Ok(None);
        };
        let (source, frame) = task::spawn_blocking(move || {
            let frame = source.next_frame();
            (source, frame)
        })
        .await
        .map_err(|e| SweetspotError::camera(format!("capture task failed: {e}")))?;
        self.source = Some(source);
        frame
    }

    /// Drive the audio backend on the blocking pool; osascript is a
    /// subprocess round-trip.
    async fn actuate(&mut self, balance: f64, mode: BalanceMode) -> SweetspotResult<()> {
        let Some(mut router) = self.router.take() else {
            return Err(SweetspotError::audio("audio router is gone"));
        };
        let (router, result) = task::spawn_blocking(move || {
            let result = router.set_balance(balance, mode);
            (router, result)
        })
        .await
        .map_err(|e| SweetspotError::audio(format!("actuation task failed: {e}")))?;
        self.router = Some(router);
        result
    }

    fn show_preview(&mut self, frame: &mut Frame, face: Option<FaceRegion>) {
        let snapshot = self.engine.snapshot();
        if snapshot.filter_enabled {
            cartoonize(frame);
        }
        let overlay = OverlayState {
            face,
            calibration_x: snapshot
                .calibrated
                .then(|| frame.width as f64 / 2.0 + snapshot.calibration_offset),
            balance: self.last_balance,
        };

        let Some(preview) = self.preview.as_mut() else {
            return;
        };
        match preview.show(frame, &overlay) {
            Ok(Some(key)) => {
                // Interpreter gone means shutdown is already underway.
                let _ = self.keys_tx.send(key);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Preview failed, continuing headless");
                self.preview = None;
            }
        }
    }

    async fn reset_balance(&mut self) {
        let mode = self.engine.claim_reset(self.clock.elapsed_ns());
        match self.actuate(0.0, mode).await {
            Ok(()) => tracing::info!("Audio balance reset to center"),
            Err(e) => tracing::warn!(error = %e, "Failed to reset audio balance"),
        }
    }
}
