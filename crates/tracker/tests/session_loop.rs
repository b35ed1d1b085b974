use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use sweetspot_audio::{AudioBackend, BalanceRouter};
use sweetspot_common::config::TrackingDefaults;
use sweetspot_common::error::{SweetspotError, SweetspotResult};
use sweetspot_engine_core::FaceRegion;
use sweetspot_tracker::{CommandInterpreter, SharedEngine, TrackerSession};
use sweetspot_vision::backends::scripted::{ScriptedLocator, ScriptedPreview, ScriptedSource};
use sweetspot_vision::{Frame, FrameSource};

/// Backend double that records every balance it is asked to apply.
struct RecordingBackend {
    calls: Arc<Mutex<Vec<f64>>>,
}

impl AudioBackend for RecordingBackend {
    fn set_balance(&mut self, balance: f64) -> SweetspotResult<()> {
        self.calls.lock().unwrap().push(balance);
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }

    fn is_available(&self) -> bool {
        true
    }
}

fn recording_router() -> (BalanceRouter, Arc<Mutex<Vec<f64>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let router = BalanceRouter::new(
        Box::new(RecordingBackend {
            calls: calls.clone(),
        }),
        Box::new(RecordingBackend {
            calls: calls.clone(),
        }),
    );
    (router, calls)
}

fn engine() -> SharedEngine {
    SharedEngine::from_defaults(&TrackingDefaults::default()).unwrap()
}

/// A source that sleeps between frames, to walk the session through real
/// throttle intervals.
struct SlowSource {
    inner: ScriptedSource,
    delay_ms: u64,
    first: bool,
}

impl FrameSource for SlowSource {
    fn next_frame(&mut self) -> SweetspotResult<Option<Frame>> {
        if !self.first {
            std::thread::sleep(std::time::Duration::from_millis(self.delay_ms));
        }
        self.first = false;
        self.inner.next_frame()
    }

    fn name(&self) -> &str {
        "slow-scripted"
    }
}

/// A source whose reads fail, the way a wedged camera driver surfaces once
/// its read timeout elapses.
struct DeadSource;

impl FrameSource for DeadSource {
    fn next_frame(&mut self) -> SweetspotResult<Option<Frame>> {
        Err(SweetspotError::camera("camera produced no frame within 1000 ms"))
    }

    fn name(&self) -> &str {
        "dead"
    }
}

// Face box centered at x=800 in a 1000px frame; with default sensitivity
// 0.8 and no calibration that maps to balance -0.75.
fn face_at_800() -> FaceRegion {
    FaceRegion::new(760, 100, 80, 80)
}

#[tokio::test]
async fn rapid_frames_produce_one_update_then_reset() {
    let (router, calls) = recording_router();
    let (keys_tx, _keys_rx) = tokio::sync::mpsc::unbounded_channel();

    let session = TrackerSession::new(
        engine(),
        router,
        Box::new(ScriptedSource::new(1000, 750, 6)),
        Box::new(ScriptedLocator::steady(face_at_800(), 6)),
        None,
        keys_tx,
        Arc::new(AtomicBool::new(false)),
    );

    let frames = session.run().await.unwrap();
    assert_eq!(frames, 6);

    // Six frames well inside one 200ms throttle window: a single update,
    // followed by the unconditional reset to center.
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!((calls[0] - (-0.75)).abs() < 1e-9);
    assert_eq!(calls[1], 0.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn spaced_frames_produce_multiple_updates() {
    let (router, calls) = recording_router();
    let (keys_tx, _keys_rx) = tokio::sync::mpsc::unbounded_channel();

    let source = SlowSource {
        inner: ScriptedSource::new(1000, 750, 3),
        delay_ms: 120,
        first: true,
    };
    let session = TrackerSession::new(
        engine(),
        router,
        Box::new(source),
        Box::new(ScriptedLocator::steady(face_at_800(), 3)),
        None,
        keys_tx,
        Arc::new(AtomicBool::new(false)),
    );

    session.run().await.unwrap();

    // Frames at roughly t=0, 120ms, 240ms against a 200ms throttle: the
    // first and third fire, the second is skipped. Plus the final reset.
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 3);
    assert!((calls[0] - (-0.75)).abs() < 1e-9);
    assert!((calls[1] - (-0.75)).abs() < 1e-9);
    assert_eq!(calls[2], 0.0);
}

#[tokio::test]
async fn faceless_frames_leave_last_command_standing() {
    let (router, calls) = recording_router();
    let (keys_tx, _keys_rx) = tokio::sync::mpsc::unbounded_channel();

    // One detected face, then five empty frames.
    let script = vec![
        vec![face_at_800()],
        vec![],
        vec![],
        vec![],
        vec![],
        vec![],
    ];
    let session = TrackerSession::new(
        engine(),
        router,
        Box::new(ScriptedSource::new(1000, 750, 6)),
        Box::new(ScriptedLocator::new(script)),
        None,
        keys_tx,
        Arc::new(AtomicBool::new(false)),
    );

    session.run().await.unwrap();

    // No snap-to-center while the face is lost: the only calls are the one
    // real update and the shutdown reset.
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert!((calls[0] - (-0.75)).abs() < 1e-9);
    assert_eq!(calls[1], 0.0);
}

#[tokio::test]
async fn reset_runs_even_without_any_faces() {
    let (router, calls) = recording_router();
    let (keys_tx, _keys_rx) = tokio::sync::mpsc::unbounded_channel();

    let session = TrackerSession::new(
        engine(),
        router,
        Box::new(ScriptedSource::new(640, 480, 3)),
        Box::new(ScriptedLocator::new(vec![])),
        None,
        keys_tx,
        Arc::new(AtomicBool::new(false)),
    );

    session.run().await.unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.as_slice(), &[0.0]);
}

#[tokio::test]
async fn stalled_source_fails_the_session_but_still_resets() {
    let (router, calls) = recording_router();
    let (keys_tx, _keys_rx) = tokio::sync::mpsc::unbounded_channel();

    let session = TrackerSession::new(
        engine(),
        router,
        Box::new(DeadSource),
        Box::new(ScriptedLocator::new(vec![])),
        None,
        keys_tx,
        Arc::new(AtomicBool::new(false)),
    );

    let result = session.run().await;
    assert!(result.is_err());
    // The shutdown reset still reaches the backend.
    assert_eq!(calls.lock().unwrap().as_slice(), &[0.0]);
}

#[tokio::test]
async fn preview_quit_key_stops_the_session() {
    let (router, calls) = recording_router();
    let (keys_tx, keys_rx) = tokio::sync::mpsc::unbounded_channel();

    let engine = engine();
    let stop_flag = Arc::new(AtomicBool::new(false));
    let interpreter = CommandInterpreter::new(engine.clone(), stop_flag.clone());
    let interpreter_task = tokio::spawn(interpreter.run(keys_rx));

    let session = TrackerSession::new(
        engine,
        router,
        Box::new(ScriptedSource::new(1000, 750, 500)),
        Box::new(ScriptedLocator::steady(face_at_800(), 500)),
        Some(Box::new(ScriptedPreview::with_keys(vec!['q']))),
        keys_tx,
        stop_flag.clone(),
    );

    let frames = session.run().await.unwrap();
    interpreter_task.await.unwrap();

    assert!(stop_flag.load(Ordering::SeqCst));
    assert!(frames < 500, "quit should cut the session short, ran {frames}");
    // Reset to center still happened on the quit path.
    assert_eq!(*calls.lock().unwrap().last().unwrap(), 0.0);
}
