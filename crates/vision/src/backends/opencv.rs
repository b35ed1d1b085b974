//! OpenCV-backed camera, Haar-cascade face detection, and HighGUI preview.
//!
//! Only compiled with the `opencv-backend` feature. Frames are copied out of
//! OpenCV `Mat`s into plain buffers at the seam; webcam resolutions make the
//! copy negligible next to detection cost.

use std::sync::mpsc;
use std::time::Duration;

use opencv::core::{Mat, Rect, Size, Vector};
use opencv::prelude::*;
use opencv::{highgui, imgproc, objdetect, videoio};

use sweetspot_common::error::{SweetspotError, SweetspotResult};
use sweetspot_engine_core::FaceRegion;

use crate::overlay::{draw_overlay, OverlayState};
use crate::{FaceLocator, Frame, FrameSource, Preview};

/// Haar detection parameters, tuned for frontal webcam faces.
const SCALE_FACTOR: f64 = 1.1;
const MIN_NEIGHBORS: i32 = 5;
const MIN_FACE_SIZE: i32 = 30;

/// Bound on a single capture read so shutdown is never starved.
const READ_TIMEOUT_MS: u64 = 1000;

const CASCADE_FILE: &str = "haarcascade_frontalface_default.xml";

fn cv_err(context: &str, e: opencv::Error) -> SweetspotError {
    SweetspotError::camera(format!("{context}: {e}"))
}

/// A webcam frame source.
///
/// The `VideoCapture` lives on a dedicated thread; `next_frame` waits at
/// most [`READ_TIMEOUT_MS`] for it. `CAP_PROP_READ_TIMEOUT_MSEC` is only
/// honored by a few capture backends, so a wedged driver read must not be
/// allowed to stall the tracking loop past one interval.
pub struct OpenCvCamera {
    frames: mpsc::Receiver<SweetspotResult<Option<Frame>>>,
    label: String,
}

impl OpenCvCamera {
    /// Open the camera at the given device index and start its read thread.
    pub fn open(index: u32) -> SweetspotResult<Self> {
        let mut capture = videoio::VideoCapture::new(index as i32, videoio::CAP_ANY)
            .map_err(|e| cv_err("opening camera", e))?;
        let opened = capture
            .is_opened()
            .map_err(|e| cv_err("probing camera", e))?;
        if !opened {
            return Err(SweetspotError::camera(format!(
                "could not open camera device {index}"
            )));
        }

        // Keep the driver queue shallow; stale frames are worse than dropped
        // ones for a live control loop. Not every backend supports these
        // properties, so a refusal is only worth a log line.
        set_capture_prop(&mut capture, videoio::CAP_PROP_BUFFERSIZE, 1.0, "buffer size");
        set_capture_prop(
            &mut capture,
            videoio::CAP_PROP_READ_TIMEOUT_MSEC,
            READ_TIMEOUT_MS as f64,
            "read timeout",
        );

        let (frames_tx, frames) = mpsc::sync_channel(1);
        std::thread::Builder::new()
            .name("sweetspot-capture".into())
            .spawn(move || capture_loop(capture, frames_tx))?;

        Ok(Self {
            frames,
            label: format!("opencv:{index}"),
        })
    }
}

fn set_capture_prop(capture: &mut videoio::VideoCapture, prop: i32, value: f64, what: &str) {
    match capture.set(prop, value) {
        Ok(true) => {}
        Ok(false) => tracing::warn!("capture backend does not support setting the {what}"),
        Err(e) => tracing::warn!(error = %e, "failed to set the capture {what}"),
    }
}

/// Owns the capture handle and feeds frames over a bounded channel until
/// the consumer goes away or the device stops delivering.
fn capture_loop(
    mut capture: videoio::VideoCapture,
    frames: mpsc::SyncSender<SweetspotResult<Option<Frame>>>,
) {
    loop {
        let item = read_frame(&mut capture);
        let last = !matches!(item, Ok(Some(_)));
        if frames.send(item).is_err() || last {
            return;
        }
    }
}

fn read_frame(capture: &mut videoio::VideoCapture) -> SweetspotResult<Option<Frame>> {
    let mut mat = Mat::default();
    let got = capture
        .read(&mut mat)
        .map_err(|e| cv_err("reading frame", e))?;
    if !got || mat.empty() {
        return Ok(None);
    }
    Ok(Some(mat_to_frame(&mat)?))
}

impl FrameSource for OpenCvCamera {
    fn next_frame(&mut self) -> SweetspotResult<Option<Frame>> {
        match self.frames.recv_timeout(Duration::from_millis(READ_TIMEOUT_MS)) {
            Ok(item) => item,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(SweetspotError::camera(format!(
                "camera produced no frame within {READ_TIMEOUT_MS} ms"
            ))),
            Err(mpsc::RecvTimeoutError::Disconnected) => Ok(None),
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Haar-cascade frontal-face detector.
pub struct HaarFaceLocator {
    classifier: objdetect::CascadeClassifier,
}

impl HaarFaceLocator {
    /// Load the stock frontal-face cascade shipped with OpenCV.
    ///
    /// `SWEETSPOT_CASCADE` overrides the lookup for nonstandard installs.
    pub fn load_default() -> SweetspotResult<Self> {
        let path = match std::env::var("SWEETSPOT_CASCADE") {
            Ok(path) => path,
            Err(_) => opencv::core::find_file(CASCADE_FILE, true, false)
                .map_err(|e| SweetspotError::detection(format!("locating {CASCADE_FILE}: {e}")))?,
        };
        let classifier = objdetect::CascadeClassifier::new(&path)
            .map_err(|e| SweetspotError::detection(format!("loading cascade {path}: {e}")))?;
        Ok(Self { classifier })
    }
}

impl FaceLocator for HaarFaceLocator {
    fn locate(&mut self, frame: &Frame) -> SweetspotResult<Vec<FaceRegion>> {
        let mat = frame_to_mat(frame)?;
        let mut gray = Mat::default();
        imgproc::cvt_color(&mat, &mut gray, imgproc::COLOR_BGR2GRAY, 0)
            .map_err(|e| SweetspotError::detection(format!("grayscale conversion: {e}")))?;

        let mut rects = Vector::<Rect>::new();
        self.classifier
            .detect_multi_scale(
                &gray,
                &mut rects,
                SCALE_FACTOR,
                MIN_NEIGHBORS,
                0,
                Size::new(MIN_FACE_SIZE, MIN_FACE_SIZE),
                Size::new(0, 0),
            )
            .map_err(|e| SweetspotError::detection(format!("cascade detection: {e}")))?;

        Ok(rects
            .iter()
            .map(|r| FaceRegion::new(r.x, r.y, r.width.max(0) as u32, r.height.max(0) as u32))
            .collect())
    }

    fn name(&self) -> &str {
        "haar-cascade"
    }
}

/// HighGUI preview window.
pub struct HighguiPreview {
    window: &'static str,
}

impl HighguiPreview {
    pub fn create() -> SweetspotResult<Self> {
        let window = "Sweetspot";
        highgui::named_window(window, highgui::WINDOW_AUTOSIZE)
            .map_err(|e| SweetspotError::camera(format!("creating preview window: {e}")))?;
        Ok(Self { window })
    }
}

impl Preview for HighguiPreview {
    fn show(&mut self, frame: &Frame, overlay: &OverlayState) -> SweetspotResult<Option<char>> {
        let mut annotated = frame.clone();
        draw_overlay(&mut annotated, overlay);

        let mat = frame_to_mat(&annotated)?;
        highgui::imshow(self.window, &mat)
            .map_err(|e| SweetspotError::camera(format!("preview display: {e}")))?;
        let key = highgui::poll_key().map_err(|e| SweetspotError::camera(format!("key poll: {e}")))?;

        if (0..=255).contains(&key) {
            Ok(Some(key as u8 as char))
        } else {
            Ok(None)
        }
    }
}

fn mat_to_frame(mat: &Mat) -> SweetspotResult<Frame> {
    let size = mat.size().map_err(|e| cv_err("querying frame size", e))?;
    let continuous = mat
        .is_continuous()
        .then(|| mat.data_bytes().map(|b| b.to_vec()));
    let pixels = match continuous {
        Some(Ok(pixels)) => pixels,
        _ => {
            let mut owned = Mat::default();
            mat.copy_to(&mut owned)
                .map_err(|e| cv_err("compacting frame", e))?;
            owned
                .data_bytes()
                .map_err(|e| cv_err("reading frame bytes", e))?
                .to_vec()
        }
    };
    Ok(Frame {
        width: size.width.max(0) as u32,
        height: size.height.max(0) as u32,
        pixels,
    })
}

fn frame_to_mat(frame: &Frame) -> SweetspotResult<Mat> {
    let rows = frame.height as i32;
    let mat = Mat::from_slice(&frame.pixels)
        .map_err(|e| cv_err("wrapping frame bytes", e))?
        .reshape(3, rows)
        .map_err(|e| cv_err("reshaping frame", e))?
        .try_clone()
        .map_err(|e| cv_err("cloning frame", e))?;
    Ok(mat)
}
