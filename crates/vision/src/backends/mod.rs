//! Pluggable perception backends.
//!
//! `open_camera_stack` hands the tracker a matched frame source, face
//! locator, and optional preview for the best backend this build supports.

pub mod scripted;

#[cfg(feature = "opencv-backend")]
pub mod opencv;

use sweetspot_common::error::SweetspotResult;

use crate::{FaceLocator, FrameSource, Preview};

/// Whether this build can talk to a real camera.
pub fn camera_support_compiled() -> bool {
    cfg!(feature = "opencv-backend")
}

/// Open the default camera, detector, and (optionally) preview window.
///
/// Fails with `Unsupported` when the binary was built without the
/// `opencv-backend` feature; the scripted backends remain available for
/// tests either way.
#[cfg(feature = "opencv-backend")]
pub fn open_camera_stack(
    camera_index: u32,
    with_preview: bool,
) -> SweetspotResult<(
    Box<dyn FrameSource>,
    Box<dyn FaceLocator>,
    Option<Box<dyn Preview>>,
)> {
    let source = opencv::OpenCvCamera::open(camera_index)?;
    let locator = opencv::HaarFaceLocator::load_default()?;
    let preview: Option<Box<dyn Preview>> = if with_preview {
        match opencv::HighguiPreview::create() {
            Ok(preview) => Some(Box::new(preview)),
            Err(e) => {
                tracing::warn!(error = %e, "Preview window unavailable, continuing headless");
                None
            }
        }
    } else {
        None
    };
    Ok((Box::new(source), Box::new(locator), preview))
}

#[cfg(not(feature = "opencv-backend"))]
pub fn open_camera_stack(
    _camera_index: u32,
    _with_preview: bool,
) -> SweetspotResult<(
    Box<dyn FrameSource>,
    Box<dyn FaceLocator>,
    Option<Box<dyn Preview>>,
)> {
    Err(sweetspot_common::error::SweetspotError::unsupported(
        "this build has no camera support (rebuild with --features opencv-backend)",
    ))
}
