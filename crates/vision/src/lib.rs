//! Sweetspot Vision
//!
//! The perception seam of the tracker: a camera delivers frames, a locator
//! finds face boxes in them, and an optional preview window displays the
//! annotated result and yields key presses. Uses a pluggable backend
//! architecture:
//!
//! - **OpenCV:** real webcam capture, Haar-cascade detection, and a HighGUI
//!   preview window (behind the `opencv-backend` feature)
//! - **Scripted:** in-memory frame and detection sequences for tests and
//!   headless development
//!
//! Frames cross the seam as plain BGR8 pixel buffers so the contracts stay
//! object-safe and backend-free.

pub mod backends;
pub mod filter;
pub mod overlay;

use sweetspot_common::error::SweetspotResult;
use sweetspot_engine_core::FaceRegion;

use crate::overlay::OverlayState;

/// A single captured image, tightly packed BGR8, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 3` bytes, blue-green-red per pixel.
    pub pixels: Vec<u8>,
}

impl Frame {
    /// Create a black frame of the given size.
    pub fn black(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 3) as usize],
        }
    }

    /// Byte offset of the pixel at `(x, y)`, or `None` outside the frame.
    pub fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(((y * self.width + x) * 3) as usize)
    }

    /// Set the pixel at `(x, y)` to a BGR color. Out-of-frame writes are
    /// silently dropped so overlay drawing never needs bounds arithmetic.
    pub fn put_pixel(&mut self, x: u32, y: u32, bgr: [u8; 3]) {
        if let Some(offset) = self.offset(x, y) {
            self.pixels[offset..offset + 3].copy_from_slice(&bgr);
        }
    }
}

/// Trait for frame-delivering backends (cameras, files, scripts).
pub trait FrameSource: Send {
    /// Capture the next frame. `Ok(None)` signals end of stream or device
    /// failure and terminates the tracking loop. Implementations must not
    /// block unboundedly; shutdown polls between frames.
    fn next_frame(&mut self) -> SweetspotResult<Option<Frame>>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Trait for face-detection backends.
pub trait FaceLocator: Send {
    /// Locate candidate faces in a frame. May be empty; no ordering
    /// guarantee across calls.
    fn locate(&mut self, frame: &Frame) -> SweetspotResult<Vec<FaceRegion>>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Trait for the optional preview window.
pub trait Preview: Send {
    /// Display an annotated frame and return any key pressed since the last
    /// call. Failure here must not take down the tracking loop; callers
    /// drop the preview and continue headless.
    fn show(&mut self, frame: &Frame, overlay: &OverlayState) -> SweetspotResult<Option<char>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_frame_dimensions() {
        let frame = Frame::black(4, 2);
        assert_eq!(frame.pixels.len(), 24);
        assert!(frame.pixels.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_put_pixel_round_trip() {
        let mut frame = Frame::black(4, 4);
        frame.put_pixel(2, 1, [10, 20, 30]);
        let offset = frame.offset(2, 1).unwrap();
        assert_eq!(&frame.pixels[offset..offset + 3], &[10, 20, 30]);
    }

    #[test]
    fn test_put_pixel_out_of_frame_is_dropped() {
        let mut frame = Frame::black(4, 4);
        frame.put_pixel(4, 0, [1, 2, 3]);
        frame.put_pixel(0, 4, [1, 2, 3]);
        assert!(frame.pixels.iter().all(|&b| b == 0));
    }
}
