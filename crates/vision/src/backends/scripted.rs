//! In-memory backends for tests and headless development.
//!
//! A `ScriptedSource` replays a fixed frame sequence; a `ScriptedLocator`
//! replays per-frame detection results. Together they let the whole
//! tracking loop run deterministically with no camera attached.

use std::collections::VecDeque;

use sweetspot_common::error::SweetspotResult;
use sweetspot_engine_core::FaceRegion;

use crate::overlay::OverlayState;
use crate::{FaceLocator, Frame, FrameSource, Preview};

/// Replays a fixed number of identically sized black frames, then signals
/// end of stream.
pub struct ScriptedSource {
    width: u32,
    height: u32,
    remaining: usize,
}

impl ScriptedSource {
    /// A source producing `count` frames of the given size.
    pub fn new(width: u32, height: u32, count: usize) -> Self {
        Self {
            width,
            height,
            remaining: count,
        }
    }
}

impl FrameSource for ScriptedSource {
    fn next_frame(&mut self) -> SweetspotResult<Option<Frame>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;
        Ok(Some(Frame::black(self.width, self.height)))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Replays a scripted sequence of detection results, one entry per `locate`
/// call. Once the script runs out, every frame is face-free.
pub struct ScriptedLocator {
    script: VecDeque<Vec<FaceRegion>>,
}

impl ScriptedLocator {
    pub fn new(script: Vec<Vec<FaceRegion>>) -> Self {
        Self {
            script: script.into(),
        }
    }

    /// A locator that reports the same single face on every frame.
    pub fn steady(face: FaceRegion, frames: usize) -> Self {
        Self::new(vec![vec![face]; frames])
    }
}

impl FaceLocator for ScriptedLocator {
    fn locate(&mut self, _frame: &Frame) -> SweetspotResult<Vec<FaceRegion>> {
        Ok(self.script.pop_front().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// A preview that records how often it was shown and replays scripted key
/// presses. Used to exercise the key-event path without a display.
#[derive(Default)]
pub struct ScriptedPreview {
    keys: VecDeque<char>,
    pub frames_shown: usize,
}

impl ScriptedPreview {
    pub fn with_keys(keys: Vec<char>) -> Self {
        Self {
            keys: keys.into(),
            frames_shown: 0,
        }
    }
}

impl Preview for ScriptedPreview {
    fn show(&mut self, _frame: &Frame, _overlay: &OverlayState) -> SweetspotResult<Option<char>> {
        self.frames_shown += 1;
        Ok(self.keys.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_source_ends() {
        let mut source = ScriptedSource::new(640, 480, 2);
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_scripted_locator_replays_then_goes_quiet() {
        let face = FaceRegion::new(10, 10, 50, 50);
        let mut locator = ScriptedLocator::new(vec![vec![face], vec![]]);
        let frame = Frame::black(640, 480);

        assert_eq!(locator.locate(&frame).unwrap(), vec![face]);
        assert!(locator.locate(&frame).unwrap().is_empty());
        assert!(locator.locate(&frame).unwrap().is_empty());
    }

    #[test]
    fn test_scripted_preview_replays_keys() {
        let mut preview = ScriptedPreview::with_keys(vec!['m', 'q']);
        let frame = Frame::black(64, 64);
        let overlay = OverlayState::default();

        assert_eq!(preview.show(&frame, &overlay).unwrap(), Some('m'));
        assert_eq!(preview.show(&frame, &overlay).unwrap(), Some('q'));
        assert_eq!(preview.show(&frame, &overlay).unwrap(), None);
        assert_eq!(preview.frames_shown, 3);
    }
}
