//! Face-region data model and primary-face selection.

use serde::{Deserialize, Serialize};

/// A detected face bounding box in frame-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRegion {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Box width in pixels.
    pub width: u32,
    /// Box height in pixels.
    pub height: u32,
}

impl FaceRegion {
    /// Create a region from detector output.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Horizontal center of the box in frame pixels.
    pub fn center_x(&self) -> f64 {
        self.x as f64 + self.width as f64 / 2.0
    }

    /// Bounding-box area in square pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Select the primary face from a frame's detections: largest bounding-box
/// area wins, first-encountered wins ties.
///
/// This is a stability heuristic, not a guarantee. Two similarly sized faces
/// can swap primacy across consecutive frames when the detector reorders its
/// output, which shows up as balance jitter.
pub fn primary_face(faces: &[FaceRegion]) -> Option<FaceRegion> {
    let mut best: Option<FaceRegion> = None;
    for face in faces {
        match best {
            Some(current) if face.area() <= current.area() => {}
            _ => best = Some(*face),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_x() {
        let face = FaceRegion::new(100, 50, 80, 80);
        assert!((face.center_x() - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_primary_face_picks_largest() {
        let faces = vec![
            FaceRegion::new(0, 0, 30, 30),
            FaceRegion::new(200, 0, 90, 90),
            FaceRegion::new(400, 0, 60, 60),
        ];
        assert_eq!(primary_face(&faces), Some(faces[1]));
    }

    #[test]
    fn test_primary_face_tie_keeps_first() {
        let faces = vec![
            FaceRegion::new(0, 0, 50, 50),
            FaceRegion::new(300, 0, 50, 50),
        ];
        assert_eq!(primary_face(&faces), Some(faces[0]));
    }

    #[test]
    fn test_primary_face_empty() {
        assert_eq!(primary_face(&[]), None);
    }
}
