//! Preview annotations: face box, calibration line, and balance meter.
//!
//! Drawn directly on the BGR pixel buffer so the preview backend stays a
//! pure display surface.

use crate::Frame;
use sweetspot_engine_core::FaceRegion;

const FACE_BOX: [u8; 3] = [255, 0, 0]; // blue
const CALIBRATION_LINE: [u8; 3] = [0, 255, 0]; // green
const METER_BACKGROUND: [u8; 3] = [100, 100, 100];
const METER_INDICATOR: [u8; 3] = [0, 255, 255]; // yellow

/// What to annotate on the current preview frame.
#[derive(Debug, Clone, Default)]
pub struct OverlayState {
    /// The primary face selected this frame, if any.
    pub face: Option<FaceRegion>,
    /// Calibrated sweet-spot x position, when calibration has happened.
    pub calibration_x: Option<f64>,
    /// Most recently computed balance command, for the meter.
    pub balance: Option<f64>,
}

/// Draw all annotations in place.
pub fn draw_overlay(frame: &mut Frame, state: &OverlayState) {
    if let Some(face) = state.face {
        draw_box(frame, &face);
    }
    if let Some(x) = state.calibration_x {
        if x >= 0.0 {
            draw_vline(frame, x as u32, CALIBRATION_LINE);
        }
    }
    if let Some(balance) = state.balance {
        draw_meter(frame, balance);
    }
}

fn draw_box(frame: &mut Frame, face: &FaceRegion) {
    let x0 = face.x.max(0) as u32;
    let y0 = face.y.max(0) as u32;
    let x1 = x0.saturating_add(face.width);
    let y1 = y0.saturating_add(face.height);
    for x in x0..=x1 {
        frame.put_pixel(x, y0, FACE_BOX);
        frame.put_pixel(x, y1, FACE_BOX);
    }
    for y in y0..=y1 {
        frame.put_pixel(x0, y, FACE_BOX);
        frame.put_pixel(x1, y, FACE_BOX);
    }
}

fn draw_vline(frame: &mut Frame, x: u32, color: [u8; 3]) {
    for y in 0..frame.height {
        frame.put_pixel(x, y, color);
    }
}

/// Horizontal balance meter along the bottom edge: full left at -1.0,
/// centered at 0.0, full right at +1.0.
fn draw_meter(frame: &mut Frame, balance: f64) {
    if frame.width < 120 || frame.height < 60 {
        return; // too small for a readable meter
    }
    let meter_x = 50u32;
    let meter_width = frame.width - 100;
    let meter_y = frame.height - 50;
    let meter_height = 20u32;

    for y in meter_y..meter_y + meter_height {
        for x in meter_x..meter_x + meter_width {
            frame.put_pixel(x, y, METER_BACKGROUND);
        }
    }

    let clamped = balance.clamp(-1.0, 1.0);
    let indicator = meter_x + (meter_width as f64 * (clamped + 1.0) / 2.0) as u32;
    for y in meter_y..meter_y + meter_height {
        for x in indicator.saturating_sub(3)..=indicator + 3 {
            frame.put_pixel(x, y, METER_INDICATOR);
        }
    }
}
