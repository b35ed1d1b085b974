//! Cosmetic "cartoon" filter for the preview window.
//!
//! Approximates the classic posterize-plus-edges look on raw BGR data:
//! colors are quantized to a few levels and strong horizontal luma edges
//! are inked black. Purely cosmetic; the balance computation never sees
//! the filtered pixels.

use crate::Frame;

/// Luma difference between neighbors above which a pixel is inked.
const EDGE_THRESHOLD: i32 = 28;

/// Number of levels each color channel is quantized to.
const POSTERIZE_LEVELS: u32 = 4;

/// Apply the cartoon effect in place.
pub fn cartoonize(frame: &mut Frame) {
    let luma = luma_plane(frame);
    posterize(frame);
    ink_edges(frame, &luma);
}

fn luma_plane(frame: &Frame) -> Vec<u8> {
    frame
        .pixels
        .chunks_exact(3)
        .map(|bgr| {
            // Integer BT.601 luma approximation.
            let (b, g, r) = (bgr[0] as u32, bgr[1] as u32, bgr[2] as u32);
            ((29 * b + 150 * g + 77 * r) >> 8) as u8
        })
        .collect()
}

fn posterize(frame: &mut Frame) {
    let step = 256 / POSTERIZE_LEVELS;
    for byte in &mut frame.pixels {
        let level = *byte as u32 / step;
        *byte = (level * step + step / 2).min(255) as u8;
    }
}

fn ink_edges(frame: &mut Frame, luma: &[u8]) {
    let width = frame.width as usize;
    for y in 0..frame.height as usize {
        for x in 1..width {
            let idx = y * width + x;
            let delta = luma[idx] as i32 - luma[idx - 1] as i32;
            if delta.abs() > EDGE_THRESHOLD {
                frame.put_pixel(x as u32, y as u32, [0, 0, 0]);
            }
        }
    }
}
