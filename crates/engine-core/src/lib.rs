//! Sweetspot Engine Core: the balance engine.
//!
//! Converts face-detection output into stereo balance commands:
//! - **Face selection:** Pick the primary face from detector candidates
//! - **Calibration:** Redefine which head position maps to centered audio
//! - **Balance mapping:** Normalize, clamp, and invert the horizontal offset
//!
//! This crate is pure computation: no I/O, no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod balance;
pub mod face;

pub use balance::{BalanceEngine, BalanceMode};
pub use face::{primary_face, FaceRegion};
