//! Thread-shared wrapper around the balance engine.
//!
//! One mutex guards the engine state, the update throttle, and the cached
//! frame geometry. Every operation here locks, does a short non-blocking
//! piece of work, and unlocks. The audio backend is always invoked by the
//! caller *after* the lock is released, using the mode claimed under it.

use std::sync::{Arc, Mutex};

use sweetspot_common::clock::UpdateThrottle;
use sweetspot_common::config::TrackingDefaults;
use sweetspot_common::error::SweetspotResult;
use sweetspot_engine_core::{BalanceEngine, BalanceMode};

/// Point-in-time view of engine state for status output and the preview
/// overlay.
#[derive(Debug, Clone, Copy)]
pub struct EngineSnapshot {
    pub sensitivity: f64,
    pub mode: BalanceMode,
    pub filter_enabled: bool,
    pub calibrated: bool,
    pub calibration_offset: f64,
    pub last_face_x: Option<f64>,
}

struct EngineInner {
    engine: BalanceEngine,
    throttle: UpdateThrottle,
    frame_width: Option<u32>,
}

/// Cloneable handle to the mutex-guarded engine.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<EngineInner>>,
}

impl SharedEngine {
    /// Build an engine from tracking defaults.
    pub fn from_defaults(defaults: &TrackingDefaults) -> SweetspotResult<Self> {
        let mode = if defaults.eqmac {
            BalanceMode::EqMac
        } else {
            BalanceMode::SystemAudio
        };
        let engine = BalanceEngine::new(defaults.sensitivity, mode, defaults.cartoon_filter)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(EngineInner {
                engine,
                throttle: UpdateThrottle::new(defaults.update_interval_ms),
                frame_width: None,
            })),
        })
    }

    /// Record the frame geometry reported by the frame source. The width is
    /// what calibration and balance mapping normalize against.
    pub fn set_frame_width(&self, width: u32) {
        self.lock().frame_width = Some(width);
    }

    /// Observe a face and compute the balance command for it.
    pub fn track(&self, face_center_x: f64, frame_width: u32) -> f64 {
        let mut inner = self.lock();
        inner.engine.observe_face(face_center_x);
        inner.engine.compute_balance(face_center_x, frame_width)
    }

    /// Ask the throttle for an update slot. Returns the mode to actuate
    /// with when the slot is granted, `None` when this cycle is skipped.
    pub fn claim_update(&self, now_ns: u64) -> Option<BalanceMode> {
        let mut inner = self.lock();
        inner.throttle.try_update(now_ns).then(|| inner.engine.mode())
    }

    /// Claim an unconditional update for `reset`, bypassing the throttle.
    pub fn claim_reset(&self, now_ns: u64) -> BalanceMode {
        let mut inner = self.lock();
        inner.throttle.force_update(now_ns);
        inner.engine.mode()
    }

    /// Calibrate at the most recently observed face position.
    ///
    /// Returns the position the sweet spot was pinned to, or `None` when no
    /// face has been seen yet (nothing changes in that case).
    pub fn calibrate_at_last_face(&self) -> Option<f64> {
        let mut inner = self.lock();
        let face_x = inner.engine.last_face_x()?;
        let width = inner.frame_width?;
        inner.engine.calibrate(face_x, width);
        Some(face_x)
    }

    /// Replace the sensitivity scalar; rejects non-positive values.
    pub fn set_sensitivity(&self, value: f64) -> SweetspotResult<()> {
        self.lock().engine.set_sensitivity(value)
    }

    /// Flip the audio mode; returns the new mode.
    pub fn toggle_mode(&self) -> BalanceMode {
        self.lock().engine.toggle_mode()
    }

    /// Flip the cosmetic filter; returns the new state.
    pub fn toggle_filter(&self) -> bool {
        self.lock().engine.toggle_filter()
    }

    /// Snapshot current state for display purposes.
    pub fn snapshot(&self) -> EngineSnapshot {
        let inner = self.lock();
        EngineSnapshot {
            sensitivity: inner.engine.sensitivity(),
            mode: inner.engine.mode(),
            filter_enabled: inner.engine.filter_enabled(),
            calibrated: inner.engine.calibrated(),
            calibration_offset: inner.engine.calibration_offset(),
            last_face_x: inner.engine.last_face_x(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EngineInner> {
        // A poisoned lock means a panic while holding it; engine state is
        // plain data, so continuing with the last state is sound.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> SharedEngine {
        SharedEngine::from_defaults(&TrackingDefaults::default()).unwrap()
    }

    #[test]
    fn test_claim_update_respects_throttle() {
        let shared = engine();
        // Default interval is 200ms. First claim fires, a claim 100ms later
        // is skipped, a claim 250ms after the first fires again.
        assert!(shared.claim_update(0).is_some());
        assert!(shared.claim_update(100_000_000).is_none());
        assert!(shared.claim_update(250_000_000).is_some());
    }

    #[test]
    fn test_claim_reset_bypasses_throttle() {
        let shared = engine();
        assert!(shared.claim_update(0).is_some());
        // Inside the throttle window, reset still claims.
        let mode = shared.claim_reset(50_000_000);
        assert_eq!(mode, BalanceMode::SystemAudio);
    }

    #[test]
    fn test_calibrate_requires_observed_face() {
        let shared = engine();
        shared.set_frame_width(1000);
        assert!(shared.calibrate_at_last_face().is_none());

        shared.track(600.0, 1000);
        assert_eq!(shared.calibrate_at_last_face(), Some(600.0));
        assert!(shared.snapshot().calibrated);
        assert!((shared.snapshot().calibration_offset - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_track_computes_expected_balance() {
        let shared = engine();
        let balance = shared.track(800.0, 1000);
        assert!((balance - (-0.75)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_sensitivity_is_rejected() {
        let shared = engine();
        assert!(shared.set_sensitivity(0.0).is_err());
        assert!((shared.snapshot().sensitivity - 0.8).abs() < 1e-12);
    }
}
