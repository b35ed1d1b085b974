//! The balance state machine: calibration, sensitivity, and the
//! offset-to-balance mapping.

use serde::{Deserialize, Serialize};
use sweetspot_common::error::{SweetspotError, SweetspotResult};

/// Which audio path receives balance commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BalanceMode {
    /// The OS volume balance slider.
    #[default]
    SystemAudio,
    /// The eqMac third-party equalizer.
    EqMac,
}

impl BalanceMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::SystemAudio => Self::EqMac,
            Self::EqMac => Self::SystemAudio,
        }
    }

    /// Human-readable label for status output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SystemAudio => "system audio",
            Self::EqMac => "eqMac",
        }
    }
}

/// The balance engine state machine.
///
/// Owns every piece of mutable tracking state: the calibration offset, the
/// sensitivity scalar, the active audio mode, the cosmetic filter flag, and
/// the last observed face position. Pure computation; the caller is
/// responsible for throttling and for actually driving the audio backend.
#[derive(Debug, Clone)]
pub struct BalanceEngine {
    /// Sweet-spot center, as a signed pixel offset from frame center.
    calibration_offset: f64,
    /// Positive divisor scaling how quickly balance changes with movement.
    sensitivity: f64,
    /// Active audio path.
    mode: BalanceMode,
    /// Cosmetic preview filter; never affects balance computation.
    filter_enabled: bool,
    /// Whether the user has calibrated a sweet spot this session.
    calibrated: bool,
    /// Horizontal center of the most recently observed face.
    last_face_x: Option<f64>,
}

impl Default for BalanceEngine {
    fn default() -> Self {
        Self {
            calibration_offset: 0.0,
            sensitivity: 0.8,
            mode: BalanceMode::SystemAudio,
            filter_enabled: false,
            calibrated: false,
            last_face_x: None,
        }
    }
}

impl BalanceEngine {
    /// Create an engine with explicit initial settings.
    ///
    /// Fails with `InvalidParameter` if `sensitivity` is not positive.
    pub fn new(sensitivity: f64, mode: BalanceMode, filter_enabled: bool) -> SweetspotResult<Self> {
        if !(sensitivity > 0.0) {
            return Err(SweetspotError::invalid_parameter(format!(
                "sensitivity must be > 0, got {sensitivity}"
            )));
        }
        Ok(Self {
            calibration_offset: 0.0,
            sensitivity,
            mode,
            filter_enabled,
            calibrated: false,
            last_face_x: None,
        })
    }

    /// Map a face position to a balance command in [-1.0, 1.0].
    ///
    /// The offset from the (calibrated) center is normalized by
    /// `center * sensitivity`, clamped, and negated: the channel on the side
    /// the listener moved toward gets louder, pulling the sweet spot with
    /// them. -1.0 is full left, 0.0 centered, 1.0 full right.
    pub fn compute_balance(&self, face_center_x: f64, frame_width: u32) -> f64 {
        let center = frame_width as f64 / 2.0 + self.calibration_offset;
        if center <= f64::EPSILON {
            // Calibrated at the frame edge; the normalization basis is gone.
            return 0.0;
        }
        let offset = face_center_x - center;
        let normalized = offset / (center * self.sensitivity);
        -normalized.clamp(-1.0, 1.0)
    }

    /// Record the most recently detected face position.
    pub fn observe_face(&mut self, face_center_x: f64) {
        self.last_face_x = Some(face_center_x);
    }

    /// Horizontal center of the most recently observed face, if any.
    pub fn last_face_x(&self) -> Option<f64> {
        self.last_face_x
    }

    /// Redefine the sweet spot so `face_center_x` maps to balance 0.0.
    ///
    /// Idempotent: calibrating twice at the same position is a no-op.
    pub fn calibrate(&mut self, face_center_x: f64, frame_width: u32) {
        self.calibration_offset = face_center_x - frame_width as f64 / 2.0;
        self.calibrated = true;
    }

    /// Current calibration offset in pixels from frame center.
    pub fn calibration_offset(&self) -> f64 {
        self.calibration_offset
    }

    /// Whether an explicit calibration has happened this session.
    pub fn calibrated(&self) -> bool {
        self.calibrated
    }

    /// Replace the sensitivity scalar.
    ///
    /// Fails with `InvalidParameter` for non-positive values; the previous
    /// sensitivity is retained on failure. Takes effect on the next
    /// computation, not retroactively.
    pub fn set_sensitivity(&mut self, value: f64) -> SweetspotResult<()> {
        if !(value > 0.0) {
            return Err(SweetspotError::invalid_parameter(format!(
                "sensitivity must be > 0, got {value}"
            )));
        }
        self.sensitivity = value;
        Ok(())
    }

    /// Current sensitivity scalar.
    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Flip between system audio and eqMac. Returns the new mode.
    pub fn toggle_mode(&mut self) -> BalanceMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    /// Active audio mode.
    pub fn mode(&self) -> BalanceMode {
        self.mode
    }

    /// Flip the cosmetic filter flag. Returns the new state.
    /// Independent of the audio mode; affects only the preview path.
    pub fn toggle_filter(&mut self) -> bool {
        self.filter_enabled = !self.filter_enabled;
        self.filter_enabled
    }

    /// Whether the cosmetic filter is enabled.
    pub fn filter_enabled(&self) -> bool {
        self.filter_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_uncalibrated_scenario() {
        // frameWidth=1000, face at 800: center=500, offset=300,
        // normalized = 300 / (500 * 0.8) = 0.75, inverted.
        let engine = BalanceEngine::default();
        assert!((engine.compute_balance(800.0, 1000) - (-0.75)).abs() < 1e-9);
    }

    #[test]
    fn test_centered_face_maps_to_zero() {
        let engine = BalanceEngine::default();
        assert!(engine.compute_balance(500.0, 1000).abs() < 1e-9);
    }

    #[test]
    fn test_calibrated_scenario() {
        let mut engine = BalanceEngine::default();
        engine.calibrate(600.0, 1000);
        assert!((engine.calibration_offset() - 100.0).abs() < 1e-9);

        // The calibration point now maps to centered balance.
        assert!(engine.compute_balance(600.0, 1000).abs() < 1e-9);

        // face at 700: offset=100, normalized = 100 / (600 * 0.8) ~ 0.2083
        let balance = engine.compute_balance(700.0, 1000);
        assert!((balance - (-100.0 / 480.0)).abs() < 1e-9);
    }

    #[test]
    fn test_calibrate_is_idempotent() {
        let mut engine = BalanceEngine::default();
        engine.calibrate(640.0, 1280);
        let first = engine.calibration_offset();
        engine.calibrate(640.0, 1280);
        assert_eq!(engine.calibration_offset(), first);
    }

    #[test]
    fn test_set_sensitivity_rejects_non_positive() {
        let mut engine = BalanceEngine::default();
        assert!(engine.set_sensitivity(0.0).is_err());
        assert!(engine.set_sensitivity(-1.0).is_err());
        // Value unchanged after rejected updates.
        assert!((engine.sensitivity() - 0.8).abs() < 1e-12);

        assert!(engine.set_sensitivity(1.5).is_ok());
        assert!((engine.sensitivity() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_set_sensitivity_rejects_nan() {
        let mut engine = BalanceEngine::default();
        assert!(engine.set_sensitivity(f64::NAN).is_err());
    }

    #[test]
    fn test_new_validates_sensitivity() {
        assert!(BalanceEngine::new(0.0, BalanceMode::SystemAudio, false).is_err());
        assert!(BalanceEngine::new(0.8, BalanceMode::EqMac, true).is_ok());
    }

    #[test]
    fn test_toggle_mode_round_trips() {
        let mut engine = BalanceEngine::default();
        let original = engine.mode();
        engine.toggle_mode();
        assert_ne!(engine.mode(), original);
        engine.toggle_mode();
        assert_eq!(engine.mode(), original);
    }

    #[test]
    fn test_filter_and_mode_are_independent() {
        let mut engine = BalanceEngine::default();
        let mode = engine.mode();
        engine.toggle_filter();
        assert_eq!(engine.mode(), mode);
        assert!(engine.filter_enabled());
        engine.toggle_mode();
        assert!(engine.filter_enabled());
    }

    #[test]
    fn test_edge_calibration_degrades_to_center() {
        let mut engine = BalanceEngine::default();
        engine.calibrate(0.0, 1000);
        // Calibration at x=0 pushes the center to the left frame edge;
        // the mapping degrades to centered output instead of dividing by zero.
        engine.calibrate(-500.0, 1000);
        assert_eq!(engine.compute_balance(300.0, 1000), 0.0);
    }

    proptest! {
        #[test]
        fn balance_is_always_bounded(
            face_x in 0.0f64..=4096.0,
            frame_width in 1u32..=4096,
            sensitivity in 0.05f64..=5.0,
            calibration_x in 0.0f64..=4096.0,
        ) {
            let mut engine =
                BalanceEngine::new(sensitivity, BalanceMode::SystemAudio, false).unwrap();
            engine.calibrate(calibration_x, frame_width);
            let balance = engine.compute_balance(face_x, frame_width);
            prop_assert!((-1.0..=1.0).contains(&balance));
        }

        #[test]
        fn calibration_point_maps_to_zero(
            calibration_x in 1.0f64..=4095.0,
            frame_width in 1u32..=4096,
            sensitivity in 0.05f64..=5.0,
        ) {
            let mut engine =
                BalanceEngine::new(sensitivity, BalanceMode::SystemAudio, false).unwrap();
            engine.calibrate(calibration_x, frame_width);
            let balance = engine.compute_balance(calibration_x, frame_width);
            prop_assert!(balance.abs() < 1e-9);
        }
    }
}
