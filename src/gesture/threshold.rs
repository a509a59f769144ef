// SPDX-License-Identifier: GPL-3.0-only

//! Pinch decision boundary
//!
//! The threshold is either fixed or slowly pulled toward the pinch distances
//! observed while grabbing (an exponential moving average). Only grab frames
//! feed the average, so every grab is assumed to be a true positive.

use crate::constants::gesture::{LEARNING_RATE, PINCH_THRESHOLD_PX, PINCH_THRESHOLD_SPAN};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Unit the pinch threshold is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThresholdUnit {
    /// Raw display pixels; behavior changes with display resolution
    DisplayPixels,
    /// Fraction of the hand's span; resolution independent
    #[default]
    HandSpan,
}

impl ThresholdUnit {
    /// Express a pixel pinch distance in this unit
    pub fn measure(&self, pinch_px: f32, hand_span_px: f32) -> f32 {
        match self {
            ThresholdUnit::DisplayPixels => pinch_px,
            ThresholdUnit::HandSpan => pinch_px / hand_span_px,
        }
    }

    /// Sensible default threshold for this unit
    pub fn default_threshold(&self) -> f32 {
        match self {
            ThresholdUnit::DisplayPixels => PINCH_THRESHOLD_PX,
            ThresholdUnit::HandSpan => PINCH_THRESHOLD_SPAN,
        }
    }
}

/// Fixed or adaptive pinch threshold
#[derive(Debug, Clone, PartialEq)]
pub struct PinchThreshold {
    unit: ThresholdUnit,
    value: f32,
    initial: f32,
    /// Moving-average rate; `None` for a fixed threshold
    learning_rate: Option<f32>,
    updates: u64,
}

impl PinchThreshold {
    pub fn fixed(unit: ThresholdUnit, value: f32) -> Self {
        Self {
            unit,
            value,
            initial: value,
            learning_rate: None,
            updates: 0,
        }
    }

    /// Adaptive threshold; the rate is clamped to [0, 1]
    pub fn adaptive(unit: ThresholdUnit, value: f32, learning_rate: f32) -> Self {
        Self {
            learning_rate: Some(learning_rate.clamp(0.0, 1.0)),
            ..Self::fixed(unit, value)
        }
    }

    /// Adaptive threshold with the default rate
    pub fn adaptive_default(unit: ThresholdUnit) -> Self {
        Self::adaptive(unit, unit.default_threshold(), LEARNING_RATE)
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn unit(&self) -> ThresholdUnit {
        self.unit
    }

    pub fn is_adaptive(&self) -> bool {
        self.learning_rate.is_some()
    }

    /// Number of moving-average updates applied so far
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Whether a pinch measure (in this threshold's unit) is closed
    pub fn is_pinched(&self, measure: f32) -> bool {
        measure < self.value
    }

    /// Feed a measure observed on a grabbing frame
    ///
    /// No-op for fixed thresholds and for non-finite measures.
    pub fn observe_grab(&mut self, measure: f32) {
        let Some(rate) = self.learning_rate else {
            return;
        };
        if !measure.is_finite() {
            return;
        }

        self.value += rate * (measure - self.value);
        self.updates += 1;
        trace!(
            threshold = self.value,
            observed = measure,
            "Adaptive threshold updated"
        );
    }

    /// Return to the starting value
    pub fn reset(&mut self) {
        self.value = self.initial;
        self.updates = 0;
    }
}

impl Default for PinchThreshold {
    fn default() -> Self {
        Self::fixed(ThresholdUnit::DisplayPixels, PINCH_THRESHOLD_PX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_threshold_never_moves() {
        let mut t = PinchThreshold::fixed(ThresholdUnit::DisplayPixels, 45.0);
        t.observe_grab(10.0);
        assert_eq!(t.value(), 45.0);
        assert_eq!(t.updates(), 0);
        assert!(!t.is_adaptive());
    }

    #[test]
    fn test_single_update_step() {
        let mut t = PinchThreshold::adaptive(ThresholdUnit::DisplayPixels, 45.0, 0.05);
        t.observe_grab(25.0);
        assert!((t.value() - 44.0).abs() < 1e-5);
    }

    #[test]
    fn test_adaptive_converges_to_observed_distance() {
        let mut t = PinchThreshold::adaptive(ThresholdUnit::DisplayPixels, 45.0, 0.05);
        for _ in 0..300 {
            t.observe_grab(20.0);
        }
        // 25 * 0.95^300 is far below the tolerance
        assert!((t.value() - 20.0).abs() < 0.01);
        assert_eq!(t.updates(), 300);
    }

    #[test]
    fn test_non_finite_observation_ignored() {
        let mut t = PinchThreshold::adaptive(ThresholdUnit::HandSpan, 0.25, 0.05);
        t.observe_grab(f32::NAN);
        assert_eq!(t.value(), 0.25);
    }

    #[test]
    fn test_reset_restores_initial() {
        let mut t = PinchThreshold::adaptive_default(ThresholdUnit::DisplayPixels);
        t.observe_grab(0.0);
        assert!(t.value() < PINCH_THRESHOLD_PX);
        t.reset();
        assert_eq!(t.value(), PINCH_THRESHOLD_PX);
    }

    #[test]
    fn test_pinched_is_strict() {
        let t = PinchThreshold::fixed(ThresholdUnit::DisplayPixels, 45.0);
        assert!(t.is_pinched(44.9));
        assert!(!t.is_pinched(45.0));
    }

    #[test]
    fn test_hand_span_measure() {
        assert_eq!(ThresholdUnit::HandSpan.measure(50.0, 200.0), 0.25);
        assert_eq!(ThresholdUnit::DisplayPixels.measure(50.0, 200.0), 50.0);
    }
}
