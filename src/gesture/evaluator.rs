// SPDX-License-Identifier: GPL-3.0-only

//! Gesture evaluation ("critic")
//!
//! Reduces a mapped hand to a pinch distance, a per-frame speed and one of
//! three interaction states. The evaluator also owns the previous-position
//! trackers: they are reset whenever the hand disappears so the first frame
//! after it returns can never produce a segment from a stale or origin point.

use crate::constants::gesture::{AGENT_SIZE_DOMAIN, AGENT_SIZE_RANGE, SPEED_THRESHOLD};
use crate::gesture::threshold::PinchThreshold;
use crate::gesture::types::{LandmarkSet, Point};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Interaction state for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionState {
    /// No hand this frame
    #[default]
    Idle,
    /// Hand present, not grabbing
    Tracking,
    /// Hand present and pinched
    Grabbing,
}

impl InteractionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Tracking => "TRACKING",
            Self::Grabbing => "GRABBING",
        }
    }

    pub fn hand_present(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl std::fmt::Display for InteractionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule deciding when a present hand is grabbing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GrabRule {
    /// Pinch below threshold
    PinchOnly,
    /// Pinch below threshold and index tip moving slower than the speed limit
    #[default]
    PinchAndSpeed,
}

/// When a grabbing frame is allowed to commit ink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrawGate {
    /// Every grabbing frame draws
    #[default]
    EveryGrab,
    /// Only the second and later of consecutive grabbing frames draw
    ConsecutiveGrabs,
}

/// Which point of the hand the brush follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackingPoint {
    #[default]
    IndexTip,
    /// Halfway between thumb and index tips
    PinchMidpoint,
}

impl TrackingPoint {
    fn locate(&self, hand: &LandmarkSet) -> Point {
        match self {
            TrackingPoint::IndexTip => hand.index_tip(),
            TrackingPoint::PinchMidpoint => hand.index_tip().midpoint(hand.thumb_tip()),
        }
    }
}

/// Evaluator tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluatorConfig {
    pub grab_rule: GrabRule,
    pub draw_gate: DrawGate,
    pub tracking_point: TrackingPoint,
    /// Index-tip travel per frame, display pixels
    pub speed_threshold: f32,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            grab_rule: GrabRule::default(),
            draw_gate: DrawGate::default(),
            tracking_point: TrackingPoint::default(),
            speed_threshold: SPEED_THRESHOLD,
        }
    }
}

/// Derived per-frame values
///
/// Held stale while no hand is present; check the state before trusting them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AgentMetrics {
    /// Thumb-to-index distance, display pixels
    pub pinch_distance: f32,
    /// Index-tip travel since the previous frame, display pixels
    pub speed: f32,
    /// Brush position
    pub position: Point,
    /// Indicator size derived from the pinch distance
    pub size: f32,
}

/// Result of evaluating one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub state: InteractionState,
    pub metrics: AgentMetrics,
    /// Pinch distance in the threshold's unit
    pub pinch_measure: f32,
    /// Threshold the frame was judged against
    pub threshold: f32,
    /// Whether this frame may commit ink
    pub draws: bool,
    /// Brush position of the previous frame; `None` right after the hand appears
    pub previous_position: Option<Point>,
}

/// Linear remap of `value` from `domain` to `range`, clamped to the range
pub fn remap_clamped(value: f32, domain: (f32, f32), range: (f32, f32)) -> f32 {
    let (d0, d1) = domain;
    let (r0, r1) = range;
    if d1 == d0 {
        return r0;
    }
    let t = ((value - d0) / (d1 - d0)).clamp(0.0, 1.0);
    r0 + t * (r1 - r0)
}

/// Agent indicator size for a pinch distance
pub fn agent_size(pinch_distance: f32) -> f32 {
    remap_clamped(pinch_distance, AGENT_SIZE_DOMAIN, AGENT_SIZE_RANGE)
}

/// Per-frame gesture state machine
#[derive(Debug, Clone)]
pub struct GestureEvaluator {
    config: EvaluatorConfig,
    threshold: PinchThreshold,
    state: InteractionState,
    metrics: AgentMetrics,
    previous_index: Option<Point>,
    previous_position: Option<Point>,
}

impl GestureEvaluator {
    pub fn new(config: EvaluatorConfig, threshold: PinchThreshold) -> Self {
        Self {
            config,
            threshold,
            state: InteractionState::Idle,
            metrics: AgentMetrics::default(),
            previous_index: None,
            previous_position: None,
        }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn threshold(&self) -> &PinchThreshold {
        &self.threshold
    }

    pub fn threshold_mut(&mut self) -> &mut PinchThreshold {
        &mut self.threshold
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Last computed metrics (stale while idle)
    pub fn metrics(&self) -> &AgentMetrics {
        &self.metrics
    }

    pub fn previous_position(&self) -> Option<Point> {
        self.previous_position
    }

    /// Evaluate one frame
    ///
    /// `hand` must already be in display space.
    pub fn evaluate(&mut self, hand: Option<&LandmarkSet>) -> Evaluation {
        let Some(hand) = hand else {
            return self.go_idle();
        };

        let index = hand.index_tip();
        let thumb = hand.thumb_tip();
        let position = self.config.tracking_point.locate(hand);

        let pinch_distance = index.distance(thumb);
        let speed = self
            .previous_index
            .map(|prev| index.distance(prev))
            .unwrap_or(0.0);

        self.metrics = AgentMetrics {
            pinch_distance,
            speed,
            position,
            size: agent_size(pinch_distance),
        };

        let pinch_measure = self.threshold.unit().measure(pinch_distance, hand.span());
        let threshold = self.threshold.value();
        let pinched = self.threshold.is_pinched(pinch_measure);
        let grabbing = match self.config.grab_rule {
            GrabRule::PinchOnly => pinched,
            GrabRule::PinchAndSpeed => pinched && speed < self.config.speed_threshold,
        };

        let state = if grabbing {
            InteractionState::Grabbing
        } else {
            InteractionState::Tracking
        };

        let draws = grabbing
            && match self.config.draw_gate {
                DrawGate::EveryGrab => true,
                DrawGate::ConsecutiveGrabs => self.state == InteractionState::Grabbing,
            };

        if grabbing {
            self.threshold.observe_grab(pinch_measure);
        }

        if state != self.state {
            debug!(
                from = %self.state,
                to = %state,
                pinch = pinch_distance,
                speed,
                "Interaction state changed"
            );
        }
        trace!(pinch = pinch_distance, pinch_measure, speed, threshold, %state, "Evaluated frame");

        let evaluation = Evaluation {
            state,
            metrics: self.metrics,
            pinch_measure,
            threshold,
            draws,
            previous_position: self.previous_position,
        };

        self.state = state;
        self.previous_index = Some(index);
        self.previous_position = Some(position);

        evaluation
    }

    /// Clear trackers and state, keeping the learned threshold
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
        self.previous_index = None;
        self.previous_position = None;
    }

    fn go_idle(&mut self) -> Evaluation {
        if self.state != InteractionState::Idle {
            debug!(from = %self.state, "Hand lost");
        }
        self.reset();

        Evaluation {
            state: InteractionState::Idle,
            metrics: self.metrics,
            pinch_measure: f32::NAN,
            threshold: self.threshold.value(),
            draws: false,
            previous_position: None,
        }
    }
}

impl Default for GestureEvaluator {
    fn default() -> Self {
        Self::new(EvaluatorConfig::default(), PinchThreshold::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::threshold::ThresholdUnit;
    use crate::gesture::types::hand_with_tips;

    fn pixel_evaluator(rule: GrabRule, gate: DrawGate) -> GestureEvaluator {
        GestureEvaluator::new(
            EvaluatorConfig {
                grab_rule: rule,
                draw_gate: gate,
                ..EvaluatorConfig::default()
            },
            PinchThreshold::fixed(ThresholdUnit::DisplayPixels, 45.0),
        )
    }

    #[test]
    fn test_agent_size_remap() {
        assert_eq!(agent_size(10.0), 10.0);
        assert_eq!(agent_size(20.0), 10.0);
        assert_eq!(agent_size(110.0), 35.0);
        assert_eq!(agent_size(200.0), 60.0);
        assert_eq!(agent_size(300.0), 60.0);
    }

    #[test]
    fn test_agent_size_monotonic() {
        let mut prev = agent_size(0.0);
        for d in 1..400 {
            let size = agent_size(d as f32);
            assert!(size >= prev);
            prev = size;
        }
    }

    #[test]
    fn test_remap_degenerate_domain() {
        assert_eq!(remap_clamped(5.0, (3.0, 3.0), (1.0, 2.0)), 1.0);
    }

    #[test]
    fn test_pinched_and_slow_is_grabbing() {
        let mut eval = pixel_evaluator(GrabRule::PinchAndSpeed, DrawGate::EveryGrab);
        let hand = hand_with_tips(Point::new(100.0, 100.0), Point::new(110.0, 100.0));
        let result = eval.evaluate(Some(&hand));
        assert_eq!(result.state, InteractionState::Grabbing);
        assert_eq!(result.metrics.pinch_distance, 10.0);
        assert_eq!(result.metrics.speed, 0.0);
        assert!(result.draws);
        assert_eq!(result.previous_position, None);
    }

    #[test]
    fn test_open_hand_is_tracking() {
        let mut eval = pixel_evaluator(GrabRule::PinchAndSpeed, DrawGate::EveryGrab);
        for d in [45.0, 46.0, 120.0] {
            let hand = hand_with_tips(Point::new(100.0, 100.0), Point::new(100.0 + d, 100.0));
            assert_eq!(eval.evaluate(Some(&hand)).state, InteractionState::Tracking);
        }
    }

    #[test]
    fn test_fast_pinch_is_tracking() {
        let mut eval = pixel_evaluator(GrabRule::PinchAndSpeed, DrawGate::EveryGrab);
        eval.evaluate(Some(&hand_with_tips(
            Point::new(100.0, 100.0),
            Point::new(105.0, 100.0),
        )));
        let moved = hand_with_tips(Point::new(120.0, 100.0), Point::new(125.0, 100.0));
        let result = eval.evaluate(Some(&moved));
        assert_eq!(result.metrics.speed, 20.0);
        assert_eq!(result.state, InteractionState::Tracking);
        assert!(!result.draws);
    }

    #[test]
    fn test_pinch_only_ignores_speed() {
        let mut eval = pixel_evaluator(GrabRule::PinchOnly, DrawGate::EveryGrab);
        eval.evaluate(Some(&hand_with_tips(
            Point::new(100.0, 100.0),
            Point::new(105.0, 100.0),
        )));
        let moved = hand_with_tips(Point::new(160.0, 100.0), Point::new(165.0, 100.0));
        assert_eq!(
            eval.evaluate(Some(&moved)).state,
            InteractionState::Grabbing
        );
    }

    #[test]
    fn test_no_hand_resets_trackers() {
        let mut eval = pixel_evaluator(GrabRule::PinchAndSpeed, DrawGate::EveryGrab);
        let hand = hand_with_tips(Point::new(100.0, 100.0), Point::new(105.0, 100.0));
        eval.evaluate(Some(&hand));
        assert!(eval.previous_position().is_some());

        let idle = eval.evaluate(None);
        assert_eq!(idle.state, InteractionState::Idle);
        assert!(!idle.draws);
        assert_eq!(eval.previous_position(), None);
        // Metrics are left stale
        assert_eq!(idle.metrics.pinch_distance, 5.0);

        // The first frame back has no previous position and zero speed
        let back = eval.evaluate(Some(&hand_with_tips(
            Point::new(300.0, 300.0),
            Point::new(305.0, 300.0),
        )));
        assert_eq!(back.previous_position, None);
        assert_eq!(back.metrics.speed, 0.0);
    }

    #[test]
    fn test_consecutive_gate_skips_first_grab() {
        let mut eval = pixel_evaluator(GrabRule::PinchAndSpeed, DrawGate::ConsecutiveGrabs);
        let hand = hand_with_tips(Point::new(100.0, 100.0), Point::new(105.0, 100.0));
        let first = eval.evaluate(Some(&hand));
        assert_eq!(first.state, InteractionState::Grabbing);
        assert!(!first.draws);
        let second = eval.evaluate(Some(&hand));
        assert!(second.draws);
    }

    #[test]
    fn test_midpoint_tracking() {
        let mut eval = GestureEvaluator::new(
            EvaluatorConfig {
                tracking_point: TrackingPoint::PinchMidpoint,
                ..EvaluatorConfig::default()
            },
            PinchThreshold::default(),
        );
        let hand = hand_with_tips(Point::new(100.0, 100.0), Point::new(110.0, 100.0));
        assert_eq!(
            eval.evaluate(Some(&hand)).metrics.position,
            Point::new(105.0, 100.0)
        );
    }

    #[test]
    fn test_adaptive_threshold_only_learns_from_grabs() {
        let mut eval = GestureEvaluator::new(
            EvaluatorConfig::default(),
            PinchThreshold::adaptive(ThresholdUnit::DisplayPixels, 45.0, 0.05),
        );
        let open = hand_with_tips(Point::new(100.0, 100.0), Point::new(190.0, 100.0));
        eval.evaluate(Some(&open));
        eval.evaluate(None);
        assert_eq!(eval.threshold().value(), 45.0);

        let pinched = hand_with_tips(Point::new(100.0, 100.0), Point::new(125.0, 100.0));
        eval.evaluate(Some(&pinched));
        assert!((eval.threshold().value() - 44.0).abs() < 1e-5);
    }
}
