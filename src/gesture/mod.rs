// SPDX-License-Identifier: GPL-3.0-only

//! Gesture pipeline
//!
//! Turns raw hand landmarks into interaction states: map into display space,
//! measure the pinch, decide idle/tracking/grabbing, and optionally adapt the
//! pinch threshold from observed grabs.

pub mod evaluator;
pub mod mapper;
pub mod threshold;
pub mod types;

pub use evaluator::{
    AgentMetrics, DrawGate, EvaluatorConfig, Evaluation, GestureEvaluator, GrabRule,
    InteractionState, TrackingPoint, agent_size,
};
pub use mapper::{CoordinateMapper, MappingPolicy, Transform, mirror_x};
pub use threshold::{PinchThreshold, ThresholdUnit};
pub use types::{DetectionFrame, FrameSize, LandmarkSet, Point};
