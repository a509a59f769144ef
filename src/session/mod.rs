// SPDX-License-Identifier: GPL-3.0-only

//! Sketch session
//!
//! [`SketchSession`] is the context object that owns every piece of
//! per-session state: the coordinate mapper, the gesture evaluator with its
//! threshold, the stroke surface and the status text. One call to
//! [`SketchSession::tick`] runs the whole per-frame pipeline synchronously.
//!
//! Classification is split in two halves so the async work never touches the
//! session: [`SketchSession::begin_classification`] hands out a detached
//! snapshot plus a sequence-numbered ticket, and
//! [`SketchSession::finish_classification`] applies the reply later.

pub mod dispatch;
pub mod latest;

pub use dispatch::{ClassifyDispatcher, ClassifyReply};
pub use latest::{LatestReceiver, LatestSender, latest_slot};

use crate::config::Config;
use crate::constants::status;
use crate::errors::ClassifyError;
use crate::gesture::{
    AgentMetrics, CoordinateMapper, DetectionFrame, GestureEvaluator, InteractionState,
    LandmarkSet, PinchThreshold,
};
use crate::sketch::{Classification, SketchSnapshot, StrokeSurface, status_text};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Handling of classification replies that complete out of order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StaleReplyPolicy {
    /// Whichever reply lands last sets the text, even if it was requested
    /// earlier than the one already shown
    #[default]
    LastWriteWins,
    /// Drop replies older than the newest applied reply or the last clear
    RejectStale,
}

/// Identifies one classification request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassifyTicket(u64);

impl ClassifyTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

/// Outcome of one frame tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Tick number, starting at 1
    pub frame: u64,
    pub state: InteractionState,
    /// Current metrics; stale when `state` is idle
    pub metrics: AgentMetrics,
    /// Threshold in effect for this frame
    pub threshold: f32,
    /// Whether ink was committed this frame
    pub drew: bool,
}

/// Per-session pipeline state
#[derive(Debug)]
pub struct SketchSession {
    mapper: CoordinateMapper,
    evaluator: GestureEvaluator,
    surface: StrokeSurface,
    status: String,
    stale_policy: StaleReplyPolicy,
    next_sequence: u64,
    /// Replies with a lower sequence number are stale
    stale_before: u64,
    in_flight: usize,
    frame: u64,
    mapped_hand: Option<LandmarkSet>,
}

impl SketchSession {
    pub fn new(config: &Config) -> Self {
        let surface_size = config.surface_size();
        Self::from_parts(
            CoordinateMapper::new(config.mapping_policy, surface_size),
            GestureEvaluator::new(config.evaluator_config(), config.pinch_threshold()),
            StrokeSurface::with_brush(surface_size, config.brush_width, config.snapshot_size),
            config.stale_replies,
        )
    }

    /// Assemble a session from explicit components
    ///
    /// The mapper's display size should match the surface size; ink is drawn
    /// in display coordinates.
    pub fn from_parts(
        mapper: CoordinateMapper,
        evaluator: GestureEvaluator,
        surface: StrokeSurface,
        stale_policy: StaleReplyPolicy,
    ) -> Self {
        if mapper.display() != surface.size() {
            warn!(
                display = %mapper.display(),
                surface = %surface.size(),
                "Display and surface sizes differ; ink will not line up with the preview"
            );
        }

        Self {
            mapper,
            evaluator,
            surface,
            status: status::PROMPT.to_string(),
            stale_policy,
            next_sequence: 0,
            stale_before: 0,
            in_flight: 0,
            frame: 0,
            mapped_hand: None,
        }
    }

    /// Run one frame of the gesture pipeline
    ///
    /// `detection` is the latest detector output, or `None` if the detector has
    /// not produced anything yet. Both cases without a hand resolve to idle,
    /// as does a hand reported against an empty source size.
    pub fn tick(&mut self, detection: Option<&DetectionFrame>) -> FrameReport {
        self.frame += 1;

        self.mapped_hand = detection.and_then(|d| {
            let hand = d.primary_hand()?;
            if d.source.is_empty() {
                debug!(source = %d.source, "Ignoring hand in frame with empty source size");
                return None;
            }
            Some(self.mapper.map_hand(hand, d.source))
        });

        let evaluation = self.evaluator.evaluate(self.mapped_hand.as_ref());

        let drew = evaluation.draws
            && self
                .surface
                .append_segment(evaluation.previous_position, evaluation.metrics.position);

        FrameReport {
            frame: self.frame,
            state: evaluation.state,
            metrics: evaluation.metrics,
            threshold: evaluation.threshold,
            drew,
        }
    }

    /// Erase the drawing and restore the prompt
    pub fn clear(&mut self) {
        self.surface.clear();
        self.status = status::PROMPT.to_string();
        if self.stale_policy == StaleReplyPolicy::RejectStale {
            self.stale_before = self.next_sequence;
        }
        info!("Drawing cleared");
    }

    /// Start a classification request
    ///
    /// Returns the ticket to pass back with the reply and a snapshot that is
    /// independent of any strokes drawn afterwards.
    pub fn begin_classification(&mut self) -> (ClassifyTicket, SketchSnapshot) {
        let ticket = ClassifyTicket(self.next_sequence);
        self.next_sequence += 1;
        self.in_flight += 1;
        self.status = status::ANALYZING.to_string();
        debug!(sequence = ticket.0, "Classification requested");
        (ticket, self.surface.snapshot())
    }

    /// Apply a classification reply
    ///
    /// Returns whether the status text was updated. Errors are logged and
    /// shown as a fixed message.
    pub fn finish_classification(
        &mut self,
        ticket: ClassifyTicket,
        result: Result<Vec<Classification>, ClassifyError>,
    ) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.stale_policy == StaleReplyPolicy::RejectStale && ticket.0 < self.stale_before {
            debug!(
                sequence = ticket.0,
                stale_before = self.stale_before,
                "Dropping stale classification reply"
            );
            return false;
        }

        match &result {
            Ok(results) => {
                if let Some(top) = results.first() {
                    info!(label = %top.label, confidence = top.confidence, "Sketch classified");
                }
            }
            Err(e) => warn!(error = %e, sequence = ticket.0, "Classification failed"),
        }

        self.status = status_text(&result);
        self.stale_before = self.stale_before.max(ticket.0 + 1);
        true
    }

    /// Text for the HUD: prompt, progress or last result
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn state(&self) -> InteractionState {
        self.evaluator.state()
    }

    pub fn metrics(&self) -> &AgentMetrics {
        self.evaluator.metrics()
    }

    pub fn threshold(&self) -> &PinchThreshold {
        self.evaluator.threshold()
    }

    pub fn surface(&self) -> &StrokeSurface {
        &self.surface
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Primary hand of the last tick in display space, for overlays
    pub fn mapped_hand(&self) -> Option<&LandmarkSet> {
        self.mapped_hand.as_ref()
    }

    /// Classification requests still awaiting a reply
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{
        EvaluatorConfig, FrameSize, MappingPolicy, Point, ThresholdUnit, types::hand_with_tips,
    };

    fn pixel_session(policy: StaleReplyPolicy) -> SketchSession {
        let size = FrameSize::new(200, 200);
        SketchSession::from_parts(
            CoordinateMapper::new(MappingPolicy::Letterbox, size),
            GestureEvaluator::new(
                EvaluatorConfig::default(),
                PinchThreshold::fixed(ThresholdUnit::DisplayPixels, 45.0),
            ),
            StrokeSurface::with_brush(size, 10.0, 32),
            policy,
        )
    }

    fn frame(index: Point, thumb: Point) -> DetectionFrame {
        DetectionFrame::new(FrameSize::new(200, 200), vec![hand_with_tips(index, thumb)])
    }

    #[test]
    fn test_first_grab_frame_does_not_draw() {
        let mut session = pixel_session(StaleReplyPolicy::LastWriteWins);
        let report = session.tick(Some(&frame(
            Point::new(100.0, 100.0),
            Point::new(110.0, 100.0),
        )));
        assert_eq!(report.state, InteractionState::Grabbing);
        assert!(!report.drew);
        assert!(session.surface().is_blank());
    }

    #[test]
    fn test_slow_grab_draws_segment() {
        let mut session = pixel_session(StaleReplyPolicy::LastWriteWins);
        session.tick(Some(&frame(Point::new(100.0, 100.0), Point::new(105.0, 100.0))));
        let report = session.tick(Some(&frame(Point::new(105.0, 100.0), Point::new(110.0, 100.0))));
        assert!(report.drew);
        assert!(session.surface().is_inked(102, 100));
    }

    #[test]
    fn test_no_detection_is_idle() {
        let mut session = pixel_session(StaleReplyPolicy::LastWriteWins);
        assert_eq!(session.tick(None).state, InteractionState::Idle);
        let empty = DetectionFrame::empty(FrameSize::new(200, 200));
        assert_eq!(session.tick(Some(&empty)).state, InteractionState::Idle);
        assert!(session.mapped_hand().is_none());
        assert_eq!(session.frame_count(), 2);
    }

    #[test]
    fn test_empty_source_hand_is_idle_and_keeps_threshold() {
        let size = FrameSize::new(200, 200);
        let mut session = SketchSession::from_parts(
            CoordinateMapper::new(MappingPolicy::Letterbox, size),
            GestureEvaluator::new(
                EvaluatorConfig::default(),
                PinchThreshold::adaptive(ThresholdUnit::HandSpan, 0.25, 0.05),
            ),
            StrokeSurface::with_brush(size, 10.0, 32),
            StaleReplyPolicy::LastWriteWins,
        );
        let degenerate = DetectionFrame::new(
            FrameSize::new(0, 0),
            vec![hand_with_tips(Point::new(10.0, 10.0), Point::new(12.0, 10.0))],
        );

        for _ in 0..100 {
            assert_eq!(session.tick(Some(&degenerate)).state, InteractionState::Idle);
        }
        assert!(session.mapped_hand().is_none());
        assert_eq!(session.threshold().updates(), 0);
        assert!((session.threshold().value() - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_clear_restores_prompt() {
        let mut session = pixel_session(StaleReplyPolicy::LastWriteWins);
        let (ticket, _) = session.begin_classification();
        assert_eq!(session.status(), status::ANALYZING);
        session.finish_classification(ticket, Ok(vec![Classification::new("cat", 0.5)]));
        assert_eq!(session.status(), "cat (50.0%)");

        session.clear();
        session.clear();
        assert_eq!(session.status(), status::PROMPT);
        assert!(session.surface().snapshot().is_blank());
    }

    #[test]
    fn test_error_reply_shows_fixed_message() {
        let mut session = pixel_session(StaleReplyPolicy::LastWriteWins);
        let (ticket, _) = session.begin_classification();
        assert!(session.finish_classification(
            ticket,
            Err(ClassifyError::ProcessFailed("boom".to_string()))
        ));
        assert_eq!(session.status(), status::CLASSIFY_ERROR);
        assert_eq!(session.in_flight(), 0);
    }

    #[test]
    fn test_last_write_wins_accepts_late_reply() {
        let mut session = pixel_session(StaleReplyPolicy::LastWriteWins);
        let (old, _) = session.begin_classification();
        let (new, _) = session.begin_classification();
        session.finish_classification(new, Ok(vec![Classification::new("new", 0.9)]));
        assert!(session.finish_classification(old, Ok(vec![Classification::new("old", 0.1)])));
        assert_eq!(session.status(), "old (10.0%)");
    }

    #[test]
    fn test_reject_stale_drops_late_reply() {
        let mut session = pixel_session(StaleReplyPolicy::RejectStale);
        let (old, _) = session.begin_classification();
        let (new, _) = session.begin_classification();
        session.finish_classification(new, Ok(vec![Classification::new("new", 0.9)]));
        assert!(!session.finish_classification(old, Ok(vec![Classification::new("old", 0.1)])));
        assert_eq!(session.status(), "new (90.0%)");
    }

    #[test]
    fn test_reject_stale_drops_reply_from_before_clear() {
        let mut session = pixel_session(StaleReplyPolicy::RejectStale);
        let (ticket, _) = session.begin_classification();
        session.clear();
        assert!(!session.finish_classification(ticket, Ok(vec![Classification::new("x", 1.0)])));
        assert_eq!(session.status(), status::PROMPT);
    }
}
