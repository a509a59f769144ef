// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic hand driven by a pointer
//!
//! Stands in for a camera detector: the index fingertip follows the pointer,
//! and holding the button brings the thumb tip to the index tip. Useful for
//! exercising the pipeline without a detector model.

use crate::constants::landmarks;
use crate::gesture::{DetectionFrame, FrameSize, LandmarkSet, Point};

/// Fraction of the frame height covered by the synthetic hand
const HAND_HEIGHT_RATIO: f32 = 0.3;

/// Landmark offsets from the index tip for a right hand pointing up,
/// in units of hand height. Slot 4 (thumb tip) is replaced per pose.
const OPEN_HAND: [(f32, f32); landmarks::COUNT] = [
    (0.15, 1.0),
    (-0.05, 0.85),
    (-0.2, 0.7),
    (-0.3, 0.55),
    (-0.35, 0.4),
    (0.0, 0.55),
    (0.0, 0.35),
    (0.0, 0.17),
    (0.0, 0.0),
    (0.15, 0.55),
    (0.17, 0.33),
    (0.18, 0.16),
    (0.19, 0.02),
    (0.3, 0.6),
    (0.33, 0.42),
    (0.35, 0.28),
    (0.36, 0.16),
    (0.42, 0.68),
    (0.46, 0.55),
    (0.48, 0.45),
    (0.5, 0.36),
];

/// Thumb tip offset while the button is held
const PINCHED_THUMB: (f32, f32) = (-0.06, 0.04);

/// Pointer-to-landmark synthesizer for a fixed frame size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerHand {
    frame: FrameSize,
    hand_height: f32,
}

impl PointerHand {
    pub fn new(frame: FrameSize) -> Self {
        Self {
            frame,
            hand_height: frame.height as f32 * HAND_HEIGHT_RATIO,
        }
    }

    pub fn frame_size(&self) -> FrameSize {
        self.frame
    }

    /// Hand pose with the index tip at `tip`
    pub fn landmarks(&self, tip: Point, pressed: bool) -> LandmarkSet {
        let mut points = [Point::default(); landmarks::COUNT];
        for (slot, (dx, dy)) in points.iter_mut().zip(OPEN_HAND) {
            *slot = Point::new(tip.x + dx * self.hand_height, tip.y + dy * self.hand_height);
        }
        if pressed {
            let (dx, dy) = PINCHED_THUMB;
            points[landmarks::THUMB_TIP] =
                Point::new(tip.x + dx * self.hand_height, tip.y + dy * self.hand_height);
        }
        LandmarkSet::new(points)
    }

    /// Detection frame for a pointer position
    ///
    /// A pointer outside the frame reports no hand.
    pub fn frame(&self, pointer: Option<Point>, pressed: bool) -> DetectionFrame {
        match pointer.filter(|p| self.contains(*p)) {
            Some(tip) => DetectionFrame::new(self.frame, vec![self.landmarks(tip, pressed)]),
            None => DetectionFrame::empty(self.frame),
        }
    }

    fn contains(&self, p: Point) -> bool {
        p.x >= 0.0
            && p.y >= 0.0
            && p.x < self.frame.width as f32
            && p.y < self.frame.height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::gesture;

    fn hand() -> PointerHand {
        PointerHand::new(FrameSize::new(640, 480))
    }

    #[test]
    fn test_index_tip_follows_pointer() {
        let set = hand().landmarks(Point::new(100.0, 200.0), false);
        assert_eq!(set.index_tip(), Point::new(100.0, 200.0));
    }

    #[test]
    fn test_open_hand_is_not_pinched() {
        let set = hand().landmarks(Point::new(300.0, 100.0), false);
        let ratio = set.thumb_tip().distance(set.index_tip()) / set.span();
        assert!(ratio > gesture::PINCH_THRESHOLD_SPAN);
        assert!(set.thumb_tip().distance(set.index_tip()) > gesture::PINCH_THRESHOLD_PX);
    }

    #[test]
    fn test_pressed_hand_is_pinched() {
        let set = hand().landmarks(Point::new(300.0, 100.0), true);
        let ratio = set.thumb_tip().distance(set.index_tip()) / set.span();
        assert!(ratio < gesture::PINCH_THRESHOLD_SPAN);
        assert!(set.thumb_tip().distance(set.index_tip()) < gesture::PINCH_THRESHOLD_PX);
    }

    #[test]
    fn test_outside_pointer_has_no_hand() {
        let h = hand();
        assert!(h.frame(None, false).hands.is_empty());
        assert!(h.frame(Some(Point::new(-1.0, 5.0)), true).hands.is_empty());
        assert!(h.frame(Some(Point::new(640.0, 5.0)), true).hands.is_empty());
        assert_eq!(h.frame(Some(Point::new(5.0, 5.0)), true).hands.len(), 1);
    }
}
