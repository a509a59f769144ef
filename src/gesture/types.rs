// SPDX-License-Identifier: GPL-3.0-only

//! Core types for hand-landmark input
//!
//! A detector reports zero or more hands per frame, each as an ordered set of
//! 21 points in frame-source pixel space. These types carry that data into the
//! gesture pipeline; they are immutable snapshots that get replaced wholesale
//! by the next detection.

use crate::constants::gesture::MIN_HAND_SPAN;
use crate::constants::landmarks;
use serde::{Deserialize, Serialize};

/// A 2D point in pixels
///
/// Serialized as a `[x, y]` pair, matching the detector's landmark layout.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Point halfway between `self` and `other`
    pub fn midpoint(&self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Pixel dimensions of a frame, display or surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

impl std::fmt::Display for FrameSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Ordered set of the 21 landmarks of one hand
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: [Point; landmarks::COUNT],
}

impl LandmarkSet {
    pub fn new(points: [Point; landmarks::COUNT]) -> Self {
        Self { points }
    }

    /// Landmark at `index`, if it exists
    pub fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    pub fn thumb_tip(&self) -> Point {
        self.points[landmarks::THUMB_TIP]
    }

    pub fn index_tip(&self) -> Point {
        self.points[landmarks::INDEX_FINGER_TIP]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    /// Apply a coordinate transform to every landmark
    pub fn map_points(&self, f: impl Fn(Point) -> Point) -> LandmarkSet {
        LandmarkSet {
            points: self.points.map(f),
        }
    }

    /// Larger side of the landmarks' bounding box
    ///
    /// Used as the reference length for resolution-independent thresholds.
    /// Never smaller than [`MIN_HAND_SPAN`].
    pub fn span(&self) -> f32 {
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;

        for p in &self.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        (max_x - min_x).max(max_y - min_y).max(MIN_HAND_SPAN)
    }
}

impl TryFrom<Vec<Point>> for LandmarkSet {
    type Error = usize;

    /// Fails with the received count unless exactly 21 points are given
    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        let count = points.len();
        let points: [Point; landmarks::COUNT] = points.try_into().map_err(|_| count)?;
        Ok(Self { points })
    }
}

/// One detection callback's worth of data
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectionFrame {
    /// Native resolution of the frame the landmarks were detected in
    pub source: FrameSize,
    /// Detected hands, in detector order
    pub hands: Vec<LandmarkSet>,
}

impl DetectionFrame {
    pub fn new(source: FrameSize, hands: Vec<LandmarkSet>) -> Self {
        Self { source, hands }
    }

    /// A frame with no hands
    pub fn empty(source: FrameSize) -> Self {
        Self {
            source,
            hands: Vec::new(),
        }
    }

    /// The hand that drives the gesture logic
    ///
    /// Only the first detection is ever used, even when several hands are
    /// present.
    pub fn primary_hand(&self) -> Option<&LandmarkSet> {
        self.hands.first()
    }
}

#[cfg(test)]
pub(crate) fn hand_with_tips(index: Point, thumb: Point) -> LandmarkSet {
    let mut points = [index; landmarks::COUNT];
    points[landmarks::THUMB_TIP] = thumb;
    points[landmarks::INDEX_FINGER_TIP] = index;
    LandmarkSet::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance(b) - 5.0).abs() < 1e-6);
        assert_eq!(a.midpoint(b), Point::new(1.5, 2.0));
    }

    #[test]
    fn test_point_serde_as_pair() {
        let p: Point = serde_json::from_str("[12.5, 7]").unwrap();
        assert_eq!(p, Point::new(12.5, 7.0));
        assert_eq!(serde_json::to_string(&p).unwrap(), "[12.5,7.0]");
    }

    #[test]
    fn test_landmark_set_requires_21_points() {
        let short = vec![Point::default(); 20];
        assert_eq!(LandmarkSet::try_from(short).unwrap_err(), 20);

        let full: Vec<Point> = (0..21).map(|i| Point::new(i as f32, 0.0)).collect();
        let set = LandmarkSet::try_from(full).unwrap();
        assert_eq!(set.thumb_tip(), Point::new(4.0, 0.0));
        assert_eq!(set.index_tip(), Point::new(8.0, 0.0));
        assert_eq!(set.point(21), None);
    }

    #[test]
    fn test_span_uses_larger_side() {
        let hand = hand_with_tips(Point::new(100.0, 100.0), Point::new(130.0, 180.0));
        assert!((hand.span() - 80.0).abs() < 1e-6);

        // Collapsed hand still yields a usable reference length
        let dot = hand_with_tips(Point::new(5.0, 5.0), Point::new(5.0, 5.0));
        assert_eq!(dot.span(), MIN_HAND_SPAN);
    }

    #[test]
    fn test_primary_hand_is_first() {
        let a = hand_with_tips(Point::new(1.0, 1.0), Point::new(2.0, 2.0));
        let b = hand_with_tips(Point::new(9.0, 9.0), Point::new(8.0, 8.0));
        let frame = DetectionFrame::new(FrameSize::new(10, 10), vec![a.clone(), b]);
        assert_eq!(frame.primary_hand(), Some(&a));
        assert!(DetectionFrame::empty(FrameSize::new(10, 10)).primary_hand().is_none());
    }
}
