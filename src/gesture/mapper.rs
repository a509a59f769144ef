// SPDX-License-Identifier: GPL-3.0-only

//! Frame-source to display coordinate mapping
//!
//! Landmarks arrive in the detector's pixel space (the native camera
//! resolution). Gesture math and ink both live in display space, which is the
//! drawing surface. The mapper reconciles the two, either by stretching each
//! axis independently or by letterboxing with a uniform scale so overlays stay
//! aligned with the composited frame.
//!
//! Mirroring does not happen here. All gesture math runs unmirrored;
//! [`mirror_x`] exists for renderers that want a selfie view.

use crate::gesture::types::{FrameSize, LandmarkSet, Point};
use serde::{Deserialize, Serialize};

/// How source coordinates are fitted into the display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MappingPolicy {
    /// Independent x/y rescale; distorts when aspect ratios differ
    Stretch,
    /// Uniform scale plus centering offset; preserves aspect ratio
    #[default]
    Letterbox,
}

/// Scale and offset for one source/display pairing
///
/// `mapped = raw * scale + offset`, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale_x: f32,
    pub scale_y: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale_x: 1.0,
        scale_y: 1.0,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale_x + self.offset_x,
            p.y * self.scale_y + self.offset_y,
        )
    }
}

/// Maps landmarks from frame-source space into display space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    policy: MappingPolicy,
    display: FrameSize,
}

impl CoordinateMapper {
    pub fn new(policy: MappingPolicy, display: FrameSize) -> Self {
        Self { policy, display }
    }

    pub fn policy(&self) -> MappingPolicy {
        self.policy
    }

    pub fn display(&self) -> FrameSize {
        self.display
    }

    /// Transform for a given source resolution
    ///
    /// An empty source collapses everything onto the display origin instead
    /// of producing non-finite coordinates.
    pub fn transform(&self, source: FrameSize) -> Transform {
        if source.is_empty() {
            return Transform {
                scale_x: 0.0,
                scale_y: 0.0,
                offset_x: 0.0,
                offset_y: 0.0,
            };
        }

        let sx = self.display.width as f32 / source.width as f32;
        let sy = self.display.height as f32 / source.height as f32;

        match self.policy {
            MappingPolicy::Stretch => Transform {
                scale_x: sx,
                scale_y: sy,
                offset_x: 0.0,
                offset_y: 0.0,
            },
            MappingPolicy::Letterbox => {
                let scale = sx.min(sy);
                let scaled_w = source.width as f32 * scale;
                let scaled_h = source.height as f32 * scale;
                Transform {
                    scale_x: scale,
                    scale_y: scale,
                    offset_x: (self.display.width as f32 - scaled_w) / 2.0,
                    offset_y: (self.display.height as f32 - scaled_h) / 2.0,
                }
            }
        }
    }

    /// Map a single raw point
    pub fn map_point(&self, raw: Point, source: FrameSize) -> Point {
        self.transform(source).apply(raw)
    }

    /// Map every landmark of a hand
    pub fn map_hand(&self, hand: &LandmarkSet, source: FrameSize) -> LandmarkSet {
        let transform = self.transform(source);
        hand.map_points(|p| transform.apply(p))
    }
}

/// Horizontal mirror for presentation only
///
/// Renderers call this when painting a selfie view. Feeding mirrored points
/// back into gesture evaluation would make ink diverge from the fingertip.
pub fn mirror_x(p: Point, display: FrameSize) -> Point {
    Point::new(display.width as f32 - p.x, p.y)
}
