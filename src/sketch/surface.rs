// SPDX-License-Identifier: GPL-3.0-only

//! Stroke accumulator
//!
//! A transparent RGBA raster that collects fixed-width line segments. The
//! surface is the only mutable state shared between the frame loop (writer)
//! and classification (reader); readers always take a [`SketchSnapshot`] so
//! an in-flight request never sees strokes drawn after it started.

use crate::constants::surface::{BRUSH_WIDTH, SNAPSHOT_SIZE};
use crate::errors::ClassifyError;
use crate::gesture::types::{FrameSize, Point};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use tracing::trace;

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const BLANK: Rgba<u8> = Rgba([0, 0, 0, 0]);
const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Persistent drawing surface
#[derive(Debug, Clone)]
pub struct StrokeSurface {
    image: RgbaImage,
    brush_width: f32,
    snapshot_size: u32,
    segments: u64,
}

impl StrokeSurface {
    pub fn new(size: FrameSize) -> Self {
        Self::with_brush(size, BRUSH_WIDTH, SNAPSHOT_SIZE)
    }

    pub fn with_brush(size: FrameSize, brush_width: f32, snapshot_size: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(size.width, size.height, BLANK),
            brush_width: brush_width.max(1.0),
            snapshot_size: snapshot_size.max(1),
            segments: 0,
        }
    }

    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.image.width(), self.image.height())
    }

    pub fn brush_width(&self) -> f32 {
        self.brush_width
    }

    /// Segments committed since the last clear
    pub fn segment_count(&self) -> u64 {
        self.segments
    }

    /// Raw surface pixels (transparent where nothing was drawn)
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Whether a pixel carries ink
    pub fn is_inked(&self, x: u32, y: u32) -> bool {
        self.image
            .get_pixel_checked(x, y)
            .is_some_and(|p| p.0[3] > 0)
    }

    pub fn ink_pixel_count(&self) -> usize {
        self.image.pixels().filter(|p| p.0[3] > 0).count()
    }

    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| p.0[3] == 0)
    }

    /// Draw a segment from the previous brush position to the current one
    ///
    /// `from == None` means there is no previous position; nothing is drawn.
    /// Zero-length and non-finite segments are skipped as well. Returns
    /// whether the segment was committed.
    pub fn append_segment(&mut self, from: Option<Point>, to: Point) -> bool {
        let Some(from) = from else {
            return false;
        };
        if from == to || !from.is_finite() || !to.is_finite() {
            return false;
        }

        let radius = self.brush_width / 2.0;
        let width = self.image.width() as f32;
        let height = self.image.height() as f32;

        let min_x = (from.x.min(to.x) - radius).floor().max(0.0);
        let max_x = (from.x.max(to.x) + radius).ceil().min(width);
        let min_y = (from.y.min(to.y) - radius).floor().max(0.0);
        let max_y = (from.y.max(to.y) + radius).ceil().min(height);

        // Entirely off-surface segments still count as committed
        if min_x < max_x && min_y < max_y {
            let radius_sq = radius * radius;
            for y in min_y as u32..max_y as u32 {
                for x in min_x as u32..max_x as u32 {
                    let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                    if distance_sq_to_segment(center, from, to) <= radius_sq {
                        self.image.put_pixel(x, y, INK);
                    }
                }
            }
        }

        self.segments += 1;
        trace!(
            from_x = from.x,
            from_y = from.y,
            to_x = to.x,
            to_y = to.y,
            "Segment appended"
        );
        true
    }

    /// Erase everything
    pub fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = BLANK;
        }
        self.segments = 0;
    }

    /// Full-resolution copy composited over white
    pub fn composite(&self) -> RgbaImage {
        let mut paper = RgbaImage::from_pixel(self.image.width(), self.image.height(), PAPER);
        imageops::overlay(&mut paper, &self.image, 0, 0);
        paper
    }

    /// Fixed-size copy for classification
    ///
    /// Dark ink on white, resized to the square snapshot size. The copy is
    /// fully detached from the surface.
    pub fn snapshot(&self) -> SketchSnapshot {
        let composed = self.composite();
        let image = if composed.width() == 0 || composed.height() == 0 {
            RgbaImage::from_pixel(self.snapshot_size, self.snapshot_size, PAPER)
        } else {
            imageops::resize(
                &composed,
                self.snapshot_size,
                self.snapshot_size,
                FilterType::Triangle,
            )
        };
        SketchSnapshot { image }
    }
}

/// Detached image of the surface handed to classifiers
#[derive(Debug, Clone, PartialEq)]
pub struct SketchSnapshot {
    image: RgbaImage,
}

impl SketchSnapshot {
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.image.width(), self.image.height())
    }

    /// Whether every pixel is plain paper
    pub fn is_blank(&self) -> bool {
        self.image.pixels().all(|p| *p == PAPER)
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, ClassifyError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

fn distance_sq_to_segment(p: Point, a: Point, b: Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    let t = if len_sq > 0.0 {
        (((p.x - a.x) * abx + (p.y - a.y) * aby) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let cx = a.x + t * abx - p.x;
    let cy = a.y + t * aby - p.y;
    cx * cx + cy * cy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> StrokeSurface {
        StrokeSurface::with_brush(FrameSize::new(200, 200), 10.0, 64)
    }

    #[test]
    fn test_segment_draws_ink() {
        let mut s = surface();
        assert!(s.append_segment(Some(Point::new(20.0, 100.0)), Point::new(180.0, 100.0)));
        assert!(s.is_inked(100, 100));
        assert!(s.is_inked(100, 97));
        assert!(!s.is_inked(100, 110));
        assert_eq!(s.segment_count(), 1);
    }

    #[test]
    fn test_sentinel_from_is_noop() {
        let mut s = surface();
        assert!(!s.append_segment(None, Point::new(50.0, 50.0)));
        assert!(s.is_blank());
        assert_eq!(s.segment_count(), 0);
    }

    #[test]
    fn test_zero_length_is_noop() {
        let mut s = surface();
        let p = Point::new(100.0, 100.0);
        assert!(!s.append_segment(Some(p), p));
        assert!(s.is_blank());
    }

    #[test]
    fn test_genuine_origin_draws() {
        let mut s = surface();
        assert!(s.append_segment(Some(Point::new(0.0, 0.0)), Point::new(30.0, 0.0)));
        assert!(s.is_inked(0, 0));
    }

    #[test]
    fn test_off_surface_segment_is_clipped() {
        let mut s = surface();
        assert!(s.append_segment(Some(Point::new(-500.0, -500.0)), Point::new(-400.0, -450.0)));
        assert!(s.is_blank());
    }

    #[test]
    fn test_clear_then_snapshot_is_blank() {
        let mut s = surface();
        s.append_segment(Some(Point::new(10.0, 10.0)), Point::new(190.0, 190.0));
        assert!(!s.snapshot().is_blank());

        s.clear();
        assert!(s.snapshot().is_blank());
        s.clear();
        assert!(s.is_blank());
        assert!(s.snapshot().is_blank());
        assert_eq!(s.segment_count(), 0);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut s = surface();
        let before = s.snapshot();
        s.append_segment(Some(Point::new(10.0, 100.0)), Point::new(190.0, 100.0));
        assert!(before.is_blank());
        assert_eq!(before.size(), FrameSize::new(64, 64));
    }

    #[test]
    fn test_snapshot_encodes_png() {
        let s = surface();
        let png = s.snapshot().encode_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
